//! Deterministic train/test splitting.
//!
//! The shuffle is seeded so a run is reproducible end to end: the same
//! CSV, seed, and ratio always produce the same split, the same fit,
//! and the same rankings.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::AppError;

/// Row indices assigned to each side of the split.
#[derive(Debug, Clone)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded RNG and carve off the test fraction.
///
/// Both sides are guaranteed non-empty, which requires `n >= 2`.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> Result<SplitIndices, AppError> {
    if n < 2 {
        return Err(AppError::data(
            "Need at least 2 rows to hold out an evaluation split.",
        ));
    }
    if !(test_ratio.is_finite() && test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(AppError::input(format!(
            "Test ratio must be in (0, 1), got {test_ratio}."
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = ((n as f64) * test_ratio).round() as usize;
    let n_test = n_test.clamp(1, n - 1);

    let train = indices.split_off(n_test);
    Ok(SplitIndices {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let a = train_test_split(100, 0.2, 42).unwrap();
        let b = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);

        let c = train_test_split(100, 0.2, 43).unwrap();
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn split_partitions_all_rows() {
        let split = train_test_split(50, 0.25, 7).unwrap();
        assert_eq!(split.test.len(), 13); // round(50 * 0.25)
        assert_eq!(split.train.len() + split.test.len(), 50);

        let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn both_sides_stay_non_empty_at_extreme_ratios() {
        let tiny = train_test_split(2, 0.01, 1).unwrap();
        assert_eq!(tiny.test.len(), 1);
        assert_eq!(tiny.train.len(), 1);

        let huge = train_test_split(10, 0.99, 1).unwrap();
        assert!(huge.train.len() >= 1);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(train_test_split(1, 0.2, 0).is_err());
        assert!(train_test_split(10, 0.0, 0).is_err());
        assert!(train_test_split(10, 1.0, 0).is_err());
        assert!(train_test_split(10, f64::NAN, 0).is_err());
    }
}
