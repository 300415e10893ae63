//! Synthetic linear data generation.
//!
//! The demo path fits a known generating line (`y = slope·x + intercept`
//! plus Gaussian noise) so the recovered coefficients can be checked
//! against ground truth. Generation is fully seeded: the same config
//! always produces the same sample.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Configuration for one synthetic sample.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub count: usize,
    pub slope: f64,
    pub intercept: f64,
    /// Standard deviation of the additive Gaussian noise (0 disables it).
    pub noise: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub seed: u64,
}

/// Generated sample plus the line that produced it.
#[derive(Debug, Clone)]
pub struct SynthData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub config: SynthConfig,
}

/// Draw `count` points uniformly over `[x_min, x_max]` on the line.
pub fn generate_line(config: &SynthConfig) -> Result<SynthData, AppError> {
    if config.count == 0 {
        return Err(AppError::input("Sample count must be > 0."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::input("Invalid x range for sample generation."));
    }
    if !(config.slope.is_finite() && config.intercept.is_finite()) {
        return Err(AppError::input("Slope and intercept must be finite."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::input("Noise level must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::compute(format!("Noise distribution error: {e}")))?;

    let mut x = Vec::with_capacity(config.count);
    let mut y = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let xi = rng.gen_range(config.x_min..=config.x_max);
        let z: f64 = normal.sample(&mut rng);
        x.push(xi);
        y.push(config.slope * xi + config.intercept + config.noise * z);
    }

    Ok(SynthData {
        x,
        y,
        config: config.clone(),
    })
}
