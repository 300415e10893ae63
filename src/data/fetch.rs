//! Housing CSV download and local caching.
//!
//! The dataset is a single static CSV, so acquisition is deliberately
//! simple: one blocking GET, no retries, no conditional requests. Once
//! the file exists on disk we never touch the network again.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::error::AppError;

/// Default source for the California housing CSV.
const DEFAULT_URL: &str =
    "https://raw.githubusercontent.com/ageron/handson-ml2/master/datasets/housing/housing.csv";

/// Where the downloaded CSV lands relative to the working directory.
const DEFAULT_CACHE_PATH: &str = "data/housing.csv";

/// Resolve the download URL, honoring an `.env`/environment override.
pub fn housing_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("HV_HOUSING_URL").unwrap_or_else(|_| DEFAULT_URL.to_string())
}

/// Return a readable path to the housing CSV, downloading it if needed.
///
/// An explicit `path` bypasses the cache entirely and must already
/// exist (we never download over a user-supplied location).
pub fn ensure_housing_csv(path: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(AppError::input(format!(
                "CSV file '{}' does not exist.",
                path.display()
            )));
        }
        return Ok(path.to_path_buf());
    }

    let dest = PathBuf::from(DEFAULT_CACHE_PATH);
    if dest.exists() {
        return Ok(dest);
    }

    let url = housing_url();
    eprintln!("Downloading housing data from {url} ...");
    download_csv(&url, &dest)?;
    Ok(dest)
}

fn download_csv(url: &str, dest: &Path) -> Result<(), AppError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::input(format!(
                "Failed to create data directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let resp = Client::new()
        .get(url)
        .send()
        .map_err(|e| AppError::compute(format!("Housing download failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::compute(format!(
            "Housing download failed with status {}.",
            resp.status()
        )));
    }

    let body = resp
        .text()
        .map_err(|e| AppError::compute(format!("Failed to read housing download: {e}")))?;

    // A proxy or captive portal can return HTML with a 200; make sure
    // this at least looks like the expected CSV before caching it.
    let first_line = body.lines().next().unwrap_or("");
    if !first_line.to_ascii_lowercase().contains("longitude") {
        return Err(AppError::compute(
            "Housing download did not look like the expected CSV (no 'longitude' header).",
        ));
    }

    fs::write(dest, body).map_err(|e| {
        AppError::input(format!(
            "Failed to write housing CSV '{}': {e}",
            dest.display()
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_an_input_error() {
        let err = ensure_housing_csv(Some(Path::new("/nonexistent/housing.csv"))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn explicit_existing_path_is_returned_untouched() {
        let dir = std::env::temp_dir().join("hv-fetch-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("present.csv");
        fs::write(&path, "longitude,latitude\n").unwrap();

        let resolved = ensure_housing_csv(Some(&path)).unwrap();
        assert_eq!(resolved, path);
    }
}
