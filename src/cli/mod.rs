//! Command-line parsing for the housing value screener.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ImputeStrategy, ModelSpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hv", version, about = "California housing value screener (OLS-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit candidate models, print diagnostics/rankings, and optionally plot/export.
    Fit(FitArgs),
    /// Fit a known synthetic line and verify the recovered coefficients.
    Synth(SynthArgs),
    /// Score a fresh CSV with a previously exported model JSON.
    Predict(PredictArgs),
    /// Plot a previously exported results CSV.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying fit pipeline as `hv fit`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(FitArgs),
}

/// Common options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Housing CSV path (downloaded and cached automatically if omitted).
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Missing-value fill strategy.
    #[arg(long, value_enum, default_value_t = ImputeStrategy::Median)]
    pub impute: ImputeStrategy,

    /// Which candidate feature set(s) to fit.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelSpec::Auto)]
    pub model: ModelSpec,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_ratio: f64,

    /// Random seed for the train/test shuffle.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Use the biased (n) covariance denominator in the correlation report.
    #[arg(long)]
    pub biased_cov: bool,

    /// Show top-N overvalued and undervalued districts.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-district evaluation results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the chosen model (weights + imputer fills) to JSON.
    #[arg(long = "export-model")]
    pub export_model: Option<PathBuf>,
}

/// Options for the synthetic-line demo.
#[derive(Debug, Parser)]
pub struct SynthArgs {
    /// Number of points to generate.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Slope of the generating line.
    #[arg(long, default_value_t = 3.0)]
    pub slope: f64,

    /// Intercept of the generating line.
    #[arg(long, default_value_t = 4.0)]
    pub intercept: f64,

    /// Standard deviation of the additive Gaussian noise.
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    /// Lower bound of the sampled x range.
    #[arg(long, default_value_t = 0.0)]
    pub x_min: f64,

    /// Upper bound of the sampled x range.
    #[arg(long, default_value_t = 2.0)]
    pub x_max: f64,

    /// Random seed for generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,
}

/// Options for scoring a fresh CSV with a saved model.
#[derive(Debug, Parser)]
pub struct PredictArgs {
    /// Model JSON produced by `hv fit --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// CSV of districts to score (same schema as the training CSV).
    #[arg(long)]
    pub csv: PathBuf,

    /// Where to write the predictions CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

/// Options for plotting a saved results file.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Results CSV produced by `hv fit --export`.
    #[arg(long, value_name = "CSV")]
    pub results: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
