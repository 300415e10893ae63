//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves/downloads the housing CSV
//! - runs splitting, imputation, fitting, and selection
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, PredictArgs, SynthArgs};
use crate::domain::{FitConfig, ModelFile};
use crate::error::AppError;
use crate::fit::design;
use crate::prep::ImputerModel;

pub mod pipeline;

/// Entry point for the `hv` binary.
pub fn run() -> Result<(), AppError> {
    // We want `hv` and `hv -m full` to behave like `hv tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Synth(args) => handle_synth(args),
        Command::Predict(args) => handle_predict(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &run.ingest,
            &run.selection,
            &run.holdout,
            &run.imputer,
            &config
        )
    );
    println!(
        "{}",
        crate::report::format_correlation(&run.correlation, &run.correlation_names)
    );
    println!("{}", crate::report::format_rankings(&run.rankings));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            config.plot_width,
            config.plot_height,
            Some(&run.rankings),
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.residuals)?;
    }
    if let Some(path) = &config.export_model {
        let model_file = ModelFile {
            tool: "hv".to_string(),
            trained_on: chrono::Local::now().date_naive(),
            target: design::TARGET_COLUMN.to_string(),
            impute: run.imputer.strategy(),
            impute_fill: run.imputer.fill().to_vec(),
            model: run.selection.best.model.clone(),
            quality: run.selection.best.quality.clone(),
            holdout: run.holdout.clone(),
        };
        crate::io::model::write_model_json(path, &model_file)?;
    }

    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    use nalgebra::{DMatrix, DVector};

    let config = crate::data::synthetic::SynthConfig {
        count: args.count,
        slope: args.slope,
        intercept: args.intercept,
        noise: args.noise,
        x_min: args.x_min,
        x_max: args.x_max,
        seed: args.seed,
    };
    let data = crate::data::synthetic::generate_line(&config)?;

    let x = DMatrix::from_column_slice(data.x.len(), 1, &data.x);
    let y = DVector::from_column_slice(&data.y);
    let model = crate::linreg::fit(&x, &y, true)?;
    let y_fit = model.predict(&x)?;

    let y_slice: Vec<f64> = y.iter().copied().collect();
    let fit_slice: Vec<f64> = y_fit.iter().copied().collect();
    let rmse = crate::stats::root_mean_square_error(&y_slice, &fit_slice)?;
    let mae = crate::stats::mean_absolute_error(&y_slice, &fit_slice)?;

    println!("=== hv - synthetic line check ===");
    println!(
        "Generator: y = {:.3}x + {:.3} (noise sd {:.3}, n={}, seed {})",
        config.slope, config.intercept, config.noise, config.count, config.seed
    );
    println!(
        "Recovered: slope={:.4} intercept={:.4}",
        model.coefficients[0], model.intercept
    );
    println!("Training fit: RMSE={rmse:.4} MAE={mae:.4}");

    if !args.no_plot {
        let points: Vec<crate::plot::PlotPoint> = fit_slice
            .iter()
            .zip(y_slice.iter())
            .map(|(&y_fit, &y_obs)| crate::plot::PlotPoint {
                y_fit,
                y_obs,
                highlight: crate::plot::Highlight::None,
            })
            .collect();
        println!(
            "{}",
            crate::plot::render_pred_actual_plot(&points, args.width, args.height)
        );
    }

    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let model_file = crate::io::model::read_model_json(&args.model)?;
    let ingest = crate::io::ingest::load_districts(&args.csv)?;

    // Score exactly the way the training run would have: assemble the
    // full design, fill gaps with the *stored* training statistics,
    // then carve out the model's columns.
    let x_all = design::build_design(&ingest.rows, crate::domain::FeatureSet::Full);
    let imputer = ImputerModel::from_parts(model_file.impute, model_file.impute_fill.clone());
    let x_all = imputer.transform(&x_all)?;
    let columns = design::columns_in_full(model_file.model.feature_set);
    let x = design::select_columns(&x_all, &columns);

    let y_pred = model_file.model.to_linear().predict(&x)?;
    let y_pred: Vec<f64> = y_pred.iter().copied().collect();

    crate::io::export::write_predictions_csv(&args.out, &ingest.rows, &y_pred)?;
    println!(
        "Scored {} districts with the {} model (trained {}) -> {}",
        y_pred.len(),
        model_file.model.display_name,
        model_file.trained_on,
        args.out.display()
    );

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let points = crate::io::export::read_results_csv(&args.results)?;
    let plot = crate::plot::render_ascii_plot_from_results(&points, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        impute: args.impute,
        model_spec: args.model,
        test_ratio: args.test_ratio,
        split_seed: args.seed,
        biased_cov: args.biased_cov,
        top_n: args.top,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_model: args.export_model.clone(),
    }
}

/// Rewrite argv so `hv` defaults to `hv tui`.
///
/// Rules:
/// - `hv`                      -> `hv tui`
/// - `hv -m full ...`          -> `hv tui -m full ...`
/// - `hv --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "synth" | "predict" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["hv"])), argv(&["hv", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["hv", "-m", "full"])),
            argv(&["hv", "tui", "-m", "full"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["hv", "fit"])), argv(&["hv", "fit"]));
        assert_eq!(rewrite_args(argv(&["hv", "--help"])), argv(&["hv", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["hv", "synth", "--noise", "0"])),
            argv(&["hv", "synth", "--noise", "0"])
        );
    }
}
