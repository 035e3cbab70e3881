use std::path::PathBuf;

use afr_analysis::{
    fitting::{Weighting, fit_hazard_curve},
    hazard::compute_hazard_curve,
};
use afr_stats::{
    distribution::Family,
    fit::{FitOptions, FitResult, FitScale},
};
use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::{
    command::input::{HazardConfigArg, InputArg},
    util::Output,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
enum WeightingKind {
    None,
    #[default]
    Uncertainty,
    Subsample,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct FitArg {
    #[clap(flatten)]
    input: InputArg,

    #[clap(flatten)]
    config: HazardConfigArg,

    /// Distribution families to fit (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = ["weibull", "gamma", "lognorm"])]
    family: Vec<Family>,

    /// Residual scale: linear or log
    #[arg(long, default_value = "linear")]
    scale: FitScale,

    /// Point weighting: uncertainty, none or subsample
    #[arg(long, default_value = "uncertainty")]
    weighting: WeightingKind,

    /// Points drawn when weighting by subsample
    #[arg(long, default_value_t = 1000)]
    max_points: usize,

    /// Random seed of the subsample
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Iteration limit of the least-squares solver
    #[arg(long, default_value_t = 200)]
    max_iterations: usize,

    /// Write the fitted parameters as JSON to this file
    #[arg(short, long, value_name = "JSON")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FitReport {
    #[serde(flatten)]
    fit: FitResult,
    /// Median lifetime of the fitted distribution, in years
    median: f64,
}

pub(crate) fn run(arg: &FitArg) -> anyhow::Result<()> {
    let config = arg.config.resolve()?;
    let (failures, population) = arg.input.load()?;
    let curve = compute_hazard_curve(&failures, &population, &config)
        .context("Failed to estimate the failure rate")?;

    let weighting = match arg.weighting {
        WeightingKind::None => Weighting::None,
        WeightingKind::Uncertainty => Weighting::Uncertainty,
        WeightingKind::Subsample => Weighting::Subsample {
            max_points: arg.max_points,
            seed: arg.seed,
        },
    };
    let options = FitOptions {
        scale: arg.scale,
        max_iterations: arg.max_iterations,
        ..FitOptions::default()
    };

    let mut reports = vec![];
    for &family in &arg.family {
        let fit = fit_hazard_curve(&curve, family, weighting, &options)
            .with_context(|| format!("Failed to fit the {family} distribution"))?;
        let median = fit
            .distribution()
            .with_context(|| format!("Fitted {family} parameters are invalid"))?
            .median();

        println!(
            "{family:<8} shape = {:.4} ± {:.4}, scale = {:.4} ± {:.4}, chi² = {:.4e}, median = {median:.2} years ({} points, {} iterations)",
            fit.params.shape,
            fit.std_errors.shape,
            fit.params.scale,
            fit.std_errors.scale,
            fit.chi_squared,
            fit.points,
            fit.iterations,
        );
        reports.push(FitReport { fit, median });
    }

    if let Some(path) = &arg.output {
        Output::save_json(&reports, Some(path.clone()))?;
        eprintln!("Written fitted parameters to {}", path.display());
    }
    Ok(())
}
