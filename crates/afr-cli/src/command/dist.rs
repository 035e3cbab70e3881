use std::path::PathBuf;

use afr_analysis::io::write_rows;
use afr_stats::{
    distribution::{Family, Function, Params, evaluate_distribution},
    series::{DomainLimits, Grid},
};
use anyhow::Context;
use clap::Args;

use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct DistArg {
    /// Distribution family: weibull, gamma or lognorm
    #[arg(long)]
    family: Family,

    /// Shape parameter
    #[arg(long)]
    shape: f64,

    /// Scale parameter, in years
    #[arg(long)]
    scale: f64,

    /// Function to evaluate: pdf, cdf, sf or hazard
    #[arg(long, default_value = "cdf")]
    function: Function,

    /// Smallest age, in years
    #[arg(long, default_value_t = 0.0)]
    xmin: f64,

    /// Largest age, in years
    #[arg(long, default_value_t = 20.0)]
    xmax: f64,

    /// Number of evenly spaced ages
    #[arg(long, default_value_t = 1000)]
    num: usize,

    /// Write CSV rows to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DistArg) -> anyhow::Result<()> {
    anyhow::ensure!(
        arg.xmin <= arg.xmax,
        "--xmin ({}) must not exceed --xmax ({})",
        arg.xmin,
        arg.xmax
    );
    let params = Params {
        shape: arg.shape,
        scale: arg.scale,
    };
    let dist = arg
        .family
        .distribution(params)
        .context("Invalid distribution parameters")?;

    let grid = Grid::linspace(
        DomainLimits {
            min: arg.xmin,
            max: arg.xmax,
        },
        arg.num,
    );
    let ys = evaluate_distribution(arg.family, params, arg.function, grid.points())?;

    let mut output = Output::from_output_path(arg.output.clone())?;
    write_rows(&mut output, grid.points(), &ys)?;
    output.finish()?;

    eprintln!(
        "{} {params}: median = {:.4} years",
        arg.family,
        dist.median()
    );
    Ok(())
}
