use std::path::PathBuf;

use afr_analysis::{
    hazard::compute_hazard_curve,
    io::{write_columns, write_rows},
};
use anyhow::Context;
use clap::Args;

use crate::{
    command::input::{HazardConfigArg, InputArg},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct HazardArg {
    #[clap(flatten)]
    input: InputArg,

    #[clap(flatten)]
    config: HazardConfigArg,

    /// Write CSV rows to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write smoothed cumulative failures, failure rate and population
    #[arg(long)]
    explain: bool,
}

pub(crate) fn run(arg: &HazardArg) -> anyhow::Result<()> {
    let config = arg.config.resolve()?;
    let (failures, population) = arg.input.load()?;
    let curve = compute_hazard_curve(&failures, &population, &config)
        .context("Failed to estimate the failure rate")?;

    let mut output = Output::from_output_path(arg.output.clone())?;
    if arg.explain {
        write_columns(
            &mut output,
            Some(["x", "cumulative_failures", "failure_rate", "population", "hazard"].as_slice()),
            &[
                curve.xs.as_slice(),
                curve.cumulative_failures.as_slice(),
                curve.failure_rate.as_slice(),
                curve.population.as_slice(),
                curve.hazard.as_slice(),
            ],
        )?;
    } else {
        write_rows(&mut output, &curve.xs, &curve.hazard)?;
    }
    output.finish()?;

    if let Output::File { path, .. } = &output {
        eprintln!("Written failure rate to {}", path.display());
    }
    Ok(())
}
