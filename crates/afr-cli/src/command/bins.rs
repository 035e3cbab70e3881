use afr_analysis::discrete::{DiscreteConfig, discrete_failure_rates};
use anyhow::Context;
use clap::Args;

use crate::command::input::InputArg;

#[derive(Debug, Clone, Args)]
pub(crate) struct BinsArg {
    #[clap(flatten)]
    input: InputArg,

    /// Width of every age bin, in years
    #[arg(long, default_value_t = 0.5)]
    bin_width: f64,

    /// Population samples per bin when integrating exposure
    #[arg(long, default_value_t = 10)]
    samples_per_bin: usize,
}

pub(crate) fn run(arg: &BinsArg) -> anyhow::Result<()> {
    let (failures, population) = arg.input.load()?;
    let config = DiscreteConfig {
        bin_width: arg.bin_width,
        samples_per_bin: arg.samples_per_bin,
    };
    let table = discrete_failure_rates(&failures, &population, &config)
        .context("Failed to compute the binned failure rate")?;

    println!(
        "{:>8} {:>8} {:>12} {:>10} {:>9}",
        "from", "to", "disk-years", "failures", "AFR (%)"
    );
    for bin in &table {
        println!(
            "{:>8.2} {:>8.2} {:>12.0} {:>10.0} {:>9.2}",
            bin.left,
            bin.right,
            bin.exposure,
            bin.failures,
            bin.rate * 100.0
        );
    }
    Ok(())
}
