use afr_analysis::{summary::summary_statistics, unit::AgeUnit};
use anyhow::Context;
use clap::Args;

use crate::command::input::InputArg;

#[derive(Debug, Clone, Args)]
pub(crate) struct StatsArg {
    #[clap(flatten)]
    input: InputArg,

    /// Print only the numbers, space separated
    #[arg(short, long)]
    minimal: bool,
}

pub(crate) fn run(arg: &StatsArg) -> anyhow::Result<()> {
    let (failures, population) = arg.input.load()?;
    let summary = summary_statistics(&failures, &population, AgeUnit::Years)
        .context("Failed to summarize the population")?;

    if arg.minimal {
        println!(
            "{:.0} {} {:.2}% {:.2} {:.0}",
            summary.disk_years,
            summary.failure_count,
            summary.mean_afr,
            summary.observed_years,
            summary.mean_population
        );
    } else {
        println!("Total disk-years: {}", summary.disk_years);
        println!("Total failures: {}", summary.failure_count);
        println!("Mean AFR: {}%", summary.mean_afr);
        println!("Observed span (years): {}", summary.observed_years);
        println!("Mean population over span: {}", summary.mean_population);
    }
    Ok(())
}
