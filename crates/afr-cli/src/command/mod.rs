use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use self::{
    bins::BinsArg, dist::DistArg, exposure::ExposureArg, fit::FitArg, hazard::HazardArg,
    stats::StatsArg,
};

mod bins;
mod dist;
mod exposure;
mod fit;
mod hazard;
mod input;
mod stats;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log more details to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// What to compute
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Estimate the smoothed failure rate over age
    Hazard(#[clap(flatten)] HazardArg),
    /// Tabulate failures and exposure in fixed-width age bins
    Bins(#[clap(flatten)] BinsArg),
    /// Fit lifetime distributions to the estimated failure rate
    Fit(#[clap(flatten)] FitArg),
    /// Print disk-years, failure count and mean AFR
    Stats(#[clap(flatten)] StatsArg),
    /// Evaluate a lifetime distribution on a range of ages
    Dist(#[clap(flatten)] DistArg),
    /// Print the total disk-years of an observed population
    Exposure(#[clap(flatten)] ExposureArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Hazard(arg) => hazard::run(&arg)?,
        Mode::Bins(arg) => bins::run(&arg)?,
        Mode::Fit(arg) => fit::run(&arg)?,
        Mode::Stats(arg) => stats::run(&arg)?,
        Mode::Dist(arg) => dist::run(&arg)?,
        Mode::Exposure(arg) => exposure::run(&arg)?,
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
