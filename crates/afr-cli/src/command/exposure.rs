use std::path::PathBuf;

use afr_analysis::{summary::total_exposure, unit::AgeUnit};
use clap::Args;

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct ExposureArg {
    /// Observed population over age (CSV rows `age,count`)
    #[arg(value_name = "OBSPOP")]
    obspop: PathBuf,

    /// Unit of the age column
    #[arg(long, default_value = "hours")]
    unit: AgeUnit,
}

pub(crate) fn run(arg: &ExposureArg) -> anyhow::Result<()> {
    let population = util::read_series_file("observed population", &arg.obspop, arg.unit)?;
    println!("{:.0}", total_exposure(&population, AgeUnit::Years));
    Ok(())
}
