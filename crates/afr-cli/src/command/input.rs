//! Arguments shared by the subcommands that read both series.

use std::path::PathBuf;

use afr_analysis::{hazard::HazardConfig, unit::AgeUnit};
use afr_stats::series::TimeSeries;
use anyhow::Context;
use clap::Args;

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct InputArg {
    /// Cumulative failures over age (CSV rows `age,count`)
    #[arg(value_name = "CUMUFAILS")]
    pub cumufails: PathBuf,

    /// Observed population over age (CSV rows `age,count`)
    #[arg(value_name = "OBSPOP")]
    pub obspop: PathBuf,

    /// Unit of the age column in both files
    #[arg(long, default_value = "hours")]
    pub unit: AgeUnit,
}

impl InputArg {
    /// Reads both series with the age axis converted to years.
    pub fn load(&self) -> anyhow::Result<(TimeSeries, TimeSeries)> {
        let failures = util::read_series_file("cumulative failures", &self.cumufails, self.unit)?;
        let population = util::read_series_file("observed population", &self.obspop, self.unit)?;
        Ok((failures, population))
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct HazardConfigArg {
    /// Read estimator parameters from a JSON file; flags below override it
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Number of grid points [default: 2000]
    #[arg(long)]
    pub samples: Option<usize>,

    /// Smoothing window, odd [default: 169]
    #[arg(long)]
    pub window: Option<usize>,

    /// Degree of the smoothing polynomial [default: 3]
    #[arg(long)]
    pub poly_order: Option<usize>,

    /// Ignore ages below this many years
    #[arg(long)]
    pub min_x: Option<f64>,
}

impl HazardConfigArg {
    pub fn resolve(&self) -> anyhow::Result<HazardConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file::<HazardConfig, _>("hazard config", path)?,
            None => HazardConfig::default(),
        };
        if let Some(samples) = self.samples {
            config.num_samples = samples;
        }
        if let Some(window) = self.window {
            config.window_size = window;
        }
        if let Some(poly_order) = self.poly_order {
            config.poly_order = poly_order;
        }
        if let Some(min_x) = self.min_x {
            config.min_x = Some(min_x);
        }
        config
            .validate()
            .context("Invalid hazard estimator parameters")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use afr_analysis::hazard::{DerivativeSpacing, HazardError};
    use afr_stats::savgol::SmoothingError;
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct ConfigCli {
        #[clap(flatten)]
        config: HazardConfigArg,
    }

    fn resolve(args: &[&str]) -> anyhow::Result<HazardConfig> {
        let cli = ConfigCli::try_parse_from(std::iter::once("afr").chain(args.iter().copied()))?;
        cli.config.resolve()
    }

    #[test]
    fn test_defaults_without_config() {
        assert_eq!(resolve(&[]).unwrap(), HazardConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hazard.json");
        fs::write(
            &path,
            r#"{ "num_samples": 500, "window_size": 51, "poly_order": 2, "derivative_spacing": "sample_count" }"#,
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let from_file = resolve(&["--config", path]).unwrap();
        assert_eq!(from_file.num_samples, 500);
        assert_eq!(from_file.window_size, 51);
        assert_eq!(from_file.min_x, None);

        let merged = resolve(&[
            "--config",
            path,
            "--window",
            "31",
            "--samples",
            "800",
            "--min-x",
            "0.25",
        ])
        .unwrap();
        assert_eq!(
            merged,
            HazardConfig {
                num_samples: 800,
                window_size: 31,
                poly_order: 2,
                min_x: Some(0.25),
                derivative_spacing: DerivativeSpacing::SampleCount,
            }
        );
    }

    #[test]
    fn test_invalid_merge_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hazard.json");
        fs::write(&path, r#"{ "window_size": 51 }"#).unwrap();

        let err = resolve(&["--config", path.to_str().unwrap(), "--window", "40"]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<HazardError>(),
            Some(&HazardError::Smoothing(SmoothingError::InvalidWindow {
                window_size: 40
            }))
        );
    }

    #[test]
    fn test_unknown_config_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hazard.json");
        fs::write(&path, r#"{ "window": 51 }"#).unwrap();

        assert!(resolve(&["--config", path.to_str().unwrap()]).is_err());
    }
}
