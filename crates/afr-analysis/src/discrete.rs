//! Binned failure-rate table.
//!
//! Instead of differentiating a smoothed curve, the age axis is cut into
//! fixed-width bins. For each bin the exposure (population integrated over the
//! bin, in disk-years when the axis is in years) and the number of new
//! failures are computed, and their ratio is the failure rate of the bin.

use afr_stats::{
    binning::{BinningError, bin_delta, bin_integral},
    series::{DomainError, DomainLimits, TimeSeries},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum DiscreteError {
    #[display("series do not share a usable domain")]
    #[from]
    Domain(DomainError),
    #[display("failed to aggregate series into bins")]
    #[from]
    Binning(BinningError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscreteConfig {
    pub bin_width: f64,
    /// Riemann-sum samples used to integrate the population over a bin.
    pub samples_per_bin: usize,
}

impl Default for DiscreteConfig {
    fn default() -> Self {
        Self {
            bin_width: 0.5,
            samples_per_bin: 10,
        }
    }
}

/// One row of the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateBin {
    pub left: f64,
    pub right: f64,
    /// Population integrated over the bin.
    pub exposure: f64,
    /// Failures that occurred inside the bin.
    pub failures: f64,
    /// `failures / exposure`; not finite for bins without exposure.
    pub rate: f64,
}

/// Failure rate per fixed-width bin over the common domain of both series.
///
/// # Examples
///
/// ```
/// use afr_analysis::discrete::{DiscreteConfig, discrete_failure_rates};
/// use afr_stats::series::TimeSeries;
///
/// let failures = TimeSeries::new(vec![0.0, 2.0], vec![0.0, 8.0]).unwrap();
/// let population = TimeSeries::new(vec![0.0, 2.0], vec![100.0, 100.0]).unwrap();
///
/// let table = discrete_failure_rates(&failures, &population, &DiscreteConfig::default()).unwrap();
/// assert_eq!(table.len(), 4);
/// for bin in &table {
///     assert!((bin.exposure - 50.0).abs() < 1e-9);
///     assert!((bin.failures - 2.0).abs() < 1e-9);
///     assert!((bin.rate - 0.04).abs() < 1e-9);
/// }
/// ```
pub fn discrete_failure_rates(
    failures: &TimeSeries,
    population: &TimeSeries,
    config: &DiscreteConfig,
) -> Result<Vec<RateBin>, DiscreteError> {
    let limits = DomainLimits::intersection(failures.domain(), population.domain())?;
    tracing::debug!(
        %limits,
        bin_width = config.bin_width,
        samples_per_bin = config.samples_per_bin,
        "computing discrete failure rates"
    );

    let exposure = bin_integral(
        population,
        config.bin_width,
        config.samples_per_bin,
        Some(limits),
    )?;
    let deltas = bin_delta(failures, config.bin_width, Some(limits))?;

    let table = exposure
        .iter()
        .zip(&deltas)
        .map(|(exposure, delta)| RateBin {
            left: exposure.left,
            right: exposure.right,
            exposure: exposure.value,
            failures: delta.value,
            rate: delta.value / exposure.value,
        })
        .collect::<Vec<_>>();

    let empty = table.iter().filter(|bin| !bin.rate.is_finite()).count();
    if empty > 0 {
        tracing::warn!(empty, "some bins have no exposure; their rate is undefined");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(xs: &[f64], ys: &[f64]) -> TimeSeries {
        TimeSeries::new(xs.to_vec(), ys.to_vec()).unwrap()
    }

    #[test]
    fn test_bins_follow_common_domain() {
        let failures = series(&[0.0, 3.0], &[0.0, 30.0]);
        let population = series(&[0.2, 2.0, 5.0], &[200.0, 200.0, 100.0]);
        let config = DiscreteConfig {
            bin_width: 1.0,
            samples_per_bin: 100,
        };

        let table = discrete_failure_rates(&failures, &population, &config).unwrap();
        // domain [0.2, 3.0], first edge snapped to 0.0
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].left, 0.0);
        assert_eq!(table[2].right, 3.0);
        // first bin only counts failures from 0.2 on
        assert!((table[0].failures - 8.0).abs() < 1e-9);
        assert!((table[0].exposure - 160.0).abs() < 1e-9);
        assert!((table[0].rate - 0.05).abs() < 1e-9);

        let total: f64 = table.iter().map(|bin| bin.failures).sum();
        assert!((total - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_exposure_rate_is_not_finite() {
        let failures = series(&[0.0, 2.0], &[0.0, 1.0]);
        let population = series(&[0.0, 1.0, 2.0], &[0.0, 0.0, 0.0]);
        let table =
            discrete_failure_rates(&failures, &population, &DiscreteConfig::default()).unwrap();
        assert!(table.iter().all(|bin| !bin.rate.is_finite()));
    }

    #[test]
    fn test_invalid_width() {
        let failures = series(&[0.0, 2.0], &[0.0, 1.0]);
        let config = DiscreteConfig {
            bin_width: 0.0,
            ..DiscreteConfig::default()
        };
        assert!(matches!(
            discrete_failure_rates(&failures, &failures, &config),
            Err(DiscreteError::Binning(BinningError::InvalidWidth { .. }))
        ));
    }
}
