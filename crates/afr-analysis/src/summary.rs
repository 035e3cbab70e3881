//! Whole-dataset summary figures.
//!
//! These are coarse aggregates over the raw series: no resampling onto a
//! common grid and no smoothing.

use afr_stats::{
    integrate::trapezoid,
    interpolation::{InterpolationError, LinearInterpolator},
    series::{Grid, TimeSeries},
};
use serde::Serialize;

use crate::unit::AgeUnit;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistics {
    /// Population integrated over the observed age range, in disk-years.
    pub disk_years: f64,
    /// Last value of the cumulative failure series.
    pub failure_count: f64,
    /// `failure_count / disk_years`, in percent per year.
    pub mean_afr: f64,
    /// Span of the population's age axis, in years.
    pub observed_years: f64,
    /// Mean population over the observed age range.
    pub mean_population: f64,
}

/// Total exposure of a population, in disk-years.
///
/// ```
/// use afr_analysis::{summary::total_exposure, unit::AgeUnit};
/// use afr_stats::series::TimeSeries;
///
/// let population = TimeSeries::new(vec![0.0, 2.0 * 8760.0], vec![50.0, 50.0]).unwrap();
/// assert!((total_exposure(&population, AgeUnit::Hours) - 100.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn total_exposure(population: &TimeSeries, unit: AgeUnit) -> f64 {
    let years = population
        .xs()
        .iter()
        .map(|&x| unit.to_years(x))
        .collect::<Vec<_>>();
    trapezoid(&years, population.ys())
}

/// Summarises a failure series and the population it was observed on.
///
/// `unit` is the unit of both series' x axes.
pub fn summary_statistics(
    failures: &TimeSeries,
    population: &TimeSeries,
    unit: AgeUnit,
) -> Result<SummaryStatistics, InterpolationError> {
    let disk_years = total_exposure(population, unit);
    let failure_count = failures.last_y();
    let mean_afr = failure_count / disk_years * 100.0;
    if !mean_afr.is_finite() {
        tracing::warn!(disk_years, failure_count, "mean AFR is undefined");
    }

    let domain = population.domain();
    let grid = Grid::linspace(domain, population.len());
    let sampled = LinearInterpolator::new(population).at_all(grid.points())?;
    #[expect(clippy::cast_precision_loss)]
    let mean_population = sampled.iter().sum::<f64>() / sampled.len() as f64;

    Ok(SummaryStatistics {
        disk_years,
        failure_count,
        mean_afr,
        observed_years: unit.to_years(domain.width()),
        mean_population,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::HOURS_PER_YEAR;

    #[test]
    fn test_one_year_of_hundred_disks() {
        let failures = TimeSeries::new(vec![0.0, 4000.0, 8760.0], vec![0.0, 4.0, 10.0]).unwrap();
        let population = TimeSeries::new(vec![0.0, 8760.0], vec![100.0, 100.0]).unwrap();

        let summary = summary_statistics(&failures, &population, AgeUnit::Hours).unwrap();
        assert!((summary.disk_years - 100.0).abs() < 1e-9);
        assert_eq!(summary.failure_count, 10.0);
        assert!((summary.mean_afr - 10.0).abs() < 1e-9);
        assert!((summary.observed_years - 1.0).abs() < 1e-12);
        assert!((summary.mean_population - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_population_over_uneven_rows() {
        let population = TimeSeries::new(vec![0.0, 1.0, 4.0], vec![0.0, 10.0, 40.0]).unwrap();
        let failures = TimeSeries::new(vec![0.0, 4.0], vec![0.0, 2.0]).unwrap();

        let summary = summary_statistics(&failures, &population, AgeUnit::Years).unwrap();
        // sampled at 0, 2, 4 -> 0, 20, 40
        assert!((summary.mean_population - 20.0).abs() < 1e-9);
        assert!((summary.disk_years - 80.0).abs() < 1e-9);
        assert!((summary.mean_afr - 2.5).abs() < 1e-9);
        assert_eq!(summary.observed_years, 4.0);
    }

    #[test]
    fn test_exposure_in_hours() {
        let population =
            TimeSeries::new(vec![HOURS_PER_YEAR, 3.0 * HOURS_PER_YEAR], vec![10.0, 30.0]).unwrap();
        assert!((total_exposure(&population, AgeUnit::Hours) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_exposure() {
        let population = TimeSeries::new(vec![0.0, 10.0], vec![0.0, 0.0]).unwrap();
        let failures = TimeSeries::new(vec![0.0, 10.0], vec![0.0, 1.0]).unwrap();
        let summary = summary_statistics(&failures, &population, AgeUnit::Years).unwrap();
        assert!(summary.mean_afr.is_infinite());
    }
}
