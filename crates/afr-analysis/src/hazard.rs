//! Smoothed hazard-rate estimation from cumulative failures and population.
//!
//! The hazard rate at age `x` is the rate of new failures divided by the
//! number of devices at risk:
//!
//! ```text
//! h(x) = (dF/dx)(x) / P(x)
//! ```
//!
//! where `F` is the cumulative failure count and `P` the observed population.
//! Both inputs are irregularly sampled and noisy, so [`compute_hazard_curve`]
//!
//! 1. intersects the x-ranges of the two series (optionally floored at
//!    [`HazardConfig::min_x`]),
//! 2. lays one uniform [`Grid`] of [`HazardConfig::num_samples`] points over
//!    that common domain,
//! 3. resamples `F` onto the grid, then smooths and differentiates it with a
//!    Savitzky-Golay filter,
//! 4. resamples and smooths `P` on the same grid,
//! 5. divides point by point.
//!
//! Every array of the resulting [`HazardCurve`] is aligned with the same grid.
//!
//! Grid points where the smoothed population is zero yield non-finite hazard
//! values. They are kept in the curve and reported with a warning; consumers
//! that fit the curve drop them.

use afr_stats::{
    interpolation::{InterpolationError, resample},
    savgol::{SavitzkyGolay, SmoothingError},
    series::{DomainError, DomainLimits, Grid, TimeSeries},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum HazardError {
    #[display("at least 2 grid samples are required, got {num_samples}")]
    TooFewSamples { num_samples: usize },
    #[display("window size {window_size} exceeds the number of grid samples {num_samples}")]
    WindowExceedsSamples {
        window_size: usize,
        num_samples: usize,
    },
    #[display("common domain {limits} has zero width")]
    EmptyDomain { limits: DomainLimits },
    #[display("invalid smoothing parameters")]
    #[from]
    Smoothing(SmoothingError),
    #[display("series do not share a usable domain")]
    #[from]
    Domain(DomainError),
    #[display("failed to resample series onto the grid")]
    #[from]
    Interpolation(InterpolationError),
}

/// How the per-index derivative is converted to a per-unit-x derivative.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::FromStr,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeSpacing {
    /// Divide by the grid step `(max - min) / (num_samples - 1)`.
    #[default]
    GridStep,
    /// Divide by `(max - min) / num_samples`, which underestimates the
    /// derivative by a factor `(num_samples - 1) / num_samples`.
    SampleCount,
}

/// Parameters of the hazard estimator.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use afr_analysis::hazard::HazardConfig;
///
/// let config: HazardConfig = serde_json::from_str(r#"{ "window_size": 101 }"#).unwrap();
/// assert_eq!(config.window_size, 101);
/// assert_eq!(config.num_samples, 2000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HazardConfig {
    /// Points in the uniform grid; at least 2.
    pub num_samples: usize,
    /// Savitzky-Golay window; odd and at most `num_samples`.
    pub window_size: usize,
    /// Degree of the local polynomial; less than `window_size`.
    pub poly_order: usize,
    /// Lower bound applied to the common domain.
    pub min_x: Option<f64>,
    pub derivative_spacing: DerivativeSpacing,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            num_samples: 2000,
            window_size: 169,
            poly_order: 3,
            min_x: None,
            derivative_spacing: DerivativeSpacing::GridStep,
        }
    }
}

impl HazardConfig {
    /// Checks the parameters and builds the smoothing filter they describe.
    pub fn validate(&self) -> Result<SavitzkyGolay, HazardError> {
        if self.num_samples < 2 {
            return Err(HazardError::TooFewSamples {
                num_samples: self.num_samples,
            });
        }
        let filter = SavitzkyGolay::new(self.window_size, self.poly_order)?;
        if self.window_size > self.num_samples {
            return Err(HazardError::WindowExceedsSamples {
                window_size: self.window_size,
                num_samples: self.num_samples,
            });
        }
        Ok(filter)
    }

    #[expect(clippy::cast_precision_loss)]
    fn derivative_delta(&self, grid: &Grid) -> f64 {
        match self.derivative_spacing {
            DerivativeSpacing::GridStep => grid.step(),
            DerivativeSpacing::SampleCount => grid.limits().width() / grid.len() as f64,
        }
    }
}

/// A hazard-rate estimate and the intermediate series it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardCurve {
    pub limits: DomainLimits,
    /// Grid points shared by all other columns.
    pub xs: Vec<f64>,
    /// Smoothed cumulative failures.
    pub cumulative_failures: Vec<f64>,
    /// Smoothed derivative of cumulative failures, failures per unit x.
    pub failure_rate: Vec<f64>,
    /// Smoothed population at risk.
    pub population: Vec<f64>,
    /// `failure_rate / population`
    pub hazard: Vec<f64>,
}

impl HazardCurve {
    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Number of grid points with a non-finite hazard value.
    #[must_use]
    pub fn non_finite_count(&self) -> usize {
        self.hazard.iter().filter(|h| !h.is_finite()).count()
    }
}

/// Estimates the hazard rate of a population.
///
/// # Arguments
///
/// * `failures` - Cumulative failure count over age
/// * `population` - Observed population over age
/// * `config` - Grid size, smoothing window and polynomial order
///
/// # Examples
///
/// ```
/// use afr_analysis::hazard::{HazardConfig, compute_hazard_curve};
/// use afr_stats::series::TimeSeries;
///
/// let failures = TimeSeries::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 3.0, 6.0]).unwrap();
/// let population =
///     TimeSeries::new(vec![0.0, 1.0, 2.0, 3.0], vec![100.0, 100.0, 90.0, 80.0]).unwrap();
/// let config = HazardConfig {
///     num_samples: 4,
///     window_size: 3,
///     poly_order: 2,
///     ..HazardConfig::default()
/// };
///
/// let curve = compute_hazard_curve(&failures, &population, &config).unwrap();
/// assert_eq!(curve.xs, vec![0.0, 1.0, 2.0, 3.0]);
/// assert!((curve.hazard[2] - 2.5 / 90.0).abs() < 1e-9);
/// ```
pub fn compute_hazard_curve(
    failures: &TimeSeries,
    population: &TimeSeries,
    config: &HazardConfig,
) -> Result<HazardCurve, HazardError> {
    let filter = config.validate()?;

    let mut limits = DomainLimits::intersection(failures.domain(), population.domain())?;
    if let Some(floor) = config.min_x {
        limits = limits.floored(floor)?;
    }
    if limits.width() <= 0.0 {
        return Err(HazardError::EmptyDomain { limits });
    }

    let grid = Grid::linspace(limits, config.num_samples);
    tracing::debug!(
        %limits,
        num_samples = grid.len(),
        window_size = config.window_size,
        poly_order = config.poly_order,
        "computing hazard curve"
    );

    let resampled_failures = resample(failures, grid.points())?;
    let cumulative_failures = filter.smooth(&resampled_failures)?;
    let failure_rate = filter.derivative(&resampled_failures, config.derivative_delta(&grid))?;

    let resampled_population = resample(population, grid.points())?;
    let population = filter.smooth(&resampled_population)?;

    let hazard = failure_rate
        .iter()
        .zip(&population)
        .map(|(rate, pop)| rate / pop)
        .collect::<Vec<_>>();

    let curve = HazardCurve {
        limits,
        xs: grid.into_points(),
        cumulative_failures,
        failure_rate,
        population,
        hazard,
    };

    let non_finite = curve.non_finite_count();
    if non_finite > 0 {
        tracing::warn!(
            non_finite,
            total = curve.len(),
            "population is zero at some grid points; hazard is undefined there"
        );
    }

    Ok(curve)
}
