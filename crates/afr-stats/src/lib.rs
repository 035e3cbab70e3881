//! Numeric building blocks for failure-rate estimation.
//!
//! This crate knows nothing about disks. It provides the primitives the
//! analysis pipeline is built from:
//!
//! - **Series and grids**: sampled `(x, y)` series, domain intersection and
//!   uniform grids over a domain
//! - **Resampling**: piecewise-linear interpolation onto arbitrary query points
//! - **Smoothing**: Savitzky-Golay smoothing and first derivatives
//! - **Integration**: trapezoidal integration of sampled series
//! - **Binning**: fixed-width exposure integrals and count deltas per bin
//! - **Lifetime distributions**: Weibull, gamma and log-normal densities,
//!   survival and hazard functions
//! - **Fitting**: weighted nonlinear least squares of hazard functions
//!
//! # Modules
//!
//! - [`series`]: [`series::TimeSeries`], [`series::DomainLimits`], [`series::Grid`]
//! - [`interpolation`]: linear interpolation and resampling
//! - [`savgol`]: Savitzky-Golay filter
//! - [`integrate`]: trapezoidal rule
//! - [`binning`]: bin layout, [`binning::bin_integral`] and [`binning::bin_delta`]
//! - [`distribution`]: lifetime distribution families
//! - [`fit`]: Levenberg-Marquardt hazard fitting
//!
//! # Examples
//!
//! ## Smoothing a resampled series
//!
//! ```
//! use afr_stats::{
//!     interpolation::resample,
//!     savgol::SavitzkyGolay,
//!     series::{Grid, TimeSeries},
//! };
//!
//! let series = TimeSeries::new(vec![0.0, 1.0, 4.0], vec![0.0, 2.0, 8.0]).unwrap();
//! let grid = Grid::linspace(series.domain(), 9);
//! let ys = resample(&series, grid.points()).unwrap();
//!
//! let filter = SavitzkyGolay::new(3, 1).unwrap();
//! let slope = filter.derivative(&ys, grid.step()).unwrap();
//! assert!(slope.iter().all(|d| (d - 2.0).abs() < 1e-9));
//! ```
//!
//! ## Evaluating a hazard function
//!
//! ```
//! use afr_stats::distribution::{Family, Function, Params, evaluate_distribution};
//!
//! let params = Params { shape: 2.0, scale: 10.0 };
//! let hazard = evaluate_distribution(Family::Weibull, params, Function::Hazard, &[10.0]).unwrap();
//! assert!((hazard[0] - 0.2).abs() < 1e-12);
//! ```

pub mod binning;
pub mod distribution;
pub mod fit;
pub mod integrate;
pub mod interpolation;
pub mod savgol;
pub mod series;
