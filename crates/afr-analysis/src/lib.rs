//! Failure-rate analysis of device populations.
//!
//! The inputs are two series over device age: the cumulative number of
//! failures and the number of devices observed. From them this crate derives
//!
//! - a smoothed **hazard curve** (instantaneous failure rate over age),
//! - a **binned rate table** (failures per disk-year in fixed-width age bins),
//! - **parametric fits** of Weibull, gamma and log-normal hazards to the curve,
//! - whole-dataset **summary statistics** (disk-years, mean AFR).
//!
//! # Workflow
//!
//! 1. **Load** both series ([`io::read_series`]) and convert the age axis to
//!    years ([`unit::AgeUnit`])
//! 2. **Estimate** the hazard curve ([`hazard::compute_hazard_curve`])
//! 3. **Fit** a lifetime distribution to it ([`fitting::fit_hazard_curve`])
//!
//! Independently, [`discrete::discrete_failure_rates`] and
//! [`summary::summary_statistics`] work on the raw series.
//!
//! # Modules
//!
//! - [`hazard`]: hazard-rate estimation and its configuration
//! - [`discrete`]: binned failure-rate table
//! - [`fitting`]: weighting and subsampling around the distribution fitter
//! - [`summary`]: disk-years, failure count, mean AFR
//! - [`io`]: two-column CSV series files
//! - [`unit`]: age units
//!
//! # Examples
//!
//! ```
//! use afr_analysis::{
//!     fitting::{Weighting, fit_hazard_curve},
//!     hazard::{HazardConfig, compute_hazard_curve},
//! };
//! use afr_stats::{distribution::Family, fit::FitOptions, series::TimeSeries};
//!
//! // 1000 drives over ten years, failing at 3% per year
//! let xs = (0..=100).map(|i| f64::from(i) * 0.1).collect::<Vec<_>>();
//! let failures = TimeSeries::new(xs.clone(), xs.iter().map(|x| 30.0 * x).collect()).unwrap();
//! let population = TimeSeries::new(xs, vec![1000.0; 101]).unwrap();
//!
//! let curve = compute_hazard_curve(&failures, &population, &HazardConfig::default()).unwrap();
//! assert!(curve.hazard.iter().all(|h| (h - 0.03).abs() < 1e-6));
//!
//! // a constant hazard is a Weibull with shape 1
//! let fit = fit_hazard_curve(&curve, Family::Weibull, Weighting::Uncertainty, &FitOptions::default())
//!     .unwrap();
//! assert!((fit.params.shape - 1.0).abs() < 1e-3);
//! ```

pub mod discrete;
pub mod fitting;
pub mod hazard;
pub mod io;
pub mod summary;
pub mod unit;
