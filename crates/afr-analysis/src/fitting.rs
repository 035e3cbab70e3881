//! Fitting lifetime distributions to an estimated hazard curve.
//!
//! A [`HazardCurve`] holds thousands of grid points of very unequal quality:
//! where few devices were observed, the smoothed rate is little more than
//! noise. Two weighting strategies account for that:
//!
//! - [`Weighting::Uncertainty`]: every point gets an uncertainty
//!   `σ = 1 / sqrt(P / max(P))` from its population `P`, so sparsely observed
//!   points pull less on the fit.
//! - [`Weighting::Subsample`]: at most `max_points` points are drawn without
//!   replacement with probability proportional to their population, and the
//!   sample is fitted unweighted.
//!
//! Points with a non-positive or non-finite hazard, or a non-positive
//! population, are removed before either strategy runs.

use afr_stats::{
    distribution::Family,
    fit::{FitError, FitOptions, FitResult, fit_distribution},
};
use rand::{SeedableRng as _, distr::weighted::Error as WeightError, seq::index};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::hazard::HazardCurve;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum FittingError {
    #[display("failed to fit a distribution to the hazard curve")]
    #[from]
    Fit(FitError),
    #[display("failed to draw a population-weighted subsample")]
    #[from]
    Subsample(WeightError),
}

/// How hazard points are weighted in the fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Weighting {
    /// Every point counts equally.
    None,
    /// Uncertainty derived from the relative population.
    #[default]
    Uncertainty,
    /// Population-weighted random subsample, fitted unweighted.
    Subsample { max_points: usize, seed: u64 },
}

/// Hazard points usable for fitting, with the population behind each one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitPoints {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub weights: Vec<f64>,
}

impl FitPoints {
    /// Keeps the points of `curve` with a positive, finite hazard and a
    /// positive population.
    #[must_use]
    pub fn from_curve(curve: &HazardCurve) -> Self {
        let mut points = Self::default();
        for ((&x, &y), &weight) in curve.xs.iter().zip(&curve.hazard).zip(&curve.population) {
            if y.is_finite() && y > 0.0 && weight.is_finite() && weight > 0.0 {
                points.xs.push(x);
                points.ys.push(y);
                points.weights.push(weight);
            }
        }
        points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Draws at most `max_points` points without replacement, each with
    /// probability proportional to its weight. The draw keeps x order.
    ///
    /// ```
    /// use afr_analysis::fitting::FitPoints;
    ///
    /// let points = FitPoints {
    ///     xs: vec![1.0, 2.0, 3.0, 4.0],
    ///     ys: vec![0.1, 0.2, 0.3, 0.4],
    ///     weights: vec![1.0, 1.0, 1.0, 1.0],
    /// };
    /// let sample = points.weighted_subsample(2, 42).unwrap();
    /// assert_eq!(sample.len(), 2);
    /// assert!(sample.xs[0] < sample.xs[1]);
    /// ```
    pub fn weighted_subsample(&self, max_points: usize, seed: u64) -> Result<Self, WeightError> {
        if max_points >= self.len() {
            return Ok(self.clone());
        }
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut indices =
            index::sample_weighted(&mut rng, self.len(), |i| self.weights[i], max_points)?
                .into_vec();
        indices.sort_unstable();

        Ok(Self {
            xs: indices.iter().map(|&i| self.xs[i]).collect(),
            ys: indices.iter().map(|&i| self.ys[i]).collect(),
            weights: indices.iter().map(|&i| self.weights[i]).collect(),
        })
    }
}

/// Uncertainty of each point from its weight: `1 / sqrt(w / max(w))`.
///
/// The best-observed point gets `σ = 1`; a point with a quarter of its
/// weight gets `σ = 2`.
///
/// ```
/// use afr_analysis::fitting::sigma_from_weights;
///
/// assert_eq!(sigma_from_weights(&[16.0, 4.0, 1.0]), vec![1.0, 2.0, 4.0]);
/// ```
#[must_use]
pub fn sigma_from_weights(weights: &[f64]) -> Vec<f64> {
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    weights.iter().map(|w| 1.0 / (w / max).sqrt()).collect()
}

/// Fits `family` to the usable points of `curve`.
pub fn fit_hazard_curve(
    curve: &HazardCurve,
    family: Family,
    weighting: Weighting,
    options: &FitOptions,
) -> Result<FitResult, FittingError> {
    let points = FitPoints::from_curve(curve);
    let dropped = curve.len() - points.len();
    if dropped > 0 {
        tracing::warn!(
            %family,
            dropped,
            total = curve.len(),
            "ignoring hazard points without a positive rate and population"
        );
    }

    let result = match weighting {
        Weighting::None => fit_distribution(family, &points.xs, &points.ys, None, options)?,
        Weighting::Uncertainty => {
            let sigma = sigma_from_weights(&points.weights);
            fit_distribution(family, &points.xs, &points.ys, Some(sigma.as_slice()), options)?
        }
        Weighting::Subsample { max_points, seed } => {
            let sample = points.weighted_subsample(max_points, seed)?;
            tracing::debug!(%family, points = sample.len(), seed, "fitting subsample");
            fit_distribution(family, &sample.xs, &sample.ys, None, options)?
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use afr_stats::{distribution::Params, series::DomainLimits};

    use super::*;

    /// A noise-free Weibull hazard curve with a population that shrinks
    /// with age.
    fn weibull_curve(len: u32) -> HazardCurve {
        let dist = Family::Weibull
            .distribution(Params {
                shape: 2.0,
                scale: 10.0,
            })
            .unwrap();
        let xs = (1..=len)
            .map(|i| f64::from(i) * 15.0 / f64::from(len))
            .collect::<Vec<_>>();
        let hazard = xs.iter().map(|&x| dist.hazard(x)).collect::<Vec<_>>();
        let population = xs.iter().map(|x| 1000.0 - 60.0 * x).collect::<Vec<_>>();
        let failure_rate = hazard.iter().zip(&population).map(|(h, p)| h * p).collect();
        HazardCurve {
            limits: DomainLimits {
                min: xs[0],
                max: 15.0,
            },
            cumulative_failures: vec![0.0; xs.len()],
            xs,
            failure_rate,
            population,
            hazard,
        }
    }

    #[test]
    fn test_from_curve_drops_unusable_points() {
        let mut curve = weibull_curve(10);
        curve.hazard[0] = 0.0;
        curve.hazard[1] = -0.1;
        curve.hazard[2] = f64::INFINITY;
        curve.population[3] = 0.0;
        curve.hazard[4] = f64::NAN;

        let points = FitPoints::from_curve(&curve);
        assert_eq!(points.len(), 5);
        assert_eq!(points.xs, curve.xs[5..].to_vec());
    }

    #[test]
    fn test_sigma_of_best_point_is_one() {
        let sigma = sigma_from_weights(&[3.0, 12.0, 0.75]);
        assert_eq!(sigma, vec![2.0, 1.0, 4.0]);
    }

    #[test]
    fn test_subsample_is_reproducible() {
        let points = FitPoints::from_curve(&weibull_curve(300));
        let a = points.weighted_subsample(50, 7).unwrap();
        let b = points.weighted_subsample(50, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert!(a.xs.windows(2).all(|w| w[0] < w[1]));
        assert!(a.xs.iter().all(|x| points.xs.contains(x)));

        let all = points.weighted_subsample(1000, 7).unwrap();
        assert_eq!(all, points);
    }

    #[test]
    fn test_fit_with_uncertainty() {
        let curve = weibull_curve(400);
        let fit = fit_hazard_curve(
            &curve,
            Family::Weibull,
            Weighting::Uncertainty,
            &FitOptions::default(),
        )
        .unwrap();
        assert!((fit.params.shape - 2.0).abs() < 0.02);
        assert!((fit.params.scale - 10.0).abs() < 0.1);
        assert_eq!(fit.points, 400);
    }

    #[test]
    fn test_fit_with_subsample() {
        let curve = weibull_curve(400);
        let fit = fit_hazard_curve(
            &curve,
            Family::Weibull,
            Weighting::Subsample {
                max_points: 60,
                seed: 1,
            },
            &FitOptions::default(),
        )
        .unwrap();
        assert_eq!(fit.points, 60);
        assert!((fit.params.shape - 2.0).abs() < 0.02);
        assert!((fit.params.scale - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_fit_reports_family_on_failure() {
        let mut curve = weibull_curve(10);
        for h in &mut curve.hazard {
            *h = 0.0;
        }
        let err = fit_hazard_curve(&curve, Family::LogNorm, Weighting::None, &FitOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            FittingError::Fit(FitError::InsufficientData {
                family: Family::LogNorm,
                points: 0
            })
        );
    }

    #[test]
    fn test_error_chain_has_distinct_messages() {
        let err = FittingError::Fit(FitError::NotConverged {
            family: Family::Gamma,
            iterations: 5,
        });
        let mut messages = vec![err.to_string()];
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            messages.push(inner.to_string());
            source = inner.source();
        }
        assert_eq!(
            messages,
            [
                "failed to fit a distribution to the hazard curve",
                "gamma fit did not converge within 5 iterations",
            ]
        );
    }

    #[test]
    fn test_weighting_from_json() {
        let weighting: Weighting =
            serde_json::from_str(r#"{ "kind": "subsample", "max_points": 500, "seed": 3 }"#)
                .unwrap();
        assert_eq!(
            weighting,
            Weighting::Subsample {
                max_points: 500,
                seed: 3
            }
        );
    }
}
