//! Weighted nonlinear least-squares fitting of hazard functions.
//!
//! [`fit_distribution`] finds the shape and scale of a [`Family`] whose hazard
//! `h(x) = pdf(x) / sf(x)` best matches empirical `(x, y)` points, minimising
//!
//! - `Σ ((h(x_i) - y_i) / σ_i)²` on the [`FitScale::Linear`] scale, or
//! - `Σ ((ln h(x_i) - ln y_i) / σ_i)²` on the [`FitScale::Log`] scale, which
//!   keeps the largest rates from dominating the fit.
//!
//! The minimiser is Levenberg-Marquardt over `ln(shape)` and `ln(scale)`, so
//! both parameters stay positive without constraints. Parameter covariance is
//! `s² (JᵀJ)⁻¹` with `s² = cost / (n - 2)`, mapped back to `(shape, scale)`
//! with the delta method. Standard errors are the square roots of its
//! diagonal.
//!
//! Points with a non-positive or non-finite `y` are dropped before fitting.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::distribution::{Family, InvalidParams, LifetimeDistribution, Params, UnsupportedFamily};

const INITIAL_DAMPING: f64 = 1e-3;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e16;
const MIN_DIAGONAL: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum FitError {
    #[display("cannot fit an unknown distribution family")]
    #[from]
    UnsupportedFamily(UnsupportedFamily),
    #[display("{family} fit: x and y columns differ in length ({xs_len} vs {ys_len})")]
    LengthMismatch {
        family: Family,
        xs_len: usize,
        ys_len: usize,
    },
    #[display("{family} fit: {sigma_len} uncertainties given for {len} points")]
    SigmaLengthMismatch {
        family: Family,
        len: usize,
        sigma_len: usize,
    },
    #[display("{family} fit needs at least 3 usable points, got {points}")]
    InsufficientData { family: Family, points: usize },
    #[display("{family} fit: residuals are not finite at the initial parameters")]
    NonFiniteResiduals { family: Family },
    #[display("{family} fit did not converge within {iterations} iterations")]
    NotConverged { family: Family, iterations: usize },
    #[display("{family} fit: Jacobian is singular, parameter covariance is undefined")]
    SingularJacobian { family: Family },
}

/// Residual scale used by the fitter.
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
#[serde(rename_all = "lowercase")]
pub enum FitScale {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    pub scale: FitScale,
    pub max_iterations: usize,
    /// Relative tolerance on the parameter step and on the cost reduction.
    pub tolerance: f64,
    /// Starting point; defaults to `shape = 1`, `scale = max(x)`.
    pub initial: Option<Params>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            scale: FitScale::Linear,
            max_iterations: 200,
            tolerance: 1e-10,
            initial: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub family: Family,
    pub params: Params,
    /// One standard deviation of each parameter.
    pub std_errors: Params,
    /// Covariance of `(shape, scale)`.
    pub covariance: [[f64; 2]; 2],
    /// `Σ ((h(x_i) - y_i) / σ_i)²` over the fitted points, linear scale.
    pub chi_squared: f64,
    /// Number of points the fit used.
    pub points: usize,
    pub iterations: usize,
}

impl FitResult {
    pub fn distribution(&self) -> Result<LifetimeDistribution, InvalidParams> {
        self.family.distribution(self.params)
    }
}

/// Fits a family given by name.
///
/// An unknown name fails before any data is looked at.
///
/// ```
/// use afr_stats::fit::{FitError, FitOptions, fit_distribution_by_name};
///
/// let err = fit_distribution_by_name("exponential", &[1.0], &[1.0], None, &FitOptions::default())
///     .unwrap_err();
/// assert!(matches!(err, FitError::UnsupportedFamily(_)));
/// ```
pub fn fit_distribution_by_name(
    name: &str,
    xs: &[f64],
    ys: &[f64],
    sigma: Option<&[f64]>,
    options: &FitOptions,
) -> Result<FitResult, FitError> {
    let family = name.parse::<Family>()?;
    fit_distribution(family, xs, ys, sigma, options)
}

/// Fits the hazard function of `family` to the points `(xs, ys)`.
///
/// `sigma` holds one uncertainty per point; larger values weigh a point less.
/// Without it every point has unit uncertainty.
pub fn fit_distribution(
    family: Family,
    xs: &[f64],
    ys: &[f64],
    sigma: Option<&[f64]>,
    options: &FitOptions,
) -> Result<FitResult, FitError> {
    if xs.len() != ys.len() {
        return Err(FitError::LengthMismatch {
            family,
            xs_len: xs.len(),
            ys_len: ys.len(),
        });
    }
    if let Some(sigma) = sigma
        && sigma.len() != xs.len()
    {
        return Err(FitError::SigmaLengthMismatch {
            family,
            len: xs.len(),
            sigma_len: sigma.len(),
        });
    }

    let problem = Problem::new(family, options.scale, xs, ys, sigma);
    let dropped = xs.len() - problem.len();
    if dropped > 0 {
        tracing::debug!(%family, dropped, "dropped points unusable for fitting");
    }
    if problem.len() < 3 {
        return Err(FitError::InsufficientData {
            family,
            points: problem.len(),
        });
    }

    let initial = options.initial.unwrap_or_else(|| {
        let max_x = problem.xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Params {
            shape: 1.0,
            scale: if max_x > 0.0 { max_x } else { 1.0 },
        }
    });

    let (theta, iterations) = problem.minimize(initial, options)?;
    let params = params_of(&theta);
    let covariance = problem.covariance(&theta)?;
    let chi_squared = problem.chi_squared(params)?;

    tracing::debug!(
        %family,
        shape = params.shape,
        scale = params.scale,
        iterations,
        chi_squared,
        "fit converged"
    );

    Ok(FitResult {
        family,
        params,
        std_errors: Params {
            shape: covariance[0][0].sqrt(),
            scale: covariance[1][1].sqrt(),
        },
        covariance,
        chi_squared,
        points: problem.len(),
        iterations,
    })
}

fn params_of(theta: &DVector<f64>) -> Params {
    Params {
        shape: theta[0].exp(),
        scale: theta[1].exp(),
    }
}

#[derive(Debug)]
struct Problem {
    family: Family,
    scale: FitScale,
    xs: Vec<f64>,
    ys: Vec<f64>,
    sigma: Vec<f64>,
}

impl Problem {
    fn new(
        family: Family,
        scale: FitScale,
        xs: &[f64],
        ys: &[f64],
        sigma: Option<&[f64]>,
    ) -> Self {
        let mut problem = Self {
            family,
            scale,
            xs: Vec::with_capacity(xs.len()),
            ys: Vec::with_capacity(ys.len()),
            sigma: Vec::with_capacity(xs.len()),
        };
        for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            let s = sigma.map_or(1.0, |sigma| sigma[i]);
            if x.is_finite() && y.is_finite() && y > 0.0 && s.is_finite() && s > 0.0 {
                problem.xs.push(x);
                problem.ys.push(y);
                problem.sigma.push(s);
            }
        }
        problem
    }

    fn len(&self) -> usize {
        self.xs.len()
    }

    /// Weighted residuals at `theta`, or `None` if any is not finite.
    fn residuals(&self, theta: &DVector<f64>) -> Option<DVector<f64>> {
        let dist = self.family.distribution(params_of(theta)).ok()?;
        let mut residuals = DVector::zeros(self.len());
        for (i, ((&x, &y), &s)) in self.xs.iter().zip(&self.ys).zip(&self.sigma).enumerate() {
            let h = dist.hazard(x);
            let r = match self.scale {
                FitScale::Linear => (h - y) / s,
                FitScale::Log => (h.ln() - y.ln()) / s,
            };
            if !r.is_finite() {
                return None;
            }
            residuals[i] = r;
        }
        Some(residuals)
    }

    /// Forward-difference Jacobian of the residuals.
    fn jacobian(&self, theta: &DVector<f64>, residuals: &DVector<f64>) -> Option<DMatrix<f64>> {
        let mut jacobian = DMatrix::zeros(self.len(), theta.len());
        for k in 0..theta.len() {
            let step = f64::EPSILON.sqrt() * theta[k].abs().max(1.0);
            let mut shifted = theta.clone();
            shifted[k] += step;
            let column = (self.residuals(&shifted)? - residuals) / step;
            jacobian.set_column(k, &column);
        }
        Some(jacobian)
    }

    /// Levenberg-Marquardt iterations; returns the optimum in log-parameter
    /// space and the number of iterations taken.
    fn minimize(
        &self,
        initial: Params,
        options: &FitOptions,
    ) -> Result<(DVector<f64>, usize), FitError> {
        let family = self.family;
        let mut theta = DVector::from_vec(vec![initial.shape.ln(), initial.scale.ln()]);
        let mut residuals = self
            .residuals(&theta)
            .ok_or(FitError::NonFiniteResiduals { family })?;
        let mut cost = residuals.norm_squared();
        let mut damping = INITIAL_DAMPING;

        for iteration in 1..=options.max_iterations {
            let jacobian = self
                .jacobian(&theta, &residuals)
                .ok_or(FitError::NonFiniteResiduals { family })?;
            let jtj = jacobian.tr_mul(&jacobian);
            let gradient = jacobian.tr_mul(&residuals);

            let mut accepted = None;
            while damping <= MAX_DAMPING {
                let mut lhs = jtj.clone();
                for k in 0..lhs.nrows() {
                    lhs[(k, k)] += damping * jtj[(k, k)].max(MIN_DIAGONAL);
                }
                if let Some(cholesky) = lhs.cholesky() {
                    let step = cholesky.solve(&(-&gradient));
                    let candidate = &theta + &step;
                    if let Some(r) = self.residuals(&candidate) {
                        let candidate_cost = r.norm_squared();
                        if candidate_cost <= cost {
                            accepted = Some((candidate, r, candidate_cost, step));
                            damping = (damping / 10.0).max(MIN_DAMPING);
                            break;
                        }
                    }
                }
                damping *= 10.0;
            }

            // No downhill step exists at any damping: theta is a local minimum.
            let Some((candidate, r, candidate_cost, step)) = accepted else {
                return Ok((theta, iteration));
            };

            let tol = options.tolerance;
            let small_step = step.norm() <= tol * (theta.norm() + tol);
            let small_reduction = cost - candidate_cost <= tol * cost;
            tracing::trace!(%family, iteration, cost = candidate_cost, damping, "accepted step");

            theta = candidate;
            residuals = r;
            cost = candidate_cost;
            if small_step || small_reduction {
                return Ok((theta, iteration));
            }
        }

        Err(FitError::NotConverged {
            family,
            iterations: options.max_iterations,
        })
    }

    /// Covariance of `(shape, scale)` at the optimum `theta`.
    fn covariance(&self, theta: &DVector<f64>) -> Result<[[f64; 2]; 2], FitError> {
        let family = self.family;
        let residuals = self
            .residuals(theta)
            .ok_or(FitError::NonFiniteResiduals { family })?;
        let jacobian = self
            .jacobian(theta, &residuals)
            .ok_or(FitError::NonFiniteResiduals { family })?;
        let inverse = jacobian
            .tr_mul(&jacobian)
            .try_inverse()
            .filter(|m| m.iter().all(|v| v.is_finite()))
            .ok_or(FitError::SingularJacobian { family })?;

        #[expect(clippy::cast_precision_loss)]
        let dof = (self.len() - theta.len()) as f64;
        let variance = residuals.norm_squared() / dof;

        // d(param)/d(theta) = param, since param = exp(theta)
        let params = params_of(theta);
        let d = [params.shape, params.scale];
        let mut covariance = [[0.0; 2]; 2];
        for (i, row) in covariance.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = d[i] * inverse[(i, j)] * d[j] * variance;
            }
        }
        Ok(covariance)
    }

    fn chi_squared(&self, params: Params) -> Result<f64, FitError> {
        let dist = self
            .family
            .distribution(params)
            .map_err(|_| FitError::NonFiniteResiduals {
                family: self.family,
            })?;
        Ok(self
            .xs
            .iter()
            .zip(&self.ys)
            .zip(&self.sigma)
            .map(|((&x, &y), &s)| ((dist.hazard(x) - y) / s).powi(2))
            .sum())
    }
}
