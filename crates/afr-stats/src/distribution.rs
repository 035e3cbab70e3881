//! Parametric lifetime distributions and their hazard functions.
//!
//! Three two-parameter families are supported, each described by a `shape`
//! and a `scale` parameter using the conventional lifetime parameterisation:
//!
//! | Family    | shape              | scale                      |
//! |-----------|--------------------|----------------------------|
//! | `weibull` | `k`                | `λ`                        |
//! | `gamma`   | `α`                | `θ` (= 1 / rate)           |
//! | `lognorm` | `σ` of `ln(X)`     | `exp(μ)`, the median       |
//!
//! The hazard (instantaneous failure rate) of a distribution is
//! `h(x) = pdf(x) / sf(x)`, where `sf = 1 - cdf` is the survival function.
//!
//! # Examples
//!
//! ```
//! use afr_stats::distribution::{Family, Params};
//!
//! let family: Family = "weibull".parse().unwrap();
//! let dist = family.distribution(Params { shape: 2.0, scale: 10.0 }).unwrap();
//!
//! // Weibull hazard: (k / λ) (x / λ)^(k - 1)
//! assert!((dist.hazard(5.0) - 0.1).abs() < 1e-12);
//! assert!("exponential".parse::<Family>().is_err());
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Gamma, LogNormal, Weibull};

/// Error returned when a family name is not one of the supported families.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unsupported distribution family '{name}' (expected one of: weibull, gamma, lognorm)")]
pub struct UnsupportedFamily {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("invalid {family} parameters: {params}")]
pub struct InvalidParams {
    pub family: Family,
    pub params: Params,
}

/// Supported lifetime distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Weibull,
    Gamma,
    #[serde(rename = "lognorm")]
    LogNorm,
}

const FAMILY_NAMES: [(&str, Family); 3] = [
    ("weibull", Family::Weibull),
    ("gamma", Family::Gamma),
    ("lognorm", Family::LogNorm),
];

impl Family {
    pub const ALL: [Family; 3] = [Family::Weibull, Family::Gamma, Family::LogNorm];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Family::Weibull => "weibull",
            Family::Gamma => "gamma",
            Family::LogNorm => "lognorm",
        }
    }

    /// Instantiates the distribution with the given parameters.
    ///
    /// Both parameters must be positive and finite.
    pub fn distribution(self, params: Params) -> Result<LifetimeDistribution, InvalidParams> {
        let invalid = || InvalidParams {
            family: self,
            params,
        };
        if !(params.shape.is_finite()
            && params.shape > 0.0
            && params.scale.is_finite()
            && params.scale > 0.0)
        {
            return Err(invalid());
        }

        let inner = match self {
            Family::Weibull => {
                Inner::Weibull(Weibull::new(params.shape, params.scale).map_err(|_| invalid())?)
            }
            Family::Gamma => {
                Inner::Gamma(Gamma::new(params.shape, 1.0 / params.scale).map_err(|_| invalid())?)
            }
            Family::LogNorm => Inner::LogNorm(
                LogNormal::new(params.scale.ln(), params.shape).map_err(|_| invalid())?,
            ),
        };
        Ok(LifetimeDistribution {
            family: self,
            params,
            inner,
        })
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.name(), f)
    }
}

impl FromStr for Family {
    type Err = UnsupportedFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FAMILY_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, family)| *family)
            .ok_or_else(|| UnsupportedFamily { name: s.to_owned() })
    }
}

/// Shape and scale of a lifetime distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub shape: f64,
    pub scale: f64,
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape = {}, scale = {}", self.shape, self.scale)
    }
}

/// Which function of a distribution to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr, derive_more::Display)]
pub enum Function {
    /// Probability density
    Pdf,
    /// Cumulative distribution
    Cdf,
    /// Survival, `1 - cdf`
    Sf,
    /// Hazard, `pdf / sf`
    Hazard,
}

#[derive(Debug, Clone)]
enum Inner {
    Weibull(Weibull),
    Gamma(Gamma),
    LogNorm(LogNormal),
}

/// A lifetime distribution with fixed parameters.
#[derive(Debug, Clone)]
pub struct LifetimeDistribution {
    family: Family,
    params: Params,
    inner: Inner,
}

impl LifetimeDistribution {
    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    #[must_use]
    pub fn params(&self) -> Params {
        self.params
    }

    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            return 0.0;
        }
        match &self.inner {
            Inner::Weibull(d) => d.pdf(x),
            Inner::Gamma(d) => d.pdf(x),
            Inner::LogNorm(d) => d.pdf(x),
        }
    }

    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        match &self.inner {
            Inner::Weibull(d) => d.cdf(x),
            Inner::Gamma(d) => d.cdf(x),
            Inner::LogNorm(d) => d.cdf(x),
        }
    }

    #[must_use]
    pub fn sf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 1.0;
        }
        match &self.inner {
            Inner::Weibull(d) => d.sf(x),
            Inner::Gamma(d) => d.sf(x),
            Inner::LogNorm(d) => d.sf(x),
        }
    }

    /// Hazard rate `pdf(x) / sf(x)`.
    ///
    /// The Weibull hazard uses its closed form, which stays finite far into
    /// the tail where both `pdf` and `sf` underflow.
    #[must_use]
    pub fn hazard(&self, x: f64) -> f64 {
        if x < 0.0 {
            return 0.0;
        }
        match self.family {
            Family::Weibull => {
                let Params { shape, scale } = self.params;
                shape / scale * (x / scale).powf(shape - 1.0)
            }
            Family::Gamma | Family::LogNorm => self.pdf(x) / self.sf(x),
        }
    }

    #[must_use]
    pub fn evaluate(&self, function: Function, x: f64) -> f64 {
        match function {
            Function::Pdf => self.pdf(x),
            Function::Cdf => self.cdf(x),
            Function::Sf => self.sf(x),
            Function::Hazard => self.hazard(x),
        }
    }

    /// Median lifetime, the `x` at which `cdf(x) = 0.5`.
    #[must_use]
    pub fn median(&self) -> f64 {
        let Params { shape, scale } = self.params;
        match self.family {
            Family::Weibull => scale * std::f64::consts::LN_2.powf(1.0 / shape),
            Family::LogNorm => scale,
            Family::Gamma => self.median_by_bisection(),
        }
    }

    fn median_by_bisection(&self) -> f64 {
        let mut lo = 0.0;
        let mut hi = self.params.scale.max(f64::MIN_POSITIVE);
        while self.cdf(hi) < 0.5 {
            lo = hi;
            hi *= 2.0;
        }
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if self.cdf(mid) < 0.5 {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= f64::EPSILON * hi {
                break;
            }
        }
        0.5 * (lo + hi)
    }
}

/// Evaluates `function` of the `family` distribution with `params` at every `x`.
///
/// # Examples
///
/// ```
/// use afr_stats::distribution::{Family, Function, Params, evaluate_distribution};
///
/// let params = Params { shape: 1.0, scale: 4.0 };
/// let ys = evaluate_distribution(Family::Weibull, params, Function::Hazard, &[1.0, 2.0]).unwrap();
/// assert_eq!(ys, vec![0.25, 0.25]);
/// ```
pub fn evaluate_distribution(
    family: Family,
    params: Params,
    function: Function,
    xs: &[f64],
) -> Result<Vec<f64>, InvalidParams> {
    let dist = family.distribution(params)?;
    Ok(xs.iter().map(|&x| dist.evaluate(function, x)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * b.abs().max(1.0)
    }

    #[test]
    fn test_parse_family_names() {
        assert_eq!("weibull".parse::<Family>().unwrap(), Family::Weibull);
        assert_eq!("Gamma".parse::<Family>().unwrap(), Family::Gamma);
        assert_eq!("lognorm".parse::<Family>().unwrap(), Family::LogNorm);
        for family in Family::ALL {
            assert_eq!(family.name().parse::<Family>().unwrap(), family);
        }
    }

    #[test]
    fn test_unsupported_family() {
        let err = "exponential".parse::<Family>().unwrap_err();
        assert_eq!(err.name, "exponential");
        assert!(err.to_string().contains("unsupported distribution family"));
    }

    #[test]
    fn test_invalid_params() {
        let err = Family::Gamma
            .distribution(Params {
                shape: -1.0,
                scale: 1.0,
            })
            .unwrap_err();
        assert_eq!(err.family, Family::Gamma);
        assert!(
            Family::LogNorm
                .distribution(Params {
                    shape: 1.0,
                    scale: f64::NAN
                })
                .is_err()
        );
    }

    #[test]
    fn test_shape_one_is_exponential() {
        let params = Params {
            shape: 1.0,
            scale: 2.0,
        };
        for family in [Family::Weibull, Family::Gamma] {
            let dist = family.distribution(params).unwrap();
            for x in [0.5, 1.0, 3.0, 6.0] {
                assert!(close(dist.hazard(x), 0.5, 1e-9), "{family} at {x}");
                assert!(close(dist.sf(x), (-x / 2.0).exp(), 1e-9));
            }
        }
    }

    #[test]
    fn test_hazard_matches_pdf_over_sf() {
        let params = Params {
            shape: 2.84,
            scale: 8.56,
        };
        let dist = Family::Weibull.distribution(params).unwrap();
        for x in [0.1, 1.0, 5.0, 12.0] {
            assert!(close(dist.hazard(x), dist.pdf(x) / dist.sf(x), 1e-9));
        }
    }

    #[test]
    fn test_lognorm_parameterisation() {
        let params = Params {
            shape: 0.528,
            scale: 2.0835_f64.exp(),
        };
        let dist = Family::LogNorm.distribution(params).unwrap();
        assert!(close(dist.cdf(params.scale), 0.5, 1e-9));
        assert!(close(dist.median(), params.scale, 1e-12));
    }

    #[test]
    fn test_medians() {
        let weibull = Family::Weibull
            .distribution(Params {
                shape: 2.84,
                scale: 8.56,
            })
            .unwrap();
        assert!(close(weibull.cdf(weibull.median()), 0.5, 1e-9));

        let gamma = Family::Gamma
            .distribution(Params {
                shape: 4.78,
                scale: 1.75,
            })
            .unwrap();
        let median = gamma.median();
        assert!(close(gamma.cdf(median), 0.5, 1e-9));
        // median of a gamma lies between mode and mean
        assert!(median > (4.78 - 1.0) * 1.75 && median < 4.78 * 1.75);
    }

    #[test]
    fn test_non_positive_ages() {
        let dist = Family::Gamma
            .distribution(Params {
                shape: 2.0,
                scale: 1.0,
            })
            .unwrap();
        assert_eq!(dist.cdf(-1.0), 0.0);
        assert_eq!(dist.sf(0.0), 1.0);
        assert_eq!(dist.pdf(-1.0), 0.0);
        assert_eq!(dist.hazard(-1.0), 0.0);
    }

    #[test]
    fn test_function_from_str() {
        assert_eq!("cdf".parse::<Function>().unwrap(), Function::Cdf);
        assert_eq!("hazard".parse::<Function>().unwrap(), Function::Hazard);
        assert_eq!("sf".parse::<Function>().unwrap(), Function::Sf);
    }
}
