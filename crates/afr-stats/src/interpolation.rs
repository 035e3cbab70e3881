//! Piecewise-linear interpolation of a sampled series.
//!
//! Queries must lie inside the x-range of the source series; extrapolation is
//! reported as [`InterpolationError::OutOfDomain`] instead of guessed. Callers
//! in this workspace build their query points from intersected domain limits,
//! so the error only surfaces on misuse.

use crate::series::{DomainLimits, TimeSeries};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InterpolationError {
    #[display("x = {x} lies outside the interpolation domain {domain}")]
    OutOfDomain { x: f64, domain: DomainLimits },
}

/// Linear interpolator borrowing the columns of a [`TimeSeries`].
///
/// The source x values must be strictly increasing.
#[derive(Debug, Clone, Copy)]
pub struct LinearInterpolator<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
    domain: DomainLimits,
}

impl<'a> LinearInterpolator<'a> {
    #[must_use]
    pub fn new(series: &'a TimeSeries) -> Self {
        Self {
            xs: series.xs(),
            ys: series.ys(),
            domain: series.domain(),
        }
    }

    #[must_use]
    pub fn domain(&self) -> DomainLimits {
        self.domain
    }

    /// Interpolated y value at `x`.
    ///
    /// At a knot the stored sample value is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use afr_stats::{interpolation::LinearInterpolator, series::TimeSeries};
    ///
    /// let series = TimeSeries::new(vec![0.0, 2.0], vec![10.0, 20.0]).unwrap();
    /// let itp = LinearInterpolator::new(&series);
    /// assert_eq!(itp.at(1.0).unwrap(), 15.0);
    /// assert!(itp.at(2.5).is_err());
    /// ```
    pub fn at(&self, x: f64) -> Result<f64, InterpolationError> {
        if !self.domain.contains(x) {
            return Err(InterpolationError::OutOfDomain {
                x,
                domain: self.domain,
            });
        }

        // First index whose x is strictly greater than the query.
        let upper = self.xs.partition_point(|&v| v <= x);
        if upper == self.xs.len() {
            return Ok(self.ys[upper - 1]);
        }
        let lower = upper - 1;
        let (x0, x1) = (self.xs[lower], self.xs[upper]);
        let (y0, y1) = (self.ys[lower], self.ys[upper]);
        let t = (x - x0) / (x1 - x0);
        Ok(y0 + t * (y1 - y0))
    }

    /// Interpolated values at every query point, in query order.
    pub fn at_all(&self, query: &[f64]) -> Result<Vec<f64>, InterpolationError> {
        query.iter().map(|&x| self.at(x)).collect()
    }
}

/// Resamples `series` onto the query points `xs`.
pub fn resample(series: &TimeSeries, xs: &[f64]) -> Result<Vec<f64>, InterpolationError> {
    LinearInterpolator::new(series).at_all(xs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series() -> TimeSeries {
        TimeSeries::new(
            vec![0.0, 0.5, 1.7, 3.0, 10.0],
            vec![0.0, 2.0, 2.0, 5.0, 40.0],
        )
        .unwrap()
    }

    #[test]
    fn test_identity_at_knots() {
        let series = sample_series();
        let values = resample(&series, series.xs()).unwrap();
        assert_eq!(values, series.ys());
    }

    #[test]
    fn test_midpoints() {
        let series = sample_series();
        let itp = LinearInterpolator::new(&series);
        assert!((itp.at(0.25).unwrap() - 1.0).abs() < 1e-12);
        assert!((itp.at(1.0).unwrap() - 2.0).abs() < 1e-12);
        assert!((itp.at(6.5).unwrap() - 22.5).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_domain() {
        let series = sample_series();
        let itp = LinearInterpolator::new(&series);
        assert!(matches!(
            itp.at(-0.1),
            Err(InterpolationError::OutOfDomain { .. })
        ));
        assert!(itp.at(10.000_001).is_err());
        assert!(itp.at(f64::NAN).is_err());
    }

    #[test]
    fn test_single_sample() {
        let series = TimeSeries::new(vec![4.0], vec![7.0]).unwrap();
        let itp = LinearInterpolator::new(&series);
        assert_eq!(itp.at(4.0).unwrap(), 7.0);
        assert!(itp.at(4.1).is_err());
    }

    #[test]
    fn test_resample_preserves_query_order() {
        let series = sample_series();
        let values = resample(&series, &[3.0, 0.0, 10.0]).unwrap();
        assert_eq!(values, vec![5.0, 0.0, 40.0]);
    }
}
