//! Numerical integration of sampled series.

use crate::series::TimeSeries;

/// Integral of `ys` over `xs` by the trapezoidal rule.
///
/// Returns `0.0` for fewer than two samples.
///
/// # Examples
///
/// ```
/// use afr_stats::integrate::trapezoid;
///
/// let xs = [0.0, 1.0, 3.0];
/// let ys = [2.0, 2.0, 4.0];
/// assert_eq!(trapezoid(&xs, &ys), 2.0 + 6.0);
/// ```
#[must_use]
pub fn trapezoid(xs: &[f64], ys: &[f64]) -> f64 {
    assert_eq!(xs.len(), ys.len(), "xs and ys must have equal length");
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

/// Trapezoidal integral of a whole series.
#[must_use]
pub fn trapezoid_series(series: &TimeSeries) -> f64 {
    trapezoid(series.xs(), series.ys())
}
