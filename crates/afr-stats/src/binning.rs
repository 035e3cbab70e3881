//! Fixed-width binning of sampled series
//!
//! This module aggregates a sampled series into contiguous, fixed-width bins
//! along the age axis. It is the non-smoothing counterpart of the
//! Savitzky-Golay pipeline: instead of a continuous rate curve it produces one
//! number per interval, which is what a tabular failure-rate estimate needs.
//!
//! # Bin Layout
//!
//! Given a bin width `w` and the valid domain `[x_min, x_max]`:
//!
//! 1. The first left edge is `x_min` snapped down to a multiple of `w`
//!    (falling back to `x_min` itself if the snapped edge would lie more than
//!    one bin width away)
//! 2. The number of bins is `ceil((x_max - start) / w)`
//! 3. Bin `i` covers `[start + i·w, start + (i + 1)·w)`
//!
//! Edges may extend beyond the valid domain; the aggregations below never
//! evaluate the series outside of it.
//!
//! # Aggregations
//!
//! - [`bin_integral`]: Riemann-sum integral of the series over each bin, for
//!   population-at-risk series (yields exposure, e.g. disk-years)
//! - [`bin_delta`]: increase of a non-decreasing series across each bin, for
//!   cumulative event counts (yields events per bin)
//!
//! # Examples
//!
//! ```
//! use afr_stats::{binning::bin_delta, series::TimeSeries};
//!
//! let failures = TimeSeries::new(vec![0.0, 1.0, 2.0], vec![0.0, 4.0, 10.0]).unwrap();
//! let bins = bin_delta(&failures, 1.0, None).unwrap();
//!
//! assert_eq!(bins.len(), 2);
//! assert_eq!(bins[0].value, 4.0);
//! assert_eq!(bins[1].value, 6.0);
//! ```

use serde::Serialize;

use crate::{
    interpolation::{InterpolationError, LinearInterpolator},
    series::{DomainLimits, TimeSeries},
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum BinningError {
    #[display("bin width must be positive and finite, got {width}")]
    InvalidWidth { width: f64 },
    #[display("samples per bin must be at least 1")]
    NoSamplesPerBin,
    #[display("failed to evaluate series inside a bin")]
    #[from]
    Interpolation(InterpolationError),
}

/// A single bin and its aggregated value.
const EDGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    /// Left edge (inclusive)
    pub left: f64,
    /// Right edge (exclusive)
    pub right: f64,
    /// Aggregated value: exposure for [`bin_integral`], event count for [`bin_delta`]
    pub value: f64,
}

/// Placement of fixed-width bins over a domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinLayout {
    /// Left edge of the first bin
    pub start: f64,
    /// Width of every bin
    pub width: f64,
    /// Number of bins
    pub count: usize,
    /// Valid domain the bins were laid over
    pub limits: DomainLimits,
}

impl BinLayout {
    /// Lays bins of `width` over `limits`.
    ///
    /// # Examples
    ///
    /// ```
    /// use afr_stats::{binning::BinLayout, series::DomainLimits};
    ///
    /// let layout = BinLayout::new(0.5, DomainLimits { min: 1.3, max: 2.6 }).unwrap();
    /// assert_eq!(layout.start, 1.0);
    /// assert_eq!(layout.count, 4);
    /// ```
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(width: f64, limits: DomainLimits) -> Result<Self, BinningError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(BinningError::InvalidWidth { width });
        }

        let mut start = (limits.min / width).floor() * width;
        if (start - limits.min).abs() > width {
            start = limits.min;
        }
        let ratio = (limits.max - start) / width;
        let nearest = ratio.round();
        // a domain end within rounding error of an edge closes the last bin there
        let count = if (ratio - nearest).abs() <= EDGE_TOLERANCE * nearest.max(1.0) {
            nearest
        } else {
            ratio.ceil()
        };
        let count = count.max(0.0) as usize;

        Ok(Self {
            start,
            width,
            count,
            limits,
        })
    }

    /// Left and right edge of bin `index`.
    ///
    /// The last bin always reaches the domain maximum.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn edges(&self, index: usize) -> (f64, f64) {
        let left = self.start + self.width * index as f64;
        let mut right = self.start + self.width * (index + 1) as f64;
        if index + 1 == self.count {
            right = right.max(self.limits.max);
        }
        (left, right)
    }

    /// Edges of every bin, in order.
    pub fn iter_edges(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.count).map(|i| self.edges(i))
    }
}

fn layout_for(
    series: &TimeSeries,
    bin_width: f64,
    x_lims: Option<DomainLimits>,
) -> Result<BinLayout, BinningError> {
    BinLayout::new(bin_width, x_lims.unwrap_or_else(|| series.domain()))
}

/// Integral of `series` over each bin.
///
/// Each bin is sampled at `samples_per_bin` evenly spaced interior points
/// (the midpoints of `samples_per_bin` equal sub-intervals). Points outside
/// the valid domain contribute zero; the rest are interpolated and summed,
/// weighted by the sub-interval width.
///
/// # Arguments
///
/// * `series` - Series to integrate (e.g. observed population over age)
/// * `bin_width` - Width of every bin
/// * `samples_per_bin` - Number of Riemann-sum samples per bin
/// * `x_lims` - Valid domain; defaults to the series' own x-range
///
/// # Examples
///
/// ```
/// use afr_stats::{binning::bin_integral, series::TimeSeries};
///
/// let population = TimeSeries::new(vec![0.0, 2.0], vec![100.0, 100.0]).unwrap();
/// let bins = bin_integral(&population, 0.5, 10, None).unwrap();
///
/// assert_eq!(bins.len(), 4);
/// assert!(bins.iter().all(|b| (b.value - 50.0).abs() < 1e-9));
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn bin_integral(
    series: &TimeSeries,
    bin_width: f64,
    samples_per_bin: usize,
    x_lims: Option<DomainLimits>,
) -> Result<Vec<Bin>, BinningError> {
    if samples_per_bin == 0 {
        return Err(BinningError::NoSamplesPerBin);
    }
    let layout = layout_for(series, bin_width, x_lims)?;
    let itp = LinearInterpolator::new(series);
    let step = bin_width / samples_per_bin as f64;

    layout
        .iter_edges()
        .map(|(left, right)| -> Result<Bin, BinningError> {
            let mut sum = 0.0;
            for k in 0..samples_per_bin {
                let x = left + step * (k as f64 + 0.5);
                if layout.limits.contains(x) {
                    sum += itp.at(x)?;
                }
            }
            Ok(Bin {
                left,
                right,
                value: sum * step,
            })
        })
        .collect()
}

/// Increase of a non-decreasing `series` across each bin.
///
/// Both edges are clamped into the valid domain before interpolating, so the
/// deltas of a non-decreasing series are never negative and sum to the total
/// increase over the domain.
///
/// # Arguments
///
/// * `series` - Non-decreasing series (e.g. cumulative failures over age)
/// * `bin_width` - Width of every bin
/// * `x_lims` - Valid domain; defaults to the series' own x-range
pub fn bin_delta(
    series: &TimeSeries,
    bin_width: f64,
    x_lims: Option<DomainLimits>,
) -> Result<Vec<Bin>, BinningError> {
    let layout = layout_for(series, bin_width, x_lims)?;
    let itp = LinearInterpolator::new(series);

    layout
        .iter_edges()
        .map(|(left, right)| -> Result<Bin, BinningError> {
            let y_left = itp.at(layout.limits.clamp(left))?;
            let y_right = itp.at(layout.limits.clamp(right))?;
            Ok(Bin {
                left,
                right,
                value: y_right - y_left,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cumulative() -> TimeSeries {
        TimeSeries::new(
            vec![0.15, 0.4, 1.1, 1.9, 2.2, 3.05],
            vec![0.0, 3.0, 3.0, 10.0, 11.0, 30.0],
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_width() {
        let series = cumulative();
        assert_eq!(
            bin_delta(&series, 0.0, None).unwrap_err(),
            BinningError::InvalidWidth { width: 0.0 }
        );
        assert!(bin_delta(&series, f64::NAN, None).is_err());
        assert!(bin_integral(&series, -1.0, 4, None).is_err());
    }

    #[test]
    fn test_zero_samples_per_bin() {
        assert_eq!(
            bin_integral(&cumulative(), 0.5, 0, None).unwrap_err(),
            BinningError::NoSamplesPerBin
        );
    }

    #[test]
    fn test_layout_snaps_to_multiple() {
        let layout = BinLayout::new(0.5, DomainLimits { min: 0.15, max: 3.05 }).unwrap();
        assert_eq!(layout.start, 0.0);
        assert_eq!(layout.count, 7);
        assert_eq!(layout.edges(6), (3.0, 3.5));
    }

    #[test]
    fn test_layout_on_exact_multiple() {
        let layout = BinLayout::new(1.0, DomainLimits { min: 2.0, max: 5.0 }).unwrap();
        assert_eq!(layout.start, 2.0);
        assert_eq!(layout.count, 3);
    }

    #[test]
    fn test_layout_rounded_multiple_has_no_empty_tail() {
        let limits = DomainLimits {
            min: 0.0,
            max: 0.1 + 0.2,
        };
        let layout = BinLayout::new(0.1, limits).unwrap();
        assert_eq!(layout.count, 3);

        let population = TimeSeries::new(vec![0.0, limits.max], vec![10.0, 10.0]).unwrap();
        let bins = bin_integral(&population, 0.1, 10, None).unwrap();
        assert_eq!(bins.len(), 3);
        assert!(bins.iter().all(|b| b.value > 0.0));
        assert_eq!(bins[2].right, limits.max);
    }

    #[test]
    fn test_layout_negative_domain() {
        let layout = BinLayout::new(1.0, DomainLimits { min: -1.5, max: 0.5 }).unwrap();
        assert_eq!(layout.start, -2.0);
        assert_eq!(layout.count, 3);
    }

    #[test]
    fn test_bins_are_contiguous() {
        let bins = bin_delta(&cumulative(), 0.5, None).unwrap();
        for pair in bins.windows(2) {
            assert!((pair[0].right - pair[1].left).abs() < 1e-12);
        }
        assert!(bins[0].left <= 0.15);
        assert!(bins[bins.len() - 1].right >= 3.05);
    }

    #[test]
    fn test_deltas_non_negative_and_telescoping() {
        let series = cumulative();
        let bins = bin_delta(&series, 0.5, None).unwrap();
        assert!(bins.iter().all(|b| b.value >= 0.0));
        let total = bins.iter().map(|b| b.value).sum::<f64>();
        assert!((total - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_delta_respects_x_lims() {
        let series = cumulative();
        let lims = DomainLimits { min: 1.1, max: 2.2 };
        let bins = bin_delta(&series, 0.5, Some(lims)).unwrap();
        let total = bins.iter().map(|b| b.value).sum::<f64>();
        assert!((total - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_integral_masks_outside_domain() {
        let population = TimeSeries::new(vec![0.2, 2.9], vec![100.0, 100.0]).unwrap();
        let bins = bin_integral(&population, 0.5, 10, None).unwrap();
        assert_eq!(bins.len(), 6);
        // [0.0, 0.5) only has samples at 0.225, 0.275, ..., 0.475 inside
        assert!((bins[0].value - 30.0).abs() < 1e-9);
        assert!((bins[1].value - 50.0).abs() < 1e-9);
        // [2.5, 3.0) has samples up to 2.875 inside
        assert!((bins[5].value - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_integral_additivity() {
        let population = TimeSeries::new(
            vec![0.0, 1.0, 2.5, 4.0, 6.0],
            vec![10.0, 80.0, 120.0, 60.0, 20.0],
        )
        .unwrap();
        let exact = crate::integrate::trapezoid_series(&population);
        for width in [0.25, 0.5, 1.0] {
            let bins = bin_integral(&population, width, 50, None).unwrap();
            let total = bins.iter().map(|b| b.value).sum::<f64>();
            assert!(
                (total - exact).abs() < width * 10.0,
                "width {width}: {total} vs {exact}"
            );
        }
    }

    #[test]
    fn test_integral_outside_series_range_fails() {
        let population = TimeSeries::new(vec![1.0, 2.0], vec![5.0, 5.0]).unwrap();
        let lims = DomainLimits { min: 0.0, max: 2.0 };
        assert!(matches!(
            bin_integral(&population, 0.5, 4, Some(lims)),
            Err(BinningError::Interpolation(_))
        ));
    }
}
