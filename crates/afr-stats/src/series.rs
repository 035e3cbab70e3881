//! Sampled series, their domains, and uniform grids over a domain.
//!
//! A [`TimeSeries`] is an ordered set of `(x, y)` samples where `x` is an age
//! axis (power-on hours or years). Series are never mutated once built; every
//! transformation returns a new value.
//!
//! Two series are only comparable over the part of the age axis both of them
//! cover. [`DomainLimits::intersection`] computes that common support, and
//! [`Grid::linspace`] lays evenly spaced sample points over it, so every value
//! derived on the same grid shares identical x-coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error raised when building a [`TimeSeries`] from raw columns.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SeriesError {
    #[display("series has no samples")]
    Empty,
    #[display("series columns differ in length: {xs_len} x values, {ys_len} y values")]
    LengthMismatch { xs_len: usize, ys_len: usize },
    #[display("series contains a non-finite x value at index {index}")]
    NonFiniteX { index: usize },
}

/// Error raised when two domains cannot be combined.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DomainError {
    #[display("series domains do not overlap: {first} and {second}")]
    Disjoint {
        first: DomainLimits,
        second: DomainLimits,
    },
    #[display("domain floor {floor} lies beyond the domain maximum {max}")]
    FloorAboveMax { floor: f64, max: f64 },
}

/// An `(x, y)` series with equally long columns.
///
/// The x column is expected to be sorted in ascending order; this is a
/// precondition of interpolation and is not re-checked on every lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl TimeSeries {
    /// Builds a series from its two columns.
    ///
    /// # Examples
    ///
    /// ```
    /// use afr_stats::series::TimeSeries;
    ///
    /// let series = TimeSeries::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(series.len(), 3);
    /// assert_eq!(series.last_y(), 3.0);
    /// ```
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, SeriesError> {
        if xs.len() != ys.len() {
            return Err(SeriesError::LengthMismatch {
                xs_len: xs.len(),
                ys_len: ys.len(),
            });
        }
        if xs.is_empty() {
            return Err(SeriesError::Empty);
        }
        if let Some(index) = xs.iter().position(|x| !x.is_finite()) {
            return Err(SeriesError::NonFiniteX { index });
        }
        Ok(Self { xs, ys })
    }

    /// Builds a series from `(x, y)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (xs, ys) = pairs.into_iter().unzip();
        Self::new(xs, ys)
    }

    #[must_use]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    #[must_use]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Value of the final row.
    ///
    /// For a cumulative count this is the total number of events observed.
    #[must_use]
    pub fn last_y(&self) -> f64 {
        self.ys[self.ys.len() - 1]
    }

    /// The x-range `[min(x), max(x)]` covered by this series.
    #[must_use]
    pub fn domain(&self) -> DomainLimits {
        let min = self.xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        DomainLimits { min, max }
    }

    /// Returns a copy of this series with every x divided by `divisor`.
    ///
    /// Used to convert an hours axis into years.
    #[must_use]
    pub fn rescale_x(&self, divisor: f64) -> Self {
        Self {
            xs: self.xs.iter().map(|x| x / divisor).collect(),
            ys: self.ys.clone(),
        }
    }
}

/// A closed interval `[min, max]` on the age axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainLimits {
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for DomainLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

impl DomainLimits {
    /// Common support of two domains: the largest minimum and the smallest maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// use afr_stats::series::DomainLimits;
    ///
    /// let a = DomainLimits { min: 0.0, max: 10.0 };
    /// let b = DomainLimits { min: 2.0, max: 12.0 };
    /// let common = DomainLimits::intersection(a, b).unwrap();
    /// assert_eq!(common, DomainLimits { min: 2.0, max: 10.0 });
    /// ```
    pub fn intersection(first: Self, second: Self) -> Result<Self, DomainError> {
        let min = first.min.max(second.min);
        let max = first.max.min(second.max);
        if min > max {
            return Err(DomainError::Disjoint { first, second });
        }
        Ok(Self { min, max })
    }

    /// Raises the minimum to at least `floor`.
    pub fn floored(self, floor: f64) -> Result<Self, DomainError> {
        if floor > self.max {
            return Err(DomainError::FloorAboveMax {
                floor,
                max: self.max,
            });
        }
        Ok(Self {
            min: self.min.max(floor),
            max: self.max,
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Moves `x` into the interval.
    #[must_use]
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }
}

/// Evenly spaced sample points spanning a [`DomainLimits`], endpoints included.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    limits: DomainLimits,
    points: Vec<f64>,
}

impl Grid {
    /// Lays `num` evenly spaced points over `limits`.
    ///
    /// The first point is exactly `limits.min` and, for `num >= 2`, the last
    /// point is exactly `limits.max`.
    ///
    /// # Examples
    ///
    /// ```
    /// use afr_stats::series::{DomainLimits, Grid};
    ///
    /// let grid = Grid::linspace(DomainLimits { min: 0.0, max: 3.0 }, 4);
    /// assert_eq!(grid.points(), &[0.0, 1.0, 2.0, 3.0]);
    /// assert_eq!(grid.step(), 1.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn linspace(limits: DomainLimits, num: usize) -> Self {
        let points = match num {
            0 => vec![],
            1 => vec![limits.min],
            _ => {
                let step = limits.width() / (num - 1) as f64;
                (0..num)
                    .map(|i| {
                        if i == num - 1 {
                            limits.max
                        } else {
                            (limits.min + step * i as f64).min(limits.max)
                        }
                    })
                    .collect()
            }
        };
        Self { limits, points }
    }

    #[must_use]
    pub fn limits(&self) -> DomainLimits {
        self.limits
    }

    #[must_use]
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance between neighbouring points; zero for grids of fewer than two points.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn step(&self) -> f64 {
        if self.points.len() < 2 {
            0.0
        } else {
            self.limits.width() / (self.points.len() - 1) as f64
        }
    }

    pub fn into_points(self) -> Vec<f64> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mismatched_columns() {
        let err = TimeSeries::new(vec![0.0, 1.0], vec![0.0]).unwrap_err();
        assert_eq!(err, SeriesError::LengthMismatch { xs_len: 2, ys_len: 1 });
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            TimeSeries::new(vec![], vec![]).unwrap_err(),
            SeriesError::Empty
        );
    }

    #[test]
    fn test_new_rejects_nan_x() {
        let err = TimeSeries::new(vec![0.0, f64::NAN], vec![0.0, 1.0]).unwrap_err();
        assert_eq!(err, SeriesError::NonFiniteX { index: 1 });
    }

    #[test]
    fn test_domain_of_unsorted_series() {
        let series = TimeSeries::new(vec![3.0, 1.0, 2.0], vec![0.0; 3]).unwrap();
        assert_eq!(series.domain(), DomainLimits { min: 1.0, max: 3.0 });
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = DomainLimits { min: 0.0, max: 1.0 };
        let b = DomainLimits { min: 2.0, max: 3.0 };
        assert!(matches!(
            DomainLimits::intersection(a, b),
            Err(DomainError::Disjoint { .. })
        ));
    }

    #[test]
    fn test_intersection_touching() {
        let a = DomainLimits { min: 0.0, max: 2.0 };
        let b = DomainLimits { min: 2.0, max: 3.0 };
        let common = DomainLimits::intersection(a, b).unwrap();
        assert_eq!(common, DomainLimits { min: 2.0, max: 2.0 });
    }

    #[test]
    fn test_floored() {
        let limits = DomainLimits { min: 0.0, max: 5.0 };
        assert_eq!(limits.floored(1.0).unwrap().min, 1.0);
        assert_eq!(limits.floored(-1.0).unwrap().min, 0.0);
        assert!(limits.floored(6.0).is_err());
    }

    #[test]
    fn test_linspace_endpoints() {
        let limits = DomainLimits { min: 0.1, max: 7.3 };
        let grid = Grid::linspace(limits, 2000);
        assert_eq!(grid.len(), 2000);
        assert_eq!(grid.points()[0], 0.1);
        assert_eq!(grid.points()[1999], 7.3);
        assert!(grid.points().is_sorted());
    }

    #[test]
    fn test_linspace_small() {
        let limits = DomainLimits { min: 1.0, max: 2.0 };
        assert!(Grid::linspace(limits, 0).is_empty());
        assert_eq!(Grid::linspace(limits, 1).points(), &[1.0]);
        assert_eq!(Grid::linspace(limits, 1).step(), 0.0);
    }

    #[test]
    fn test_rescale_x() {
        let series = TimeSeries::new(vec![0.0, 8760.0], vec![1.0, 2.0]).unwrap();
        let years = series.rescale_x(8760.0);
        assert_eq!(years.xs(), &[0.0, 1.0]);
        assert_eq!(years.ys(), series.ys());
    }
}
