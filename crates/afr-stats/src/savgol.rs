//! Savitzky-Golay smoothing and differentiation.
//!
//! Each output point is the value (or first derivative) at the window centre
//! of a least-squares polynomial fitted to the `window_size` samples around
//! it. Cumulative failure counts are step-like, and plain finite differences
//! of them are dominated by noise; fitting a local polynomial denoises and
//! differentiates in one pass.
//!
//! # Edge handling
//!
//! The first and last `window_size / 2` points have no centred window. For
//! those points a single polynomial is fitted to the first (respectively
//! last) `window_size` samples and evaluated at the edge positions. This is
//! the `interp` edge mode of the classic filter, so a series that is itself a
//! polynomial of degree `<= poly_order` is reproduced exactly everywhere,
//! edges included.
//!
//! # Examples
//!
//! ```
//! use afr_stats::savgol::SavitzkyGolay;
//!
//! let filter = SavitzkyGolay::new(5, 2).unwrap();
//! let line = [1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 13.0];
//!
//! let smoothed = filter.smooth(&line).unwrap();
//! let slope = filter.derivative(&line, 1.0).unwrap();
//! assert!(smoothed.iter().zip(&line).all(|(a, b)| (a - b).abs() < 1e-9));
//! assert!(slope.iter().all(|d| (d - 2.0).abs() < 1e-9));
//! ```

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SmoothingError {
    #[display("window size must be a positive odd number, got {window_size}")]
    InvalidWindow { window_size: usize },
    #[display("polynomial order {poly_order} must be less than window size {window_size}")]
    PolyOrderTooLarge {
        poly_order: usize,
        window_size: usize,
    },
    #[display("window size {window_size} exceeds series length {len}")]
    WindowTooLong { window_size: usize, len: usize },
    #[display("sample spacing must be positive and finite, got {delta}")]
    InvalidSpacing { delta: f64 },
    #[display("failed to compute filter coefficients: {reason}")]
    Coefficients { reason: &'static str },
}

/// A Savitzky-Golay filter with precomputed least-squares coefficients.
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window_size: usize,
    poly_order: usize,
    half: usize,
    // Positions inside a window are mapped onto [-1, 1] to keep the design
    // matrix well conditioned for wide windows.
    scale: f64,
    // (poly_order + 1) x window_size pseudo-inverse of the design matrix.
    pinv: DMatrix<f64>,
}

impl SavitzkyGolay {
    /// Builds a filter for odd `window_size` and `poly_order < window_size`.
    #[expect(clippy::cast_precision_loss)]
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self, SmoothingError> {
        if window_size == 0 || window_size % 2 == 0 {
            return Err(SmoothingError::InvalidWindow { window_size });
        }
        if poly_order >= window_size {
            return Err(SmoothingError::PolyOrderTooLarge {
                poly_order,
                window_size,
            });
        }

        let half = window_size / 2;
        let scale = half.max(1) as f64;
        let design = DMatrix::from_fn(window_size, poly_order + 1, |i, j| {
            let z = (i as f64 - half as f64) / scale;
            z.powi(power(j))
        });
        let pinv = design
            .pseudo_inverse(1e-12)
            .map_err(|reason| SmoothingError::Coefficients { reason })?;

        Ok(Self {
            window_size,
            poly_order,
            half,
            scale,
            pinv,
        })
    }

    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    #[must_use]
    pub fn poly_order(&self) -> usize {
        self.poly_order
    }

    /// Smoothed value at every sample.
    pub fn smooth(&self, ys: &[f64]) -> Result<Vec<f64>, SmoothingError> {
        self.filter(ys, Order::Value)
    }

    /// First derivative at every sample, per unit of x.
    ///
    /// `delta` is the spacing between consecutive samples; the per-index
    /// derivative of the local fit is divided by it.
    pub fn derivative(&self, ys: &[f64], delta: f64) -> Result<Vec<f64>, SmoothingError> {
        if !(delta.is_finite() && delta > 0.0) {
            return Err(SmoothingError::InvalidSpacing { delta });
        }
        let mut dydx = self.filter(ys, Order::FirstDerivative)?;
        for d in &mut dydx {
            *d /= delta;
        }
        Ok(dydx)
    }

    fn filter(&self, ys: &[f64], order: Order) -> Result<Vec<f64>, SmoothingError> {
        let n = ys.len();
        if n < self.window_size {
            return Err(SmoothingError::WindowTooLong {
                window_size: self.window_size,
                len: n,
            });
        }
        if order == Order::FirstDerivative && self.poly_order == 0 {
            return Ok(vec![0.0; n]);
        }

        let row = order.row();
        let row_scale = match order {
            Order::Value => 1.0,
            Order::FirstDerivative => 1.0 / self.scale,
        };
        let coeffs = self
            .pinv
            .row(row)
            .iter()
            .map(|c| c * row_scale)
            .collect::<Vec<_>>();

        let mut out = vec![0.0; n];
        for (centre, value) in out
            .iter_mut()
            .enumerate()
            .take(n - self.half)
            .skip(self.half)
        {
            let window = &ys[centre - self.half..=centre + self.half];
            *value = coeffs.iter().zip(window).map(|(c, y)| c * y).sum();
        }

        if self.half > 0 {
            let left = self.fit_window(&ys[..self.window_size]);
            for (k, value) in out.iter_mut().enumerate().take(self.half) {
                *value = self.evaluate(&left, k, order);
            }

            let offset = n - self.window_size;
            let right = self.fit_window(&ys[offset..]);
            for (k, value) in out.iter_mut().enumerate().skip(n - self.half) {
                *value = self.evaluate(&right, k - offset, order);
            }
        }

        Ok(out)
    }

    /// Polynomial coefficients (in scaled window coordinates) fitted to `window`.
    fn fit_window(&self, window: &[f64]) -> DVector<f64> {
        &self.pinv * DVector::from_column_slice(window)
    }

    /// Evaluates the fitted polynomial at window position `index`.
    #[expect(clippy::cast_precision_loss)]
    fn evaluate(&self, beta: &DVector<f64>, index: usize, order: Order) -> f64 {
        let z = (index as f64 - self.half as f64) / self.scale;
        match order {
            Order::Value => beta.as_slice().iter().rev().fold(0.0, |acc, b| acc * z + b),
            Order::FirstDerivative => {
                let slope = beta
                    .as_slice()
                    .iter()
                    .enumerate()
                    .skip(1)
                    .rev()
                    .fold(0.0, |acc, (j, b)| acc * z + j as f64 * b);
                slope / self.scale
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Value,
    FirstDerivative,
}

impl Order {
    fn row(self) -> usize {
        match self {
            Order::Value => 0,
            Order::FirstDerivative => 1,
        }
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn power(j: usize) -> i32 {
    j as i32
}
