//! Small numerically-stable helpers shared by the transforms.

use ndarray::{Array1, ArrayView2};

/// Natural log of `sqrt(2π)`.
pub(crate) const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// Stable softplus: `log(1 + exp(x))`.
///
/// Written as `max(x, 0) + log(1 + exp(-|x|))`, so `exp` never overflows.
#[inline]
pub fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

/// Derivative of `tanh`: `1 - tanh(x)^2`.
#[inline]
pub fn tanh_prime(x: f64) -> f64 {
    let t = x.tanh();
    1.0 - t * t
}

/// Per-row dot product of two `[B, d]` batches.
pub(crate) fn row_dot(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array1<f64> {
    debug_assert_eq!(a.dim(), b.dim());
    Array1::from_shape_fn(a.nrows(), |i| a.row(i).dot(&b.row(i)))
}
