//! Swap the directions of a transform.

use crate::transform::{Mapped, Transform};
use crate::Result;
use ndarray::ArrayView2;

/// `Invert(T)`: forward runs `T::inverse`, inverse runs `T::forward`.
///
/// Every transform reports the LDJ of the direction it evaluates, so the
/// wrapped LDJ passes through untouched. Relative to `T` at the corresponding
/// point it is negated: if `y = T.forward(x)` then
/// `Invert(T).forward_ldj(y) = -T.forward_ldj(x)`.
///
/// Works by value or by reference (`Invert::new(&planar)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Invert<T> {
    inner: T,
}

impl<T: Transform> Invert<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// The wrapped transform.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Transform> Transform for Invert<T> {
    fn name(&self) -> &'static str {
        "Invert"
    }

    fn param_count(&self, d: usize) -> usize {
        self.inner.param_count(d)
    }

    /// Only dimension-preserving transforms can be inverted; `T::output_dim`
    /// maps the wrong way, so it is not consulted.
    fn output_dim(&self, d: usize) -> usize {
        d
    }

    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        self.inner.inverse(z, params)
    }

    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        self.inner.forward(z, params)
    }
}
