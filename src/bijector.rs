//! Bijector view of a transform.
//!
//! Probabilistic consumers (transformed distributions, samplers) expect a
//! bijector with its parameters already bound. [`TransformBijector`] binds a
//! parameter batch to a [`Transform`] and forwards every call to it.

use crate::transform::Transform;
use crate::{Error, Result};
use ndarray::{Array1, Array2, ArrayView2};

/// The capability set of a batched bijector with bound parameters.
pub trait Bijector: Send + Sync {
    /// `y = f(x)`.
    fn forward(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>>;
    /// `x = f^{-1}(y)`.
    fn inverse(&self, y: &ArrayView2<f64>) -> Result<Array2<f64>>;
    /// `log|det ∂f/∂x|` at `x`.
    fn forward_log_det_jacobian(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>>;
    /// `log|det ∂f^{-1}/∂y|` at `y`.
    fn inverse_log_det_jacobian(&self, y: &ArrayView2<f64>) -> Result<Array1<f64>>;
}

/// A [`Transform`] with a bound `[B, p]` parameter batch.
#[derive(Debug, Clone)]
pub struct TransformBijector<T> {
    transform: T,
    params: Array2<f64>,
}

impl<T: Transform> TransformBijector<T> {
    /// Bind `params` to `transform`.
    ///
    /// The parameter width is checked lazily, against the dimensionality of
    /// each call, by the wrapped transform.
    pub fn new(transform: T, params: Array2<f64>) -> Self {
        Self { transform, params }
    }

    /// Bind `params` after checking their width against dimensionality `d`.
    pub fn checked(transform: T, params: Array2<f64>, d: usize) -> Result<Self> {
        let expected = transform.param_count(d);
        if params.ncols() != expected {
            return Err(Error::ShapeMismatch {
                transform: transform.name(),
                what: "parameter columns",
                expected,
                got: params.ncols(),
            });
        }
        Ok(Self::new(transform, params))
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    pub fn params(&self) -> &Array2<f64> {
        &self.params
    }

    /// Forward image and LDJ in one call.
    pub fn forward_and_log_det(&self, x: &ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
        self.transform.forward(x, &self.params.view())
    }

    /// Inverse image and LDJ in one call.
    pub fn inverse_and_log_det(&self, y: &ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
        self.transform.inverse(y, &self.params.view())
    }
}

impl<T: Transform> Bijector for TransformBijector<T> {
    fn forward(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>> {
        Ok(self.forward_and_log_det(x)?.0)
    }

    fn inverse(&self, y: &ArrayView2<f64>) -> Result<Array2<f64>> {
        Ok(self.inverse_and_log_det(y)?.0)
    }

    fn forward_log_det_jacobian(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.forward_and_log_det(x)?.1)
    }

    fn inverse_log_det_jacobian(&self, y: &ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.inverse_and_log_det(y)?.1)
    }
}
