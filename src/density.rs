//! Change-of-variables densities over a standard-normal base.
//!
//! If `x = f(z)` with `z ~ N(0, I)`, then
//!
//! \[
//! \log q(x) = \log \mathcal{N}(f^{-1}(x); 0, I) + \log \left|\det \frac{\partial f^{-1}}{\partial x}\right|
//!           = \log \mathcal{N}(z; 0, I) - \log \left|\det \frac{\partial f}{\partial z}\right|
//! \]
//!
//! The first form needs an invertible bijector; the second ([`TransformedNormal::push_forward`])
//! only needs the forward pass, which is how residual planar flows are used
//! in variational inference.

use crate::bijector::Bijector;
use crate::math::LN_SQRT_2PI;
use crate::Result;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Per-row log-density of `N(0, I)`: `-0.5 (d ln 2π + ‖z‖²)`.
pub fn standard_normal_log_prob(z: &ArrayView2<f64>) -> Array1<f64> {
    let d = z.ncols() as f64;
    z.map_axis(Axis(1), |row| -0.5 * row.dot(&row) - d * LN_SQRT_2PI)
}

/// The push-forward of a standard normal through a bijector.
#[derive(Debug, Clone)]
pub struct TransformedNormal<B> {
    bijector: B,
}

impl<B: Bijector> TransformedNormal<B> {
    pub fn new(bijector: B) -> Self {
        Self { bijector }
    }

    pub fn bijector(&self) -> &B {
        &self.bijector
    }

    /// `log q(x)` evaluated through the inverse.
    pub fn log_prob(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        let z = self.bijector.inverse(x)?;
        let ildj = self.bijector.inverse_log_det_jacobian(x)?;
        Ok(standard_normal_log_prob(&z.view()) + ildj)
    }

    /// Map base draws `z0` forward; returns `(x, log q(x))`.
    pub fn push_forward(&self, z0: &ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
        let x = self.bijector.forward(z0)?;
        let fldj = self.bijector.forward_log_det_jacobian(z0)?;
        Ok((x, standard_normal_log_prob(z0) - fldj))
    }
}
