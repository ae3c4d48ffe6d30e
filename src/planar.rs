//! Planar flow.
//!
//! A planar flow bends space along a single hyperplane:
//!
//! \[
//! z' = r\,z + \hat u \, h(w^\top z + b), \qquad h = \tanh
//! \]
//!
//! with `r = 1` for the residual variant (the default) and `r = 0` otherwise.
//! By the matrix-determinant lemma the Jacobian `r I + \hat u\, h'(w^\top z + b)\, w^\top`
//! has determinant `r + h'(w^\top z + b)\, w^\top \hat u` (for `r = 0` this is
//! exact only when `d = 1`, where the map is a scalar function).
//!
//! ## Parameters
//!
//! Each sample carries its own `2d + 1` parameters laid out as `[u | w | b]`.
//!
//! ## Invertibility
//!
//! The raw direction `u` is replaced by
//!
//! \[
//! \hat u = u + \frac{(m(w^\top u) - w^\top u)\, w}{\lVert w \rVert^2}, \qquad m(x) = \mathrm{softplus}(x) - 1
//! \]
//!
//! so that `w·û = m(w·u) > -1`, which keeps the residual map a bijection for
//! every parameter value. A normal that is exactly zero has nothing to correct
//! and leaves `û = u`. Any nonzero `w`, however small, gets the full
//! correction; if `‖w‖²` underflows to zero the division overflows and the
//! forward pass reports [`Error::NumericDomain`] rather than a non-bijective
//! map.
//!
//! The residual map has no closed-form inverse. The non-residual map has rank
//! one, so it can only be inverted in one dimension, where
//! `z = (atanh(z'/û) - b) / w`.
//!
//! ## References
//!
//! - Rezende & Mohamed (2015). "Variational Inference with Normalizing Flows"

use crate::math::{row_dot, softplus, tanh_prime};
use crate::transform::{check_params, ensure_finite, Mapped, Transform};
use crate::{Error, Result};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};

/// Construction-time configuration for [`Planar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanarConfig {
    /// Use the residual form `z' = z + û h(w·z + b)`.
    pub residual: bool,
}

impl Default for PlanarConfig {
    fn default() -> Self {
        Self { residual: true }
    }
}

/// Planar flow with per-sample parameters `[u | w | b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Planar {
    cfg: PlanarConfig,
}

impl Planar {
    /// Residual planar flow (the invertible variant).
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-residual planar flow `z' = û h(w·z + b)`.
    pub fn non_residual() -> Self {
        Self::with_config(PlanarConfig { residual: false })
    }

    /// Planar flow with an explicit configuration.
    pub fn with_config(cfg: PlanarConfig) -> Self {
        Self { cfg }
    }

    /// The configuration this flow was built with.
    pub fn config(&self) -> &PlanarConfig {
        &self.cfg
    }

    /// Re-parameterized direction `û` for a single sample.
    ///
    /// Guarantees `w·û = softplus(w·u) - 1` for every nonzero `w`. A zero `w`
    /// returns `u` unchanged. When `‖w‖²` underflows for a nonzero `w` the
    /// result is non-finite.
    ///
    /// # Panics
    ///
    /// If `u` and `w` have different lengths.
    pub fn u_hat(&self, u: &ArrayView1<f64>, w: &ArrayView1<f64>) -> Array1<f64> {
        assert_eq!(u.len(), w.len(), "u and w must have the same length");
        if w.iter().all(|&x| x == 0.0) {
            return u.to_owned();
        }
        let wu = w.dot(u);
        let alpha = softplus(wu) - 1.0 - wu;
        u + &(w * (alpha / w.dot(w)))
    }

    fn u_hat_batch(&self, u: &ArrayView2<f64>, w: &ArrayView2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros(u.raw_dim());
        Zip::from(out.rows_mut())
            .and(u.rows())
            .and(w.rows())
            .for_each(|mut o, u, w| o.assign(&self.u_hat(&u, &w)));
        out
    }
}

/// Split `[B, 2d + 1]` parameters into `u`, `w` and `b`.
fn split<'a>(
    params: &'a ArrayView2<'_, f64>,
    d: usize,
) -> (ArrayView2<'a, f64>, ArrayView2<'a, f64>, ArrayView1<'a, f64>) {
    (
        params.slice(s![.., ..d]),
        params.slice(s![.., d..2 * d]),
        params.column(2 * d),
    )
}

impl Transform for Planar {
    fn name(&self) -> &'static str {
        "Planar"
    }

    fn param_count(&self, d: usize) -> usize {
        2 * d + 1
    }

    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        let d = z.ncols();
        check_params(self.name(), z, params, self.param_count(d))?;
        let (u, w, b) = split(params, d);

        let u_hat = self.u_hat_batch(&u, &w);
        let wzb = row_dot(&w, z) + &b;
        let h = wzb.mapv(f64::tanh).insert_axis(Axis(1));

        let mut out = &u_hat * &h;
        let r = if self.cfg.residual {
            out += z;
            1.0
        } else {
            0.0
        };

        let w_u_hat = row_dot(&w, &u_hat.view());
        let ldj = Zip::from(&wzb)
            .and(&w_u_hat)
            .map_collect(|&x, &wu| (r + tanh_prime(x) * wu).abs().ln());

        ensure_finite(self.name(), "forward", (out, ldj))
    }

    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        if self.cfg.residual {
            return Err(Error::UnsupportedOperation {
                transform: self.name(),
                op: "inverse",
                reason: "residual planar map has no closed-form inverse",
            });
        }
        let d = z.ncols();
        check_params(self.name(), z, params, self.param_count(d))?;
        if d != 1 {
            return Err(Error::UnsupportedOperation {
                transform: self.name(),
                op: "inverse",
                reason: "non-residual planar map is rank one; only d = 1 is invertible",
            });
        }
        let (u, w, b) = split(params, d);
        let u_hat = self.u_hat_batch(&u, &w);
        let (w, u_hat) = (w.column(0), u_hat.column(0));

        // z' = û tanh(w z + b)  =>  w z + b = atanh(z' / û)
        let wzb = Zip::from(z.column(0))
            .and(u_hat)
            .map_collect(|&y, &uh| (y / uh).atanh());
        let x = Zip::from(&wzb)
            .and(&b)
            .and(w)
            .map_collect(|&a, &b, &w| (a - b) / w);
        let ldj = Zip::from(&wzb)
            .and(w)
            .and(u_hat)
            .map_collect(|&a, &w, &uh| -(tanh_prime(a) * w * uh).abs().ln());

        ensure_finite(self.name(), "inverse", (x.insert_axis(Axis(1)), ldj))
    }
}
