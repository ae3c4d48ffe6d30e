//! The transform contract shared by every member of a flow.
//!
//! A transform is a batched bijection `z -> z'` whose per-sample parameters are
//! supplied by the caller. Each call returns the mapped batch together with the
//! per-sample log-absolute-determinant of the Jacobian (LDJ) of the direction
//! that was actually evaluated:
//!
//! \[
//! \text{ldj}_i = \log \left| \det \frac{\partial z'_i}{\partial z_i} \right|
//! \]
//!
//! Consequently `forward_ldj(z) + inverse_ldj(forward(z)) = 0` for any
//! transform supporting both directions.

use crate::{Error, Result};
use ndarray::{Array1, Array2, ArrayView2};

/// Mapped batch `[B, d']` and per-sample LDJ `[B]`.
pub type Mapped = (Array2<f64>, Array1<f64>);

/// A batched, parameterized bijection with exact log-det-Jacobian.
///
/// Implementations are stateless with respect to data: the only state is
/// construction-time configuration.
pub trait Transform: Send + Sync {
    /// Short name used in errors and log events.
    fn name(&self) -> &'static str;

    /// Number of parameter columns consumed for input dimensionality `d`.
    fn param_count(&self, d: usize) -> usize;

    /// Output dimensionality for input dimensionality `d`.
    fn output_dim(&self, d: usize) -> usize {
        d
    }

    /// Map `z` (`[B, d]`) forward using `params` (`[B, param_count(d)]`).
    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped>;

    /// Map `z` (`[B, d']`) back to the input space.
    ///
    /// Transforms without a closed-form inverse keep this default.
    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        let _ = (z, params);
        Err(Error::UnsupportedOperation {
            transform: self.name(),
            op: "inverse",
            reason: "no closed-form inverse",
        })
    }
}

impl<T: Transform + ?Sized> Transform for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn param_count(&self, d: usize) -> usize {
        (**self).param_count(d)
    }
    fn output_dim(&self, d: usize) -> usize {
        (**self).output_dim(d)
    }
    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        (**self).forward(z, params)
    }
    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        (**self).inverse(z, params)
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn param_count(&self, d: usize) -> usize {
        (**self).param_count(d)
    }
    fn output_dim(&self, d: usize) -> usize {
        (**self).output_dim(d)
    }
    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        (**self).forward(z, params)
    }
    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        (**self).inverse(z, params)
    }
}

/// Check that `params` has one row per sample and exactly `expected` columns.
pub(crate) fn check_params(
    transform: &'static str,
    z: &ArrayView2<f64>,
    params: &ArrayView2<f64>,
    expected: usize,
) -> Result<()> {
    if params.nrows() != z.nrows() {
        return Err(Error::ShapeMismatch {
            transform,
            what: "parameter rows",
            expected: z.nrows(),
            got: params.nrows(),
        });
    }
    if params.ncols() != expected {
        return Err(Error::ShapeMismatch {
            transform,
            what: "parameter columns",
            expected,
            got: params.ncols(),
        });
    }
    Ok(())
}

/// Reject outputs containing NaN or infinities.
///
/// Transforms never hand non-finite values back silently; a degenerate
/// parameter or an input outside the domain surfaces as [`Error::NumericDomain`].
pub(crate) fn ensure_finite(
    transform: &'static str,
    op: &'static str,
    mapped: Mapped,
) -> Result<Mapped> {
    let (z, ldj) = &mapped;
    if !z.iter().all(|v| v.is_finite()) {
        tracing::debug!(transform, op, "non-finite transform output");
        return Err(Error::NumericDomain {
            transform,
            op,
            detail: "output contains non-finite values",
        });
    }
    if !ldj.iter().all(|v| v.is_finite()) {
        tracing::debug!(transform, op, "non-finite log-det-jacobian");
        return Err(Error::NumericDomain {
            transform,
            op,
            detail: "log-det-jacobian is not finite",
        });
    }
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    struct Shift;

    impl Transform for Shift {
        fn name(&self) -> &'static str {
            "Shift"
        }
        fn param_count(&self, d: usize) -> usize {
            d
        }
        fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
            check_params(self.name(), z, params, self.param_count(z.ncols()))?;
            Ok((z + params, Array1::zeros(z.nrows())))
        }
    }

    #[test]
    fn default_inverse_is_unsupported() {
        let z = array![[1.0, 2.0]];
        let p = array![[0.5, 0.5]];
        let err = Shift.inverse(&z.view(), &p.view()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedOperation { transform: "Shift", op: "inverse", .. }
        ));
    }

    fn forward_via<T: Transform>(t: T, z: &Array2<f64>, p: &Array2<f64>) -> Mapped {
        t.forward(&z.view(), &p.view()).unwrap()
    }

    #[test]
    fn boxed_and_borrowed_delegate() {
        let z = array![[1.0, 2.0]];
        let p = array![[0.5, -0.5]];
        let boxed: Box<dyn Transform> = Box::new(Shift);
        let (a, _) = forward_via(&*boxed, &z, &p);
        let (b, _) = forward_via(&Shift, &z, &p);
        assert_eq!(a, array![[1.5, 1.5]]);
        assert_eq!(a, b);
        assert_eq!(boxed.output_dim(7), 7);
    }

    #[test]
    fn check_params_rejects_wrong_width_and_rows() {
        let z = Array2::<f64>::zeros((2, 3));
        let narrow = Array2::<f64>::zeros((2, 2));
        let short = Array2::<f64>::zeros((1, 3));
        assert!(matches!(
            check_params("t", &z.view(), &narrow.view(), 3),
            Err(Error::ShapeMismatch { what: "parameter columns", expected: 3, got: 2, .. })
        ));
        assert!(matches!(
            check_params("t", &z.view(), &short.view(), 3),
            Err(Error::ShapeMismatch { what: "parameter rows", expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn ensure_finite_flags_nan_and_inf() {
        let ok = (array![[1.0]], array![0.0]);
        assert!(ensure_finite("t", "forward", ok).is_ok());

        let nan = (array![[f64::NAN]], array![0.0]);
        assert!(matches!(
            ensure_finite("t", "forward", nan),
            Err(Error::NumericDomain { op: "forward", .. })
        ));

        let inf_ldj = (array![[1.0]], array![f64::NEG_INFINITY]);
        assert!(matches!(
            ensure_finite("t", "inverse", inf_ldj),
            Err(Error::NumericDomain { op: "inverse", .. })
        ));
    }
}
