//! Parameter-free elementwise transforms.
//!
//! These act coordinate-wise, so the Jacobian is diagonal and the LDJ is the
//! sum of the log-derivatives of each coordinate.

use crate::transform::{check_params, ensure_finite, Mapped, Transform};
use crate::Result;
use ndarray::{Array1, ArrayView2, Axis};

/// Natural log of 3.
const LN_3: f64 = 1.098_612_288_668_109_8;

/// `z' = z`, `ldj = 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl Transform for Identity {
    fn name(&self) -> &'static str {
        "Identity"
    }

    fn param_count(&self, _d: usize) -> usize {
        0
    }

    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        check_params(self.name(), z, params, 0)?;
        Ok((z.to_owned(), Array1::zeros(z.nrows())))
    }

    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        self.forward(z, params)
    }
}

/// `z' = exp(z)`, mapping `R^d` onto the positive orthant.
///
/// Forward LDJ is `Σ z_j`; inverse LDJ is `-Σ ln z'_j`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exp;

impl Transform for Exp {
    fn name(&self) -> &'static str {
        "Exp"
    }

    fn param_count(&self, _d: usize) -> usize {
        0
    }

    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        check_params(self.name(), z, params, 0)?;
        let out = z.mapv(f64::exp);
        let ldj = z.sum_axis(Axis(1));
        ensure_finite(self.name(), "forward", (out, ldj))
    }

    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        check_params(self.name(), z, params, 0)?;
        // Non-positive inputs give NaN / -inf here and are rejected below.
        let out = z.mapv(f64::ln);
        let ldj = -out.sum_axis(Axis(1));
        ensure_finite(self.name(), "inverse", (out, ldj))
    }
}

/// Real cube root `z' = cbrt(z)`.
///
/// `dz'/dz = 1 / (3 cbrt(z)^2)`, which blows up at zero: coordinates equal to
/// zero make the LDJ infinite and are reported as a domain error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cbrt;

impl Transform for Cbrt {
    fn name(&self) -> &'static str {
        "Cbrt"
    }

    fn param_count(&self, _d: usize) -> usize {
        0
    }

    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        check_params(self.name(), z, params, 0)?;
        let out = z.mapv(f64::cbrt);
        // ln|dz'/dz| = -ln 3 - 2 ln|z'|
        let ldj = out.map_axis(Axis(1), |row| {
            row.iter()
                .map(|&y| -LN_3 - 2.0 * y.abs().ln())
                .sum::<f64>()
        });
        ensure_finite(self.name(), "forward", (out, ldj))
    }

    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        check_params(self.name(), z, params, 0)?;
        let out = z.mapv(|y| y * y * y);
        let ldj = z.map_axis(Axis(1), |row| {
            row.iter().map(|&y| LN_3 + 2.0 * y.abs().ln()).sum::<f64>()
        });
        ensure_finite(self.name(), "inverse", (out, ldj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use ndarray::{array, Array2};
    use proptest::prelude::*;

    fn no_params(b: usize) -> Array2<f64> {
        Array2::zeros((b, 0))
    }

    #[test]
    fn identity_is_identity() {
        let z = array![[1.0, -2.0], [0.0, 3.5]];
        let (out, ldj) = Identity.forward(&z.view(), &no_params(2).view()).unwrap();
        assert_eq!(out, z);
        assert_eq!(ldj, array![0.0, 0.0]);
    }

    #[test]
    fn exp_ldj_is_row_sum() {
        let z = array![[0.5, -1.0, 2.0]];
        let (out, ldj) = Exp.forward(&z.view(), &no_params(1).view()).unwrap();
        assert!((out[[0, 0]] - 0.5_f64.exp()).abs() < 1e-15);
        assert!((ldj[0] - 1.5).abs() < 1e-15);
    }

    #[test]
    fn exp_inverse_rejects_non_positive() {
        let z = array![[1.0, 0.0]];
        let err = Exp.inverse(&z.view(), &no_params(1).view()).unwrap_err();
        assert!(matches!(err, Error::NumericDomain { transform: "Exp", .. }));

        let z = array![[-1.0, 1.0]];
        assert!(Exp.inverse(&z.view(), &no_params(1).view()).is_err());
    }

    #[test]
    fn cbrt_is_odd_and_matches_derivative() {
        let z = array![[8.0, -27.0]];
        let (out, ldj) = Cbrt.forward(&z.view(), &no_params(1).view()).unwrap();
        assert!((out[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((out[[0, 1]] + 3.0).abs() < 1e-12);
        // d/dz cbrt at 8 is 1/12, at -27 is 1/27.
        let expected = (1.0_f64 / 12.0).ln() + (1.0_f64 / 27.0).ln();
        assert!((ldj[0] - expected).abs() < 1e-12, "ldj={} expected={}", ldj[0], expected);
    }

    #[test]
    fn cbrt_at_zero_is_a_domain_error() {
        let z = array![[0.0, 1.0]];
        let err = Cbrt.forward(&z.view(), &no_params(1).view()).unwrap_err();
        assert!(matches!(err, Error::NumericDomain { transform: "Cbrt", op: "forward", .. }));
    }

    #[test]
    fn parameterised_call_is_rejected() {
        let z = array![[1.0, 2.0]];
        let p = array![[0.0]];
        let all: [&dyn Transform; 3] = [&Identity, &Exp, &Cbrt];
        for t in all {
            assert_eq!(t.param_count(2), 0);
            assert!(matches!(
                t.forward(&z.view(), &p.view()),
                Err(Error::ShapeMismatch { expected: 0, got: 1, .. })
            ));
        }
    }

    proptest! {
        #[test]
        fn exp_round_trip(xs in prop::collection::vec(-5.0f64..5.0, 1..6)) {
            let z = Array2::from_shape_vec((1, xs.len()), xs).unwrap();
            let p = no_params(1);
            let (y, fldj) = Exp.forward(&z.view(), &p.view()).unwrap();
            let (back, ildj) = Exp.inverse(&y.view(), &p.view()).unwrap();
            for (a, b) in back.iter().zip(z.iter()) {
                prop_assert!((a - b).abs() < 1e-10);
            }
            prop_assert!((fldj[0] + ildj[0]).abs() < 1e-10);
        }

        #[test]
        fn cbrt_round_trip(
            xs in prop::collection::vec(prop_oneof![-50.0f64..-0.01, 0.01f64..50.0], 1..6)
        ) {
            let z = Array2::from_shape_vec((1, xs.len()), xs).unwrap();
            let p = no_params(1);
            let (y, fldj) = Cbrt.forward(&z.view(), &p.view()).unwrap();
            let (back, ildj) = Cbrt.inverse(&y.view(), &p.view()).unwrap();
            for (a, b) in back.iter().zip(z.iter()) {
                prop_assert!((a - b).abs() < 1e-9 * b.abs().max(1.0));
            }
            prop_assert!((fldj[0] + ildj[0]).abs() < 1e-9);
        }
    }
}
