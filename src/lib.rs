//! # normflows
//!
//! Invertible parametric transforms for normalizing flows.
//!
//! ## The Problem
//!
//! A normalizing flow turns a simple base density (a standard normal) into a
//! complex one by pushing samples through a chain of bijections. Each step
//! changes volume, and the density of the result is only correct if every
//! step reports its log-determinant-Jacobian (LDJ):
//!
//! \[
//! \log q(f(z)) = \log p(z) - \log \left| \det \frac{\partial f}{\partial z} \right|
//! \]
//!
//! This crate provides the transforms, their exact LDJs, and the combinators to
//! chain and invert them. Parameters are per-sample and come from outside
//! (an amortizing network, an optimizer, a fixture): every call takes a sample
//! batch `[B, d]` and a parameter batch `[B, p]`.
//!
//! ## Key Types
//!
//! | Type | Role | Parameters for `d` |
//! |------|------|--------------------|
//! | [`Transform`] | forward / inverse / LDJ contract | `param_count(d)` |
//! | [`Planar`] | `z + û tanh(w·z + b)` | `2d + 1` |
//! | [`Identity`], [`Exp`], [`Cbrt`] | elementwise bijections | `0` |
//! | [`Invert`] | swaps directions | delegated |
//! | [`Flow`] | ordered composition | sum of members |
//! | [`TransformBijector`] | binds parameters for a [`Bijector`] consumer | bound |
//! | [`TransformedNormal`] | change-of-variables density | bound |
//!
//! ## Quick Start
//!
//! ```rust
//! use normflows::{Exp, Flow, Planar, Transform};
//! use ndarray::{array, Array2};
//!
//! // Two planar steps with an exp in between, on 2-d inputs.
//! let flow = Flow::new(2, vec![Box::new(Planar::new()), Box::new(Exp), Box::new(Planar::new())]);
//! assert_eq!(flow.total_params(), 10);
//!
//! let z = array![[1.0, 1.0], [0.5, -0.5]];
//! let params = Array2::from_elem((2, 10), 0.1);
//! let (x, ldj) = flow.forward(&z.view(), &params.view()).unwrap();
//! assert_eq!(x.dim(), (2, 2));
//! assert_eq!(ldj.len(), 2);
//! ```
//!
//! ## What Can Go Wrong
//!
//! 1. **Parameter layout**: a [`Flow`] slices its parameter batch positionally,
//!    in member order. Assemble parameters in exactly that order; see [`Flow::segments`].
//! 2. **Residual planar has no inverse**: [`Planar::new`] only goes forward. Use
//!    [`TransformedNormal::push_forward`] for densities of forward samples.
//! 3. **Non-finite results**: degenerate parameters or out-of-domain inputs
//!    (e.g. `ln` of a negative number in `Exp::inverse`) return
//!    [`Error::NumericDomain`] instead of NaN.
//!
//! ## References
//!
//! - Rezende & Mohamed (2015). "Variational Inference with Normalizing Flows"
//! - Papamakarios et al. (2021). "Normalizing Flows for Probabilistic Modeling and Inference"

use thiserror::Error;

pub mod bijector;
pub mod density;
pub mod elementwise;
pub mod flow;
pub mod invert;
pub mod math;
pub mod planar;
pub mod transform;

pub use bijector::{Bijector, TransformBijector};
pub use density::{standard_normal_log_prob, TransformedNormal};
pub use elementwise::{Cbrt, Exp, Identity};
pub use flow::{Flow, Segment};
pub use invert::Invert;
pub use planar::{Planar, PlanarConfig};
pub use transform::{Mapped, Transform};

/// Flow error variants.
#[derive(Debug, Error)]
pub enum Error {
    /// A sample or parameter batch has the wrong shape for the transform.
    #[error("{transform}: {what} mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        transform: &'static str,
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// The requested direction is not defined for this transform or configuration.
    #[error("{transform}: {op} is not supported: {reason}")]
    UnsupportedOperation {
        transform: &'static str,
        op: &'static str,
        reason: &'static str,
    },

    /// Parameters or inputs lie outside the transform's domain.
    #[error("{transform}: {op}: {detail}")]
    NumericDomain {
        transform: &'static str,
        op: &'static str,
        detail: &'static str,
    },
}

/// Result type for flow operations.
pub type Result<T> = std::result::Result<T, Error>;
