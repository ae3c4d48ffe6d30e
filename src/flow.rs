//! Composition of transforms.
//!
//! A [`Flow`] chains transforms `T_1, …, T_n`. Forward evaluation runs them in
//! declared order and sums the per-step LDJs; inverse evaluation runs the
//! members' inverses in reverse order.
//!
//! All members share one parameter batch. Its columns are partitioned
//! positionally, in declared order, with no delimiters: member `k` reads
//! `param_count(d_k)` columns starting where member `k - 1` stopped. The
//! partition is computed once, when the flow is built for a given input
//! dimensionality.

use crate::transform::{Mapped, Transform};
use crate::{Error, Result};
use ndarray::{s, Array1, Array2, ArrayView2};
use std::fmt;

/// Where a member's parameters live inside the shared parameter batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// First parameter column.
    pub offset: usize,
    /// Number of parameter columns.
    pub width: usize,
    /// Dimensionality entering the member.
    pub input_dim: usize,
    /// Dimensionality leaving the member.
    pub output_dim: usize,
}

impl Segment {
    fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// An ordered chain of transforms with a precomputed parameter layout.
pub struct Flow {
    transforms: Vec<Box<dyn Transform>>,
    segments: Vec<Segment>,
    input_dim: usize,
}

impl Flow {
    /// Build a flow for inputs of dimensionality `input_dim`.
    pub fn new(input_dim: usize, transforms: Vec<Box<dyn Transform>>) -> Self {
        let segments = layout(&transforms, input_dim);
        tracing::debug!(
            input_dim,
            members = transforms.len(),
            param_count = segments.last().map_or(0, Segment::end),
            "built flow parameter layout"
        );
        Self {
            transforms,
            segments,
            input_dim,
        }
    }

    /// A flow of `n` members produced by `make`, e.g. `Flow::uniform(4, 2, |_| Planar::new())`.
    pub fn uniform<T, F>(n: usize, input_dim: usize, mut make: F) -> Self
    where
        T: Transform + 'static,
        F: FnMut(usize) -> T,
    {
        let transforms = (0..n)
            .map(|i| Box::new(make(i)) as Box<dyn Transform>)
            .collect();
        Self::new(input_dim, transforms)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Dimensionality the flow was built for.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Parameter layout, one entry per member in declared order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total parameter columns for the declared input dimensionality.
    pub fn total_params(&self) -> usize {
        self.segments.last().map_or(0, Segment::end)
    }

    /// Forward pass that also returns each member's output and LDJ.
    pub fn steps(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Vec<Mapped>> {
        self.check(z, params, self.input_dim)?;
        let mut out: Vec<Mapped> = Vec::with_capacity(self.len());
        for (i, (t, seg)) in self.transforms.iter().zip(&self.segments).enumerate() {
            let p = params.slice(s![.., seg.offset..seg.end()]);
            let step = match out.last() {
                Some((prev, _)) => t.forward(&prev.view(), &p)?,
                None => t.forward(z, &p)?,
            };
            tracing::trace!(step = i, transform = t.name(), "flow forward step");
            out.push(step);
        }
        Ok(out)
    }

    fn check(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>, dim: usize) -> Result<()> {
        if z.ncols() != dim {
            return Err(Error::ShapeMismatch {
                transform: self.name(),
                what: "sample columns",
                expected: dim,
                got: z.ncols(),
            });
        }
        if params.nrows() != z.nrows() {
            return Err(Error::ShapeMismatch {
                transform: self.name(),
                what: "parameter rows",
                expected: z.nrows(),
                got: params.nrows(),
            });
        }
        if params.ncols() != self.total_params() {
            return Err(Error::ShapeMismatch {
                transform: self.name(),
                what: "parameter columns",
                expected: self.total_params(),
                got: params.ncols(),
            });
        }
        Ok(())
    }
}

fn layout(transforms: &[Box<dyn Transform>], input_dim: usize) -> Vec<Segment> {
    let mut offset = 0;
    let mut d = input_dim;
    transforms
        .iter()
        .map(|t| {
            let seg = Segment {
                offset,
                width: t.param_count(d),
                input_dim: d,
                output_dim: t.output_dim(d),
            };
            offset = seg.end();
            d = seg.output_dim;
            seg
        })
        .collect()
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        f.debug_struct("Flow")
            .field("transforms", &names)
            .field("segments", &self.segments)
            .field("input_dim", &self.input_dim)
            .finish()
    }
}

impl Transform for Flow {
    fn name(&self) -> &'static str {
        "Flow"
    }

    /// Sum of the members' counts along the chain.
    ///
    /// Equals [`Flow::total_params`] for the declared input dimensionality.
    fn param_count(&self, d: usize) -> usize {
        layout(&self.transforms, d).last().map_or(0, Segment::end)
    }

    fn output_dim(&self, d: usize) -> usize {
        self.transforms.iter().fold(d, |d, t| t.output_dim(d))
    }

    fn forward(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        self.check(z, params, self.input_dim)?;
        let mut cur: Array2<f64> = z.to_owned();
        let mut ldj = Array1::zeros(z.nrows());
        for (i, (t, seg)) in self.transforms.iter().zip(&self.segments).enumerate() {
            let p = params.slice(s![.., seg.offset..seg.end()]);
            let (next, step_ldj) = t.forward(&cur.view(), &p)?;
            tracing::trace!(step = i, transform = t.name(), "flow forward step");
            ldj += &step_ldj;
            cur = next;
        }
        Ok((cur, ldj))
    }

    fn inverse(&self, z: &ArrayView2<f64>, params: &ArrayView2<f64>) -> Result<Mapped> {
        let out_dim = self.segments.last().map_or(self.input_dim, |s| s.output_dim);
        self.check(z, params, out_dim)?;
        let mut cur: Array2<f64> = z.to_owned();
        let mut ldj = Array1::zeros(z.nrows());
        for (i, (t, seg)) in self.transforms.iter().zip(&self.segments).enumerate().rev() {
            let p = params.slice(s![.., seg.offset..seg.end()]);
            let (next, step_ldj) = t.inverse(&cur.view(), &p)?;
            tracing::trace!(step = i, transform = t.name(), "flow inverse step");
            ldj += &step_ldj;
            cur = next;
        }
        Ok((cur, ldj))
    }
}
