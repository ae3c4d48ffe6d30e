// Densities through a bijector.
//
// With z ~ N(0, I) and x = f(z):
//
//   log q(x) = log N(z) - ln|det ∂f/∂z|          (forward only)
//            = log N(f⁻¹(x)) + ln|det ∂f⁻¹/∂x|    (needs an inverse)
//
// For f = exp this is the log-normal. A residual planar flow only supports the
// first form, which is exactly what variational inference needs: draw z, push
// it forward, score it.

use ndarray::{array, Array2};
use normflows::{Exp, Flow, Planar, TransformBijector, TransformedNormal};

fn main() {
    let z = array![[-1.0], [0.0], [0.5], [2.0]];

    let lognormal = TransformedNormal::new(TransformBijector::new(Exp, Array2::zeros((4, 0))));
    let (x, log_q) = lognormal.push_forward(&z.view()).unwrap();
    let log_p = lognormal.log_prob(&x.view()).unwrap();
    for i in 0..4 {
        println!(
            "x = {:.4}: log q (forward) = {:.6}, log q (inverse) = {:.6}",
            x[[i, 0]],
            log_q[i],
            log_p[i]
        );
    }

    let flow = Flow::uniform(3, 2, |_| Planar::new());
    let params = Array2::from_shape_fn((2, flow.total_params()), |(i, j)| {
        0.1 * ((i + 1) as f64) * ((j % 5) as f64 - 2.0)
    });
    let dist = TransformedNormal::new(TransformBijector::new(flow, params));
    let z = array![[0.3, -0.7], [1.0, 1.0]];
    let (x, log_q) = dist.push_forward(&z.view()).unwrap();
    println!("planar flow samples:\n{x:.4}\nlog q = {:?}", log_q.to_vec());
    match dist.log_prob(&x.view()) {
        Ok(_) => println!("unexpected: residual flow inverted"),
        Err(e) => println!("log_prob via inverse: {e}"),
    }
}
