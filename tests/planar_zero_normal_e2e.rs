use ndarray::{array, s};
use normflows::{Error, Flow, Planar, Transform};

#[test]
fn residual_planar_with_zero_normal_is_finite_and_volume_preserving() {
    let planar = Planar::new();
    let z = array![[1.0, 1.0], [-2.0, 0.5]];
    let params = array![[0.1, -0.2, 0.0, 0.0, 0.05], [3.0, 1.0, 0.0, 0.0, -1.0]];

    let (out, ldj) = planar.forward(&z.view(), &params.view()).unwrap();
    assert!(out.iter().all(|v| v.is_finite()));
    // û = u, w·z = 0, so z' = z + u tanh(b) and the Jacobian is the identity.
    for i in 0..2 {
        let t = params[[i, 4]].tanh();
        assert!((out[[i, 0]] - (z[[i, 0]] + params[[i, 0]] * t)).abs() < 1e-12);
        assert!((out[[i, 1]] - (z[[i, 1]] + params[[i, 1]] * t)).abs() < 1e-12);
        assert!(ldj[i].abs() < 1e-12);
    }
}

#[test]
fn near_zero_normals_keep_the_residual_map_monotone_along_w() {
    // Nonzero normals far below unit scale, against large directions.
    let planar = Planar::new();
    let z = array![[0.5, 0.5], [0.0, 1.0], [-3.0, 2.0]];
    let params = array![
        [-1e8, 0.0, 1e-7, 0.0, 0.0],
        [5e9, -2e9, -1e-9, 3e-10, 0.1],
        [0.0, 1e6, 0.0, 1e-8, -0.2],
    ];
    let (_, ldj) = planar.forward(&z.view(), &params.view()).unwrap();
    for i in 0..3usize {
        let u = params.slice(s![i, ..2]);
        let w = params.slice(s![i, 2..4]);
        let w_u_hat = w.dot(&planar.u_hat(&u, &w));
        assert!(w_u_hat > -1.0, "row {}: w·û={}", i, w_u_hat);
        // 1 + h' w·û > 0 whenever w·û > -1.
        assert!(ldj[i].is_finite(), "row {}: ldj={}", i, ldj[i]);
    }
}

#[test]
fn domain_errors_propagate_through_a_flow() {
    let flow = Flow::new(2, vec![Box::new(Planar::new()), Box::new(Planar::non_residual())]);
    let z = array![[1.0, 1.0]];
    // Second member has w = 0, so its LDJ is ln 0.
    let params = array![[0.1, -0.2, 0.3, 0.4, 0.05, 0.5, 0.5, 0.0, 0.0, 0.0]];
    let err = flow.forward(&z.view(), &params.view()).unwrap_err();
    assert!(matches!(err, Error::NumericDomain { op: "forward", .. }));
}

#[test]
fn nan_inputs_are_reported_not_returned() {
    let planar = Planar::new();
    let z = array![[f64::NAN, 1.0]];
    let params = array![[0.1, -0.2, 0.3, 0.4, 0.05]];
    assert!(matches!(
        planar.forward(&z.view(), &params.view()),
        Err(Error::NumericDomain { .. })
    ));
}
