// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Field Invariant Tests
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Physical invariants of the discretized Biot–Savart field: divergence- and
//! curl-freedom off the coil, symmetry of the second derivative, and the
//! super-algebraic convergence of the uniform trapezoidal quadrature.

use coil_field::biot_savart::{BiotSavart, Coil, DerivativeMethod};
use coil_geometry::fourier::CartesianFourierCurve;
use coil_geometry::fourier::ShapedCurve;
use coil_types::error::CoilError;
use nalgebra::Vector3;

/// Order-3 coil with y(φ) = 1 + 0.5 sin 2πφ, z(φ) = 0.5 cos 2πφ.
fn get_coil(num_quadrature_points: usize) -> CartesianFourierCurve {
    let mut coil = CartesianFourierCurve::new(3, num_quadrature_points).unwrap();
    coil.set_coefficient(1, 0, 1.0).unwrap();
    coil.set_coefficient(1, 1, 0.5).unwrap();
    coil.set_coefficient(2, 2, 0.5).unwrap();
    coil
}

fn probe_point() -> Vector3<f64> {
    Vector3::new(-1.41513202e-3, 8.99999382e-1, -3.14473221e-4)
}

#[test]
fn test_field_converges_super_algebraically() {
    let bs = BiotSavart::new(DerivativeMethod::Direct);
    let points = [probe_point()];
    let field_at = |nq: usize| {
        let coil = get_coil(nq);
        bs.field(&points, &[Coil::new(coil.geometry(), 1e4)]).unwrap()[0]
    };
    let b_true = field_at(1000);
    let b_coarse = field_at(10);
    let b_fine = field_at(20);
    // Going from 10 to 1000 quadrature points must buy at least four orders
    // of magnitude over the 10-vs-20 difference.
    assert!(
        (b_true - b_fine).norm() < 1e-4 * (b_coarse - b_fine).norm(),
        "residual {} vs coarse step {}",
        (b_true - b_fine).norm(),
        (b_coarse - b_fine).norm()
    );
}

#[test]
fn test_db_dx_is_symmetric_and_divergence_free() {
    let coil = get_coil(200);
    let bs = BiotSavart::new(DerivativeMethod::Direct);
    let db = bs
        .db_dx(&[probe_point()], &[Coil::new(coil.geometry(), 1e4)])
        .unwrap()[0];

    let trace = db[(0, 0)] + db[(1, 1)] + db[(2, 2)];
    assert!(trace.abs() < 1e-14, "div B = {trace}");

    let asym = (db - db.transpose()).norm();
    assert!(asym < 1e-12 * db.norm(), "curl residual {asym}");
}

#[test]
fn test_d2b_dx2_is_symmetric_in_spatial_indices() {
    let coil = get_coil(200);
    let bs = BiotSavart::new(DerivativeMethod::Direct);
    let d2b = bs
        .d2b_dx2(&[probe_point()], &[Coil::new(coil.geometry(), 1e4)])
        .unwrap()[0];
    for comp in 0..3 {
        let m = d2b[comp];
        let asym = (m - m.transpose()).norm();
        assert!(
            asym < 1e-12 * m.norm().max(1e-300),
            "component {comp}: asymmetry {asym}"
        );
    }
}

#[test]
fn test_invariants_hold_at_generic_points() {
    let coil = get_coil(128);
    let bs = BiotSavart::new(DerivativeMethod::Direct);
    let points = [
        Vector3::new(0.2, 0.3, 0.1),
        Vector3::new(-0.5, 1.6, 0.4),
        Vector3::new(0.05, 0.95, 0.0),
    ];
    let db = bs
        .db_dx(&points, &[Coil::new(coil.geometry(), 1e4)])
        .unwrap();
    for (i, m) in db.iter().enumerate() {
        let trace = m[(0, 0)] + m[(1, 1)] + m[(2, 2)];
        assert!(trace.abs() < 1e-12 * m.norm(), "point {i}: div B = {trace}");
    }
}

#[test]
fn test_evaluating_on_the_coil_is_a_singular_evaluation() {
    let coil = get_coil(64);
    let bs = BiotSavart::new(DerivativeMethod::Direct);
    let on_curve = coil.geometry().position[17];
    let err = bs
        .field(&[on_curve], &[Coil::new(coil.geometry(), 1e4)])
        .unwrap_err();
    match err {
        CoilError::SingularEvaluation {
            point_index,
            quadrature_index,
            ..
        } => {
            assert_eq!(point_index, 0);
            assert_eq!(quadrature_index, 17);
        }
        other => panic!("expected SingularEvaluation, got {other:?}"),
    }

    // The derivative tensors surface the same error.
    assert!(bs
        .db_dx(&[on_curve], &[Coil::new(coil.geometry(), 1e4)])
        .is_err());
    assert!(bs
        .db_dcoeff(&[on_curve], &[Coil::new(coil.geometry(), 1e4)])
        .is_err());
}
