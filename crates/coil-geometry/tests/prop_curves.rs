// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Property-Based Tests (proptest) for coil-geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for the Fourier curve providers.
//!
//! Covers: coefficient round-trips, linearity of the geometry in the
//! coefficients, coefficient-independence of the sensitivity tensors, and
//! the discrete rotation symmetry of stellarator-symmetric curves.

use coil_geometry::fourier::{
    CartesianFourierCurve, ShapedCurve, StellaratorSymmetricFourierCurve,
};
use nalgebra::Vector3;
use proptest::prelude::*;

fn coeff_vec(n: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-2.0..2.0f64, n)
}

// ── Cartesian Fourier curves ─────────────────────────────────────────

proptest! {
    /// set_coefficients followed by coefficients() returns the same vector.
    #[test]
    fn cartesian_dof_roundtrip(order in 1usize..5, nq in 4usize..48, seed in 0u64..1000) {
        let ndof = 3 * (2 * order - 1);
        let dofs: Vec<f64> = (0..ndof)
            .map(|i| (((seed + i as u64) % 17) as f64) * 0.25 - 2.0)
            .collect();
        let mut curve = CartesianFourierCurve::new(order, nq).unwrap();
        curve.set_coefficients(&dofs).unwrap();
        let back = curve.coefficients();
        prop_assert_eq!(back.len(), ndof);
        for i in 0..ndof {
            prop_assert!((back[i] - dofs[i]).abs() < 1e-15);
        }
        prop_assert!(curve.geometry().validate().is_ok());
    }

    /// Position and tangent are linear in the coefficient vector:
    /// geometry(a + b) = geometry(a) + geometry(b).
    #[test]
    fn cartesian_geometry_is_linear_in_coefficients(
        a in coeff_vec(15),
        b in coeff_vec(15),
        nq in 4usize..32,
    ) {
        let mut curve = CartesianFourierCurve::new(3, nq).unwrap();

        curve.set_coefficients(&a).unwrap();
        let geom_a = curve.geometry().clone();
        curve.set_coefficients(&b).unwrap();
        let geom_b = curve.geometry().clone();

        let sum: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        curve.set_coefficients(&sum).unwrap();
        let geom_sum = curve.geometry();

        for q in 0..nq {
            let dp = geom_sum.position[q] - geom_a.position[q] - geom_b.position[q];
            let dt = geom_sum.tangent[q] - geom_a.tangent[q] - geom_b.tangent[q];
            prop_assert!(dp.norm() < 1e-12, "position not additive at q={}: {}", q, dp.norm());
            prop_assert!(dt.norm() < 1e-11, "tangent not additive at q={}: {}", q, dt.norm());
        }
    }

    /// The sensitivity tensors depend only on the discretization, not on the
    /// coefficient values.
    #[test]
    fn cartesian_sensitivities_are_coefficient_independent(
        a in coeff_vec(15),
        b in coeff_vec(15),
    ) {
        let nq = 16;
        let mut curve = CartesianFourierCurve::new(3, nq).unwrap();
        curve.set_coefficients(&a).unwrap();
        let sens_a = curve.geometry().position_sensitivity.clone();
        let tsens_a = curve.geometry().tangent_sensitivity.clone();
        curve.set_coefficients(&b).unwrap();
        for q in 0..nq {
            for dof in 0..15 {
                let dp = curve.geometry().position_sensitivity[[q, dof]] - sens_a[[q, dof]];
                let dt = curve.geometry().tangent_sensitivity[[q, dof]] - tsens_a[[q, dof]];
                prop_assert!(dp.norm() == 0.0);
                prop_assert!(dt.norm() == 0.0);
            }
        }
    }
}

// ── Stellarator-symmetric curves ─────────────────────────────────────

proptest! {
    /// Advancing the parameter by one field period rotates the curve by
    /// 2π/nfp about the z axis.
    #[test]
    fn stellarator_curve_has_field_period_symmetry(
        dofs in coeff_vec(5),
        nfp in 1usize..5,
    ) {
        let nq = 24 * nfp; // one field period is an integer number of samples
        let mut curve = StellaratorSymmetricFourierCurve::new(3, nfp, nq).unwrap();
        curve.set_coefficients(&dofs).unwrap();
        let geom = curve.geometry();

        let step = nq / nfp;
        let alpha = 2.0 * std::f64::consts::PI / nfp as f64;
        let (sin_a, cos_a) = alpha.sin_cos();
        for q in 0..nq {
            let p = geom.position[q];
            let rotated = Vector3::new(
                cos_a * p.x - sin_a * p.y,
                sin_a * p.x + cos_a * p.y,
                p.z,
            );
            let shifted = geom.position[(q + step) % nq];
            prop_assert!(
                (rotated - shifted).norm() < 1e-10,
                "field-period symmetry broken at q={}: {}",
                q,
                (rotated - shifted).norm()
            );
        }
    }

    /// Round-trip of the flattened [radial | vertical] coefficient vector.
    #[test]
    fn stellarator_dof_roundtrip(dofs in coeff_vec(5)) {
        let mut curve = StellaratorSymmetricFourierCurve::new(3, 2, 20).unwrap();
        curve.set_coefficients(&dofs).unwrap();
        let back = curve.coefficients();
        for i in 0..5 {
            prop_assert!((back[i] - dofs[i]).abs() < 1e-15);
        }
    }
}
