// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Curve Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Discretized curve snapshots consumed by the field kernel.

use coil_types::error::{CoilError, CoilResult};
use nalgebra::Vector3;
use ndarray::Array2;

/// Geometry of a discretized closed curve at one shape state.
///
/// The curve is sampled at `Nq` uniform parameter values φ_k = k/Nq on
/// [0, 1), together with the sensitivity of position and tangent to each of
/// the `Ndof` shape coefficients. Snapshots are plain data: providers rebuild
/// them after any coefficient update, and the field kernel borrows one for
/// the duration of a single evaluation call, never across calls.
#[derive(Debug, Clone)]
pub struct CurveGeometry {
    /// (m) positions γ(φ_k), length Nq.
    pub position: Vec<Vector3<f64>>,
    /// (m) tangents dγ/dφ at φ_k, length Nq.
    pub tangent: Vec<Vector3<f64>>,
    /// ∂γ(φ_k)/∂c_d, shape (Nq, Ndof).
    pub position_sensitivity: Array2<Vector3<f64>>,
    /// ∂(dγ/dφ)(φ_k)/∂c_d, shape (Nq, Ndof).
    pub tangent_sensitivity: Array2<Vector3<f64>>,
}

impl CurveGeometry {
    pub fn num_quadrature_points(&self) -> usize {
        self.position.len()
    }

    pub fn num_coefficients(&self) -> usize {
        self.position_sensitivity.ncols()
    }

    /// Check that the declared dimensions are mutually consistent.
    pub fn validate(&self) -> CoilResult<()> {
        let nq = self.position.len();
        if nq == 0 {
            return Err(CoilError::DimensionMismatch(
                "curve geometry has no quadrature points".to_string(),
            ));
        }
        if self.tangent.len() != nq {
            return Err(CoilError::DimensionMismatch(format!(
                "{} positions but {} tangents",
                nq,
                self.tangent.len()
            )));
        }
        if self.position_sensitivity.nrows() != nq || self.tangent_sensitivity.nrows() != nq {
            return Err(CoilError::DimensionMismatch(format!(
                "sensitivity tensors declare {} and {} quadrature points, geometry has {}",
                self.position_sensitivity.nrows(),
                self.tangent_sensitivity.nrows(),
                nq
            )));
        }
        if self.position_sensitivity.ncols() != self.tangent_sensitivity.ncols() {
            return Err(CoilError::DimensionMismatch(format!(
                "position sensitivity declares {} coefficients, tangent sensitivity {}",
                self.position_sensitivity.ncols(),
                self.tangent_sensitivity.ncols()
            )));
        }
        Ok(())
    }

    /// (m) |dγ/dφ| at each quadrature point, the arclength weight of the
    /// uniform-parameter quadrature.
    pub fn arc_lengths(&self) -> Vec<f64> {
        self.tangent.iter().map(|t| t.norm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn dummy(nq: usize, ndof: usize) -> CurveGeometry {
        CurveGeometry {
            position: vec![Vector3::zeros(); nq],
            tangent: vec![Vector3::new(1.0, 0.0, 0.0); nq],
            position_sensitivity: Array2::from_elem((nq, ndof), Vector3::zeros()),
            tangent_sensitivity: Array2::from_elem((nq, ndof), Vector3::zeros()),
        }
    }

    #[test]
    fn test_validate_accepts_consistent_geometry() {
        assert!(dummy(8, 5).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_curve() {
        assert!(dummy(0, 5).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tangent_length_mismatch() {
        let mut geom = dummy(8, 5);
        geom.tangent.pop();
        assert!(geom.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inconsistent_ndof() {
        let mut geom = dummy(8, 5);
        geom.tangent_sensitivity = Array2::from_elem((8, 4), Vector3::zeros());
        assert!(matches!(
            geom.validate(),
            Err(CoilError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_arc_lengths_are_tangent_norms() {
        let geom = dummy(4, 2);
        let arc = geom.arc_lengths();
        assert_eq!(arc.len(), 4);
        for a in arc {
            assert!((a - 1.0).abs() < 1e-15);
        }
    }
}
