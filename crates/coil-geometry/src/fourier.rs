// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Fourier Curves
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fourier-parametrized closed curves and their shape sensitivities.
//!
//! Two parametrizations: a free Cartesian Fourier series for the coils
//! themselves, and a stellarator-symmetric cylindrical series for the target
//! curve (the intended magnetic axis). Both keep a [`CurveGeometry`] snapshot
//! in sync with their coefficient vector.

use std::f64::consts::PI;

use coil_types::error::{CoilError, CoilResult};
use nalgebra::Vector3;
use ndarray::{Array1, Array2};

use crate::geometry::CurveGeometry;

/// Shape-parametrized closed curve: the contract between a geometry provider
/// and the field kernel.
///
/// Implementations rebuild their geometry snapshot before
/// `set_coefficients` returns, so the snapshot always reflects the current
/// coefficient vector.
pub trait ShapedCurve {
    fn num_coefficients(&self) -> usize;

    /// Flattened shape-coefficient vector.
    fn coefficients(&self) -> Array1<f64>;

    /// Replace the coefficient vector and rebuild the geometry snapshot.
    fn set_coefficients(&mut self, coefficients: &[f64]) -> CoilResult<()>;

    /// Geometry snapshot for the current coefficients.
    fn geometry(&self) -> &CurveGeometry;
}

/// Closed curve with an independent Fourier series per Cartesian dimension:
///
///   γ_d(φ) = c_{d,0} + Σ_{j=1}^{o−1} c_{d,2j−1} sin(2πjφ) + c_{d,2j} cos(2πjφ)
///
/// 2·order − 1 coefficients per dimension; the flattened coefficient vector
/// is the x block followed by the y and z blocks.
#[derive(Debug, Clone)]
pub struct CartesianFourierCurve {
    order: usize,
    quadrature: Vec<f64>,
    coefficients: [Array1<f64>; 3],
    geometry: CurveGeometry,
}

/// Value and φ-derivative of the m-th Cartesian Fourier basis function
/// [1, sin(2πφ), cos(2πφ), sin(4πφ), cos(4πφ), …].
fn cartesian_basis(m: usize, phi: f64) -> (f64, f64) {
    if m == 0 {
        return (1.0, 0.0);
    }
    let j = ((m + 1) / 2) as f64;
    let omega = 2.0 * PI * j;
    let arg = omega * phi;
    if m % 2 == 1 {
        (arg.sin(), omega * arg.cos())
    } else {
        (arg.cos(), -omega * arg.sin())
    }
}

fn uniform_quadrature(nq: usize) -> Vec<f64> {
    (0..nq).map(|k| k as f64 / nq as f64).collect()
}

fn empty_geometry() -> CurveGeometry {
    CurveGeometry {
        position: Vec::new(),
        tangent: Vec::new(),
        position_sensitivity: Array2::from_elem((0, 0), Vector3::zeros()),
        tangent_sensitivity: Array2::from_elem((0, 0), Vector3::zeros()),
    }
}

impl CartesianFourierCurve {
    /// A flat (all-zero) curve of the given Fourier order, discretized at
    /// `num_quadrature_points` uniform parameter values on [0, 1).
    pub fn new(order: usize, num_quadrature_points: usize) -> CoilResult<Self> {
        if order < 1 {
            return Err(CoilError::ConfigError(format!(
                "fourier order must be >= 1, got {order}"
            )));
        }
        if num_quadrature_points < 1 {
            return Err(CoilError::ConfigError(format!(
                "quadrature point count must be >= 1, got {num_quadrature_points}"
            )));
        }
        let per_dim = 2 * order - 1;
        let mut curve = Self {
            order,
            quadrature: uniform_quadrature(num_quadrature_points),
            coefficients: [
                Array1::zeros(per_dim),
                Array1::zeros(per_dim),
                Array1::zeros(per_dim),
            ],
            geometry: empty_geometry(),
        };
        curve.rebuild_geometry();
        Ok(curve)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Set one coefficient of dimension `dim` (0..3); `index` selects within
    /// [c₀, s₁, c₁, s₂, c₂, …]. Rebuilds the geometry snapshot.
    pub fn set_coefficient(&mut self, dim: usize, index: usize, value: f64) -> CoilResult<()> {
        let per_dim = 2 * self.order - 1;
        if dim >= 3 || index >= per_dim {
            return Err(CoilError::DimensionMismatch(format!(
                "coefficient ({dim}, {index}) out of range for order {}",
                self.order
            )));
        }
        self.coefficients[dim][index] = value;
        self.rebuild_geometry();
        Ok(())
    }

    fn rebuild_geometry(&mut self) {
        let nq = self.quadrature.len();
        let per_dim = 2 * self.order - 1;
        let ndof = 3 * per_dim;

        let mut position = vec![Vector3::zeros(); nq];
        let mut tangent = vec![Vector3::zeros(); nq];
        let mut position_sensitivity = Array2::from_elem((nq, ndof), Vector3::zeros());
        let mut tangent_sensitivity = Array2::from_elem((nq, ndof), Vector3::zeros());

        for (q, &phi) in self.quadrature.iter().enumerate() {
            for dim in 0..3 {
                for m in 0..per_dim {
                    let (basis, dbasis) = cartesian_basis(m, phi);
                    let c = self.coefficients[dim][m];
                    position[q][dim] += c * basis;
                    tangent[q][dim] += c * dbasis;
                    let dof = dim * per_dim + m;
                    position_sensitivity[[q, dof]][dim] = basis;
                    tangent_sensitivity[[q, dof]][dim] = dbasis;
                }
            }
        }

        self.geometry = CurveGeometry {
            position,
            tangent,
            position_sensitivity,
            tangent_sensitivity,
        };
    }
}

impl ShapedCurve for CartesianFourierCurve {
    fn num_coefficients(&self) -> usize {
        3 * (2 * self.order - 1)
    }

    fn coefficients(&self) -> Array1<f64> {
        let per_dim = 2 * self.order - 1;
        let mut dofs = Array1::zeros(3 * per_dim);
        for dim in 0..3 {
            for m in 0..per_dim {
                dofs[dim * per_dim + m] = self.coefficients[dim][m];
            }
        }
        dofs
    }

    fn set_coefficients(&mut self, coefficients: &[f64]) -> CoilResult<()> {
        let per_dim = 2 * self.order - 1;
        if coefficients.len() != 3 * per_dim {
            return Err(CoilError::DimensionMismatch(format!(
                "expected {} coefficients, got {}",
                3 * per_dim,
                coefficients.len()
            )));
        }
        for dim in 0..3 {
            for m in 0..per_dim {
                self.coefficients[dim][m] = coefficients[dim * per_dim + m];
            }
        }
        self.rebuild_geometry();
        Ok(())
    }

    fn geometry(&self) -> &CurveGeometry {
        &self.geometry
    }
}

/// Stellarator-symmetric closed curve in cylindrical coordinates:
///
///   R(φ) = Σ_{i=0}^{o−1} r_i cos(2π·nfp·i·φ)
///   Z(φ) = Σ_{i=0}^{o−2} z_i sin(2π·nfp·(i+1)·φ)
///   γ(φ) = (R cos 2πφ, R sin 2πφ, Z)
///
/// Flattened coefficient vector: radial block then vertical block,
/// 2·order − 1 entries in total.
#[derive(Debug, Clone)]
pub struct StellaratorSymmetricFourierCurve {
    order: usize,
    field_periods: usize,
    quadrature: Vec<f64>,
    radial: Array1<f64>,
    vertical: Array1<f64>,
    geometry: CurveGeometry,
}

impl StellaratorSymmetricFourierCurve {
    pub fn new(order: usize, field_periods: usize, num_quadrature_points: usize) -> CoilResult<Self> {
        if order < 1 {
            return Err(CoilError::ConfigError(format!(
                "fourier order must be >= 1, got {order}"
            )));
        }
        if field_periods < 1 {
            return Err(CoilError::ConfigError(format!(
                "field period count must be >= 1, got {field_periods}"
            )));
        }
        if num_quadrature_points < 1 {
            return Err(CoilError::ConfigError(format!(
                "quadrature point count must be >= 1, got {num_quadrature_points}"
            )));
        }
        let mut curve = Self {
            order,
            field_periods,
            quadrature: uniform_quadrature(num_quadrature_points),
            radial: Array1::zeros(order),
            vertical: Array1::zeros(order - 1),
            geometry: empty_geometry(),
        };
        curve.rebuild_geometry();
        Ok(curve)
    }

    pub fn field_periods(&self) -> usize {
        self.field_periods
    }

    /// Set the i-th radial harmonic r_i. Rebuilds the geometry snapshot.
    pub fn set_radial_coefficient(&mut self, index: usize, value: f64) -> CoilResult<()> {
        if index >= self.order {
            return Err(CoilError::DimensionMismatch(format!(
                "radial coefficient {index} out of range for order {}",
                self.order
            )));
        }
        self.radial[index] = value;
        self.rebuild_geometry();
        Ok(())
    }

    /// Set the i-th vertical harmonic z_i. Rebuilds the geometry snapshot.
    pub fn set_vertical_coefficient(&mut self, index: usize, value: f64) -> CoilResult<()> {
        if index + 1 >= self.order {
            return Err(CoilError::DimensionMismatch(format!(
                "vertical coefficient {index} out of range for order {}",
                self.order
            )));
        }
        self.vertical[index] = value;
        self.rebuild_geometry();
        Ok(())
    }

    fn rebuild_geometry(&mut self) {
        let nq = self.quadrature.len();
        let ndof = 2 * self.order - 1;
        let nfp = self.field_periods as f64;

        let mut position = vec![Vector3::zeros(); nq];
        let mut tangent = vec![Vector3::zeros(); nq];
        let mut position_sensitivity = Array2::from_elem((nq, ndof), Vector3::zeros());
        let mut tangent_sensitivity = Array2::from_elem((nq, ndof), Vector3::zeros());

        for (q, &phi) in self.quadrature.iter().enumerate() {
            let theta = 2.0 * PI * phi;
            let (sin_t, cos_t) = theta.sin_cos();

            let mut r = 0.0;
            let mut dr = 0.0;
            for i in 0..self.order {
                let omega = 2.0 * PI * nfp * i as f64;
                let arg = omega * phi;
                r += self.radial[i] * arg.cos();
                dr -= self.radial[i] * omega * arg.sin();

                // ∂γ/∂r_i and ∂(dγ/dφ)/∂r_i
                position_sensitivity[[q, i]] =
                    Vector3::new(arg.cos() * cos_t, arg.cos() * sin_t, 0.0);
                tangent_sensitivity[[q, i]] = Vector3::new(
                    -omega * arg.sin() * cos_t - 2.0 * PI * arg.cos() * sin_t,
                    -omega * arg.sin() * sin_t + 2.0 * PI * arg.cos() * cos_t,
                    0.0,
                );
            }

            let mut z = 0.0;
            let mut dz = 0.0;
            for i in 0..self.order - 1 {
                let omega = 2.0 * PI * nfp * (i + 1) as f64;
                let arg = omega * phi;
                z += self.vertical[i] * arg.sin();
                dz += self.vertical[i] * omega * arg.cos();

                let dof = self.order + i;
                position_sensitivity[[q, dof]] = Vector3::new(0.0, 0.0, arg.sin());
                tangent_sensitivity[[q, dof]] = Vector3::new(0.0, 0.0, omega * arg.cos());
            }

            position[q] = Vector3::new(r * cos_t, r * sin_t, z);
            tangent[q] = Vector3::new(
                dr * cos_t - 2.0 * PI * r * sin_t,
                dr * sin_t + 2.0 * PI * r * cos_t,
                dz,
            );
        }

        self.geometry = CurveGeometry {
            position,
            tangent,
            position_sensitivity,
            tangent_sensitivity,
        };
    }
}

impl ShapedCurve for StellaratorSymmetricFourierCurve {
    fn num_coefficients(&self) -> usize {
        2 * self.order - 1
    }

    fn coefficients(&self) -> Array1<f64> {
        let mut dofs = Array1::zeros(2 * self.order - 1);
        for i in 0..self.order {
            dofs[i] = self.radial[i];
        }
        for i in 0..self.order - 1 {
            dofs[self.order + i] = self.vertical[i];
        }
        dofs
    }

    fn set_coefficients(&mut self, coefficients: &[f64]) -> CoilResult<()> {
        let ndof = 2 * self.order - 1;
        if coefficients.len() != ndof {
            return Err(CoilError::DimensionMismatch(format!(
                "expected {} coefficients, got {}",
                ndof,
                coefficients.len()
            )));
        }
        for i in 0..self.order {
            self.radial[i] = coefficients[i];
        }
        for i in 0..self.order - 1 {
            self.vertical[i] = coefficients[self.order + i];
        }
        self.rebuild_geometry();
        Ok(())
    }

    fn geometry(&self) -> &CurveGeometry {
        &self.geometry
    }
}
