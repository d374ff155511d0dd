// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Field-Quality Functionals
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Scalar field-quality measures integrated along a target curve, and their
//! gradients with respect to coil and target-curve shape coefficients.
//!
//! Two functionals sharing one structure:
//!
//!   J_B  = (1/Nq) Σ_i ℓ_i |B(x_i)|²
//!   J_∇B = (1/Nq) Σ_i ℓ_i |∇B(x_i)|²
//!
//! where x_i runs over the target curve's quadrature points and ℓ_i = |γ'_i|
//! is the arclength weight. Purely functional: every operation takes the
//! evaluator, the coil views and a target-geometry snapshot.

use coil_geometry::geometry::CurveGeometry;
use coil_types::error::CoilResult;
use ndarray::Array1;

use crate::biot_savart::{BiotSavart, Coil};

/// J_B = (1/Nq) Σ_i ℓ_i |B(x_i)|².
pub fn squared_field_norm(
    bs: &BiotSavart,
    coils: &[Coil],
    target: &CurveGeometry,
) -> CoilResult<f64> {
    target.validate()?;
    let b = bs.field(&target.position, coils)?;
    let nq = target.num_quadrature_points() as f64;
    let sum: f64 = target
        .tangent
        .iter()
        .zip(&b)
        .map(|(t, bi)| t.norm() * bi.norm_squared())
        .sum();
    Ok(sum / nq)
}

/// ∂J_B/∂(coil coefficients), one gradient vector per coil.
pub fn squared_field_norm_dcoilcoeff(
    bs: &BiotSavart,
    coils: &[Coil],
    target: &CurveGeometry,
) -> CoilResult<Vec<Array1<f64>>> {
    target.validate()?;
    let b = bs.field(&target.position, coils)?;
    let db_dcoeff = bs.db_dcoeff(&target.position, coils)?;
    let arc = target.arc_lengths();
    let nq = target.num_quadrature_points() as f64;

    let mut gradients = Vec::with_capacity(coils.len());
    for per_coil in &db_dcoeff {
        let ndof = per_coil.ncols();
        let mut g = Array1::zeros(ndof);
        for c in 0..ndof {
            let mut acc = 0.0;
            for i in 0..b.len() {
                acc += arc[i] * b[i].dot(&per_coil[[i, c]]);
            }
            g[c] = 2.0 * acc / nq;
        }
        gradients.push(g);
    }
    Ok(gradients)
}

/// ∂J_B/∂(target-curve coefficients). Two additive contributions: the
/// integrand moves with the target point (through ∂B/∂x and the position
/// sensitivity), and the arclength weight moves with the target tangent.
pub fn squared_field_norm_dcurvecoeff(
    bs: &BiotSavart,
    coils: &[Coil],
    target: &CurveGeometry,
) -> CoilResult<Array1<f64>> {
    target.validate()?;
    let b = bs.field(&target.position, coils)?;
    let db_dx = bs.db_dx(&target.position, coils)?;
    let arc = target.arc_lengths();
    let nq = target.num_quadrature_points() as f64;
    let ndof = target.num_coefficients();

    let mut g = Array1::zeros(ndof);
    for c in 0..ndof {
        let mut acc = 0.0;
        for i in 0..b.len() {
            let pos_sens = target.position_sensitivity[[i, c]];
            let tan_sens = target.tangent_sensitivity[[i, c]];
            acc += 2.0 * arc[i] * b[i].dot(&(db_dx[i] * pos_sens));
            acc += b[i].norm_squared() * target.tangent[i].dot(&tan_sens) / arc[i];
        }
        g[c] = acc / nq;
    }
    Ok(g)
}

/// J_∇B = (1/Nq) Σ_i ℓ_i |∇B(x_i)|² with the Frobenius norm of ∂B/∂x.
pub fn squared_gradient_norm(
    bs: &BiotSavart,
    coils: &[Coil],
    target: &CurveGeometry,
) -> CoilResult<f64> {
    target.validate()?;
    let db_dx = bs.db_dx(&target.position, coils)?;
    let nq = target.num_quadrature_points() as f64;
    let sum: f64 = target
        .tangent
        .iter()
        .zip(&db_dx)
        .map(|(t, m)| t.norm() * m.norm_squared())
        .sum();
    Ok(sum / nq)
}

/// ∂J_∇B/∂(coil coefficients), one gradient vector per coil.
pub fn squared_gradient_norm_dcoilcoeff(
    bs: &BiotSavart,
    coils: &[Coil],
    target: &CurveGeometry,
) -> CoilResult<Vec<Array1<f64>>> {
    target.validate()?;
    let db_dx = bs.db_dx(&target.position, coils)?;
    let d2b = bs.d2b_dx_dcoeff(&target.position, coils)?;
    let arc = target.arc_lengths();
    let nq = target.num_quadrature_points() as f64;

    let mut gradients = Vec::with_capacity(coils.len());
    for per_coil in &d2b {
        let ndof = per_coil.ncols();
        let mut g = Array1::zeros(ndof);
        for c in 0..ndof {
            let mut acc = 0.0;
            for i in 0..db_dx.len() {
                acc += arc[i] * db_dx[i].dot(&per_coil[[i, c]]);
            }
            g[c] = 2.0 * acc / nq;
        }
        gradients.push(g);
    }
    Ok(gradients)
}

/// ∂J_∇B/∂(target-curve coefficients); same two contributions as
/// [`squared_field_norm_dcurvecoeff`] with the integrand one derivative up.
pub fn squared_gradient_norm_dcurvecoeff(
    bs: &BiotSavart,
    coils: &[Coil],
    target: &CurveGeometry,
) -> CoilResult<Array1<f64>> {
    target.validate()?;
    let db_dx = bs.db_dx(&target.position, coils)?;
    let d2b_dx2 = bs.d2b_dx2(&target.position, coils)?;
    let arc = target.arc_lengths();
    let nq = target.num_quadrature_points() as f64;
    let ndof = target.num_coefficients();

    let mut g = Array1::zeros(ndof);
    for c in 0..ndof {
        let mut acc = 0.0;
        for i in 0..db_dx.len() {
            let pos_sens = target.position_sensitivity[[i, c]];
            let tan_sens = target.tangent_sensitivity[[i, c]];
            // ∂/∂c_i (∂B_comp/∂x_dir) = Σ_j ∂²B_comp/∂x_dir ∂x_j · s_j
            let m_t = db_dx[i].transpose();
            for comp in 0..3 {
                acc += 2.0 * arc[i] * m_t.column(comp).dot(&(d2b_dx2[i][comp] * pos_sens));
            }
            acc += db_dx[i].norm_squared() * target.tangent[i].dot(&tan_sens) / arc[i];
        }
        g[c] = acc / nq;
    }
    Ok(g)
}
