// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Biot–Savart Kernel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-coil Biot–Savart field contributions and their derivative tensors.
//!
//! One coil contributes to the field at x the trapezoidal approximation of
//! the line integral ∮ dγ × (x−γ) / |x−γ|³ over Nq uniform quadrature
//! points, scaled by μ₀/(4π·Nq) and the coil current:
//!
//!   B(x) = μ₀ I / (4π·Nq) · Σ_q γ'(φ_q) × (x − γ(φ_q)) / |x − γ(φ_q)|³
//!
//! Every function here differentiates this sum in closed form: with respect
//! to the evaluation point (once and twice), with respect to the coil's
//! shape coefficients (through the geometry's sensitivity tensors, by a
//! direct product rule and by an independent chain-rule contraction), and
//! the mixed combination of both.

use coil_geometry::geometry::CurveGeometry;
use coil_types::constants::MU0_OVER_4PI;
use coil_types::error::{CoilError, CoilResult};
use nalgebra::{Matrix3, Vector3};
use ndarray::Array2;

/// (m²) squared distance below which an evaluation point is treated as
/// coinciding with a quadrature point.
const SINGULAR_DISTANCE_SQUARED: f64 = 1e-24;

/// (m) advisory distance: below this the derivative magnitudes grow without
/// bound and results degrade, though the evaluation itself still succeeds.
const NEAR_SINGULAR_DISTANCE: f64 = 1e-6;

#[inline]
fn unit(axis: usize) -> Vector3<f64> {
    let mut e = Vector3::zeros();
    e[axis] = 1.0;
    e
}

#[inline]
fn checked_distance_squared(
    diff: &Vector3<f64>,
    point_index: usize,
    quadrature_index: usize,
) -> CoilResult<f64> {
    let r2 = diff.norm_squared();
    if r2 < SINGULAR_DISTANCE_SQUARED {
        return Err(CoilError::SingularEvaluation {
            point_index,
            quadrature_index,
            distance: r2.sqrt(),
        });
    }
    Ok(r2)
}

fn warn_if_near_singular(min_distance_squared: f64) {
    if min_distance_squared < NEAR_SINGULAR_DISTANCE * NEAR_SINGULAR_DISTANCE {
        tracing::warn!(
            min_distance_m = min_distance_squared.sqrt(),
            "evaluation point approaches a coil filament; field derivatives degrade"
        );
    }
}

fn check_current(current: f64) -> CoilResult<()> {
    if !current.is_finite() {
        return Err(CoilError::ConfigError(format!(
            "coil current must be finite, got {current}"
        )));
    }
    Ok(())
}

/// (T) field contribution of one coil at each evaluation point.
pub fn coil_field(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
    current: f64,
) -> CoilResult<Vec<Vector3<f64>>> {
    geometry.validate()?;
    check_current(current)?;
    let nq = geometry.num_quadrature_points();
    let scale = MU0_OVER_4PI * current / nq as f64;

    let mut out = vec![Vector3::zeros(); points.len()];
    let mut min_r2 = f64::INFINITY;
    for (i, point) in points.iter().enumerate() {
        let mut acc = Vector3::zeros();
        for (q, (gamma, dgamma)) in geometry.position.iter().zip(&geometry.tangent).enumerate() {
            let diff = point - gamma;
            let r2 = checked_distance_squared(&diff, i, q)?;
            min_r2 = min_r2.min(r2);
            acc += r2.powf(-1.5) * dgamma.cross(&diff);
        }
        out[i] = scale * acc;
    }
    warn_if_near_singular(min_r2);
    Ok(out)
}

/// (T/m) first spatial derivative ∂B_i/∂x_j of one coil's contribution.
/// Rows are field components, columns are spatial directions. Off the coil
/// the matrix is symmetric and trace-free.
pub fn coil_db_dx(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
    current: f64,
) -> CoilResult<Vec<Matrix3<f64>>> {
    geometry.validate()?;
    check_current(current)?;
    let nq = geometry.num_quadrature_points();
    let scale = MU0_OVER_4PI * current / nq as f64;

    let mut out = vec![Matrix3::zeros(); points.len()];
    let mut min_r2 = f64::INFINITY;
    for (i, point) in points.iter().enumerate() {
        let mut acc = Matrix3::zeros();
        for (q, (gamma, dgamma)) in geometry.position.iter().zip(&geometry.tangent).enumerate() {
            let diff = point - gamma;
            let r2 = checked_distance_squared(&diff, i, q)?;
            min_r2 = min_r2.min(r2);
            let inv_r3 = r2.powf(-1.5);
            let inv_r5 = inv_r3 / r2;
            let t_cross_diff = dgamma.cross(&diff);
            let cols = [0, 1, 2].map(|dir| {
                inv_r3 * dgamma.cross(&unit(dir)) - 3.0 * diff[dir] * inv_r5 * t_cross_diff
            });
            acc += Matrix3::from_columns(&cols);
        }
        out[i] = scale * acc;
    }
    warn_if_near_singular(min_r2);
    Ok(out)
}

/// (T/m²) second spatial derivative of one coil's contribution. Indexed
/// `[component][(j1, j2)]` with the two spatial-derivative directions j1, j2;
/// each component matrix is symmetric.
pub fn coil_d2b_dx2(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
    current: f64,
) -> CoilResult<Vec<[Matrix3<f64>; 3]>> {
    geometry.validate()?;
    check_current(current)?;
    let nq = geometry.num_quadrature_points();
    let scale = MU0_OVER_4PI * current / nq as f64;

    let mut out = vec![[Matrix3::zeros(); 3]; points.len()];
    let mut min_r2 = f64::INFINITY;
    for (i, point) in points.iter().enumerate() {
        let mut acc = [Matrix3::zeros(); 3];
        for (q, (gamma, dgamma)) in geometry.position.iter().zip(&geometry.tangent).enumerate() {
            let diff = point - gamma;
            let r2 = checked_distance_squared(&diff, i, q)?;
            min_r2 = min_r2.min(r2);
            let inv_r5 = r2.powf(-2.5);
            let inv_r7 = inv_r5 / r2;
            let t_cross_diff = dgamma.cross(&diff);
            let t_cross_e = [0, 1, 2].map(|k| dgamma.cross(&unit(k)));
            for j1 in 0..3 {
                for j2 in 0..3 {
                    let mut v = -3.0 * diff[j1] * inv_r5 * t_cross_e[j2]
                        - 3.0 * diff[j2] * inv_r5 * t_cross_e[j1]
                        + 15.0 * diff[j1] * diff[j2] * inv_r7 * t_cross_diff;
                    if j1 == j2 {
                        v -= 3.0 * inv_r5 * t_cross_diff;
                    }
                    for comp in 0..3 {
                        acc[comp][(j1, j2)] += v[comp];
                    }
                }
            }
        }
        for comp in 0..3 {
            out[i][comp] = scale * acc[comp];
        }
    }
    warn_if_near_singular(min_r2);
    Ok(out)
}

/// (T) derivative of one coil's contribution with respect to each of the
/// coil's shape coefficients, shape (Np, Ndof). Product rule through both
/// the position and the tangent sensitivity of the geometry.
pub fn coil_db_dcoeff_direct(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
    current: f64,
) -> CoilResult<Array2<Vector3<f64>>> {
    geometry.validate()?;
    check_current(current)?;
    let nq = geometry.num_quadrature_points();
    let ndof = geometry.num_coefficients();
    let scale = MU0_OVER_4PI * current / nq as f64;

    let mut out = Array2::from_elem((points.len(), ndof), Vector3::zeros());
    let mut min_r2 = f64::INFINITY;
    for (i, point) in points.iter().enumerate() {
        for (q, (gamma, dgamma)) in geometry.position.iter().zip(&geometry.tangent).enumerate() {
            let diff = point - gamma;
            let r2 = checked_distance_squared(&diff, i, q)?;
            min_r2 = min_r2.min(r2);
            let inv_r3 = r2.powf(-1.5);
            let inv_r5 = inv_r3 / r2;
            let t_cross_diff = dgamma.cross(&diff);
            for c in 0..ndof {
                let pos_sens = geometry.position_sensitivity[[q, c]];
                let tan_sens = geometry.tangent_sensitivity[[q, c]];
                out[[i, c]] += inv_r3 * tan_sens.cross(&diff) - inv_r3 * dgamma.cross(&pos_sens)
                    + 3.0 * inv_r5 * pos_sens.dot(&diff) * t_cross_diff;
            }
        }
    }
    out.mapv_inplace(|v| scale * v);
    warn_if_near_singular(min_r2);
    Ok(out)
}

/// Derivative of the (unscaled) kernel sum with respect to the raw curve
/// geometry, independent of the coefficient count: `by_position[k][comp]`
/// and `by_tangent[k][comp]` hold ∂B_comp/∂γ_k and ∂B_comp/∂γ'_k as
/// (Np, Nq) matrices, ready for contraction against the geometry's
/// per-component sensitivity matrices.
pub struct KernelShapeSensitivity {
    pub by_position: [[Array2<f64>; 3]; 3],
    pub by_tangent: [[Array2<f64>; 3]; 3],
}

pub fn kernel_shape_sensitivity(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
) -> CoilResult<KernelShapeSensitivity> {
    geometry.validate()?;
    let np = points.len();
    let nq = geometry.num_quadrature_points();

    let mut by_position: [[Array2<f64>; 3]; 3] =
        std::array::from_fn(|_| std::array::from_fn(|_| Array2::zeros((np, nq))));
    let mut by_tangent: [[Array2<f64>; 3]; 3] =
        std::array::from_fn(|_| std::array::from_fn(|_| Array2::zeros((np, nq))));

    let mut min_r2 = f64::INFINITY;
    for (i, point) in points.iter().enumerate() {
        for (q, (gamma, dgamma)) in geometry.position.iter().zip(&geometry.tangent).enumerate() {
            let diff = point - gamma;
            let r2 = checked_distance_squared(&diff, i, q)?;
            min_r2 = min_r2.min(r2);
            let inv_r3 = r2.powf(-1.5);
            let inv_r5 = inv_r3 / r2;
            let t_cross_diff = dgamma.cross(&diff);
            for k in 0..3 {
                let e_k = unit(k);
                let by_pos =
                    3.0 * diff[k] * inv_r5 * t_cross_diff - inv_r3 * dgamma.cross(&e_k);
                let by_tan = inv_r3 * e_k.cross(&diff);
                for comp in 0..3 {
                    by_position[k][comp][[i, q]] = by_pos[comp];
                    by_tangent[k][comp][[i, q]] = by_tan[comp];
                }
            }
        }
    }
    warn_if_near_singular(min_r2);
    Ok(KernelShapeSensitivity {
        by_position,
        by_tangent,
    })
}

/// Extract the (Nq, Ndof) matrix of one Cartesian component from a
/// sensitivity tensor, the layout the chain-rule matrix products consume.
fn component_matrices(sensitivity: &Array2<Vector3<f64>>) -> [Array2<f64>; 3] {
    [0, 1, 2].map(|k| Array2::from_shape_fn(sensitivity.dim(), |(q, c)| sensitivity[[q, c]][k]))
}

/// Chain-rule evaluation of [`coil_db_dcoeff_direct`]: the kernel's geometry
/// sensitivity is computed once, independent of Ndof, then contracted with
/// the coefficient sensitivities via matrix products. Asymptotically cheaper
/// when Ndof ≫ 3; agrees with the direct path to floating-point tolerance.
pub fn coil_db_dcoeff_chain_rule(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
    current: f64,
) -> CoilResult<Array2<Vector3<f64>>> {
    check_current(current)?;
    let sens = kernel_shape_sensitivity(points, geometry)?;
    let nq = geometry.num_quadrature_points();
    let ndof = geometry.num_coefficients();
    let scale = MU0_OVER_4PI * current / nq as f64;

    let pos_sens = component_matrices(&geometry.position_sensitivity);
    let tan_sens = component_matrices(&geometry.tangent_sensitivity);

    let mut out = Array2::from_elem((points.len(), ndof), Vector3::zeros());
    for comp in 0..3 {
        let mut acc = Array2::<f64>::zeros((points.len(), ndof));
        for k in 0..3 {
            acc += &sens.by_position[k][comp].dot(&pos_sens[k]);
            acc += &sens.by_tangent[k][comp].dot(&tan_sens[k]);
        }
        for ((i, c), v) in acc.indexed_iter() {
            out[[i, c]][comp] = scale * v;
        }
    }
    Ok(out)
}

/// (T/m) mixed second derivative of one coil's contribution with respect to
/// the evaluation point and each shape coefficient, shape (Np, Ndof); each
/// entry is a matrix with rows = field components, columns = spatial
/// directions.
pub fn coil_d2b_dx_dcoeff_direct(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
    current: f64,
) -> CoilResult<Array2<Matrix3<f64>>> {
    geometry.validate()?;
    check_current(current)?;
    let nq = geometry.num_quadrature_points();
    let ndof = geometry.num_coefficients();
    let scale = MU0_OVER_4PI * current / nq as f64;

    let mut out = Array2::from_elem((points.len(), ndof), Matrix3::zeros());
    let mut min_r2 = f64::INFINITY;
    for (i, point) in points.iter().enumerate() {
        for (q, (gamma, dgamma)) in geometry.position.iter().zip(&geometry.tangent).enumerate() {
            let diff = point - gamma;
            let r2 = checked_distance_squared(&diff, i, q)?;
            min_r2 = min_r2.min(r2);
            let inv_r3 = r2.powf(-1.5);
            let inv_r5 = inv_r3 / r2;
            let inv_r7 = inv_r5 / r2;
            let t_cross_diff = dgamma.cross(&diff);
            let t_cross_e = [0, 1, 2].map(|k| dgamma.cross(&unit(k)));
            for c in 0..ndof {
                let pos_sens = geometry.position_sensitivity[[q, c]];
                let tan_sens = geometry.tangent_sensitivity[[q, c]];
                let ts_cross_diff = tan_sens.cross(&diff);
                let t_cross_ps = dgamma.cross(&pos_sens);
                let ps_dot_diff = pos_sens.dot(&diff);
                let cols = [0, 1, 2].map(|k| {
                    inv_r3 * tan_sens.cross(&unit(k))
                        + 3.0 * inv_r5 * ps_dot_diff * t_cross_e[k]
                        - 15.0 * inv_r7 * ps_dot_diff * diff[k] * t_cross_diff
                        + 3.0 * inv_r5 * pos_sens[k] * t_cross_diff
                        - 3.0 * inv_r5 * diff[k] * ts_cross_diff
                        + 3.0 * inv_r5 * diff[k] * t_cross_ps
                });
                out[[i, c]] += Matrix3::from_columns(&cols);
            }
        }
    }
    out.mapv_inplace(|m| scale * m);
    warn_if_near_singular(min_r2);
    Ok(out)
}

/// Derivative of the (unscaled) first-spatial-derivative sum with respect to
/// the raw curve geometry: `by_position[k][comp][dir]` and
/// `by_tangent[k][comp][dir]` hold ∂(∂B_comp/∂x_dir)/∂γ_k and
/// ∂(∂B_comp/∂x_dir)/∂γ'_k as (Np, Nq) matrices.
pub struct KernelMixedSensitivity {
    pub by_position: [[[Array2<f64>; 3]; 3]; 3],
    pub by_tangent: [[[Array2<f64>; 3]; 3]; 3],
}

pub fn kernel_mixed_sensitivity(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
) -> CoilResult<KernelMixedSensitivity> {
    geometry.validate()?;
    let np = points.len();
    let nq = geometry.num_quadrature_points();

    let mut by_position: [[[Array2<f64>; 3]; 3]; 3] = std::array::from_fn(|_| {
        std::array::from_fn(|_| std::array::from_fn(|_| Array2::zeros((np, nq))))
    });
    let mut by_tangent: [[[Array2<f64>; 3]; 3]; 3] = std::array::from_fn(|_| {
        std::array::from_fn(|_| std::array::from_fn(|_| Array2::zeros((np, nq))))
    });

    let mut min_r2 = f64::INFINITY;
    for (i, point) in points.iter().enumerate() {
        for (q, (gamma, dgamma)) in geometry.position.iter().zip(&geometry.tangent).enumerate() {
            let diff = point - gamma;
            let r2 = checked_distance_squared(&diff, i, q)?;
            min_r2 = min_r2.min(r2);
            let inv_r3 = r2.powf(-1.5);
            let inv_r5 = inv_r3 / r2;
            let inv_r7 = inv_r5 / r2;
            let t_cross_diff = dgamma.cross(&diff);
            let t_cross_e = [0, 1, 2].map(|k| dgamma.cross(&unit(k)));
            for k in 0..3 {
                let e_k = unit(k);
                let ek_cross_diff = e_k.cross(&diff);
                for dir in 0..3 {
                    let mut by_pos = 3.0 * diff[k] * inv_r5 * t_cross_e[dir]
                        - 15.0 * diff[dir] * diff[k] * inv_r7 * t_cross_diff
                        + 3.0 * diff[dir] * inv_r5 * t_cross_e[k];
                    if k == dir {
                        by_pos += 3.0 * inv_r5 * t_cross_diff;
                    }
                    let by_tan =
                        inv_r3 * e_k.cross(&unit(dir)) - 3.0 * diff[dir] * inv_r5 * ek_cross_diff;
                    for comp in 0..3 {
                        by_position[k][comp][dir][[i, q]] = by_pos[comp];
                        by_tangent[k][comp][dir][[i, q]] = by_tan[comp];
                    }
                }
            }
        }
    }
    warn_if_near_singular(min_r2);
    Ok(KernelMixedSensitivity {
        by_position,
        by_tangent,
    })
}

/// Chain-rule evaluation of [`coil_d2b_dx_dcoeff_direct`]; same contraction
/// scheme as [`coil_db_dcoeff_chain_rule`], one matrix product per
/// (geometry component, field component, spatial direction).
pub fn coil_d2b_dx_dcoeff_chain_rule(
    points: &[Vector3<f64>],
    geometry: &CurveGeometry,
    current: f64,
) -> CoilResult<Array2<Matrix3<f64>>> {
    check_current(current)?;
    let sens = kernel_mixed_sensitivity(points, geometry)?;
    let nq = geometry.num_quadrature_points();
    let ndof = geometry.num_coefficients();
    let scale = MU0_OVER_4PI * current / nq as f64;

    let pos_sens = component_matrices(&geometry.position_sensitivity);
    let tan_sens = component_matrices(&geometry.tangent_sensitivity);

    let mut out = Array2::from_elem((points.len(), ndof), Matrix3::zeros());
    for comp in 0..3 {
        for dir in 0..3 {
            let mut acc = Array2::<f64>::zeros((points.len(), ndof));
            for k in 0..3 {
                acc += &sens.by_position[k][comp][dir].dot(&pos_sens[k]);
                acc += &sens.by_tangent[k][comp][dir].dot(&tan_sens[k]);
            }
            for ((i, c), v) in acc.indexed_iter() {
                out[[i, c]][(comp, dir)] = scale * v;
            }
        }
    }
    Ok(out)
}
