// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Biot–Savart Evaluator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Coil-set field evaluation: sums per-coil kernel contributions and routes
//! coefficient derivatives through the path selected at construction.

use coil_geometry::geometry::CurveGeometry;
use coil_types::error::{CoilError, CoilResult};
use nalgebra::{Matrix3, Vector3};
use ndarray::Array2;
use rayon::prelude::*;

use crate::kernel;

/// One coil for the duration of a single evaluation call: a borrowed
/// geometry snapshot paired with the filament current. Rebuild the view
/// after any coefficient update; the evaluator never caches geometry.
#[derive(Debug, Clone, Copy)]
pub struct Coil<'a> {
    pub geometry: &'a CurveGeometry,
    /// (A) filament current.
    pub current: f64,
}

impl<'a> Coil<'a> {
    pub fn new(geometry: &'a CurveGeometry, current: f64) -> Self {
        Self { geometry, current }
    }
}

/// Algorithm for the coefficient-derivative tensors. Both paths produce the
/// same values to floating-point tolerance; the chain-rule path trades
/// per-coefficient work for a shared geometry-sensitivity precomputation and
/// wins when Ndof ≫ 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeMethod {
    Direct,
    ChainRule,
}

impl DerivativeMethod {
    /// Parse the configuration name of a derivative path.
    pub fn from_name(name: &str) -> CoilResult<Self> {
        match name {
            "direct" => Ok(DerivativeMethod::Direct),
            "chain-rule" => Ok(DerivativeMethod::ChainRule),
            other => Err(CoilError::ConfigError(format!(
                "unknown derivative method {other:?}, expected \"direct\" or \"chain-rule\""
            ))),
        }
    }
}

/// Biot–Savart evaluator over a coil set. Stateless apart from the
/// derivative-path strategy, which is fixed at construction; every method
/// takes the evaluation points and the coil views for this call.
#[derive(Debug, Clone, Copy)]
pub struct BiotSavart {
    method: DerivativeMethod,
}

impl BiotSavart {
    pub fn new(method: DerivativeMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> DerivativeMethod {
        self.method
    }

    /// (T) total field of the coil set at each evaluation point.
    pub fn field(&self, points: &[Vector3<f64>], coils: &[Coil]) -> CoilResult<Vec<Vector3<f64>>> {
        let mut total = vec![Vector3::zeros(); points.len()];
        for coil in coils {
            let contribution = kernel::coil_field(points, coil.geometry, coil.current)?;
            for (t, c) in total.iter_mut().zip(contribution) {
                *t += c;
            }
        }
        Ok(total)
    }

    /// [`BiotSavart::field`] parallelized over evaluation-point chunks.
    /// Each output cell keeps the same accumulation order as the serial
    /// path (coils outer, quadrature inner), so results are reproducible.
    pub fn field_parallel(
        &self,
        points: &[Vector3<f64>],
        coils: &[Coil],
    ) -> CoilResult<Vec<Vector3<f64>>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let chunk = (points.len() / rayon::current_num_threads()).max(1);
        let chunks: Vec<CoilResult<Vec<Vector3<f64>>>> = points
            .par_chunks(chunk)
            .map(|p| self.field(p, coils))
            .collect();
        let mut out = Vec::with_capacity(points.len());
        for c in chunks {
            out.extend(c?);
        }
        Ok(out)
    }

    /// (T/m) total first spatial derivative; rows = field components,
    /// columns = spatial directions.
    pub fn db_dx(&self, points: &[Vector3<f64>], coils: &[Coil]) -> CoilResult<Vec<Matrix3<f64>>> {
        let mut total = vec![Matrix3::zeros(); points.len()];
        for coil in coils {
            let contribution = kernel::coil_db_dx(points, coil.geometry, coil.current)?;
            for (t, c) in total.iter_mut().zip(contribution) {
                *t += c;
            }
        }
        Ok(total)
    }

    /// (T/m²) total second spatial derivative, `[component][(j1, j2)]`.
    pub fn d2b_dx2(
        &self,
        points: &[Vector3<f64>],
        coils: &[Coil],
    ) -> CoilResult<Vec<[Matrix3<f64>; 3]>> {
        let mut total = vec![[Matrix3::zeros(); 3]; points.len()];
        for coil in coils {
            let contribution = kernel::coil_d2b_dx2(points, coil.geometry, coil.current)?;
            for (t, c) in total.iter_mut().zip(contribution) {
                for comp in 0..3 {
                    t[comp] += c[comp];
                }
            }
        }
        Ok(total)
    }

    /// (T) coefficient derivative, one (Np, Ndof) tensor per coil so callers
    /// can attribute sensitivity to a specific coil. Routed through the
    /// derivative path selected at construction.
    pub fn db_dcoeff(
        &self,
        points: &[Vector3<f64>],
        coils: &[Coil],
    ) -> CoilResult<Vec<Array2<Vector3<f64>>>> {
        coils
            .iter()
            .map(|coil| match self.method {
                DerivativeMethod::Direct => {
                    kernel::coil_db_dcoeff_direct(points, coil.geometry, coil.current)
                }
                DerivativeMethod::ChainRule => {
                    kernel::coil_db_dcoeff_chain_rule(points, coil.geometry, coil.current)
                }
            })
            .collect()
    }

    /// (T/m) mixed spatial × coefficient derivative, one (Np, Ndof) tensor
    /// of matrices per coil.
    pub fn d2b_dx_dcoeff(
        &self,
        points: &[Vector3<f64>],
        coils: &[Coil],
    ) -> CoilResult<Vec<Array2<Matrix3<f64>>>> {
        coils
            .iter()
            .map(|coil| match self.method {
                DerivativeMethod::Direct => {
                    kernel::coil_d2b_dx_dcoeff_direct(points, coil.geometry, coil.current)
                }
                DerivativeMethod::ChainRule => {
                    kernel::coil_d2b_dx_dcoeff_chain_rule(points, coil.geometry, coil.current)
                }
            })
            .collect()
    }
}
