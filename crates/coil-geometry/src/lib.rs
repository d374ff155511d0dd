// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Coil Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Curve geometry providers for the Biot–Savart field kernel.

pub mod fourier;
pub mod geometry;
