// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Coil Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Biot–Savart field evaluation for filamentary coils, every derivative
//! tensor needed for gradient-based coil-shape optimization, and the
//! field-quality functionals built on top of them.

pub mod biot_savart;
pub mod kernel;
pub mod objective;
pub mod setup;
