// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Vacuum permeability (H/m), fixed at the exact pre-2019 SI value 4π×10⁻⁷.
pub const MU_0: f64 = 4e-7 * std::f64::consts::PI;

/// (H/m) μ₀/4π, the Biot–Savart prefactor.
/// Written out as 1e-7 so the 4π cancellation carries no roundoff.
pub const MU0_OVER_4PI: f64 = 1e-7;
