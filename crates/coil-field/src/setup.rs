// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Problem Setup
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Build concrete curves, currents and the evaluator from a configuration.

use coil_geometry::fourier::{
    CartesianFourierCurve, ShapedCurve, StellaratorSymmetricFourierCurve,
};
use coil_types::config::{CoilShapeConfig, OptimizationConfig, TargetCurveConfig};
use coil_types::error::CoilResult;

use crate::biot_savart::{BiotSavart, DerivativeMethod};

/// Instantiate the coil curves with their currents.
pub fn build_coils(configs: &[CoilShapeConfig]) -> CoilResult<Vec<(CartesianFourierCurve, f64)>> {
    configs
        .iter()
        .map(|cfg| {
            let mut curve = CartesianFourierCurve::new(cfg.fourier_order, cfg.quadrature_points)?;
            if let Some(coefficients) = &cfg.coefficients {
                curve.set_coefficients(coefficients)?;
            }
            Ok((curve, cfg.current))
        })
        .collect()
}

/// Instantiate the target curve.
pub fn build_target(config: &TargetCurveConfig) -> CoilResult<StellaratorSymmetricFourierCurve> {
    let mut curve = StellaratorSymmetricFourierCurve::new(
        config.fourier_order,
        config.field_periods,
        config.quadrature_points,
    )?;
    if let Some(coefficients) = &config.coefficients {
        curve.set_coefficients(coefficients)?;
    }
    Ok(curve)
}

/// Construct the evaluator with the configured derivative path.
pub fn build_evaluator(config: &OptimizationConfig) -> CoilResult<BiotSavart> {
    Ok(BiotSavart::new(DerivativeMethod::from_name(
        &config.derivative_method,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biot_savart::Coil;
    use coil_types::config::OptimizationConfig;

    fn sample_config() -> OptimizationConfig {
        serde_json::from_str(
            r#"{
                "name": "setup-test",
                "derivative_method": "chain-rule",
                "coils": [
                    {
                        "name": "modular-1",
                        "fourier_order": 3,
                        "quadrature_points": 40,
                        "current": 1e4,
                        "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0,
                                         1.0, 0.5, 0.0, 0.0, 0.0,
                                         0.0, 0.0, 0.5, 0.0, 0.0]
                    }
                ],
                "target_curve": {
                    "fourier_order": 3,
                    "field_periods": 2,
                    "quadrature_points": 20,
                    "coefficients": [1.0, 0.1, 0.0, 0.1, 0.0]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_full_problem_from_config() {
        let config = sample_config();
        config.validate().unwrap();

        let coils = build_coils(&config.coils).unwrap();
        assert_eq!(coils.len(), 1);
        assert_eq!(coils[0].0.num_coefficients(), 15);
        assert!((coils[0].1 - 1e4).abs() < 1e-10);

        let target = build_target(&config.target_curve).unwrap();
        assert_eq!(target.num_coefficients(), 5);

        let bs = build_evaluator(&config).unwrap();
        let views: Vec<Coil> = coils
            .iter()
            .map(|(curve, current)| Coil::new(curve.geometry(), *current))
            .collect();
        let b = bs.field(&target.geometry().position, &views).unwrap();
        assert_eq!(b.len(), 20);
        assert!(b.iter().all(|v| v.norm().is_finite()));
    }

    #[test]
    fn test_build_evaluator_rejects_unknown_method() {
        let mut config = sample_config();
        config.derivative_method = "magic".to_string();
        assert!(build_evaluator(&config).is_err());
    }
}
