// ─────────────────────────────────────────────────────────────────────
// SCPN Coil Optimizer — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{CoilError, CoilResult};

/// Top-level description of one coil-shape optimization problem:
/// the coil set, the target curve the field quality is measured on,
/// and the coefficient-derivative path the evaluator should use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    pub name: String,
    pub coils: Vec<CoilShapeConfig>,
    pub target_curve: TargetCurveConfig,
    /// Coefficient-derivative path: "direct" or "chain-rule".
    #[serde(default = "default_derivative_method")]
    pub derivative_method: String,
}

/// One Cartesian-Fourier coil: shape order, discretization and current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoilShapeConfig {
    pub name: String,
    pub fourier_order: usize,
    pub quadrature_points: usize,
    /// (A) filament current.
    pub current: f64,
    /// Flattened coefficient vector (x block, then y, then z),
    /// 3·(2·order − 1) entries. All zeros when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<f64>>,
}

/// Stellarator-symmetric target curve (e.g. the intended magnetic axis).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetCurveConfig {
    pub fourier_order: usize,
    pub field_periods: usize,
    pub quadrature_points: usize,
    /// Flattened coefficient vector (radial block, then vertical),
    /// 2·order − 1 entries. All zeros when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<f64>>,
}

fn default_derivative_method() -> String {
    "direct".to_string()
}

impl OptimizationConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> CoilResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation of orders, discretizations and coefficient
    /// vector lengths. The derivative-method name is checked by the
    /// evaluator that consumes it.
    pub fn validate(&self) -> CoilResult<()> {
        if self.coils.is_empty() {
            return Err(CoilError::ConfigError(
                "optimization problem declares no coils".to_string(),
            ));
        }
        for coil in &self.coils {
            if coil.fourier_order < 1 {
                return Err(CoilError::ConfigError(format!(
                    "coil {}: fourier_order must be >= 1",
                    coil.name
                )));
            }
            if coil.quadrature_points < 1 {
                return Err(CoilError::ConfigError(format!(
                    "coil {}: quadrature_points must be >= 1",
                    coil.name
                )));
            }
            if !coil.current.is_finite() {
                return Err(CoilError::ConfigError(format!(
                    "coil {}: current must be finite, got {}",
                    coil.name, coil.current
                )));
            }
            if let Some(coeffs) = &coil.coefficients {
                let expected = 3 * (2 * coil.fourier_order - 1);
                if coeffs.len() != expected {
                    return Err(CoilError::ConfigError(format!(
                        "coil {}: expected {} coefficients, got {}",
                        coil.name,
                        expected,
                        coeffs.len()
                    )));
                }
            }
        }
        let target = &self.target_curve;
        if target.fourier_order < 1 || target.quadrature_points < 1 || target.field_periods < 1 {
            return Err(CoilError::ConfigError(
                "target curve: fourier_order, field_periods and quadrature_points must be >= 1"
                    .to_string(),
            ));
        }
        if let Some(coeffs) = &target.coefficients {
            let expected = 2 * target.fourier_order - 1;
            if coeffs.len() != expected {
                return Err(CoilError::ConfigError(format!(
                    "target curve: expected {} coefficients, got {}",
                    expected,
                    coeffs.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "name": "two-coil-axis",
            "coils": [
                {
                    "name": "modular-1",
                    "fourier_order": 3,
                    "quadrature_points": 200,
                    "current": 1e4
                },
                {
                    "name": "modular-2",
                    "fourier_order": 3,
                    "quadrature_points": 200,
                    "current": -1e4,
                    "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0,
                                     1.0, 0.5, 0.0, 0.0, 0.0,
                                     0.0, 0.0, 0.5, 0.0, 0.0]
                }
            ],
            "target_curve": {
                "fourier_order": 3,
                "field_periods": 2,
                "quadrature_points": 20
            }
        }"#
    }

    #[test]
    fn test_parse_sample_config() {
        let cfg: OptimizationConfig = serde_json::from_str(sample_json()).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.name, "two-coil-axis");
        assert_eq!(cfg.coils.len(), 2);
        assert_eq!(cfg.coils[0].quadrature_points, 200);
        assert!(cfg.coils[0].coefficients.is_none());
        assert_eq!(cfg.coils[1].coefficients.as_ref().unwrap().len(), 15);
        assert!((cfg.coils[1].current + 1e4).abs() < 1e-10);
        assert_eq!(cfg.target_curve.field_periods, 2);
        // Missing derivative_method falls back to the direct path.
        assert_eq!(cfg.derivative_method, "direct");
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg: OptimizationConfig = serde_json::from_str(sample_json()).unwrap();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: OptimizationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.name, cfg2.name);
        assert_eq!(cfg.derivative_method, cfg2.derivative_method);
        assert_eq!(cfg.coils.len(), cfg2.coils.len());
        assert_eq!(cfg.coils[1].coefficients, cfg2.coils[1].coefficients);
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        let mut cfg: OptimizationConfig = serde_json::from_str(sample_json()).unwrap();
        cfg.coils[0].quadrature_points = 0;
        assert!(cfg.validate().is_err());

        let mut cfg: OptimizationConfig = serde_json::from_str(sample_json()).unwrap();
        cfg.coils[1].coefficients = Some(vec![0.0; 14]);
        assert!(cfg.validate().is_err());

        let mut cfg: OptimizationConfig = serde_json::from_str(sample_json()).unwrap();
        cfg.coils[0].current = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg: OptimizationConfig = serde_json::from_str(sample_json()).unwrap();
        cfg.target_curve.coefficients = Some(vec![0.0; 4]);
        assert!(cfg.validate().is_err());
    }
}
