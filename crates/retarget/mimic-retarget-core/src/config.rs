//! Retargeting configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::damping::DampingChain;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite value greater than zero, got {value}")]
    InvalidDivisor { field: &'static str, value: f32 },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("{field} must be a non-zero axis")]
    ZeroAxis { field: &'static str },
    #[error("config json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for the retargeting engine. The damping constants are empirical;
/// the defaults reproduce the stock head/neck/spine feel.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetargetConfig {
    #[serde(flatten)]
    pub damping: DampingChain,
    /// Canonical bone axis for wrist and finger segments.
    pub hand_reference_axis: [f32; 3],
    pub left_arm_axis: [f32; 3],
    pub right_arm_axis: [f32; 3],
    /// Negate the camera-facing axis of landmark directions (mirrored preview).
    pub mirror_camera_axis: bool,
    /// Drive wrist, finger and arm bones from hand/pose landmarks.
    pub enable_limbs: bool,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            damping: DampingChain::default(),
            hand_reference_axis: [0.0, 1.0, 0.0],
            left_arm_axis: [-1.0, 0.0, 0.0],
            right_arm_axis: [1.0, 0.0, 0.0],
            mirror_camera_axis: true,
            enable_limbs: true,
        }
    }
}

impl RetargetConfig {
    /// Parse and validate a JSON config; omitted fields keep their defaults.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.damping.validate()?;
        for (field, axis) in [
            ("hand_reference_axis", self.hand_reference_axis),
            ("left_arm_axis", self.left_arm_axis),
            ("right_arm_axis", self.right_arm_axis),
        ] {
            if axis.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::NonFinite { field });
            }
            if axis.iter().all(|c| *c == 0.0) {
                return Err(ConfigError::ZeroAxis { field });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RetargetConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.damping.neck_divisor, 5.0);
        assert_eq!(cfg.damping.neck_bias, [0.3, 0.0, 0.0]);
        assert_eq!(cfg.damping.spine_divisor, 10.0);
    }

    #[test]
    fn json_is_flat_and_partial() {
        let cfg = RetargetConfig::from_json(r#"{ "neck_divisor": 4.0, "enable_limbs": false }"#)
            .unwrap();
        assert_eq!(cfg.damping.neck_divisor, 4.0);
        assert_eq!(cfg.damping.spine_divisor, 10.0);
        assert!(!cfg.enable_limbs);
        assert!(cfg.mirror_camera_axis);

        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["neck_divisor"], 4.0);
        assert!(json.get("damping").is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            RetargetConfig::from_json(r#"{ "spine_divisor": 0.0 }"#),
            Err(ConfigError::InvalidDivisor {
                field: "spine_divisor",
                ..
            })
        ));
        assert!(matches!(
            RetargetConfig::from_json(r#"{ "left_arm_axis": [0, 0, 0] }"#),
            Err(ConfigError::ZeroAxis { .. })
        ));
        assert!(matches!(
            RetargetConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }
}
