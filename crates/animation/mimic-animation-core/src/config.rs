//! Bake configuration.

use mimic_retarget_core::DampingChain;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Highest accepted resampling rate (Hz).
pub const MAX_FRAME_RATE: f32 = 1000.0;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BakeConfig {
    pub clip_name: String,
    /// Drop morph tracks whose every key is 0.
    pub prune_silent_tracks: bool,
    /// `None` keeps the recorded timestamps; `Some(hz)` resamples uniformly.
    pub frame_rate: Option<f32>,
    /// Neck/spine attenuation; should match the live engine.
    pub damping: DampingChain,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            clip_name: "FaceAnimation".to_string(),
            prune_silent_tracks: false,
            frame_rate: None,
            damping: DampingChain::default(),
        }
    }
}

impl BakeConfig {
    pub fn from_json(s: &str) -> Result<Self, ExportError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if let Some(hz) = self.frame_rate {
            if !hz.is_finite() || hz <= 0.0 || hz > MAX_FRAME_RATE {
                return Err(ExportError::Config(format!(
                    "frame_rate must be in (0, {MAX_FRAME_RATE}], got {hz}"
                )));
            }
        }
        self.damping
            .validate()
            .map_err(|e| ExportError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_is_bounded() {
        assert!(BakeConfig::from_json(r#"{ "frame_rate": 60.0 }"#).is_ok());
        assert!(BakeConfig::from_json(r#"{ "frame_rate": 1000.0 }"#).is_ok());
        for bad in ["0.0", "-5.0", "1000000000.0"] {
            let json = format!(r#"{{ "frame_rate": {bad} }}"#);
            assert!(matches!(
                BakeConfig::from_json(&json),
                Err(ExportError::Config(_))
            ));
        }
    }
}
