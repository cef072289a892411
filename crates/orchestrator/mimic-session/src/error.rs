use mimic_animation_core::ExportError;
use mimic_retarget_core::ConfigError;
use mimic_rig_core::RigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rig(#[from] RigError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("session config json error: {0}")]
    Json(#[from] serde_json::Error),
}
