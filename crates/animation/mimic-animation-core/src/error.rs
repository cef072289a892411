use mimic_rig_core::RigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("recording is empty; nothing to export")]
    EmptyRecording,
    #[error("failed to read rig asset: {0}")]
    AssetRead(String),
    #[error(transparent)]
    Rig(#[from] RigError),
    #[error("no recorded channel matches the rig; clip would be empty")]
    EmptyClip,
    #[error("invalid bake config: {0}")]
    Config(String),
    #[error("invalid clip: {0}")]
    InvalidClip(String),
    #[error("failed to serialize asset: {0}")]
    Serialize(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
