use thiserror::Error;

/// Errors produced while building or resolving a rig.
#[derive(Debug, Error)]
pub enum RigError {
    /// Nothing in the graph matched any role; there is nothing to animate.
    #[error("unsupported rig: no animatable nodes among {nodes} nodes")]
    UnsupportedRig { nodes: usize },
    #[error("asset read error: {0}")]
    AssetRead(String),
    #[error("rig json parse error: {0}")]
    Json(#[from] serde_json::Error),
}
