//! Session configuration: one JSON document covering the retarget engine,
//! the clip baker and (optionally) the rig alias vocabulary.

use mimic_animation_core::BakeConfig;
use mimic_retarget_core::RetargetConfig;
use mimic_rig_core::AliasTable;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub retarget: RetargetConfig,
    pub bake: BakeConfig,
    /// Replaces the built-in alias table when present.
    pub aliases: Option<AliasTable>,
}

impl SessionConfig {
    pub fn from_json(s: &str) -> Result<Self, SessionError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        self.retarget.validate()?;
        self.bake.validate()?;
        Ok(())
    }

    pub fn alias_table(&self) -> AliasTable {
        self.aliases.clone().unwrap_or_default()
    }
}
