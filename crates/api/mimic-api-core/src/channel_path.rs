//! ChannelPath parsing and formatting.
//!
//! Grammar (scene-graph track notation):
//!   node.property[index]
//! - `node` is everything before the last '.'; node names may themselves
//!   contain dots, colons or spaces ("mixamorig:Head", "Armature.001",
//!   "Body Mesh")
//! - `property` is one of `quaternion`, `rotation`, `morphTargetInfluences[i]`
//!   Examples:
//!   "Head.quaternion" -> node="Head", property=Quaternion
//!   "Neck.rotation" -> node="Neck", property=Rotation
//!   "Wolf3D_Head.morphTargetInfluences[12]" -> node="Wolf3D_Head", property=MorphInfluence(12)
//!
//! Morph channels additionally carry the morph name when known; it is not part
//! of the string form, which stays compatible with common keyframe track names.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MORPH_FIELD: &str = "morphTargetInfluences";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelProperty {
    /// Bone orientation as a quaternion.
    Quaternion,
    /// Bone orientation as XYZ Euler angles.
    Rotation,
    /// One morph target influence slot.
    MorphInfluence { index: usize, name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelPath {
    /// Scene node the channel belongs to.
    pub node: String,
    pub property: ChannelProperty,
}

impl ChannelPath {
    pub fn new(node: impl Into<String>, property: ChannelProperty) -> Self {
        Self {
            node: node.into(),
            property,
        }
    }

    pub fn quaternion(node: impl Into<String>) -> Self {
        Self::new(node, ChannelProperty::Quaternion)
    }

    pub fn rotation(node: impl Into<String>) -> Self {
        Self::new(node, ChannelProperty::Rotation)
    }

    pub fn morph(node: impl Into<String>, index: usize, name: impl Into<String>) -> Self {
        Self::new(
            node,
            ChannelProperty::MorphInfluence {
                index,
                name: Some(name.into()),
            },
        )
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("empty channel path".to_string());
        }
        let (node, field) = s
            .rsplit_once('.')
            .ok_or_else(|| format!("channel path '{s}' has no property"))?;
        if node.is_empty() {
            return Err("invalid channel path: empty node name".to_string());
        }
        let property = match field {
            "quaternion" => ChannelProperty::Quaternion,
            "rotation" => ChannelProperty::Rotation,
            other => {
                let index = other
                    .strip_prefix(MORPH_FIELD)
                    .and_then(|rest| rest.strip_prefix('['))
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or_else(|| format!("unknown channel property '{other}'"))?;
                let index = index
                    .parse::<usize>()
                    .map_err(|_| format!("invalid morph index '{index}'"))?;
                ChannelProperty::MorphInfluence { index, name: None }
            }
        };
        Ok(ChannelPath {
            node: node.to_string(),
            property,
        })
    }

    /// Morph slot index, if this is a morph channel.
    pub fn morph_index(&self) -> Option<usize> {
        match self.property {
            ChannelProperty::MorphInfluence { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Morph target name, if known.
    pub fn morph_name(&self) -> Option<&str> {
        match &self.property {
            ChannelProperty::MorphInfluence { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    pub fn is_morph(&self) -> bool {
        matches!(self.property, ChannelProperty::MorphInfluence { .. })
    }
}

impl fmt::Display for ChannelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            ChannelProperty::Quaternion => write!(f, "{}.quaternion", self.node),
            ChannelProperty::Rotation => write!(f, "{}.rotation", self.node),
            ChannelProperty::MorphInfluence { index, .. } => {
                write!(f, "{}.{MORPH_FIELD}[{index}]", self.node)
            }
        }
    }
}

impl FromStr for ChannelPath {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for ChannelPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChannelPath {
    fn deserialize<D>(deserializer: D) -> Result<ChannelPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ChannelPath::parse(&s).map_err(de::Error::custom)
    }
}
