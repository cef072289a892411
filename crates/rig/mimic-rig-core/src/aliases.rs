//! Declarative alias table: ordered candidate node names per semantic role.
//!
//! New rig vocabularies are added as data (JSON or code), never as new
//! resolution logic. Bone aliases are tried once per entry in
//! `bone_prefixes`, alias-major. Side/finger aliases are templates:
//!
//! - `{Side}` -> `Left` / `Right`, `{side}` -> `left` / `right`, `{S}` -> `L` / `R`
//! - `{Finger}` -> each label listed for that finger in `finger_labels`
//! - `{Seg}` -> segment number, 1-based

use serde::{Deserialize, Serialize};

use crate::error::RigError;
use mimic_api_core::Side;

/// A head-region mesh role ("head", "teeth", ...) and its aliases.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeshRole {
    pub role: String,
    pub aliases: Vec<String>,
}

impl MeshRole {
    fn new(role: &str, aliases: &[&str]) -> Self {
        Self {
            role: role.to_string(),
            aliases: strings(aliases),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AliasTable {
    /// Prefixes tried for every bone alias (e.g. "", "mixamorig:").
    pub bone_prefixes: Vec<String>,
    /// Head-region mesh roles; each binds at most one mesh.
    pub meshes: Vec<MeshRole>,
    pub head: Vec<String>,
    pub neck: Vec<String>,
    pub spine: Vec<String>,
    pub upper_arm: Vec<String>,
    pub forearm: Vec<String>,
    pub hand: Vec<String>,
    pub finger: Vec<String>,
    /// Labels substituted for `{Finger}`, thumb to pinky.
    pub finger_labels: [Vec<String>; 5],
    /// When no mesh alias matches, bind every mesh whose morphs include a
    /// face-tracker blendshape name.
    pub blendshape_mesh_fallback: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            bone_prefixes: strings(&["", "mixamorig", "mixamorig:"]),
            meshes: vec![
                MeshRole::new(
                    "head",
                    &["Wolf3D_Head", "Wolf3D_Avatar", "Head", "Face", "head", "face"],
                ),
                MeshRole::new("teeth", &["Wolf3D_Teeth", "Teeth", "teeth"]),
                MeshRole::new("beard", &["Wolf3D_Beard", "Beard", "beard"]),
                MeshRole::new("eye_left", &["EyeLeft", "Wolf3D_EyeLeft"]),
                MeshRole::new("eye_right", &["EyeRight", "Wolf3D_EyeRight"]),
            ],
            head: strings(&["Head", "head", "J_Bip_C_Head"]),
            neck: strings(&["Neck", "neck", "J_Bip_C_Neck"]),
            spine: strings(&[
                "Spine2",
                "Spine1",
                "Spine",
                "spine",
                "J_Bip_C_UpperChest",
                "J_Bip_C_Chest",
            ]),
            upper_arm: strings(&["{Side}Arm", "{side}UpperArm", "J_Bip_{S}_UpperArm"]),
            forearm: strings(&["{Side}ForeArm", "{side}LowerArm", "J_Bip_{S}_LowerArm"]),
            hand: strings(&["{Side}Hand", "{side}Hand", "J_Bip_{S}_Hand"]),
            finger: strings(&["{Side}Hand{Finger}{Seg}", "J_Bip_{S}_{Finger}{Seg}"]),
            finger_labels: [
                strings(&["Thumb"]),
                strings(&["Index"]),
                strings(&["Middle"]),
                strings(&["Ring"]),
                strings(&["Pinky", "Little"]),
            ],
            blendshape_mesh_fallback: true,
        }
    }
}

impl AliasTable {
    /// Parse a table from JSON; omitted fields keep their defaults.
    pub fn from_json(s: &str) -> Result<Self, RigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Expand plain bone aliases with every prefix, alias-major.
    pub fn bone_candidates(&self, aliases: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(aliases.len() * self.bone_prefixes.len().max(1));
        for alias in aliases {
            if self.bone_prefixes.is_empty() {
                out.push(alias.clone());
            }
            for prefix in &self.bone_prefixes {
                out.push(format!("{prefix}{alias}"));
            }
        }
        out
    }

    /// Candidates for a sided template (arm/wrist bones).
    pub fn sided_candidates(&self, templates: &[String], side: Side) -> Vec<String> {
        let expanded: Vec<String> = templates.iter().map(|t| fill_side(t, side)).collect();
        self.bone_candidates(&expanded)
    }

    /// Candidates for one finger segment (`finger` 0..5, `segment` 1-based).
    pub fn finger_candidates(&self, side: Side, finger: usize, segment: usize) -> Vec<String> {
        let labels = match self.finger_labels.get(finger) {
            Some(labels) => labels.as_slice(),
            None => return Vec::new(),
        };
        let mut expanded = Vec::with_capacity(self.finger.len() * labels.len());
        for template in &self.finger {
            for label in labels {
                let name = fill_side(template, side)
                    .replace("{Finger}", label)
                    .replace("{Seg}", &segment.to_string());
                expanded.push(name);
            }
        }
        self.bone_candidates(&expanded)
    }
}

fn fill_side(template: &str, side: Side) -> String {
    template
        .replace("{Side}", side.name())
        .replace("{side}", &side.name().to_lowercase())
        .replace("{S}", side.initial())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bone_prefixes_expand_alias_major() {
        let table = AliasTable::default();
        let c = table.bone_candidates(&table.neck);
        assert_eq!(&c[..3], ["Neck", "mixamorigNeck", "mixamorig:Neck"]);
        assert_eq!(c.len(), table.neck.len() * 3);
    }

    #[test]
    fn finger_templates_cover_vocabularies() {
        let table = AliasTable::default();
        let c = table.finger_candidates(Side::Left, 1, 2);
        assert!(c.contains(&"LeftHandIndex2".to_string()));
        assert!(c.contains(&"mixamorig:LeftHandIndex2".to_string()));
        assert!(c.contains(&"J_Bip_L_Index2".to_string()));

        let pinky = table.finger_candidates(Side::Right, 4, 3);
        assert!(pinky.contains(&"RightHandPinky3".to_string()));
        assert!(pinky.contains(&"J_Bip_R_Little3".to_string()));
        assert!(table.finger_candidates(Side::Right, 9, 1).is_empty());
    }

    #[test]
    fn sided_templates() {
        let table = AliasTable::default();
        let c = table.sided_candidates(&table.forearm, Side::Right);
        assert_eq!(c[0], "RightForeArm");
        assert!(c.contains(&"rightLowerArm".to_string()));
        assert!(c.contains(&"J_Bip_R_LowerArm".to_string()));
    }

    #[test]
    fn json_overrides_keep_defaults_for_missing_fields() {
        let table = AliasTable::from_json(r#"{ "neck": ["Bip01_Neck"], "bone_prefixes": [""] }"#)
            .unwrap();
        assert_eq!(table.neck, vec!["Bip01_Neck".to_string()]);
        assert_eq!(table.head, AliasTable::default().head);
        assert!(table.blendshape_mesh_fallback);
    }
}
