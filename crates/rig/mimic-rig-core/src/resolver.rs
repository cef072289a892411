//! Rig resolution: bind semantic roles to graph nodes through an alias table.
//!
//! Unmatched roles are omitted, never an error. Resolution only reads the
//! graph; bound meshes carry a copy of their morph dictionary so the result
//! stays usable without borrowing the scene.

use hashbrown::HashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::aliases::AliasTable;
use crate::arkit;
use crate::error::RigError;
use crate::graph::{MorphDictionary, NodeId, RigGraph};
use mimic_api_core::Side;

/// Bones per finger.
pub const SEGMENTS: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Semantic bone slots the engine can drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoneRole {
    Head,
    Neck,
    Spine,
    UpperArm(Side),
    Forearm(Side),
    Wrist(Side),
    /// Finger bone; segment is 0-based.
    Finger(Side, Finger, u8),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundBone {
    pub node: NodeId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundMesh {
    pub role: String,
    pub node: NodeId,
    pub name: String,
    pub morphs: MorphDictionary,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandBones {
    pub wrist: Option<BoundBone>,
    /// `fingers[finger][segment]`, proximal to distal.
    pub fingers: [[Option<BoundBone>; SEGMENTS]; 5],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArmBones {
    pub upper: Option<BoundBone>,
    pub fore: Option<BoundBone>,
}

/// Result of resolving one character load. Every field is optional; a rig
/// without a neck simply has `neck == None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedRig {
    /// Load generation this rig was built for (assigned by the owner).
    pub generation: u64,
    pub head_meshes: Vec<BoundMesh>,
    pub head: Option<BoundBone>,
    pub neck: Option<BoundBone>,
    pub spine: Option<BoundBone>,
    /// Indexed by side: left, right.
    pub hands: [HandBones; 2],
    pub arms: [ArmBones; 2],
}

fn side_slot(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

impl ResolvedRig {
    pub fn hand(&self, side: Side) -> &HandBones {
        &self.hands[side_slot(side)]
    }

    pub fn arm(&self, side: Side) -> &ArmBones {
        &self.arms[side_slot(side)]
    }

    pub fn bone(&self, role: BoneRole) -> Option<&BoundBone> {
        match role {
            BoneRole::Head => self.head.as_ref(),
            BoneRole::Neck => self.neck.as_ref(),
            BoneRole::Spine => self.spine.as_ref(),
            BoneRole::UpperArm(side) => self.arm(side).upper.as_ref(),
            BoneRole::Forearm(side) => self.arm(side).fore.as_ref(),
            BoneRole::Wrist(side) => self.hand(side).wrist.as_ref(),
            BoneRole::Finger(side, finger, seg) => self
                .hand(side)
                .fingers
                .get(finger.index())
                .and_then(|segs| segs.get(seg as usize))
                .and_then(Option::as_ref),
        }
    }

    /// All bound bones with their roles.
    pub fn bones(&self) -> Vec<(BoneRole, &BoundBone)> {
        let mut out = Vec::new();
        let mut push = |role: BoneRole| {
            if let Some(b) = self.bone(role) {
                out.push((role, b));
            }
        };
        push(BoneRole::Head);
        push(BoneRole::Neck);
        push(BoneRole::Spine);
        for side in Side::BOTH {
            push(BoneRole::UpperArm(side));
            push(BoneRole::Forearm(side));
            push(BoneRole::Wrist(side));
            for finger in Finger::ALL {
                for seg in 0..SEGMENTS as u8 {
                    push(BoneRole::Finger(side, finger, seg));
                }
            }
        }
        out
    }

    /// Number of bound roles (meshes + bones).
    pub fn bound_roles(&self) -> usize {
        self.head_meshes.len() + self.bones().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound_roles() == 0
    }

    /// First head mesh defining morph `name`, with the channel index.
    pub fn morph_channel(&self, name: &str) -> Option<(&BoundMesh, usize)> {
        self.head_meshes
            .iter()
            .find_map(|m| m.morphs.index_of(name).map(|i| (m, i)))
    }
}

struct Lookup<'g> {
    graph: &'g RigGraph,
    index: HashMap<&'g str, NodeId>,
}

impl<'g> Lookup<'g> {
    fn bone(&self, candidates: &[String]) -> Option<BoundBone> {
        candidates.iter().find_map(|name| {
            let id = *self.index.get(name.as_str())?;
            let node = self.graph.node(id)?;
            node.is_articulated().then(|| BoundBone {
                node: id,
                name: node.name.clone(),
            })
        })
    }

    fn mesh(&self, role: &str, candidates: &[String]) -> Option<BoundMesh> {
        candidates.iter().find_map(|name| {
            let id = *self.index.get(name.as_str())?;
            let node = self.graph.node(id)?;
            let morphs = node.morphs().filter(|m| !m.is_empty())?;
            Some(BoundMesh {
                role: role.to_string(),
                node: id,
                name: node.name.clone(),
                morphs: morphs.clone(),
            })
        })
    }
}

/// Resolve `graph` against `table`. Fails with `UnsupportedRig` only when not
/// a single role binds.
pub fn resolve(graph: &RigGraph, table: &AliasTable) -> Result<ResolvedRig, RigError> {
    let lookup = Lookup {
        graph,
        index: graph.name_index(),
    };
    let mut rig = ResolvedRig::default();

    for role in &table.meshes {
        match lookup.mesh(&role.role, &role.aliases) {
            // One node never serves two mesh roles.
            Some(mesh) if rig.head_meshes.iter().all(|m| m.node != mesh.node) => {
                rig.head_meshes.push(mesh)
            }
            Some(_) => {}
            None => debug!("rig: no mesh for role '{}'", role.role),
        }
    }
    if rig.head_meshes.is_empty() && table.blendshape_mesh_fallback {
        for (id, node) in graph.nodes.iter().enumerate() {
            if let Some(morphs) = node.morphs() {
                if morphs.names().any(arkit::is_blendshape) {
                    debug!("rig: fallback face mesh '{}'", node.name);
                    rig.head_meshes.push(BoundMesh {
                        role: "face".to_string(),
                        node: id,
                        name: node.name.clone(),
                        morphs: morphs.clone(),
                    });
                }
            }
        }
    }

    rig.head = lookup.bone(&table.bone_candidates(&table.head));
    rig.neck = lookup.bone(&table.bone_candidates(&table.neck));
    rig.spine = lookup.bone(&table.bone_candidates(&table.spine));

    for side in Side::BOTH {
        let slot = side_slot(side);
        rig.arms[slot].upper = lookup.bone(&table.sided_candidates(&table.upper_arm, side));
        rig.arms[slot].fore = lookup.bone(&table.sided_candidates(&table.forearm, side));
        rig.hands[slot].wrist = lookup.bone(&table.sided_candidates(&table.hand, side));
        for finger in Finger::ALL {
            for seg in 0..SEGMENTS {
                rig.hands[slot].fingers[finger.index()][seg] =
                    lookup.bone(&table.finger_candidates(side, finger.index(), seg + 1));
            }
        }
    }

    for (label, bone) in [("head", &rig.head), ("neck", &rig.neck), ("spine", &rig.spine)] {
        match bone {
            Some(b) => debug!("rig: {label} -> '{}'", b.name),
            None => debug!("rig: no {label} bone"),
        }
    }

    if rig.is_empty() {
        return Err(RigError::UnsupportedRig { nodes: graph.len() });
    }
    debug!(
        "rig: resolved {} roles from {} nodes",
        rig.bound_roles(),
        graph.len()
    );
    Ok(rig)
}
