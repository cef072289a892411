//! `RigPose`: the latest retargeted pose, owned by the engine and read by the
//! renderer.
//!
//! Writes replace prior values in place; a reader sees either the previous or
//! the current coherent pose.

use mimic_api_core::{ChannelPath, Euler, Value, WriteBatch, WriteOp};
use mimic_rig_core::{BoneRole, MorphDictionary, NodeId, ResolvedRig};

/// Influence state of one bound head-region mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshPose {
    pub node: NodeId,
    pub name: String,
    pub morphs: MorphDictionary,
    /// One entry per morph channel, always within [0, 1].
    pub influences: Vec<f32>,
}

impl MeshPose {
    /// Influence of the named morph, if this mesh defines it.
    pub fn influence(&self, morph: &str) -> Option<f32> {
        self.morphs
            .index_of(morph)
            .and_then(|i| self.influences.get(i).copied())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BoneRotation {
    /// Damping-chain bones (head, neck, spine).
    Euler(Euler),
    /// Landmark-driven bones, `[x, y, z, w]`.
    Quat([f32; 4]),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BonePose {
    pub role: BoneRole,
    pub node: NodeId,
    pub name: String,
    /// `None` until the first tick that drives this bone.
    pub rotation: Option<BoneRotation>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RigPose {
    /// Generation of the rig this pose was built for.
    pub generation: u64,
    pub meshes: Vec<MeshPose>,
    pub bones: Vec<BonePose>,
}

impl RigPose {
    /// Rest pose for `rig`: zero influences, no bone driven yet.
    pub fn for_rig(rig: &ResolvedRig) -> Self {
        let meshes = rig
            .head_meshes
            .iter()
            .map(|m| MeshPose {
                node: m.node,
                name: m.name.clone(),
                morphs: m.morphs.clone(),
                influences: vec![0.0; m.morphs.len()],
            })
            .collect();
        let bones = rig
            .bones()
            .into_iter()
            .map(|(role, b)| BonePose {
                role,
                node: b.node,
                name: b.name.clone(),
                rotation: None,
            })
            .collect();
        Self {
            generation: rig.generation,
            meshes,
            bones,
        }
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshPose> {
        self.meshes.iter().find(|m| m.name == name)
    }

    pub fn bone(&self, role: BoneRole) -> Option<&BonePose> {
        self.bones.iter().find(|b| b.role == role)
    }

    pub(crate) fn bone_mut(&mut self, role: BoneRole) -> Option<&mut BonePose> {
        self.bones.iter_mut().find(|b| b.role == role)
    }

    /// Current rotation of the bone bound to `role`.
    pub fn rotation(&self, role: BoneRole) -> Option<BoneRotation> {
        self.bone(role).and_then(|b| b.rotation)
    }

    /// Flatten into render writes: every morph channel, then every driven bone.
    pub fn to_write_batch(&self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for mesh in &self.meshes {
            for (i, w) in mesh.influences.iter().enumerate() {
                let name = mesh.morphs.name(i).unwrap_or_default();
                batch.push(WriteOp::new(
                    ChannelPath::morph(mesh.name.as_str(), i, name),
                    Value::Float(*w),
                ));
            }
        }
        for bone in &self.bones {
            match bone.rotation {
                Some(BoneRotation::Euler(e)) => batch.push(WriteOp::new(
                    ChannelPath::rotation(bone.name.as_str()),
                    Value::Vec3(e.to_array()),
                )),
                Some(BoneRotation::Quat(q)) => batch.push(WriteOp::new(
                    ChannelPath::quaternion(bone.name.as_str()),
                    Value::Quat(q),
                )),
                None => {}
            }
        }
        batch
    }
}
