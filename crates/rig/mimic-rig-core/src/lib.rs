//! Mimic rig core
//!
//! Turns a loaded character's node graph into a `ResolvedRig`: semantic roles
//! (head-region meshes, head/neck/spine bones, arm, wrist and finger bones)
//! bound by name through a declarative alias table.

pub mod aliases;
pub mod arkit;
pub mod error;
pub mod graph;
pub mod resolver;

pub use aliases::{AliasTable, MeshRole};
pub use error::RigError;
pub use graph::{MorphDictionary, NodeId, NodeKind, RigGraph, RigNode};
pub use resolver::{
    resolve, ArmBones, BoneRole, BoundBone, BoundMesh, Finger, HandBones, ResolvedRig, SEGMENTS,
};
