//! Mimic retarget core
//!
//! Applies perception samples (blendshape scores, head rotation, hand and pose
//! landmarks) to a `ResolvedRig`, keeping the result in an explicit
//! `RigPose` state object the renderer reads.

pub mod config;
pub mod damping;
pub mod engine;
pub mod limbs;
pub mod pose;

pub use config::{ConfigError, RetargetConfig};
pub use damping::{DampingChain, TrunkRotations};
pub use engine::{clamp_score, Engine, TickOutcome};
pub use limbs::rotation_from_vector;
pub use pose::{BonePose, BoneRotation, MeshPose, RigPose};
