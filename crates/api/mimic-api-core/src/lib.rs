//! mimic-api-core: shared data model for the retargeting pipeline
//! (values, channel paths, render writes and perception samples).

pub mod channel_path;
pub mod perception;
pub mod sample;
pub mod value;
pub mod write_ops;

pub use channel_path::{ChannelPath, ChannelProperty};
pub use perception::PerceptionError;
pub use sample::{CategoryScore, CategoryScores, DetectionSample, HandLandmarks, Landmark, Side};
pub use value::{Euler, Value, ValueKind};
pub use write_ops::{WriteBatch, WriteOp};
