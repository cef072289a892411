//! Mimic animation core
//!
//! Records the motion signal, bakes recordings into keyframe clips and
//! exports them as self-contained GLB assets.

pub mod baking;
pub mod clip;
pub mod config;
pub mod error;
pub mod export;
pub mod interp;
pub mod recorder;

pub use baking::{bake_clip, export_clip_json, key_frames, normalized_times};
pub use clip::{AnimationClip, KeyframeTrack, TrackValues};
pub use config::BakeConfig;
pub use error::ExportError;
pub use export::{arkit_face_graph, export_glb, export_glb_from_graph, Exporter};
pub use recorder::{FrameRecord, Recorder, RecorderState, Recording};
