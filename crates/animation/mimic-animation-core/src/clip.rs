//! Baked clip model: named keyframe tracks on a shared seconds timeline.

use mimic_api_core::ChannelPath;
use mimic_rig_core::NodeId;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum TrackValues {
    Scalar(Vec<f32>),
    /// `[x, y, z, w]` per key.
    Quat(Vec<[f32; 4]>),
}

impl TrackValues {
    pub fn len(&self) -> usize {
        match self {
            TrackValues::Scalar(v) => v.len(),
            TrackValues::Quat(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KeyframeTrack {
    pub target: ChannelPath,
    /// Graph node the target lives on.
    pub node: NodeId,
    /// Seconds, starting at 0, strictly increasing.
    pub times: Vec<f32>,
    pub values: TrackValues,
}

impl KeyframeTrack {
    pub fn scalars(&self) -> Option<&[f32]> {
        match &self.values {
            TrackValues::Scalar(v) => Some(v),
            TrackValues::Quat(_) => None,
        }
    }

    pub fn quats(&self) -> Option<&[[f32; 4]]> {
        match &self.values {
            TrackValues::Quat(v) => Some(v),
            TrackValues::Scalar(_) => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds; equals the last sample time.
    pub duration: f32,
    pub tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    /// Track whose target displays as `path` (e.g. `Head.quaternion`).
    pub fn track(&self, path: &str) -> Option<&KeyframeTrack> {
        self.tracks.iter().find(|t| t.target.to_string() == path)
    }

    /// Morph track for `category`, whatever mesh it was bound to.
    pub fn morph_track(&self, category: &str) -> Option<&KeyframeTrack> {
        self.tracks
            .iter()
            .find(|t| t.target.morph_name() == Some(category))
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ExportError::InvalidClip(format!(
                "duration {} is not a non-negative number",
                self.duration
            )));
        }
        for track in &self.tracks {
            if track.times.is_empty() {
                return Err(ExportError::InvalidClip(format!(
                    "track '{}' has no keys",
                    track.target
                )));
            }
            if track.times.len() != track.values.len() {
                return Err(ExportError::InvalidClip(format!(
                    "track '{}' has {} times but {} values",
                    track.target,
                    track.times.len(),
                    track.values.len()
                )));
            }
            if track.times.windows(2).any(|w| w[1] <= w[0]) {
                return Err(ExportError::InvalidClip(format!(
                    "track '{}' times are not strictly increasing",
                    track.target
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(times: Vec<f32>) -> AnimationClip {
        let values = TrackValues::Scalar(vec![0.0; times.len()]);
        AnimationClip {
            name: "Take".to_string(),
            duration: times.last().copied().unwrap_or(0.0),
            tracks: vec![KeyframeTrack {
                target: ChannelPath::morph("Face", 0, "jawOpen"),
                node: 0,
                times,
                values,
            }],
        }
    }

    #[test]
    fn key_times_must_strictly_increase() {
        assert!(clip(vec![0.0, 0.5, 1.0]).validate().is_ok());
        assert!(matches!(
            clip(vec![0.0, 0.5, 0.5]).validate(),
            Err(ExportError::InvalidClip(_))
        ));
        assert!(matches!(
            clip(vec![0.0, 1.0, 0.5]).validate(),
            Err(ExportError::InvalidClip(_))
        ));
    }
}
