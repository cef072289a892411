//! Clip baking: turn a finished `Recording` into an `AnimationClip` for a
//! resolved rig.
//!
//! - time is normalized to seconds from the first frame; frames sharing a
//!   time collapse into one key holding the last of them
//! - every observed category becomes one scalar track on the first mesh
//!   defining it (unmatched categories are dropped)
//! - head/neck/spine get quaternion tracks, with the same damping chain the
//!   live engine uses

use indexmap::IndexSet;
use log::{debug, info};
use mimic_api_core::{ChannelPath, Euler};
use mimic_retarget_core::clamp_score;
use mimic_rig_core::{BoundBone, ResolvedRig};

use crate::clip::{AnimationClip, KeyframeTrack, TrackValues};
use crate::config::BakeConfig;
use crate::error::ExportError;
use crate::interp::{align_hemispheres, sample_quat, sample_scalar, uniform_times};
use crate::recorder::Recording;

/// Seconds since the first frame; never decreasing.
pub fn normalized_times(recording: &Recording) -> Vec<f32> {
    let Some(first) = recording.frames.first() else {
        return Vec::new();
    };
    let mut prev = 0.0f32;
    recording
        .frames
        .iter()
        .map(|f| {
            let t = (((f.time - first.time) / 1000.0) as f32).max(prev);
            prev = t;
            t
        })
        .collect()
}

/// Indices of the frames that become keys: of each run of equal times only
/// the last frame is kept, so key times strictly increase.
pub fn key_frames(times: &[f32]) -> Vec<usize> {
    (0..times.len())
        .filter(|&i| times.get(i + 1).map_or(true, |next| *next > times[i]))
        .collect()
}

/// Category names in first-observed order across all frames.
pub fn observed_categories(recording: &Recording) -> IndexSet<&str> {
    recording
        .frames
        .iter()
        .flat_map(|f| f.scores.keys().map(String::as_str))
        .collect()
}

fn rotation_track(
    bone: &BoundBone,
    times: &[f32],
    eulers: impl Iterator<Item = Euler>,
) -> KeyframeTrack {
    let mut quats: Vec<[f32; 4]> = eulers.map(Euler::to_quat).collect();
    align_hemispheres(&mut quats);
    KeyframeTrack {
        target: ChannelPath::quaternion(bone.name.as_str()),
        node: bone.node,
        times: times.to_vec(),
        values: TrackValues::Quat(quats),
    }
}

fn resample(track: &KeyframeTrack, times: &[f32]) -> KeyframeTrack {
    let values = match &track.values {
        TrackValues::Scalar(v) => TrackValues::Scalar(
            times
                .iter()
                .filter_map(|&t| sample_scalar(&track.times, v, t))
                .collect(),
        ),
        TrackValues::Quat(v) => TrackValues::Quat(
            times
                .iter()
                .filter_map(|&t| sample_quat(&track.times, v, t))
                .collect(),
        ),
    };
    KeyframeTrack {
        target: track.target.clone(),
        node: track.node,
        times: times.to_vec(),
        values,
    }
}

pub fn bake_clip(
    recording: &Recording,
    rig: &ResolvedRig,
    cfg: &BakeConfig,
) -> Result<AnimationClip, ExportError> {
    if recording.is_empty() {
        return Err(ExportError::EmptyRecording);
    }
    cfg.validate()?;

    let all_times = normalized_times(recording);
    let keys = key_frames(&all_times);
    if keys.len() < all_times.len() {
        debug!(
            "bake: {} frame(s) share a time with a later frame, collapsed",
            all_times.len() - keys.len()
        );
    }
    let times: Vec<f32> = keys.iter().map(|&i| all_times[i]).collect();
    let frames = || keys.iter().map(|&i| &recording.frames[i]);
    let mut tracks = Vec::new();

    for category in observed_categories(recording) {
        let Some((mesh, index)) = rig.morph_channel(category) else {
            debug!("bake: no morph channel for '{category}', track omitted");
            continue;
        };
        let values: Vec<f32> = frames()
            .map(|f| f.score(category).map_or(0.0, clamp_score))
            .collect();
        if cfg.prune_silent_tracks && values.iter().all(|v| *v == 0.0) {
            debug!("bake: pruned silent track '{category}'");
            continue;
        }
        tracks.push(KeyframeTrack {
            target: ChannelPath::morph(mesh.name.as_str(), index, category),
            node: mesh.node,
            times: times.clone(),
            values: TrackValues::Scalar(values),
        });
    }

    // Non-finite rotations bake as the rest pose.
    let rotations = || {
        frames().map(|f| {
            if f.rotation.is_finite() {
                f.rotation
            } else {
                Euler::ZERO
            }
        })
    };
    if let Some(head) = &rig.head {
        tracks.push(rotation_track(head, &times, rotations()));
    }
    if let Some(neck) = &rig.neck {
        tracks.push(rotation_track(
            neck,
            &times,
            rotations().map(|r| cfg.damping.neck(r)),
        ));
    }
    if let Some(spine) = &rig.spine {
        tracks.push(rotation_track(
            spine,
            &times,
            rotations().map(|r| cfg.damping.spine(r)),
        ));
    }

    if tracks.is_empty() {
        return Err(ExportError::EmptyClip);
    }

    let duration = times.last().copied().unwrap_or(0.0);
    if let Some(hz) = cfg.frame_rate {
        let grid = uniform_times(duration, hz);
        tracks = tracks.iter().map(|t| resample(t, &grid)).collect();
    }

    let clip = AnimationClip {
        name: cfg.clip_name.clone(),
        duration,
        tracks,
    };
    clip.validate()?;
    info!(
        "bake: clip '{}' with {} track(s) over {:.3}s from {} frame(s)",
        clip.name,
        clip.tracks.len(),
        clip.duration,
        recording.len()
    );
    Ok(clip)
}

/// Stable JSON form of a baked clip.
pub fn export_clip_json(clip: &AnimationClip) -> serde_json::Value {
    serde_json::to_value(clip).unwrap_or(serde_json::Value::Null)
}
