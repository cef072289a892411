//! Engine: owns the bound rig and its pose, applies one detection per tick.
//!
//! Per tick:
//! - morphs: every category score, clamped to [0, 1], lands on each bound mesh
//!   defining that category
//! - trunk: head rotation spread over head/neck/spine by the damping chain
//! - limbs: wrist/finger bones from hand landmarks, arm bones from pose
//!   landmarks
//!
//! Mismatched channels are skipped one at a time; the rest of the rig keeps
//! updating. With no rig bound the tick is skipped entirely.

use hashbrown::HashSet;
use log::trace;
use mimic_api_core::{DetectionSample, Landmark, Side};
use mimic_rig_core::ResolvedRig;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, RetargetConfig};
use crate::limbs::{arm_segments, hand_segments, rotation_from_vector, segment_points, Segment};
use crate::pose::{BoneRotation, RigPose};

/// What one `apply` did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TickOutcome {
    Applied {
        morphs_written: usize,
        bones_written: usize,
        channels_skipped: usize,
    },
    /// No rig bound (none loaded yet, or a load is in flight).
    Skipped,
}

#[derive(Debug, Default)]
struct Counts {
    morphs: usize,
    bones: usize,
    skipped: usize,
}

/// Influence written for a raw tracker score.
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default)]
pub struct Engine {
    config: RetargetConfig,
    rig: Option<ResolvedRig>,
    pose: RigPose,
}

impl Engine {
    pub fn new(config: RetargetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rig: None,
            pose: RigPose::default(),
        })
    }

    pub fn config(&self) -> &RetargetConfig {
        &self.config
    }

    /// Swap in a new rig together with a fresh pose.
    pub fn bind(&mut self, rig: ResolvedRig) {
        self.pose = RigPose::for_rig(&rig);
        self.rig = Some(rig);
    }

    /// Drop the current rig; ticks are skipped until the next `bind`.
    pub fn unbind(&mut self) -> Option<ResolvedRig> {
        self.pose = RigPose::default();
        self.rig.take()
    }

    pub fn rig(&self) -> Option<&ResolvedRig> {
        self.rig.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.rig.is_some()
    }

    pub fn pose(&self) -> &RigPose {
        &self.pose
    }

    pub fn apply(&mut self, sample: &DetectionSample) -> TickOutcome {
        if self.rig.is_none() {
            trace!("retarget: no rig bound, tick skipped");
            return TickOutcome::Skipped;
        }

        let mut counts = Counts::default();
        self.apply_morphs(sample, &mut counts);
        self.apply_trunk(sample, &mut counts);
        if self.config.enable_limbs {
            self.apply_limbs(sample, &mut counts);
        }

        if counts.skipped > 0 {
            trace!(
                "retarget: t={} skipped {} channel(s)",
                sample.timestamp_ms,
                counts.skipped
            );
        }
        TickOutcome::Applied {
            morphs_written: counts.morphs,
            bones_written: counts.bones,
            channels_skipped: counts.skipped,
        }
    }

    fn apply_morphs(&mut self, sample: &DetectionSample, counts: &mut Counts) {
        // First occurrence of a repeated category wins, as in the recorder.
        let mut seen: HashSet<&str> = HashSet::with_capacity(sample.category_scores.len());
        for (name, score) in sample.category_scores.iter() {
            if !seen.insert(name) {
                trace!("retarget: duplicate category '{name}' ignored");
                continue;
            }
            let value = clamp_score(score);
            let mut hit = false;
            for mesh in &mut self.pose.meshes {
                let Some(index) = mesh.morphs.index_of(name) else {
                    continue;
                };
                if let Some(slot) = mesh.influences.get_mut(index) {
                    *slot = value;
                    counts.morphs += 1;
                    hit = true;
                }
            }
            if !hit {
                trace!("retarget: no morph channel for '{name}'");
                counts.skipped += 1;
            }
        }
    }

    fn apply_trunk(&mut self, sample: &DetectionSample, counts: &mut Counts) {
        use mimic_rig_core::BoneRole;

        let head = sample.head_rotation;
        if !head.is_finite() {
            trace!("retarget: non-finite head rotation");
            counts.skipped += 1;
            return;
        }
        let trunk = self.config.damping.distribute(head);
        for (role, rotation) in [
            (BoneRole::Head, trunk.head),
            (BoneRole::Neck, trunk.neck),
            (BoneRole::Spine, trunk.spine),
        ] {
            // Unbound bones are simply absent from the pose.
            if let Some(bone) = self.pose.bone_mut(role) {
                bone.rotation = Some(BoneRotation::Euler(rotation));
                counts.bones += 1;
            }
        }
    }

    fn apply_limbs(&mut self, sample: &DetectionSample, counts: &mut Counts) {
        let mirror = self.config.mirror_camera_axis;
        let hand_axis = self.config.hand_reference_axis;
        for side in Side::BOTH {
            if let Some(landmarks) = sample.hands.side(side) {
                let segments = hand_segments(side);
                self.drive(&segments, landmarks, hand_axis, mirror, counts);
            }
            if let Some(pose) = sample.pose.as_deref() {
                let axis = match side {
                    Side::Left => self.config.left_arm_axis,
                    Side::Right => self.config.right_arm_axis,
                };
                self.drive(&arm_segments(side), pose, axis, mirror, counts);
            }
        }
    }

    fn drive(
        &mut self,
        segments: &[Segment],
        landmarks: &[Landmark],
        axis: [f32; 3],
        mirror: bool,
        counts: &mut Counts,
    ) {
        for seg in segments {
            let Some(bone) = self.pose.bone_mut(seg.role) else {
                continue;
            };
            let rotation = segment_points(landmarks, seg)
                .and_then(|(from, to)| rotation_from_vector(from, to, axis, mirror));
            match rotation {
                Some(q) => {
                    bone.rotation = Some(BoneRotation::Quat(q));
                    counts.bones += 1;
                }
                None => {
                    trace!(
                        "retarget: {:?} skipped (landmarks {} -> {} of {})",
                        seg.role,
                        seg.from,
                        seg.to,
                        landmarks.len()
                    );
                    counts.skipped += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_score_bounds() {
        assert_eq!(clamp_score(-0.2), 0.0);
        assert_eq!(clamp_score(1.7), 1.0);
        assert_eq!(clamp_score(0.25), 0.25);
        assert_eq!(clamp_score(f32::NAN), 0.0);
        assert_eq!(clamp_score(f32::INFINITY), 1.0);
    }

    #[test]
    fn unbound_engine_skips() {
        let mut engine = Engine::default();
        assert!(!engine.is_bound());
        assert_eq!(
            engine.apply(&DetectionSample::default()),
            TickOutcome::Skipped
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut cfg = RetargetConfig::default();
        cfg.damping.neck_divisor = -1.0;
        assert!(Engine::new(cfg).is_err());
    }
}
