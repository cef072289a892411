//! Landmark-driven limb rotations.
//!
//! Every limb bone (wrist, finger segment, upper arm, forearm) is driven by
//! the same primitive: the rotation carrying a canonical bone axis onto the
//! direction between two landmarks.
//!
//! Landmark layout follows MediaPipe: hands have 21 points (0 = wrist,
//! finger `f` occupies `1 + 4f ..= 4 + 4f`, thumb to pinky); pose has 33
//! points with shoulders at 11/12, elbows at 13/14, wrists at 15/16.

use glam::{Quat, Vec3};
use mimic_api_core::{Landmark, Side};
use mimic_rig_core::{BoneRole, Finger, SEGMENTS};

/// Rotation (`[x, y, z, w]`) mapping `reference_axis` onto the normalized
/// direction `from -> to`. With `mirror`, the camera-facing (z) component of
/// the direction is negated first. `None` when the direction or axis is
/// degenerate.
pub fn rotation_from_vector(
    from: [f32; 3],
    to: [f32; 3],
    reference_axis: [f32; 3],
    mirror: bool,
) -> Option<[f32; 4]> {
    let mut dir = Vec3::from(to) - Vec3::from(from);
    if mirror {
        dir.z = -dir.z;
    }
    let dir = dir.try_normalize()?;
    let axis = Vec3::from(reference_axis).try_normalize()?;
    let q = Quat::from_rotation_arc(axis, dir);
    q.is_finite().then(|| q.to_array())
}

pub const HAND_WRIST: usize = 0;
/// Middle-finger base; the wrist bone points at it.
pub const HAND_MIDDLE_BASE: usize = 9;

pub const POSE_SHOULDER: [usize; 2] = [11, 12];
pub const POSE_ELBOW: [usize; 2] = [13, 14];
pub const POSE_WRIST: [usize; 2] = [15, 16];

fn side_slot(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

/// Landmark index of the first joint of `finger`.
pub fn finger_base(finger: Finger) -> usize {
    1 + 4 * finger.index()
}

/// One bone driven by a landmark pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub role: BoneRole,
    pub from: usize,
    pub to: usize,
}

/// Wrist plus every finger segment of one hand, proximal to distal.
pub fn hand_segments(side: Side) -> Vec<Segment> {
    let mut out = Vec::with_capacity(1 + 5 * SEGMENTS);
    out.push(Segment {
        role: BoneRole::Wrist(side),
        from: HAND_WRIST,
        to: HAND_MIDDLE_BASE,
    });
    for finger in Finger::ALL {
        let base = finger_base(finger);
        for seg in 0..SEGMENTS {
            out.push(Segment {
                role: BoneRole::Finger(side, finger, seg as u8),
                from: base + seg,
                to: base + seg + 1,
            });
        }
    }
    out
}

/// Upper arm and forearm of one side.
pub fn arm_segments(side: Side) -> [Segment; 2] {
    let s = side_slot(side);
    [
        Segment {
            role: BoneRole::UpperArm(side),
            from: POSE_SHOULDER[s],
            to: POSE_ELBOW[s],
        },
        Segment {
            role: BoneRole::Forearm(side),
            from: POSE_ELBOW[s],
            to: POSE_WRIST[s],
        },
    ]
}

/// Resolve a segment against a landmark set; `None` for out-of-range indices.
pub fn segment_points(landmarks: &[Landmark], seg: &Segment) -> Option<([f32; 3], [f32; 3])> {
    let from = landmarks.get(seg.from)?;
    let to = landmarks.get(seg.to)?;
    Some((from.to_array(), to.to_array()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate(q: [f32; 4], v: [f32; 3]) -> Vec3 {
        Quat::from_array(q) * Vec3::from(v)
    }

    #[test]
    fn maps_axis_onto_direction() {
        let q = rotation_from_vector([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0], false)
            .unwrap();
        let v = rotate(q, [0.0, 1.0, 0.0]);
        assert!((v - Vec3::X).length() < 1e-5, "{v:?}");
    }

    #[test]
    fn mirror_negates_camera_axis() {
        let q = rotation_from_vector([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0], true)
            .unwrap();
        let v = rotate(q, [0.0, 1.0, 0.0]);
        assert!((v + Vec3::Z).length() < 1e-5, "{v:?}");
    }

    #[test]
    fn identity_when_aligned() {
        let q = rotation_from_vector([1.0, 1.0, 1.0], [1.0, 3.0, 1.0], [0.0, 1.0, 0.0], true)
            .unwrap();
        assert!(Quat::from_array(q).abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn degenerate_inputs_yield_none() {
        assert!(rotation_from_vector([1.0; 3], [1.0; 3], [0.0, 1.0, 0.0], false).is_none());
        assert!(rotation_from_vector([0.0; 3], [1.0, 0.0, 0.0], [0.0; 3], false).is_none());
        assert!(
            rotation_from_vector([0.0; 3], [f32::NAN, 0.0, 0.0], [0.0, 1.0, 0.0], false).is_none()
        );
    }

    #[test]
    fn segment_layout() {
        let segs = hand_segments(Side::Left);
        assert_eq!(segs.len(), 16);
        assert_eq!((segs[0].from, segs[0].to), (0, 9));
        // index finger, second segment: landmarks 6 -> 7
        let idx2 = segs
            .iter()
            .find(|s| s.role == BoneRole::Finger(Side::Left, Finger::Index, 1))
            .unwrap();
        assert_eq!((idx2.from, idx2.to), (6, 7));
        // pinky tip segment ends on landmark 20
        assert_eq!(segs.last().unwrap().to, 20);

        let [upper, fore] = arm_segments(Side::Right);
        assert_eq!((upper.from, upper.to), (12, 14));
        assert_eq!((fore.from, fore.to), (14, 16));
    }

    #[test]
    fn out_of_range_segment_is_none() {
        let short = vec![Landmark::new(0.0, 0.0, 0.0); 5];
        let segs = hand_segments(Side::Right);
        assert!(segment_points(&short, &segs[0]).is_none());
        assert!(segment_points(&short, &segs[1]).is_some());
    }
}
