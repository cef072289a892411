//! Interpolation helpers for resampling baked tracks:
//! - scalar lerp
//! - quaternion NLERP with shortest-arc normalization
//! - hemisphere alignment of quaternion sequences

use glam::{Quat, Vec4};

#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quaternion NLERP (x, y, z, w); `b` is flipped when it lies on the far
/// hemisphere so the blend takes the shortest arc.
#[inline]
pub fn nlerp_quat(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let a = Quat::from_array(a);
    let b = Quat::from_array(b);
    let b = if a.dot(b) < 0.0 { -b } else { b };
    let q = Quat::from_vec4(Vec4::from(a).lerp(Vec4::from(b), t));
    if q.length_squared() > 0.0 {
        q.normalize().to_array()
    } else {
        q.to_array()
    }
}

/// Flip signs in place so every quaternion shares a hemisphere with its
/// predecessor.
pub fn align_hemispheres(quats: &mut [[f32; 4]]) {
    for i in 1..quats.len() {
        let prev = Quat::from_array(quats[i - 1]);
        let cur = Quat::from_array(quats[i]);
        if prev.dot(cur) < 0.0 {
            quats[i] = (-cur).to_array();
        }
    }
}

/// Key segment containing `t`: `(i, u)` with `t` between `times[i]` and
/// `times[i + 1]` at fraction `u`. Clamps outside the key range.
fn locate(times: &[f32], t: f32) -> Option<(usize, f32)> {
    let last = times.len().checked_sub(1)?;
    if t <= times[0] {
        return Some((0, 0.0));
    }
    if t >= times[last] {
        return Some((last, 0.0));
    }
    let hi = times.partition_point(|&k| k <= t);
    let lo = hi - 1;
    let span = times[hi] - times[lo];
    let u = if span > 0.0 { (t - times[lo]) / span } else { 0.0 };
    Some((lo, u))
}

pub fn sample_scalar(times: &[f32], values: &[f32], t: f32) -> Option<f32> {
    let (i, u) = locate(times, t)?;
    let a = *values.get(i)?;
    Some(match values.get(i + 1) {
        Some(&b) if u > 0.0 => lerp_f32(a, b, u),
        _ => a,
    })
}

pub fn sample_quat(times: &[f32], values: &[[f32; 4]], t: f32) -> Option<[f32; 4]> {
    let (i, u) = locate(times, t)?;
    let a = *values.get(i)?;
    Some(match values.get(i + 1) {
        Some(&b) if u > 0.0 => nlerp_quat(a, b, u),
        _ => a,
    })
}

/// Uniform timeline `0, 1/hz, ...` ending exactly at `duration`.
pub fn uniform_times(duration: f32, hz: f32) -> Vec<f32> {
    if duration <= 0.0 {
        return vec![0.0];
    }
    let frames = (duration * hz).ceil() as usize;
    let mut times: Vec<f32> = (0..frames)
        .map(|f| f as f32 / hz)
        .take_while(|t| *t < duration)
        .collect();
    times.push(duration);
    times
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-5, "left={a} right={b}");
    }

    #[test]
    fn nlerp_takes_shortest_arc() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let b = [0.0, 0.0, 0.0, -1.0];
        let q = nlerp_quat(a, b, 0.5);
        approx(q[3], 1.0);
    }

    #[test]
    fn hemispheres_are_aligned() {
        let mut qs = [[0.0, 0.0, 0.0, 1.0], [0.0, 0.0, 0.1, -0.99], [0.0, 0.0, 0.2, 0.98]];
        align_hemispheres(&mut qs);
        assert!(qs[1][3] > 0.0);
        // third now compared against the flipped second
        assert!(qs[2][3] > 0.0);
    }

    #[test]
    fn scalar_sampling_clamps_and_interpolates() {
        let times = [0.0, 1.0, 2.0];
        let values = [0.0, 1.0, 0.0];
        approx(sample_scalar(&times, &values, -1.0).unwrap(), 0.0);
        approx(sample_scalar(&times, &values, 0.25).unwrap(), 0.25);
        approx(sample_scalar(&times, &values, 1.5).unwrap(), 0.5);
        approx(sample_scalar(&times, &values, 9.0).unwrap(), 0.0);
        assert!(sample_scalar(&[], &[], 0.0).is_none());
    }

    #[test]
    fn uniform_times_end_on_duration() {
        let t = uniform_times(0.066, 30.0);
        assert_eq!(t.len(), 3);
        approx(t[1], 1.0 / 30.0);
        approx(*t.last().unwrap(), 0.066);
        assert_eq!(uniform_times(0.0, 30.0), vec![0.0]);
    }
}
