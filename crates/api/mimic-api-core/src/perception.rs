//! Perception adapter: converts face-landmarker results (MediaPipe JSON shape)
//! into `DetectionSample`s.
//!
//! Accepted shape:
//!   { "faceBlendshapes": [ { "categories": [ { "categoryName": "jawOpen", "score": 0.2 } ] } ],
//!     "facialTransformationMatrixes": [ { "data": [ 16 floats, column-major ] } ] }
//!
//! Only the first face is used. A missing blendshape list yields empty scores;
//! a missing matrix yields a zero head rotation.

use glam::Mat4;
use serde::Deserialize;
use thiserror::Error;

use crate::sample::{CategoryScore, CategoryScores, DetectionSample};
use crate::value::Euler;

#[derive(Debug, Error)]
pub enum PerceptionError {
    #[error("face result parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("transformation matrix must have 16 elements, got {0}")]
    Matrix(usize),
}

#[derive(Debug, Default, Deserialize)]
struct FaceResult {
    #[serde(default, rename = "faceBlendshapes")]
    face_blendshapes: Vec<Classifications>,
    #[serde(default, rename = "facialTransformationMatrixes")]
    facial_transformation_matrixes: Vec<MatrixData>,
}

#[derive(Debug, Deserialize)]
struct Classifications {
    #[serde(default)]
    categories: Vec<CategoryScore>,
}

#[derive(Debug, Deserialize)]
struct MatrixData {
    data: Vec<f32>,
}

/// Head rotation (XYZ Euler) from a column-major 4x4 face transform.
/// Scale and translation are discarded.
pub fn head_rotation_from_matrix(data: &[f32]) -> Result<Euler, PerceptionError> {
    let cols: &[f32; 16] = data
        .try_into()
        .map_err(|_| PerceptionError::Matrix(data.len()))?;
    let (_, rotation, _) = Mat4::from_cols_array(cols).to_scale_rotation_translation();
    Ok(Euler::from_quat(rotation))
}

impl DetectionSample {
    /// Build a sample from a face-landmarker JSON result.
    pub fn from_face_result(json: &str, timestamp_ms: f64) -> Result<Self, PerceptionError> {
        let result: FaceResult = serde_json::from_str(json)?;

        let category_scores = result
            .face_blendshapes
            .into_iter()
            .next()
            .map(|c| CategoryScores(c.categories))
            .unwrap_or_default();

        let head_rotation = match result.facial_transformation_matrixes.first() {
            Some(m) => head_rotation_from_matrix(&m.data)?,
            None => Euler::ZERO,
        };

        Ok(DetectionSample::new(timestamp_ms, category_scores, head_rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-4, "left={a} right={b}");
    }

    #[test]
    fn parses_blendshapes_and_rotation() {
        let e = Euler::new(0.2, -0.1, 0.05);
        let m = Mat4::from_quat(glam::Quat::from_array(e.to_quat()))
            * Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -40.0));
        let json = serde_json::json!({
            "faceBlendshapes": [{ "categories": [
                { "index": 0, "categoryName": "_neutral", "score": 0.01, "displayName": "" },
                { "index": 25, "categoryName": "jawOpen", "score": 0.42, "displayName": "" }
            ]}],
            "facialTransformationMatrixes": [{ "rows": 4, "columns": 4, "data": m.to_cols_array() }]
        });
        let sample = DetectionSample::from_face_result(&json.to_string(), 1234.0).unwrap();
        assert_eq!(sample.timestamp_ms, 1234.0);
        assert_eq!(sample.category_scores.len(), 2);
        assert_eq!(sample.category_scores.get("jawOpen"), Some(0.42));
        approx(sample.head_rotation.x, e.x);
        approx(sample.head_rotation.y, e.y);
        approx(sample.head_rotation.z, e.z);
    }

    #[test]
    fn empty_result_gives_neutral_sample() {
        let sample = DetectionSample::from_face_result("{}", 0.0).unwrap();
        assert!(sample.category_scores.is_empty());
        assert_eq!(sample.head_rotation, Euler::ZERO);
    }

    #[test]
    fn rejects_short_matrix_and_bad_json() {
        let json = r#"{ "facialTransformationMatrixes": [{ "data": [1, 0, 0] }] }"#;
        assert!(matches!(
            DetectionSample::from_face_result(json, 0.0),
            Err(PerceptionError::Matrix(3))
        ));
        assert!(matches!(
            DetectionSample::from_face_result("not json", 0.0),
            Err(PerceptionError::Parse(_))
        ));
    }
}
