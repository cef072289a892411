//! Perception samples: one `DetectionSample` per available detection.

use serde::{Deserialize, Serialize};

use crate::value::Euler;

/// One blendshape category as emitted by the face tracker.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryScore {
    #[serde(rename = "categoryName")]
    pub name: String,
    pub score: f32,
}

/// Ordered `(category, score)` list, preserving tracker order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CategoryScores(pub Vec<CategoryScore>);

impl CategoryScores {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, score: f32) {
        self.0.push(CategoryScore {
            name: name.into(),
            score,
        });
    }

    /// Score of the first category named `name`.
    pub fn get(&self, name: &str) -> Option<f32> {
        self.0.iter().find(|c| c.name == name).map(|c| c.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|c| (c.name.as_str(), c.score))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for CategoryScores {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, score)| CategoryScore {
                    name: name.into(),
                    score,
                })
                .collect(),
        )
    }
}

/// A tracked 3D point (normalized image space for hands/pose).
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// "Left" / "Right"
    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }

    /// "L" / "R"
    pub fn initial(self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

/// Per-hand landmark sets (21 points each when present).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HandLandmarks {
    #[serde(default)]
    pub left: Option<Vec<Landmark>>,
    #[serde(default)]
    pub right: Option<Vec<Landmark>>,
}

impl HandLandmarks {
    pub fn side(&self, side: Side) -> Option<&[Landmark]> {
        match side {
            Side::Left => self.left.as_deref(),
            Side::Right => self.right.as_deref(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectionSample {
    /// Detection timestamp in milliseconds (monotonic clock of the producer).
    #[serde(rename = "timestamp")]
    pub timestamp_ms: f64,
    #[serde(default, rename = "categoryScores")]
    pub category_scores: CategoryScores,
    #[serde(default, rename = "headRotation")]
    pub head_rotation: Euler,
    #[serde(default)]
    pub hands: HandLandmarks,
    #[serde(default)]
    pub pose: Option<Vec<Landmark>>,
}

impl DetectionSample {
    pub fn new(timestamp_ms: f64, category_scores: CategoryScores, head_rotation: Euler) -> Self {
        Self {
            timestamp_ms,
            category_scores,
            head_rotation,
            hands: HandLandmarks::default(),
            pose: None,
        }
    }

    pub fn with_hand(mut self, side: Side, landmarks: Vec<Landmark>) -> Self {
        match side {
            Side::Left => self.hands.left = Some(landmarks),
            Side::Right => self.hands.right = Some(landmarks),
        }
        self
    }

    pub fn with_pose(mut self, landmarks: Vec<Landmark>) -> Self {
        self.pose = Some(landmarks);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_keep_order_and_lookup_first() {
        let scores: CategoryScores = [("jawOpen", 0.4), ("eyeBlinkLeft", 0.9), ("jawOpen", 0.1)]
            .into_iter()
            .collect();
        let names: Vec<&str> = scores.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["jawOpen", "eyeBlinkLeft", "jawOpen"]);
        assert_eq!(scores.get("jawOpen"), Some(0.4));
        assert_eq!(scores.get("mouthClose"), None);
    }

    #[test]
    fn sample_json_defaults_optional_parts() {
        let s: DetectionSample = serde_json::from_str(
            r#"{ "timestamp": 33.0, "categoryScores": [{ "categoryName": "jawOpen", "score": 0.5 }] }"#,
        )
        .unwrap();
        assert_eq!(s.timestamp_ms, 33.0);
        assert_eq!(s.category_scores.get("jawOpen"), Some(0.5));
        assert_eq!(s.head_rotation, Euler::ZERO);
        assert!(s.hands.left.is_none());
        assert!(s.pose.is_none());
    }
}
