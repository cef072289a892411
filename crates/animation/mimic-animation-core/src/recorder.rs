//! Frame recorder: `Idle -> Recording -> Idle`, buffering timestamped snapshots
//! of the motion signal.
//!
//! `start` clears the buffer, `stop` keeps it readable, `capture` is a no-op
//! unless recording. `get_recording` hands out an owned copy, so a later
//! `start` never changes what a consumer already holds.

use indexmap::IndexMap;
use log::info;
use mimic_api_core::{CategoryScores, DetectionSample, Euler};
use serde::{Deserialize, Serialize};

/// One immutable snapshot.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FrameRecord {
    /// Milliseconds since the recording origin.
    pub time: f64,
    /// Category scores in tracker order.
    #[serde(default)]
    pub scores: IndexMap<String, f32>,
    #[serde(default)]
    pub rotation: Euler,
}

impl FrameRecord {
    pub fn score(&self, category: &str) -> Option<f32> {
        self.scores.get(category).copied()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Recording {
    pub frames: Vec<FrameRecord>,
}

impl Recording {
    pub fn new(frames: Vec<FrameRecord>) -> Self {
        Self { frames }
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Span between first and last frame, in ms.
    pub fn duration_ms(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(a), Some(b)) => (b.time - a.time).max(0.0),
            _ => 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

#[derive(Debug, Default)]
pub struct Recorder {
    state: RecorderState,
    origin: Option<f64>,
    frames: Vec<FrameRecord>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Clear and start recording; the first captured timestamp becomes t = 0.
    pub fn start(&mut self) {
        self.begin(None);
    }

    /// Clear and start recording with an explicit origin (ms).
    pub fn start_at(&mut self, now_ms: f64) {
        self.begin(Some(now_ms));
    }

    fn begin(&mut self, origin: Option<f64>) {
        if !self.frames.is_empty() {
            info!("recorder: discarding {} buffered frame(s)", self.frames.len());
        }
        self.frames.clear();
        self.origin = origin;
        self.state = RecorderState::Recording;
        info!("recorder: started");
    }

    /// Return to idle; the buffer stays readable. Safe in any state.
    pub fn stop(&mut self) {
        if self.state == RecorderState::Recording {
            info!("recorder: stopped with {} frame(s)", self.frames.len());
        }
        self.state = RecorderState::Idle;
    }

    /// Append a snapshot while recording. Returns whether a frame was added.
    /// Times never run backwards: an out-of-order timestamp is pinned to the
    /// previous frame's time.
    pub fn capture(&mut self, timestamp_ms: f64, scores: &CategoryScores, rotation: Euler) -> bool {
        if self.state != RecorderState::Recording {
            return false;
        }
        let origin = *self.origin.get_or_insert(timestamp_ms);
        let prev = self.frames.last().map_or(0.0, |f| f.time);
        let time = (timestamp_ms - origin).max(prev);

        let mut snapshot = IndexMap::with_capacity(scores.len());
        for (name, score) in scores.iter() {
            snapshot.entry(name.to_string()).or_insert(score);
        }
        self.frames.push(FrameRecord {
            time,
            scores: snapshot,
            rotation,
        });
        true
    }

    pub fn capture_sample(&mut self, sample: &DetectionSample) -> bool {
        self.capture(
            sample.timestamp_ms,
            &sample.category_scores,
            sample.head_rotation,
        )
    }

    /// Owned copy of the buffer as of now.
    pub fn get_recording(&self) -> Recording {
        Recording::new(self.frames.clone())
    }

    /// Drop buffered frames without changing state.
    pub fn clear(&mut self) {
        self.frames.clear();
        if self.state == RecorderState::Recording {
            self.origin = None;
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
