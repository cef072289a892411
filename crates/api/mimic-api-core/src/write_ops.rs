//! Write operations produced by the retargeting engine to describe pose
//! updates for a render surface, addressed by channel paths.
//!
//! WriteOp serializes to JSON as:
//!   { "path": "Wolf3D_Head.morphTargetInfluences[3]", "value": { "type": "float", "data": 0.5 } }
//!
//! WriteBatch is a simple Vec<WriteOp> with helpers.

use crate::{ChannelPath, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub path: ChannelPath,
    pub value: Value,
}

impl WriteOp {
    pub fn new(path: ChannelPath, value: Value) -> Self {
        Self { path, value }
    }
}

/// A batch of write operations. The engine can emit one per perception tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch(pub Vec<WriteOp>);

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch(Vec::new())
    }

    pub fn push(&mut self, op: WriteOp) {
        self.0.push(op);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = WriteOp>) {
        self.0.extend(other);
    }

    pub fn into_vec(self) -> Vec<WriteOp> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last value written to `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0
            .iter()
            .rev()
            .find(|op| op.path.to_string() == path)
            .map(|op| &op.value)
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = serde_json::to_string(&self.value).map_err(|_| fmt::Error)?;
        write!(f, "{{ path: {}, value: {} }}", self.path, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writeop_json_shape() {
        let op = WriteOp::new(ChannelPath::quaternion("Head"), Value::quat(0.0, 0.0, 0.0, 1.0));
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["path"], "Head.quaternion");
        assert_eq!(json["value"]["type"], "quat");
        let parsed: WriteOp = serde_json::from_value(json).unwrap();
        assert_eq!(op, parsed);
    }

    #[test]
    fn batch_lookup_returns_latest_write() {
        let mut b = WriteBatch::new();
        let path = ChannelPath::parse("Wolf3D_Head.morphTargetInfluences[0]").unwrap();
        b.push(WriteOp::new(path.clone(), Value::Float(0.2)));
        b.push(WriteOp::new(path, Value::Float(0.7)));
        assert_eq!(b.len(), 2);
        assert_eq!(
            b.get("Wolf3D_Head.morphTargetInfluences[0]"),
            Some(&Value::Float(0.7))
        );
        assert!(b.get("Head.quaternion").is_none());
    }
}
