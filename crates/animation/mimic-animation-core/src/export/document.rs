//! Raw glTF JSON plus its binary chunk, edited as `serde_json` values so that
//! anything this crate does not model (extensions, extras, materials) passes
//! through untouched.

use std::borrow::Cow;

use gltf::binary::{Glb, Header};
use hashbrown::HashMap;
use indexmap::IndexMap;
use mimic_rig_core::{NodeId, RigGraph};
use serde_json::{json, Map, Value as Json};

use crate::clip::{AnimationClip, KeyframeTrack, TrackValues};
use crate::error::ExportError;

const COMPONENT_FLOAT: u32 = 5126;
const GLB_HEADER_LEN: usize = 12;
const GLB_CHUNK_HEADER_LEN: usize = 8;

fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

fn bounds(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

fn push_channel(
    channels: &mut Vec<Json>,
    samplers: &mut Vec<Json>,
    input: usize,
    output: usize,
    node: usize,
    path: &str,
) {
    samplers.push(json!({ "input": input, "output": output, "interpolation": "LINEAR" }));
    channels.push(json!({
        "sampler": samplers.len() - 1,
        "target": { "node": node, "path": path },
    }));
}

pub(crate) struct GltfDocument {
    root: Map<String, Json>,
    bin: Vec<u8>,
    /// Index of the GLB-stored buffer new data is appended to.
    buffer: usize,
    /// Time accessors already written, reused across channels.
    inputs: Vec<(Vec<f32>, usize)>,
}

impl GltfDocument {
    /// Empty glTF 2.0 document with a single GLB-stored buffer.
    pub fn new() -> Self {
        let mut root = Map::new();
        root.insert(
            "asset".to_string(),
            json!({ "version": "2.0", "generator": "mimic" }),
        );
        root.insert("buffers".to_string(), json!([{ "byteLength": 0 }]));
        Self {
            root,
            bin: Vec::new(),
            buffer: 0,
            inputs: Vec::new(),
        }
    }

    /// Open a `.glb` or `.gltf` asset. Without a binary chunk a new leading
    /// buffer is inserted and every buffer view is shifted to keep pointing at
    /// its original buffer.
    pub fn from_asset(bytes: &[u8]) -> Result<Self, ExportError> {
        let (json_bytes, bin) = if bytes.starts_with(b"glTF") {
            let glb = Glb::from_slice(bytes).map_err(|e| ExportError::AssetRead(e.to_string()))?;
            (glb.json, glb.bin.map(Cow::into_owned))
        } else {
            (Cow::Borrowed(bytes), None)
        };
        let root = match serde_json::from_slice::<Json>(&json_bytes) {
            Ok(Json::Object(root)) => root,
            Ok(_) => {
                return Err(ExportError::AssetRead(
                    "glTF root is not a JSON object".to_string(),
                ))
            }
            Err(e) => return Err(ExportError::AssetRead(e.to_string())),
        };

        let mut doc = Self {
            root,
            bin: Vec::new(),
            buffer: 0,
            inputs: Vec::new(),
        };
        match bin {
            Some(bin) => {
                doc.bin = bin;
                if doc.count("buffers") == 0 {
                    doc.push("buffers", json!({ "byteLength": 0 }));
                }
            }
            None => doc.insert_leading_buffer(),
        }
        Ok(doc)
    }

    fn insert_leading_buffer(&mut self) {
        let buffer = json!({ "byteLength": 0 });
        match self
            .root
            .entry("buffers")
            .or_insert_with(|| Json::Array(Vec::new()))
        {
            Json::Array(items) => items.insert(0, buffer),
            other => *other = Json::Array(vec![buffer]),
        }
        if let Some(Json::Array(views)) = self.root.get_mut("bufferViews") {
            for view in views.iter_mut().filter_map(Json::as_object_mut) {
                if let Some(b) = view.get("buffer").and_then(Json::as_u64) {
                    view.insert("buffer".to_string(), json!(b + 1));
                }
            }
        }
        self.buffer = 0;
    }

    pub fn count(&self, key: &str) -> usize {
        self.root
            .get(key)
            .and_then(Json::as_array)
            .map_or(0, Vec::len)
    }

    /// Append `value` to the top-level array `key`; returns its index.
    pub fn push(&mut self, key: &str, value: Json) -> usize {
        match self
            .root
            .entry(key)
            .or_insert_with(|| Json::Array(Vec::new()))
        {
            Json::Array(items) => {
                items.push(value);
                items.len() - 1
            }
            other => {
                *other = Json::Array(vec![value]);
                0
            }
        }
    }

    pub fn set(&mut self, key: &str, value: Json) {
        self.root.insert(key.to_string(), value);
    }

    fn push_view(&mut self, data: &[f32]) -> usize {
        self.bin.resize(pad4(self.bin.len()), 0);
        let offset = self.bin.len();
        for v in data {
            self.bin.extend_from_slice(&v.to_le_bytes());
        }
        let buffer = self.buffer;
        self.push(
            "bufferViews",
            json!({ "buffer": buffer, "byteOffset": offset, "byteLength": data.len() * 4 }),
        )
    }

    /// Float accessor of `kind` ("SCALAR", "VEC3", "VEC4") over `data`.
    fn push_accessor(&mut self, data: &[f32], kind: &str, width: usize, with_bounds: bool) -> usize {
        let view = self.push_view(data);
        let mut accessor = json!({
            "bufferView": view,
            "componentType": COMPONENT_FLOAT,
            "count": data.len() / width,
            "type": kind,
        });
        if with_bounds {
            let mut min = vec![f32::INFINITY; width];
            let mut max = vec![f32::NEG_INFINITY; width];
            for chunk in data.chunks(width) {
                for (c, v) in chunk.iter().enumerate() {
                    min[c] = min[c].min(*v);
                    max[c] = max[c].max(*v);
                }
            }
            if let Some(obj) = accessor.as_object_mut() {
                obj.insert("min".to_string(), json!(min));
                obj.insert("max".to_string(), json!(max));
            }
        }
        self.push("accessors", accessor)
    }

    /// VEC3 accessor of `count` zero vectors (placeholder geometry).
    pub fn push_zero_vec3(&mut self, count: usize) -> usize {
        self.push_accessor(&vec![0.0; count * 3], "VEC3", 3, true)
    }

    fn input_accessor(&mut self, times: &[f32]) -> usize {
        if let Some((_, index)) = self.inputs.iter().find(|(t, _)| t.as_slice() == times) {
            return *index;
        }
        let (lo, hi) = bounds(times);
        let view = self.push_view(times);
        let index = self.push(
            "accessors",
            json!({
                "bufferView": view,
                "componentType": COMPONENT_FLOAT,
                "count": times.len(),
                "type": "SCALAR",
                "min": [lo],
                "max": [hi],
            }),
        );
        self.inputs.push((times.to_vec(), index));
        index
    }

    /// Add `clip` as a glTF animation. `node_index` maps graph nodes to
    /// document nodes; morph tracks of one mesh merge into a single
    /// `weights` channel.
    pub fn add_animation(
        &mut self,
        clip: &AnimationClip,
        graph: &RigGraph,
        node_index: &HashMap<NodeId, usize>,
    ) -> Result<usize, ExportError> {
        let mut channels = Vec::new();
        let mut samplers = Vec::new();
        let target_node = |track: &KeyframeTrack| {
            node_index.get(&track.node).copied().ok_or_else(|| {
                ExportError::InvalidClip(format!("'{}' targets an unmapped node", track.target))
            })
        };

        let mut morphs: IndexMap<NodeId, Vec<&KeyframeTrack>> = IndexMap::new();
        for track in &clip.tracks {
            if track.target.is_morph() {
                morphs.entry(track.node).or_default().push(track);
                continue;
            }
            match &track.values {
                TrackValues::Quat(quats) => {
                    let node = target_node(track)?;
                    let input = self.input_accessor(&track.times);
                    let flat: Vec<f32> = quats.iter().flatten().copied().collect();
                    let output = self.push_accessor(&flat, "VEC4", 4, false);
                    push_channel(&mut channels, &mut samplers, input, output, node, "rotation");
                }
                TrackValues::Scalar(_) => {
                    return Err(ExportError::InvalidClip(format!(
                        "scalar track '{}' has no glTF target",
                        track.target
                    )))
                }
            }
        }

        for (graph_node, tracks) in morphs {
            let Some(&first) = tracks.first() else {
                continue;
            };
            let node = target_node(first)?;
            let rig_node = graph.node(graph_node).ok_or_else(|| {
                ExportError::InvalidClip(format!("node {graph_node} is not in the rig graph"))
            })?;
            let targets = rig_node.morphs().map_or(0, |m| m.len());
            let frames = first.times.len();

            let mut by_channel: Vec<Option<&[f32]>> = vec![None; targets];
            for track in &tracks {
                if track.times != first.times {
                    return Err(ExportError::InvalidClip(format!(
                        "morph tracks of '{}' do not share a timeline",
                        rig_node.name
                    )));
                }
                if let (Some(i), Some(values)) = (track.target.morph_index(), track.scalars()) {
                    if let Some(slot) = by_channel.get_mut(i) {
                        *slot = Some(values);
                    }
                }
            }

            let mut weights = Vec::with_capacity(frames * targets);
            for f in 0..frames {
                for (i, channel) in by_channel.iter().enumerate() {
                    let w = channel
                        .and_then(|v| v.get(f).copied())
                        .unwrap_or_else(|| rig_node.default_weight(i));
                    weights.push(w);
                }
            }
            if weights.is_empty() {
                continue;
            }
            let input = self.input_accessor(&first.times);
            let output = self.push_accessor(&weights, "SCALAR", 1, false);
            push_channel(&mut channels, &mut samplers, input, output, node, "weights");
        }

        if channels.is_empty() {
            return Err(ExportError::EmptyClip);
        }
        Ok(self.push(
            "animations",
            json!({ "name": clip.name, "channels": channels, "samplers": samplers }),
        ))
    }

    /// Serialize as GLB and re-parse the result; an asset that fails to load
    /// is an error, never an output.
    pub fn into_glb(mut self) -> Result<Vec<u8>, ExportError> {
        self.bin.resize(pad4(self.bin.len()), 0);
        let bin_len = self.bin.len();
        if let Some(Json::Array(buffers)) = self.root.get_mut("buffers") {
            if let Some(buffer) = buffers.get_mut(self.buffer).and_then(Json::as_object_mut) {
                buffer.insert("byteLength".to_string(), json!(bin_len));
            }
        }

        let mut json = serde_json::to_vec(&self.root)
            .map_err(|e| ExportError::Serialize(e.to_string()))?;
        json.resize(pad4(json.len()), b' ');

        let total = GLB_HEADER_LEN + 2 * GLB_CHUNK_HEADER_LEN + json.len() + bin_len;
        let length = u32::try_from(total)
            .map_err(|_| ExportError::Serialize(format!("asset too large ({total} bytes)")))?;
        let glb = Glb {
            header: Header {
                magic: *b"glTF",
                version: 2,
                length,
            },
            json: Cow::Owned(json),
            bin: Some(Cow::Owned(self.bin)),
        };
        let bytes = glb
            .to_vec()
            .map_err(|e| ExportError::Serialize(e.to_string()))?;

        gltf::Gltf::from_slice(&bytes)
            .map_err(|e| ExportError::Serialize(format!("emitted asset does not load: {e}")))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad4_rounds_up() {
        assert_eq!(pad4(0), 0);
        assert_eq!(pad4(1), 4);
        assert_eq!(pad4(8), 8);
        assert_eq!(pad4(9), 12);
    }

    #[test]
    fn leading_buffer_shifts_views() {
        let json = br#"{
            "asset": { "version": "2.0" },
            "buffers": [ { "byteLength": 4, "uri": "data.bin" } ],
            "bufferViews": [ { "buffer": 0, "byteLength": 4 } ]
        }"#;
        let doc = GltfDocument::from_asset(json).unwrap();
        assert_eq!(doc.count("buffers"), 2);
        assert_eq!(doc.root["bufferViews"][0]["buffer"], 1);
        assert!(doc.root["buffers"][0].get("uri").is_none());
    }

    #[test]
    fn views_are_four_byte_aligned() {
        let mut doc = GltfDocument::new();
        doc.bin.push(7);
        let view = doc.push_view(&[1.0, 2.0]);
        assert_eq!(doc.root["bufferViews"][view]["byteOffset"], 4);
        assert_eq!(doc.bin.len(), 12);
    }

    #[test]
    fn input_accessors_are_shared() {
        let mut doc = GltfDocument::new();
        let a = doc.input_accessor(&[0.0, 0.5]);
        let b = doc.input_accessor(&[0.0, 0.5]);
        let c = doc.input_accessor(&[0.0, 1.0]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(doc.root["accessors"][c]["max"][0], 1.0);
    }
}
