//! Rig graph: the named node/mesh/bone view of a loaded character.
//!
//! The graph is a read-only snapshot of the externally owned scene. Node ids
//! are positions in `nodes`; for glTF-imported graphs they equal glTF node
//! indices, which lets exporters address the same nodes in the source asset.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::error::RigError;

pub type NodeId = usize;

/// Morph target name -> channel index lookup for one mesh.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MorphDictionary {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl MorphDictionary {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // First definition wins for duplicated names.
            index.entry(name.clone()).or_insert(i);
        }
        Self { names, index }
    }

    /// Channel index for `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Name of channel `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of influence channels.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<Vec<String>> for MorphDictionary {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<MorphDictionary> for Vec<String> {
    fn from(dict: MorphDictionary) -> Self {
        dict.names
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    /// Mesh-bearing node; `weights` are the mesh's default influences.
    Mesh {
        #[serde(default)]
        morphs: MorphDictionary,
        #[serde(default)]
        weights: Vec<f32>,
    },
    /// Skin joint.
    Bone,
    /// Any other node.
    Transform,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RigNode {
    pub name: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl RigNode {
    pub fn morphs(&self) -> Option<&MorphDictionary> {
        match &self.kind {
            NodeKind::Mesh { morphs, .. } => Some(morphs),
            _ => None,
        }
    }

    /// Default influence of morph channel `index` (0 when unspecified).
    pub fn default_weight(&self, index: usize) -> f32 {
        match &self.kind {
            NodeKind::Mesh { weights, .. } => weights.get(index).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Bones and plain transforms can both carry a rotation.
    pub fn is_articulated(&self) -> bool {
        matches!(self.kind, NodeKind::Bone | NodeKind::Transform)
    }

    /// Mesh with at least one morph channel.
    pub fn is_morphable(&self) -> bool {
        self.morphs().is_some_and(|m| !m.is_empty())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RigGraph {
    pub nodes: Vec<RigNode>,
}

impl RigGraph {
    pub fn new(nodes: Vec<RigNode>) -> Self {
        Self { nodes }
    }

    pub fn from_json(s: &str) -> Result<Self, RigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn node(&self, id: NodeId) -> Option<&RigNode> {
        self.nodes.get(id)
    }

    /// First node named `name`, in graph order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// First-match name index (later duplicates are shadowed).
    pub fn name_index(&self) -> HashMap<&str, NodeId> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (id, node) in self.nodes.iter().enumerate() {
            index.entry(node.name.as_str()).or_insert(id);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parse a glTF (JSON) or GLB asset and build its graph. Buffers are not
    /// loaded; only names, hierarchy, skins and morph metadata are read.
    pub fn from_gltf_slice(bytes: &[u8]) -> Result<Self, RigError> {
        let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| RigError::AssetRead(e.to_string()))?;
        Ok(Self::from_gltf_document(&gltf.document))
    }

    pub fn from_gltf_document(document: &gltf::Document) -> Self {
        let node_count = document.nodes().count();

        let mut parents = vec![None; node_count];
        for node in document.nodes() {
            for child in node.children() {
                parents[child.index()] = Some(node.index());
            }
        }

        let joints: HashSet<usize> = document
            .skins()
            .flat_map(|skin| skin.joints().map(|j| j.index()))
            .collect();

        let nodes = document
            .nodes()
            .map(|node| {
                let name = node
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("node_{}", node.index()));
                let kind = if let Some(mesh) = node.mesh() {
                    let count = mesh
                        .primitives()
                        .map(|p| p.morph_targets().count())
                        .max()
                        .unwrap_or(0);
                    NodeKind::Mesh {
                        morphs: MorphDictionary::from_names(morph_target_names(&mesh, count)),
                        weights: mesh.weights().map(<[f32]>::to_vec).unwrap_or_default(),
                    }
                } else if joints.contains(&node.index()) {
                    NodeKind::Bone
                } else {
                    NodeKind::Transform
                };
                RigNode {
                    name,
                    parent: parents[node.index()],
                    kind,
                }
            })
            .collect();

        Self { nodes }
    }
}

/// Morph names from the mesh's `extras.targetNames`; channels without a name
/// are named by their index.
fn morph_target_names(mesh: &gltf::Mesh, count: usize) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    if let Some(extras) = mesh.extras().as_ref() {
        if let Ok(val) = serde_json::from_str::<serde_json::Value>(extras.get()) {
            if let Some(list) = val.get("targetNames").and_then(|v| v.as_array()) {
                names = list
                    .iter()
                    .take(count)
                    .map(|v| v.as_str().unwrap_or_default().to_string())
                    .collect();
            }
        }
    }
    for i in names.len()..count {
        names.push(i.to_string());
    }
    for (i, name) in names.iter_mut().enumerate() {
        if name.is_empty() {
            *name = i.to_string();
        }
    }
    names
}
