//! Synthetic scenes for exports without a base asset.

use hashbrown::HashMap;
use mimic_rig_core::{arkit, MorphDictionary, NodeId, NodeKind, RigGraph, RigNode};
use serde_json::json;

use super::document::GltfDocument;
use crate::error::ExportError;

/// Stand-in face rig: an ARKit-vocabulary head mesh plus a
/// `Spine2 -> Neck -> Head` chain.
pub fn arkit_face_graph() -> RigGraph {
    let bone = |name: &str, parent: Option<NodeId>| RigNode {
        name: name.to_string(),
        parent,
        kind: NodeKind::Bone,
    };
    RigGraph::new(vec![
        bone("Spine2", None),
        bone("Neck", Some(0)),
        bone("Head", Some(1)),
        RigNode {
            name: "Wolf3D_Head".to_string(),
            parent: None,
            kind: NodeKind::Mesh {
                morphs: MorphDictionary::from_names(arkit::BLENDSHAPES),
                weights: Vec::new(),
            },
        },
    ])
}

/// Write `animated` graph nodes (and nothing else) into `doc` as one scene.
/// Parent links survive when the parent is animated too. Mesh nodes get a
/// degenerate triangle carrying one empty morph target per channel.
pub(crate) fn write_animated_nodes(
    doc: &mut GltfDocument,
    graph: &RigGraph,
    animated: &[NodeId],
) -> Result<HashMap<NodeId, usize>, ExportError> {
    let mut ids: Vec<NodeId> = animated.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let index: HashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut placeholder = None;
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    let mut roots = Vec::new();
    let mut nodes = Vec::with_capacity(ids.len());

    for (i, id) in ids.iter().enumerate() {
        let node = graph
            .node(*id)
            .ok_or_else(|| ExportError::InvalidClip(format!("node {id} is not in the rig graph")))?;

        match node.parent.and_then(|p| index.get(&p)) {
            Some(&parent) => children[parent].push(i),
            None => roots.push(i),
        }

        let mut out = json!({ "name": node.name });
        if let Some(morphs) = node.morphs().filter(|m| !m.is_empty()) {
            let position = *placeholder.get_or_insert_with(|| doc.push_zero_vec3(3));
            let targets: Vec<_> = (0..morphs.len())
                .map(|_| json!({ "POSITION": position }))
                .collect();
            let weights: Vec<f32> = (0..morphs.len()).map(|c| node.default_weight(c)).collect();
            let names: Vec<&str> = morphs.names().collect();
            let mesh = doc.push(
                "meshes",
                json!({
                    "name": node.name,
                    "primitives": [ { "attributes": { "POSITION": position }, "targets": targets } ],
                    "weights": weights,
                    "extras": { "targetNames": names },
                }),
            );
            out["mesh"] = json!(mesh);
        }
        nodes.push(out);
    }

    for (node, kids) in nodes.iter_mut().zip(children) {
        if !kids.is_empty() {
            node["children"] = json!(kids);
        }
    }
    for node in nodes {
        doc.push("nodes", node);
    }
    let scene = doc.push("scenes", json!({ "nodes": roots }));
    doc.set("scene", json!(scene));
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_graph_has_full_vocabulary() {
        let graph = arkit_face_graph();
        let face = &graph.nodes[graph.find("Wolf3D_Head").unwrap()];
        assert_eq!(face.morphs().unwrap().len(), 53);
        assert_eq!(face.morphs().unwrap().index_of("_neutral"), Some(0));
        assert_eq!(graph.nodes[graph.find("Head").unwrap()].parent, graph.find("Neck"));
    }
}
