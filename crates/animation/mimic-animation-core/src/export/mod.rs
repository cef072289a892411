//! GLB export of baked recordings.
//!
//! Three entry points, all rejecting an empty recording before touching any
//! asset:
//! - onto a base asset (`.glb` or `.gltf` bytes): the clip is added as a glTF
//!   animation and the asset's own content is carried over
//! - onto the stand-in ARKit face when no base asset is given
//! - onto the animated nodes of a live rig graph
//!
//! Every emitted file is re-parsed before it is returned.

mod document;
pub mod scene;

use hashbrown::HashMap;
use log::info;
use mimic_rig_core::{resolve, AliasTable, RigGraph};

use crate::baking::bake_clip;
use crate::clip::AnimationClip;
use crate::config::BakeConfig;
use crate::error::ExportError;
use crate::recorder::Recording;
use document::GltfDocument;

pub use scene::arkit_face_graph;

#[derive(Clone, Debug, Default)]
pub struct Exporter {
    config: BakeConfig,
    aliases: AliasTable,
}

impl Exporter {
    pub fn new(config: BakeConfig) -> Self {
        Self {
            config,
            aliases: AliasTable::default(),
        }
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn config(&self) -> &BakeConfig {
        &self.config
    }

    /// Bake and export; `base_asset` of `None` selects the stand-in face.
    pub fn export(
        &self,
        recording: &Recording,
        base_asset: Option<&[u8]>,
    ) -> Result<Vec<u8>, ExportError> {
        match base_asset {
            Some(bytes) => self.export_onto_asset(recording, bytes),
            None => self.export_from_graph(recording, &arkit_face_graph()),
        }
    }

    pub fn export_onto_asset(
        &self,
        recording: &Recording,
        asset: &[u8],
    ) -> Result<Vec<u8>, ExportError> {
        if recording.is_empty() {
            return Err(ExportError::EmptyRecording);
        }
        let gltf =
            gltf::Gltf::from_slice(asset).map_err(|e| ExportError::AssetRead(e.to_string()))?;
        let graph = RigGraph::from_gltf_document(&gltf.document);
        let rig = resolve(&graph, &self.aliases)?;
        let clip = bake_clip(recording, &rig, &self.config)?;

        let mut doc = GltfDocument::from_asset(asset)?;
        // Graph ids are glTF node indices.
        let identity: HashMap<usize, usize> = (0..graph.len()).map(|i| (i, i)).collect();
        doc.add_animation(&clip, &graph, &identity)?;
        let bytes = doc.into_glb()?;
        log_export(&clip, bytes.len());
        Ok(bytes)
    }

    /// Synthetic scene holding only the nodes the clip animates.
    pub fn export_from_graph(
        &self,
        recording: &Recording,
        graph: &RigGraph,
    ) -> Result<Vec<u8>, ExportError> {
        if recording.is_empty() {
            return Err(ExportError::EmptyRecording);
        }
        let rig = resolve(graph, &self.aliases)?;
        let clip = bake_clip(recording, &rig, &self.config)?;

        let animated: Vec<usize> = clip.tracks.iter().map(|t| t.node).collect();
        let mut doc = GltfDocument::new();
        let index = scene::write_animated_nodes(&mut doc, graph, &animated)?;
        doc.add_animation(&clip, graph, &index)?;
        let bytes = doc.into_glb()?;
        log_export(&clip, bytes.len());
        Ok(bytes)
    }
}

fn log_export(clip: &AnimationClip, bytes: usize) {
    info!(
        "export: '{}' ({} track(s), {:.3}s) -> {} byte GLB",
        clip.name,
        clip.tracks.len(),
        clip.duration,
        bytes
    );
}

/// Export with the default alias table.
pub fn export_glb(
    recording: &Recording,
    base_asset: Option<&[u8]>,
    cfg: &BakeConfig,
) -> Result<Vec<u8>, ExportError> {
    Exporter::new(cfg.clone()).export(recording, base_asset)
}

pub fn export_glb_from_graph(
    recording: &Recording,
    graph: &RigGraph,
    cfg: &BakeConfig,
) -> Result<Vec<u8>, ExportError> {
    Exporter::new(cfg.clone()).export_from_graph(recording, graph)
}
