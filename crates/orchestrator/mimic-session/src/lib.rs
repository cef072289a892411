//! mimic-session
//!
//! The single-threaded driver behind an avatar mirror: one `Session` owns the
//! retarget engine, the frame recorder and the exporter, and the host calls
//! into it from its perception callback and UI handlers.
//!
//! Rig loads are two-phase. `begin_rig_load` drops the bound rig at once, so
//! perception ticks are skipped while the asset is fetched and parsed, and
//! hands out a generation number. `finish_rig_load` binds the resolved rig
//! only if no newer load began in the meantime.

pub mod config;
pub mod error;

use log::{info, warn};
use mimic_animation_core::{Exporter, Recorder, RecorderState, Recording};
use mimic_api_core::DetectionSample;
use mimic_retarget_core::{Engine, RigPose, TickOutcome};
use mimic_rig_core::{resolve, AliasTable, ResolvedRig, RigGraph};
use serde::{Deserialize, Serialize};

pub use crate::config::SessionConfig;
pub use crate::error::SessionError;

pub const DEFAULT_EXPORT_NAME: &str = "avatarRecording.glb";

/// One exported file, ready for the host to deliver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What the bound rig was loaded from; exports without an explicit base
/// asset animate this.
#[derive(Debug)]
enum RigSource {
    Asset(Vec<u8>),
    Graph(RigGraph),
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    aliases: AliasTable,
    engine: Engine,
    recorder: Recorder,
    exporter: Exporter,
    generation: u64,
    loading: Option<u64>,
    source: Option<RigSource>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let aliases = config.alias_table();
        let engine = Engine::new(config.retarget.clone())?;
        let exporter = Exporter::new(config.bake.clone()).with_aliases(aliases.clone());
        Ok(Self {
            config,
            aliases,
            engine,
            recorder: Recorder::new(),
            exporter,
            generation: 0,
            loading: None,
            source: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start a rig load. The current rig is released immediately.
    pub fn begin_rig_load(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        if let Some(pending) = self.loading.replace(self.generation) {
            info!("session: load {pending} superseded by load {}", self.generation);
        }
        self.engine.unbind();
        self.source = None;
        self.generation
    }

    /// Resolve `graph` and bind it for load `generation`. Returns `false` when
    /// that load is no longer current (a newer one began, or it already
    /// finished); nothing changes in that case.
    pub fn finish_rig_load(
        &mut self,
        generation: u64,
        graph: RigGraph,
    ) -> Result<bool, SessionError> {
        if self.loading != Some(generation) {
            warn!(
                "session: discarding stale rig load {generation} (current {})",
                self.generation
            );
            return Ok(false);
        }
        self.loading = None;

        let mut rig = resolve(&graph, &self.aliases)?;
        rig.generation = generation;
        info!(
            "session: load {generation} bound {} role(s) across {} node(s)",
            rig.bound_roles(),
            graph.len()
        );
        self.engine.bind(rig);
        self.source = Some(RigSource::Graph(graph));
        Ok(true)
    }

    /// Begin, parse and bind a glTF/GLB asset in one step. The asset bytes
    /// are kept as the default export base.
    pub fn load_rig_asset(&mut self, bytes: &[u8]) -> Result<u64, SessionError> {
        let generation = self.begin_rig_load();
        let graph = match RigGraph::from_gltf_slice(bytes) {
            Ok(graph) => graph,
            Err(e) => {
                self.loading = None;
                return Err(e.into());
            }
        };
        if self.finish_rig_load(generation, graph)? {
            self.source = Some(RigSource::Asset(bytes.to_vec()));
        }
        Ok(generation)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn rig(&self) -> Option<&ResolvedRig> {
        self.engine.rig()
    }

    /// Perception callback: retarget, then record.
    pub fn on_detection(&mut self, sample: &DetectionSample) -> TickOutcome {
        let outcome = self.engine.apply(sample);
        self.recorder.capture_sample(sample);
        outcome
    }

    /// Pose for the render surface.
    pub fn pose(&self) -> &RigPose {
        self.engine.pose()
    }

    pub fn start_recording(&mut self) {
        self.recorder.start();
    }

    pub fn stop_recording(&mut self) {
        self.recorder.stop();
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder.state()
    }

    pub fn recording(&self) -> Recording {
        self.recorder.get_recording()
    }

    /// Bake the current recording into a GLB.
    ///
    /// The clip lands on `base_asset` when given, else on the loaded rig
    /// asset, else on a synthetic scene of the loaded graph, else on the
    /// stand-in face.
    pub fn export(
        &self,
        output_name: Option<&str>,
        base_asset: Option<&[u8]>,
    ) -> Result<ExportArtifact, SessionError> {
        let recording = self.recorder.get_recording();
        let bytes = match (base_asset, &self.source) {
            (Some(asset), _) => self.exporter.export_onto_asset(&recording, asset)?,
            (None, Some(RigSource::Asset(asset))) => {
                self.exporter.export_onto_asset(&recording, asset)?
            }
            (None, Some(RigSource::Graph(graph))) => {
                self.exporter.export_from_graph(&recording, graph)?
            }
            (None, None) => self.exporter.export(&recording, None)?,
        };
        let file_name = export_file_name(output_name);
        info!("session: exported {} ({} bytes)", file_name, bytes.len());
        Ok(ExportArtifact { file_name, bytes })
    }
}

/// `None` or blank gives the default name; `.glb` is appended when missing.
pub fn export_file_name(output_name: Option<&str>) -> String {
    match output_name.map(str::trim).filter(|n| !n.is_empty()) {
        None => DEFAULT_EXPORT_NAME.to_string(),
        Some(name) if name.to_ascii_lowercase().ends_with(".glb") => name.to_string(),
        Some(name) => format!("{name}.glb"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_names() {
        assert_eq!(export_file_name(None), "avatarRecording.glb");
        assert_eq!(export_file_name(Some("  ")), "avatarRecording.glb");
        assert_eq!(export_file_name(Some("take1")), "take1.glb");
        assert_eq!(export_file_name(Some("take1.GLB")), "take1.GLB");
        assert_eq!(export_file_name(Some("take.gltf")), "take.gltf.glb");
    }

    #[test]
    fn loads_are_generational() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        let first = session.begin_rig_load();
        let second = session.begin_rig_load();
        assert!(second > first);
        assert!(session.is_loading());
        assert!(!session
            .finish_rig_load(first, RigGraph::default())
            .unwrap());
        assert!(session.is_loading());
        assert!(session.rig().is_none());
    }
}
