//! Replay a captured detection stream through a session and write the take.
//!
//! cargo run -p mimic-session --example record_and_export -- [output.glb]

use std::path::PathBuf;

use anyhow::{Context, Result};
use mimic_api_core::DetectionSample;
use mimic_retarget_core::TickOutcome;
use mimic_session::{Session, SessionConfig};

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    let mut session = Session::new(SessionConfig::default())?;
    let asset = mimic_test_fixtures::assets::bytes("head_rig")?;
    let generation = session.load_rig_asset(&asset)?;
    println!("bound rig (load {generation})");

    let samples: Vec<DetectionSample> = mimic_test_fixtures::samples::load("head_and_hands")?;
    session.start_recording();
    for sample in &samples {
        if let TickOutcome::Applied {
            morphs_written,
            bones_written,
            channels_skipped,
        } = session.on_detection(sample)
        {
            println!(
                "t={:>6} morphs={morphs_written} bones={bones_written} skipped={channels_skipped}",
                sample.timestamp_ms
            );
        }
    }
    session.stop_recording();

    let artifact = session.export(Some("demoRecording"), None)?;
    let path = if out_dir.extension().is_some() {
        out_dir
    } else {
        out_dir.join(&artifact.file_name)
    };
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "wrote {} frame(s) to {} ({} bytes)",
        session.recording().len(),
        path.display(),
        artifact.bytes.len()
    );
    Ok(())
}
