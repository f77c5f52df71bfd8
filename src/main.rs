//! Headless OncoView session.
//!
//! Opens the reference anatomy, walks through every analysis mode while
//! rendering into the instance batcher, and prints each mode summary as
//! JSON.
//!
//! Usage: `oncoview [config.toml|config.json]`

use std::path::PathBuf;

use anyhow::Context;
use oncoview::{
    event_bus, init_logging, AnalysisMode, AppEvent, Config, EventFilter, FrameLoop,
    InstanceBatcher, LoopControl, PatientContext, VisualizationShell, BUILD_DATE, VERSION,
};

/// Frames rendered per mode at 60 Hz
const FRAMES_PER_MODE: u32 = 120;

fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("OncoView {} (built {})", VERSION, BUILD_DATE);

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Config::load_from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::load_or_default()?,
    };

    event_bus().subscribe(EventFilter::All, |event: AppEvent| {
        tracing::info!(category = ?event.category(), "{}", event.description());
    });

    let mut shell = VisualizationShell::with_event_bus(config)?;
    shell.resize(1280.0, 720.0);
    shell.open_reference(PatientContext::new(
        "P-2024-001",
        "Sarah Johnson",
        58,
        "Adenocarcinoma",
    ))?;

    let mut batcher = InstanceBatcher::new();
    let mut frame_loop = FrameLoop::new();
    frame_loop.start(&shell);
    let mut timestamp = 0.0;

    for mode in AnalysisMode::ALL {
        shell.set_mode(mode)?;
        for _ in 0..FRAMES_PER_MODE {
            timestamp += 1.0 / 60.0;
            if frame_loop.tick(timestamp, &mut shell, &mut batcher) == LoopControl::Break {
                anyhow::bail!("frame loop stopped unexpectedly");
            }
        }

        let summary = shell
            .summary()
            .context("visualization closed while running")?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        for (class, instances) in batcher.batches() {
            tracing::debug!(?class, instances = instances.len(), "Last frame batch");
        }
    }

    shell.close();
    tracing::info!(frames = frame_loop.frames(), "Session finished");
    Ok(())
}
