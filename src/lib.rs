//! # OncoView
//!
//! Layered 3D anatomical visualization core for oncology dashboards.
//! One shared anatomical scene is shown through three mutually exclusive
//! analysis modes:
//! - Radiation dosimetry (dose-tinted regions, spinning dose fields)
//! - Tissue-damage assessment (damage-tinted regions, particle markers)
//! - Tumor morphology (pulsing tumors, dimmed elsewhere)
//!
//! ## Architecture
//!
//! OncoView is organized as a workspace with multiple crates:
//!
//! 1. **oncoview-core** - Entity model, view state, errors, event bus, collaborators
//! 2. **oncoview-visualizer** - Colorizer, scene composer, animation, camera, picking, render boundary
//! 3. **oncoview-settings** - Configuration files and validation
//! 4. **oncoview-ui** - Visualization shell, mode panel, frame loop
//! 5. **oncoview** - Headless binary that drives a session end to end

pub use oncoview_core::{
    event_bus, reference_anatomy, AnalysisMode, Announcer, AppEvent, AuditSink,
    ClinicalSnapshot, EntityId, EntityModel, Error, EventBusBridge, EventFilter, PatientContext,
    Result, ValidationError, ViewState, VisualizationError,
};
pub use oncoview_settings::{Config, SettingsError};
pub use oncoview_ui::{FrameLoop, LoopControl, ModeSummary, VisualizationShell};
pub use oncoview_visualizer::{
    compose, ColorizerConfig, InstanceBatcher, RecordingRenderer, RenderAdapter,
    SceneDescription,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output, or JSON lines when `ONCOVIEW_LOG_FORMAT=json`
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let json = std::env::var("ONCOVIEW_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
