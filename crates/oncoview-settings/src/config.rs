//! Configuration and settings management for OncoView
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform configuration directory.
//!
//! Configuration is organized into sections:
//! - View defaults (initial mode, opacity, labels, auto-rotate)
//! - Colorizer ramps and thresholds
//! - Orbit camera limits and speeds
//! - Animation clock settings

use oncoview_core::{
    AnalysisMode, ValidationError, ViewState, MAX_OPACITY_SCALE, MIN_OPACITY_SCALE,
};
use oncoview_visualizer::{ColorizerConfig, OrbitConfig, PickOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{SettingsError, SettingsResult};

/// File name used inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Initial view state of a new session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub initial_mode: AnalysisMode,
    /// Region opacity multiplier in `[0.1, 1]`
    pub opacity_scale: f32,
    pub show_labels: bool,
    pub auto_rotate: bool,
    /// Primitives fainter than this cannot be clicked
    pub pick_min_opacity: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            initial_mode: AnalysisMode::Radiation,
            opacity_scale: 0.8,
            show_labels: true,
            auto_rotate: true,
            pick_min_opacity: PickOptions::default().min_opacity,
        }
    }
}

impl ViewSettings {
    /// View state for a freshly opened session.
    pub fn initial_view_state(&self) -> Result<ViewState, ValidationError> {
        let mut view = ViewState::new(self.initial_mode);
        view.set_opacity_scale(self.opacity_scale)?;
        view.show_labels = self.show_labels;
        view.auto_rotate = self.auto_rotate;
        Ok(view)
    }

    pub fn pick_options(&self) -> PickOptions {
        PickOptions {
            min_opacity: self.pick_min_opacity,
            ..PickOptions::default()
        }
    }
}

/// Animation clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Largest single frame delta fed to the clock (seconds)
    pub max_frame_delta_s: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            max_frame_delta_s: 0.1,
        }
    }
}

/// Complete visualization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub view: ViewSettings,
    pub colors: ColorizerConfig,
    pub camera: OrbitConfig,
    pub animation: AnimationSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/oncoview/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("oncoview").join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load from the default path, falling back to defaults when the file
    /// does not exist yet.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, content)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let opacity = self.view.opacity_scale;
        if !(MIN_OPACITY_SCALE..=MAX_OPACITY_SCALE).contains(&opacity) {
            return Err(SettingsError::invalid(
                "view.opacity_scale",
                format!(
                    "{} is outside [{}, {}]",
                    opacity, MIN_OPACITY_SCALE, MAX_OPACITY_SCALE
                ),
            ));
        }

        if !(0.0..=1.0).contains(&self.view.pick_min_opacity) {
            return Err(SettingsError::invalid(
                "view.pick_min_opacity",
                "must be within [0, 1]",
            ));
        }

        let max_delta = self.animation.max_frame_delta_s;
        if !(max_delta.is_finite() && max_delta > 0.0) {
            return Err(SettingsError::invalid(
                "animation.max_frame_delta_s",
                "must be > 0",
            ));
        }

        self.colors.validate()?;
        self.camera.validate()?;
        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
