//! OncoView Settings Crate
//!
//! Handles visualization configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{AnimationSettings, Config, ViewSettings, CONFIG_FILE_NAME};
pub use error::{SettingsError, SettingsResult};
