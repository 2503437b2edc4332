//! SketchKit Settings Crate
//!
//! Designer configuration (grid, editing constraints, animation) and its
//! JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{AnimationSettings, DesignerSettings, EditingSettings, GridKind, GridSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
