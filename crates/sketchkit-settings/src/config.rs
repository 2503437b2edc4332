//! Designer configuration
//!
//! Settings are grouped into sections:
//! - Grid (kind, spacing, colour, snapping)
//! - Editing (bounds constraint, aspect lock, nudge increments, handle size)
//! - Animation (timer interval)
//!
//! Files are JSON or TOML, chosen by extension.

use serde::{Deserialize, Serialize};
use sketchkit_core::constants;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// How the background grid is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridKind {
    /// No grid
    #[default]
    None,
    /// Continuous lines
    Lines,
    /// A dot at every intersection
    Dots,
}

impl std::fmt::Display for GridKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Lines => write!(f, "lines"),
            Self::Dots => write!(f, "dots"),
        }
    }
}

impl std::str::FromStr for GridKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "lines" => Ok(Self::Lines),
            "dots" => Ok(Self::Dots),
            other => Err(ConfigError::out_of_range("grid.kind", other)),
        }
    }
}

/// Grid settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Grid style
    pub kind: GridKind,
    /// Distance between grid lines in model units
    pub spacing: f64,
    /// CSS colour of grid lines or dots
    pub color: String,
    /// Snap moving and resizing edges to the grid
    pub snap_to_grid: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            kind: GridKind::None,
            spacing: constants::DEFAULT_GRID_SPACING,
            color: "#d0d0d0".to_string(),
            snap_to_grid: false,
        }
    }
}

/// Editing constraints and increments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingSettings {
    /// Keep moved and resized elements inside the model rectangle
    pub constrain_to_bounds: bool,
    /// Preserve aspect ratio on every resize
    pub lock_aspect: bool,
    /// Smallest width or height a resize may produce
    pub min_element_size: f64,
    /// Side length of resize and point handles
    pub handle_size: f64,
    /// Arrow key increment
    pub nudge_small: f64,
    /// Shift+arrow increment
    pub nudge_large: f64,
    /// Squared pointer travel before a press becomes a move
    pub drag_threshold_sq: f64,
    /// Offset applied to duplicated elements
    pub duplicate_offset: f64,
    /// CSS colour of selection outlines and handles
    pub selection_color: String,
}

impl Default for EditingSettings {
    fn default() -> Self {
        Self {
            constrain_to_bounds: true,
            lock_aspect: false,
            min_element_size: constants::MIN_ELEMENT_SIZE,
            handle_size: constants::DEFAULT_HANDLE_SIZE,
            nudge_small: constants::NUDGE_SMALL,
            nudge_large: constants::NUDGE_LARGE,
            drag_threshold_sq: constants::DRAG_THRESHOLD_SQUARED,
            duplicate_offset: constants::DUPLICATE_OFFSET,
            selection_color: "#1e90ff".to_string(),
        }
    }
}

/// Animation timer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Interval between timer ticks in milliseconds
    pub timer_interval_ms: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            timer_interval_ms: constants::DEFAULT_TIMER_INTERVAL_MS,
        }
    }
}

/// Complete designer configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerSettings {
    /// Grid settings
    pub grid: GridSettings,
    /// Editing settings
    pub editing: EditingSettings,
    /// Animation settings
    pub animation: AnimationSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl DesignerSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the settings file
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("sketchkit").join("designer.toml"))
            .ok_or_else(|| SettingsError::ConfigDirectory("no config directory".to_string()))
    }

    /// Load settings from a JSON or TOML file
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path)?;
        let settings: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        settings.validate()?;
        tracing::debug!("Loaded designer settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(
                "Settings file {} not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Save settings to a JSON or TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_for(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Validate value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.grid.spacing <= 0.0 {
            return Err(ConfigError::out_of_range("grid.spacing", self.grid.spacing));
        }
        let editing = &self.editing;
        if editing.min_element_size < 0.0 {
            return Err(ConfigError::out_of_range(
                "editing.min_element_size",
                editing.min_element_size,
            ));
        }
        if editing.handle_size <= 0.0 {
            return Err(ConfigError::out_of_range(
                "editing.handle_size",
                editing.handle_size,
            ));
        }
        if editing.nudge_small <= 0.0 {
            return Err(ConfigError::out_of_range(
                "editing.nudge_small",
                editing.nudge_small,
            ));
        }
        if editing.nudge_large <= 0.0 {
            return Err(ConfigError::out_of_range(
                "editing.nudge_large",
                editing.nudge_large,
            ));
        }
        if editing.drag_threshold_sq < 0.0 {
            return Err(ConfigError::out_of_range(
                "editing.drag_threshold_sq",
                editing.drag_threshold_sq,
            ));
        }
        if self.animation.timer_interval_ms == 0 {
            return Err(ConfigError::out_of_range("animation.timer_interval_ms", 0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DesignerSettings::default();
        assert_eq!(settings.grid.spacing, 8.0);
        assert_eq!(settings.grid.kind, GridKind::None);
        assert!(!settings.grid.snap_to_grid);
        assert!(settings.editing.constrain_to_bounds);
        assert_eq!(settings.editing.nudge_small, 1.0);
        assert_eq!(settings.editing.nudge_large, 10.0);
        assert_eq!(settings.editing.drag_threshold_sq, 8.0);
        assert_eq!(settings.animation.timer_interval_ms, 50);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_spacing() {
        let mut settings = DesignerSettings::default();
        settings.grid.spacing = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_grid_kind_parse() {
        assert_eq!("Dots".parse::<GridKind>(), Ok(GridKind::Dots));
        assert_eq!(" lines ".parse::<GridKind>(), Ok(GridKind::Lines));
        assert!("hex".parse::<GridKind>().is_err());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings: DesignerSettings =
            serde_json::from_str(r#"{"grid": {"spacing": 16.0}}"#).expect("valid json");
        assert_eq!(settings.grid.spacing, 16.0);
        assert_eq!(settings.editing, EditingSettings::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = DesignerSettings::default()
            .save(Path::new("designer.yaml"))
            .expect_err("yaml is not supported");
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(_))
        ));
    }
}
