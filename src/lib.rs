//! # SketchKit
//!
//! An interactive 2D vector drawing engine:
//!
//! 1. **sketchkit-core** - Geometry, identifiers, errors, notification bus
//! 2. **sketchkit-settings** - Grid, editing and animation configuration
//! 3. **sketchkit-designer** - Elements, models, resources, fills, rendering,
//!    commands and the interactive design controller
//! 4. **sketchkit** - Logging setup and the headless `render` / `inspect` CLI

pub use sketchkit_core as core;
pub use sketchkit_designer as designer;
pub use sketchkit_settings as settings;

pub use sketchkit_core::{Error, Point, Region, Result, Size};
pub use sketchkit_designer::{DesignController, Element, ElementFactory, Model};
pub use sketchkit_settings::DesignerSettings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, so CLI output on stdout stays clean
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
