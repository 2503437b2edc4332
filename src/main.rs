//! SketchKit CLI - render and inspect model documents without a host UI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sketchkit::init_logging;
use sketchkit_core::{shared, EventBus};
use sketchkit_designer::{to_rgba_image, DesignController, ElementFactory, FileLoader, Model};
use sketchkit_settings::DesignerSettings;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::Pixmap;
use tracing::{info, warn};

/// SketchKit CLI - headless access to model documents
#[derive(Parser)]
#[command(name = "sketchkit")]
#[command(about = "Render and inspect SketchKit model documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a model document to a PNG file
    Render {
        /// Model document (JSON)
        model: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Output width in pixels (default: model width)
        #[arg(long)]
        width: Option<u32>,

        /// Output height in pixels (default: model height)
        #[arg(long)]
        height: Option<u32>,

        /// Animation ticks to play before rendering
        #[arg(long, default_value_t = 0)]
        ticks: u32,

        /// Designer settings file (JSON or TOML) for grid drawing
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Print a summary of a model document
    Inspect {
        /// Model document (JSON)
        model: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            model,
            output,
            width,
            height,
            ticks,
            settings,
        } => render(&model, &output, width, height, ticks, settings.as_deref()).await,
        Commands::Inspect { model } => {
            let model = load_model(&model).await?;
            print!("{}", summarize(&model));
            Ok(())
        }
    }
}

/// Reads a model document and loads its resources relative to its directory.
/// Resource failures are logged; the affected fills render as placeholders.
async fn load_model(path: &Path) -> Result<Model> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let factory = ElementFactory::with_builtins();
    let mut model =
        Model::from_json(&text, &factory).with_context(|| format!("parsing {}", path.display()))?;

    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let loader = FileLoader::new(root);
    if !model.resources_mut().load(&loader, &factory).await {
        warn!("Some resources of {} failed to load", path.display());
    }
    Ok(model)
}

async fn render(
    model_path: &Path,
    output: &Path,
    width: Option<u32>,
    height: Option<u32>,
    ticks: u32,
    settings: Option<&Path>,
) -> Result<()> {
    let settings = match settings {
        Some(path) => DesignerSettings::load(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => DesignerSettings::default(),
    };
    let model = load_model(model_path).await?;
    let size = model.size();
    let width = width.unwrap_or(size.width.ceil().max(1.0) as u32);
    let height = height.unwrap_or(size.height.ceil().max(1.0) as u32);
    let bounds = model.bounds();
    let model = shared(model);

    let mut controller = DesignController::new(settings, Arc::new(EventBus::new()));
    controller.set_model(Some(model.clone()));
    for _ in 0..ticks {
        controller.router().dispatch_timer(&mut model.borrow_mut());
    }

    let viewport = controller.viewport_mut();
    viewport.set_canvas_size(width as f64, height as f64);
    viewport.fit_to_bounds(bounds, 0.0);

    let mut pixmap = Pixmap::new(width, height).context("output size must be non-zero")?;
    controller.render(&mut pixmap);
    to_rgba_image(&pixmap)
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        "Rendered {} ({}x{}, {} tick(s)) to {}",
        model_path.display(),
        width,
        height,
        ticks,
        output.display()
    );
    Ok(())
}

/// One line for the model, one per element and one per resource.
fn summarize(model: &Model) -> String {
    let size = model.size();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "model {}x{} background={} elements={} resources={}",
        size.width,
        size.height,
        model.background.as_deref().unwrap_or("none"),
        model.len(),
        model.resources().len()
    );
    for (index, element) in model.elements().iter().enumerate() {
        let fill = element
            .style
            .fill
            .as_ref()
            .and_then(|f| f.as_text())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  [{}] {} id={} bounds={} fill={}",
            index,
            element.type_name(),
            element.id.as_deref().unwrap_or("-"),
            element.bounds(),
            fill
        );
    }
    for resource in model.resources().iter() {
        let _ = writeln!(
            out,
            "  {} '{}' {}",
            resource.kind(),
            resource.key(),
            if resource.is_available() {
                "loaded"
            } else {
                "pending"
            }
        );
    }
    out
}
