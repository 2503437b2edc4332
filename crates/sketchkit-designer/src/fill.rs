//! Declarative fills and their resolution into paint.
//!
//! An element's fill is one of a solid colour, a linear or radial gradient,
//! or a reference to a tiled resource written `image(key)`,
//! `image(opacity;key)`, `model(key)` or `model(opacity;key)`.
//!
//! Gradient coordinates are relative to the element's bounds: `(0,0)` is the
//! top-left corner and `(1,1)` the bottom-right.
//!
//! A reference to a resource that is not available resolves to the magenta
//! placeholder and publishes [`DiagnosticEvent::ResourceMissing`], so one bad
//! reference degrades a render instead of aborting it.

use sketchkit_core::{DesignerEvent, DiagnosticEvent, ElementKey, EventBus, Point, Region};
use std::collections::HashSet;
use std::fmt;
use tiny_skia::{FilterQuality, Paint, Pattern, Pixmap, Shader, SpreadMode, Transform};
use tracing::warn;

use crate::color::{parse_color, parse_color_or, placeholder, with_opacity};
use crate::element::{Element, Style};
use crate::renderer;
use crate::resources::{ResourceKind, ResourceManager, ResourceRef};

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, clamped to `0..=1`.
    pub offset: f64,
    pub color: String,
}

impl GradientStop {
    pub fn new(offset: f64, color: impl Into<String>) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub focus: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    pub stops: Vec<GradientStop>,
}

/// A tiled resource used as a fill pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FillReference {
    pub kind: ResourceKind,
    pub opacity: f64,
    pub key: String,
}

impl FillReference {
    /// Parses `kind(key)` or `kind(opacity;key)`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let open = input.find('(')?;
        let inner = input[open + 1..].strip_suffix(')')?;
        let kind = input[..open].parse::<ResourceKind>().ok()?;
        let (opacity, key) = match inner.split_once(';') {
            Some((opacity, key)) => (opacity.trim().parse::<f64>().ok()?, key.trim()),
            None => (1.0, inner.trim()),
        };
        if key.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            opacity: opacity.clamp(0.0, 1.0),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for FillReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.opacity - 1.0).abs() < f64::EPSILON {
            write!(f, "{}({})", self.kind, self.key)
        } else {
            write!(f, "{}({};{})", self.kind, self.opacity, self.key)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(String),
    Linear(LinearGradient),
    Radial(RadialGradient),
    Reference(FillReference),
}

impl Fill {
    /// Parses a textual fill: a resource reference or a colour.
    pub fn parse(input: &str) -> Fill {
        match FillReference::parse(input) {
            Some(reference) => Fill::Reference(reference),
            None => Fill::Solid(input.trim().to_string()),
        }
    }

    /// The textual form, for fills that have one.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Fill::Solid(color) => Some(color.clone()),
            Fill::Reference(reference) => Some(reference.to_string()),
            Fill::Linear(_) | Fill::Radial(_) => None,
        }
    }

    pub fn resource_ref(&self) -> Option<ResourceRef> {
        match self {
            Fill::Reference(r) => Some(ResourceRef::new(r.kind, r.key.clone())),
            _ => None,
        }
    }
}

impl From<&str> for Fill {
    fn from(value: &str) -> Self {
        Fill::parse(value)
    }
}

impl From<String> for Fill {
    fn from(value: String) -> Self {
        Fill::parse(&value)
    }
}

/// Upward navigation from an element to its parent.
pub trait ElementLookup {
    fn element(&self, key: ElementKey) -> Option<&Element>;
}

/// The element's own fill, else the nearest ancestor's, else none.
pub fn fill_for_element<'a>(element: &'a Element, lookup: &'a dyn ElementLookup) -> Option<&'a Fill> {
    let mut current = element;
    let mut visited = HashSet::new();
    loop {
        if let Some(fill) = current.style.fill.as_ref() {
            return Some(fill);
        }
        if !visited.insert(current.key()) {
            return None;
        }
        current = lookup.element(current.parent()?)?;
    }
}

/// Paint built from a resolved fill.
pub enum PaintSource<'a> {
    Shader(Shader<'a>),
    /// A pattern over a pixmap rendered for this fill.
    Tile {
        pixmap: Pixmap,
        opacity: f32,
        transform: Transform,
    },
}

impl<'a> PaintSource<'a> {
    pub fn paint(&self) -> Paint<'_> {
        let shader = match self {
            PaintSource::Shader(shader) => shader.clone(),
            PaintSource::Tile {
                pixmap,
                opacity,
                transform,
            } => Pattern::new(
                pixmap.as_ref(),
                SpreadMode::Repeat,
                FilterQuality::Bilinear,
                *opacity,
                *transform,
            ),
        };
        Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        }
    }
}

/// Turns fills into paint against one model's resources.
pub struct FillResolver<'a> {
    resources: &'a ResourceManager,
    diagnostics: Option<&'a EventBus>,
}

impl<'a> FillResolver<'a> {
    pub fn new(resources: &'a ResourceManager) -> Self {
        Self {
            resources,
            diagnostics: None,
        }
    }

    pub fn with_diagnostics(mut self, bus: &'a EventBus) -> Self {
        self.diagnostics = Some(bus);
        self
    }

    pub fn resources(&self) -> &'a ResourceManager {
        self.resources
    }

    pub fn diagnostics(&self) -> Option<&'a EventBus> {
        self.diagnostics
    }

    /// Paint for a fill over `bounds`; `None` for a transparent fill.
    pub fn resolve(&self, fill: &Fill, bounds: Region, style: &Style) -> Option<PaintSource<'a>> {
        match fill {
            Fill::Solid(color) => {
                if color.trim().eq_ignore_ascii_case("none") || color.trim().is_empty() {
                    return None;
                }
                Some(PaintSource::Shader(Shader::SolidColor(parse_color_or(
                    color,
                    placeholder(),
                ))))
            }
            Fill::Linear(gradient) => {
                let stops = convert_stops(&gradient.stops);
                tiny_skia::LinearGradient::new(
                    to_skia(gradient.start),
                    to_skia(gradient.end),
                    stops,
                    SpreadMode::Pad,
                    unit_transform(bounds),
                )
                .map(PaintSource::Shader)
                .or_else(|| self.degenerate_gradient(&gradient.stops))
            }
            Fill::Radial(gradient) => {
                let rx = gradient.radius_x.max(f64::EPSILON);
                let ratio = (gradient.radius_y / rx) as f32;
                let c = gradient.center;
                // Squash the circle about the centre to get the second radius.
                let ellipse = Transform::from_translate(c.x as f32, c.y as f32)
                    .pre_scale(1.0, ratio)
                    .pre_translate(-c.x as f32, -c.y as f32);
                let focus = Point::new(
                    gradient.focus.x,
                    c.y + (gradient.focus.y - c.y) / ratio.max(f32::EPSILON) as f64,
                );
                tiny_skia::RadialGradient::new(
                    to_skia(focus),
                    to_skia(c),
                    rx as f32,
                    convert_stops(&gradient.stops),
                    SpreadMode::Pad,
                    unit_transform(bounds).pre_concat(ellipse),
                )
                .map(PaintSource::Shader)
                .or_else(|| self.degenerate_gradient(&gradient.stops))
            }
            Fill::Reference(reference) => Some(self.resolve_reference(reference, bounds, style)),
        }
    }

    fn resolve_reference(
        &self,
        reference: &FillReference,
        bounds: Region,
        style: &Style,
    ) -> PaintSource<'a> {
        let scale = style.fill_scale.max(f64::EPSILON) as f32;
        let transform = Transform::from_translate(
            (bounds.x + style.fill_offset.x) as f32,
            (bounds.y + style.fill_offset.y) as f32,
        )
        .pre_scale(scale, scale);
        let opacity = reference.opacity as f32;

        match reference.kind {
            ResourceKind::Image => {
                if let Some(pixmap) = self.resources.image(&reference.key) {
                    return PaintSource::Shader(Pattern::new(
                        pixmap.as_ref(),
                        SpreadMode::Repeat,
                        FilterQuality::Bilinear,
                        opacity,
                        transform,
                    ));
                }
            }
            ResourceKind::Model => {
                if let Some(model) = self.resources.model(&reference.key) {
                    let tile = {
                        let model = model.borrow();
                        renderer::render_model(&model, self.diagnostics)
                    };
                    if let Some(pixmap) = tile {
                        return PaintSource::Tile {
                            pixmap,
                            opacity,
                            transform,
                        };
                    }
                }
            }
        }

        self.report_missing(&reference.key);
        PaintSource::Shader(Shader::SolidColor(with_opacity(placeholder(), opacity)))
    }

    fn degenerate_gradient(&self, stops: &[GradientStop]) -> Option<PaintSource<'a>> {
        let first = stops.first()?;
        warn!("Degenerate gradient, filling with its first stop");
        parse_color(&first.color).map(|c| PaintSource::Shader(Shader::SolidColor(c)))
    }

    /// Logs and publishes a missing resource.
    pub fn report_missing(&self, key: &str) {
        warn!("Resource '{}' is not available, drawing placeholder", key);
        if let Some(bus) = self.diagnostics {
            bus.publish(DesignerEvent::Diagnostic(DiagnosticEvent::ResourceMissing {
                key: key.to_string(),
            }));
        }
    }
}

fn to_skia(p: Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x as f32, p.y as f32)
}

/// Maps the unit square onto `bounds`.
fn unit_transform(bounds: Region) -> Transform {
    Transform::from_row(
        bounds.width as f32,
        0.0,
        0.0,
        bounds.height as f32,
        bounds.x as f32,
        bounds.y as f32,
    )
}

fn convert_stops(stops: &[GradientStop]) -> Vec<tiny_skia::GradientStop> {
    stops
        .iter()
        .map(|s| {
            tiny_skia::GradientStop::new(s.offset as f32, parse_color_or(&s.color, placeholder()))
        })
        .collect()
}
