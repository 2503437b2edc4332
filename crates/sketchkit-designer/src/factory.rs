//! Element construction from document records.
//!
//! [`ElementFactory`] is an explicit registry from type name to builder.
//! Builders produce the variant geometry; the factory then applies the
//! fields every element shares (id, style, transform, flags, hooks).

use sketchkit_core::geometry::parse_point_list;
use sketchkit_core::{Error, GeometryError, ModelError, Point, Region};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

use crate::element::{
    parse_commands, Element, EventHooks, ImageShape, InteractionFlags, LineShape, PathShape,
    PolygonShape, PolylineShape, RectangleShape, Shape, SpriteShape, Style, SubModelShape,
    TextShape, WindingRule,
};
use crate::fill::Fill;
use crate::serialization::ElementRecord;
use crate::transform::TransformExpr;

/// Builds the variant geometry for one record.
pub type ShapeBuilder = Rc<dyn Fn(&ElementRecord) -> Result<Shape, Error>>;

#[derive(Clone, Default)]
pub struct ElementFactory {
    builders: HashMap<String, ShapeBuilder>,
}

impl std::fmt::Debug for ElementFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.builders.keys().collect();
        names.sort();
        f.debug_struct("ElementFactory")
            .field("types", &names)
            .finish()
    }
}

impl ElementFactory {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in element type.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register("rectangle", |r| {
            Ok(Shape::Rectangle(RectangleShape::new(r.location()?, r.size()?)))
        });
        factory.register("line", |r| {
            let points = required_points(r, "line")?;
            match points.as_slice() {
                [start, end] => Ok(Shape::Line(LineShape::new(*start, *end))),
                _ => Err(GeometryError::invalid("a line needs exactly two points").into()),
            }
        });
        factory.register("polyline", |r| {
            Ok(Shape::Polyline(PolylineShape::new(required_points(
                r, "polyline",
            )?)?))
        });
        factory.register("polygon", |r| {
            let shape = PolygonShape::new(required_points(r, "polygon")?)?;
            Ok(Shape::Polygon(shape.with_winding(winding(r)?)))
        });
        factory.register("path", |r| {
            let commands = parse_commands(r.commands.as_deref().unwrap_or_default())?;
            let shape = PathShape::new(commands)?;
            Ok(Shape::Path(shape.with_winding(winding(r)?)))
        });
        factory.register("text", |r| {
            let mut shape = TextShape::new(
                r.location()?,
                r.size()?,
                r.text.clone().unwrap_or_default(),
            );
            if let Some(family) = &r.font_family {
                shape.font_family = family.clone();
            }
            if let Some(size) = r.font_size {
                shape.font_size = size;
            }
            shape.bold = r.bold.unwrap_or(false);
            shape.italic = r.italic.unwrap_or(false);
            Ok(Shape::Text(shape))
        });
        factory.register("image", |r| {
            Ok(Shape::Image(ImageShape::new(
                r.location()?,
                r.size()?,
                required_source(r)?,
            )))
        });
        factory.register("sprite", |r| {
            let mut shape = SpriteShape::new(
                r.location()?,
                r.size()?,
                required_source(r)?,
                r.frames.unwrap_or(1),
            );
            shape.set_frame(r.frame.unwrap_or(0));
            Ok(Shape::Sprite(shape))
        });
        factory.register("model", |r| {
            Ok(Shape::SubModel(SubModelShape::new(
                r.location()?,
                r.size()?,
                required_source(r)?,
            )))
        });
        factory
    }

    /// Registers a builder; names are case-insensitive.
    pub fn register<F>(&mut self, name: &str, builder: F)
    where
        F: Fn(&ElementRecord) -> Result<Shape, Error> + 'static,
    {
        self.builders
            .insert(name.to_ascii_lowercase(), Rc::new(builder));
    }

    /// Makes `alias` build the same elements as `target`.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), ModelError> {
        let builder = self
            .builders
            .get(&target.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| ModelError::UnknownElementType {
                name: target.to_string(),
            })?;
        self.builders.insert(alias.to_ascii_lowercase(), builder);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.builders.contains_key(&name.to_ascii_lowercase())
    }

    /// Builds an element from a record. The `parent` link is left unset;
    /// resolving ids to keys is the model's job.
    pub fn create(&self, record: &ElementRecord) -> Result<Element, Error> {
        let builder = self
            .builders
            .get(&record.element_type.to_ascii_lowercase())
            .ok_or_else(|| ModelError::UnknownElementType {
                name: record.element_type.clone(),
            })?;
        let shape = builder(record)?;
        let mut element = Element::new(shape);
        apply_common(&mut element, record)?;
        debug!("Created {} element {}", element.type_name(), element.key());
        Ok(element)
    }

    /// Builds an element from `template` filling `region`.
    ///
    /// Point containers get a default outline spanning the region.
    pub fn create_in_region(
        &self,
        template: &ElementRecord,
        region: Region,
    ) -> Result<Element, Error> {
        let mut record = template.clone();
        record.location = Some(region.location().to_string());
        record.size = Some(region.size().to_string());
        let (l, t, r, b) = (region.x, region.y, region.right(), region.bottom());
        let c = region.center();
        match record.element_type.to_ascii_lowercase().as_str() {
            "line" => record.points = Some(format!("{},{} {},{}", l, t, r, b)),
            "polyline" => record.points = Some(format!("{},{} {},{} {},{}", l, b, c.x, t, r, b)),
            "polygon" => record.points = Some(format!("{},{} {},{} {},{}", c.x, t, r, b, l, b)),
            "path" => {
                record.commands = Some(format!(
                    "m {},{} l {},{} l {},{} l {},{} z",
                    l, t, r, t, r, b, l, b
                ))
            }
            _ => {}
        }
        let mut element = self.create(&record)?;
        if element.is_point_container() {
            element.set_bounds(region);
        }
        Ok(element)
    }
}

fn required_points(record: &ElementRecord, kind: &str) -> Result<Vec<Point>, GeometryError> {
    let text = record.points.as_deref().unwrap_or_default();
    let points = parse_point_list(text)?;
    if points.is_empty() {
        return Err(GeometryError::empty(kind));
    }
    Ok(points)
}

fn required_source(record: &ElementRecord) -> Result<String, ModelError> {
    record
        .source
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ModelError::InvalidRecord {
            reason: format!("{} requires a source", record.element_type),
        })
}

fn winding(record: &ElementRecord) -> Result<WindingRule, GeometryError> {
    record
        .winding_rule
        .as_deref()
        .map_or(Ok(WindingRule::default()), str::parse)
}

fn apply_common(element: &mut Element, record: &ElementRecord) -> Result<(), Error> {
    element.id = record.id.clone();

    let defaults = Style::default();
    element.style = Style {
        fill: record.fill.clone().map(Fill::from),
        stroke: record.stroke.clone(),
        stroke_width: record.stroke_width.unwrap_or(defaults.stroke_width),
        fill_scale: record.fill_scale.unwrap_or(defaults.fill_scale),
        fill_offset: Point::new(
            record.fill_offset_x.unwrap_or(0.0),
            record.fill_offset_y.unwrap_or(0.0),
        ),
    };

    element.set_transform(match record.transform.as_deref() {
        Some(text) if !text.trim().is_empty() => Some(text.parse::<TransformExpr>()?),
        _ => None,
    });

    let flags = InteractionFlags::default();
    element.flags = InteractionFlags {
        interactive: record.interactive.unwrap_or(flags.interactive),
        locked: record.locked.unwrap_or(flags.locked),
        aspect_locked: record.aspect_locked.unwrap_or(flags.aspect_locked),
        edit_points: record.edit_points.unwrap_or(flags.edit_points),
    };

    element.hooks = EventHooks {
        mouse_down: record.mouse_down.clone(),
        mouse_up: record.mouse_up.clone(),
        mouse_enter: record.mouse_enter.clone(),
        mouse_leave: record.mouse_leave.clone(),
        click: record.click.clone(),
        timer: record.timer.clone(),
    };
    Ok(())
}
