//! Elements: the drawable nodes of a model.
//!
//! An [`Element`] pairs a [`Shape`] (the variant-specific geometry) with the
//! state every element carries: identity, style, transform, interaction
//! flags, event hooks and the runtime stacks used by the command router.
//!
//! Box elements (rectangle, text, image, sprite, sub-model) store a literal
//! location and size. Point containers (line, polyline, polygon, path) derive
//! their bounds from their points and cache the result until the next edit.

use sketchkit_core::constants::HIT_TOLERANCE;
use sketchkit_core::{ElementKey, GeometryError, ModelId, Point, Region, Size};

mod common;
mod image;
mod line;
mod path;
mod polygon;
mod polyline;
mod rectangle;
mod sprite;
mod sub_model;
mod text;

pub use common::{
    contains_point, distance_to_segment, near_polyline, BoundsCache, BoxGeometry, Depth,
    PointList, WindingRule,
};
pub use image::ImageShape;
pub use line::LineShape;
pub use path::{format_commands, parse_commands, PathCommand, PathShape};
pub use polygon::PolygonShape;
pub use polyline::PolylineShape;
pub use rectangle::RectangleShape;
pub use sprite::SpriteShape;
pub use sub_model::SubModelShape;
pub use text::TextShape;

use crate::fill::Fill;
use crate::resources::{ResourceManager, ResourceRef};
use crate::transform::{map_point, unmap_point, TransformExpr};

/// Geometry contract implemented by every element variant.
///
/// Coordinates are model coordinates before the element's own transform.
pub trait ElementShape {
    fn bounds(&self) -> Region;

    /// Moves and stretches the geometry so its bounds become `region`.
    fn set_bounds(&mut self, region: Region) {
        let current = self.bounds();
        let sx = if current.width > 0.0 {
            region.width / current.width
        } else {
            1.0
        };
        let sy = if current.height > 0.0 {
            region.height / current.height
        } else {
            1.0
        };
        self.scale(sx, sy, current.location());
        self.translate(region.x - current.x, region.y - current.y);
    }

    fn translate(&mut self, dx: f64, dy: f64);

    fn scale(&mut self, sx: f64, sy: f64, origin: Point);

    /// Outline used for fill and stroke, if the variant has one.
    fn outline(&self) -> Option<tiny_skia::Path>;

    fn hit_test(&self, p: Point, tolerance: f64, filled: bool) -> bool;

    fn can_resize(&self) -> bool {
        true
    }

    fn is_point_container(&self) -> bool {
        false
    }

    fn point_count(&self, _depth: Depth) -> usize {
        0
    }

    fn point_at(&self, index: usize, _depth: Depth) -> Result<Point, GeometryError> {
        Err(GeometryError::InvalidPointIndex { index, count: 0 })
    }

    fn set_point_at(
        &mut self,
        index: usize,
        _value: Point,
        _depth: Depth,
    ) -> Result<(), GeometryError> {
        Err(GeometryError::InvalidPointIndex { index, count: 0 })
    }

    fn winding(&self) -> WindingRule {
        WindingRule::NonZero
    }

    fn invalidate_bounds(&self) {}

    fn resource_keys(&self) -> Vec<ResourceRef> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub enum Shape {
    Rectangle(RectangleShape),
    Line(LineShape),
    Polyline(PolylineShape),
    Polygon(PolygonShape),
    Path(PathShape),
    Text(TextShape),
    Image(ImageShape),
    Sprite(SpriteShape),
    SubModel(SubModelShape),
}

impl Shape {
    /// The `type` discriminator used in model documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rectangle",
            Shape::Line(_) => "line",
            Shape::Polyline(_) => "polyline",
            Shape::Polygon(_) => "polygon",
            Shape::Path(_) => "path",
            Shape::Text(_) => "text",
            Shape::Image(_) => "image",
            Shape::Sprite(_) => "sprite",
            Shape::SubModel(_) => "model",
        }
    }

    pub fn as_dyn(&self) -> &dyn ElementShape {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Line(s) => s,
            Shape::Polyline(s) => s,
            Shape::Polygon(s) => s,
            Shape::Path(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
            Shape::Sprite(s) => s,
            Shape::SubModel(s) => s,
        }
    }

    pub fn as_dyn_mut(&mut self) -> &mut dyn ElementShape {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Line(s) => s,
            Shape::Polyline(s) => s,
            Shape::Polygon(s) => s,
            Shape::Path(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
            Shape::Sprite(s) => s,
            Shape::SubModel(s) => s,
        }
    }
}

/// Paint and placement of fill and stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Option<Fill>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    /// Scale applied to tiled pattern fills.
    pub fill_scale: f64,
    /// Offset of tiled pattern fills from the element's top-left.
    pub fill_offset: Point,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            fill_scale: 1.0,
            fill_offset: Point::ORIGIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionFlags {
    /// Receives pointer hooks.
    pub interactive: bool,
    /// Cannot be moved, resized, nudged or point-edited.
    pub locked: bool,
    /// Resizes keep the aspect ratio.
    pub aspect_locked: bool,
    /// Shows point handles instead of box handles.
    pub edit_points: bool,
}

impl Default for InteractionFlags {
    fn default() -> Self {
        Self {
            interactive: true,
            locked: false,
            aspect_locked: false,
            edit_points: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    MouseDown,
    MouseUp,
    MouseEnter,
    MouseLeave,
    Click,
    Timer,
}

/// Command strings run when the matching event reaches the element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventHooks {
    pub mouse_down: Option<String>,
    pub mouse_up: Option<String>,
    pub mouse_enter: Option<String>,
    pub mouse_leave: Option<String>,
    pub click: Option<String>,
    pub timer: Option<String>,
}

impl EventHooks {
    pub fn get(&self, hook: Hook) -> Option<&str> {
        match hook {
            Hook::MouseDown => self.mouse_down.as_deref(),
            Hook::MouseUp => self.mouse_up.as_deref(),
            Hook::MouseEnter => self.mouse_enter.as_deref(),
            Hook::MouseLeave => self.mouse_leave.as_deref(),
            Hook::Click => self.click.as_deref(),
            Hook::Timer => self.timer.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    key: ElementKey,
    pub id: Option<String>,
    shape: Shape,
    pub style: Style,
    transform: Option<TransformExpr>,
    pub flags: InteractionFlags,
    pub hooks: EventHooks,
    pub fill_stack: Vec<Option<Fill>>,
    pub stroke_stack: Vec<Option<String>>,
    pub frame_stack: Vec<u32>,
    owner: Option<ModelId>,
    parent: Option<ElementKey>,
}

impl Element {
    pub fn new(shape: Shape) -> Self {
        Self {
            key: ElementKey::new(),
            id: None,
            shape,
            style: Style::default(),
            transform: None,
            flags: InteractionFlags::default(),
            hooks: EventHooks::default(),
            fill_stack: Vec::new(),
            stroke_stack: Vec::new(),
            frame_stack: Vec::new(),
            owner: None,
            parent: None,
        }
    }

    pub fn with_fill(mut self, fill: impl Into<Fill>) -> Self {
        self.style.fill = Some(fill.into());
        self
    }

    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.style.stroke = Some(stroke.into());
        self
    }

    pub fn key(&self) -> ElementKey {
        self.key
    }

    pub fn type_name(&self) -> &'static str {
        self.shape.type_name()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    pub fn owner(&self) -> Option<ModelId> {
        self.owner
    }

    pub(crate) fn attach(&mut self, owner: ModelId) {
        self.owner = Some(owner);
    }

    pub(crate) fn detach(&mut self) {
        self.owner = None;
    }

    pub fn parent(&self) -> Option<ElementKey> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<ElementKey>) {
        self.parent = parent;
    }

    pub fn transform(&self) -> Option<&TransformExpr> {
        self.transform.as_ref()
    }

    pub fn set_transform(&mut self, transform: Option<TransformExpr>) {
        self.transform = transform;
    }

    // Geometry

    pub fn bounds(&self) -> Region {
        self.shape.as_dyn().bounds()
    }

    pub fn location(&self) -> Point {
        self.bounds().location()
    }

    pub fn size(&self) -> Size {
        self.bounds().size()
    }

    pub fn set_location(&mut self, location: Point) {
        let current = self.location();
        self.translate(location.x - current.x, location.y - current.y);
    }

    pub fn set_size(&mut self, size: Size) {
        let location = self.location();
        self.set_bounds(Region::from_location_size(location, size));
    }

    pub fn set_bounds(&mut self, region: Region) {
        self.shape.as_dyn_mut().set_bounds(region);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.shape.as_dyn_mut().translate(dx, dy);
    }

    /// Scales the element about `origin`, x by `sx` and y by `sy`.
    pub fn scale(&mut self, sx: f64, sy: f64, origin: Point) {
        self.shape.as_dyn_mut().scale(sx, sy, origin);
    }

    /// Drops cached derived bounds so the next query recomputes them.
    pub fn invalidate_bounds(&self) {
        self.shape.as_dyn().invalidate_bounds();
    }

    /// The element's transform about its centre, if it has a non-identity one.
    pub fn render_transform(&self) -> Option<tiny_skia::Transform> {
        self.transform
            .as_ref()
            .filter(|t| !t.is_identity())
            .map(|t| t.about(self.bounds().center()))
    }

    /// Maps a model point into the element's untransformed space.
    pub fn to_local(&self, p: Point) -> Option<Point> {
        match self.render_transform() {
            Some(t) => unmap_point(&t, p),
            None => Some(p),
        }
    }

    /// Maps a point in the element's untransformed space to model space.
    pub fn to_model(&self, p: Point) -> Point {
        match self.render_transform() {
            Some(t) => map_point(&t, p),
            None => p,
        }
    }

    /// Bounds after the element transform, as an axis-aligned box.
    pub fn transformed_bounds(&self) -> Region {
        let b = self.bounds();
        if self.render_transform().is_none() {
            return b;
        }
        let corners = [
            Point::new(b.x, b.y),
            Point::new(b.right(), b.y),
            Point::new(b.right(), b.bottom()),
            Point::new(b.x, b.bottom()),
        ];
        Region::bounding(corners.into_iter().map(|c| self.to_model(c))).unwrap_or(b)
    }

    pub fn outline(&self) -> Option<tiny_skia::Path> {
        self.shape.as_dyn().outline()
    }

    pub fn winding(&self) -> WindingRule {
        self.shape.as_dyn().winding()
    }

    /// Hit test using the element's own fill to decide interior hits.
    pub fn hit_test(&self, p: Point) -> bool {
        self.hit_test_with(p, self.style.fill.is_some())
    }

    /// Hit test in model space, mapping through the element transform.
    pub fn hit_test_with(&self, p: Point, filled: bool) -> bool {
        let Some(local) = self.to_local(p) else {
            return false;
        };
        let tolerance = HIT_TOLERANCE.max(self.style.stroke_width / 2.0);
        self.shape.as_dyn().hit_test(local, tolerance, filled)
    }

    // Capabilities

    pub fn can_move(&self) -> bool {
        !self.flags.locked
    }

    pub fn can_resize(&self) -> bool {
        !self.flags.locked && self.shape.as_dyn().can_resize()
    }

    pub fn can_nudge(&self) -> bool {
        !self.flags.locked
    }

    pub fn can_edit_points(&self) -> bool {
        !self.flags.locked && self.shape.as_dyn().is_point_container()
    }

    pub fn can_move_point(&self, index: usize, depth: Depth) -> bool {
        self.can_edit_points() && index < self.point_count(depth)
    }

    /// Whether handles should address points instead of the box.
    pub fn shows_point_handles(&self) -> bool {
        self.can_edit_points() && (self.flags.edit_points || !self.shape.as_dyn().can_resize())
    }

    // Points

    pub fn is_point_container(&self) -> bool {
        self.shape.as_dyn().is_point_container()
    }

    pub fn point_count(&self, depth: Depth) -> usize {
        self.shape.as_dyn().point_count(depth)
    }

    pub fn point_at(&self, index: usize, depth: Depth) -> Result<Point, GeometryError> {
        self.shape.as_dyn().point_at(index, depth)
    }

    pub fn set_point_at(
        &mut self,
        index: usize,
        value: Point,
        depth: Depth,
    ) -> Result<(), GeometryError> {
        self.shape.as_dyn_mut().set_point_at(index, value, depth)
    }

    // Sprites

    pub fn sprite_frame(&self) -> Option<u32> {
        match &self.shape {
            Shape::Sprite(s) => Some(s.frame()),
            _ => None,
        }
    }

    /// Sets the sprite frame; false for non-sprite elements.
    pub fn set_sprite_frame(&mut self, frame: u32) -> bool {
        match &mut self.shape {
            Shape::Sprite(s) => {
                s.set_frame(frame);
                true
            }
            _ => false,
        }
    }

    // Resources

    /// Keys of every resource this element draws from.
    pub fn resource_keys(&self) -> Vec<ResourceRef> {
        let mut keys = self.shape.as_dyn().resource_keys();
        if let Some(reference) = self.style.fill.as_ref().and_then(Fill::resource_ref) {
            if !keys.contains(&reference) {
                keys.push(reference);
            }
        }
        keys
    }

    /// Declares this element's resources so they are loaded before drawing.
    pub fn register_resources(&self, resources: &mut ResourceManager) {
        for reference in self.resource_keys() {
            resources.register_key(reference);
        }
    }

    /// A copy with a fresh key, detached from any model.
    pub fn duplicate(&self) -> Element {
        let mut copy = self.clone();
        copy.key = ElementKey::new();
        copy.id = None;
        copy.owner = None;
        copy.fill_stack.clear();
        copy.stroke_stack.clear();
        copy.frame_stack.clear();
        copy
    }
}
