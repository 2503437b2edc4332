//! Interactive handles for a selected element.
//!
//! Box elements get eight resize handles; point containers in point-edit
//! mode get one handle per addressable point. Handle positions live in the
//! element's untransformed space and pointer positions are mapped into that
//! space before hit testing.

use smallvec::SmallVec;
use sketchkit_core::{ElementKey, Point, Region};
use tiny_skia::Transform;

use crate::element::{Depth, Element, Shape};
use crate::grid::snap;
use crate::transform::{map_point, unmap_point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeDirection {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

/// Limits applied while resizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeConstraints {
    pub min_size: f64,
    /// Width over height to preserve, captured when the gesture began.
    pub aspect: Option<f64>,
    /// Grid spacing the moving edges snap to.
    pub snap: Option<f64>,
}

impl Default for ResizeConstraints {
    fn default() -> Self {
        Self {
            min_size: sketchkit_core::constants::MIN_ELEMENT_SIZE,
            aspect: None,
            snap: None,
        }
    }
}

impl ResizeDirection {
    pub const ALL: [ResizeDirection; 8] = [
        ResizeDirection::NorthWest,
        ResizeDirection::North,
        ResizeDirection::NorthEast,
        ResizeDirection::East,
        ResizeDirection::SouthEast,
        ResizeDirection::South,
        ResizeDirection::SouthWest,
        ResizeDirection::West,
    ];

    fn moves_west(self) -> bool {
        matches!(self, Self::NorthWest | Self::West | Self::SouthWest)
    }

    fn moves_east(self) -> bool {
        matches!(self, Self::NorthEast | Self::East | Self::SouthEast)
    }

    fn moves_north(self) -> bool {
        matches!(self, Self::NorthWest | Self::North | Self::NorthEast)
    }

    fn moves_south(self) -> bool {
        matches!(self, Self::SouthWest | Self::South | Self::SouthEast)
    }

    pub fn is_corner(self) -> bool {
        (self.moves_west() || self.moves_east()) && (self.moves_north() || self.moves_south())
    }

    pub fn opposite(self) -> ResizeDirection {
        match self {
            Self::NorthWest => Self::SouthEast,
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
        }
    }

    /// Where this handle sits on `region`.
    pub fn anchor(self, region: Region) -> Point {
        let x = if self.moves_west() {
            region.x
        } else if self.moves_east() {
            region.right()
        } else {
            region.center().x
        };
        let y = if self.moves_north() {
            region.y
        } else if self.moves_south() {
            region.bottom()
        } else {
            region.center().y
        };
        Point::new(x, y)
    }

    /// Computes the region produced by dragging this handle of `original`
    /// by `(dx, dy)`.
    pub fn apply(self, original: Region, dx: f64, dy: f64, c: &ResizeConstraints) -> Region {
        let snapped = |v: f64| match c.snap {
            Some(spacing) => snap(v, spacing),
            None => v,
        };
        let min = c.min_size.max(0.0);
        let (mut left, mut top) = (original.x, original.y);
        let (mut right, mut bottom) = (original.right(), original.bottom());

        if self.moves_west() {
            left = snapped(left + dx).min(right - min);
        }
        if self.moves_east() {
            right = snapped(right + dx).max(left + min);
        }
        if self.moves_north() {
            top = snapped(top + dy).min(bottom - min);
        }
        if self.moves_south() {
            bottom = snapped(bottom + dy).max(top + min);
        }

        let region = Region::new(left, top, right - left, bottom - top);
        match c.aspect.filter(|a| a.is_finite() && *a > 0.0) {
            Some(ratio) => self.keep_aspect(original, region, ratio, min),
            None => region,
        }
    }

    fn keep_aspect(self, original: Region, region: Region, ratio: f64, min: f64) -> Region {
        let center = original.center();
        if self.is_corner() {
            let base_w = original.width.max(f64::EPSILON);
            let base_h = original.height.max(f64::EPSILON);
            let factor = (region.width / base_w)
                .max(region.height / base_h)
                .max(min / base_w)
                .max(min / base_h);
            let (w, h) = (base_w * factor, base_h * factor);
            let fixed = self.opposite().anchor(original);
            let x = if self.moves_west() { fixed.x - w } else { fixed.x };
            let y = if self.moves_north() { fixed.y - h } else { fixed.y };
            Region::new(x, y, w, h)
        } else if self.moves_north() || self.moves_south() {
            let h = region.height.max(min / ratio);
            let w = h * ratio;
            Region::new(center.x - w / 2.0, region.y, w, h)
        } else {
            let w = region.width.max(min * ratio);
            let h = w / ratio;
            Region::new(region.x, center.y - h / 2.0, w, h)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Resize(ResizeDirection),
    /// A point of a point container; `control` marks bezier control points.
    Point { index: usize, control: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleShape {
    Square,
    Circle,
}

#[derive(Debug, Clone)]
pub struct Handle {
    pub kind: HandleKind,
    /// Centre in the element's untransformed space.
    pub center: Point,
    /// Side length in model units.
    pub size: f64,
    pub shape: HandleShape,
    /// Handles a connector line is drawn to.
    pub links: SmallVec<[usize; 2]>,
}

impl Handle {
    fn new(kind: HandleKind, center: Point, size: f64, shape: HandleShape) -> Self {
        Self {
            kind,
            center,
            size,
            shape,
            links: SmallVec::new(),
        }
    }

    pub fn region(&self) -> Region {
        Region::around(self.center, self.size)
    }

    /// Tests a point already in the element's untransformed space.
    pub fn contains(&self, local: Point) -> bool {
        match self.shape {
            HandleShape::Square => self.region().contains_point(local),
            HandleShape::Circle => {
                let r = self.size / 2.0;
                self.center.squared_distance_to(&local) <= r * r
            }
        }
    }
}

/// The handles of one element, captured when it was selected or when a
/// gesture began.
#[derive(Debug, Clone)]
pub struct HandleSet {
    pub element: ElementKey,
    pub handles: Vec<Handle>,
    pub transform: Option<Transform>,
    pub depth: Depth,
    /// Element bounds the handles were laid out on.
    pub bounds: Region,
}

impl HandleSet {
    fn empty(element: &Element, depth: Depth) -> Self {
        Self {
            element: element.key(),
            handles: Vec::new(),
            transform: element.render_transform(),
            depth,
            bounds: element.bounds(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn get(&self, index: usize) -> Option<&Handle> {
        self.handles.get(index)
    }

    /// Maps a model point into the space the handles live in.
    pub fn to_local(&self, p: Point) -> Option<Point> {
        match &self.transform {
            Some(t) => unmap_point(t, p),
            None => Some(p),
        }
    }

    pub fn to_model(&self, p: Point) -> Point {
        match &self.transform {
            Some(t) => map_point(t, p),
            None => p,
        }
    }

    /// Index of the topmost handle under the model point `p`.
    pub fn hit_test(&self, p: Point) -> Option<usize> {
        let local = self.to_local(p)?;
        self.handles.iter().rposition(|h| h.contains(local))
    }

    /// Connector lines between linked handles, in model space.
    pub fn connectors(&self) -> Vec<(Point, Point)> {
        self.handles
            .iter()
            .flat_map(|h| {
                h.links
                    .iter()
                    .filter_map(|&j| self.handles.get(j))
                    .map(move |other| (h.center, other.center))
            })
            .map(|(a, b)| (self.to_model(a), self.to_model(b)))
            .collect()
    }
}

/// Lays out handles for elements.
#[derive(Debug, Clone, Copy)]
pub struct HandleFactory {
    /// Side length in model units.
    pub handle_size: f64,
}

impl HandleFactory {
    pub fn new(handle_size: f64) -> Self {
        Self { handle_size }
    }

    /// Builds the handles for `element`. Point handles win when the element
    /// shows them, box handles need a resizable element, and anything else
    /// gets an empty set.
    pub fn handles_for(&self, element: &Element, depth: Depth) -> HandleSet {
        if element.shows_point_handles() {
            self.point_handles(element, depth)
        } else if element.can_resize() {
            self.box_handles(element)
        } else {
            HandleSet::empty(element, depth)
        }
    }

    fn box_handles(&self, element: &Element) -> HandleSet {
        let mut set = HandleSet::empty(element, Depth::Simple);
        set.handles = ResizeDirection::ALL
            .iter()
            .map(|&dir| {
                Handle::new(
                    HandleKind::Resize(dir),
                    dir.anchor(set.bounds),
                    self.handle_size,
                    HandleShape::Square,
                )
            })
            .collect();
        // NW-SE and NE-SW diagonals
        set.handles[0].links.push(4);
        set.handles[2].links.push(6);
        set
    }

    fn point_handles(&self, element: &Element, depth: Depth) -> HandleSet {
        let mut set = HandleSet::empty(element, depth);
        let (slots, links): (Vec<(Point, bool)>, Vec<(usize, usize)>) = match element.shape() {
            Shape::Path(path) => path.slots(depth),
            _ => {
                let points: Vec<(Point, bool)> = (0..element.point_count(depth))
                    .filter_map(|i| element.point_at(i, depth).ok())
                    .map(|p| (p, false))
                    .collect();
                let mut links: Vec<(usize, usize)> =
                    (1..points.len()).map(|i| (i - 1, i)).collect();
                if matches!(element.shape(), Shape::Polygon(_)) && points.len() > 2 {
                    links.push((points.len() - 1, 0));
                }
                (points, links)
            }
        };
        set.handles = slots
            .into_iter()
            .enumerate()
            .map(|(index, (p, control))| {
                let shape = if control {
                    HandleShape::Circle
                } else {
                    HandleShape::Square
                };
                Handle::new(HandleKind::Point { index, control }, p, self.handle_size, shape)
            })
            .collect();
        for (a, b) in links {
            if let Some(handle) = set.handles.get_mut(a) {
                handle.links.push(b);
            }
        }
        set
    }
}

impl Default for HandleFactory {
    fn default() -> Self {
        Self::new(sketchkit_core::constants::DEFAULT_HANDLE_SIZE)
    }
}
