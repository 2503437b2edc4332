//! Geometry shared by the element variants: the bounds cache, the point list
//! behind line/polyline/polygon, and the hit-testing primitives.

use serde::{Deserialize, Serialize};
use sketchkit_core::{GeometryError, Point, Region, Size};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// Point editing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Depth {
    /// End points and vertices only.
    #[default]
    Simple,
    /// Vertices plus bezier control points.
    Full,
}

/// Rule deciding which points are inside a self-intersecting outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl WindingRule {
    pub fn fill_rule(self) -> tiny_skia::FillRule {
        match self {
            WindingRule::NonZero => tiny_skia::FillRule::Winding,
            WindingRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

impl fmt::Display for WindingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindingRule::NonZero => write!(f, "nonzero"),
            WindingRule::EvenOdd => write!(f, "evenodd"),
        }
    }
}

impl FromStr for WindingRule {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nonzero" => Ok(WindingRule::NonZero),
            "evenodd" => Ok(WindingRule::EvenOdd),
            _ => Err(GeometryError::parse("winding rule", s)),
        }
    }
}

/// Lazily computed bounds of a derived-geometry element.
///
/// Every mutation of the underlying points must call [`BoundsCache::invalidate`].
#[derive(Debug, Clone, Default)]
pub struct BoundsCache(Cell<Option<Region>>);

impl BoundsCache {
    pub fn get_or_compute(&self, compute: impl FnOnce() -> Region) -> Region {
        if let Some(region) = self.0.get() {
            return region;
        }
        let region = compute();
        self.0.set(Some(region));
        region
    }

    pub fn invalidate(&self) {
        self.0.set(None);
    }

    pub fn is_cached(&self) -> bool {
        self.0.get().is_some()
    }
}

/// A non-empty list of points with cached bounds.
#[derive(Debug, Clone)]
pub struct PointList {
    points: Vec<Point>,
    bounds: BoundsCache,
}

impl PointList {
    pub fn new(points: Vec<Point>, kind: &str) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::empty(kind));
        }
        Ok(Self {
            points,
            bounds: BoundsCache::default(),
        })
    }

    /// Two-point list; never empty.
    pub fn pair(a: Point, b: Point) -> Self {
        Self {
            points: vec![a, b],
            bounds: BoundsCache::default(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Region {
        self.bounds
            .get_or_compute(|| Region::bounding(self.points.iter().copied()).unwrap_or_default())
    }

    pub fn cache(&self) -> &BoundsCache {
        &self.bounds
    }

    pub fn get(&self, index: usize) -> Result<Point, GeometryError> {
        self.points
            .get(index)
            .copied()
            .ok_or(GeometryError::InvalidPointIndex {
                index,
                count: self.points.len(),
            })
    }

    pub fn set(&mut self, index: usize, value: Point) -> Result<(), GeometryError> {
        let count = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(GeometryError::InvalidPointIndex { index, count })?;
        *slot = value;
        self.bounds.invalidate();
        Ok(())
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            *p = p.offset(dx, dy);
        }
        self.bounds.invalidate();
    }

    pub fn scale(&mut self, sx: f64, sy: f64, origin: Point) {
        for p in &mut self.points {
            *p = p.scale(sx, sy, origin);
        }
        self.bounds.invalidate();
    }

    /// Builds a tiny-skia path through the points.
    pub fn to_path(&self, close: bool) -> Option<tiny_skia::Path> {
        let mut pb = tiny_skia::PathBuilder::new();
        let (first, rest) = self.points.split_first()?;
        pb.move_to(first.x as f32, first.y as f32);
        for p in rest {
            pb.line_to(p.x as f32, p.y as f32);
        }
        if close {
            pb.close();
        }
        pb.finish()
    }
}

/// Literal location and size of a box-shaped element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxGeometry {
    pub location: Point,
    pub size: Size,
}

impl BoxGeometry {
    pub fn new(location: Point, size: Size) -> Self {
        Self { location, size }
    }

    pub fn bounds(&self) -> Region {
        Region::from_location_size(self.location, self.size)
    }

    pub fn set_bounds(&mut self, region: Region) {
        self.location = region.location();
        self.size = region.size();
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.location = self.location.offset(dx, dy);
    }

    pub fn scale(&mut self, sx: f64, sy: f64, origin: Point) {
        self.location = self.location.scale(sx, sy, origin);
        self.size = Size::new(self.size.width * sx, self.size.height * sy);
    }

    pub fn to_path(&self) -> Option<tiny_skia::Path> {
        tiny_skia::Rect::from_xywh(
            self.location.x as f32,
            self.location.y as f32,
            self.size.width as f32,
            self.size.height as f32,
        )
        .map(tiny_skia::PathBuilder::from_rect)
    }
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * abx, a.y + t * aby))
}

/// True when `p` lies within `tolerance` of the polyline through `points`.
pub fn near_polyline(p: Point, points: &[Point], closed: bool, tolerance: f64) -> bool {
    match points {
        [] => false,
        [only] => p.distance_to(only) <= tolerance,
        _ => {
            let open = points
                .windows(2)
                .any(|w| distance_to_segment(p, w[0], w[1]) <= tolerance);
            open || (closed
                && distance_to_segment(p, points[points.len() - 1], points[0]) <= tolerance)
        }
    }
}

/// Signed crossing count of the closed ring `ring` around `p`.
fn winding_number(p: Point, ring: &[Point]) -> i32 {
    let mut winding = 0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        let cross = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
        if a.y <= p.y {
            if b.y > p.y && cross > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && cross < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Number of ring edges crossed by a ray from `p` towards +x.
fn crossings(p: Point, ring: &[Point]) -> u32 {
    let mut count = 0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                count += 1;
            }
        }
    }
    count
}

/// Interior test over one or more closed rings using the given rule.
pub fn contains_point(p: Point, rings: &[Vec<Point>], rule: WindingRule) -> bool {
    let rings = rings.iter().filter(|r| r.len() >= 3);
    match rule {
        WindingRule::NonZero => rings.map(|r| winding_number(p, r)).sum::<i32>() != 0,
        WindingRule::EvenOdd => rings.map(|r| crossings(p, r)).sum::<u32>() % 2 == 1,
    }
}
