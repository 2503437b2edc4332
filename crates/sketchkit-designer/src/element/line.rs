use sketchkit_core::{GeometryError, Point, Region};

use super::common::{near_polyline, Depth, PointList};
use super::ElementShape;

/// A straight segment. It is edited through its two end points rather than
/// box handles.
#[derive(Debug, Clone)]
pub struct LineShape {
    points: PointList,
}

impl LineShape {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            points: PointList::pair(start, end),
        }
    }

    pub fn start(&self) -> Point {
        self.points.points()[0]
    }

    pub fn end(&self) -> Point {
        self.points.points()[1]
    }

    pub fn points(&self) -> &[Point] {
        self.points.points()
    }
}

impl ElementShape for LineShape {
    fn bounds(&self) -> Region {
        self.points.bounds()
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.points.translate(dx, dy);
    }

    fn scale(&mut self, sx: f64, sy: f64, origin: Point) {
        self.points.scale(sx, sy, origin);
    }

    fn outline(&self) -> Option<tiny_skia::Path> {
        self.points.to_path(false)
    }

    fn hit_test(&self, p: Point, tolerance: f64, _filled: bool) -> bool {
        near_polyline(p, self.points.points(), false, tolerance)
    }

    fn can_resize(&self) -> bool {
        false
    }

    fn is_point_container(&self) -> bool {
        true
    }

    fn point_count(&self, _depth: Depth) -> usize {
        2
    }

    fn point_at(&self, index: usize, _depth: Depth) -> Result<Point, GeometryError> {
        self.points.get(index)
    }

    fn set_point_at(
        &mut self,
        index: usize,
        value: Point,
        _depth: Depth,
    ) -> Result<(), GeometryError> {
        self.points.set(index, value)
    }

    fn invalidate_bounds(&self) {
        self.points.cache().invalidate();
    }
}
