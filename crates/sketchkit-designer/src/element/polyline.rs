use sketchkit_core::{GeometryError, Point, Region};

use super::common::{contains_point, near_polyline, Depth, PointList, WindingRule};
use super::ElementShape;

/// An open chain of segments.
#[derive(Debug, Clone)]
pub struct PolylineShape {
    points: PointList,
}

impl PolylineShape {
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        Ok(Self {
            points: PointList::new(points, "polyline")?,
        })
    }

    pub fn points(&self) -> &[Point] {
        self.points.points()
    }
}

impl ElementShape for PolylineShape {
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

    fn hit_test(&self, p: Point, tolerance: f64, filled: bool) -> bool {
        let points = self.points.points();
        near_polyline(p, points, false, tolerance)
            || (filled && contains_point(p, &[points.to_vec()], WindingRule::NonZero))
    }

    fn is_point_container(&self) -> bool {
        true
    }

    fn point_count(&self, _depth: Depth) -> usize {
        self.points.len()
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
