use sketchkit_core::{GeometryError, Point, Region};

use super::common::{contains_point, near_polyline, Depth, PointList, WindingRule};
use super::ElementShape;

/// A closed outline; the last point connects back to the first.
#[derive(Debug, Clone)]
pub struct PolygonShape {
    points: PointList,
    pub winding: WindingRule,
}

impl PolygonShape {
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        Ok(Self {
            points: PointList::new(points, "polygon")?,
            winding: WindingRule::default(),
        })
    }

    pub fn with_winding(mut self, winding: WindingRule) -> Self {
        self.winding = winding;
        self
    }

    pub fn points(&self) -> &[Point] {
        self.points.points()
    }

    pub fn is_bounds_cached(&self) -> bool {
        self.points.cache().is_cached()
    }
}

impl ElementShape for PolygonShape {
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
        self.points.to_path(true)
    }

    fn hit_test(&self, p: Point, tolerance: f64, filled: bool) -> bool {
        let points = self.points.points();
        (filled && contains_point(p, &[points.to_vec()], self.winding))
            || near_polyline(p, points, true, tolerance)
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

    fn winding(&self) -> WindingRule {
        self.winding
    }

    fn invalidate_bounds(&self) {
        self.points.cache().invalidate();
    }
}
