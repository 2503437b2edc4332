use sketchkit_core::{Point, Region, Size};

use super::common::BoxGeometry;
use super::ElementShape;

#[derive(Debug, Clone, PartialEq)]
pub struct RectangleShape {
    pub geometry: BoxGeometry,
}

impl RectangleShape {
    pub fn new(location: Point, size: Size) -> Self {
        Self {
            geometry: BoxGeometry::new(location, size),
        }
    }
}

impl ElementShape for RectangleShape {
    fn bounds(&self) -> Region {
        self.geometry.bounds()
    }

    fn set_bounds(&mut self, region: Region) {
        self.geometry.set_bounds(region);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.geometry.translate(dx, dy);
    }

    fn scale(&mut self, sx: f64, sy: f64, origin: Point) {
        self.geometry.scale(sx, sy, origin);
    }

    fn outline(&self) -> Option<tiny_skia::Path> {
        self.geometry.to_path()
    }

    fn hit_test(&self, p: Point, tolerance: f64, _filled: bool) -> bool {
        self.bounds().inflate(tolerance).contains_point(p)
    }
}
