use sketchkit_core::{Point, Region, Size};

use super::common::BoxGeometry;
use super::ElementShape;

/// A single run of text laid out from the top-left of its box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextShape {
    pub geometry: BoxGeometry,
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl TextShape {
    pub fn new(location: Point, size: Size, text: impl Into<String>) -> Self {
        Self {
            geometry: BoxGeometry::new(location, size),
            text: text.into(),
            font_family: "Sans".to_string(),
            font_size: 12.0,
            bold: false,
            italic: false,
        }
    }
}

impl ElementShape for TextShape {
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
        self.font_size *= sy.abs();
    }

    fn outline(&self) -> Option<tiny_skia::Path> {
        None
    }

    fn hit_test(&self, p: Point, tolerance: f64, _filled: bool) -> bool {
        self.bounds().inflate(tolerance).contains_point(p)
    }
}
