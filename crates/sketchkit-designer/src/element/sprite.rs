use sketchkit_core::{Point, Region, Size};

use super::common::BoxGeometry;
use super::ElementShape;
use crate::resources::{ResourceKind, ResourceRef};

/// A horizontal strip of equally sized frames, one of which is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteShape {
    pub geometry: BoxGeometry,
    pub source: String,
    frames: u32,
    frame: u32,
}

impl SpriteShape {
    pub fn new(location: Point, size: Size, source: impl Into<String>, frames: u32) -> Self {
        Self {
            geometry: BoxGeometry::new(location, size),
            source: source.into(),
            frames: frames.max(1),
            frame: 0,
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Shows `frame`, wrapping past the last frame.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame % self.frames;
    }

    pub fn next_frame(&mut self) {
        self.set_frame(self.frame + 1);
    }
}

impl ElementShape for SpriteShape {
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

    fn resource_keys(&self) -> Vec<ResourceRef> {
        vec![ResourceRef::new(ResourceKind::Image, &self.source)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_wraps() {
        let mut sprite = SpriteShape::new(Point::ORIGIN, Size::new(8.0, 8.0), "walk", 3);
        sprite.next_frame();
        sprite.next_frame();
        assert_eq!(sprite.frame(), 2);
        sprite.next_frame();
        assert_eq!(sprite.frame(), 0);
        sprite.set_frame(7);
        assert_eq!(sprite.frame(), 1);
    }

    #[test]
    fn test_zero_frames_clamped() {
        let sprite = SpriteShape::new(Point::ORIGIN, Size::new(8.0, 8.0), "walk", 0);
        assert_eq!(sprite.frames(), 1);
    }
}
