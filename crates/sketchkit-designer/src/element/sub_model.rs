use sketchkit_core::{Point, Region, Size};

use super::common::BoxGeometry;
use super::ElementShape;
use crate::resources::{ResourceKind, ResourceRef};

/// Embeds another model, scaled into the element box.
#[derive(Debug, Clone, PartialEq)]
pub struct SubModelShape {
    pub geometry: BoxGeometry,
    pub source: String,
}

impl SubModelShape {
    pub fn new(location: Point, size: Size, source: impl Into<String>) -> Self {
        Self {
            geometry: BoxGeometry::new(location, size),
            source: source.into(),
        }
    }
}

impl ElementShape for SubModelShape {
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
        vec![ResourceRef::new(ResourceKind::Model, &self.source)]
    }
}
