//! Mapping between host pixels and model coordinates.
//!
//! Both spaces are y-down with the origin at the top-left:
//!
//! ```text
//! pixel = model * zoom + pan
//! model = (pixel - pan) / zoom
//! ```

use sketchkit_core::{Point, Region};
use std::fmt;
use tiny_skia::Transform;

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    canvas_width: f64,
    canvas_height: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            canvas_width,
            canvas_height,
        }
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Sets the host surface size, typically after a resize.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    /// Current zoom level (1.0 = one model unit per pixel).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level; values outside 0.1..50 are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > MIN_ZOOM && zoom < MAX_ZOOM {
            self.zoom = zoom;
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * 1.2);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / 1.2);
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    pub fn pixel_to_model(&self, pixel: Point) -> Point {
        Point::new(
            (pixel.x - self.pan_x) / self.zoom,
            (pixel.y - self.pan_y) / self.zoom,
        )
    }

    pub fn model_to_pixel(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }

    /// Converts a pixel distance to model units.
    pub fn pixels_to_model(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// The model to pixel transform used when rendering.
    pub fn transform(&self) -> Transform {
        Transform::from_row(
            self.zoom as f32,
            0.0,
            0.0,
            self.zoom as f32,
            self.pan_x as f32,
            self.pan_y as f32,
        )
    }

    /// Fits `bounds` into the canvas, leaving `padding` (a fraction of the
    /// canvas) on each side, and centres it.
    pub fn fit_to_bounds(&mut self, bounds: Region, padding: f64) {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return;
        }
        let padding_factor = 1.0 - (padding * 2.0);
        let zoom_x = (self.canvas_width * padding_factor) / bounds.width;
        let zoom_y = (self.canvas_height * padding_factor) / bounds.height;
        let zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);

        self.zoom = zoom;
        self.pan_x = (self.canvas_width - bounds.width * zoom) / 2.0 - bounds.x * zoom;
        self.pan_y = (self.canvas_height - bounds.height * zoom) / 2.0 - bounds.y * zoom;
    }

    /// Zooms keeping `anchor` (model coordinates) at the same pixel.
    pub fn zoom_to_point(&mut self, anchor: Point, zoom: f64) {
        if zoom <= MIN_ZOOM || zoom >= MAX_ZOOM {
            return;
        }
        let pixel = self.model_to_pixel(anchor);
        self.zoom = zoom;
        self.pan_x = pixel.x - anchor.x * zoom;
        self.pan_y = pixel.y - anchor.y * zoom;
    }

    pub fn center_on(&mut self, p: Point) {
        self.pan_x = self.canvas_width / 2.0 - p.x * self.zoom;
        self.pan_y = self.canvas_height / 2.0 - p.y * self.zoom;
    }

    /// Back to 1:1 with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1}, {:.1})",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut vp = Viewport::new(400.0, 300.0);
        vp.set_zoom(2.0);
        vp.set_pan(10.0, -5.0);
        let p = Point::new(12.5, 40.0);
        let back = vp.pixel_to_model(vp.model_to_pixel(p));
        assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_bounds_centres() {
        let mut vp = Viewport::new(200.0, 100.0);
        vp.fit_to_bounds(Region::new(0.0, 0.0, 50.0, 50.0), 0.0);
        assert_eq!(vp.zoom(), 2.0);
        assert_eq!(vp.model_to_pixel(Point::new(25.0, 25.0)), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_zoom_to_point_keeps_anchor() {
        let mut vp = Viewport::new(200.0, 200.0);
        let anchor = Point::new(30.0, 40.0);
        let before = vp.model_to_pixel(anchor);
        vp.zoom_to_point(anchor, 3.0);
        assert_eq!(vp.model_to_pixel(anchor), before);
    }
}
