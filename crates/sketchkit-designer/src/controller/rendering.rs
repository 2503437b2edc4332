//! Drawing the designed model with interaction overlays.

use sketchkit_core::{Point, Region};
use sketchkit_settings::GridKind;
use tiny_skia::{Color, PathBuilder, Pixmap, Stroke, Transform};
use tracing::warn;

use super::DesignController;
use crate::color::{parse_color, with_opacity};
use crate::element::Element;
use crate::handles::HandleShape;
use crate::model::Model;
use crate::renderer::{draw_element, solid, to_rect};

/// Grids denser than this many pixels per cell are not drawn.
const MIN_GRID_PIXELS: f64 = 4.0;

/// Hairline strokes.
fn hairline() -> Stroke {
    Stroke {
        width: 0.0,
        ..Default::default()
    }
}

impl DesignController {
    /// Draws the model through the viewport, with tentative edits shown in
    /// place of the committed geometry, then the grid, selection, handles,
    /// rubber band and disabled overlays.
    pub fn render(&self, pixmap: &mut Pixmap) {
        let Some(model_rc) = &self.model else {
            return;
        };
        let Ok(model) = model_rc.try_borrow() else {
            warn!("Model busy, skipping render");
            return;
        };
        let base = self.viewport.transform();

        if let Some(background) = model.background.as_deref().and_then(parse_color) {
            if let Some(rect) = to_rect(model.bounds()) {
                pixmap.fill_rect(rect, &solid(background), base, None);
            }
        }
        self.draw_grid(pixmap, &model, base);

        for element in model.elements() {
            match self.preview(element) {
                Some(preview) => draw_element(&preview, &model, pixmap, base, Some(&self.bus)),
                None => draw_element(element, &model, pixmap, base, Some(&self.bus)),
            }
        }

        let accent = self.accent_color();
        self.draw_selection(pixmap, &model, base, accent);

        if let Some(band) = self.gesture.rubber_band() {
            if let Some(rect) = to_rect(band) {
                pixmap.fill_rect(rect, &solid(with_opacity(accent, 0.15)), base, None);
                let path = PathBuilder::from_rect(rect);
                pixmap.stroke_path(&path, &solid(accent), &hairline(), base, None);
            }
        }

        if !self.enabled {
            if let Some(overlay) = self.disabled_fill.as_deref().and_then(parse_color) {
                if let Some(rect) = to_rect(model.bounds()) {
                    pixmap.fill_rect(rect, &solid(overlay), base, None);
                }
            }
        }
    }

    /// A copy of `element` with its tentative move, resize or point edit
    /// applied, if it has one.
    fn preview(&self, element: &Element) -> Option<Element> {
        let key = element.key();
        let location = self.tentative_moves.get(&key);
        let bounds = self.tentative_bounds.get(&key);
        let point = self.tentative_point.filter(|t| t.element == key);
        if location.is_none() && bounds.is_none() && point.is_none() {
            return None;
        }
        let mut preview = element.clone();
        if let Some(location) = location {
            preview.set_location(*location);
        }
        if let Some(bounds) = bounds {
            preview.set_bounds(*bounds);
        }
        if let Some(edit) = point {
            if let Err(e) = preview.set_point_at(edit.index, edit.location, edit.depth) {
                warn!("Cannot preview point edit: {}", e);
            }
        }
        Some(preview)
    }

    fn accent_color(&self) -> Color {
        parse_color(&self.settings.editing.selection_color)
            .unwrap_or_else(|| Color::from_rgba8(30, 144, 255, 255))
    }

    fn draw_grid(&self, pixmap: &mut Pixmap, model: &Model, base: Transform) {
        let grid = &self.settings.grid;
        if grid.kind == GridKind::None
            || grid.spacing <= 0.0
            || grid.spacing * self.viewport.zoom() < MIN_GRID_PIXELS
        {
            return;
        }
        let Some(color) = parse_color(&grid.color) else {
            return;
        };
        let bounds = model.bounds();
        let columns = (bounds.width / grid.spacing).floor() as usize;
        let rows = (bounds.height / grid.spacing).floor() as usize;
        let mut pb = PathBuilder::new();
        match grid.kind {
            GridKind::Lines => {
                for i in 0..=columns {
                    let x = (bounds.x + i as f64 * grid.spacing) as f32;
                    pb.move_to(x, bounds.y as f32);
                    pb.line_to(x, bounds.bottom() as f32);
                }
                for j in 0..=rows {
                    let y = (bounds.y + j as f64 * grid.spacing) as f32;
                    pb.move_to(bounds.x as f32, y);
                    pb.line_to(bounds.right() as f32, y);
                }
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(&path, &solid(color), &hairline(), base, None);
                }
            }
            GridKind::Dots => {
                let dot = self.viewport.pixels_to_model(1.5);
                for i in 0..=columns {
                    for j in 0..=rows {
                        let center = Point::new(
                            bounds.x + i as f64 * grid.spacing,
                            bounds.y + j as f64 * grid.spacing,
                        );
                        if let Some(rect) = to_rect(Region::around(center, dot)) {
                            pb.push_rect(rect);
                        }
                    }
                }
                if let Some(path) = pb.finish() {
                    pixmap.fill_path(&path, &solid(color), tiny_skia::FillRule::Winding, base, None);
                }
            }
            GridKind::None => {}
        }
    }

    fn draw_selection(&self, pixmap: &mut Pixmap, model: &Model, base: Transform, accent: Color) {
        let factory = self.handle_factory();
        let depth = self.effective_depth();
        for key in &self.selection {
            let Some(element) = model.get(*key) else {
                continue;
            };
            let preview = self.preview(element);
            let element = preview.as_ref().unwrap_or(element);
            let local = match element.render_transform() {
                Some(t) => base.pre_concat(t),
                None => base,
            };
            if let Some(rect) = to_rect(element.bounds()) {
                let outline = PathBuilder::from_rect(rect);
                pixmap.stroke_path(&outline, &solid(accent), &hairline(), local, None);
            }

            let handles = factory.handles_for(element, depth);
            let connectors = handles.connectors();
            if !connectors.is_empty() {
                let mut pb = PathBuilder::new();
                for (a, b) in connectors {
                    pb.move_to(a.x as f32, a.y as f32);
                    pb.line_to(b.x as f32, b.y as f32);
                }
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(&path, &solid(accent), &hairline(), base, None);
                }
            }
            for handle in &handles.handles {
                let path = match handle.shape {
                    HandleShape::Square => to_rect(handle.region()).map(PathBuilder::from_rect),
                    HandleShape::Circle => PathBuilder::from_circle(
                        handle.center.x as f32,
                        handle.center.y as f32,
                        (handle.size / 2.0) as f32,
                    ),
                };
                let Some(path) = path else {
                    continue;
                };
                pixmap.fill_path(
                    &path,
                    &solid(Color::WHITE),
                    tiny_skia::FillRule::Winding,
                    local,
                    None,
                );
                pixmap.stroke_path(&path, &solid(accent), &hairline(), local, None);
            }
        }
    }
}
