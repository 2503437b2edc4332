//! Raster rendering of models with tiny-skia.
//!
//! Elements draw bottom to top: fill (own or inherited), then content
//! (bitmap, sprite frame, sub-model or text), then stroke. Resources that
//! are not available draw as the magenta placeholder.

use image::RgbaImage;
use rusttype::{point as rt_point, Scale};
use sketchkit_core::constants::MAX_MODEL_NESTING;
use sketchkit_core::{EventBus, Region};
use tiny_skia::{
    Color, FilterQuality, Paint, Pattern, Pixmap, PremultipliedColorU8, Rect, Shader, SpreadMode,
    Stroke, Transform,
};
use tracing::{debug, warn};

use crate::color::{parse_color, placeholder};
use crate::element::{Element, Shape, TextShape};
use crate::fill::{fill_for_element, Fill, FillResolver};
use crate::font_manager;
use crate::model::Model;
use crate::transform::map_point;
use crate::viewport::Viewport;

/// Renders a model at 1:1 into a pixmap of the model's size.
pub fn render_model(model: &Model, diagnostics: Option<&EventBus>) -> Option<Pixmap> {
    let size = model.size();
    let mut pixmap = Pixmap::new(
        size.width.ceil().max(1.0) as u32,
        size.height.ceil().max(1.0) as u32,
    )?;
    draw_model(model, &mut pixmap, Transform::identity(), diagnostics);
    Some(pixmap)
}

/// Renders a model scaled to fit a `width` x `height` pixmap.
pub fn render_to_size(
    model: &Model,
    width: u32,
    height: u32,
    diagnostics: Option<&EventBus>,
) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    let mut viewport = Viewport::new(width as f64, height as f64);
    viewport.fit_to_bounds(model.bounds(), 0.0);
    draw_model(model, &mut pixmap, viewport.transform(), diagnostics);
    Some(pixmap)
}

/// Draws the background and every element under `base`.
pub fn draw_model(
    model: &Model,
    pixmap: &mut Pixmap,
    base: Transform,
    diagnostics: Option<&EventBus>,
) {
    draw_model_at(model, pixmap, base, diagnostics, 0);
}

fn draw_model_at(
    model: &Model,
    pixmap: &mut Pixmap,
    base: Transform,
    diagnostics: Option<&EventBus>,
    depth: usize,
) {
    if let Some(background) = model.background.as_deref().and_then(parse_color) {
        if let Some(rect) = to_rect(model.bounds()) {
            pixmap.fill_rect(rect, &solid(background), base, None);
        }
    }
    for element in model.elements() {
        draw_element_at(element, model, pixmap, base, diagnostics, depth);
    }
}

/// Draws one element of `model` under `base`.
pub fn draw_element(
    element: &Element,
    model: &Model,
    pixmap: &mut Pixmap,
    base: Transform,
    diagnostics: Option<&EventBus>,
) {
    draw_element_at(element, model, pixmap, base, diagnostics, 0);
}

fn draw_element_at(
    element: &Element,
    model: &Model,
    pixmap: &mut Pixmap,
    base: Transform,
    diagnostics: Option<&EventBus>,
    depth: usize,
) {
    let transform = match element.render_transform() {
        Some(t) => base.pre_concat(t),
        None => base,
    };
    let bounds = element.bounds();
    let mut resolver = FillResolver::new(model.resources());
    if let Some(bus) = diagnostics {
        resolver = resolver.with_diagnostics(bus);
    }
    let outline = element.outline();
    let fill = fill_for_element(element, model);

    if let (Some(path), Some(fill)) = (&outline, fill) {
        if let Some(source) = resolver.resolve(fill, bounds, &element.style) {
            pixmap.fill_path(
                path,
                &source.paint(),
                element.winding().fill_rule(),
                transform,
                None,
            );
        }
    }

    match element.shape() {
        Shape::Image(s) => draw_frame(pixmap, &resolver, &s.source, bounds, (0, 1), transform),
        Shape::Sprite(s) => draw_frame(
            pixmap,
            &resolver,
            &s.source,
            bounds,
            (s.frame(), s.frames()),
            transform,
        ),
        Shape::SubModel(s) => match model.resources().model(&s.source) {
            Some(sub) if depth < MAX_MODEL_NESTING => {
                let sub = sub.borrow();
                let size = sub.size();
                if !size.is_empty() {
                    let t = transform
                        .pre_translate(bounds.x as f32, bounds.y as f32)
                        .pre_scale(
                            (bounds.width / size.width) as f32,
                            (bounds.height / size.height) as f32,
                        );
                    draw_model_at(&sub, pixmap, t, diagnostics, depth + 1);
                }
            }
            Some(_) => warn!("Sub-model '{}' nested too deeply, skipped", s.source),
            None => draw_missing(pixmap, &resolver, &s.source, bounds, transform),
        },
        Shape::Text(s) => {
            let color = match fill {
                Some(Fill::Solid(c)) => parse_color(c),
                Some(_) => None,
                None => Some(Color::BLACK),
            };
            if let Some(color) = color {
                draw_text(pixmap, s, color, transform);
            }
        }
        _ => {}
    }

    if let (Some(path), Some(stroke)) = (&outline, element.style.stroke.as_deref()) {
        if let Some(color) = stroke_color(stroke) {
            let stroke = Stroke {
                width: element.style.stroke_width.max(0.0) as f32,
                ..Default::default()
            };
            pixmap.stroke_path(path, &solid(color), &stroke, transform, None);
        }
    }
}

fn stroke_color(stroke: &str) -> Option<Color> {
    let color = parse_color(stroke);
    if color.is_none() && !stroke.trim().eq_ignore_ascii_case("none") {
        warn!("Unparsable stroke colour '{}'", stroke);
    }
    color
}

pub(crate) fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

pub(crate) fn to_rect(region: Region) -> Option<Rect> {
    Rect::from_xywh(
        region.x as f32,
        region.y as f32,
        region.width as f32,
        region.height as f32,
    )
}

/// Draws frame `frame` of a horizontal strip of `frames` over `bounds`.
fn draw_frame(
    pixmap: &mut Pixmap,
    resolver: &FillResolver<'_>,
    key: &str,
    bounds: Region,
    (frame, frames): (u32, u32),
    transform: Transform,
) {
    let Some(rect) = to_rect(bounds) else {
        return;
    };
    let Some(image) = resolver.resources().image(key) else {
        draw_missing(pixmap, resolver, key, bounds, transform);
        return;
    };
    let frame_width = image.width() as f32 / frames.max(1) as f32;
    let pattern_transform = Transform::from_translate(rect.x(), rect.y())
        .pre_scale(
            rect.width() / frame_width,
            rect.height() / image.height() as f32,
        )
        .pre_translate(-(frame as f32) * frame_width, 0.0);
    let paint = Paint {
        shader: Pattern::new(
            image.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            pattern_transform,
        ),
        anti_alias: true,
        ..Paint::default()
    };
    pixmap.fill_rect(rect, &paint, transform, None);
}

fn draw_missing(
    pixmap: &mut Pixmap,
    resolver: &FillResolver<'_>,
    key: &str,
    bounds: Region,
    transform: Transform,
) {
    resolver.report_missing(key);
    if let Some(rect) = to_rect(bounds) {
        let paint = Paint {
            shader: Shader::SolidColor(placeholder()),
            ..Paint::default()
        };
        pixmap.fill_rect(rect, &paint, transform, None);
    }
}

fn draw_text(pixmap: &mut Pixmap, text: &TextShape, color: Color, transform: Transform) {
    let Some(font) = font_manager::get_font_for(&text.font_family, text.bold, text.italic) else {
        debug!("Skipping text '{}': no font available", text.text);
        return;
    };
    let zoom = (transform.sx * transform.sx + transform.ky * transform.ky).sqrt();
    let scale = Scale::uniform(text.font_size as f32 * zoom);
    let v_metrics = font.v_metrics(scale);
    let line_height = v_metrics.ascent - v_metrics.descent + v_metrics.line_gap;
    let origin = map_point(&transform, text.geometry.location);

    let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
    let src = color.premultiply().to_color_u8();
    let data = pixmap.data_mut();

    for (line_index, line) in text.text.lines().enumerate() {
        let start = rt_point(
            origin.x as f32,
            origin.y as f32 + v_metrics.ascent + line_height * line_index as f32,
        );
        for glyph in font.layout(line, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let idx = ((py * width + px) * 4) as usize;
                blend(&mut data[idx..idx + 4], src, coverage);
            });
        }
    }
}

/// Source-over blend of a premultiplied colour at partial coverage.
fn blend(dst: &mut [u8], src: PremultipliedColorU8, coverage: f32) {
    let inverse = 1.0 - src.alpha() as f32 * coverage / 255.0;
    let channels = [src.red(), src.green(), src.blue(), src.alpha()];
    for (d, s) in dst.iter_mut().zip(channels) {
        let value = s as f32 * coverage + *d as f32 * inverse;
        *d = value.round().clamp(0.0, 255.0) as u8;
    }
}

/// Converts a premultiplied pixmap to a straight-alpha image.
pub fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let pixels = pixmap.pixels();
    RgbaImage::from_fn(width, pixmap.height(), |x, y| {
        let c = pixels[(y * width + x) as usize].demultiply();
        image::Rgba([c.red(), c.green(), c.blue(), c.alpha()])
    })
}
