//! CSS colour strings to raster colours.
//!
//! Accepts anything the `color` crate parses (`"#ff0000"`, `"rgb(255 0 0)"`,
//! `"red"`). Names are matched case-insensitively so `"Red"` works too.

use color::{DynamicColor, Srgb};
use std::str::FromStr;
use tiny_skia::Color;

/// Colour drawn where a fill references a resource that is not available.
pub fn placeholder() -> Color {
    Color::from_rgba8(255, 0, 255, 255)
}

/// Parses a CSS colour string into a raster colour.
pub fn parse_color(input: &str) -> Option<Color> {
    let normalized = input.trim().to_ascii_lowercase();
    if normalized.is_empty() || normalized == "none" {
        return None;
    }
    let color = DynamicColor::from_str(&normalized).ok()?;
    let rgba = color.to_alpha_color::<Srgb>().to_rgba8();
    Some(Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a))
}

/// Parses a colour, logging and falling back to `fallback` when it is invalid.
pub fn parse_color_or(input: &str, fallback: Color) -> Color {
    match parse_color(input) {
        Some(color) => color,
        None => {
            tracing::warn!("Unparsable colour '{}', using fallback", input);
            fallback
        }
    }
}

/// Multiplies a colour's alpha by `opacity`.
pub fn with_opacity(mut color: Color, opacity: f32) -> Color {
    color.apply_opacity(opacity);
    color
}
