//! Model document records.
//!
//! Documents are JSON with camelCase keys. Geometry travels as text
//! (`"x,y"` locations, `"w,h"` sizes, space separated point lists and the
//! path command language), fills as either text or a gradient object.
//! Optional fields are omitted when absent.

use serde::{Deserialize, Serialize};
use sketchkit_core::geometry::format_point_list;
use sketchkit_core::{GeometryError, Point, Size};

use crate::element::{format_commands, Element, Shape};
use crate::fill::{Fill, GradientStop, LinearGradient, RadialGradient};
use crate::resources::{Resource, ResourceKind, ResourceSource};

/// One element in a model document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_offset_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_points: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_down: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_up: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_enter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_leave: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winding_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    /// `id` of the parent element, for fill inheritance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ElementRecord {
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            ..Default::default()
        }
    }

    pub fn location(&self) -> Result<Point, GeometryError> {
        self.location
            .as_deref()
            .map_or(Ok(Point::ORIGIN), str::parse)
    }

    pub fn size(&self) -> Result<Size, GeometryError> {
        self.size.as_deref().map_or(Ok(Size::default()), str::parse)
    }

    /// Captures an element; `parent` is the parent's document id.
    pub fn from_element(element: &Element, parent: Option<String>) -> Self {
        let bounds = element.bounds();
        let style = &element.style;
        let mut record = ElementRecord {
            element_type: element.type_name().to_string(),
            id: element.id.clone(),
            fill: style.fill.as_ref().map(FillRecord::from),
            stroke: style.stroke.clone(),
            stroke_width: (style.stroke_width != 1.0).then_some(style.stroke_width),
            fill_scale: (style.fill_scale != 1.0).then_some(style.fill_scale),
            fill_offset_x: (style.fill_offset.x != 0.0).then_some(style.fill_offset.x),
            fill_offset_y: (style.fill_offset.y != 0.0).then_some(style.fill_offset.y),
            transform: element.transform().map(ToString::to_string),
            interactive: (!element.flags.interactive).then_some(false),
            locked: element.flags.locked.then_some(true),
            aspect_locked: element.flags.aspect_locked.then_some(true),
            edit_points: element.flags.edit_points.then_some(true),
            mouse_down: element.hooks.mouse_down.clone(),
            mouse_up: element.hooks.mouse_up.clone(),
            mouse_enter: element.hooks.mouse_enter.clone(),
            mouse_leave: element.hooks.mouse_leave.clone(),
            click: element.hooks.click.clone(),
            timer: element.hooks.timer.clone(),
            parent,
            ..Default::default()
        };

        if !element.is_point_container() {
            record.location = Some(bounds.location().to_string());
            record.size = Some(bounds.size().to_string());
        }

        match element.shape() {
            Shape::Rectangle(_) => {}
            Shape::Line(s) => record.points = Some(format_point_list(s.points())),
            Shape::Polyline(s) => record.points = Some(format_point_list(s.points())),
            Shape::Polygon(s) => {
                record.points = Some(format_point_list(s.points()));
                record.winding_rule = Some(s.winding.to_string());
            }
            Shape::Path(s) => {
                record.commands = Some(format_commands(s.commands()));
                record.winding_rule = Some(s.winding.to_string());
            }
            Shape::Text(s) => {
                record.text = Some(s.text.clone());
                record.font_family = Some(s.font_family.clone());
                record.font_size = Some(s.font_size);
                record.bold = s.bold.then_some(true);
                record.italic = s.italic.then_some(true);
            }
            Shape::Image(s) => record.source = Some(s.source.clone()),
            Shape::Sprite(s) => {
                record.source = Some(s.source.clone());
                record.frames = Some(s.frames());
                record.frame = (s.frame() != 0).then_some(s.frame());
            }
            Shape::SubModel(s) => record.source = Some(s.source.clone()),
        }
        record
    }
}

/// A fill as written in a document: text or a gradient object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillRecord {
    Text(String),
    Gradient(GradientRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GradientRecord {
    Linear {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stops: Vec<StopRecord>,
    },
    Radial {
        cx: f64,
        cy: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fx: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fy: Option<f64>,
        rx: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ry: Option<f64>,
        stops: Vec<StopRecord>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub offset: f64,
    pub color: String,
}

impl From<&Fill> for FillRecord {
    fn from(fill: &Fill) -> Self {
        let stops = |stops: &[GradientStop]| {
            stops
                .iter()
                .map(|s| StopRecord {
                    offset: s.offset,
                    color: s.color.clone(),
                })
                .collect()
        };
        match fill {
            Fill::Linear(g) => FillRecord::Gradient(GradientRecord::Linear {
                x1: g.start.x,
                y1: g.start.y,
                x2: g.end.x,
                y2: g.end.y,
                stops: stops(&g.stops),
            }),
            Fill::Radial(g) => FillRecord::Gradient(GradientRecord::Radial {
                cx: g.center.x,
                cy: g.center.y,
                fx: (g.focus.x != g.center.x).then_some(g.focus.x),
                fy: (g.focus.y != g.center.y).then_some(g.focus.y),
                rx: g.radius_x,
                ry: (g.radius_y != g.radius_x).then_some(g.radius_y),
                stops: stops(&g.stops),
            }),
            Fill::Solid(_) | Fill::Reference(_) => {
                FillRecord::Text(fill.as_text().unwrap_or_default())
            }
        }
    }
}

impl From<FillRecord> for Fill {
    fn from(record: FillRecord) -> Self {
        let stops = |stops: Vec<StopRecord>| {
            stops
                .into_iter()
                .map(|s| GradientStop::new(s.offset, s.color))
                .collect()
        };
        match record {
            FillRecord::Text(text) => Fill::parse(&text),
            FillRecord::Gradient(GradientRecord::Linear {
                x1,
                y1,
                x2,
                y2,
                stops: s,
            }) => Fill::Linear(LinearGradient {
                start: Point::new(x1, y1),
                end: Point::new(x2, y2),
                stops: stops(s),
            }),
            FillRecord::Gradient(GradientRecord::Radial {
                cx,
                cy,
                fx,
                fy,
                rx,
                ry,
                stops: s,
            }) => Fill::Radial(RadialGradient {
                center: Point::new(cx, cy),
                focus: Point::new(fx.unwrap_or(cx), fy.unwrap_or(cy)),
                radius_x: rx,
                radius_y: ry.unwrap_or(rx),
                stops: stops(s),
            }),
        }
    }
}

/// A resource declaration; exactly one of `uri` and `value` is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub key: String,
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl From<ResourceRecord> for Resource {
    fn from(record: ResourceRecord) -> Self {
        let source = match (record.value, record.uri) {
            (Some(value), _) => ResourceSource::Embedded(value),
            (None, Some(uri)) => ResourceSource::Uri(uri),
            (None, None) => ResourceSource::Uri(record.key.clone()),
        };
        let resource = Resource::new(record.key, record.kind, source);
        match record.locale {
            Some(locale) => resource.with_locale(locale),
            None => resource,
        }
    }
}

impl From<&Resource> for ResourceRecord {
    fn from(resource: &Resource) -> Self {
        let (uri, value) = match resource.source() {
            ResourceSource::Uri(uri) => (Some(uri.clone()), None),
            ResourceSource::Embedded(value) => (None, Some(value.clone())),
        };
        ResourceRecord {
            key: resource.key().to_string(),
            kind: resource.kind(),
            uri,
            value,
            locale: resource.locale().map(str::to_string),
        }
    }
}

/// A whole model document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_record_camel_case() {
        let json = r#"{
            "type": "rectangle",
            "location": "10,10",
            "size": "50,50",
            "fill": "Red",
            "strokeWidth": 2,
            "aspectLocked": true,
            "mouseDown": "pushFill(Blue)"
        }"#;
        let record: ElementRecord = serde_json::from_str(json).expect("record");
        assert_eq!(record.element_type, "rectangle");
        assert_eq!(record.stroke_width, Some(2.0));
        assert_eq!(record.aspect_locked, Some(true));
        assert_eq!(record.fill, Some(FillRecord::Text("Red".into())));
        assert_eq!(record.location().expect("location"), Point::new(10.0, 10.0));

        let out = serde_json::to_value(&record).expect("serialize");
        assert!(out.get("points").is_none());
        assert_eq!(out["mouseDown"], "pushFill(Blue)");
    }

    #[test]
    fn test_gradient_fill_record() {
        let json = r##"{"type":"radial","cx":0.5,"cy":0.5,"rx":0.5,
            "stops":[{"offset":0,"color":"white"},{"offset":1,"color":"#000"}]}"##;
        let record: FillRecord = serde_json::from_str(json).expect("fill");
        match Fill::from(record) {
            Fill::Radial(g) => {
                assert_eq!(g.focus, Point::new(0.5, 0.5));
                assert_eq!(g.radius_y, 0.5);
                assert_eq!(g.stops.len(), 2);
            }
            other => panic!("expected radial, got {:?}", other),
        }
    }

    #[test]
    fn test_resource_record_source() {
        let record: ResourceRecord =
            serde_json::from_str(r#"{"key":"tile","kind":"image"}"#).expect("resource");
        let resource = Resource::from(record);
        assert_eq!(resource.source(), &ResourceSource::Uri("tile".into()));
        assert_eq!(resource.kind(), ResourceKind::Image);
    }
}
