//! Affine transform expressions.
//!
//! Elements carry a transform as text, e.g. `"rotate(45) translate(10,0)"`.
//! Operations compose left to right and are applied about the element's
//! centre, so `rotate(90)` turns an element in place.

use sketchkit_core::{GeometryError, Point};
use std::fmt;
use std::str::FromStr;
use tiny_skia::Transform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(f64, f64),
    Scale(f64, f64),
    /// Degrees, clockwise in a y-down space.
    Rotate(f64),
    SkewX(f64),
    SkewY(f64),
    /// `a b c d e f` in the usual 2D affine order.
    Matrix([f64; 6]),
}

impl TransformOp {
    fn to_transform(self) -> Transform {
        match self {
            TransformOp::Translate(x, y) => Transform::from_translate(x as f32, y as f32),
            TransformOp::Scale(sx, sy) => Transform::from_scale(sx as f32, sy as f32),
            TransformOp::Rotate(deg) => Transform::from_rotate(deg as f32),
            TransformOp::SkewX(deg) => Transform::from_skew(deg.to_radians().tan() as f32, 0.0),
            TransformOp::SkewY(deg) => Transform::from_skew(0.0, deg.to_radians().tan() as f32),
            TransformOp::Matrix([a, b, c, d, e, f]) => Transform::from_row(
                a as f32, b as f32, c as f32, d as f32, e as f32, f as f32,
            ),
        }
    }
}

/// A parsed transform expression that keeps its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformExpr {
    source: String,
    ops: Vec<TransformOp>,
}

impl TransformExpr {
    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.matrix().is_identity()
    }

    /// The composed matrix, without the centre adjustment.
    pub fn matrix(&self) -> Transform {
        self.ops
            .iter()
            .fold(Transform::identity(), |acc, op| acc.pre_concat(op.to_transform()))
    }

    /// The composed matrix applied about `center`.
    pub fn about(&self, center: Point) -> Transform {
        Transform::from_translate(center.x as f32, center.y as f32)
            .pre_concat(self.matrix())
            .pre_concat(Transform::from_translate(
                -center.x as f32,
                -center.y as f32,
            ))
    }
}

impl FromStr for TransformExpr {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ops = Vec::new();
        let mut rest = s.trim();
        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| GeometryError::parse("transform", s))?;
            let close = rest[open..]
                .find(')')
                .map(|i| i + open)
                .ok_or_else(|| GeometryError::parse("transform", s))?;
            let name = rest[..open].trim();
            let op = parse_args(&rest[open + 1..close])
                .and_then(|args| parse_op(name, &args))
                .ok_or_else(|| GeometryError::parse("transform", s))?;
            ops.push(op);
            rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        }
        Ok(Self {
            source: s.trim().to_string(),
            ops,
        })
    }
}

impl fmt::Display for TransformExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_args(args: &str) -> Option<Vec<f64>> {
    args.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok())
        .collect()
}

fn parse_op(name: &str, args: &[f64]) -> Option<TransformOp> {
    let op = match (name, args) {
        ("translate", [x]) => TransformOp::Translate(*x, 0.0),
        ("translate", [x, y]) => TransformOp::Translate(*x, *y),
        ("scale", [s]) => TransformOp::Scale(*s, *s),
        ("scale", [sx, sy]) => TransformOp::Scale(*sx, *sy),
        ("rotate", [deg]) => TransformOp::Rotate(*deg),
        ("skewX", [deg]) => TransformOp::SkewX(*deg),
        ("skewY", [deg]) => TransformOp::SkewY(*deg),
        ("matrix", [a, b, c, d, e, f]) => TransformOp::Matrix([*a, *b, *c, *d, *e, *f]),
        _ => return None,
    };
    Some(op)
}

/// Maps a point through a transform.
pub fn map_point(t: &Transform, p: Point) -> Point {
    let (x, y) = (p.x as f32, p.y as f32);
    Point::new(
        (t.sx * x + t.kx * y + t.tx) as f64,
        (t.ky * x + t.sy * y + t.ty) as f64,
    )
}

/// Maps a point through the inverse of a transform, if it is invertible.
pub fn unmap_point(t: &Transform, p: Point) -> Option<Point> {
    t.invert().map(|inv| map_point(&inv, p))
}
