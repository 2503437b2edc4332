//! Geometry value types: [`Point`], [`Size`] and [`Region`].
//!
//! All three are small `Copy` values with a textual form used by model
//! documents: `"x,y"` for points, `"w,h"` for sizes and `"x,y,w,h"` for regions.
//!
//! Containment is inclusive of both edges while [`Region::intersects_with`]
//! only reports overlap with a positive area, so two regions that merely share
//! an edge do not intersect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::GeometryError;

/// A position in model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.squared_distance_to(other).sqrt()
    }

    pub fn squared_distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Returns this point moved by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Scales this point relative to `origin`, each axis by its own factor.
    pub fn scale(&self, sx: f64, sy: f64, origin: Point) -> Point {
        Point::new(
            origin.x + (self.x - origin.x) * sx,
            origin.y + (self.y - origin.y) * sy,
        )
    }

    /// Rounds both coordinates to the nearest integer.
    pub fn round(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y] = parse_pair(s, "point")?;
        Ok(Point::new(x, y))
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Width divided by height, or `None` for a degenerate height.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height.abs() < f64::EPSILON {
            None
        } else {
            Some(self.width / self.height)
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [width, height] = parse_pair(s, "size")?;
        Ok(Size::new(width, height))
    }
}

/// An axis-aligned rectangle described by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_location_size(location: Point, size: Size) -> Self {
        Self::new(location.x, location.y, size.width, size.height)
    }

    /// Builds the normalised region spanned by two corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Smallest region containing every point, or `None` for an empty slice.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive of every edge.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn contains_region(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True only when the overlap has a positive area.
    pub fn intersects_with(&self, other: &Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Region::new(x, y, right - x, bottom - y)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Region {
        Region::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grows the region by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Region {
        Region::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Region of side `size` centred on `center`.
    pub fn around(center: Point, size: f64) -> Region {
        Region::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for Region {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_numbers(s, "region")?;
        match values.as_slice() {
            [x, y, w, h] => Ok(Region::new(*x, *y, *w, *h)),
            _ => Err(GeometryError::parse("region", s)),
        }
    }
}

/// Parses a comma separated list of numbers.
pub fn parse_numbers(s: &str, kind: &'static str) -> Result<Vec<f64>, GeometryError> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| GeometryError::parse(kind, s))
        })
        .collect()
}

fn parse_pair(s: &str, kind: &'static str) -> Result<[f64; 2], GeometryError> {
    match parse_numbers(s, kind)?.as_slice() {
        [a, b] => Ok([*a, *b]),
        _ => Err(GeometryError::parse(kind, s)),
    }
}

/// Parses a space separated list of `"x,y"` tokens.
pub fn parse_point_list(s: &str) -> Result<Vec<Point>, GeometryError> {
    s.split_whitespace().map(str::parse).collect()
}

/// Formats points as a space separated list of `"x,y"` tokens.
pub fn format_point_list(points: &[Point]) -> String {
    points
        .iter()
        .map(Point::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_round_trip() {
        let p: Point = "10,20.5".parse().expect("valid point");
        assert_eq!(p, Point::new(10.0, 20.5));
        assert_eq!(p.to_string(), "10,20.5");
    }

    #[test]
    fn test_point_parse_rejects_garbage() {
        assert!("10".parse::<Point>().is_err());
        assert!("a,b".parse::<Point>().is_err());
        assert!("1,2,3".parse::<Point>().is_err());
    }

    #[test]
    fn test_size_round_trip() {
        let s: Size = " 50 , 40 ".parse().expect("valid size");
        assert_eq!(s, Size::new(50.0, 40.0));
        assert_eq!(s.to_string(), "50,40");
    }

    #[test]
    fn test_region_contains_inclusive() {
        let r = Region::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(Point::new(10.0, 10.0)));
        assert!(r.contains_point(Point::new(0.0, 0.0)));
        assert!(!r.contains_point(Point::new(10.01, 5.0)));
    }

    #[test]
    fn test_region_edge_touch_is_not_intersection() {
        let a = Region::new(0.0, 0.0, 10.0, 10.0);
        let b = Region::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects_with(&b));
        let c = Region::new(9.0, 0.0, 10.0, 10.0);
        assert!(a.intersects_with(&c));
    }

    #[test]
    fn test_bounding() {
        let r = Region::bounding([Point::new(5.0, 1.0), Point::new(-1.0, 7.0)]).expect("points");
        assert_eq!(r, Region::new(-1.0, 1.0, 6.0, 6.0));
        assert!(Region::bounding(Vec::<Point>::new()).is_none());
    }

    #[test]
    fn test_point_list() {
        let pts = parse_point_list("0,0 10,0  10,10").expect("valid list");
        assert_eq!(pts.len(), 3);
        assert_eq!(format_point_list(&pts), "0,0 10,0 10,10");
    }

    #[test]
    fn test_scale_uses_each_axis() {
        let p = Point::new(10.0, 10.0).scale(2.0, 3.0, Point::ORIGIN);
        assert_eq!(p, Point::new(20.0, 30.0));
    }
}
