//! Path elements built from a compact command list.
//!
//! Commands: `m x,y` (move), `l x,y` (line), `c x1,y1,x2,y2,x,y` (cubic) and
//! `z` (close). Coordinates are absolute. Bounds cover the anchor points only;
//! bezier control points may lie outside them.

use lyon::geom::{point as lpoint, CubicBezierSegment};
use sketchkit_core::constants::CURVE_TOLERANCE;
use sketchkit_core::{GeometryError, Point, Region};
use std::fmt;
use std::str::FromStr;

use super::common::{contains_point, near_polyline, BoundsCache, Depth, WindingRule};
use super::ElementShape;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CurveTo { c1: Point, c2: Point, end: Point },
    Close,
}

impl PathCommand {
    /// The on-curve point this command ends at.
    pub fn anchor(&self) -> Option<Point> {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
            PathCommand::CurveTo { end, .. } => Some(*end),
            PathCommand::Close => None,
        }
    }

    fn map(&mut self, f: impl Fn(Point) -> Point) {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => *p = f(*p),
            PathCommand::CurveTo { c1, c2, end } => {
                *c1 = f(*c1);
                *c2 = f(*c2);
                *end = f(*end);
            }
            PathCommand::Close => {}
        }
    }

    /// Addressable points of this command at the given depth.
    fn slot_count(&self, depth: Depth) -> usize {
        match (self, depth) {
            (PathCommand::Close, _) => 0,
            (PathCommand::CurveTo { .. }, Depth::Full) => 3,
            _ => 1,
        }
    }

    fn slot_mut(&mut self, slot: usize, depth: Depth) -> Option<&mut Point> {
        match (self, depth, slot) {
            (PathCommand::MoveTo(p) | PathCommand::LineTo(p), _, 0) => Some(p),
            (PathCommand::CurveTo { end, .. }, Depth::Simple, 0) => Some(end),
            (PathCommand::CurveTo { c1, .. }, Depth::Full, 0) => Some(c1),
            (PathCommand::CurveTo { c2, .. }, Depth::Full, 1) => Some(c2),
            (PathCommand::CurveTo { end, .. }, Depth::Full, 2) => Some(end),
            _ => None,
        }
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCommand::MoveTo(p) => write!(f, "m {}", p),
            PathCommand::LineTo(p) => write!(f, "l {}", p),
            PathCommand::CurveTo { c1, c2, end } => write!(f, "c {},{},{}", c1, c2, end),
            PathCommand::Close => write!(f, "z"),
        }
    }
}

/// Parses a command string such as `"m 0,0 l 10,0 c 10,5,5,10,0,10 z"`.
pub fn parse_commands(input: &str) -> Result<Vec<PathCommand>, GeometryError> {
    let mut commands = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if !c.is_ascii_alphabetic() {
            return Err(GeometryError::parse("path", input));
        }
        let mut end = input.len();
        while let Some(&(i, next)) = chars.peek() {
            if next.is_ascii_alphabetic() {
                end = i;
                break;
            }
            chars.next();
        }
        let body = input[start + c.len_utf8()..end].trim();
        let numbers = body
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| GeometryError::parse("path", input))?;
        let command = match (c.to_ascii_lowercase(), numbers.as_slice()) {
            ('m', [x, y]) => PathCommand::MoveTo(Point::new(*x, *y)),
            ('l', [x, y]) => PathCommand::LineTo(Point::new(*x, *y)),
            ('c', [x1, y1, x2, y2, x, y]) => PathCommand::CurveTo {
                c1: Point::new(*x1, *y1),
                c2: Point::new(*x2, *y2),
                end: Point::new(*x, *y),
            },
            ('z', []) => PathCommand::Close,
            _ => return Err(GeometryError::parse("path", input)),
        };
        commands.push(command);
    }
    Ok(commands)
}

/// Formats commands in the form [`parse_commands`] reads.
pub fn format_commands(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(PathCommand::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct PathShape {
    commands: Vec<PathCommand>,
    pub winding: WindingRule,
    bounds: BoundsCache,
}

impl PathShape {
    /// Validates and wraps a command list.
    ///
    /// The list must start with a move and contain at least one segment.
    pub fn new(commands: Vec<PathCommand>) -> Result<Self, GeometryError> {
        match commands.first() {
            None => return Err(GeometryError::empty("path")),
            Some(PathCommand::MoveTo(_)) => {}
            Some(_) => return Err(GeometryError::invalid("path must start with a move")),
        }
        let has_segment = commands
            .iter()
            .any(|c| matches!(c, PathCommand::LineTo(_) | PathCommand::CurveTo { .. }));
        if !has_segment {
            return Err(GeometryError::invalid("path has no segments"));
        }
        Ok(Self {
            commands,
            winding: WindingRule::default(),
            bounds: BoundsCache::default(),
        })
    }

    pub fn with_winding(mut self, winding: WindingRule) -> Self {
        self.winding = winding;
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Replaces the command list.
    pub fn set_commands(&mut self, commands: Vec<PathCommand>) -> Result<(), GeometryError> {
        let validated = Self::new(commands)?;
        self.commands = validated.commands;
        self.bounds.invalidate();
        Ok(())
    }

    pub fn is_bounds_cached(&self) -> bool {
        self.bounds.is_cached()
    }

    fn locate(&self, index: usize, depth: Depth) -> Option<(usize, usize)> {
        let mut remaining = index;
        for (i, command) in self.commands.iter().enumerate() {
            let slots = command.slot_count(depth);
            if remaining < slots {
                return Some((i, remaining));
            }
            remaining -= slots;
        }
        None
    }

    /// Addressable points at `depth` in index order, flagged when they are
    /// bezier control points, plus the pairs of indices that connect.
    pub fn slots(&self, depth: Depth) -> (Vec<(Point, bool)>, Vec<(usize, usize)>) {
        let mut points = Vec::new();
        let mut links = Vec::new();
        let mut previous: Option<usize> = None;
        let mut subpath_start: Option<usize> = None;
        fn push(points: &mut Vec<(Point, bool)>, p: Point, control: bool) -> usize {
            points.push((p, control));
            points.len() - 1
        }
        for command in &self.commands {
            match (*command, depth) {
                (PathCommand::MoveTo(p), _) => {
                    let i = push(&mut points, p, false);
                    previous = Some(i);
                    subpath_start = Some(i);
                }
                (PathCommand::LineTo(p), _)
                | (PathCommand::CurveTo { end: p, .. }, Depth::Simple) => {
                    let i = push(&mut points, p, false);
                    links.extend(previous.map(|a| (a, i)));
                    previous = Some(i);
                }
                (PathCommand::CurveTo { c1, c2, end }, Depth::Full) => {
                    let i1 = push(&mut points, c1, true);
                    let i2 = push(&mut points, c2, true);
                    let ie = push(&mut points, end, false);
                    links.extend(previous.map(|a| (a, i1)));
                    links.push((i2, ie));
                    previous = Some(ie);
                }
                (PathCommand::Close, _) => {
                    if let (Some(a), Some(s)) = (previous, subpath_start) {
                        if a != s {
                            links.push((a, s));
                        }
                    }
                }
            }
        }
        (points, links)
    }

    /// Flattens the path into subpaths, each with its closed flag.
    pub fn flatten(&self) -> Vec<(Vec<Point>, bool)> {
        let mut subpaths = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        subpaths.push((std::mem::take(&mut current), false));
                    }
                    current = vec![p];
                }
                PathCommand::LineTo(p) => current.push(p),
                PathCommand::CurveTo { c1, c2, end } => {
                    let from = current.last().copied().unwrap_or(end);
                    let segment = CubicBezierSegment {
                        from: lpoint(from.x, from.y),
                        ctrl1: lpoint(c1.x, c1.y),
                        ctrl2: lpoint(c2.x, c2.y),
                        to: lpoint(end.x, end.y),
                    };
                    current.extend(
                        segment
                            .flattened(CURVE_TOLERANCE)
                            .map(|p| Point::new(p.x, p.y)),
                    );
                }
                PathCommand::Close => {
                    if !current.is_empty() {
                        let start = current[0];
                        subpaths.push((std::mem::take(&mut current), true));
                        current.push(start);
                    }
                }
            }
        }
        if current.len() > 1 {
            subpaths.push((current, false));
        }
        subpaths
    }
}

impl FromStr for PathShape {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_commands(s)?)
    }
}

impl ElementShape for PathShape {
    fn bounds(&self) -> Region {
        self.bounds.get_or_compute(|| {
            Region::bounding(self.commands.iter().filter_map(PathCommand::anchor))
                .unwrap_or_default()
        })
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        for command in &mut self.commands {
            command.map(|p| p.offset(dx, dy));
        }
        self.bounds.invalidate();
    }

    fn scale(&mut self, sx: f64, sy: f64, origin: Point) {
        for command in &mut self.commands {
            command.map(|p| p.scale(sx, sy, origin));
        }
        self.bounds.invalidate();
    }

    fn outline(&self) -> Option<tiny_skia::Path> {
        let mut pb = tiny_skia::PathBuilder::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
                PathCommand::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
                PathCommand::CurveTo { c1, c2, end } => pb.cubic_to(
                    c1.x as f32,
                    c1.y as f32,
                    c2.x as f32,
                    c2.y as f32,
                    end.x as f32,
                    end.y as f32,
                ),
                PathCommand::Close => pb.close(),
            }
        }
        pb.finish()
    }

    fn hit_test(&self, p: Point, tolerance: f64, filled: bool) -> bool {
        let subpaths = self.flatten();
        if filled {
            let rings: Vec<Vec<Point>> = subpaths.iter().map(|(pts, _)| pts.clone()).collect();
            if contains_point(p, &rings, self.winding) {
                return true;
            }
        }
        subpaths
            .iter()
            .any(|(pts, closed)| near_polyline(p, pts, *closed, tolerance))
    }

    fn is_point_container(&self) -> bool {
        true
    }

    fn point_count(&self, depth: Depth) -> usize {
        self.commands.iter().map(|c| c.slot_count(depth)).sum()
    }

    fn point_at(&self, index: usize, depth: Depth) -> Result<Point, GeometryError> {
        let count = self.point_count(depth);
        let (command, slot) = self
            .locate(index, depth)
            .ok_or(GeometryError::InvalidPointIndex { index, count })?;
        let mut copy = self.commands[command];
        copy.slot_mut(slot, depth)
            .map(|p| *p)
            .ok_or(GeometryError::InvalidPointIndex { index, count })
    }

    fn set_point_at(
        &mut self,
        index: usize,
        value: Point,
        depth: Depth,
    ) -> Result<(), GeometryError> {
        let count = self.point_count(depth);
        let (command, slot) = self
            .locate(index, depth)
            .ok_or(GeometryError::InvalidPointIndex { index, count })?;
        let target = self.commands[command]
            .slot_mut(slot, depth)
            .ok_or(GeometryError::InvalidPointIndex { index, count })?;
        *target = value;
        self.bounds.invalidate();
        Ok(())
    }

    fn winding(&self) -> WindingRule {
        self.winding
    }

    fn invalidate_bounds(&self) {
        self.bounds.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVE: &str = "m 0,0 l 10,0 c 20,0,20,10,10,10 z";

    #[test]
    fn test_parse_and_format() {
        let commands = parse_commands(CURVE).expect("valid path");
        assert_eq!(commands.len(), 4);
        assert_eq!(format_commands(&commands), CURVE);
    }

    #[test]
    fn test_parse_accepts_space_separated_pairs() {
        let commands = parse_commands("M0,0 L 5 5 c 1,1 2,2 3,3 Z").expect("valid path");
        assert_eq!(commands[1], PathCommand::LineTo(Point::new(5.0, 5.0)));
        assert_eq!(commands.last(), Some(&PathCommand::Close));
    }

    #[test]
    fn test_slots_follow_point_indices() {
        let path: PathShape = CURVE.parse().expect("valid path");
        let (simple, simple_links) = path.slots(Depth::Simple);
        assert_eq!(simple.len(), path.point_count(Depth::Simple));
        assert_eq!(simple_links, vec![(0, 1), (1, 2), (2, 0)]);

        let (full, full_links) = path.slots(Depth::Full);
        assert_eq!(full.len(), 5);
        for (i, (p, _)) in full.iter().enumerate() {
            assert_eq!(path.point_at(i, Depth::Full).expect("in range"), *p);
        }
        assert!(full[2].1 && full[3].1 && !full[4].1);
        assert_eq!(full_links, vec![(0, 1), (1, 2), (3, 4), (4, 0)]);
    }

    #[test]
    fn test_parse_rejects_bad_arity() {
        assert!(parse_commands("m 0,0 l 1").is_err());
        assert!(parse_commands("q 1,2,3,4").is_err());
    }

    #[test]
    fn test_degenerate_paths_rejected() {
        assert!(matches!(
            PathShape::new(Vec::new()),
            Err(GeometryError::EmptyGeometry { .. })
        ));
        assert!(matches!(
            "m 1,1".parse::<PathShape>(),
            Err(GeometryError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            "l 1,1".parse::<PathShape>(),
            Err(GeometryError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_bounds_exclude_control_points() {
        let path: PathShape = CURVE.parse().expect("valid path");
        assert_eq!(path.bounds(), Region::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_depth_addressing() {
        let mut path: PathShape = CURVE.parse().expect("valid path");
        assert_eq!(path.point_count(Depth::Simple), 3);
        assert_eq!(path.point_count(Depth::Full), 5);
        assert_eq!(
            path.point_at(2, Depth::Simple).expect("anchor"),
            Point::new(10.0, 10.0)
        );
        assert_eq!(
            path.point_at(2, Depth::Full).expect("control"),
            Point::new(20.0, 0.0)
        );

        path.bounds();
        path.set_point_at(2, Point::new(30.0, 10.0), Depth::Simple)
            .expect("anchor");
        assert!(!path.is_bounds_cached());
        assert_eq!(path.bounds(), Region::new(0.0, 0.0, 30.0, 10.0));
        assert!(path.point_at(5, Depth::Full).is_err());
    }

    #[test]
    fn test_translate_moves_control_points() {
        let mut path: PathShape = CURVE.parse().expect("valid path");
        path.translate(5.0, 5.0);
        assert_eq!(
            path.point_at(2, Depth::Full).expect("control"),
            Point::new(25.0, 5.0)
        );
        assert_eq!(path.bounds(), Region::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_curve_interior_hit() {
        let path: PathShape = CURVE.parse().expect("valid path");
        // inside the bulge beyond the anchor bounds
        assert!(path.hit_test(Point::new(14.0, 5.0), 0.5, true));
        assert!(!path.hit_test(Point::new(14.0, 5.0), 0.5, false));
        assert!(!path.hit_test(Point::new(30.0, 5.0), 0.5, true));
    }
}
