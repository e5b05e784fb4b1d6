//! Path construction, flattening and hit testing.
//!
//! Paths are built in device space. Copies handed out through
//! [`Cairo::copy_path`](crate::Cairo::copy_path) are converted back to the
//! user space of the context at the time of the copy.

use std::f64::consts::PI;

use crate::cairo::{NativePtr, Resource};
use crate::{Cairo, Extents, FillRule, PathSegment, Status};

/// Longest arc sweep, in full turns.
pub(crate) const MAX_FULL_CIRCLES: f64 = 65536.0;

pub(crate) type Point = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PathOp {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    ClosePath,
}

/// A flattened sub-path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Path {
    ops: Vec<PathOp>,
    current: Option<Point>,
    last_move: Option<Point>,
}

impl Path {
    pub fn clear(&mut self) {
        *self = Path::default();
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn new_sub_path(&mut self) {
        self.current = None;
    }

    pub fn move_to(&mut self, p: Point) {
        // Consecutive moves collapse into one.
        if let Some(PathOp::MoveTo(last)) = self.ops.last_mut() {
            *last = p;
        } else {
            self.ops.push(PathOp::MoveTo(p));
        }
        self.current = Some(p);
        self.last_move = Some(p);
    }

    pub fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.ops.push(PathOp::LineTo(p));
        self.current = Some(p);
    }

    pub fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        if self.current.is_none() {
            self.move_to(p1);
        }
        self.ops.push(PathOp::CurveTo(p1, p2, p3));
        self.current = Some(p3);
    }

    pub fn close_path(&mut self) {
        let Some(start) = self.last_move else {
            return;
        };
        if self.current.is_none() {
            return;
        }
        self.ops.push(PathOp::ClosePath);
        self.ops.push(PathOp::MoveTo(start));
        self.current = Some(start);
    }

    /// Append an arc of a circle as bezier segments. Angles increase in the
    /// positive direction unless `negative` is set. A sweep longer than
    /// `MAX_FULL_CIRCLES` turns is cut down to that many.
    ///
    /// `to_device` maps user coordinates to device space.
    pub fn arc(
        &mut self,
        to_device: impl Fn(f64, f64) -> Point,
        center: Point,
        radius: f64,
        angle1: f64,
        angle2: f64,
        negative: bool,
    ) -> Result<(), Status> {
        if ![center.0, center.1, radius, angle1, angle2].iter().all(|v| v.is_finite()) {
            return Err(Status::InvalidPathData);
        }
        let turn = 2.0 * PI;
        let mut sweep = if negative { angle1 - angle2 } else { angle2 - angle1 };
        if sweep < 0.0 {
            sweep = sweep.rem_euclid(turn);
        } else if sweep > turn * MAX_FULL_CIRCLES {
            sweep = sweep.rem_euclid(turn) + turn * MAX_FULL_CIRCLES;
        }
        let angle2 = if negative { angle1 - sweep } else { angle1 + sweep };

        let (cx, cy) = center;
        let at = |a: f64| (cx + radius * a.cos(), cy + radius * a.sin());

        let start = at(angle1);
        self.line_to(to_device(start.0, start.1));
        if radius <= 0.0 || angle1 == angle2 {
            return Ok(());
        }

        let sweep = angle2 - angle1;
        let segments = ((sweep.abs() / (PI / 2.0)).ceil() as usize).max(1);
        let step = sweep / segments as f64;
        let h = 4.0 / 3.0 * (step / 4.0).tan();
        for i in 0..segments {
            let a = angle1 + step * i as f64;
            let b = a + step;
            let (sa, ca) = a.sin_cos();
            let (sb, cb) = b.sin_cos();
            let p1 = (cx + radius * (ca - h * sa), cy + radius * (sa + h * ca));
            let p2 = (cx + radius * (cb + h * sb), cy + radius * (sb - h * cb));
            let p3 = at(b);
            self.curve_to(to_device(p1.0, p1.1), to_device(p2.0, p2.1), to_device(p3.0, p3.1));
        }
        Ok(())
    }

    /// All points, including curve control points.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.ops.iter().flat_map(|op| match *op {
            PathOp::MoveTo(p) | PathOp::LineTo(p) => vec![p],
            PathOp::CurveTo(a, b, c) => vec![a, b, c],
            PathOp::ClosePath => Vec::new(),
        })
    }

    pub fn flatten(&self, tolerance: f64) -> Vec<Polyline> {
        let mut lines = Vec::new();
        let mut current: Option<Polyline> = None;
        for op in &self.ops {
            match *op {
                PathOp::MoveTo(p) => {
                    if let Some(line) = current.take().filter(|l| l.points.len() > 1 || l.closed) {
                        lines.push(line);
                    }
                    current = Some(Polyline {
                        points: vec![p],
                        closed: false,
                    });
                }
                PathOp::LineTo(p) => {
                    if let Some(line) = current.as_mut() {
                        line.points.push(p);
                    }
                }
                PathOp::CurveTo(p1, p2, p3) => {
                    if let Some(line) = current.as_mut() {
                        let p0 = line.points.last().copied().unwrap_or(p1);
                        flatten_curve(p0, p1, p2, p3, tolerance, &mut line.points);
                    }
                }
                PathOp::ClosePath => {
                    if let Some(line) = current.as_mut() {
                        line.closed = true;
                    }
                }
            }
        }
        if let Some(line) = current.filter(|l| l.points.len() > 1 || l.closed) {
            lines.push(line);
        }
        lines
    }

    /// Bounding box of the flattened path, in device space.
    pub fn flat_extents(&self, tolerance: f64) -> Option<Extents> {
        Extents::from_points(self.flatten(tolerance).into_iter().flat_map(|l| l.points))
    }
}

fn flatten_curve(p0: Point, p1: Point, p2: Point, p3: Point, tolerance: f64, out: &mut Vec<Point>) {
    let dist = |a: Point, b: Point| (a.0 - b.0).hypot(a.1 - b.1);
    let hull = dist(p0, p1) + dist(p1, p2) + dist(p2, p3);
    let segments = (hull / (8.0 * tolerance.max(1e-6)).sqrt()).ceil().clamp(1.0, 256.0) as usize;
    for i in 1..=segments {
        let t = i as f64 / segments as f64;
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        out.push((
            a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0,
            a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1,
        ));
    }
}

/// Whether `p` lies inside the area enclosed by `lines` under `rule`.
pub(crate) fn point_in_fill(lines: &[Polyline], p: Point, rule: FillRule) -> bool {
    let mut winding = 0i32;
    for line in lines {
        let pts = &line.points;
        for i in 0..pts.len() {
            // Fills always close their sub-paths.
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            if a.1 <= p.1 {
                if b.1 > p.1 && cross(a, b, p) > 0.0 {
                    winding += 1;
                }
            } else if b.1 <= p.1 && cross(a, b, p) < 0.0 {
                winding -= 1;
            }
        }
    }
    match rule {
        FillRule::Winding => winding != 0,
        FillRule::EvenOdd => winding % 2 != 0,
    }
}

/// Whether `p` lies within `half_width` of any segment of `lines`.
pub(crate) fn point_on_stroke(lines: &[Polyline], p: Point, half_width: f64) -> bool {
    lines.iter().any(|line| {
        let pts = &line.points;
        let closing = if line.closed { pts.first().zip(pts.last()).map(|(f, l)| (*l, *f)) } else { None };
        pts.windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
            .any(|(a, b)| segment_distance(a, b, p) <= half_width)
    })
}

fn cross(a: Point, b: Point, p: Point) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (p.0 - a.0) * (b.1 - a.1)
}

fn segment_distance(a: Point, b: Point, p: Point) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
    };
    (p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

// ============================================================================
// Copied paths
// ============================================================================

/// Path copied out of a context.
#[derive(Debug, Clone, Default)]
pub(crate) struct PathData {
    pub status: Status,
    pub segments: Vec<PathSegment>,
}

impl Resource for PathData {
    fn status(&self) -> Status {
        self.status
    }
}

impl Cairo {
    /// Create a path object from segments, as if copied from a context.
    pub fn path_create(&self, segments: Vec<PathSegment>) -> NativePtr {
        self.insert(PathData {
            status: Status::Success,
            segments,
        })
    }

    pub(crate) fn path_create_error(&self, status: Status) -> NativePtr {
        self.insert(PathData {
            status,
            segments: Vec::new(),
        })
    }

    /// Segments of a path object.
    pub fn path_segments(&self, path: NativePtr) -> Vec<PathSegment> {
        self.with(path, |p: &PathData| p.segments.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(path: &mut Path) {
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.line_to((0.0, 10.0));
        path.close_path();
    }

    #[test]
    fn test_close_path_returns_to_start() {
        let mut path = Path::default();
        square(&mut path);
        assert_eq!(path.current_point(), Some((0.0, 0.0)));
        assert_eq!(path.ops()[path.ops().len() - 2], PathOp::ClosePath);
    }

    #[test]
    fn test_line_to_without_current_point_moves() {
        let mut path = Path::default();
        path.line_to((3.0, 4.0));
        assert_eq!(path.ops(), &[PathOp::MoveTo((3.0, 4.0))]);
    }

    #[test]
    fn test_fill_rules() {
        let mut path = Path::default();
        square(&mut path);
        let lines = path.flatten(0.1);
        assert!(point_in_fill(&lines, (5.0, 5.0), FillRule::Winding));
        assert!(!point_in_fill(&lines, (15.0, 5.0), FillRule::EvenOdd));
    }

    #[test]
    fn test_stroke_hit() {
        let mut path = Path::default();
        square(&mut path);
        let lines = path.flatten(0.1);
        assert!(point_on_stroke(&lines, (5.0, 0.4), 0.5));
        // The closing edge counts.
        assert!(point_on_stroke(&lines, (0.2, 5.0), 0.5));
        assert!(!point_on_stroke(&lines, (5.0, 5.0), 0.5));
    }

    #[test]
    fn test_full_circle_extents() {
        let mut path = Path::default();
        path.arc(|x, y| (x, y), (0.0, 0.0), 10.0, 0.0, 2.0 * PI, false).unwrap();
        let ext = path.flat_extents(0.01).unwrap();
        assert!((ext.x1 + 10.0).abs() < 0.1 && (ext.x2 - 10.0).abs() < 0.1);
        assert!((ext.y1 + 10.0).abs() < 0.1 && (ext.y2 - 10.0).abs() < 0.1);
    }

    fn curve_count(path: &Path) -> usize {
        path.ops.iter().filter(|op| matches!(op, PathOp::CurveTo(..))).count()
    }

    #[test]
    fn test_arc_sweep_is_bounded() {
        let mut path = Path::default();
        path.arc(|x, y| (x, y), (0.0, 0.0), 1.0, 0.0, 1e12, false).unwrap();
        assert!(curve_count(&path) <= 4 * (MAX_FULL_CIRCLES as usize + 1));
    }

    #[test]
    fn test_arc_wraps_end_angle() {
        // A quarter turn backwards is three quarters forwards.
        let mut path = Path::default();
        path.arc(|x, y| (x, y), (0.0, 0.0), 1.0, 0.0, -PI / 2.0, false).unwrap();
        assert!(curve_count(&path) >= 3);
        let (x, y) = path.current_point().unwrap();
        assert!(x.abs() < 1e-9 && (y + 1.0).abs() < 1e-9);

        let mut path = Path::default();
        path.arc(|x, y| (x, y), (0.0, 0.0), 1.0, 0.0, -1e12, true).unwrap();
        assert!(curve_count(&path) <= 4 * (MAX_FULL_CIRCLES as usize + 1));
    }

    #[test]
    fn test_arc_rejects_non_finite() {
        let mut path = Path::default();
        assert_eq!(
            path.arc(|x, y| (x, y), (0.0, 0.0), 1.0, 0.0, f64::INFINITY, false),
            Err(Status::InvalidPathData)
        );
        assert_eq!(
            path.arc(|x, y| (x, y), (f64::NAN, 0.0), 1.0, 0.0, 1.0, false),
            Err(Status::InvalidPathData)
        );
        assert!(path.ops.is_empty());
    }
}
