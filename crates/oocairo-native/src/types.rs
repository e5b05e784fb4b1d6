//! Plain value records exchanged with the native library.

use bitflags::bitflags;

use crate::{Operator, PathDataType};

/// Metrics of a scaled font, in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontExtents {
    pub ascent: f64,
    pub descent: f64,
    pub height: f64,
    pub max_x_advance: f64,
    pub max_y_advance: f64,
}

/// Ink and advance metrics of a run of glyphs, in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtents {
    pub x_bearing: f64,
    pub y_bearing: f64,
    pub width: f64,
    pub height: f64,
    pub x_advance: f64,
    pub y_advance: f64,
}

/// A positioned glyph.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Glyph {
    pub index: u64,
    pub x: f64,
    pub y: f64,
}

/// Mapping of a run of bytes in the source text to a run of glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextCluster {
    pub num_bytes: i32,
    pub num_glyphs: i32,
}

bitflags! {
    /// Flags describing a cluster array.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextClusterFlags: u32 {
        /// Clusters map glyphs in right-to-left order.
        const BACKWARD = 0x1;
    }
}

/// Glyphs and clusters produced from a UTF-8 string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapedText {
    pub glyphs: Vec<Glyph>,
    pub clusters: Vec<TextCluster>,
    pub flags: TextClusterFlags,
}

/// Integer rectangle used by regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RectangleInt {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RectangleInt {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub(crate) fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub(crate) fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }
}

/// Axis-aligned box given by its corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extents {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Extents {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Bounding box of a set of points; `None` when there are no points.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut ext = Extents::new(x, y, x, y);
        for (x, y) in iter {
            ext.x1 = ext.x1.min(x);
            ext.y1 = ext.y1.min(y);
            ext.x2 = ext.x2.max(x);
            ext.y2 = ext.y2.max(y);
        }
        Some(ext)
    }

    pub fn union(&self, other: &Extents) -> Extents {
        Extents::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    pub fn intersect(&self, other: &Extents) -> Extents {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2).max(x1);
        let y2 = self.y2.min(other.y2).max(y1);
        Extents::new(x1, y1, x2, y2)
    }

    pub fn grow(&self, by: f64) -> Extents {
        Extents::new(self.x1 - by, self.y1 - by, self.x2 + by, self.y2 + by)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    pub fn corners(&self) -> [(f64, f64); 4] {
        [(self.x1, self.y1), (self.x2, self.y1), (self.x2, self.y2), (self.x1, self.y2)]
    }
}

/// One element of a copied path, in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    ClosePath,
}

impl PathSegment {
    pub fn kind(&self) -> PathDataType {
        match self {
            PathSegment::MoveTo(..) => PathDataType::MoveTo,
            PathSegment::LineTo(..) => PathDataType::LineTo,
            PathSegment::CurveTo(..) => PathDataType::CurveTo,
            PathSegment::ClosePath => PathDataType::ClosePath,
        }
    }

    /// Control and end points, in order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        match *self {
            PathSegment::MoveTo(x, y) | PathSegment::LineTo(x, y) => vec![(x, y)],
            PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => vec![(x1, y1), (x2, y2), (x3, y3)],
            PathSegment::ClosePath => Vec::new(),
        }
    }
}

/// Color with alpha, each component in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Rgba {
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

/// Gradient color stop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

/// Kind of a recorded drawing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Paint,
    Mask,
    Stroke,
    Fill,
    Glyphs,
}

/// Drawing operation recorded on a surface, in device space.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    pub kind: DrawKind,
    pub operator: Operator,
    /// Affected area; `None` for unbounded operations on an unbounded surface.
    pub extents: Option<Extents>,
}

bitflags! {
    /// Optional capabilities of the native library.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Features: u32 {
        const USER_FONT = 1 << 0;
        const RECORDING_SURFACE = 1 << 1;
        const PNG_FUNCTIONS = 1 << 2;
        const PDF_SURFACE = 1 << 3;
        const PS_SURFACE = 1 << 4;
        const SVG_SURFACE = 1 << 5;
    }
}

impl Features {
    /// Capabilities implemented by this library.
    pub const SUPPORTED: Features = Features::USER_FONT.union(Features::RECORDING_SURFACE);
}
