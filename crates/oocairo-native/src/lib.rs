//! In-process stand-in for the cairo 2D graphics library.
//!
//! [`Cairo`] implements cairo's object model: manually reference counted
//! objects addressed by [`NativePtr`], sticky error statuses, graphics state
//! stacks, paths built in device space, patterns, fonts (including user fonts
//! driven through [`UserFontHooks`]), regions and surfaces. It does not
//! rasterize. Drawing operators are recorded on the target surface as
//! [`DrawOp`]s, and every entry point appends its cairo symbol name to a call
//! log so callers can verify which native functions ran.
//!
//! ```
//! use oocairo_native::{Cairo, Format, Status};
//!
//! let cairo = Cairo::new();
//! let surface = cairo.image_surface_create(Format::Argb32, 10, 10);
//! let cr = cairo.create(surface);
//! cairo.set_source_rgb(cr, 0.0, 0.0, 0.0);
//! cairo.paint(cr);
//! assert_eq!(cairo.status(cr), Status::Success);
//! assert!(cairo.was_called("cairo_paint"));
//! cairo.destroy(cr);
//! cairo.destroy(surface);
//! assert_eq!(cairo.live_objects(), 0);
//! ```

mod cairo;
mod context;
mod enums;
mod font;
mod matrix;
mod path;
mod pattern;
mod region;
mod status;
mod surface;
mod types;

pub use cairo::{Cairo, NativePtr, ResourceKind};
pub use enums::{
    Antialias, Content, Extend, FillRule, Filter, FontSlant, FontType, FontWeight, Format, HintMetrics, HintStyle,
    LineCap, LineJoin, Operator, PathDataType, PatternType, RegionOverlap, SubpixelOrder, SurfaceType,
};
pub use font::{FontOptions, UserFontHooks};
pub use matrix::Matrix;
pub use status::Status;
pub use surface::STREAM_MAGIC;
pub use types::{
    ColorStop, DrawKind, DrawOp, Extents, Features, FontExtents, Glyph, PathSegment, RectangleInt, Rgba, ShapedText,
    TextCluster, TextClusterFlags, TextExtents,
};
