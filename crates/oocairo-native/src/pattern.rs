//! Solid, surface and gradient patterns.

use crate::cairo::{NativePtr, Resource};
use crate::surface::SurfaceData;
use crate::{Cairo, ColorStop, Extend, Filter, Matrix, PatternType, Rgba, Status};

#[derive(Debug, Clone)]
pub(crate) enum PatternKind {
    Solid(Rgba),
    Surface(NativePtr),
    Linear {
        points: (f64, f64, f64, f64),
        stops: Vec<ColorStop>,
    },
    Radial {
        circles: (f64, f64, f64, f64, f64, f64),
        stops: Vec<ColorStop>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct PatternData {
    pub status: Status,
    pub kind: PatternKind,
    pub extend: Extend,
    pub filter: Filter,
    pub matrix: Matrix,
}

impl Resource for PatternData {
    fn status(&self) -> Status {
        self.status
    }

    fn children(&self) -> Vec<NativePtr> {
        match self.kind {
            PatternKind::Surface(surface) => vec![surface],
            _ => Vec::new(),
        }
    }
}

impl PatternData {
    fn new(kind: PatternKind) -> Self {
        let extend = match kind {
            PatternKind::Surface(_) => Extend::None,
            _ => Extend::Pad,
        };
        Self {
            status: Status::Success,
            kind,
            extend,
            filter: Filter::Good,
            matrix: Matrix::identity(),
        }
    }

    fn error(status: Status) -> Self {
        let mut pattern = Self::new(PatternKind::Solid(Rgba::default()));
        pattern.status = status;
        pattern
    }

    pub fn pattern_type(&self) -> PatternType {
        match self.kind {
            PatternKind::Solid(_) => PatternType::Solid,
            PatternKind::Surface(_) => PatternType::Surface,
            PatternKind::Linear { .. } => PatternType::Linear,
            PatternKind::Radial { .. } => PatternType::Radial,
        }
    }

    fn stops(&self) -> Result<&Vec<ColorStop>, Status> {
        match &self.kind {
            PatternKind::Linear { stops, .. } | PatternKind::Radial { stops, .. } => Ok(stops),
            _ => Err(Status::PatternTypeMismatch),
        }
    }
}

impl Cairo {
    pub fn pattern_create_rgb(&self, red: f64, green: f64, blue: f64) -> NativePtr {
        self.log("cairo_pattern_create_rgb");
        self.pattern_solid(Rgba::new(red, green, blue, 1.0))
    }

    pub fn pattern_create_rgba(&self, red: f64, green: f64, blue: f64, alpha: f64) -> NativePtr {
        self.log("cairo_pattern_create_rgba");
        self.pattern_solid(Rgba::new(red, green, blue, alpha))
    }

    pub fn pattern_create_for_surface(&self, surface: NativePtr) -> NativePtr {
        self.log("cairo_pattern_create_for_surface");
        self.pattern_for_surface(surface)
    }

    pub(crate) fn pattern_solid(&self, color: Rgba) -> NativePtr {
        self.insert(PatternData::new(PatternKind::Solid(color)))
    }

    pub(crate) fn pattern_error(&self, status: Status) -> NativePtr {
        self.insert(PatternData::error(status))
    }

    pub(crate) fn pattern_for_surface(&self, surface: NativePtr) -> NativePtr {
        match self.with(surface, |s: &SurfaceData| s.status) {
            None => self.pattern_error(Status::NullPointer),
            Some(status) if !status.is_success() => self.pattern_error(status),
            Some(_) => {
                self.retain(surface);
                self.insert(PatternData::new(PatternKind::Surface(surface)))
            }
        }
    }

    pub fn pattern_create_linear(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> NativePtr {
        self.log("cairo_pattern_create_linear");
        self.insert(PatternData::new(PatternKind::Linear {
            points: (x0, y0, x1, y1),
            stops: Vec::new(),
        }))
    }

    pub fn pattern_create_radial(&self, cx0: f64, cy0: f64, r0: f64, cx1: f64, cy1: f64, r1: f64) -> NativePtr {
        self.log("cairo_pattern_create_radial");
        self.insert(PatternData::new(PatternKind::Radial {
            circles: (cx0, cy0, r0, cx1, cy1, r1),
            stops: Vec::new(),
        }))
    }

    pub fn pattern_get_type(&self, pattern: NativePtr) -> PatternType {
        self.log("cairo_pattern_get_type");
        self.with(pattern, PatternData::pattern_type).unwrap_or_default()
    }

    pub fn pattern_add_color_stop_rgb(&self, pattern: NativePtr, offset: f64, red: f64, green: f64, blue: f64) {
        self.log("cairo_pattern_add_color_stop_rgb");
        self.add_color_stop(pattern, offset, Rgba::new(red, green, blue, 1.0));
    }

    pub fn pattern_add_color_stop_rgba(
        &self,
        pattern: NativePtr,
        offset: f64,
        red: f64,
        green: f64,
        blue: f64,
        alpha: f64,
    ) {
        self.log("cairo_pattern_add_color_stop_rgba");
        self.add_color_stop(pattern, offset, Rgba::new(red, green, blue, alpha));
    }

    fn add_color_stop(&self, pattern: NativePtr, offset: f64, color: Rgba) {
        self.with_mut(pattern, |p: &mut PatternData, _| {
            if !p.status.is_success() {
                return;
            }
            match &mut p.kind {
                PatternKind::Linear { stops, .. } | PatternKind::Radial { stops, .. } => {
                    let offset = offset.clamp(0.0, 1.0);
                    // Stops with equal offsets keep their insertion order.
                    let at = stops.partition_point(|s| s.offset <= offset);
                    stops.insert(at, ColorStop { offset, color });
                }
                _ => p.status.set_sticky(Status::PatternTypeMismatch),
            }
        });
    }

    pub fn pattern_get_color_stop_count(&self, pattern: NativePtr) -> Result<usize, Status> {
        self.log("cairo_pattern_get_color_stop_count");
        self.with(pattern, |p: &PatternData| p.stops().map(Vec::len))
            .unwrap_or(Err(Status::NullPointer))
    }

    pub fn pattern_get_color_stop_rgba(&self, pattern: NativePtr, index: usize) -> Result<ColorStop, Status> {
        self.log("cairo_pattern_get_color_stop_rgba");
        self.with(pattern, |p: &PatternData| {
            p.stops()?.get(index).copied().ok_or(Status::InvalidIndex)
        })
        .unwrap_or(Err(Status::NullPointer))
    }

    pub fn pattern_get_rgba(&self, pattern: NativePtr) -> Result<Rgba, Status> {
        self.log("cairo_pattern_get_rgba");
        self.with(pattern, |p: &PatternData| match p.kind {
            PatternKind::Solid(color) => Ok(color),
            _ => Err(Status::PatternTypeMismatch),
        })
        .unwrap_or(Err(Status::NullPointer))
    }

    /// Surface of a surface pattern. The pointer is borrowed.
    pub fn pattern_get_surface(&self, pattern: NativePtr) -> Result<NativePtr, Status> {
        self.log("cairo_pattern_get_surface");
        self.with(pattern, |p: &PatternData| match p.kind {
            PatternKind::Surface(surface) => Ok(surface),
            _ => Err(Status::PatternTypeMismatch),
        })
        .unwrap_or(Err(Status::NullPointer))
    }

    pub fn pattern_get_linear_points(&self, pattern: NativePtr) -> Result<(f64, f64, f64, f64), Status> {
        self.log("cairo_pattern_get_linear_points");
        self.with(pattern, |p: &PatternData| match p.kind {
            PatternKind::Linear { points, .. } => Ok(points),
            _ => Err(Status::PatternTypeMismatch),
        })
        .unwrap_or(Err(Status::NullPointer))
    }

    pub fn pattern_get_radial_circles(&self, pattern: NativePtr) -> Result<(f64, f64, f64, f64, f64, f64), Status> {
        self.log("cairo_pattern_get_radial_circles");
        self.with(pattern, |p: &PatternData| match p.kind {
            PatternKind::Radial { circles, .. } => Ok(circles),
            _ => Err(Status::PatternTypeMismatch),
        })
        .unwrap_or(Err(Status::NullPointer))
    }

    pub fn pattern_set_extend(&self, pattern: NativePtr, extend: Extend) {
        self.log("cairo_pattern_set_extend");
        self.with_mut(pattern, |p: &mut PatternData, _| p.extend = extend);
    }

    pub fn pattern_get_extend(&self, pattern: NativePtr) -> Extend {
        self.log("cairo_pattern_get_extend");
        self.with(pattern, |p: &PatternData| p.extend).unwrap_or_default()
    }

    pub fn pattern_set_filter(&self, pattern: NativePtr, filter: Filter) {
        self.log("cairo_pattern_set_filter");
        self.with_mut(pattern, |p: &mut PatternData, _| p.filter = filter);
    }

    pub fn pattern_get_filter(&self, pattern: NativePtr) -> Filter {
        self.log("cairo_pattern_get_filter");
        self.with(pattern, |p: &PatternData| p.filter).unwrap_or_default()
    }

    pub fn pattern_set_matrix(&self, pattern: NativePtr, matrix: &Matrix) {
        self.log("cairo_pattern_set_matrix");
        self.with_mut(pattern, |p: &mut PatternData, _| {
            if matrix.is_invertible() {
                p.matrix = *matrix;
            } else {
                p.status.set_sticky(Status::InvalidMatrix);
            }
        });
    }

    pub fn pattern_get_matrix(&self, pattern: NativePtr) -> Matrix {
        self.log("cairo_pattern_get_matrix");
        self.with(pattern, |p: &PatternData| p.matrix).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    #[test]
    fn test_color_stops_sorted_by_offset() {
        let cairo = Cairo::new();
        let p = cairo.pattern_create_linear(0.0, 0.0, 1.0, 1.0);
        cairo.pattern_add_color_stop_rgb(p, 1.0, 0.0, 0.0, 1.0);
        cairo.pattern_add_color_stop_rgb(p, 0.0, 1.0, 0.0, 0.0);
        cairo.pattern_add_color_stop_rgba(p, 0.5, 0.0, 1.0, 0.0, 0.5);
        assert_eq!(cairo.pattern_get_color_stop_count(p), Ok(3));
        let offsets: Vec<f64> = (0..3)
            .map(|i| cairo.pattern_get_color_stop_rgba(p, i).unwrap().offset)
            .collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
        assert_eq!(cairo.pattern_get_color_stop_rgba(p, 3), Err(Status::InvalidIndex));
    }

    #[test]
    fn test_stop_on_solid_pattern_is_sticky_error() {
        let cairo = Cairo::new();
        let p = cairo.pattern_create_rgb(1.0, 1.0, 1.0);
        cairo.pattern_add_color_stop_rgb(p, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(cairo.status(p), Status::PatternTypeMismatch);
    }

    #[test]
    fn test_surface_pattern_defaults_and_ownership() {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create(Format::Argb32, 2, 2);
        let p = cairo.pattern_create_for_surface(surface);
        assert_eq!(cairo.pattern_get_extend(p), Extend::None);
        assert_eq!(cairo.pattern_get_surface(p), Ok(surface));
        assert_eq!(cairo.reference_count(surface), 2);
        cairo.destroy(p);
        assert_eq!(cairo.reference_count(surface), 1);
    }

    #[test]
    fn test_type_specific_getters() {
        let cairo = Cairo::new();
        let p = cairo.pattern_create_radial(0.0, 0.0, 1.0, 2.0, 2.0, 3.0);
        assert_eq!(cairo.pattern_get_extend(p), Extend::Pad);
        assert_eq!(cairo.pattern_get_rgba(p), Err(Status::PatternTypeMismatch));
        assert_eq!(cairo.pattern_get_radial_circles(p), Ok((0.0, 0.0, 1.0, 2.0, 2.0, 3.0)));
    }

    #[test]
    fn test_singular_pattern_matrix() {
        let cairo = Cairo::new();
        let p = cairo.pattern_create_rgb(0.0, 0.0, 0.0);
        cairo.pattern_set_matrix(p, &Matrix::scaling(0.0, 0.0));
        assert_eq!(cairo.status(p), Status::InvalidMatrix);
    }
}
