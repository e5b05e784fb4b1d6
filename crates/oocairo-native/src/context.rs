//! Drawing contexts.
//!
//! A context owns a stack of graphics states, the current path (in device
//! space) and a stack of groups. Operations on a context in an error state
//! are silent no-ops; the first failure is kept as the sticky status.

use std::mem;

use crate::cairo::{NativePtr, Refs, Resource};
use crate::font::{FontFaceData, FontOptions, ScaledFontData};
use crate::path::{Path, PathData, PathOp, Point, point_in_fill, point_on_stroke};
use crate::pattern::PatternData;
use crate::surface::SurfaceData;
use crate::{
    Antialias, Cairo, Content, DrawKind, DrawOp, Extents, FillRule, FontExtents, FontSlant, FontWeight, Glyph,
    LineCap, LineJoin, Matrix, Operator, PathSegment, Rgba, Status, TextCluster, TextClusterFlags, TextExtents,
};

/// Half-size of the area reported for unbounded surfaces.
const UNBOUNDED: f64 = 8_388_608.0;

const TOLERANCE_MINIMUM: f64 = 1.0 / 256.0;

#[derive(Debug, Clone)]
pub(crate) struct Gstate {
    operator: Operator,
    tolerance: f64,
    antialias: Antialias,
    fill_rule: FillRule,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    dash: Vec<f64>,
    dash_offset: f64,
    ctm: Matrix,
    source: NativePtr,
    target: NativePtr,
    font_face: Option<NativePtr>,
    font_matrix: Matrix,
    font_options: FontOptions,
    scaled_font: Option<NativePtr>,
    /// Clip box in device space.
    clip: Option<Extents>,
}

impl Gstate {
    fn new(source: NativePtr, target: NativePtr) -> Self {
        Self {
            operator: Operator::Over,
            tolerance: 0.1,
            antialias: Antialias::Default,
            fill_rule: FillRule::Winding,
            line_width: 2.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_offset: 0.0,
            ctm: Matrix::identity(),
            source,
            target,
            font_face: None,
            font_matrix: Matrix::scaling(10.0, 10.0),
            font_options: FontOptions::default(),
            scaled_font: None,
            clip: None,
        }
    }

    fn refs(&self) -> impl Iterator<Item = NativePtr> + use<> {
        [Some(self.source), Some(self.target), self.font_face, self.scaled_font]
            .into_iter()
            .flatten()
    }

    fn to_device(&self, x: f64, y: f64) -> Point {
        self.ctm.transform_point(x, y)
    }

    fn to_user(&self, x: f64, y: f64) -> Point {
        self.ctm.invert().map_or((x, y), |inv| inv.transform_point(x, y))
    }

    /// Bounding box in user space of a device-space box.
    fn box_to_user(&self, ext: Extents) -> Extents {
        let Ok(inv) = self.ctm.invert() else {
            return ext;
        };
        Extents::from_points(ext.corners().map(|(x, y)| inv.transform_point(x, y))).unwrap_or(ext)
    }

    fn half_stroke_device(&self) -> f64 {
        let (sx, sy) = self.ctm.scale_factors();
        self.line_width / 2.0 * sx.max(sy)
    }

    fn clip_to(&self, ext: Extents) -> Extents {
        self.clip.map_or(ext, |clip| ext.intersect(&clip))
    }

    fn drop_scaled_font(&mut self, refs: &mut Refs<'_>) {
        if let Some(font) = self.scaled_font.take() {
            refs.release(font);
        }
    }

    /// CTM without its translation, as used for font scaling.
    fn font_ctm(&self) -> Matrix {
        Matrix {
            x0: 0.0,
            y0: 0.0,
            ..self.ctm
        }
    }
}

pub(crate) struct ContextData {
    pub status: Status,
    gstate: Gstate,
    saved: Vec<Gstate>,
    /// Depth of `saved` at each `push_group`.
    groups: Vec<usize>,
    path: Path,
    original_target: NativePtr,
}

impl Resource for ContextData {
    fn status(&self) -> Status {
        self.status
    }

    fn children(&self) -> Vec<NativePtr> {
        let mut children: Vec<NativePtr> = self.gstate.refs().collect();
        children.extend(self.saved.iter().flat_map(Gstate::refs));
        children.push(self.original_target);
        children
    }
}

impl ContextData {
    fn save(&mut self, refs: &mut Refs<'_>) {
        let copy = self.gstate.clone();
        copy.refs().for_each(|ptr| refs.reference(ptr));
        self.saved.push(copy);
    }

    fn restore(&mut self, refs: &mut Refs<'_>) -> Result<(), Status> {
        let floor = self.groups.last().copied().unwrap_or(0);
        if self.saved.len() <= floor {
            return Err(Status::InvalidRestore);
        }
        let Some(previous) = self.saved.pop() else {
            return Err(Status::InvalidRestore);
        };
        let current = mem::replace(&mut self.gstate, previous);
        current.refs().for_each(|ptr| refs.release(ptr));
        Ok(())
    }

    fn fail(&mut self, status: Status) {
        self.status.set_sticky(status);
    }

    fn current_point_user(&self) -> Option<Point> {
        self.path.current_point().map(|(x, y)| self.gstate.to_user(x, y))
    }

    fn path_extents_device(&self) -> Option<Extents> {
        self.path.flat_extents(self.gstate.tolerance)
    }

    fn set_ctm(&mut self, ctm: Matrix, refs: &mut Refs<'_>) {
        if !ctm.is_invertible() {
            self.fail(Status::InvalidMatrix);
            return;
        }
        self.gstate.ctm = ctm;
        self.gstate.drop_scaled_font(refs);
    }
}

impl Cairo {
    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Run `f` on a context that is not in an error state.
    fn ctx<R: Default>(&self, cr: NativePtr, f: impl FnOnce(&mut ContextData, &mut Refs<'_>) -> R) -> R {
        self.with_mut(cr, |c: &mut ContextData, refs| {
            if c.status.is_success() { f(c, refs) } else { R::default() }
        })
        .unwrap_or_default()
    }

    fn ctx_read<R: Default>(&self, cr: NativePtr, f: impl FnOnce(&ContextData) -> R) -> R {
        self.with(cr, f).unwrap_or_default()
    }

    fn live<R>(&self, cr: NativePtr, f: impl FnOnce(&ContextData) -> R) -> Option<R> {
        self.with(cr, |c: &ContextData| c.status.is_success().then(|| f(c)))
            .flatten()
    }

    pub(crate) fn context_fail(&self, cr: NativePtr, status: Status) {
        self.with_mut(cr, |c: &mut ContextData, _| c.fail(status));
    }

    fn record(&self, cr: NativePtr, target: NativePtr, op: DrawOp) {
        if let Err(status) = self.surface_record(target, op) {
            self.context_fail(cr, status);
        }
    }

    pub(crate) fn context_new(&self, target: NativePtr) -> NativePtr {
        let status = self
            .with(target, |s: &SurfaceData| s.status)
            .unwrap_or(Status::NullPointer);
        if status != Status::NullPointer {
            // One reference for the gstate, one for the original target.
            self.retain(target);
            self.retain(target);
        }
        let source = self.pattern_solid(Rgba::new(0.0, 0.0, 0.0, 1.0));
        self.insert(ContextData {
            status,
            gstate: Gstate::new(source, target),
            saved: Vec::new(),
            groups: Vec::new(),
            path: Path::default(),
            original_target: target,
        })
    }

    // ========================================================================
    // Lifecycle and state stack
    // ========================================================================

    /// Create a context drawing on `target`.
    pub fn create(&self, target: NativePtr) -> NativePtr {
        self.log("cairo_create");
        self.context_new(target)
    }

    pub fn save(&self, cr: NativePtr) {
        self.log("cairo_save");
        self.ctx(cr, |c, refs| c.save(refs));
    }

    pub fn restore(&self, cr: NativePtr) {
        self.log("cairo_restore");
        self.ctx(cr, |c, refs| {
            if let Err(status) = c.restore(refs) {
                c.fail(status);
            }
        });
    }

    /// Surface the context was created for. The pointer is borrowed.
    pub fn get_target(&self, cr: NativePtr) -> Option<NativePtr> {
        self.log("cairo_get_target");
        self.with(cr, |c: &ContextData| c.original_target)
    }

    /// Current target, which differs from the original inside a group.
    pub fn get_group_target(&self, cr: NativePtr) -> Option<NativePtr> {
        self.log("cairo_get_group_target");
        self.with(cr, |c: &ContextData| c.gstate.target)
    }

    pub fn push_group(&self, cr: NativePtr) {
        self.log("cairo_push_group");
        self.push_group_internal(cr, Content::ColorAlpha);
    }

    pub fn push_group_with_content(&self, cr: NativePtr, content: Content) {
        self.log("cairo_push_group_with_content");
        self.push_group_internal(cr, content);
    }

    fn push_group_internal(&self, cr: NativePtr, content: Content) {
        let Some(target) = self.live(cr, |c| c.gstate.target) else {
            return;
        };
        let group = self.recording_surface_new(content, self.surface_extents(target));
        let installed = self.ctx(cr, |c, refs| {
            c.save(refs);
            let previous = mem::replace(&mut c.gstate.target, group);
            refs.release(previous);
            c.groups.push(c.saved.len());
            true
        });
        if !installed {
            self.release(group);
        }
    }

    /// End the current group and return it as a surface pattern.
    pub fn pop_group(&self, cr: NativePtr) -> NativePtr {
        self.log("cairo_pop_group");
        self.pop_group_internal(cr)
    }

    fn pop_group_internal(&self, cr: NativePtr) -> NativePtr {
        let popped = self
            .with_mut(cr, |c: &mut ContextData, refs| {
                c.status.into_result()?;
                if c.groups.last() != Some(&c.saved.len()) {
                    c.fail(Status::InvalidPopGroup);
                    return Err(Status::InvalidPopGroup);
                }
                c.groups.pop();
                let group = c.gstate.target;
                refs.reference(group);
                // Lift the floor for the group's own save.
                c.restore(refs)?;
                Ok(group)
            })
            .unwrap_or(Err(Status::NullPointer));
        match popped {
            Ok(group) => {
                let pattern = self.pattern_for_surface(group);
                self.release(group);
                pattern
            }
            Err(status) => self.pattern_error(status),
        }
    }

    pub fn pop_group_to_source(&self, cr: NativePtr) {
        self.log("cairo_pop_group_to_source");
        let pattern = self.pop_group_internal(cr);
        if self.status(pattern).is_success() {
            self.set_source_internal(cr, pattern);
        }
        self.release(pattern);
    }

    // ========================================================================
    // Source
    // ========================================================================

    pub fn set_source(&self, cr: NativePtr, pattern: NativePtr) {
        self.log("cairo_set_source");
        self.set_source_internal(cr, pattern);
    }

    fn set_source_internal(&self, cr: NativePtr, pattern: NativePtr) {
        let status = self
            .with(pattern, |p: &PatternData| p.status)
            .unwrap_or(Status::NullPointer);
        self.ctx(cr, |c, refs| {
            if !status.is_success() {
                c.fail(status);
                return;
            }
            refs.reference(pattern);
            let previous = mem::replace(&mut c.gstate.source, pattern);
            refs.release(previous);
        });
    }

    pub fn set_source_rgb(&self, cr: NativePtr, red: f64, green: f64, blue: f64) {
        self.log("cairo_set_source_rgb");
        let pattern = self.pattern_solid(Rgba::new(red, green, blue, 1.0));
        self.set_source_internal(cr, pattern);
        self.release(pattern);
    }

    pub fn set_source_rgba(&self, cr: NativePtr, red: f64, green: f64, blue: f64, alpha: f64) {
        self.log("cairo_set_source_rgba");
        let pattern = self.pattern_solid(Rgba::new(red, green, blue, alpha));
        self.set_source_internal(cr, pattern);
        self.release(pattern);
    }

    /// Use `surface` as the source, with its origin at user `(x, y)`.
    pub fn set_source_surface(&self, cr: NativePtr, surface: NativePtr, x: f64, y: f64) {
        self.log("cairo_set_source_surface");
        let pattern = self.pattern_for_surface(surface);
        self.with_mut(pattern, |p: &mut PatternData, _| p.matrix = Matrix::translation(-x, -y));
        self.set_source_internal(cr, pattern);
        self.release(pattern);
    }

    /// Current source pattern. The pointer is borrowed.
    pub fn get_source(&self, cr: NativePtr) -> Option<NativePtr> {
        self.log("cairo_get_source");
        self.with(cr, |c: &ContextData| c.gstate.source)
    }

    // ========================================================================
    // Rendering parameters
    // ========================================================================

    pub fn set_antialias(&self, cr: NativePtr, antialias: Antialias) {
        self.log("cairo_set_antialias");
        self.ctx(cr, |c, _| c.gstate.antialias = antialias);
    }

    pub fn get_antialias(&self, cr: NativePtr) -> Antialias {
        self.log("cairo_get_antialias");
        self.ctx_read(cr, |c| c.gstate.antialias)
    }

    /// Set the dash pattern. Lengths must be non-negative and not all zero.
    pub fn set_dash(&self, cr: NativePtr, dashes: &[f64], offset: f64) {
        self.log("cairo_set_dash");
        self.ctx(cr, |c, _| {
            let invalid = dashes.iter().any(|d| *d < 0.0 || !d.is_finite())
                || (!dashes.is_empty() && dashes.iter().all(|d| *d == 0.0));
            if invalid {
                c.fail(Status::InvalidDash);
                return;
            }
            c.gstate.dash = dashes.to_vec();
            c.gstate.dash_offset = offset;
        });
    }

    pub fn get_dash_count(&self, cr: NativePtr) -> usize {
        self.log("cairo_get_dash_count");
        self.ctx_read(cr, |c| c.gstate.dash.len())
    }

    pub fn get_dash(&self, cr: NativePtr) -> (Vec<f64>, f64) {
        self.log("cairo_get_dash");
        self.ctx_read(cr, |c| (c.gstate.dash.clone(), c.gstate.dash_offset))
    }

    pub fn set_fill_rule(&self, cr: NativePtr, rule: FillRule) {
        self.log("cairo_set_fill_rule");
        self.ctx(cr, |c, _| c.gstate.fill_rule = rule);
    }

    pub fn get_fill_rule(&self, cr: NativePtr) -> FillRule {
        self.log("cairo_get_fill_rule");
        self.ctx_read(cr, |c| c.gstate.fill_rule)
    }

    pub fn set_line_cap(&self, cr: NativePtr, cap: LineCap) {
        self.log("cairo_set_line_cap");
        self.ctx(cr, |c, _| c.gstate.line_cap = cap);
    }

    pub fn get_line_cap(&self, cr: NativePtr) -> LineCap {
        self.log("cairo_get_line_cap");
        self.ctx_read(cr, |c| c.gstate.line_cap)
    }

    pub fn set_line_join(&self, cr: NativePtr, join: LineJoin) {
        self.log("cairo_set_line_join");
        self.ctx(cr, |c, _| c.gstate.line_join = join);
    }

    pub fn get_line_join(&self, cr: NativePtr) -> LineJoin {
        self.log("cairo_get_line_join");
        self.ctx_read(cr, |c| c.gstate.line_join)
    }

    pub fn set_line_width(&self, cr: NativePtr, width: f64) {
        self.log("cairo_set_line_width");
        self.ctx(cr, |c, _| c.gstate.line_width = width.max(0.0));
    }

    pub fn get_line_width(&self, cr: NativePtr) -> f64 {
        self.log("cairo_get_line_width");
        self.ctx_read(cr, |c| c.gstate.line_width)
    }

    pub fn set_miter_limit(&self, cr: NativePtr, limit: f64) {
        self.log("cairo_set_miter_limit");
        self.ctx(cr, |c, _| c.gstate.miter_limit = limit);
    }

    pub fn get_miter_limit(&self, cr: NativePtr) -> f64 {
        self.log("cairo_get_miter_limit");
        self.ctx_read(cr, |c| c.gstate.miter_limit)
    }

    pub fn set_operator(&self, cr: NativePtr, operator: Operator) {
        self.log("cairo_set_operator");
        self.ctx(cr, |c, _| c.gstate.operator = operator);
    }

    pub fn get_operator(&self, cr: NativePtr) -> Operator {
        self.log("cairo_get_operator");
        self.ctx_read(cr, |c| c.gstate.operator)
    }

    pub fn set_tolerance(&self, cr: NativePtr, tolerance: f64) {
        self.log("cairo_set_tolerance");
        self.ctx(cr, |c, _| c.gstate.tolerance = tolerance.max(TOLERANCE_MINIMUM));
    }

    pub fn get_tolerance(&self, cr: NativePtr) -> f64 {
        self.log("cairo_get_tolerance");
        self.ctx_read(cr, |c| c.gstate.tolerance)
    }

    // ========================================================================
    // Transformations
    // ========================================================================

    pub fn translate(&self, cr: NativePtr, tx: f64, ty: f64) {
        self.log("cairo_translate");
        self.ctx(cr, |c, refs| {
            let mut ctm = c.gstate.ctm;
            ctm.translate(tx, ty);
            c.set_ctm(ctm, refs);
        });
    }

    pub fn scale(&self, cr: NativePtr, sx: f64, sy: f64) {
        self.log("cairo_scale");
        self.ctx(cr, |c, refs| {
            let mut ctm = c.gstate.ctm;
            ctm.scale(sx, sy);
            c.set_ctm(ctm, refs);
        });
    }

    pub fn rotate(&self, cr: NativePtr, radians: f64) {
        self.log("cairo_rotate");
        self.ctx(cr, |c, refs| {
            let mut ctm = c.gstate.ctm;
            ctm.rotate(radians);
            c.set_ctm(ctm, refs);
        });
    }

    /// Prepend `matrix` to the CTM.
    pub fn transform(&self, cr: NativePtr, matrix: &Matrix) {
        self.log("cairo_transform");
        self.ctx(cr, |c, refs| {
            let ctm = Matrix::multiply(matrix, &c.gstate.ctm);
            c.set_ctm(ctm, refs);
        });
    }

    pub fn set_matrix(&self, cr: NativePtr, matrix: &Matrix) {
        self.log("cairo_set_matrix");
        self.ctx(cr, |c, refs| c.set_ctm(*matrix, refs));
    }

    pub fn get_matrix(&self, cr: NativePtr) -> Matrix {
        self.log("cairo_get_matrix");
        self.ctx_read(cr, |c| c.gstate.ctm)
    }

    pub fn identity_matrix(&self, cr: NativePtr) {
        self.log("cairo_identity_matrix");
        self.ctx(cr, |c, refs| c.set_ctm(Matrix::identity(), refs));
    }

    pub fn user_to_device(&self, cr: NativePtr, x: f64, y: f64) -> (f64, f64) {
        self.log("cairo_user_to_device");
        self.ctx_read(cr, |c| c.gstate.to_device(x, y))
    }

    pub fn user_to_device_distance(&self, cr: NativePtr, dx: f64, dy: f64) -> (f64, f64) {
        self.log("cairo_user_to_device_distance");
        self.ctx_read(cr, |c| c.gstate.ctm.transform_distance(dx, dy))
    }

    pub fn device_to_user(&self, cr: NativePtr, x: f64, y: f64) -> (f64, f64) {
        self.log("cairo_device_to_user");
        self.ctx_read(cr, |c| c.gstate.to_user(x, y))
    }

    pub fn device_to_user_distance(&self, cr: NativePtr, dx: f64, dy: f64) -> (f64, f64) {
        self.log("cairo_device_to_user_distance");
        self.ctx_read(cr, |c| {
            c.gstate
                .ctm
                .invert()
                .map_or((dx, dy), |inv| inv.transform_distance(dx, dy))
        })
    }

    // ========================================================================
    // Path construction
    // ========================================================================

    pub fn new_path(&self, cr: NativePtr) {
        self.log("cairo_new_path");
        self.ctx(cr, |c, _| c.path.clear());
    }

    pub fn new_sub_path(&self, cr: NativePtr) {
        self.log("cairo_new_sub_path");
        self.ctx(cr, |c, _| c.path.new_sub_path());
    }

    pub fn move_to(&self, cr: NativePtr, x: f64, y: f64) {
        self.log("cairo_move_to");
        self.ctx(cr, |c, _| {
            let p = c.gstate.to_device(x, y);
            c.path.move_to(p);
        });
    }

    pub fn line_to(&self, cr: NativePtr, x: f64, y: f64) {
        self.log("cairo_line_to");
        self.ctx(cr, |c, _| {
            let p = c.gstate.to_device(x, y);
            c.path.line_to(p);
        });
    }

    pub fn curve_to(&self, cr: NativePtr, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.log("cairo_curve_to");
        self.ctx(cr, |c, _| {
            let g = &c.gstate;
            let (p1, p2, p3) = (g.to_device(x1, y1), g.to_device(x2, y2), g.to_device(x3, y3));
            c.path.curve_to(p1, p2, p3);
        });
    }

    pub fn arc(&self, cr: NativePtr, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64) {
        self.log("cairo_arc");
        self.arc_internal(cr, xc, yc, radius, angle1, angle2, false);
    }

    pub fn arc_negative(&self, cr: NativePtr, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64) {
        self.log("cairo_arc_negative");
        self.arc_internal(cr, xc, yc, radius, angle1, angle2, true);
    }

    #[allow(clippy::too_many_arguments)]
    fn arc_internal(&self, cr: NativePtr, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64, negative: bool) {
        self.ctx(cr, |c, _| {
            let ctm = c.gstate.ctm;
            let result = c.path.arc(
                |x, y| ctm.transform_point(x, y),
                (xc, yc),
                radius,
                angle1,
                angle2,
                negative,
            );
            if let Err(status) = result {
                c.fail(status);
            }
        });
    }

    fn relative(&self, cr: NativePtr, f: impl FnOnce(&mut ContextData, Point, &Matrix)) {
        self.ctx(cr, |c, _| {
            let Some(current) = c.path.current_point() else {
                c.fail(Status::NoCurrentPoint);
                return;
            };
            let ctm = c.gstate.ctm;
            f(c, current, &ctm);
        });
    }

    pub fn rel_move_to(&self, cr: NativePtr, dx: f64, dy: f64) {
        self.log("cairo_rel_move_to");
        self.relative(cr, |c, (x, y), ctm| {
            let (dx, dy) = ctm.transform_distance(dx, dy);
            c.path.move_to((x + dx, y + dy));
        });
    }

    pub fn rel_line_to(&self, cr: NativePtr, dx: f64, dy: f64) {
        self.log("cairo_rel_line_to");
        self.relative(cr, |c, (x, y), ctm| {
            let (dx, dy) = ctm.transform_distance(dx, dy);
            c.path.line_to((x + dx, y + dy));
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rel_curve_to(&self, cr: NativePtr, dx1: f64, dy1: f64, dx2: f64, dy2: f64, dx3: f64, dy3: f64) {
        self.log("cairo_rel_curve_to");
        self.relative(cr, |c, (x, y), ctm| {
            let offset = |dx: f64, dy: f64| {
                let (dx, dy) = ctm.transform_distance(dx, dy);
                (x + dx, y + dy)
            };
            c.path.curve_to(offset(dx1, dy1), offset(dx2, dy2), offset(dx3, dy3));
        });
    }

    pub fn rectangle(&self, cr: NativePtr, x: f64, y: f64, width: f64, height: f64) {
        self.log("cairo_rectangle");
        self.ctx(cr, |c, _| {
            let g = &c.gstate;
            let corners = [
                g.to_device(x, y),
                g.to_device(x + width, y),
                g.to_device(x + width, y + height),
                g.to_device(x, y + height),
            ];
            c.path.move_to(corners[0]);
            for corner in &corners[1..] {
                c.path.line_to(*corner);
            }
            c.path.close_path();
        });
    }

    pub fn close_path(&self, cr: NativePtr) {
        self.log("cairo_close_path");
        self.ctx(cr, |c, _| c.path.close_path());
    }

    /// Current point in user space, `(0, 0)` when there is none.
    pub fn get_current_point(&self, cr: NativePtr) -> (f64, f64) {
        self.log("cairo_get_current_point");
        self.ctx_read(cr, |c| c.current_point_user().unwrap_or_default())
    }

    pub fn has_current_point(&self, cr: NativePtr) -> bool {
        self.log("cairo_has_current_point");
        self.ctx_read(cr, |c| c.path.current_point().is_some())
    }

    /// Copy of the current path in user space.
    pub fn copy_path(&self, cr: NativePtr) -> NativePtr {
        self.log("cairo_copy_path");
        let segments = self
            .with(cr, |c: &ContextData| {
                c.status.into_result()?;
                let user = |p: Point| c.gstate.to_user(p.0, p.1);
                Ok(c.path
                    .ops()
                    .iter()
                    .map(|op| match *op {
                        PathOp::MoveTo(p) => {
                            let (x, y) = user(p);
                            PathSegment::MoveTo(x, y)
                        }
                        PathOp::LineTo(p) => {
                            let (x, y) = user(p);
                            PathSegment::LineTo(x, y)
                        }
                        PathOp::CurveTo(a, b, d) => {
                            let ((x1, y1), (x2, y2), (x3, y3)) = (user(a), user(b), user(d));
                            PathSegment::CurveTo(x1, y1, x2, y2, x3, y3)
                        }
                        PathOp::ClosePath => PathSegment::ClosePath,
                    })
                    .collect())
            })
            .unwrap_or(Err(Status::NullPointer));
        match segments {
            Ok(segments) => self.path_create(segments),
            Err(status) => self.path_create_error(status),
        }
    }

    /// Copy of the current path with curves flattened to lines.
    pub fn copy_path_flat(&self, cr: NativePtr) -> NativePtr {
        self.log("cairo_copy_path_flat");
        let segments = self
            .with(cr, |c: &ContextData| {
                c.status.into_result()?;
                let mut segments = Vec::new();
                for line in c.path.flatten(c.gstate.tolerance) {
                    for (i, &(x, y)) in line.points.iter().enumerate() {
                        let (x, y) = c.gstate.to_user(x, y);
                        segments.push(if i == 0 { PathSegment::MoveTo(x, y) } else { PathSegment::LineTo(x, y) });
                    }
                    if let Some(&(x, y)) = line.points.first().filter(|_| line.closed) {
                        let (x, y) = c.gstate.to_user(x, y);
                        segments.push(PathSegment::ClosePath);
                        segments.push(PathSegment::MoveTo(x, y));
                    }
                }
                Ok(segments)
            })
            .unwrap_or(Err(Status::NullPointer));
        match segments {
            Ok(segments) => self.path_create(segments),
            Err(status) => self.path_create_error(status),
        }
    }

    /// Append a copied path, interpreting its coordinates in user space.
    pub fn append_path(&self, cr: NativePtr, path: NativePtr) {
        self.log("cairo_append_path");
        let source = self
            .with(path, |p: &PathData| p.status.into_result().map(|_| p.segments.clone()))
            .unwrap_or(Err(Status::NullPointer));
        self.ctx(cr, |c, _| {
            let segments = match source {
                Ok(segments) => segments,
                Err(status) => {
                    c.fail(status);
                    return;
                }
            };
            for segment in segments {
                let g = &c.gstate;
                match segment {
                    PathSegment::MoveTo(x, y) => {
                        let p = g.to_device(x, y);
                        c.path.move_to(p);
                    }
                    PathSegment::LineTo(x, y) => {
                        let p = g.to_device(x, y);
                        c.path.line_to(p);
                    }
                    PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                        let (p1, p2, p3) = (g.to_device(x1, y1), g.to_device(x2, y2), g.to_device(x3, y3));
                        c.path.curve_to(p1, p2, p3);
                    }
                    PathSegment::ClosePath => c.path.close_path(),
                }
            }
        });
    }

    /// Bounding box of the current path in user space, as `(x1, y1, x2, y2)`.
    pub fn path_extents(&self, cr: NativePtr) -> (f64, f64, f64, f64) {
        self.log("cairo_path_extents");
        self.ctx_read(cr, |c| {
            let ext = c.path_extents_device().map(|e| c.gstate.box_to_user(e));
            ext.map(|e| (e.x1, e.y1, e.x2, e.y2)).unwrap_or_default()
        })
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    fn paint_op(&self, cr: NativePtr, kind: DrawKind) {
        let Some((target, operator, clip)) = self.live(cr, |c| (c.gstate.target, c.gstate.operator, c.gstate.clip))
        else {
            return;
        };
        let extents = match (clip, self.surface_extents(target)) {
            (Some(clip), Some(bounds)) => Some(clip.intersect(&bounds)),
            (Some(clip), None) => Some(clip),
            (None, bounds) => bounds,
        };
        self.record(cr, target, DrawOp { kind, operator, extents });
    }

    pub fn paint(&self, cr: NativePtr) {
        self.log("cairo_paint");
        self.paint_op(cr, DrawKind::Paint);
    }

    pub fn paint_with_alpha(&self, cr: NativePtr, _alpha: f64) {
        self.log("cairo_paint_with_alpha");
        self.paint_op(cr, DrawKind::Paint);
    }

    pub fn mask(&self, cr: NativePtr, pattern: NativePtr) {
        self.log("cairo_mask");
        let status = self.with(pattern, |p: &PatternData| p.status).unwrap_or(Status::NullPointer);
        if !status.is_success() {
            self.context_fail(cr, status);
            return;
        }
        self.paint_op(cr, DrawKind::Mask);
    }

    /// Mask with `surface` placed at user `(x, y)`.
    pub fn mask_surface(&self, cr: NativePtr, surface: NativePtr, x: f64, y: f64) {
        self.log("cairo_mask_surface");
        let pattern = self.pattern_for_surface(surface);
        self.with_mut(pattern, |p: &mut PatternData, _| p.matrix = Matrix::translation(-x, -y));
        let status = self.status(pattern);
        if status.is_success() {
            self.paint_op(cr, DrawKind::Mask);
        } else {
            self.context_fail(cr, status);
        }
        self.release(pattern);
    }

    fn path_op(&self, cr: NativePtr, kind: DrawKind, preserve: bool) {
        let drawn = self.ctx(cr, |c, _| {
            let extents = c.path_extents_device().map(|e| {
                let e = if kind == DrawKind::Stroke { e.grow(c.gstate.half_stroke_device()) } else { e };
                c.gstate.clip_to(e)
            });
            if !preserve {
                c.path.clear();
            }
            extents.map(|extents| {
                (
                    c.gstate.target,
                    DrawOp {
                        kind,
                        operator: c.gstate.operator,
                        extents: Some(extents),
                    },
                )
            })
        });
        if let Some((target, op)) = drawn {
            self.record(cr, target, op);
        }
    }

    pub fn stroke(&self, cr: NativePtr) {
        self.log("cairo_stroke");
        self.path_op(cr, DrawKind::Stroke, false);
    }

    pub fn stroke_preserve(&self, cr: NativePtr) {
        self.log("cairo_stroke_preserve");
        self.path_op(cr, DrawKind::Stroke, true);
    }

    pub fn fill(&self, cr: NativePtr) {
        self.log("cairo_fill");
        self.path_op(cr, DrawKind::Fill, false);
    }

    pub fn fill_preserve(&self, cr: NativePtr) {
        self.log("cairo_fill_preserve");
        self.path_op(cr, DrawKind::Fill, true);
    }

    fn clip_op(&self, cr: NativePtr, preserve: bool) {
        self.ctx(cr, |c, _| {
            let area = c.path_extents_device().unwrap_or_default();
            c.gstate.clip = Some(c.gstate.clip_to(area));
            if !preserve {
                c.path.clear();
            }
        });
    }

    pub fn clip(&self, cr: NativePtr) {
        self.log("cairo_clip");
        self.clip_op(cr, false);
    }

    pub fn clip_preserve(&self, cr: NativePtr) {
        self.log("cairo_clip_preserve");
        self.clip_op(cr, true);
    }

    pub fn reset_clip(&self, cr: NativePtr) {
        self.log("cairo_reset_clip");
        self.ctx(cr, |c, _| c.gstate.clip = None);
    }

    /// Clip area in user space, as `(x1, y1, x2, y2)`.
    pub fn clip_extents(&self, cr: NativePtr) -> (f64, f64, f64, f64) {
        self.log("cairo_clip_extents");
        let Some((target, clip)) = self.with(cr, |c: &ContextData| (c.gstate.target, c.gstate.clip)) else {
            return Default::default();
        };
        let bounds = self
            .surface_extents(target)
            .unwrap_or(Extents::new(-UNBOUNDED, -UNBOUNDED, UNBOUNDED, UNBOUNDED));
        let area = clip.map_or(bounds, |clip| clip.intersect(&bounds));
        self.ctx_read(cr, |c| {
            let e = c.gstate.box_to_user(area);
            (e.x1, e.y1, e.x2, e.y2)
        })
    }

    pub fn fill_extents(&self, cr: NativePtr) -> (f64, f64, f64, f64) {
        self.log("cairo_fill_extents");
        self.ctx_read(cr, |c| {
            c.path_extents_device()
                .map(|e| c.gstate.box_to_user(e))
                .map(|e| (e.x1, e.y1, e.x2, e.y2))
                .unwrap_or_default()
        })
    }

    pub fn stroke_extents(&self, cr: NativePtr) -> (f64, f64, f64, f64) {
        self.log("cairo_stroke_extents");
        self.ctx_read(cr, |c| {
            c.path_extents_device()
                .map(|e| c.gstate.box_to_user(e.grow(c.gstate.half_stroke_device())))
                .map(|e| (e.x1, e.y1, e.x2, e.y2))
                .unwrap_or_default()
        })
    }

    pub fn in_fill(&self, cr: NativePtr, x: f64, y: f64) -> bool {
        self.log("cairo_in_fill");
        self.ctx_read(cr, |c| {
            let lines = c.path.flatten(c.gstate.tolerance);
            point_in_fill(&lines, c.gstate.to_device(x, y), c.gstate.fill_rule)
        })
    }

    pub fn in_stroke(&self, cr: NativePtr, x: f64, y: f64) -> bool {
        self.log("cairo_in_stroke");
        self.ctx_read(cr, |c| {
            let lines = c.path.flatten(c.gstate.tolerance);
            point_on_stroke(&lines, c.gstate.to_device(x, y), c.gstate.half_stroke_device())
        })
    }

    pub fn in_clip(&self, cr: NativePtr, x: f64, y: f64) -> bool {
        self.log("cairo_in_clip");
        self.ctx_read(cr, |c| {
            let (dx, dy) = c.gstate.to_device(x, y);
            c.gstate.clip.is_none_or(|clip| clip.contains(dx, dy))
        })
    }

    // ========================================================================
    // Fonts
    // ========================================================================

    fn set_font_face_internal(&self, cr: NativePtr, face: NativePtr) {
        let status = self.with(face, |f: &FontFaceData| f.status).unwrap_or(Status::NullPointer);
        self.ctx(cr, |c, refs| {
            if !status.is_success() {
                c.fail(status);
                return;
            }
            refs.reference(face);
            if let Some(previous) = c.gstate.font_face.replace(face) {
                refs.release(previous);
            }
            c.gstate.drop_scaled_font(refs);
        });
    }

    pub fn select_font_face(&self, cr: NativePtr, family: &str, slant: FontSlant, weight: FontWeight) {
        self.log("cairo_select_font_face");
        let face = self.insert(FontFaceData::toy(family, slant, weight));
        self.set_font_face_internal(cr, face);
        self.release(face);
    }

    pub fn set_font_face(&self, cr: NativePtr, face: NativePtr) {
        self.log("cairo_set_font_face");
        self.set_font_face_internal(cr, face);
    }

    /// Current font face, creating the default face on first use. The pointer
    /// is borrowed.
    pub fn get_font_face(&self, cr: NativePtr) -> Option<NativePtr> {
        self.log("cairo_get_font_face");
        self.context_font_face(cr)
    }

    fn context_font_face(&self, cr: NativePtr) -> Option<NativePtr> {
        let current = self.with(cr, |c: &ContextData| c.gstate.font_face)?;
        if current.is_some() {
            return current;
        }
        let face = self.default_font_face();
        let installed = self.with_mut(cr, |c: &mut ContextData, refs| match c.gstate.font_face {
            Some(existing) => {
                refs.release(face);
                existing
            }
            None => {
                c.gstate.font_face = Some(face);
                face
            }
        });
        if installed.is_none() {
            self.release(face);
        }
        installed
    }

    pub fn set_font_size(&self, cr: NativePtr, size: f64) {
        self.log("cairo_set_font_size");
        self.ctx(cr, |c, refs| {
            c.gstate.font_matrix = Matrix::scaling(size, size);
            c.gstate.drop_scaled_font(refs);
        });
    }

    pub fn set_font_matrix(&self, cr: NativePtr, matrix: &Matrix) {
        self.log("cairo_set_font_matrix");
        self.ctx(cr, |c, refs| {
            if !matrix.is_invertible() {
                c.fail(Status::InvalidMatrix);
                return;
            }
            c.gstate.font_matrix = *matrix;
            c.gstate.drop_scaled_font(refs);
        });
    }

    pub fn get_font_matrix(&self, cr: NativePtr) -> Matrix {
        self.log("cairo_get_font_matrix");
        self.ctx_read(cr, |c| c.gstate.font_matrix)
    }

    pub fn set_font_options(&self, cr: NativePtr, options: NativePtr) {
        self.log("cairo_set_font_options");
        let value = self.font_options_get(options);
        self.ctx(cr, |c, refs| {
            c.gstate.font_options = value;
            c.gstate.drop_scaled_font(refs);
        });
    }

    /// Copy the context's font options into `options`.
    pub fn get_font_options(&self, cr: NativePtr, options: NativePtr) {
        self.log("cairo_get_font_options");
        let value = self.ctx_read(cr, |c| c.gstate.font_options);
        self.font_options_set(options, |o| *o = value);
    }

    pub fn set_scaled_font(&self, cr: NativePtr, scaled_font: NativePtr) {
        self.log("cairo_set_scaled_font");
        let Some((status, face, font_matrix, ctm, options)) = self.with(scaled_font, |s: &ScaledFontData| {
            (s.status, s.face, s.font_matrix, s.ctm, s.options)
        }) else {
            self.context_fail(cr, Status::NullPointer);
            return;
        };
        if !status.is_success() {
            self.context_fail(cr, status);
            return;
        }
        self.set_font_face_internal(cr, face);
        self.ctx(cr, |c, refs| {
            c.gstate.font_matrix = font_matrix;
            c.gstate.font_options = options;
            c.gstate.drop_scaled_font(refs);
            if ctm == c.gstate.font_ctm() {
                refs.reference(scaled_font);
                c.gstate.scaled_font = Some(scaled_font);
            }
        });
    }

    /// Scaled font for the current font state. The pointer is borrowed.
    pub fn get_scaled_font(&self, cr: NativePtr) -> Result<NativePtr, Status> {
        self.log("cairo_get_scaled_font");
        self.context_scaled_font(cr)
    }

    pub(crate) fn context_scaled_font(&self, cr: NativePtr) -> Result<NativePtr, Status> {
        let face = self.context_font_face(cr).ok_or(Status::NullPointer)?;
        let (cached, font_matrix, ctm, options) = self
            .with(cr, |c: &ContextData| {
                c.status.into_result()?;
                let g = &c.gstate;
                Ok((g.scaled_font, g.font_matrix, g.font_ctm(), g.font_options))
            })
            .unwrap_or(Err(Status::NullPointer))?;
        if let Some(font) = cached {
            return Ok(font);
        }

        // Creation may run user font hooks, so no borrow is held here.
        let font = self.scaled_font_new(face, &font_matrix, &ctm, &options);
        let status = self.status(font);
        if !status.is_success() {
            self.release(font);
            return Err(status);
        }
        let installed = self.with_mut(cr, |c: &mut ContextData, refs| {
            if let Some(previous) = c.gstate.scaled_font.replace(font) {
                refs.release(previous);
            }
        });
        if installed.is_none() {
            self.release(font);
            return Err(Status::NullPointer);
        }
        Ok(font)
    }

    /// Scaled font and current point for a text operation; failures are
    /// recorded on the context.
    fn text_setup(&self, cr: NativePtr) -> Option<(NativePtr, Point)> {
        let origin = self.live(cr, |c| c.current_point_user().unwrap_or_default())?;
        match self.context_scaled_font(cr) {
            Ok(font) => Some((font, origin)),
            Err(status) => {
                self.context_fail(cr, status);
                None
            }
        }
    }

    /// Record glyphs on the target and return the user-space advance end.
    fn draw_glyphs(&self, cr: NativePtr, font: NativePtr, glyphs: &[Glyph]) -> Option<Point> {
        let extents = match self.glyphs_extents(font, glyphs) {
            Ok(extents) => extents,
            Err(status) => {
                self.context_fail(cr, status);
                return None;
            }
        };
        let first = glyphs.first()?;
        let (target, op) = self.live(cr, |c| {
            let x1 = first.x + extents.x_bearing;
            let y1 = first.y + extents.y_bearing;
            let user = Extents::new(x1, y1, x1 + extents.width, y1 + extents.height);
            let device = Extents::from_points(user.corners().map(|(x, y)| c.gstate.to_device(x, y)));
            (
                c.gstate.target,
                DrawOp {
                    kind: DrawKind::Glyphs,
                    operator: c.gstate.operator,
                    extents: device.map(|e| c.gstate.clip_to(e)),
                },
            )
        })?;
        self.record(cr, target, op);
        Some((first.x + extents.x_advance, first.y + extents.y_advance))
    }

    fn move_to_user(&self, cr: NativePtr, (x, y): Point) {
        self.ctx(cr, |c, _| {
            let p = c.gstate.to_device(x, y);
            c.path.move_to(p);
        });
    }

    pub fn show_text(&self, cr: NativePtr, utf8: &str) {
        self.log("cairo_show_text");
        let Some((font, (x, y))) = self.text_setup(cr) else {
            return;
        };
        match self.shape(font, x, y, utf8, false) {
            Ok(shaped) => {
                if let Some(end) = self.draw_glyphs(cr, font, &shaped.glyphs) {
                    self.move_to_user(cr, end);
                }
            }
            Err(status) => self.context_fail(cr, status),
        }
    }

    pub fn show_glyphs(&self, cr: NativePtr, glyphs: &[Glyph]) {
        self.log("cairo_show_glyphs");
        if let Some((font, _)) = self.text_setup(cr) {
            self.draw_glyphs(cr, font, glyphs);
        }
    }

    /// Show glyphs together with the text and clusters they came from.
    pub fn show_text_glyphs(
        &self,
        cr: NativePtr,
        utf8: &str,
        glyphs: &[Glyph],
        clusters: &[TextCluster],
        _flags: TextClusterFlags,
    ) {
        self.log("cairo_show_text_glyphs");
        if !clusters.is_empty() {
            let mut bytes = 0i64;
            let mut count = 0i64;
            for cluster in clusters {
                if cluster.num_bytes < 0 || cluster.num_glyphs < 0 {
                    self.context_fail(cr, Status::NegativeCount);
                    return;
                }
                if cluster.num_bytes == 0 && cluster.num_glyphs == 0 {
                    self.context_fail(cr, Status::InvalidClusters);
                    return;
                }
                bytes += i64::from(cluster.num_bytes);
                count += i64::from(cluster.num_glyphs);
            }
            if bytes != utf8.len() as i64 || count != glyphs.len() as i64 {
                self.context_fail(cr, Status::InvalidClusters);
                return;
            }
        }
        if let Some((font, _)) = self.text_setup(cr) {
            self.draw_glyphs(cr, font, glyphs);
        }
    }

    fn glyph_path_internal(&self, cr: NativePtr, font: NativePtr, glyphs: &[Glyph]) -> Option<Point> {
        let mut boxes = Vec::with_capacity(glyphs.len());
        let mut end = None;
        for glyph in glyphs {
            match self.glyph_extents_user(font, glyph.index) {
                Ok(e) => {
                    if e.width > 0.0 || e.height > 0.0 {
                        let x1 = glyph.x + e.x_bearing;
                        let y1 = glyph.y + e.y_bearing;
                        boxes.push(Extents::new(x1, y1, x1 + e.width, y1 + e.height));
                    }
                    end = Some((glyph.x + e.x_advance, glyph.y + e.y_advance));
                }
                Err(status) => {
                    self.context_fail(cr, status);
                    return None;
                }
            }
        }
        self.ctx(cr, |c, _| {
            for b in boxes {
                let corners = b.corners().map(|(x, y)| c.gstate.to_device(x, y));
                c.path.move_to(corners[0]);
                for corner in &corners[1..] {
                    c.path.line_to(*corner);
                }
                c.path.close_path();
            }
        });
        end
    }

    pub fn text_path(&self, cr: NativePtr, utf8: &str) {
        self.log("cairo_text_path");
        let Some((font, (x, y))) = self.text_setup(cr) else {
            return;
        };
        match self.shape(font, x, y, utf8, false) {
            Ok(shaped) => {
                if let Some(end) = self.glyph_path_internal(cr, font, &shaped.glyphs) {
                    self.move_to_user(cr, end);
                }
            }
            Err(status) => self.context_fail(cr, status),
        }
    }

    pub fn glyph_path(&self, cr: NativePtr, glyphs: &[Glyph]) {
        self.log("cairo_glyph_path");
        if let Some((font, _)) = self.text_setup(cr) {
            self.glyph_path_internal(cr, font, glyphs);
        }
    }

    pub fn text_extents(&self, cr: NativePtr, utf8: &str) -> TextExtents {
        self.log("cairo_text_extents");
        let Some((font, _)) = self.text_setup(cr) else {
            return TextExtents::default();
        };
        let result = self
            .shape(font, 0.0, 0.0, utf8, false)
            .and_then(|shaped| self.glyphs_extents(font, &shaped.glyphs));
        result.unwrap_or_else(|status| {
            self.context_fail(cr, status);
            TextExtents::default()
        })
    }

    pub fn glyph_extents(&self, cr: NativePtr, glyphs: &[Glyph]) -> TextExtents {
        self.log("cairo_glyph_extents");
        let Some((font, _)) = self.text_setup(cr) else {
            return TextExtents::default();
        };
        self.glyphs_extents(font, glyphs).unwrap_or_else(|status| {
            self.context_fail(cr, status);
            TextExtents::default()
        })
    }

    pub fn font_extents(&self, cr: NativePtr) -> FontExtents {
        self.log("cairo_font_extents");
        let Some((font, _)) = self.text_setup(cr) else {
            return FontExtents::default();
        };
        self.with(font, ScaledFontData::user_extents).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    fn setup() -> (Cairo, NativePtr, NativePtr) {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create(Format::Argb32, 100, 100);
        let cr = cairo.create(surface);
        (cairo, surface, cr)
    }

    #[test]
    fn test_set_source_calls() {
        let (cairo, surface, cr) = setup();
        cairo.clear_calls();
        cairo.set_source_surface(cr, surface, 1.0, 2.0);
        assert!(!cairo.was_called("cairo_set_source"));
        let pattern = cairo.get_source(cr).unwrap();
        assert_eq!(cairo.pattern_get_surface(pattern), Ok(surface));
        assert_eq!(cairo.pattern_get_matrix(pattern), Matrix::translation(-1.0, -2.0));
    }

    #[test]
    fn test_restore_without_save() {
        let (cairo, _, cr) = setup();
        cairo.restore(cr);
        assert_eq!(cairo.status(cr), Status::InvalidRestore);
        // Sticky: later calls do nothing.
        cairo.set_line_width(cr, 5.0);
        assert_eq!(cairo.get_line_width(cr), 2.0);
    }

    #[test]
    fn test_save_restore_state() {
        let (cairo, _, cr) = setup();
        cairo.save(cr);
        cairo.set_line_width(cr, 7.0);
        cairo.translate(cr, 10.0, 0.0);
        cairo.restore(cr);
        assert_eq!(cairo.get_line_width(cr), 2.0);
        assert_eq!(cairo.get_matrix(cr), Matrix::identity());
        assert_eq!(cairo.status(cr), Status::Success);
    }

    #[test]
    fn test_invalid_dash() {
        let (cairo, _, cr) = setup();
        cairo.set_dash(cr, &[0.0, 0.0], 0.0);
        assert_eq!(cairo.status(cr), Status::InvalidDash);
    }

    #[test]
    fn test_rel_line_without_current_point() {
        let (cairo, _, cr) = setup();
        cairo.rel_line_to(cr, 1.0, 1.0);
        assert_eq!(cairo.status(cr), Status::NoCurrentPoint);
    }

    #[test]
    fn test_copy_path_in_user_space() {
        let (cairo, _, cr) = setup();
        cairo.translate(cr, 10.0, 10.0);
        cairo.move_to(cr, 1.0, 2.0);
        cairo.line_to(cr, 3.0, 4.0);
        let path = cairo.copy_path(cr);
        assert_eq!(
            cairo.path_segments(path),
            vec![PathSegment::MoveTo(1.0, 2.0), PathSegment::LineTo(3.0, 4.0)]
        );
        assert_eq!(cairo.user_to_device(cr, 3.0, 4.0), (13.0, 14.0));
    }

    #[test]
    fn test_fill_records_operation() {
        let (cairo, surface, cr) = setup();
        cairo.rectangle(cr, 10.0, 10.0, 20.0, 5.0);
        assert!(cairo.in_fill(cr, 15.0, 12.0));
        cairo.fill(cr);
        let ops = cairo.surface_draw_ops(surface);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, DrawKind::Fill);
        assert_eq!(ops[0].extents, Some(Extents::new(10.0, 10.0, 30.0, 15.0)));
        assert!(!cairo.has_current_point(cr));
    }

    #[test]
    fn test_drawing_on_finished_surface() {
        let (cairo, surface, cr) = setup();
        cairo.surface_finish(surface);
        cairo.paint(cr);
        assert_eq!(cairo.status(cr), Status::SurfaceFinished);
    }

    #[test]
    fn test_groups() {
        let (cairo, surface, cr) = setup();
        cairo.push_group(cr);
        assert_ne!(cairo.get_group_target(cr), Some(surface));
        cairo.paint(cr);
        let pattern = cairo.pop_group(cr);
        assert_eq!(cairo.status(pattern), Status::Success);
        assert_eq!(cairo.get_group_target(cr), Some(surface));

        let bad = cairo.pop_group(cr);
        assert_eq!(cairo.status(bad), Status::InvalidPopGroup);
    }

    #[test]
    fn test_show_text_advances_current_point() {
        let (cairo, surface, cr) = setup();
        cairo.set_font_size(cr, 10.0);
        cairo.move_to(cr, 5.0, 50.0);
        cairo.show_text(cr, "abc");
        let (x, y) = cairo.get_current_point(cr);
        assert!((x - 23.0).abs() < 1e-9);
        assert_eq!(y, 50.0);
        assert_eq!(cairo.surface_draw_ops(surface)[0].kind, DrawKind::Glyphs);
    }

    #[test]
    fn test_invalid_clusters() {
        let (cairo, _, cr) = setup();
        let glyphs = [Glyph { index: 1, x: 0.0, y: 0.0 }];
        let clusters = [TextCluster {
            num_bytes: 2,
            num_glyphs: 1,
        }];
        cairo.show_text_glyphs(cr, "a", &glyphs, &clusters, TextClusterFlags::empty());
        assert_eq!(cairo.status(cr), Status::InvalidClusters);
    }

    #[test]
    fn test_everything_released_with_context() {
        let (cairo, surface, cr) = setup();
        cairo.save(cr);
        cairo.select_font_face(cr, "mono", FontSlant::Normal, FontWeight::Bold);
        cairo.show_text(cr, "x");
        cairo.push_group(cr);
        cairo.destroy(surface);
        cairo.destroy(cr);
        assert_eq!(cairo.live_objects(), 0);
    }
}
