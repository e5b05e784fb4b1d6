//! Font faces, scaled fonts and font options.
//!
//! Two backends exist. Toy faces have fixed metrics derived from the em
//! square. User faces delegate to [`UserFontHooks`], which the library calls
//! synchronously while measuring or drawing text; hooks receive a scratch
//! context on a recording surface to draw glyphs with, and may call back into
//! the library freely since no internal borrow is held while they run.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::cairo::{NativePtr, Resource};
use crate::surface::{SurfaceData, ink_extents};
use crate::{
    Antialias, Cairo, Content, Extents, FontExtents, FontSlant, FontType, FontWeight, Glyph, HintMetrics, HintStyle,
    Matrix, ShapedText, Status, SubpixelOrder, TextCluster, TextClusterFlags, TextExtents,
};

// ============================================================================
// Font options
// ============================================================================

/// Rasterization options for fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontOptions {
    pub antialias: Antialias,
    pub subpixel_order: SubpixelOrder,
    pub hint_style: HintStyle,
    pub hint_metrics: HintMetrics,
}

impl FontOptions {
    /// Take every non-default field of `other`.
    pub fn merge(&mut self, other: &FontOptions) {
        if other.antialias != Antialias::Default {
            self.antialias = other.antialias;
        }
        if other.subpixel_order != SubpixelOrder::Default {
            self.subpixel_order = other.subpixel_order;
        }
        if other.hint_style != HintStyle::Default {
            self.hint_style = other.hint_style;
        }
        if other.hint_metrics != HintMetrics::Default {
            self.hint_metrics = other.hint_metrics;
        }
    }

    /// Packed hash; equal options hash equal.
    pub fn hash_value(&self) -> u64 {
        let field = |v: i32| v as u64;
        field(self.antialias.into())
            | field(self.subpixel_order.into()) << 4
            | field(self.hint_style.into()) << 12
            | field(self.hint_metrics.into()) << 16
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FontOptionsData {
    pub status: Status,
    pub options: FontOptions,
}

impl Resource for FontOptionsData {
    fn status(&self) -> Status {
        self.status
    }
}

// ============================================================================
// Font faces
// ============================================================================

/// Callbacks implementing a user font.
///
/// Every hook may return [`Status::UserFontNotImplemented`] to request the
/// built-in behaviour. Any other error puts the scaled font in an error
/// state.
pub trait UserFontHooks {
    /// Called once when a scaled font is created for the face.
    fn init(&self, scaled_font: NativePtr, cr: NativePtr, extents: &mut FontExtents) -> Result<(), Status> {
        let _ = (scaled_font, cr, extents);
        Err(Status::UserFontNotImplemented)
    }

    /// Draw one glyph on `cr` in font space and fill in its advance.
    fn render_glyph(
        &self,
        scaled_font: NativePtr,
        glyph: u64,
        cr: NativePtr,
        extents: &mut TextExtents,
    ) -> Result<(), Status>;

    /// Convert text to glyphs positioned in font space.
    fn text_to_glyphs(&self, scaled_font: NativePtr, utf8: &str, want_clusters: bool) -> Result<ShapedText, Status> {
        let _ = (scaled_font, utf8, want_clusters);
        Err(Status::UserFontNotImplemented)
    }

    /// Map one character to a glyph index.
    fn unicode_to_glyph(&self, scaled_font: NativePtr, unicode: u32) -> Result<u64, Status> {
        let _ = (scaled_font, unicode);
        Err(Status::UserFontNotImplemented)
    }
}

#[derive(Clone)]
pub(crate) enum FaceKind {
    Toy {
        family: String,
        slant: FontSlant,
        weight: FontWeight,
    },
    User(Rc<dyn UserFontHooks>),
}

pub(crate) struct FontFaceData {
    pub status: Status,
    pub kind: FaceKind,
}

impl Resource for FontFaceData {
    fn status(&self) -> Status {
        self.status
    }
}

impl FontFaceData {
    pub fn font_type(&self) -> FontType {
        match self.kind {
            FaceKind::Toy { .. } => FontType::Toy,
            FaceKind::User(_) => FontType::User,
        }
    }

    pub(crate) fn toy(family: &str, slant: FontSlant, weight: FontWeight) -> Self {
        Self {
            status: Status::Success,
            kind: FaceKind::Toy {
                family: family.to_owned(),
                slant,
                weight,
            },
        }
    }
}

// ============================================================================
// Scaled fonts
// ============================================================================

const TOY_EXTENTS: FontExtents = FontExtents {
    ascent: 0.8,
    descent: 0.2,
    height: 1.2,
    max_x_advance: 0.6,
    max_y_advance: 0.0,
};

const USER_DEFAULT_EXTENTS: FontExtents = FontExtents {
    ascent: 1.0,
    descent: 0.0,
    height: 1.0,
    max_x_advance: 1.0,
    max_y_advance: 0.0,
};

pub(crate) struct ScaledFontData {
    pub status: Status,
    pub face: NativePtr,
    pub font_matrix: Matrix,
    pub ctm: Matrix,
    pub options: FontOptions,
    /// Font extents in font space.
    pub extents: FontExtents,
    /// Glyph extents in font space.
    pub glyphs: FxHashMap<u64, TextExtents>,
}

impl Resource for ScaledFontData {
    fn status(&self) -> Status {
        self.status
    }

    fn children(&self) -> Vec<NativePtr> {
        vec![self.face]
    }
}

impl ScaledFontData {
    pub(crate) fn user_extents(&self) -> FontExtents {
        let (sx, sy) = self.font_matrix.scale_factors();
        FontExtents {
            ascent: self.extents.ascent * sy,
            descent: self.extents.descent * sy,
            height: self.extents.height * sy,
            max_x_advance: self.extents.max_x_advance * sx,
            max_y_advance: self.extents.max_y_advance * sy,
        }
    }
}

fn toy_glyph_extents(glyph: u64, weight: FontWeight) -> TextExtents {
    let advance = match weight {
        FontWeight::Normal => TOY_EXTENTS.max_x_advance,
        FontWeight::Bold => TOY_EXTENTS.max_x_advance + 0.05,
    };
    if char::from_u32(glyph as u32).is_some_and(char::is_whitespace) {
        return TextExtents {
            x_advance: advance,
            ..TextExtents::default()
        };
    }
    TextExtents {
        x_bearing: 0.05,
        y_bearing: -0.7,
        width: advance - 0.1,
        height: 0.7,
        x_advance: advance,
        y_advance: 0.0,
    }
}

/// Map font-space glyph extents into user space.
fn extents_to_user(e: &TextExtents, m: &Matrix) -> TextExtents {
    let (x_advance, y_advance) = m.transform_distance(e.x_advance, e.y_advance);
    if e.width == 0.0 && e.height == 0.0 {
        return TextExtents {
            x_advance,
            y_advance,
            ..TextExtents::default()
        };
    }
    let ink = Extents::new(e.x_bearing, e.y_bearing, e.x_bearing + e.width, e.y_bearing + e.height);
    let user = Extents::from_points(ink.corners().map(|(x, y)| m.transform_distance(x, y))).unwrap_or_default();
    TextExtents {
        x_bearing: user.x1,
        y_bearing: user.y1,
        width: user.x2 - user.x1,
        height: user.y2 - user.y1,
        x_advance,
        y_advance,
    }
}

impl Cairo {
    // ========================================================================
    // Font options
    // ========================================================================

    pub fn font_options_create(&self) -> NativePtr {
        self.log("cairo_font_options_create");
        self.font_options_from(FontOptions::default())
    }

    pub(crate) fn font_options_from(&self, options: FontOptions) -> NativePtr {
        self.insert(FontOptionsData {
            status: Status::Success,
            options,
        })
    }

    pub fn font_options_copy(&self, options: NativePtr) -> NativePtr {
        self.log("cairo_font_options_copy");
        self.font_options_from(self.font_options_get(options))
    }

    /// Current values of an options object.
    pub fn font_options_get(&self, options: NativePtr) -> FontOptions {
        self.with(options, |o: &FontOptionsData| o.options).unwrap_or_default()
    }

    pub(crate) fn font_options_set(&self, options: NativePtr, f: impl FnOnce(&mut FontOptions)) {
        self.with_mut(options, |o: &mut FontOptionsData, _| {
            if o.status.is_success() {
                f(&mut o.options);
            }
        });
    }

    pub fn font_options_merge(&self, options: NativePtr, other: NativePtr) {
        self.log("cairo_font_options_merge");
        let other = self.font_options_get(other);
        self.font_options_set(options, |o| o.merge(&other));
    }

    pub fn font_options_hash(&self, options: NativePtr) -> u64 {
        self.log("cairo_font_options_hash");
        self.font_options_get(options).hash_value()
    }

    pub fn font_options_equal(&self, a: NativePtr, b: NativePtr) -> bool {
        self.log("cairo_font_options_equal");
        self.font_options_get(a) == self.font_options_get(b)
    }

    pub fn font_options_set_antialias(&self, options: NativePtr, antialias: Antialias) {
        self.log("cairo_font_options_set_antialias");
        self.font_options_set(options, |o| o.antialias = antialias);
    }

    pub fn font_options_get_antialias(&self, options: NativePtr) -> Antialias {
        self.log("cairo_font_options_get_antialias");
        self.font_options_get(options).antialias
    }

    pub fn font_options_set_subpixel_order(&self, options: NativePtr, order: SubpixelOrder) {
        self.log("cairo_font_options_set_subpixel_order");
        self.font_options_set(options, |o| o.subpixel_order = order);
    }

    pub fn font_options_get_subpixel_order(&self, options: NativePtr) -> SubpixelOrder {
        self.log("cairo_font_options_get_subpixel_order");
        self.font_options_get(options).subpixel_order
    }

    pub fn font_options_set_hint_style(&self, options: NativePtr, style: HintStyle) {
        self.log("cairo_font_options_set_hint_style");
        self.font_options_set(options, |o| o.hint_style = style);
    }

    pub fn font_options_get_hint_style(&self, options: NativePtr) -> HintStyle {
        self.log("cairo_font_options_get_hint_style");
        self.font_options_get(options).hint_style
    }

    pub fn font_options_set_hint_metrics(&self, options: NativePtr, metrics: HintMetrics) {
        self.log("cairo_font_options_set_hint_metrics");
        self.font_options_set(options, |o| o.hint_metrics = metrics);
    }

    pub fn font_options_get_hint_metrics(&self, options: NativePtr) -> HintMetrics {
        self.log("cairo_font_options_get_hint_metrics");
        self.font_options_get(options).hint_metrics
    }

    // ========================================================================
    // Font faces
    // ========================================================================

    pub fn toy_font_face_create(&self, family: &str, slant: FontSlant, weight: FontWeight) -> NativePtr {
        self.log("cairo_toy_font_face_create");
        self.insert(FontFaceData::toy(family, slant, weight))
    }

    pub(crate) fn default_font_face(&self) -> NativePtr {
        self.insert(FontFaceData::toy("", FontSlant::Normal, FontWeight::Normal))
    }

    /// Create a user font face. The hooks are dropped when the face is freed.
    pub fn user_font_face_create(&self, hooks: Rc<dyn UserFontHooks>) -> NativePtr {
        self.log("cairo_user_font_face_create");
        self.insert(FontFaceData {
            status: Status::Success,
            kind: FaceKind::User(hooks),
        })
    }

    pub fn font_face_get_type(&self, face: NativePtr) -> FontType {
        self.log("cairo_font_face_get_type");
        self.with(face, FontFaceData::font_type).unwrap_or_default()
    }

    fn toy_query<R>(&self, face: NativePtr, f: impl FnOnce(&str, FontSlant, FontWeight) -> R) -> Result<R, Status> {
        self.with(face, |data: &FontFaceData| match &data.kind {
            FaceKind::Toy { family, slant, weight } => Ok(f(family, *slant, *weight)),
            FaceKind::User(_) => Err(Status::FontTypeMismatch),
        })
        .unwrap_or(Err(Status::NullPointer))
    }

    pub fn toy_font_face_get_family(&self, face: NativePtr) -> Result<String, Status> {
        self.log("cairo_toy_font_face_get_family");
        self.toy_query(face, |family, _, _| family.to_owned())
    }

    pub fn toy_font_face_get_slant(&self, face: NativePtr) -> Result<FontSlant, Status> {
        self.log("cairo_toy_font_face_get_slant");
        self.toy_query(face, |_, slant, _| slant)
    }

    pub fn toy_font_face_get_weight(&self, face: NativePtr) -> Result<FontWeight, Status> {
        self.log("cairo_toy_font_face_get_weight");
        self.toy_query(face, |_, _, weight| weight)
    }

    fn user_hooks(&self, face: NativePtr) -> Option<Rc<dyn UserFontHooks>> {
        self.with(face, |data: &FontFaceData| match &data.kind {
            FaceKind::User(hooks) => Some(Rc::clone(hooks)),
            FaceKind::Toy { .. } => None,
        })
        .flatten()
    }

    /// Recording surface and context handed to hooks. Both must be destroyed
    /// by the caller.
    fn scratch_context(&self) -> (NativePtr, NativePtr) {
        let surface = self.recording_surface_new(Content::ColorAlpha, None);
        let cr = self.context_new(surface);
        (surface, cr)
    }

    // ========================================================================
    // Scaled fonts
    // ========================================================================

    pub fn scaled_font_create(
        &self,
        face: NativePtr,
        font_matrix: &Matrix,
        ctm: &Matrix,
        options: &FontOptions,
    ) -> NativePtr {
        self.log("cairo_scaled_font_create");
        self.scaled_font_new(face, font_matrix, ctm, options)
    }

    pub(crate) fn scaled_font_new(
        &self,
        face: NativePtr,
        font_matrix: &Matrix,
        ctm: &Matrix,
        options: &FontOptions,
    ) -> NativePtr {
        let face_status = self.with(face, |f: &FontFaceData| f.status).unwrap_or(Status::NullPointer);
        let status = if !face_status.is_success() {
            face_status
        } else if !font_matrix.is_invertible() || !ctm.is_invertible() {
            Status::InvalidMatrix
        } else {
            Status::Success
        };
        if face_status != Status::NullPointer {
            self.retain(face);
        }
        let hooks = self.user_hooks(face);
        let extents = if hooks.is_some() { USER_DEFAULT_EXTENTS } else { TOY_EXTENTS };
        let scaled_font = self.insert(ScaledFontData {
            status,
            face,
            font_matrix: *font_matrix,
            ctm: *ctm,
            options: *options,
            extents,
            glyphs: FxHashMap::default(),
        });

        if let Some(hooks) = hooks.filter(|_| status.is_success()) {
            let (surface, cr) = self.scratch_context();
            let mut extents = USER_DEFAULT_EXTENTS;
            let result = hooks.init(scaled_font, cr, &mut extents);
            self.release(cr);
            self.release(surface);
            self.with_mut(scaled_font, |s: &mut ScaledFontData, _| match result {
                Ok(()) | Err(Status::UserFontNotImplemented) => s.extents = extents,
                Err(status) => s.status.set_sticky(status),
            });
        }
        scaled_font
    }

    /// Font extents in user space.
    pub fn scaled_font_extents(&self, scaled_font: NativePtr) -> FontExtents {
        self.log("cairo_scaled_font_extents");
        self.with(scaled_font, |s: &ScaledFontData| s.user_extents()).unwrap_or_default()
    }

    /// Face of a scaled font. The pointer is borrowed.
    pub fn scaled_font_get_font_face(&self, scaled_font: NativePtr) -> Option<NativePtr> {
        self.log("cairo_scaled_font_get_font_face");
        self.with(scaled_font, |s: &ScaledFontData| s.face)
    }

    pub fn scaled_font_get_font_matrix(&self, scaled_font: NativePtr) -> Matrix {
        self.log("cairo_scaled_font_get_font_matrix");
        self.with(scaled_font, |s: &ScaledFontData| s.font_matrix).unwrap_or_default()
    }

    pub fn scaled_font_get_ctm(&self, scaled_font: NativePtr) -> Matrix {
        self.log("cairo_scaled_font_get_ctm");
        self.with(scaled_font, |s: &ScaledFontData| s.ctm).unwrap_or_default()
    }

    /// Font matrix followed by the CTM.
    pub fn scaled_font_get_scale_matrix(&self, scaled_font: NativePtr) -> Matrix {
        self.log("cairo_scaled_font_get_scale_matrix");
        self.with(scaled_font, |s: &ScaledFontData| Matrix::multiply(&s.font_matrix, &s.ctm))
            .unwrap_or_default()
    }

    /// Copy the scaled font's options into `options`.
    pub fn scaled_font_get_font_options(&self, scaled_font: NativePtr, options: NativePtr) {
        self.log("cairo_scaled_font_get_font_options");
        let value = self.with(scaled_font, |s: &ScaledFontData| s.options).unwrap_or_default();
        self.font_options_set(options, |o| *o = value);
    }

    pub fn scaled_font_get_type(&self, scaled_font: NativePtr) -> FontType {
        self.log("cairo_scaled_font_get_type");
        self.with(scaled_font, |s: &ScaledFontData| s.face)
            .and_then(|face| self.with(face, FontFaceData::font_type))
            .unwrap_or_default()
    }

    fn scaled_font_fail(&self, scaled_font: NativePtr, status: Status) -> Status {
        self.with_mut(scaled_font, |s: &mut ScaledFontData, _| s.status.set_sticky(status));
        status
    }

    /// Extents of one glyph in font space, rendering it through the user
    /// font hooks on first use.
    fn glyph_extents_font_space(&self, scaled_font: NativePtr, glyph: u64) -> Result<TextExtents, Status> {
        let (cached, face, font_extents) = self
            .with(scaled_font, |s: &ScaledFontData| {
                s.status.into_result()?;
                Ok((s.glyphs.get(&glyph).copied(), s.face, s.extents))
            })
            .unwrap_or(Err(Status::NullPointer))?;
        if let Some(extents) = cached {
            return Ok(extents);
        }

        let extents = match self.user_hooks(face) {
            None => {
                let weight = self.toy_font_face_weight(face);
                toy_glyph_extents(glyph, weight)
            }
            Some(hooks) => {
                let (surface, cr) = self.scratch_context();
                let mut extents = TextExtents {
                    x_advance: font_extents.max_x_advance,
                    ..TextExtents::default()
                };
                let result = hooks.render_glyph(scaled_font, glyph, cr, &mut extents);
                let ink = self.with(surface, |s: &SurfaceData| ink_extents(&s.ops)).flatten();
                self.release(cr);
                self.release(surface);
                if let Err(status) = result {
                    return Err(self.scaled_font_fail(scaled_font, status));
                }
                if let Some(ink) = ink.filter(|_| extents.width == 0.0 && extents.height == 0.0) {
                    extents.x_bearing = ink.x1;
                    extents.y_bearing = ink.y1;
                    extents.width = ink.x2 - ink.x1;
                    extents.height = ink.y2 - ink.y1;
                }
                extents
            }
        };

        self.with_mut(scaled_font, |s: &mut ScaledFontData, _| {
            s.glyphs.insert(glyph, extents);
        });
        Ok(extents)
    }

    fn toy_font_face_weight(&self, face: NativePtr) -> FontWeight {
        self.with(face, |f: &FontFaceData| match f.kind {
            FaceKind::Toy { weight, .. } => weight,
            FaceKind::User(_) => FontWeight::Normal,
        })
        .unwrap_or_default()
    }

    /// Extents of one glyph in user space.
    pub(crate) fn glyph_extents_user(&self, scaled_font: NativePtr, glyph: u64) -> Result<TextExtents, Status> {
        let extents = self.glyph_extents_font_space(scaled_font, glyph)?;
        let matrix = self.with(scaled_font, |s: &ScaledFontData| s.font_matrix).unwrap_or_default();
        Ok(extents_to_user(&extents, &matrix))
    }

    /// Extents of positioned glyphs in user space, relative to the first
    /// glyph's origin.
    pub(crate) fn glyphs_extents(&self, scaled_font: NativePtr, glyphs: &[Glyph]) -> Result<TextExtents, Status> {
        let Some(first) = glyphs.first() else {
            return Ok(TextExtents::default());
        };
        let mut ink: Option<Extents> = None;
        let mut end = (first.x, first.y);
        for glyph in glyphs {
            let e = self.glyph_extents_user(scaled_font, glyph.index)?;
            if e.width > 0.0 || e.height > 0.0 {
                let x1 = glyph.x + e.x_bearing;
                let y1 = glyph.y + e.y_bearing;
                let bounds = Extents::new(x1, y1, x1 + e.width, y1 + e.height);
                ink = Some(ink.map_or(bounds, |i| i.union(&bounds)));
            }
            end = (glyph.x + e.x_advance, glyph.y + e.y_advance);
        }
        let ink = ink.unwrap_or(Extents::new(first.x, first.y, first.x, first.y));
        Ok(TextExtents {
            x_bearing: ink.x1 - first.x,
            y_bearing: ink.y1 - first.y,
            width: ink.x2 - ink.x1,
            height: ink.y2 - ink.y1,
            x_advance: end.0 - first.x,
            y_advance: end.1 - first.y,
        })
    }

    pub fn scaled_font_glyph_extents(&self, scaled_font: NativePtr, glyphs: &[Glyph]) -> TextExtents {
        self.log("cairo_scaled_font_glyph_extents");
        self.glyphs_extents(scaled_font, glyphs).unwrap_or_default()
    }

    pub fn scaled_font_text_extents(&self, scaled_font: NativePtr, utf8: &str) -> TextExtents {
        self.log("cairo_scaled_font_text_extents");
        self.shape(scaled_font, 0.0, 0.0, utf8, false)
            .and_then(|shaped| self.glyphs_extents(scaled_font, &shaped.glyphs))
            .unwrap_or_default()
    }

    pub fn scaled_font_text_to_glyphs(
        &self,
        scaled_font: NativePtr,
        x: f64,
        y: f64,
        utf8: &str,
        want_clusters: bool,
    ) -> Result<ShapedText, Status> {
        self.log("cairo_scaled_font_text_to_glyphs");
        self.shape(scaled_font, x, y, utf8, want_clusters)
    }

    /// Convert text to glyphs positioned in user space starting at `(x, y)`.
    pub(crate) fn shape(
        &self,
        scaled_font: NativePtr,
        x: f64,
        y: f64,
        utf8: &str,
        want_clusters: bool,
    ) -> Result<ShapedText, Status> {
        let (face, matrix) = self
            .with(scaled_font, |s: &ScaledFontData| {
                s.status.into_result().map(|_| (s.face, s.font_matrix))
            })
            .unwrap_or(Err(Status::NullPointer))?;
        let hooks = self.user_hooks(face);

        if let Some(hooks) = &hooks {
            match hooks.text_to_glyphs(scaled_font, utf8, want_clusters) {
                Ok(mut shaped) => {
                    for glyph in &mut shaped.glyphs {
                        let (dx, dy) = matrix.transform_distance(glyph.x, glyph.y);
                        glyph.x = x + dx;
                        glyph.y = y + dy;
                    }
                    if !want_clusters {
                        shaped.clusters.clear();
                        shaped.flags = TextClusterFlags::empty();
                    }
                    return Ok(shaped);
                }
                Err(Status::UserFontNotImplemented) => {}
                Err(status) => return Err(self.scaled_font_fail(scaled_font, status)),
            }
        }

        let mut shaped = ShapedText::default();
        let (mut pen_x, mut pen_y) = (x, y);
        for ch in utf8.chars() {
            let index = match hooks.as_ref().map(|h| h.unicode_to_glyph(scaled_font, u32::from(ch))) {
                None | Some(Err(Status::UserFontNotImplemented)) => u64::from(u32::from(ch)),
                Some(Ok(index)) => index,
                Some(Err(status)) => return Err(self.scaled_font_fail(scaled_font, status)),
            };
            shaped.glyphs.push(Glyph {
                index,
                x: pen_x,
                y: pen_y,
            });
            let advance = self.glyph_extents_user(scaled_font, index)?;
            pen_x += advance.x_advance;
            pen_y += advance.y_advance;
            if want_clusters {
                shaped.clusters.push(TextCluster {
                    num_bytes: ch.len_utf8() as i32,
                    num_glyphs: 1,
                });
            }
        }
        Ok(shaped)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct CountingFont {
        renders: Cell<u32>,
    }

    impl UserFontHooks for CountingFont {
        fn render_glyph(&self, _: NativePtr, _: u64, _: NativePtr, extents: &mut TextExtents) -> Result<(), Status> {
            self.renders.set(self.renders.get() + 1);
            extents.x_advance = 0.5;
            Ok(())
        }
    }

    struct FailingFont;

    impl UserFontHooks for FailingFont {
        fn render_glyph(&self, _: NativePtr, _: u64, _: NativePtr, _: &mut TextExtents) -> Result<(), Status> {
            Err(Status::UserFontError)
        }
    }

    fn scaled(cairo: &Cairo, face: NativePtr, size: f64) -> NativePtr {
        cairo.scaled_font_create(face, &Matrix::scaling(size, size), &Matrix::identity(), &FontOptions::default())
    }

    #[test]
    fn test_font_options_merge_and_hash() {
        let mut a = FontOptions::default();
        let b = FontOptions {
            antialias: Antialias::Gray,
            hint_style: HintStyle::Full,
            ..FontOptions::default()
        };
        assert_ne!(a.hash_value(), b.hash_value());
        a.merge(&b);
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
    }

    #[test]
    fn test_toy_face_queries() {
        let cairo = Cairo::new();
        let face = cairo.toy_font_face_create("serif", FontSlant::Italic, FontWeight::Bold);
        assert_eq!(cairo.font_face_get_type(face), FontType::Toy);
        assert_eq!(cairo.toy_font_face_get_family(face).unwrap(), "serif");
        assert_eq!(cairo.toy_font_face_get_slant(face), Ok(FontSlant::Italic));
    }

    #[test]
    fn test_toy_text_extents_scale_with_size() {
        let cairo = Cairo::new();
        let face = cairo.toy_font_face_create("", FontSlant::Normal, FontWeight::Normal);
        let font = scaled(&cairo, face, 10.0);
        let extents = cairo.scaled_font_text_extents(font, "ab");
        assert!((extents.x_advance - 12.0).abs() < 1e-9);
        assert!((cairo.scaled_font_extents(font).ascent - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_user_font_glyphs_rendered_once() {
        let cairo = Cairo::new();
        let hooks = Rc::new(CountingFont { renders: Cell::new(0) });
        let face = cairo.user_font_face_create(hooks.clone());
        let font = scaled(&cairo, face, 2.0);
        let shaped = cairo.scaled_font_text_to_glyphs(font, 1.0, 0.0, "aab", true).unwrap();
        assert_eq!(shaped.glyphs.len(), 3);
        assert_eq!(shaped.clusters.len(), 3);
        // Advance 0.5 em at size 2.
        assert!((shaped.glyphs[1].x - 2.0).abs() < 1e-9);
        assert_eq!(hooks.renders.get(), 2);
    }

    #[test]
    fn test_failing_hook_puts_font_in_error() {
        let cairo = Cairo::new();
        let face = cairo.user_font_face_create(Rc::new(FailingFont));
        let font = scaled(&cairo, face, 1.0);
        assert_eq!(cairo.scaled_font_text_to_glyphs(font, 0.0, 0.0, "x", false), Err(Status::UserFontError));
        assert_eq!(cairo.status(font), Status::UserFontError);
    }

    #[test]
    fn test_hooks_dropped_with_face() {
        let cairo = Cairo::new();
        let hooks = Rc::new(CountingFont { renders: Cell::new(0) });
        let face = cairo.user_font_face_create(hooks.clone());
        let font = scaled(&cairo, face, 1.0);
        cairo.destroy(face);
        assert_eq!(Rc::strong_count(&hooks), 2);
        cairo.destroy(font);
        assert_eq!(Rc::strong_count(&hooks), 1);
    }
}
