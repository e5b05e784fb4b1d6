//! Scaled font methods.
//!
//! Measuring and shaping may run user font callbacks. Their failures leave
//! the font in an error state, which is reported as a native status error
//! carrying the host error as detail.

use oocairo_core::records::{
    clusters_to_value, font_extents_to_value, glyphs_from_value, glyphs_to_value, matrix_to_value,
    text_extents_to_value,
};
use oocairo_core::{BindingResult, tags};
use oocairo_native::{Cairo, NativePtr};

use super::{same_object, status};
use crate::call::CallContext;
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::SCALED_FONT, "cairo scaled font object")
        .finalizer(Cairo::destroy)
        .method("__eq", same_object(tags::SCALED_FONT))
        .method("status", status(tags::SCALED_FONT))
        .method("extents", extents)
        .method("text_extents", text_extents)
        .method("glyph_extents", glyph_extents)
        .method("text_to_glyphs", text_to_glyphs)
        .method("get_font_face", get_font_face)
        .method("get_font_matrix", get_font_matrix)
        .method("get_ctm", get_ctm)
        .method("get_scale_matrix", get_scale_matrix)
        .method("get_font_options", get_font_options)
        .method("get_type", get_type);
    registry.register_type(entry);
}

fn check_font(ctx: &CallContext<'_>, font: NativePtr) -> BindingResult<()> {
    ctx.check(ctx.cairo().status(font))
}

fn extents(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let extents = ctx.cairo().scaled_font_extents(font);
    ctx.push(font_extents_to_value(&extents));
    Ok(())
}

fn text_extents(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let text: String = ctx.arg(2)?;
    let extents = ctx.cairo().scaled_font_text_extents(font, &text);
    check_font(ctx, font)?;
    ctx.push(text_extents_to_value(&extents));
    Ok(())
}

fn glyph_extents(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let glyphs = ctx.arg_with(2, glyphs_from_value)?;
    let extents = ctx.cairo().scaled_font_glyph_extents(font, &glyphs);
    check_font(ctx, font)?;
    ctx.push(text_extents_to_value(&extents));
    Ok(())
}

/// Shape `text` starting at `(x, y)`; returns the glyph array and the
/// cluster table.
fn text_to_glyphs(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let x: f64 = ctx.arg(2)?;
    let y: f64 = ctx.arg(3)?;
    let text: String = ctx.arg(4)?;
    let shaped = ctx.check_result(ctx.cairo().scaled_font_text_to_glyphs(font, x, y, &text, true))?;
    ctx.push(glyphs_to_value(&shaped.glyphs));
    ctx.push(clusters_to_value(&shaped.clusters, shaped.flags));
    Ok(())
}

fn get_font_face(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    if let Some(face) = ctx.cairo().scaled_font_get_font_face(font) {
        ctx.push_borrowed(tags::FONT_FACE, face);
    }
    Ok(())
}

fn get_font_matrix(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let matrix = ctx.cairo().scaled_font_get_font_matrix(font);
    ctx.push(matrix_to_value(&matrix));
    Ok(())
}

fn get_ctm(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let matrix = ctx.cairo().scaled_font_get_ctm(font);
    ctx.push(matrix_to_value(&matrix));
    Ok(())
}

fn get_scale_matrix(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let matrix = ctx.cairo().scaled_font_get_scale_matrix(font);
    ctx.push(matrix_to_value(&matrix));
    Ok(())
}

fn get_font_options(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let options = ctx.cairo().font_options_create();
    ctx.cairo().scaled_font_get_font_options(font, options);
    ctx.push_handle(tags::FONT_OPTIONS, options);
    Ok(())
}

fn get_type(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let font = ctx.receiver(tags::SCALED_FONT)?;
    let kind = ctx.cairo().scaled_font_get_type(font);
    ctx.push(kind);
    Ok(())
}
