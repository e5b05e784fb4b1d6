//! Drawing context methods.

use oocairo_core::records::{
    clusters_from_value, dashes_from_value, font_extents_to_value, glyphs_from_value, matrix_from_value,
    matrix_to_value, text_extents_to_value,
};
use oocairo_core::{BindingResult, ConversionError, FromValue, Value, tags};
use oocairo_native::{Antialias, Cairo, Content, FillRule, FontSlant, FontWeight, LineCap, LineJoin, Operator};

use super::{push_box, push_pair, same_object, status};
use crate::call::CallContext;
use crate::dispatch::Source;
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::CONTEXT, "cairo context object")
        .finalizer(Cairo::destroy)
        .method("__eq", same_object(tags::CONTEXT))
        .method("status", status(tags::CONTEXT))
        .method("save", save)
        .method("restore", restore)
        .method("get_target", get_target)
        .method("push_group", push_group)
        .method("pop_group", pop_group)
        .method("pop_group_to_source", pop_group_to_source)
        .method("get_group_target", get_group_target)
        .method("set_source_rgb", set_source_rgb)
        .method("set_source_rgba", set_source_rgba)
        .method("set_source", set_source)
        .method("get_source", get_source)
        .method("set_source_gdk_color", set_source_gdk_color)
        .method("set_antialias", set_antialias)
        .method("get_antialias", get_antialias)
        .method("set_dash", set_dash)
        .method("get_dash", get_dash)
        .method("set_fill_rule", set_fill_rule)
        .method("get_fill_rule", get_fill_rule)
        .method("set_line_cap", set_line_cap)
        .method("get_line_cap", get_line_cap)
        .method("set_line_join", set_line_join)
        .method("get_line_join", get_line_join)
        .method("set_line_width", set_line_width)
        .method("get_line_width", get_line_width)
        .method("set_miter_limit", set_miter_limit)
        .method("get_miter_limit", get_miter_limit)
        .method("set_operator", set_operator)
        .method("get_operator", get_operator)
        .method("set_tolerance", set_tolerance)
        .method("get_tolerance", get_tolerance)
        .method("translate", translate)
        .method("scale", scale)
        .method("rotate", rotate)
        .method("transform", transform)
        .method("set_matrix", set_matrix)
        .method("get_matrix", get_matrix)
        .method("identity_matrix", identity_matrix)
        .method("user_to_device", user_to_device)
        .method("user_to_device_distance", user_to_device_distance)
        .method("device_to_user", device_to_user)
        .method("device_to_user_distance", device_to_user_distance)
        .method("new_path", new_path)
        .method("new_sub_path", new_sub_path)
        .method("move_to", move_to)
        .method("line_to", line_to)
        .method("curve_to", curve_to)
        .method("arc", arc)
        .method("arc_negative", arc_negative)
        .method("rel_move_to", rel_move_to)
        .method("rel_line_to", rel_line_to)
        .method("rel_curve_to", rel_curve_to)
        .method("rectangle", rectangle)
        .method("close_path", close_path)
        .method("get_current_point", get_current_point)
        .method("has_current_point", has_current_point)
        .method("copy_path", copy_path)
        .method("copy_path_flat", copy_path_flat)
        .method("append_path", append_path)
        .method("path_extents", path_extents)
        .method("paint", paint)
        .method("paint_with_alpha", paint_with_alpha)
        .method("mask", mask)
        .method("stroke", stroke)
        .method("stroke_preserve", stroke_preserve)
        .method("fill", fill)
        .method("fill_preserve", fill_preserve)
        .method("clip", clip)
        .method("clip_preserve", clip_preserve)
        .method("reset_clip", reset_clip)
        .method("clip_extents", clip_extents)
        .method("fill_extents", fill_extents)
        .method("stroke_extents", stroke_extents)
        .method("in_fill", in_fill)
        .method("in_stroke", in_stroke)
        .method("in_clip", in_clip)
        .method("select_font_face", select_font_face)
        .method("set_font_size", set_font_size)
        .method("set_font_matrix", set_font_matrix)
        .method("get_font_matrix", get_font_matrix)
        .method("set_font_options", set_font_options)
        .method("get_font_options", get_font_options)
        .method("set_font_face", set_font_face)
        .method("get_font_face", get_font_face)
        .method("set_scaled_font", set_scaled_font)
        .method("get_scaled_font", get_scaled_font)
        .method("show_text", show_text)
        .method("show_glyphs", show_glyphs)
        .method("show_text_glyphs", show_text_glyphs)
        .method("text_path", text_path)
        .method("glyph_path", glyph_path)
        .method("text_extents", text_extents)
        .method("glyph_extents", glyph_extents)
        .method("font_extents", font_extents);
    registry.register_type(entry);
}

// ============================================================================
// Generated methods
// ============================================================================

/// Methods taking only the receiver.
macro_rules! no_args {
    ($($name:ident),* $(,)?) => {
        $(
            fn $name(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let cr = ctx.receiver(tags::CONTEXT)?;
                ctx.cairo().$name(cr);
                Ok(())
            }
        )*
    };
}

/// Methods taking numbers at fixed positions.
macro_rules! numbers {
    ($($name:ident($($arg:ident: $pos:literal),+);)*) => {
        $(
            fn $name(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let cr = ctx.receiver(tags::CONTEXT)?;
                $(let $arg: f64 = ctx.arg($pos)?;)+
                ctx.cairo().$name(cr, $($arg),+);
                Ok(())
            }
        )*
    };
}

/// Setter and getter pairs for one graphics state value.
macro_rules! state {
    ($($set:ident / $get:ident: $ty:ty;)*) => {
        $(
            fn $set(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let cr = ctx.receiver(tags::CONTEXT)?;
                let value: $ty = ctx.arg(2)?;
                ctx.cairo().$set(cr, value);
                Ok(())
            }

            fn $get(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let cr = ctx.receiver(tags::CONTEXT)?;
                let value: $ty = ctx.cairo().$get(cr);
                ctx.push(value);
                Ok(())
            }
        )*
    };
}

/// Coordinate conversions returning a pair.
macro_rules! coordinates {
    ($($name:ident),* $(,)?) => {
        $(
            fn $name(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let cr = ctx.receiver(tags::CONTEXT)?;
                let x: f64 = ctx.arg(2)?;
                let y: f64 = ctx.arg(3)?;
                let point = ctx.cairo().$name(cr, x, y);
                push_pair(ctx, point);
                Ok(())
            }
        )*
    };
}

/// Extents queries returning `x1, y1, x2, y2`.
macro_rules! extents {
    ($($name:ident),* $(,)?) => {
        $(
            fn $name(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let cr = ctx.receiver(tags::CONTEXT)?;
                let extents = ctx.cairo().$name(cr);
                push_box(ctx, extents);
                Ok(())
            }
        )*
    };
}

/// Hit tests returning a boolean.
macro_rules! hit_tests {
    ($($name:ident),* $(,)?) => {
        $(
            fn $name(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let cr = ctx.receiver(tags::CONTEXT)?;
                let x: f64 = ctx.arg(2)?;
                let y: f64 = ctx.arg(3)?;
                let inside = ctx.cairo().$name(cr, x, y);
                ctx.push(inside);
                Ok(())
            }
        )*
    };
}

no_args!(
    save,
    restore,
    pop_group_to_source,
    identity_matrix,
    new_path,
    new_sub_path,
    close_path,
    paint,
    stroke,
    stroke_preserve,
    fill,
    fill_preserve,
    clip,
    clip_preserve,
    reset_clip,
);

numbers! {
    set_source_rgb(red: 2, green: 3, blue: 4);
    set_source_rgba(red: 2, green: 3, blue: 4, alpha: 5);
    translate(tx: 2, ty: 3);
    scale(sx: 2, sy: 3);
    rotate(radians: 2);
    move_to(x: 2, y: 3);
    line_to(x: 2, y: 3);
    curve_to(x1: 2, y1: 3, x2: 4, y2: 5, x3: 6, y3: 7);
    arc(xc: 2, yc: 3, radius: 4, angle1: 5, angle2: 6);
    arc_negative(xc: 2, yc: 3, radius: 4, angle1: 5, angle2: 6);
    rel_move_to(dx: 2, dy: 3);
    rel_line_to(dx: 2, dy: 3);
    rel_curve_to(dx1: 2, dy1: 3, dx2: 4, dy2: 5, dx3: 6, dy3: 7);
    rectangle(x: 2, y: 3, width: 4, height: 5);
    paint_with_alpha(alpha: 2);
    set_font_size(size: 2);
}

state! {
    set_antialias / get_antialias: Antialias;
    set_fill_rule / get_fill_rule: FillRule;
    set_line_cap / get_line_cap: LineCap;
    set_line_join / get_line_join: LineJoin;
    set_line_width / get_line_width: f64;
    set_miter_limit / get_miter_limit: f64;
    set_operator / get_operator: Operator;
    set_tolerance / get_tolerance: f64;
}

coordinates!(user_to_device, user_to_device_distance, device_to_user, device_to_user_distance);

extents!(path_extents, clip_extents, fill_extents, stroke_extents);

hit_tests!(in_fill, in_stroke, in_clip);

// ============================================================================
// Groups and sources
// ============================================================================

fn get_target(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    if let Some(surface) = ctx.cairo().get_target(cr) {
        ctx.push_borrowed(tags::SURFACE, surface);
    }
    Ok(())
}

fn get_group_target(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    if let Some(surface) = ctx.cairo().get_group_target(cr) {
        ctx.push_borrowed(tags::SURFACE, surface);
    }
    Ok(())
}

fn push_group(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let content = ctx.arg_or(2, Content::ColorAlpha)?;
    ctx.cairo().push_group_with_content(cr, content);
    Ok(())
}

fn pop_group(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let pattern = ctx.cairo().pop_group(cr);
    ctx.push_handle(tags::PATTERN, pattern);
    Ok(())
}

fn set_source(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    match Source::from_arg(ctx, 2)? {
        Source::Pattern(pattern) => ctx.cairo().set_source(cr, pattern),
        Source::Surface(surface) => {
            let x = ctx.arg_or(3, 0.0)?;
            let y = ctx.arg_or(4, 0.0)?;
            ctx.cairo().set_source_surface(cr, surface, x, y);
        }
    }
    Ok(())
}

fn get_source(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    if let Some(pattern) = ctx.cairo().get_source(cr) {
        ctx.push_borrowed(tags::PATTERN, pattern);
    }
    Ok(())
}

/// Color tables with 16-bit `red`, `green` and `blue` fields.
fn gdk_color(value: &Value) -> Result<[f64; 3], ConversionError> {
    if value.as_table().is_none() {
        return Err(ConversionError::TypeMismatch {
            expected: "table",
            actual: value.type_name(),
        });
    }
    let component = |field: &'static str| match value.get(field) {
        Value::Nil => Err(ConversionError::MissingField { field }),
        v => f64::from_value(&v)
            .map(|n| n / 65535.0)
            .map_err(|e| ConversionError::field(field, e)),
    };
    Ok([component("red")?, component("green")?, component("blue")?])
}

fn set_source_gdk_color(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let [red, green, blue] = ctx.arg_with(2, gdk_color)?;
    match ctx.arg::<Option<f64>>(3)? {
        Some(alpha) => ctx.cairo().set_source_rgba(cr, red, green, blue, alpha / 65535.0),
        None => ctx.cairo().set_source_rgb(cr, red, green, blue),
    }
    Ok(())
}

fn mask(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    match Source::from_arg(ctx, 2)? {
        Source::Pattern(pattern) => ctx.cairo().mask(cr, pattern),
        Source::Surface(surface) => {
            let x = ctx.arg_or(3, 0.0)?;
            let y = ctx.arg_or(4, 0.0)?;
            ctx.cairo().mask_surface(cr, surface, x, y);
        }
    }
    Ok(())
}

// ============================================================================
// Stroke parameters and transformations
// ============================================================================

fn set_dash(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let dashes = ctx.arg_with(2, dashes_from_value)?;
    let offset: f64 = ctx.arg(3)?;
    ctx.cairo().set_dash(cr, &dashes, offset);
    Ok(())
}

fn get_dash(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let (dashes, offset) = ctx.cairo().get_dash(cr);
    ctx.push(Value::numbers(dashes));
    ctx.push(offset);
    Ok(())
}

fn transform(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let matrix = ctx.arg_with(2, matrix_from_value)?;
    ctx.cairo().transform(cr, &matrix);
    Ok(())
}

fn set_matrix(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let matrix = ctx.arg_with(2, matrix_from_value)?;
    ctx.cairo().set_matrix(cr, &matrix);
    Ok(())
}

fn get_matrix(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let matrix = ctx.cairo().get_matrix(cr);
    ctx.push(matrix_to_value(&matrix));
    Ok(())
}

// ============================================================================
// Paths
// ============================================================================

fn get_current_point(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    if ctx.cairo().has_current_point(cr) {
        let point = ctx.cairo().get_current_point(cr);
        push_pair(ctx, point);
    }
    Ok(())
}

fn has_current_point(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let has = ctx.cairo().has_current_point(cr);
    ctx.push(has);
    Ok(())
}

fn copy_path(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let path = ctx.cairo().copy_path(cr);
    ctx.push_handle(tags::PATH, path);
    Ok(())
}

fn copy_path_flat(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let path = ctx.cairo().copy_path_flat(cr);
    ctx.push_handle(tags::PATH, path);
    Ok(())
}

fn append_path(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let path = ctx.handle(2, tags::PATH)?;
    ctx.cairo().append_path(cr, path);
    Ok(())
}

// ============================================================================
// Fonts and text
// ============================================================================

fn select_font_face(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let family: String = ctx.arg(2)?;
    let slant = ctx.arg_or(3, FontSlant::Normal)?;
    let weight = ctx.arg_or(4, FontWeight::Normal)?;
    ctx.cairo().select_font_face(cr, &family, slant, weight);
    Ok(())
}

fn set_font_matrix(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let matrix = ctx.arg_with(2, matrix_from_value)?;
    ctx.cairo().set_font_matrix(cr, &matrix);
    Ok(())
}

fn get_font_matrix(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let matrix = ctx.cairo().get_font_matrix(cr);
    ctx.push(matrix_to_value(&matrix));
    Ok(())
}

fn set_font_options(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let options = ctx.handle(2, tags::FONT_OPTIONS)?;
    ctx.cairo().set_font_options(cr, options);
    Ok(())
}

fn get_font_options(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let options = ctx.cairo().font_options_create();
    ctx.cairo().get_font_options(cr, options);
    ctx.push_handle(tags::FONT_OPTIONS, options);
    Ok(())
}

/// `nil` restores the default toy face.
fn set_font_face(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    match ctx.opt_handle(2, tags::FONT_FACE)? {
        Some(face) => ctx.cairo().set_font_face(cr, face),
        None => ctx
            .cairo()
            .select_font_face(cr, "", FontSlant::Normal, FontWeight::Normal),
    }
    Ok(())
}

fn get_font_face(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    if let Some(face) = ctx.cairo().get_font_face(cr) {
        ctx.push_borrowed(tags::FONT_FACE, face);
    }
    Ok(())
}

fn set_scaled_font(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let font = ctx.handle(2, tags::SCALED_FONT)?;
    ctx.cairo().set_scaled_font(cr, font);
    Ok(())
}

fn get_scaled_font(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let font = ctx.check_result(ctx.cairo().get_scaled_font(cr))?;
    ctx.push_borrowed(tags::SCALED_FONT, font);
    Ok(())
}

fn show_text(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let text: String = ctx.arg(2)?;
    ctx.cairo().show_text(cr, &text);
    // A user font callback may have failed during the call.
    let status = ctx.cairo().status(cr);
    ctx.check(status)
}

fn text_path(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let text: String = ctx.arg(2)?;
    ctx.cairo().text_path(cr, &text);
    let status = ctx.cairo().status(cr);
    ctx.check(status)
}

fn show_glyphs(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let glyphs = ctx.arg_with(2, glyphs_from_value)?;
    ctx.cairo().show_glyphs(cr, &glyphs);
    let status = ctx.cairo().status(cr);
    ctx.check(status)
}

fn show_text_glyphs(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let text: String = ctx.arg(2)?;
    let glyphs = ctx.arg_with(3, glyphs_from_value)?;
    let (clusters, flags) = ctx.arg_with(4, clusters_from_value)?;
    ctx.cairo().show_text_glyphs(cr, &text, &glyphs, &clusters, flags);
    let status = ctx.cairo().status(cr);
    ctx.check(status)
}

fn glyph_path(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let glyphs = ctx.arg_with(2, glyphs_from_value)?;
    ctx.cairo().glyph_path(cr, &glyphs);
    let status = ctx.cairo().status(cr);
    ctx.check(status)
}

fn text_extents(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let text: String = ctx.arg(2)?;
    let extents = ctx.cairo().text_extents(cr, &text);
    ctx.check(ctx.cairo().status(cr))?;
    ctx.push(text_extents_to_value(&extents));
    Ok(())
}

fn glyph_extents(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let glyphs = ctx.arg_with(2, glyphs_from_value)?;
    let extents = ctx.cairo().glyph_extents(cr, &glyphs);
    ctx.check(ctx.cairo().status(cr))?;
    ctx.push(text_extents_to_value(&extents));
    Ok(())
}

fn font_extents(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cr = ctx.receiver(tags::CONTEXT)?;
    let extents = ctx.cairo().font_extents(cr);
    ctx.check(ctx.cairo().status(cr))?;
    ctx.push(font_extents_to_value(&extents));
    Ok(())
}
