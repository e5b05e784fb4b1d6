//! Module functions: constructors and library queries.

use std::rc::Rc;

use oocairo_core::records::{matrix_from_value, rectangle_from_value, rectangles_from_value};
use oocairo_core::{BindingResult, ConversionError, tags};
use oocairo_native::{Cairo, Content, Extents, Features, FontOptions, FontSlant, FontWeight, Format};

use super::{matrix, push_box, surface};
use crate::call::CallContext;
use crate::callback::{CallbackSet, StreamReader, StreamTarget, UserFontTrampoline};
use crate::registry::TypeRegistry;

pub(super) fn register(registry: &mut TypeRegistry) {
    let always = Features::empty();
    registry.register_function("check_version", always, check_version);
    registry.register_function("check_runtime_version", always, check_runtime_version);
    registry.register_function("format_stride_for_width", always, format_stride_for_width);

    registry.register_function("context_create", always, context_create);

    registry.register_function("image_surface_create", always, image_surface_create);
    registry.register_function("image_surface_create_from_data", always, image_surface_create_from_data);
    registry.register_function("image_surface_create_from_stream", always, image_surface_create_from_stream);
    registry.register_function("surface_create_similar", always, surface::create_similar);
    registry.register_function("recording_surface_create", Features::RECORDING_SURFACE, recording_surface_create);
    registry.register_function(
        "recording_surface_ink_extents",
        Features::RECORDING_SURFACE,
        recording_surface_ink_extents,
    );

    registry.register_function("pattern_create_rgb", always, pattern_create_rgb);
    registry.register_function("pattern_create_rgba", always, pattern_create_rgba);
    registry.register_function("pattern_create_for_surface", always, pattern_create_for_surface);
    registry.register_function("pattern_create_linear", always, pattern_create_linear);
    registry.register_function("pattern_create_radial", always, pattern_create_radial);

    registry.register_function("toy_font_face_create", always, toy_font_face_create);
    registry.register_function("user_font_face_create", Features::USER_FONT, user_font_face_create);
    registry.register_function("scaled_font_create", always, scaled_font_create);
    registry.register_function("font_options_create", always, font_options_create);

    registry.register_function("matrix_create", always, matrix::create);

    registry.register_function("region_create", always, region_create);
    registry.register_function("region_create_rectangle", always, region_create_rectangle);
    registry.register_function("region_create_rectangles", always, region_create_rectangles);
}

// ============================================================================
// Library queries
// ============================================================================

fn encode_version(major: u32, minor: u32, micro: u32) -> u32 {
    major * 10000 + minor * 100 + micro
}

fn requested_version(ctx: &CallContext<'_>) -> BindingResult<u32> {
    let major: u32 = ctx.arg(1)?;
    let minor: u32 = ctx.arg(2)?;
    let micro: u32 = ctx.arg(3)?;
    Ok(encode_version(major, minor, micro))
}

/// Whether the library the binding was built against is at least the
/// requested version.
fn check_version(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let requested = requested_version(ctx)?;
    let (major, minor, micro) = Cairo::VERSION;
    ctx.push(encode_version(major, minor, micro) >= requested);
    Ok(())
}

/// Like `check_version`, against the library loaded at run time.
fn check_runtime_version(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let requested = requested_version(ctx)?;
    let runtime = ctx.cairo().version();
    ctx.push(runtime >= requested);
    Ok(())
}

/// Row stride for an image of the given format and width, `-1` if the width
/// is too large.
fn format_stride_for_width(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let format: Format = ctx.arg(1)?;
    let width: i32 = ctx.arg(2)?;
    let stride = ctx.cairo().format_stride_for_width(format, width).unwrap_or(-1);
    ctx.push(stride);
    Ok(())
}

fn context_create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let target = ctx.handle(1, tags::SURFACE)?;
    let cr = ctx.cairo().create(target);
    ctx.push_handle(tags::CONTEXT, cr);
    Ok(())
}

// ============================================================================
// Surfaces
// ============================================================================

fn dimension(ctx: &CallContext<'_>, position: usize, what: &'static str) -> BindingResult<i32> {
    let n: i32 = ctx.arg(position)?;
    if n < 0 {
        return Err(ctx.argument_error(position, ConversionError::Negative { what }));
    }
    Ok(n)
}

fn image_surface_create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let format: Format = ctx.arg(1)?;
    let width = dimension(ctx, 2, "image width")?;
    let height = dimension(ctx, 3, "image height")?;
    let surface = ctx.cairo().image_surface_create(format, width, height);
    ctx.push_handle(tags::SURFACE, surface);
    Ok(())
}

/// `image_surface_create_from_data(data, format, width, height, stride)`.
/// The surface keeps its own copy of `data`.
fn image_surface_create_from_data(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let data = ctx.arg_with(1, oocairo_core::convert::bytes)?;
    let format: Format = ctx.arg(2)?;
    let width = dimension(ctx, 3, "image width")?;
    let height = dimension(ctx, 4, "image height")?;
    let stride: i32 = ctx.arg(5)?;

    let min_stride = ctx.cairo().format_stride_for_width(format, width);
    if min_stride.is_none_or(|min| stride < min) {
        return Err(ctx.argument_error(
            5,
            ConversionError::invalid("stride value too small for this width and pixel format"),
        ));
    }
    if (data.len() as u64) < stride as u64 * height as u64 {
        return Err(ctx.argument_error(
            1,
            ConversionError::invalid("image data string not long enough for this image size"),
        ));
    }

    let surface = ctx
        .cairo()
        .image_surface_create_for_data(data, format, width, height, stride);
    ctx.push_handle(tags::SURFACE, surface);
    Ok(())
}

/// Read an image from a host function or a file handle with a `read`
/// method.
fn image_surface_create_from_stream(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let source = ctx.arg_with(1, |v| StreamTarget::resolve(v, "read"))?;
    let mut reader = StreamReader::new(ctx.runtime(), source);
    let cairo = ctx.cairo();
    let surface = cairo.image_surface_create_from_stream(&mut |len: usize| reader.read(len));
    let status = cairo.status(surface);
    if !status.is_success() {
        cairo.destroy(surface);
        return Err(ctx.native_error(status));
    }
    ctx.push_handle(tags::SURFACE, surface);
    Ok(())
}

/// `recording_surface_create(content [, x, y, width, height])`; without
/// extents the surface is unbounded.
fn recording_surface_create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let content: Content = ctx.arg(1)?;
    let extents = if ctx.arg_count() > 1 {
        let x: f64 = ctx.arg(2)?;
        let y: f64 = ctx.arg(3)?;
        let width: f64 = ctx.arg(4)?;
        let height: f64 = ctx.arg(5)?;
        if width < 0.0 {
            return Err(ctx.argument_error(4, ConversionError::Negative { what: "recording surface width" }));
        }
        if height < 0.0 {
            return Err(ctx.argument_error(5, ConversionError::Negative { what: "recording surface height" }));
        }
        Some(Extents::new(x, y, x + width, y + height))
    } else {
        None
    };
    let surface = ctx.cairo().recording_surface_create(content, extents);
    ctx.push_handle(tags::SURFACE, surface);
    Ok(())
}

/// `x, y, width, height` of everything drawn on a recording surface.
fn recording_surface_ink_extents(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.handle(1, tags::SURFACE)?;
    let extents = ctx.check_result(ctx.cairo().recording_surface_ink_extents(surface))?;
    push_box(ctx, extents);
    Ok(())
}

// ============================================================================
// Patterns
// ============================================================================

fn pattern_create_rgb(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let red: f64 = ctx.arg(1)?;
    let green: f64 = ctx.arg(2)?;
    let blue: f64 = ctx.arg(3)?;
    let pattern = ctx.cairo().pattern_create_rgb(red, green, blue);
    ctx.push_handle(tags::PATTERN, pattern);
    Ok(())
}

fn pattern_create_rgba(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let red: f64 = ctx.arg(1)?;
    let green: f64 = ctx.arg(2)?;
    let blue: f64 = ctx.arg(3)?;
    let alpha: f64 = ctx.arg(4)?;
    let pattern = ctx.cairo().pattern_create_rgba(red, green, blue, alpha);
    ctx.push_handle(tags::PATTERN, pattern);
    Ok(())
}

fn pattern_create_for_surface(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.handle(1, tags::SURFACE)?;
    let pattern = ctx.cairo().pattern_create_for_surface(surface);
    ctx.push_handle(tags::PATTERN, pattern);
    Ok(())
}

fn pattern_create_linear(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let x0: f64 = ctx.arg(1)?;
    let y0: f64 = ctx.arg(2)?;
    let x1: f64 = ctx.arg(3)?;
    let y1: f64 = ctx.arg(4)?;
    let pattern = ctx.cairo().pattern_create_linear(x0, y0, x1, y1);
    ctx.push_handle(tags::PATTERN, pattern);
    Ok(())
}

fn pattern_create_radial(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let cx0: f64 = ctx.arg(1)?;
    let cy0: f64 = ctx.arg(2)?;
    let r0: f64 = ctx.arg(3)?;
    let cx1: f64 = ctx.arg(4)?;
    let cy1: f64 = ctx.arg(5)?;
    let r1: f64 = ctx.arg(6)?;
    let pattern = ctx.cairo().pattern_create_radial(cx0, cy0, r0, cx1, cy1, r1);
    ctx.push_handle(tags::PATTERN, pattern);
    Ok(())
}

// ============================================================================
// Fonts
// ============================================================================

fn toy_font_face_create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let family: String = ctx.arg(1)?;
    let slant = ctx.arg_or(2, FontSlant::Normal)?;
    let weight = ctx.arg_or(3, FontWeight::Normal)?;
    let face = ctx.cairo().toy_font_face_create(&family, slant, weight);
    ctx.push_handle(tags::FONT_FACE, face);
    Ok(())
}

/// Create a font face rendered by host callbacks. The callbacks stay
/// retained until the native face is destroyed.
fn user_font_face_create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let options = ctx.value(1);
    if options.as_table().is_none() {
        return Err(ctx.argument_error(
            1,
            ConversionError::TypeMismatch {
                expected: "table",
                actual: options.type_name(),
            },
        ));
    }
    let set = CallbackSet::from_options(ctx.function(), &options)?;
    let runtime = ctx.runtime();
    let id = runtime.install_callbacks(set);
    let face = ctx
        .cairo()
        .user_font_face_create(Rc::new(UserFontTrampoline::new(runtime, id)));
    ctx.push_handle(tags::FONT_FACE, face);
    Ok(())
}

/// `scaled_font_create(face, font_matrix, ctm [, options])`.
fn scaled_font_create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let face = ctx.handle(1, tags::FONT_FACE)?;
    let font_matrix = ctx.arg_with(2, matrix_from_value)?;
    let ctm = ctx.arg_with(3, matrix_from_value)?;
    let options = match ctx.opt_handle(4, tags::FONT_OPTIONS)? {
        Some(options) => ctx.cairo().font_options_get(options),
        None => FontOptions::default(),
    };
    let cairo = ctx.cairo();
    let font = cairo.scaled_font_create(face, &font_matrix, &ctm, &options);
    // A user font's init callback runs during creation.
    let status = cairo.status(font);
    if !status.is_success() {
        cairo.destroy(font);
        return Err(ctx.native_error(status));
    }
    ctx.push_handle(tags::SCALED_FONT, font);
    Ok(())
}

fn font_options_create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let options = ctx.cairo().font_options_create();
    ctx.push_handle(tags::FONT_OPTIONS, options);
    Ok(())
}

// ============================================================================
// Regions
// ============================================================================

fn region_create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.cairo().region_create();
    ctx.push_handle(tags::REGION, region);
    Ok(())
}

fn region_create_rectangle(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let rect = ctx.arg_with(1, rectangle_from_value)?;
    let region = ctx.cairo().region_create_rectangle(&rect);
    ctx.push_handle(tags::REGION, region);
    Ok(())
}

fn region_create_rectangles(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let rects = ctx.arg_with(1, rectangles_from_value)?;
    let region = ctx.cairo().region_create_rectangles(&rects);
    ctx.push_handle(tags::REGION, region);
    Ok(())
}
