//! Surface methods.

use oocairo_core::{BindingResult, ConversionError, Value, tags};
use oocairo_native::{Cairo, Content, SurfaceType};

use super::{push_pair, same_object, status};
use crate::call::CallContext;
use crate::callback::{StreamTarget, StreamWriter};
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::SURFACE, "cairo surface object")
        .finalizer(Cairo::destroy)
        .method("__eq", same_object(tags::SURFACE))
        .method("status", status(tags::SURFACE))
        .method("create_similar", create_similar)
        .method("create_for_rectangle", create_for_rectangle)
        .method("finish", finish)
        .method("flush", flush)
        .method("mark_dirty", mark_dirty)
        .method("get_type", get_type)
        .method("get_content", get_content)
        .method("get_format", get_format)
        .method("get_width", get_width)
        .method("get_height", get_height)
        .method("get_stride", get_stride)
        .method("get_data", get_data)
        .method("get_device_offset", get_device_offset)
        .method("set_device_offset", set_device_offset)
        .method("get_fallback_resolution", get_fallback_resolution)
        .method("set_fallback_resolution", set_fallback_resolution)
        .method("get_font_options", get_font_options)
        .method("has_show_text_glyphs", has_show_text_glyphs)
        .method("copy_page", copy_page)
        .method("show_page", show_page)
        .method("write_to_stream", write_to_stream);
    registry.register_type(entry);
}

/// Create a surface compatible with `other`. Shared with the
/// `surface_create_similar` module function.
pub(super) fn create_similar(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let other = ctx.receiver(tags::SURFACE)?;
    let content: Content = ctx.arg(2)?;
    let width: i32 = ctx.arg(3)?;
    let height: i32 = ctx.arg(4)?;
    let surface = ctx.cairo().surface_create_similar(other, content, width, height);
    ctx.push_handle(tags::SURFACE, surface);
    Ok(())
}

/// `surface:create_for_rectangle(x, y, width, height)`: a sub-surface
/// drawing into part of this one.
fn create_for_rectangle(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let target = ctx.receiver(tags::SURFACE)?;
    let x: f64 = ctx.arg(2)?;
    let y: f64 = ctx.arg(3)?;
    let width = non_negative(ctx, 4, "surface width")?;
    let height = non_negative(ctx, 5, "surface height")?;
    let surface = ctx.cairo().surface_create_for_rectangle(target, x, y, width, height);
    ctx.push_handle(tags::SURFACE, surface);
    Ok(())
}

fn non_negative(ctx: &CallContext<'_>, position: usize, what: &'static str) -> BindingResult<f64> {
    let value: f64 = ctx.arg(position)?;
    if value < 0.0 {
        return Err(ctx.argument_error(position, ConversionError::Negative { what }));
    }
    Ok(value)
}

fn finish(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    ctx.cairo().surface_finish(surface);
    Ok(())
}

fn flush(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    ctx.cairo().surface_flush(surface);
    Ok(())
}

fn mark_dirty(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    ctx.cairo().surface_mark_dirty(surface);
    Ok(())
}

fn get_type(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let kind = ctx.cairo().surface_get_type(surface);
    ctx.push(kind);
    Ok(())
}

fn get_content(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let content = ctx.cairo().surface_get_content(surface);
    ctx.push(content);
    Ok(())
}

// ============================================================================
// Image surfaces
// ============================================================================

fn get_format(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let format = ctx.check_result(ctx.cairo().image_surface_get_format(surface))?;
    ctx.push(format);
    Ok(())
}

fn get_width(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let width = ctx.check_result(ctx.cairo().image_surface_get_width(surface))?;
    ctx.push(width);
    Ok(())
}

fn get_height(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let height = ctx.check_result(ctx.cairo().image_surface_get_height(surface))?;
    ctx.push(height);
    Ok(())
}

fn get_stride(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let stride = ctx.check_result(ctx.cairo().image_surface_get_stride(surface))?;
    ctx.push(stride);
    Ok(())
}

/// Pixel bytes and stride of an image surface; nothing for other surfaces.
fn get_data(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let cairo = ctx.cairo();
    if cairo.surface_get_type(surface) != SurfaceType::Image {
        return Ok(());
    }
    let data = ctx.check_result(cairo.image_surface_get_data(surface))?;
    let stride = ctx.check_result(cairo.image_surface_get_stride(surface))?;
    ctx.push(Value::bytes(data));
    ctx.push(stride);
    Ok(())
}

// ============================================================================
// Device parameters
// ============================================================================

fn get_device_offset(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let offset = ctx.cairo().surface_get_device_offset(surface);
    push_pair(ctx, offset);
    Ok(())
}

fn set_device_offset(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let x: f64 = ctx.arg(2)?;
    let y: f64 = ctx.arg(3)?;
    ctx.cairo().surface_set_device_offset(surface, x, y);
    Ok(())
}

fn get_fallback_resolution(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let resolution = ctx.cairo().surface_get_fallback_resolution(surface);
    push_pair(ctx, resolution);
    Ok(())
}

fn set_fallback_resolution(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let x_ppi: f64 = ctx.arg(2)?;
    let y_ppi: f64 = ctx.arg(3)?;
    ctx.cairo().surface_set_fallback_resolution(surface, x_ppi, y_ppi);
    Ok(())
}

fn get_font_options(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let options = ctx.cairo().surface_get_font_options(surface);
    ctx.push_handle(tags::FONT_OPTIONS, options);
    Ok(())
}

fn has_show_text_glyphs(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let has = ctx.cairo().surface_has_show_text_glyphs(surface);
    ctx.push(has);
    Ok(())
}

fn copy_page(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    ctx.cairo().surface_copy_page(surface);
    Ok(())
}

fn show_page(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    ctx.cairo().surface_show_page(surface);
    Ok(())
}

// ============================================================================
// Streams
// ============================================================================

/// Write the surface to a host function or a file handle with a `write`
/// method.
fn write_to_stream(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let surface = ctx.receiver(tags::SURFACE)?;
    let target = ctx.arg_with(2, |v| StreamTarget::resolve(v, "write"))?;
    let mut writer = StreamWriter::new(ctx.runtime(), target);
    let result = ctx
        .cairo()
        .surface_write_to_stream(surface, &mut |chunk: &[u8]| writer.write(chunk));
    ctx.check_result(result)
}
