//! Pattern methods.

use oocairo_core::records::{color_stops_to_value, matrix_from_value, matrix_to_value};
use oocairo_core::{BindingResult, tags};
use oocairo_native::{Cairo, Extend, Filter};

use super::{push_box, same_object, status};
use crate::call::CallContext;
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::PATTERN, "cairo pattern object")
        .finalizer(Cairo::destroy)
        .method("__eq", same_object(tags::PATTERN))
        .method("status", status(tags::PATTERN))
        .method("get_type", get_type)
        .method("add_color_stop_rgb", add_color_stop_rgb)
        .method("add_color_stop_rgba", add_color_stop_rgba)
        .method("get_color_stops", get_color_stops)
        .method("get_rgba", get_rgba)
        .method("get_surface", get_surface)
        .method("get_linear_points", get_linear_points)
        .method("get_radial_circles", get_radial_circles)
        .method("set_extend", set_extend)
        .method("get_extend", get_extend)
        .method("set_filter", set_filter)
        .method("get_filter", get_filter)
        .method("set_matrix", set_matrix)
        .method("get_matrix", get_matrix);
    registry.register_type(entry);
}

fn get_type(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let kind = ctx.cairo().pattern_get_type(pattern);
    ctx.push(kind);
    Ok(())
}

// ============================================================================
// Gradients
// ============================================================================

fn add_color_stop_rgb(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let offset: f64 = ctx.arg(2)?;
    let red: f64 = ctx.arg(3)?;
    let green: f64 = ctx.arg(4)?;
    let blue: f64 = ctx.arg(5)?;
    ctx.cairo().pattern_add_color_stop_rgb(pattern, offset, red, green, blue);
    Ok(())
}

fn add_color_stop_rgba(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let offset: f64 = ctx.arg(2)?;
    let red: f64 = ctx.arg(3)?;
    let green: f64 = ctx.arg(4)?;
    let blue: f64 = ctx.arg(5)?;
    let alpha: f64 = ctx.arg(6)?;
    ctx.cairo()
        .pattern_add_color_stop_rgba(pattern, offset, red, green, blue, alpha);
    Ok(())
}

/// Every stop as `{offset, r, g, b, a}`. Fails for non-gradient patterns.
fn get_color_stops(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let cairo = ctx.cairo();
    let count = ctx.check_result(cairo.pattern_get_color_stop_count(pattern))?;
    let stops = (0..count)
        .map(|i| cairo.pattern_get_color_stop_rgba(pattern, i))
        .collect::<Result<Vec<_>, _>>();
    let stops = ctx.check_result(stops)?;
    ctx.push(color_stops_to_value(&stops));
    Ok(())
}

fn get_linear_points(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let points = ctx.check_result(ctx.cairo().pattern_get_linear_points(pattern))?;
    push_box(ctx, points);
    Ok(())
}

fn get_radial_circles(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let (cx0, cy0, r0, cx1, cy1, r1) = ctx.check_result(ctx.cairo().pattern_get_radial_circles(pattern))?;
    for n in [cx0, cy0, r0, cx1, cy1, r1] {
        ctx.push(n);
    }
    Ok(())
}

// ============================================================================
// Solid and surface patterns
// ============================================================================

fn get_rgba(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let color = ctx.check_result(ctx.cairo().pattern_get_rgba(pattern))?;
    for n in [color.red, color.green, color.blue, color.alpha] {
        ctx.push(n);
    }
    Ok(())
}

fn get_surface(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let surface = ctx.check_result(ctx.cairo().pattern_get_surface(pattern))?;
    ctx.push_borrowed(tags::SURFACE, surface);
    Ok(())
}

// ============================================================================
// Sampling
// ============================================================================

fn set_extend(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let extend: Extend = ctx.arg(2)?;
    ctx.cairo().pattern_set_extend(pattern, extend);
    Ok(())
}

fn get_extend(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let extend = ctx.cairo().pattern_get_extend(pattern);
    ctx.push(extend);
    Ok(())
}

fn set_filter(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let filter: Filter = ctx.arg(2)?;
    ctx.cairo().pattern_set_filter(pattern, filter);
    Ok(())
}

fn get_filter(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let filter = ctx.cairo().pattern_get_filter(pattern);
    ctx.push(filter);
    Ok(())
}

fn set_matrix(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let matrix = ctx.arg_with(2, matrix_from_value)?;
    ctx.cairo().pattern_set_matrix(pattern, &matrix);
    Ok(())
}

fn get_matrix(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let pattern = ctx.receiver(tags::PATTERN)?;
    let matrix = ctx.cairo().pattern_get_matrix(pattern);
    ctx.push(matrix_to_value(&matrix));
    Ok(())
}
