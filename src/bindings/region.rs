//! Region methods.
//!
//! The set operations modify the receiver. Like `status`, they return
//! nothing on success and the status message on failure.

use oocairo_core::records::{rectangle_from_value, rectangle_to_value};
use oocairo_core::{BindingResult, Value, tags};
use oocairo_native::Cairo;

use super::status;
use crate::call::CallContext;
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::REGION, "cairo region object")
        .finalizer(Cairo::destroy)
        .method("__eq", equal)
        .method("status", status(tags::REGION))
        .method("copy", copy)
        .method("contains_point", contains_point)
        .method("contains_rectangle", contains_rectangle)
        .method("get_extents", get_extents)
        .method("get_rectangles", get_rectangles)
        .method("num_rectangles", num_rectangles)
        .method("is_empty", is_empty)
        .method("translate", translate)
        .method("intersect", intersect)
        .method("intersect_rectangle", intersect_rectangle)
        .method("subtract", subtract)
        .method("subtract_rectangle", subtract_rectangle)
        .method("union", union)
        .method("union_rectangle", union_rectangle)
        .method("xor", xor)
        .method("xor_rectangle", xor_rectangle);
    registry.register_type(entry);
}

/// Regions compare by covered area.
fn equal(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let equal = match ctx.value(2) {
        Value::Handle(handle) if handle.tag == tags::REGION => {
            let other = ctx.handle(2, tags::REGION)?;
            ctx.cairo().region_equal(region, other)
        }
        _ => false,
    };
    ctx.push(equal);
    Ok(())
}

fn copy(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let copy = ctx.cairo().region_copy(region);
    ctx.push_handle(tags::REGION, copy);
    Ok(())
}

fn contains_point(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let x: i32 = ctx.arg(2)?;
    let y: i32 = ctx.arg(3)?;
    let inside = ctx.cairo().region_contains_point(region, x, y);
    ctx.push(inside);
    Ok(())
}

fn contains_rectangle(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let rect = ctx.arg_with(2, rectangle_from_value)?;
    let overlap = ctx.cairo().region_contains_rectangle(region, &rect);
    ctx.push(overlap);
    Ok(())
}

fn get_extents(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let extents = ctx.cairo().region_get_extents(region);
    ctx.push(rectangle_to_value(&extents));
    Ok(())
}

/// The rectangles making up the region, in the region's own order.
fn get_rectangles(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let cairo = ctx.cairo();
    let rects = (0..cairo.region_num_rectangles(region))
        .map(|i| cairo.region_get_rectangle(region, i).map(|rect| rectangle_to_value(&rect)))
        .collect::<Result<Vec<_>, _>>();
    let rects = ctx.check_result(rects)?;
    ctx.push(Value::list(rects));
    Ok(())
}

fn num_rectangles(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let count = ctx.cairo().region_num_rectangles(region);
    ctx.push(count);
    Ok(())
}

fn is_empty(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let empty = ctx.cairo().region_is_empty(region);
    ctx.push(empty);
    Ok(())
}

fn translate(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let region = ctx.receiver(tags::REGION)?;
    let dx: i32 = ctx.arg(2)?;
    let dy: i32 = ctx.arg(3)?;
    ctx.cairo().region_translate(region, dx, dy);
    Ok(())
}

/// `op` with another region and `op_rectangle` with a rectangle record.
macro_rules! set_operations {
    ($($name:ident, $with_rect:ident => $native:ident, $native_rect:ident;)*) => {
        $(
            fn $name(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let region = ctx.receiver(tags::REGION)?;
                let other = ctx.handle(2, tags::REGION)?;
                if let Err(status) = ctx.cairo().$native(region, other) {
                    ctx.push_status(status);
                }
                Ok(())
            }

            fn $with_rect(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let region = ctx.receiver(tags::REGION)?;
                let rect = ctx.arg_with(2, rectangle_from_value)?;
                if let Err(status) = ctx.cairo().$native_rect(region, &rect) {
                    ctx.push_status(status);
                }
                Ok(())
            }
        )*
    };
}

set_operations! {
    intersect, intersect_rectangle => region_intersect, region_intersect_rectangle;
    subtract, subtract_rectangle => region_subtract, region_subtract_rectangle;
    union, union_rectangle => region_union, region_union_rectangle;
    xor, xor_rectangle => region_xor, region_xor_rectangle;
}
