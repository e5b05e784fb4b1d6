//! Path methods.

use oocairo_core::records::segment_points_to_value;
use oocairo_core::{BindingResult, ConversionError, EnumName, Table, Value, tags};
use oocairo_native::Cairo;

use crate::Runtime;
use crate::call::CallContext;
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::PATH, "cairo path object")
        .finalizer(Cairo::destroy)
        .method("each", each)
        .method("segments", segments);
    registry.register_type(entry);
}

/// `path:each()` returns an iterator function and the path, for use as
/// `for i, kind, points in path:each()`. Points are a flat table of
/// coordinates, `nil` for close-path segments.
fn each(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    ctx.receiver(tags::PATH)?;
    let path = ctx.value(1);
    let iterator = ctx.runtime().builtin("path iterator", next_segment);
    ctx.push(iterator);
    ctx.push(path);
    Ok(())
}

/// Iterator step: `(path, previous index)` to the next segment, or nothing
/// at the end.
fn next_segment(runtime: &Runtime, args: &[Value]) -> BindingResult<Vec<Value>> {
    let mut ctx = CallContext::new(runtime, "path iterator", args);
    let path = ctx.handle(1, tags::PATH)?;
    let previous: usize = ctx.arg_or(2, 0)?;
    let segments = ctx.cairo().path_segments(path);
    if previous > segments.len() {
        return Err(ctx.argument_error(2, ConversionError::invalid("path index out of range")));
    }
    if let Some(segment) = segments.get(previous) {
        ctx.push(previous + 1);
        ctx.push(segment.kind());
        ctx.push(segment_points_to_value(segment));
    }
    Ok(ctx.into_returns())
}

/// Every segment as a `{kind = ..., points = ...}` table.
fn segments(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let path = ctx.receiver(tags::PATH)?;
    let segments = ctx.cairo().path_segments(path);
    let list = Value::list(segments.iter().map(|segment| {
        let mut t = Table::new();
        t.set_field("kind", segment.kind().name());
        t.set_field("points", segment_points_to_value(segment));
        Value::table(t)
    }));
    ctx.push(list);
    Ok(())
}
