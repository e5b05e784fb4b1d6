//! Font options methods.

use oocairo_core::{BindingResult, Value, tags};
use oocairo_native::{Antialias, Cairo, HintMetrics, HintStyle, SubpixelOrder};

use super::status;
use crate::call::CallContext;
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::FONT_OPTIONS, "cairo font options object")
        .finalizer(Cairo::destroy)
        .method("__eq", equal)
        .method("status", status(tags::FONT_OPTIONS))
        .method("copy", copy)
        .method("merge", merge)
        .method("hash", hash)
        .method("set_antialias", set_antialias)
        .method("get_antialias", get_antialias)
        .method("set_subpixel_order", set_subpixel_order)
        .method("get_subpixel_order", get_subpixel_order)
        .method("set_hint_style", set_hint_style)
        .method("get_hint_style", get_hint_style)
        .method("set_hint_metrics", set_hint_metrics)
        .method("get_hint_metrics", get_hint_metrics);
    registry.register_type(entry);
}

/// Options objects compare by value.
fn equal(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let options = ctx.receiver(tags::FONT_OPTIONS)?;
    let equal = match ctx.value(2) {
        Value::Handle(handle) if handle.tag == tags::FONT_OPTIONS => {
            let other = ctx.handle(2, tags::FONT_OPTIONS)?;
            ctx.cairo().font_options_equal(options, other)
        }
        _ => false,
    };
    ctx.push(equal);
    Ok(())
}

fn copy(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let options = ctx.receiver(tags::FONT_OPTIONS)?;
    let copy = ctx.cairo().font_options_copy(options);
    ctx.push_handle(tags::FONT_OPTIONS, copy);
    Ok(())
}

/// Merge the non-default settings of another options object into this one.
fn merge(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let options = ctx.receiver(tags::FONT_OPTIONS)?;
    let other = ctx.handle(2, tags::FONT_OPTIONS)?;
    ctx.cairo().font_options_merge(options, other);
    Ok(())
}

fn hash(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let options = ctx.receiver(tags::FONT_OPTIONS)?;
    let hash = ctx.cairo().font_options_hash(options);
    ctx.push(hash);
    Ok(())
}

macro_rules! option_accessors {
    ($($set:ident / $get:ident => $native_set:ident / $native_get:ident: $ty:ty;)*) => {
        $(
            fn $set(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let options = ctx.receiver(tags::FONT_OPTIONS)?;
                let value: $ty = ctx.arg(2)?;
                ctx.cairo().$native_set(options, value);
                Ok(())
            }

            fn $get(ctx: &mut CallContext<'_>) -> BindingResult<()> {
                let options = ctx.receiver(tags::FONT_OPTIONS)?;
                let value = ctx.cairo().$native_get(options);
                ctx.push(value);
                Ok(())
            }
        )*
    };
}

option_accessors! {
    set_antialias / get_antialias
        => font_options_set_antialias / font_options_get_antialias: Antialias;
    set_subpixel_order / get_subpixel_order
        => font_options_set_subpixel_order / font_options_get_subpixel_order: SubpixelOrder;
    set_hint_style / get_hint_style
        => font_options_set_hint_style / font_options_get_hint_style: HintStyle;
    set_hint_metrics / get_hint_metrics
        => font_options_set_hint_metrics / font_options_get_hint_metrics: HintMetrics;
}
