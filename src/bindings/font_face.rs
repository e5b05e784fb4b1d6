//! Font face methods. The toy face accessors fail with a font type mismatch
//! on user faces.

use oocairo_core::{BindingResult, tags};
use oocairo_native::Cairo;

use super::{same_object, status};
use crate::call::CallContext;
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::FONT_FACE, "cairo font face object")
        .finalizer(Cairo::destroy)
        .method("__eq", same_object(tags::FONT_FACE))
        .method("status", status(tags::FONT_FACE))
        .method("get_type", get_type)
        .method("get_family", get_family)
        .method("get_slant", get_slant)
        .method("get_weight", get_weight);
    registry.register_type(entry);
}

fn get_type(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let face = ctx.receiver(tags::FONT_FACE)?;
    let kind = ctx.cairo().font_face_get_type(face);
    ctx.push(kind);
    Ok(())
}

fn get_family(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let face = ctx.receiver(tags::FONT_FACE)?;
    let family = ctx.check_result(ctx.cairo().toy_font_face_get_family(face))?;
    ctx.push(family);
    Ok(())
}

fn get_slant(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let face = ctx.receiver(tags::FONT_FACE)?;
    let slant = ctx.check_result(ctx.cairo().toy_font_face_get_slant(face))?;
    ctx.push(slant);
    Ok(())
}

fn get_weight(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let face = ctx.receiver(tags::FONT_FACE)?;
    let weight = ctx.check_result(ctx.cairo().toy_font_face_get_weight(face))?;
    ctx.push(weight);
    Ok(())
}
