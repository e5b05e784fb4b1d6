//! Matrix methods.
//!
//! Matrices are plain host tables of six numbers tagged with the matrix
//! type, so they have no native object and no finalizer. Methods that modify
//! a matrix write the result back into the receiver table.

use oocairo_core::records::{matrix_from_value, matrix_store, matrix_to_value};
use oocairo_core::{BindingResult, tags};
use oocairo_native::Matrix;

use super::push_pair;
use crate::call::CallContext;
use crate::registry::{TypeEntry, TypeRegistry};

pub(super) fn register(registry: &mut TypeRegistry) {
    let entry = TypeEntry::new(tags::MATRIX, "cairo matrix object")
        .method("invert", invert)
        .method("multiply", multiply)
        .method("rotate", rotate)
        .method("scale", scale)
        .method("translate", translate)
        .method("transform_point", transform_point)
        .method("transform_distance", transform_distance);
    registry.register_type(entry);
}

/// `matrix_create()`: a new identity matrix.
pub(super) fn create(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    ctx.push(matrix_to_value(&Matrix::identity()));
    Ok(())
}

fn receiver(ctx: &CallContext<'_>) -> BindingResult<Matrix> {
    ctx.arg_with(1, matrix_from_value)
}

fn store(ctx: &CallContext<'_>, matrix: &Matrix) -> BindingResult<()> {
    matrix_store(&ctx.value(1), matrix).map_err(|reason| ctx.argument_error(1, reason))
}

fn invert(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let matrix = receiver(ctx)?;
    let inverse = ctx.check_result(matrix.invert())?;
    store(ctx, &inverse)
}

/// `a:multiply(b)` stores `a * b` in `a`.
fn multiply(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let a = receiver(ctx)?;
    let b = ctx.arg_with(2, matrix_from_value)?;
    store(ctx, &Matrix::multiply(&a, &b))
}

fn rotate(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let mut matrix = receiver(ctx)?;
    let radians: f64 = ctx.arg(2)?;
    matrix.rotate(radians);
    store(ctx, &matrix)
}

fn scale(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let mut matrix = receiver(ctx)?;
    let sx: f64 = ctx.arg(2)?;
    let sy: f64 = ctx.arg(3)?;
    matrix.scale(sx, sy);
    store(ctx, &matrix)
}

fn translate(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let mut matrix = receiver(ctx)?;
    let tx: f64 = ctx.arg(2)?;
    let ty: f64 = ctx.arg(3)?;
    matrix.translate(tx, ty);
    store(ctx, &matrix)
}

fn transform_point(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let matrix = receiver(ctx)?;
    let x: f64 = ctx.arg(2)?;
    let y: f64 = ctx.arg(3)?;
    push_pair(ctx, matrix.transform_point(x, y));
    Ok(())
}

fn transform_distance(ctx: &mut CallContext<'_>) -> BindingResult<()> {
    let matrix = receiver(ctx)?;
    let dx: f64 = ctx.arg(2)?;
    let dy: f64 = ctx.arg(3)?;
    push_pair(ctx, matrix.transform_distance(dx, dy));
    Ok(())
}
