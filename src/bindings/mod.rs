//! Method tables and module functions exposed to the host.
//!
//! Each submodule registers one handle type: its host type name, its method
//! table and the finalizer releasing the native reference a handle owns.
//! `module` registers the constructors callable as module functions.

use oocairo_core::{BindingResult, TypeHash, Value};

use crate::call::CallContext;
use crate::registry::TypeRegistry;

mod context;
mod font_face;
mod font_options;
mod matrix;
mod module;
mod path;
mod pattern;
mod region;
mod scaled_font;
mod surface;

pub(crate) fn install(registry: &mut TypeRegistry) {
    context::register(registry);
    surface::register(registry);
    pattern::register(registry);
    font_face::register(registry);
    scaled_font::register(registry);
    font_options::register(registry);
    matrix::register(registry);
    path::register(registry);
    region::register(registry);
    module::register(registry);
}

// ============================================================================
// Shared methods
// ============================================================================

/// `__eq`: two handles are equal when they wrap the same native object.
fn same_object(tag: TypeHash) -> impl Fn(&mut CallContext<'_>) -> BindingResult<()> + Send + Sync + 'static {
    move |ctx: &mut CallContext<'_>| {
        let this = ctx.receiver(tag)?;
        let equal = match ctx.value(2) {
            Value::Handle(handle) if handle.tag == tag => ctx.handle(2, tag)? == this,
            _ => false,
        };
        ctx.push(equal);
        Ok(())
    }
}

/// `status`: nothing on success, the status message otherwise.
fn status(tag: TypeHash) -> impl Fn(&mut CallContext<'_>) -> BindingResult<()> + Send + Sync + 'static {
    move |ctx: &mut CallContext<'_>| {
        let ptr = ctx.receiver(tag)?;
        let status = ctx.cairo().status(ptr);
        ctx.push_status(status);
        Ok(())
    }
}

/// Push a `(x1, y1, x2, y2)` box as four numbers.
fn push_box(ctx: &mut CallContext<'_>, (x1, y1, x2, y2): (f64, f64, f64, f64)) {
    ctx.push(x1);
    ctx.push(y1);
    ctx.push(x2);
    ctx.push(y2);
}

fn push_pair(ctx: &mut CallContext<'_>, (x, y): (f64, f64)) {
    ctx.push(x);
    ctx.push(y);
}
