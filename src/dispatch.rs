//! Arguments accepting more than one handle type.

use oocairo_core::{BindingError, BindingResult, Value, tags};
use oocairo_native::NativePtr;

use crate::call::CallContext;

/// A paint source: a pattern, or a surface used as an implicit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pattern(NativePtr),
    Surface(NativePtr),
}

impl Source {
    pub const EXPECTED: &'static str = "cairo pattern or surface object";

    /// Inspect the handle tag at `position`, patterns first.
    pub fn from_arg(ctx: &CallContext<'_>, position: usize) -> BindingResult<Source> {
        let value = ctx.value(position);
        let actual = match &value {
            Value::Handle(handle) if handle.tag == tags::PATTERN => {
                return ctx.handle(position, tags::PATTERN).map(Source::Pattern);
            }
            Value::Handle(handle) if handle.tag == tags::SURFACE => {
                return ctx.handle(position, tags::SURFACE).map(Source::Surface);
            }
            Value::Handle(handle) => ctx.runtime().type_name(handle.tag),
            other => other.type_name(),
        };
        Err(BindingError::TypeMismatch {
            function: ctx.function().to_string(),
            position,
            expected: Self::EXPECTED.to_string(),
            actual: actual.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Runtime;
    use oocairo_native::Format;

    #[test]
    fn test_source_kinds() {
        let rt = Runtime::new();
        let surface = rt.wrap(tags::SURFACE, rt.cairo().image_surface_create(Format::A8, 1, 1));
        let pattern = rt.wrap(tags::PATTERN, rt.cairo().pattern_create_rgb(0.0, 0.0, 0.0));
        let region = rt.wrap(tags::REGION, rt.cairo().region_create());
        let args = [surface, pattern, region, Value::Bool(true)];
        let ctx = CallContext::new(&rt, "set_source", &args);

        assert!(matches!(Source::from_arg(&ctx, 1), Ok(Source::Surface(_))));
        assert!(matches!(Source::from_arg(&ctx, 2), Ok(Source::Pattern(_))));

        let err = Source::from_arg(&ctx, 3).unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("cairo pattern or surface object expected, got cairo region object"));
        assert_eq!(Source::from_arg(&ctx, 4).unwrap_err().position(), Some(4));
    }

    #[test]
    fn test_finalized_source() {
        let rt = Runtime::new();
        let pattern = rt.wrap(tags::PATTERN, rt.cairo().pattern_create_rgb(0.0, 0.0, 0.0));
        rt.finalize(&pattern);
        let args = [pattern];
        let ctx = CallContext::new(&rt, "mask", &args);
        assert!(Source::from_arg(&ctx, 1).unwrap_err().is_use_after_free());
    }
}
