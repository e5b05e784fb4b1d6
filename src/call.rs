//! Call context bridging host values and binding functions.

use oocairo_core::{BindingError, BindingResult, ConversionError, FromValue, IntoValue, TypeHash, Value};
use oocairo_native::{Cairo, NativePtr, Status};

use crate::Runtime;

/// Context for one binding call.
///
/// Arguments are addressed by 1-based position. For methods the receiver is
/// position 1 and the first explicit argument position 2, so error messages
/// count the way the host caller wrote the call.
///
/// ```ignore
/// let cr = ctx.receiver(tags::CONTEXT)?;
/// let width: f64 = ctx.arg(2)?;
/// ctx.cairo().set_line_width(cr, width);
/// ```
pub struct CallContext<'a> {
    runtime: &'a Runtime,
    function: &'a str,
    args: &'a [Value],
    returns: Vec<Value>,
}

impl<'a> CallContext<'a> {
    pub fn new(runtime: &'a Runtime, function: &'a str, args: &'a [Value]) -> Self {
        Self {
            runtime,
            function,
            args,
            returns: Vec::new(),
        }
    }

    pub fn runtime(&self) -> &'a Runtime {
        self.runtime
    }

    pub fn cairo(&self) -> &'a Cairo {
        self.runtime.cairo()
    }

    /// Name of the function being called, used in error messages.
    pub fn function(&self) -> &'a str {
        self.function
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Raw argument at `position`; missing arguments are `nil`.
    pub fn value(&self, position: usize) -> Value {
        position
            .checked_sub(1)
            .and_then(|i| self.args.get(i))
            .cloned()
            .unwrap_or_default()
    }

    // ==========================================================================
    // Typed arguments
    // ==========================================================================

    pub fn argument_error(&self, position: usize, reason: ConversionError) -> BindingError {
        BindingError::Argument {
            function: self.function.to_string(),
            position,
            reason,
        }
    }

    /// Convert the argument at `position`.
    pub fn arg<T: FromValue>(&self, position: usize) -> BindingResult<T> {
        self.arg_with(position, T::from_value)
    }

    /// Convert the argument at `position` with a record parser.
    pub fn arg_with<T>(
        &self,
        position: usize,
        parse: impl FnOnce(&Value) -> Result<T, ConversionError>,
    ) -> BindingResult<T> {
        parse(&self.value(position)).map_err(|reason| self.argument_error(position, reason))
    }

    /// `nil` or absent arguments become `default`.
    pub fn arg_or<T: FromValue>(&self, position: usize, default: T) -> BindingResult<T> {
        Ok(self.arg::<Option<T>>(position)?.unwrap_or(default))
    }

    /// Unwrap a handle argument of type `tag`.
    pub fn handle(&self, position: usize, tag: TypeHash) -> BindingResult<NativePtr> {
        self.runtime.unwrap_arg(&self.value(position), tag, self.function, position)
    }

    /// Like [`handle`](Self::handle), but `nil` is accepted.
    pub fn opt_handle(&self, position: usize, tag: TypeHash) -> BindingResult<Option<NativePtr>> {
        match self.value(position) {
            Value::Nil => Ok(None),
            value => self.runtime.unwrap_arg(&value, tag, self.function, position).map(Some),
        }
    }

    /// The receiver of a method call.
    pub fn receiver(&self, tag: TypeHash) -> BindingResult<NativePtr> {
        self.handle(1, tag)
    }

    // ==========================================================================
    // Results
    // ==========================================================================

    pub fn push<T: IntoValue>(&mut self, value: T) {
        self.returns.push(value.into_value());
    }

    /// Return a new handle owning the reference `ptr` carries.
    pub fn push_handle(&mut self, tag: TypeHash, ptr: NativePtr) {
        let value = self.runtime.wrap(tag, ptr);
        self.returns.push(value);
    }

    /// Return a new handle for a borrowed pointer, taking a reference first.
    pub fn push_borrowed(&mut self, tag: TypeHash, ptr: NativePtr) {
        let value = self.runtime.wrap_borrowed(tag, ptr);
        self.returns.push(value);
    }

    /// Return a status query result: nothing on success, the message
    /// otherwise.
    pub fn push_status(&mut self, status: Status) {
        if !status.is_success() {
            self.push(status.message());
        }
    }

    pub fn returns(&self) -> &[Value] {
        &self.returns
    }

    pub fn into_returns(self) -> Vec<Value> {
        self.returns
    }

    // ==========================================================================
    // Native status
    // ==========================================================================

    /// Error for a failed native call. A host error recorded by a callback
    /// during the call is attached as detail.
    pub fn native_error(&self, status: Status) -> BindingError {
        BindingError::NativeStatus {
            function: self.function.to_string(),
            status,
            detail: self.runtime.take_host_error().map(|e| e.to_string()),
        }
    }

    pub fn check(&self, status: Status) -> BindingResult<()> {
        if status.is_success() {
            // Discard errors swallowed by a fallback.
            self.runtime.take_host_error();
            Ok(())
        } else {
            Err(self.native_error(status))
        }
    }

    pub fn check_result<T>(&self, result: Result<T, Status>) -> BindingResult<T> {
        result.map_err(|status| self.native_error(status))
    }
}
