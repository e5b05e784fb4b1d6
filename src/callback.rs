//! Callback bridge - native hooks that re-enter host closures.
//!
//! User font faces store a [`UserFontTrampoline`] inside the native face.
//! The trampoline keeps only a weak runtime reference and a
//! [`RegistrationId`]; the host functions themselves live in the runtime's
//! [`CallbackManager`] and are retained until the face is destroyed.
//!
//! Stream I/O uses [`StreamWriter`] and [`StreamReader`], which are only
//! alive for the duration of one native call.
//!
//! Host failures never cross a native frame. They are logged, recorded on
//! the runtime, and turned into the native status the hook is allowed to
//! return; the outer binding call then reports the status with the host's
//! message attached.

use std::rc::Weak;

use log::{debug, warn};
use oocairo_core::records::{
    clusters_from_value, font_extents_from_value, font_extents_to_value, glyphs_from_value, text_extents_from_value,
    text_extents_to_value,
};
use oocairo_core::{BindingError, BindingResult, ConversionError, FromValue, TypeHash, Value, tags};
use oocairo_native::{
    FontExtents, NativePtr, ShapedText, Status, TextClusterFlags, TextExtents, UserFontHooks,
};
use rustc_hash::FxHashMap;

use crate::Runtime;

// ============================================================================
// Registrations
// ============================================================================

/// Identifies a registered [`CallbackSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u32);

/// Host functions implementing a user font.
#[derive(Debug, Clone)]
pub struct CallbackSet {
    pub init: Option<Value>,
    pub render_glyph: Value,
    pub text_to_glyphs: Option<Value>,
    pub unicode_to_glyph: Option<Value>,
}

impl CallbackSet {
    pub const OPTIONS: [&'static str; 4] = ["init", "render_glyph", "text_to_glyphs", "unicode_to_glyph"];

    /// Read the callbacks from an options table. `render_glyph` is required
    /// and every supplied option must be a function.
    pub fn from_options(function: &str, options: &Value) -> BindingResult<Self> {
        let mut found: [Option<Value>; 4] = Default::default();
        for (slot, name) in found.iter_mut().zip(Self::OPTIONS) {
            *slot = match options.get(name) {
                Value::Nil => None,
                value @ Value::Function(_) => Some(value),
                _ => {
                    return Err(BindingError::configuration(
                        function,
                        format!("the '{name}' option must be a function"),
                    ));
                }
            };
        }
        let [init, render_glyph, text_to_glyphs, unicode_to_glyph] = found;
        let render_glyph = render_glyph
            .ok_or_else(|| BindingError::configuration(function, "the 'render_glyph' option is required"))?;
        Ok(Self {
            init,
            render_glyph,
            text_to_glyphs,
            unicode_to_glyph,
        })
    }

    /// Every function in the set.
    pub fn functions(&self) -> impl Iterator<Item = &Value> {
        std::iter::once(&self.render_glyph)
            .chain(self.init.as_ref())
            .chain(self.text_to_glyphs.as_ref())
            .chain(self.unicode_to_glyph.as_ref())
    }
}

/// Registered callback sets of one runtime.
#[derive(Debug, Default)]
pub struct CallbackManager {
    next_id: u32,
    sets: FxHashMap<RegistrationId, CallbackSet>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: CallbackSet) -> RegistrationId {
        let id = RegistrationId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.sets.insert(id, set);
        id
    }

    pub fn remove(&mut self, id: RegistrationId) -> Option<CallbackSet> {
        self.sets.remove(&id)
    }

    pub fn get(&self, id: RegistrationId) -> Option<&CallbackSet> {
        self.sets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}

// ============================================================================
// Scoped handles
// ============================================================================

/// A handle created for the duration of a callback, released on drop. If
/// the closure retained it, the handle outlives the callback.
struct Scoped<'r> {
    runtime: &'r Runtime,
    value: Value,
}

impl<'r> Scoped<'r> {
    fn borrowed(runtime: &'r Runtime, tag: TypeHash, ptr: NativePtr) -> Self {
        Self {
            runtime,
            value: runtime.wrap_borrowed(tag, ptr),
        }
    }

    fn value(&self) -> Value {
        self.value.clone()
    }
}

impl Drop for Scoped<'_> {
    fn drop(&mut self) {
        self.runtime.release(&self.value);
    }
}

// ============================================================================
// User fonts
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Hook {
    Init,
    RenderGlyph,
    TextToGlyphs,
    UnicodeToGlyph,
}

impl Hook {
    fn name(self) -> &'static str {
        match self {
            Hook::Init => "init",
            Hook::RenderGlyph => "render_glyph",
            Hook::TextToGlyphs => "text_to_glyphs",
            Hook::UnicodeToGlyph => "unicode_to_glyph",
        }
    }

    fn select(self, set: &CallbackSet) -> Option<&Value> {
        match self {
            Hook::Init => set.init.as_ref(),
            Hook::RenderGlyph => Some(&set.render_glyph),
            Hook::TextToGlyphs => set.text_to_glyphs.as_ref(),
            Hook::UnicodeToGlyph => set.unicode_to_glyph.as_ref(),
        }
    }

    fn bad_result(self, what: impl std::fmt::Display) -> BindingError {
        BindingError::raised(format!("bad {what} returned from '{}' callback", self.name()))
    }
}

/// Native user font hooks forwarding to host closures.
pub struct UserFontTrampoline {
    runtime: Weak<Runtime>,
    id: RegistrationId,
}

impl UserFontTrampoline {
    pub fn new(runtime: &Runtime, id: RegistrationId) -> Self {
        Self {
            runtime: runtime.downgrade(),
            id,
        }
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Run `call` with the closure registered for `hook`. A missing closure
    /// asks the library for its built-in behaviour.
    fn invoke<R>(
        &self,
        hook: Hook,
        call: impl FnOnce(&Runtime, &Value) -> BindingResult<R>,
    ) -> Result<R, Status> {
        let runtime = self.runtime.upgrade().ok_or(Status::UserFontError)?;
        let callback = runtime
            .callback_set(self.id)
            .and_then(|set| hook.select(&set).cloned())
            .ok_or(Status::UserFontNotImplemented)?;
        call(&runtime, &callback).map_err(|err| {
            warn!("user font '{}' callback failed: {err}", hook.name());
            runtime.set_host_error(err);
            Status::UserFontError
        })
    }
}

impl UserFontHooks for UserFontTrampoline {
    fn init(&self, scaled_font: NativePtr, cr: NativePtr, extents: &mut FontExtents) -> Result<(), Status> {
        let current = *extents;
        *extents = self.invoke(Hook::Init, |rt, callback| {
            let font = Scoped::borrowed(rt, tags::SCALED_FONT, scaled_font);
            let cr = Scoped::borrowed(rt, tags::CONTEXT, cr);
            let table = font_extents_to_value(&current);
            rt.call_function(callback, &[font.value(), cr.value(), table.clone()])?;
            font_extents_from_value(&table).map_err(|e| Hook::Init.bad_result(format_args!("font extents ({e})")))
        })?;
        Ok(())
    }

    fn render_glyph(
        &self,
        scaled_font: NativePtr,
        glyph: u64,
        cr: NativePtr,
        extents: &mut TextExtents,
    ) -> Result<(), Status> {
        let current = *extents;
        *extents = self.invoke(Hook::RenderGlyph, |rt, callback| {
            let font = Scoped::borrowed(rt, tags::SCALED_FONT, scaled_font);
            let cr = Scoped::borrowed(rt, tags::CONTEXT, cr);
            let table = text_extents_to_value(&current);
            rt.call_function(callback, &[font.value(), Value::Number(glyph as f64), cr.value(), table.clone()])?;
            text_extents_from_value(&table)
                .map_err(|e| Hook::RenderGlyph.bad_result(format_args!("text extents ({e})")))
        })?;
        Ok(())
    }

    fn text_to_glyphs(&self, scaled_font: NativePtr, utf8: &str, want_clusters: bool) -> Result<ShapedText, Status> {
        let hook = Hook::TextToGlyphs;
        let shaped = self.invoke(hook, |rt, callback| {
            let font = Scoped::borrowed(rt, tags::SCALED_FONT, scaled_font);
            let returns = rt.call_function(callback, &[font.value(), Value::string(utf8), Value::Bool(want_clusters)])?;
            let mut returns = returns.into_iter();
            let glyphs = returns.next().unwrap_or_default();
            if glyphs.is_nil() {
                return Ok(None);
            }
            let glyphs = glyphs_from_value(&glyphs).map_err(|e| hook.bad_result(format_args!("glyph array ({e})")))?;
            let (clusters, flags) = match returns.next() {
                Some(clusters) if want_clusters && !clusters.is_nil() => {
                    clusters_from_value(&clusters).map_err(|e| hook.bad_result(format_args!("clusters ({e})")))?
                }
                _ => (Vec::new(), TextClusterFlags::empty()),
            };
            Ok(Some(ShapedText { glyphs, clusters, flags }))
        })?;
        // No glyphs: fall back to unicode_to_glyph.
        shaped.ok_or(Status::UserFontNotImplemented)
    }

    fn unicode_to_glyph(&self, scaled_font: NativePtr, unicode: u32) -> Result<u64, Status> {
        let hook = Hook::UnicodeToGlyph;
        self.invoke(hook, |rt, callback| {
            let font = Scoped::borrowed(rt, tags::SCALED_FONT, scaled_font);
            let returns = rt.call_function(callback, &[font.value(), Value::Number(f64::from(unicode))])?;
            let index = returns.into_iter().next().unwrap_or_default();
            u64::from_value(&index).map_err(|_| hook.bad_result("glyph index"))
        })
    }
}

impl Drop for UserFontTrampoline {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.upgrade() {
            debug!("user font face destroyed, releasing {:?}", self.id);
            runtime.release_callbacks(self.id);
        }
    }
}

// ============================================================================
// Streams
// ============================================================================

/// The host side of a stream: a function, or a file handle table with a
/// method of the given name.
#[derive(Debug, Clone)]
pub enum StreamTarget {
    Function(Value),
    Method { handle: Value, method: Value },
}

impl StreamTarget {
    /// Check a stream argument before any native call is made.
    pub fn resolve(value: &Value, method: &'static str) -> Result<Self, ConversionError> {
        match value {
            Value::Function(_) => Ok(StreamTarget::Function(value.clone())),
            Value::Table(_) => match value.get(method) {
                method @ Value::Function(_) => Ok(StreamTarget::Method {
                    handle: value.clone(),
                    method,
                }),
                _ => Err(ConversionError::invalid(format!(
                    "file handle does not have '{method}' method"
                ))),
            },
            other => Err(ConversionError::TypeMismatch {
                expected: "function or file handle",
                actual: other.type_name(),
            }),
        }
    }

    fn call(&self, runtime: &Runtime, arg: Value) -> BindingResult<Vec<Value>> {
        match self {
            StreamTarget::Function(f) => runtime.call_function(f, &[arg]),
            StreamTarget::Method { handle, method } => runtime.call_function(method, &[handle.clone(), arg]),
        }
    }
}

/// Writes native output chunks to a host stream.
pub struct StreamWriter<'r> {
    runtime: &'r Runtime,
    target: StreamTarget,
}

impl<'r> StreamWriter<'r> {
    pub fn new(runtime: &'r Runtime, target: StreamTarget) -> Self {
        Self { runtime, target }
    }

    pub fn write(&mut self, chunk: &[u8]) -> Result<(), Status> {
        self.target
            .call(self.runtime, Value::bytes(chunk))
            .map(drop)
            .map_err(|err| {
                warn!("stream write failed: {err}");
                self.runtime.set_host_error(err);
                Status::WriteError
            })
    }
}

/// Reads native input from a host stream. Every read must return exactly
/// the number of bytes asked for.
pub struct StreamReader<'r> {
    runtime: &'r Runtime,
    target: StreamTarget,
}

impl<'r> StreamReader<'r> {
    pub fn new(runtime: &'r Runtime, source: StreamTarget) -> Self {
        Self { runtime, target: source }
    }

    pub fn read(&mut self, len: usize) -> Result<Vec<u8>, Status> {
        self.read_chunk(len).map_err(|err| {
            warn!("stream read failed: {err}");
            self.runtime.set_host_error(err);
            Status::ReadError
        })
    }

    fn read_chunk(&self, len: usize) -> BindingResult<Vec<u8>> {
        let returns = self.target.call(self.runtime, Value::Number(len as f64))?;
        let chunk = returns.into_iter().next().unwrap_or_default();
        let bytes = chunk
            .as_bytes()
            .ok_or_else(|| BindingError::raised("'read' method on file handle didn't return string"))?;
        if bytes.len() != len {
            return Err(BindingError::raised(
                "'read' method on file handle returned wrong amount of data",
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oocairo_core::Table;

    fn options(rt: &Runtime, names: &[&str]) -> Value {
        let mut t = Table::new();
        for name in names {
            t.set_field(name, rt.function(|_, _| Ok(Vec::new())));
        }
        Value::table(t)
    }

    #[test]
    fn test_render_glyph_is_required() {
        let rt = Runtime::new();
        let err = CallbackSet::from_options("user_font_face_create", &options(&rt, &["init"])).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("the 'render_glyph' option is required"));
    }

    #[test]
    fn test_options_must_be_functions() {
        let rt = Runtime::new();
        let opts = options(&rt, &["render_glyph"]);
        if let Some(t) = opts.as_table() {
            t.borrow_mut().set_field("init", 3);
        }
        let err = CallbackSet::from_options("user_font_face_create", &opts).unwrap_err();
        assert!(err.to_string().contains("the 'init' option must be a function"));
    }

    #[test]
    fn test_install_and_release() {
        let rt = Runtime::new();
        let set = CallbackSet::from_options("f", &options(&rt, &["render_glyph", "unicode_to_glyph"])).unwrap();
        assert_eq!(set.functions().count(), 2);
        let render = set.render_glyph.clone();

        let id = rt.install_callbacks(set);
        assert_eq!(rt.ref_count(&render), Some(2));
        rt.release_callbacks(id);
        rt.release_callbacks(id);
        assert_eq!(rt.ref_count(&render), Some(1));
        assert_eq!(rt.callback_count(), 0);
    }

    #[test]
    fn test_stream_targets_are_checked() {
        let rt = Runtime::new();
        let err = StreamTarget::resolve(&Value::table(Table::new()), "write").unwrap_err();
        assert_eq!(err.to_string(), "file handle does not have 'write' method");
        let err = StreamTarget::resolve(&Value::Number(5.0), "read").unwrap_err();
        assert_eq!(err.to_string(), "function or file handle expected, got number");
        assert!(StreamTarget::resolve(&rt.function(|_, _| Ok(Vec::new())), "read").is_ok());
    }

    #[test]
    fn test_writer_failure_is_recorded() {
        let rt = Runtime::new();
        let write = rt.function(|_, _| Err(BindingError::raised("pipe closed")));
        let mut writer = StreamWriter::new(&rt, StreamTarget::resolve(&write, "write").unwrap());
        assert_eq!(writer.write(b"abc"), Err(Status::WriteError));
        let err = rt.take_host_error().unwrap();
        assert_eq!(err.to_string(), "pipe closed");
    }

    #[test]
    fn test_reader_short_read() {
        let rt = Runtime::new();
        let read = rt.function(|_, _| Ok(vec![Value::bytes(b"ab")]));
        let mut reader = StreamReader::new(&rt, StreamTarget::resolve(&read, "read").unwrap());
        assert_eq!(reader.read(2), Ok(b"ab".to_vec()));
        assert_eq!(reader.read(3), Err(Status::ReadError));
        assert!(rt.take_host_error().is_some());
    }
}
