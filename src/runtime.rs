//! Runtime - the host side of the binding.
//!
//! A [`Runtime`] owns the native library instance, the heap of opaque
//! handles, the heap of host closures and the callback registrations. Every
//! handle owns exactly one native reference; the reference is released by
//! the type's finalizer when the handle is finalized explicitly, when its
//! last host reference is released, or when the runtime is dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use log::{debug, trace};
use oocairo_core::{BindingError, BindingResult, ObjectHandle, ObjectHeap, Table, TypeHash, Value, tags};
use oocairo_native::{Cairo, Features, NativePtr};
use rustc_hash::FxHashMap;

use crate::call::CallContext;
use crate::callback::{CallbackManager, CallbackSet, RegistrationId};
use crate::registry::TypeRegistry;

/// A host closure callable from the binding.
pub type HostFn = dyn Fn(&Runtime, &[Value]) -> BindingResult<Vec<Value>>;

pub(crate) type BuiltinFn = fn(&Runtime, &[Value]) -> BindingResult<Vec<Value>>;

/// Static information about the module and the native library.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub cairo_version: String,
    pub cairo_runtime_version: String,
    pub features: Features,
    /// Order of pixel components in memory: `"bgra"` or `"argb"`.
    pub byte_order: &'static str,
}

impl ModuleInfo {
    /// Module table fields, in the layout host scripts expect.
    pub fn to_value(&self) -> Value {
        let mut t = Table::new();
        t.set_field("_NAME", self.name);
        t.set_field("_VERSION", self.version);
        t.set_field("_CAIRO_VERSION", self.cairo_version.as_str());
        t.set_field("_CAIRO_RUNTIME_VERSION", self.cairo_runtime_version.as_str());
        let flags = [
            ("HAS_PDF_SURFACE", Features::PDF_SURFACE),
            ("HAS_PNG_FUNCTIONS", Features::PNG_FUNCTIONS),
            ("HAS_PS_SURFACE", Features::PS_SURFACE),
            ("HAS_SVG_SURFACE", Features::SVG_SURFACE),
            ("HAS_USER_FONT", Features::USER_FONT),
            ("HAS_RECORDING_SURFACE", Features::RECORDING_SURFACE),
        ];
        for (name, flag) in flags {
            t.set_field(name, self.features.contains(flag));
        }
        t.set_field("BYTE_ORDER", self.byte_order);
        Value::table(t)
    }
}

/// Single-threaded binding runtime.
pub struct Runtime {
    cairo: Cairo,
    registry: Arc<RwLock<TypeRegistry>>,
    resources: RefCell<ObjectHeap<NativePtr>>,
    functions: RefCell<ObjectHeap<Rc<HostFn>>>,
    callbacks: RefCell<CallbackManager>,
    /// Binding-provided host functions, created once per runtime.
    builtins: RefCell<FxHashMap<&'static str, Value>>,
    /// Host failure recorded by a callback, reported by the outer call.
    host_error: RefCell<Option<BindingError>>,
    /// Binding calls currently on the stack, including re-entrant ones.
    depth: Cell<u32>,
    this: Weak<Runtime>,
}

impl Runtime {
    /// Runtime over a fresh library instance and the global registry.
    pub fn new() -> Rc<Self> {
        Self::build(Cairo::new(), TypeRegistry::global())
    }

    /// Runtime using a private registry.
    pub fn with_registry(registry: TypeRegistry) -> Rc<Self> {
        Self::build(Cairo::new(), Arc::new(RwLock::new(registry)))
    }

    /// Runtime over a configured library instance.
    pub fn with_cairo(cairo: Cairo) -> Rc<Self> {
        Self::build(cairo, TypeRegistry::global())
    }

    pub fn build(cairo: Cairo, registry: Arc<RwLock<TypeRegistry>>) -> Rc<Self> {
        Rc::new_cyclic(|this| Runtime {
            cairo,
            registry,
            resources: RefCell::new(ObjectHeap::new()),
            functions: RefCell::new(ObjectHeap::new()),
            callbacks: RefCell::new(CallbackManager::new()),
            builtins: RefCell::new(FxHashMap::default()),
            host_error: RefCell::new(None),
            depth: Cell::new(0),
            this: this.clone(),
        })
    }

    pub fn cairo(&self) -> &Cairo {
        &self.cairo
    }

    pub fn registry(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Weak reference for trampolines stored inside native objects.
    pub fn downgrade(&self) -> Weak<Runtime> {
        self.this.clone()
    }

    pub fn type_name(&self, tag: TypeHash) -> &'static str {
        self.registry().type_name(tag)
    }

    pub fn module_info(&self) -> ModuleInfo {
        ModuleInfo {
            name: "cairo",
            version: env!("CARGO_PKG_VERSION"),
            cairo_version: self.cairo.version_string(),
            cairo_runtime_version: self.cairo.version_string(),
            features: self.cairo.features(),
            byte_order: if cfg!(target_endian = "big") { "argb" } else { "bgra" },
        }
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// Call a module function.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(&self, name: &str, args: &[Value]) -> BindingResult<Vec<Value>> {
        let entry = self
            .registry()
            .function(name)
            .filter(|entry| self.cairo.features().contains(entry.requires))
            .ok_or_else(|| BindingError::UnknownFunction(name.to_string()))?;
        let mut ctx = CallContext::new(self, name, args);
        self.enter(|| entry.native.call(&mut ctx))?;
        Ok(ctx.into_returns())
    }

    /// Call a method on a handle or a tagged table.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call_method(&self, receiver: &Value, method: &str, args: &[Value]) -> BindingResult<Vec<Value>> {
        let tag = match receiver {
            Value::Handle(handle) => Some(handle.tag),
            Value::Table(table) => table.borrow().tag(),
            _ => None,
        };
        let native = tag
            .and_then(|tag| self.registry().method(tag, method))
            .ok_or_else(|| BindingError::UnknownMethod {
                type_name: tag.map_or(receiver.type_name(), |tag| self.type_name(tag)).to_string(),
                method: method.to_string(),
            })?;

        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(receiver.clone());
        full.extend_from_slice(args);
        let mut ctx = CallContext::new(self, method, &full);
        self.enter(|| native.call(&mut ctx))?;
        Ok(ctx.into_returns())
    }

    /// Run one binding call. An outermost call starts with no host error
    /// pending, so a failure left over from an earlier call is never
    /// attached to this one.
    fn enter<R>(&self, call: impl FnOnce() -> R) -> R {
        let depth = self.depth.get();
        if depth == 0 {
            self.host_error.borrow_mut().take();
        }
        self.depth.set(depth + 1);
        let result = call();
        self.depth.set(depth);
        result
    }

    // ==========================================================================
    // Handles
    // ==========================================================================

    /// Wrap a pointer, taking over the reference it carries.
    pub fn wrap(&self, tag: TypeHash, ptr: NativePtr) -> Value {
        let handle = self.resources.borrow_mut().allocate(tag, ptr);
        trace!("wrap {ptr:?} as {tag} #{}", handle.index);
        Value::Handle(handle)
    }

    /// Wrap a borrowed pointer, taking a new reference for the handle.
    pub fn wrap_borrowed(&self, tag: TypeHash, ptr: NativePtr) -> Value {
        self.wrap(tag, self.cairo.reference(ptr))
    }

    /// Pointer behind a handle of type `tag`.
    pub fn unwrap(&self, value: &Value, tag: TypeHash) -> BindingResult<NativePtr> {
        self.unwrap_arg(value, tag, "unwrap", 1)
    }

    pub(crate) fn unwrap_arg(
        &self,
        value: &Value,
        tag: TypeHash,
        function: &str,
        position: usize,
    ) -> BindingResult<NativePtr> {
        let mismatch = |actual: &str| BindingError::TypeMismatch {
            function: function.to_string(),
            position,
            expected: self.type_name(tag).to_string(),
            actual: actual.to_string(),
        };
        match value {
            Value::Handle(handle) if handle.tag == tag => {
                self.resources
                    .borrow()
                    .get(*handle)
                    .copied()
                    .ok_or_else(|| BindingError::UseAfterFree {
                        function: function.to_string(),
                        position,
                        tag: self.type_name(tag).to_string(),
                    })
            }
            Value::Handle(handle) => Err(mismatch(self.type_name(handle.tag))),
            other => Err(mismatch(other.type_name())),
        }
    }

    /// Whether a handle or function value still refers to a live object.
    pub fn is_live(&self, value: &Value) -> bool {
        match value {
            Value::Handle(handle) => self.resources.borrow().contains(*handle),
            Value::Function(handle) => self.functions.borrow().contains(*handle),
            _ => false,
        }
    }

    /// Number of live handles.
    pub fn handle_count(&self) -> usize {
        self.resources.borrow().len()
    }

    /// Host reference count of a handle or function value.
    pub fn ref_count(&self, value: &Value) -> Option<u32> {
        match value {
            Value::Handle(handle) => self.resources.borrow().ref_count(*handle),
            Value::Function(handle) => self.functions.borrow().ref_count(*handle),
            _ => None,
        }
    }

    // ==========================================================================
    // Host references and finalization
    // ==========================================================================

    /// Add a host reference. Values that are not handles or functions are
    /// ignored.
    pub fn retain(&self, value: &Value) -> bool {
        match value {
            Value::Handle(handle) => self.resources.borrow_mut().add_ref(*handle),
            Value::Function(handle) => self.functions.borrow_mut().add_ref(*handle),
            _ => false,
        }
    }

    /// Drop a host reference; the last one finalizes the object.
    pub fn release(&self, value: &Value) {
        match value {
            Value::Handle(handle) => {
                let freed = self.resources.borrow_mut().release(*handle);
                if let Some(ptr) = freed {
                    self.run_finalizer(*handle, ptr);
                }
            }
            Value::Function(handle) => {
                let freed = self.functions.borrow_mut().release(*handle);
                drop(freed);
            }
            _ => {}
        }
    }

    /// Finalize now, whatever the host reference count. A second call is a
    /// no-op. Returns whether anything was finalized.
    pub fn finalize(&self, value: &Value) -> bool {
        match value {
            Value::Handle(handle) => {
                let taken = self.resources.borrow_mut().take(*handle);
                match taken {
                    Some(ptr) => {
                        self.run_finalizer(*handle, ptr);
                        true
                    }
                    None => false,
                }
            }
            Value::Function(handle) => {
                let taken = self.functions.borrow_mut().take(*handle);
                taken.is_some()
            }
            _ => false,
        }
    }

    /// Release the native reference of a handle whose slot is already dead.
    fn run_finalizer(&self, handle: ObjectHandle, ptr: NativePtr) {
        let finalizer = self.registry().finalizer(handle.tag);
        trace!("finalize {} #{} ({ptr:?})", handle.tag, handle.index);
        match finalizer {
            Some(finalizer) => finalizer(&self.cairo, ptr),
            None => self.cairo.destroy(ptr),
        }
    }

    // ==========================================================================
    // Host functions
    // ==========================================================================

    /// Store a host closure and return a function value for it.
    pub fn function<F>(&self, f: F) -> Value
    where
        F: Fn(&Runtime, &[Value]) -> BindingResult<Vec<Value>> + 'static,
    {
        let handle = self.functions.borrow_mut().allocate(tags::FUNCTION, Rc::new(f));
        Value::Function(handle)
    }

    /// The shared function value for a binding-provided host function.
    /// It is created on first use and again if the host finalized it.
    pub(crate) fn builtin(&self, name: &'static str, f: BuiltinFn) -> Value {
        let cached = self.builtins.borrow().get(name).cloned();
        if let Some(value) = cached.filter(|value| self.is_live(value)) {
            return value;
        }
        let value = self.function(f);
        self.builtins.borrow_mut().insert(name, value.clone());
        value
    }

    /// Call a function value. No runtime borrow is held while it runs.
    pub fn call_function(&self, function: &Value, args: &[Value]) -> BindingResult<Vec<Value>> {
        let f = match function {
            Value::Function(handle) => self.functions.borrow().get(*handle).cloned(),
            _ => None,
        };
        let f = f.ok_or_else(|| BindingError::raised(format!("attempt to call a {} value", function.type_name())))?;
        f(self, args)
    }

    // ==========================================================================
    // Callback registrations
    // ==========================================================================

    /// Retain every function in `set` and register it.
    pub fn install_callbacks(&self, set: CallbackSet) -> RegistrationId {
        for value in set.functions() {
            self.retain(value);
        }
        let id = self.callbacks.borrow_mut().insert(set);
        debug!("installed callback set {id:?}");
        id
    }

    /// Release a registration. Unknown ids are ignored.
    pub fn release_callbacks(&self, id: RegistrationId) {
        let removed = self.callbacks.borrow_mut().remove(id);
        if let Some(set) = removed {
            debug!("released callback set {id:?}");
            for value in set.functions() {
                self.release(value);
            }
        }
    }

    pub fn callback_set(&self, id: RegistrationId) -> Option<CallbackSet> {
        self.callbacks.borrow().get(id).cloned()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub(crate) fn set_host_error(&self, error: BindingError) {
        *self.host_error.borrow_mut() = Some(error);
    }

    pub(crate) fn take_host_error(&self) -> Option<BindingError> {
        self.host_error.borrow_mut().take()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("cairo", &self.cairo)
            .field("handles", &self.resources.borrow().len())
            .field("functions", &self.functions.borrow().len())
            .field("callbacks", &self.callbacks.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let handles = self.resources.get_mut().handles();
        debug!("runtime shutdown: finalizing {} handles", handles.len());
        for handle in handles {
            let taken = self.resources.get_mut().take(handle);
            if let Some(ptr) = taken {
                self.run_finalizer(handle, ptr);
            }
        }
        // Trampolines cannot reach the runtime any more; drop what they held.
        self.callbacks.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oocairo_native::Format;

    fn image(rt: &Runtime) -> Value {
        rt.wrap(tags::SURFACE, rt.cairo().image_surface_create(Format::Argb32, 4, 4))
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let rt = Runtime::new();
        let surface = image(&rt);
        let ptr = rt.unwrap(&surface, tags::SURFACE).unwrap();
        assert_eq!(rt.cairo().reference_count(ptr), 1);

        let err = rt.unwrap(&surface, tags::CONTEXT).unwrap_err();
        assert!(err.is_type_mismatch());
        let err = rt.unwrap(&Value::Number(1.0), tags::CONTEXT).unwrap_err();
        assert!(err.to_string().contains("got number"));
    }

    #[test]
    fn test_finalize_twice() {
        let rt = Runtime::new();
        let surface = image(&rt);
        let ptr = rt.unwrap(&surface, tags::SURFACE).unwrap();

        assert!(rt.finalize(&surface));
        assert!(!rt.finalize(&surface));
        assert_eq!(rt.cairo().call_count("cairo_surface_destroy"), 1);
        assert_eq!(rt.cairo().reference_count(ptr), 0);
        assert!(rt.unwrap(&surface, tags::SURFACE).unwrap_err().is_use_after_free());
    }

    #[test]
    fn test_release_finalizes_at_zero() {
        let rt = Runtime::new();
        let surface = image(&rt);
        rt.retain(&surface);
        rt.release(&surface);
        assert!(rt.is_live(&surface));
        rt.release(&surface);
        assert!(!rt.is_live(&surface));
        assert_eq!(rt.cairo().live_objects(), 0);
    }

    #[test]
    fn test_drop_finalizes_everything() {
        let rt = Runtime::new();
        let _a = image(&rt);
        let _b = image(&rt);
        let cairo_objects = rt.cairo().live_objects();
        assert_eq!(cairo_objects, 2);
        assert_eq!(rt.handle_count(), 2);
        drop(rt);
    }

    #[test]
    fn test_host_functions() {
        let rt = Runtime::new();
        let double = rt.function(|_, args| {
            let n = args.first().and_then(Value::as_number).unwrap_or_default();
            Ok(vec![Value::Number(n * 2.0)])
        });
        assert_eq!(rt.call_function(&double, &[Value::Number(4.0)]), Ok(vec![Value::Number(8.0)]));
        assert!(rt.finalize(&double));
        assert!(rt.call_function(&double, &[]).is_err());
        assert!(rt.call_function(&Value::Nil, &[]).unwrap_err().to_string().contains("nil"));
    }

    #[test]
    fn test_unknown_names() {
        let rt = Runtime::new();
        assert_eq!(
            rt.call("no_such_function", &[]),
            Err(BindingError::UnknownFunction("no_such_function".into()))
        );
        let surface = image(&rt);
        assert!(matches!(
            rt.call_method(&surface, "no_such_method", &[]),
            Err(BindingError::UnknownMethod { .. })
        ));
        assert!(matches!(
            rt.call_method(&Value::Number(1.0), "save", &[]),
            Err(BindingError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_module_info() {
        let rt = Runtime::with_cairo(Cairo::with_features(Features::RECORDING_SURFACE));
        let info = rt.module_info();
        assert_eq!(info.name, "cairo");
        assert_eq!(info.cairo_version, "1.18.0");
        assert!(!info.features.contains(Features::USER_FONT));
        let table = info.to_value();
        assert_eq!(table.get("HAS_RECORDING_SURFACE"), Value::Bool(true));
        assert_eq!(table.get("HAS_USER_FONT"), Value::Bool(false));
    }
}
