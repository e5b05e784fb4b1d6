//! TypeRegistry - method tables, finalizers and module functions.
//!
//! The registry maps each handle [`TypeHash`] to a [`TypeEntry`] holding the
//! type's method table and finalizer, and module function names to
//! constructors.
//!
//! # Thread Safety
//!
//! A [`Runtime`](crate::Runtime) is single-threaded, but the default
//! registry is a process-wide `static` built on first use. It sits behind an
//! `RwLock` only for that reason. Entries are `Arc`ed and cloned out of the
//! lock before a function runs, so calls that re-enter the binding from a
//! callback never contend on the lock.
//!
//! # Example
//!
//! ```
//! use oocairo::TypeRegistry;
//! use oocairo_core::tags;
//!
//! let registry = TypeRegistry::with_bindings();
//! assert!(registry.method(tags::CONTEXT, "save").is_some());
//! assert!(registry.function("context_create").is_some());
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use log::debug;
use oocairo_core::{BindingResult, TypeHash, tags};
use oocairo_native::{Cairo, Features, NativePtr};
use rustc_hash::FxHashMap;

use crate::call::CallContext;

static GLOBAL: OnceLock<Arc<RwLock<TypeRegistry>>> = OnceLock::new();

// ============================================================================
// Native functions
// ============================================================================

/// Trait for binding functions callable from the host.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext<'_>) -> BindingResult<()>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> BindingResult<()>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> BindingResult<()> {
        (self)(ctx)
    }
}

/// Type-erased binding function.
///
/// The callable is shared through an `Arc`, so cloning an entry out of the
/// registry is cheap.
#[derive(Clone)]
pub struct NativeFn {
    pub id: TypeHash,
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    pub fn new<F>(id: TypeHash, f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self { id, inner: Arc::new(f) }
    }

    pub fn call(&self, ctx: &mut CallContext<'_>) -> BindingResult<()> {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Releases the native reference owned by a handle.
pub type Finalizer = fn(&Cairo, NativePtr);

// ============================================================================
// Entries
// ============================================================================

/// Method table and finalizer of one handle type.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub tag: TypeHash,
    pub name: &'static str,
    methods: FxHashMap<&'static str, NativeFn>,
    /// `None` for types that are plain host tables (matrices).
    pub finalizer: Option<Finalizer>,
}

impl TypeEntry {
    pub fn new(tag: TypeHash, name: &'static str) -> Self {
        Self {
            tag,
            name,
            methods: FxHashMap::default(),
            finalizer: None,
        }
    }

    pub fn method<F>(mut self, name: &'static str, f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        self.methods.insert(name, NativeFn::new(TypeHash::from_method(self.tag, name), f));
        self
    }

    pub fn finalizer(mut self, finalizer: Finalizer) -> Self {
        self.finalizer = Some(finalizer);
        self
    }

    pub fn get_method(&self, name: &str) -> Option<&NativeFn> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.keys().copied()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

/// A module function and the native features it needs.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub name: &'static str,
    pub native: NativeFn,
    pub requires: Features,
}

// ============================================================================
// Registry
// ============================================================================

/// Type and function registry.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FxHashMap<TypeHash, Arc<TypeEntry>>,
    functions: FxHashMap<&'static str, FunctionEntry>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every binding type and module function.
    pub fn with_bindings() -> Self {
        let mut registry = Self::new();
        crate::bindings::install(&mut registry);
        debug!(
            "installed {} types and {} module functions",
            registry.types.len(),
            registry.functions.len()
        );
        registry
    }

    /// The shared registry, built on first use.
    pub fn global() -> Arc<RwLock<TypeRegistry>> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RwLock::new(TypeRegistry::with_bindings()))))
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a type. Returns `false`, leaving the existing entry in place,
    /// if the tag is already registered.
    pub fn register_type(&mut self, entry: TypeEntry) -> bool {
        if self.types.contains_key(&entry.tag) {
            return false;
        }
        debug!("registered type '{}' with {} methods", entry.name, entry.method_count());
        self.types.insert(entry.tag, Arc::new(entry));
        true
    }

    /// Register a module function. Returns `false` if the name is taken.
    pub fn register_function<F>(&mut self, name: &'static str, requires: Features, f: F) -> bool
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        if self.functions.contains_key(name) {
            return false;
        }
        let native = NativeFn::new(TypeHash::from_function(name), f);
        self.functions.insert(name, FunctionEntry { name, native, requires });
        true
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    pub fn get(&self, tag: TypeHash) -> Option<Arc<TypeEntry>> {
        self.types.get(&tag).cloned()
    }

    pub fn contains_type(&self, tag: TypeHash) -> bool {
        self.types.contains_key(&tag)
    }

    pub fn method(&self, tag: TypeHash, name: &str) -> Option<NativeFn> {
        self.types.get(&tag)?.get_method(name).cloned()
    }

    pub fn finalizer(&self, tag: TypeHash) -> Option<Finalizer> {
        self.types.get(&tag)?.finalizer
    }

    pub fn function(&self, name: &str) -> Option<FunctionEntry> {
        self.functions.get(name).cloned()
    }

    /// Registered module function names, sorted.
    pub fn function_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Name of a registered type, falling back to the well-known tag names.
    pub fn type_name(&self, tag: TypeHash) -> &'static str {
        self.types
            .get(&tag)
            .map(|entry| entry.name)
            .or_else(|| tags::name(tag))
            .unwrap_or("unknown type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut CallContext<'_>) -> BindingResult<()> {
        Ok(())
    }

    #[test]
    fn test_register_type_is_idempotent() {
        let mut registry = TypeRegistry::new();
        let first = TypeEntry::new(tags::REGION, "cairo region object").method("copy", noop);
        let second = TypeEntry::new(tags::REGION, "cairo region object");

        assert!(registry.register_type(first));
        assert!(!registry.register_type(second));
        assert_eq!(registry.type_count(), 1);
        assert!(registry.method(tags::REGION, "copy").is_some());
    }

    #[test]
    fn test_register_function_is_idempotent() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register_function("region_create", Features::empty(), noop));
        assert!(!registry.register_function("region_create", Features::USER_FONT, noop));
        let entry = registry.function("region_create").unwrap();
        assert_eq!(entry.requires, Features::empty());
        assert_eq!(entry.native.id, TypeHash::from_function("region_create"));
    }

    #[test]
    fn test_bindings_cover_every_handle_type() {
        let registry = TypeRegistry::with_bindings();
        for (tag, name) in tags::ALL {
            if tag == tags::FUNCTION {
                continue;
            }
            assert!(registry.contains_type(tag), "{name} not registered");
            assert_eq!(registry.type_name(tag), name);
        }
        assert!(registry.finalizer(tags::MATRIX).is_none());
        assert!(registry.finalizer(tags::SURFACE).is_some());
    }

    #[test]
    fn test_global_is_shared() {
        let a = TypeRegistry::global();
        let b = TypeRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.read().unwrap().function("image_surface_create").is_some());
    }
}
