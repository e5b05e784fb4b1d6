//! Cairo bindings for a dynamic scripting host.
//!
//! The host side is modelled by a [`Runtime`]: it owns the native library
//! instance, the opaque handles scripts hold and the host closures they pass
//! in. Module functions and methods are looked up in a [`TypeRegistry`] and
//! run against a [`CallContext`] that validates arguments before any native
//! call is made.
//!
//! ```
//! use oocairo::Runtime;
//! use oocairo_core::Value;
//!
//! let rt = Runtime::new();
//! let surface = rt
//!     .call("image_surface_create", &["argb32".into(), 10.into(), 10.into()])
//!     .unwrap()
//!     .remove(0);
//! let cr = rt.call("context_create", &[surface]).unwrap().remove(0);
//!
//! rt.call_method(&cr, "set_source_rgb", &[0.into(), 0.into(), 0.into()]).unwrap();
//! rt.call_method(&cr, "paint", &[]).unwrap();
//! assert!(rt.call_method(&cr, "status", &[]).unwrap().is_empty());
//!
//! let err = rt.call_method(&cr, "set_line_cap", &[Value::string("pointy")]).unwrap_err();
//! assert_eq!(err.position(), Some(2));
//! ```

mod bindings;
pub mod call;
pub mod callback;
pub mod dispatch;
pub mod registry;
pub mod runtime;

pub use call::CallContext;
pub use callback::{CallbackManager, CallbackSet, RegistrationId, StreamReader, StreamWriter, UserFontTrampoline};
pub use dispatch::Source;
pub use registry::{Finalizer, FunctionEntry, NativeCallable, NativeFn, TypeEntry, TypeRegistry};
pub use runtime::{HostFn, ModuleInfo, Runtime};

pub use oocairo_core;
pub use oocairo_native;
