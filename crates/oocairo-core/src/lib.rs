//! Host value model and marshaling for the oocairo binding.
//!
//! This crate contains the pieces shared by every binding entry point:
//!
//! - [`TypeHash`] and the [`tags`] identifying each handle type
//! - [`Value`] and [`Table`], the dynamic host values
//! - [`ObjectHeap`], generational storage behind host handles
//! - [`FromValue`] / [`IntoValue`] and the [`EnumName`] string tables
//! - [`records`], structured values copied across the boundary
//! - [`ConversionError`] and [`BindingError`]

pub mod convert;
pub mod enums;
pub mod error;
pub mod heap;
pub mod records;
pub mod type_hash;
pub mod value;

pub use convert::{FromValue, IntoValue};
pub use enums::EnumName;
pub use error::{BindingError, BindingResult, ConversionError};
pub use heap::{ObjectHandle, ObjectHeap};
pub use type_hash::{TypeHash, hash_constants, tags};
pub use value::{Table, TableKey, TableRef, Value};
