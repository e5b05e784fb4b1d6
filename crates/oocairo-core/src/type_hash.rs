//! Deterministic hash-based type tags.
//!
//! Every host-visible object kind is identified by a [`TypeHash`] computed
//! from its registry name. Hashes are computed in `const` context, so the
//! tags in [`tags`] are plain constants and a handle carries its tag without
//! any registry lookup.
//!
//! ```
//! use oocairo_core::{TypeHash, tags};
//!
//! assert_eq!(TypeHash::from_name("cairo context object"), tags::CONTEXT);
//! assert_ne!(tags::CONTEXT, tags::SURFACE);
//! assert_eq!(tags::name(tags::REGION), Some("cairo region object"));
//! ```

use std::fmt;

use xxhash_rust::const_xxh64::xxh64;

/// Domain-specific seeds, so a type and a function with the same name never
/// share a hash.
pub mod hash_constants {
    /// Seed for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Seed for module function hashes.
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;

    /// Seed for method hashes.
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;
}

/// A deterministic 64-bit hash identifying a type, function or method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a type name.
    pub const fn from_name(name: &str) -> TypeHash {
        TypeHash(xxh64(name.as_bytes(), hash_constants::TYPE))
    }

    /// Hash of a module function name.
    pub const fn from_function(name: &str) -> TypeHash {
        TypeHash(xxh64(name.as_bytes(), hash_constants::FUNCTION))
    }

    /// Hash of a method name on a type.
    pub const fn from_method(owner: TypeHash, name: &str) -> TypeHash {
        TypeHash(xxh64(name.as_bytes(), hash_constants::METHOD ^ owner.0))
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match tags::name(*self) {
            Some(name) => write!(f, "TypeHash({name:?})"),
            None => write!(f, "TypeHash({:#018x})", self.0),
        }
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match tags::name(*self) {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#018x}", self.0),
        }
    }
}

/// Tags of every object kind the binding exposes.
pub mod tags {
    use super::TypeHash;

    pub const CONTEXT: TypeHash = TypeHash::from_name("cairo context object");
    pub const SURFACE: TypeHash = TypeHash::from_name("cairo surface object");
    pub const PATTERN: TypeHash = TypeHash::from_name("cairo pattern object");
    pub const FONT_FACE: TypeHash = TypeHash::from_name("cairo font face object");
    pub const SCALED_FONT: TypeHash = TypeHash::from_name("cairo scaled font object");
    pub const FONT_OPTIONS: TypeHash = TypeHash::from_name("cairo font options object");
    pub const MATRIX: TypeHash = TypeHash::from_name("cairo matrix object");
    pub const PATH: TypeHash = TypeHash::from_name("cairo path object");
    pub const REGION: TypeHash = TypeHash::from_name("cairo region object");
    /// Host closures stored in the runtime's function heap.
    pub const FUNCTION: TypeHash = TypeHash::from_name("host function");

    /// Every tag with its name.
    pub const ALL: [(TypeHash, &str); 10] = [
        (CONTEXT, "cairo context object"),
        (SURFACE, "cairo surface object"),
        (PATTERN, "cairo pattern object"),
        (FONT_FACE, "cairo font face object"),
        (SCALED_FONT, "cairo scaled font object"),
        (FONT_OPTIONS, "cairo font options object"),
        (MATRIX, "cairo matrix object"),
        (PATH, "cairo path object"),
        (REGION, "cairo region object"),
        (FUNCTION, "host function"),
    ];

    pub fn name(tag: TypeHash) -> Option<&'static str> {
        ALL.iter().find(|(t, _)| *t == tag).map(|(_, name)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(TypeHash::from_name("x"), TypeHash::from_name("x"));
        assert_ne!(TypeHash::from_name("x"), TypeHash::from_function("x"));
        assert_ne!(
            TypeHash::from_method(tags::CONTEXT, "save"),
            TypeHash::from_method(tags::SURFACE, "save")
        );
    }

    #[test]
    fn test_tags_are_distinct() {
        for (i, (a, _)) in tags::ALL.iter().enumerate() {
            assert!(!a.is_empty());
            for (b, _) in &tags::ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_display_uses_tag_name() {
        assert_eq!(tags::PATTERN.to_string(), "cairo pattern object");
        assert_eq!(TypeHash(0x10).to_string(), "0x0000000000000010");
    }
}
