//! Object table with manual reference counting.
//!
//! Every native object lives in one table keyed by [`NativePtr`]. Objects
//! hold references to other objects (a context references its target and
//! source, a pattern its surface, a scaled font its face); when a count
//! reaches zero the object is removed and its children released in turn.
//!
//! Removed objects are dropped only after the table borrow ends, so a
//! destructor that calls back into host code (user font hooks) can re-enter
//! the library freely.

use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroU64;

use log::trace;
use rustc_hash::FxHashMap;

use crate::context::ContextData;
use crate::font::{FontFaceData, FontOptionsData, ScaledFontData};
use crate::path::PathData;
use crate::pattern::PatternData;
use crate::region::RegionData;
use crate::surface::SurfaceData;
use crate::{Features, Status};

/// Opaque pointer to a native object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativePtr(NonZeroU64);

impl NativePtr {
    /// Raw address, for diagnostics.
    pub fn addr(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for NativePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativePtr({:#x})", self.0.get())
    }
}

/// Kind of a native object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Context,
    Surface,
    Pattern,
    FontFace,
    ScaledFont,
    FontOptions,
    Path,
    Region,
}

impl ResourceKind {
    fn reference_symbol(self) -> &'static str {
        match self {
            ResourceKind::Context => "cairo_reference",
            ResourceKind::Surface => "cairo_surface_reference",
            ResourceKind::Pattern => "cairo_pattern_reference",
            ResourceKind::FontFace => "cairo_font_face_reference",
            ResourceKind::ScaledFont => "cairo_scaled_font_reference",
            ResourceKind::FontOptions => "cairo_font_options_reference",
            ResourceKind::Path => "cairo_path_reference",
            ResourceKind::Region => "cairo_region_reference",
        }
    }

    fn destroy_symbol(self) -> &'static str {
        match self {
            ResourceKind::Context => "cairo_destroy",
            ResourceKind::Surface => "cairo_surface_destroy",
            ResourceKind::Pattern => "cairo_pattern_destroy",
            ResourceKind::FontFace => "cairo_font_face_destroy",
            ResourceKind::ScaledFont => "cairo_scaled_font_destroy",
            ResourceKind::FontOptions => "cairo_font_options_destroy",
            ResourceKind::Path => "cairo_path_destroy",
            ResourceKind::Region => "cairo_region_destroy",
        }
    }
}

/// Behaviour shared by every object body.
pub(crate) trait Resource {
    fn status(&self) -> Status;

    /// Objects this one holds a reference to.
    fn children(&self) -> Vec<NativePtr> {
        Vec::new()
    }
}

/// Typed access to a [`Body`] variant.
pub(crate) trait BodyCast: Resource + Sized {
    fn cast(body: &Body) -> Option<&Self>;
    fn cast_mut(body: &mut Body) -> Option<&mut Self>;
    fn into_body(self) -> Body;
}

macro_rules! bodies {
    ($($variant:ident($data:ty)),+ $(,)?) => {
        pub(crate) enum Body {
            $($variant($data)),+
        }

        impl Body {
            fn kind(&self) -> ResourceKind {
                match self {
                    $(Body::$variant(_) => ResourceKind::$variant),+
                }
            }

            fn status(&self) -> Status {
                match self {
                    $(Body::$variant(data) => data.status()),+
                }
            }

            fn children(&self) -> Vec<NativePtr> {
                match self {
                    $(Body::$variant(data) => data.children()),+
                }
            }
        }

        $(
            impl BodyCast for $data {
                fn cast(body: &Body) -> Option<&Self> {
                    match body {
                        Body::$variant(data) => Some(data),
                        _ => None,
                    }
                }

                fn cast_mut(body: &mut Body) -> Option<&mut Self> {
                    match body {
                        Body::$variant(data) => Some(data),
                        _ => None,
                    }
                }

                fn into_body(self) -> Body {
                    Body::$variant(self)
                }
            }
        )+
    };
}

bodies! {
    Context(ContextData),
    Surface(SurfaceData),
    Pattern(PatternData),
    FontFace(FontFaceData),
    ScaledFont(ScaledFontData),
    FontOptions(FontOptionsData),
    Path(PathData),
    Region(RegionData),
}

/// Reference count changes made while an object body is borrowed.
pub(crate) struct Refs<'a> {
    counts: &'a mut FxHashMap<NativePtr, u32>,
    dying: &'a mut Vec<NativePtr>,
}

impl Refs<'_> {
    pub(crate) fn reference(&mut self, ptr: NativePtr) {
        if let Some(count) = self.counts.get_mut(&ptr) {
            *count += 1;
        }
    }

    pub(crate) fn release(&mut self, ptr: NativePtr) {
        if let Some(count) = self.counts.get_mut(&ptr) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.dying.push(ptr);
            }
        }
    }
}

#[derive(Default)]
struct Objects {
    next_id: u64,
    counts: FxHashMap<NativePtr, u32>,
    bodies: FxHashMap<NativePtr, Body>,
}

impl Objects {
    fn reap(&mut self, mut dying: Vec<NativePtr>, graveyard: &mut Vec<Body>) {
        while let Some(ptr) = dying.pop() {
            self.counts.remove(&ptr);
            let Some(body) = self.bodies.remove(&ptr) else {
                continue;
            };
            trace!("freeing {:?} {:?}", body.kind(), ptr);
            for child in body.children() {
                let mut refs = Refs {
                    counts: &mut self.counts,
                    dying: &mut dying,
                };
                refs.release(child);
            }
            graveyard.push(body);
        }
    }
}

/// The native graphics library.
///
/// All state lives inside this value; nothing is process-global. Every
/// public entry point appends its native symbol name to a call log, which
/// tests use to verify which native calls a binding actually made.
pub struct Cairo {
    objects: RefCell<Objects>,
    calls: RefCell<Vec<&'static str>>,
    features: Features,
}

impl Default for Cairo {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cairo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cairo")
            .field("live_objects", &self.live_objects())
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

impl Cairo {
    /// Library version as `(major, minor, micro)`.
    pub const VERSION: (u32, u32, u32) = (1, 18, 0);

    pub fn new() -> Self {
        Self::with_features(Features::SUPPORTED)
    }

    /// Create a library instance advertising only `features`.
    pub fn with_features(features: Features) -> Self {
        Self {
            objects: RefCell::new(Objects::default()),
            calls: RefCell::new(Vec::new()),
            features: features & Features::SUPPORTED,
        }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    /// Encoded version number, `major * 10000 + minor * 100 + micro`.
    pub fn version(&self) -> u32 {
        let (major, minor, micro) = Self::VERSION;
        major * 10000 + minor * 100 + micro
    }

    pub fn version_string(&self) -> String {
        let (major, minor, micro) = Self::VERSION;
        format!("{major}.{minor}.{micro}")
    }

    // ========================================================================
    // Call log
    // ========================================================================

    pub(crate) fn log(&self, symbol: &'static str) {
        trace!("{symbol}");
        self.calls.borrow_mut().push(symbol);
    }

    /// Native symbols called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn was_called(&self, symbol: &str) -> bool {
        self.calls.borrow().iter().any(|s| *s == symbol)
    }

    pub fn call_count(&self, symbol: &str) -> usize {
        self.calls.borrow().iter().filter(|s| **s == symbol).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    // ========================================================================
    // Generic resource API
    // ========================================================================

    /// Number of objects currently alive.
    pub fn live_objects(&self) -> usize {
        self.objects.borrow().bodies.len()
    }

    pub fn kind(&self, ptr: NativePtr) -> Option<ResourceKind> {
        self.objects.borrow().bodies.get(&ptr).map(Body::kind)
    }

    /// Take a new reference to `ptr`.
    pub fn reference(&self, ptr: NativePtr) -> NativePtr {
        if let Some(kind) = self.kind(ptr) {
            self.log(kind.reference_symbol());
            self.retain(ptr);
        }
        ptr
    }

    /// Release one reference to `ptr`, freeing it at zero.
    pub fn destroy(&self, ptr: NativePtr) {
        if let Some(kind) = self.kind(ptr) {
            self.log(kind.destroy_symbol());
            self.release(ptr);
        }
    }

    /// Current reference count; zero once the object is gone.
    pub fn reference_count(&self, ptr: NativePtr) -> u32 {
        self.objects.borrow().counts.get(&ptr).copied().unwrap_or(0)
    }

    /// Sticky status of any object.
    pub fn status(&self, ptr: NativePtr) -> Status {
        self.objects
            .borrow()
            .bodies
            .get(&ptr)
            .map_or(Status::NullPointer, Body::status)
    }

    // ========================================================================
    // Internal access
    // ========================================================================

    pub(crate) fn retain(&self, ptr: NativePtr) {
        self.mutate(|objects, dying| {
            Refs {
                counts: &mut objects.counts,
                dying,
            }
            .reference(ptr)
        });
    }

    pub(crate) fn release(&self, ptr: NativePtr) {
        self.mutate(|objects, dying| {
            Refs {
                counts: &mut objects.counts,
                dying,
            }
            .release(ptr)
        });
    }

    pub(crate) fn insert<T: BodyCast>(&self, data: T) -> NativePtr {
        let mut objects = self.objects.borrow_mut();
        objects.next_id += 1;
        // Addresses look like aligned heap pointers in logs.
        let addr = 0x1000 + objects.next_id * 0x10;
        let ptr = NativePtr(NonZeroU64::MIN.saturating_add(addr - 1));
        objects.counts.insert(ptr, 1);
        objects.bodies.insert(ptr, data.into_body());
        ptr
    }

    pub(crate) fn with<T: BodyCast, R>(&self, ptr: NativePtr, f: impl FnOnce(&T) -> R) -> Option<R> {
        let objects = self.objects.borrow();
        objects.bodies.get(&ptr).and_then(T::cast).map(f)
    }

    pub(crate) fn with_mut<T: BodyCast, R>(
        &self,
        ptr: NativePtr,
        f: impl FnOnce(&mut T, &mut Refs<'_>) -> R,
    ) -> Option<R> {
        self.mutate(|objects, dying| {
            let data = objects.bodies.get_mut(&ptr).and_then(T::cast_mut)?;
            let mut refs = Refs {
                counts: &mut objects.counts,
                dying,
            };
            Some(f(data, &mut refs))
        })
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Objects, &mut Vec<NativePtr>) -> R) -> R {
        let mut graveyard = Vec::new();
        let result = {
            let mut objects = self.objects.borrow_mut();
            let mut dying = Vec::new();
            let result = f(&mut objects, &mut dying);
            objects.reap(dying, &mut graveyard);
            result
        };
        // Destructors may re-enter the library.
        drop(graveyard);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    #[test]
    fn test_reference_and_destroy() {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create(Format::Argb32, 4, 4);
        assert_eq!(cairo.reference_count(surface), 1);
        cairo.reference(surface);
        assert_eq!(cairo.reference_count(surface), 2);
        cairo.destroy(surface);
        cairo.destroy(surface);
        assert_eq!(cairo.reference_count(surface), 0);
        assert_eq!(cairo.live_objects(), 0);
        assert_eq!(cairo.status(surface), Status::NullPointer);
    }

    #[test]
    fn test_children_released_with_parent() {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create(Format::Argb32, 4, 4);
        let cr = cairo.create(surface);
        cairo.destroy(surface);
        // The context keeps the surface alive.
        assert_eq!(cairo.reference_count(surface), 1);
        cairo.destroy(cr);
        assert_eq!(cairo.live_objects(), 0);
    }

    #[test]
    fn test_call_log() {
        let cairo = Cairo::new();
        let surface = cairo.image_surface_create(Format::A8, 1, 1);
        cairo.destroy(surface);
        assert!(cairo.was_called("cairo_image_surface_create"));
        assert_eq!(cairo.call_count("cairo_surface_destroy"), 1);
        cairo.clear_calls();
        assert!(cairo.calls().is_empty());
    }
}
