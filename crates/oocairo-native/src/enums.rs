//! Native enumerations.
//!
//! Discriminants follow the native library's numeric values so they can be
//! carried through raw streams and compared against external data.

use num_enum::{IntoPrimitive, TryFromPrimitive};

macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $default:ident = $dv:expr,
            $($variant:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
        #[repr(i32)]
        pub enum $name {
            #[default]
            $default = $dv,
            $($variant = $value),*
        }
    };
}

native_enum! {
    /// Antialiasing mode used when rasterizing.
    pub enum Antialias { Default = 0, None = 1, Gray = 2, Subpixel = 3 }
}

native_enum! {
    /// How the ends of stroked lines are drawn.
    pub enum LineCap { Butt = 0, Round = 1, Square = 2 }
}

native_enum! {
    /// How the joins between stroked segments are drawn.
    pub enum LineJoin { Miter = 0, Round = 1, Bevel = 2 }
}

native_enum! {
    /// Rule deciding which points are inside a path.
    pub enum FillRule { Winding = 0, EvenOdd = 1 }
}

native_enum! {
    /// Compositing operator.
    pub enum Operator {
        Over = 2,
        Clear = 0,
        Source = 1,
        In = 3,
        Out = 4,
        Atop = 5,
        Dest = 6,
        DestOver = 7,
        DestIn = 8,
        DestOut = 9,
        DestAtop = 10,
        Xor = 11,
        Add = 12,
        Saturate = 13,
    }
}

native_enum! {
    /// What happens outside the natural area of a pattern.
    pub enum Extend { None = 0, Repeat = 1, Reflect = 2, Pad = 3 }
}

native_enum! {
    /// Filtering applied when reading pixel values from patterns.
    pub enum Filter { Good = 1, Fast = 0, Best = 2, Nearest = 3, Bilinear = 4, Gaussian = 5 }
}

native_enum! {
    /// Content of a surface.
    pub enum Content { ColorAlpha = 0x3000, Color = 0x1000, Alpha = 0x2000 }
}

native_enum! {
    /// Pixel format of an image surface.
    pub enum Format { Argb32 = 0, Rgb24 = 1, A8 = 2, A1 = 3 }
}

native_enum! {
    /// Slant of a toy font.
    pub enum FontSlant { Normal = 0, Italic = 1, Oblique = 2 }
}

native_enum! {
    /// Weight of a toy font.
    pub enum FontWeight { Normal = 0, Bold = 1 }
}

native_enum! {
    /// Font backend of a font face.
    pub enum FontType { Toy = 0, Ft = 1, Win32 = 2, Quartz = 3, User = 4 }
}

native_enum! {
    /// Subpixel order for subpixel antialiasing.
    pub enum SubpixelOrder { Default = 0, Rgb = 1, Bgr = 2, Vrgb = 3, Vbgr = 4 }
}

native_enum! {
    /// Amount of hinting applied to font outlines.
    pub enum HintStyle { Default = 0, None = 1, Slight = 2, Medium = 3, Full = 4 }
}

native_enum! {
    /// Whether font metrics are quantized to device units.
    pub enum HintMetrics { Default = 0, Off = 1, On = 2 }
}

native_enum! {
    /// Backend of a surface.
    pub enum SurfaceType { Image = 0, Recording = 16, Subsurface = 22 }
}

native_enum! {
    /// Kind of a pattern.
    pub enum PatternType { Solid = 0, Surface = 1, Linear = 2, Radial = 3 }
}

native_enum! {
    /// Relation between a rectangle and a region.
    pub enum RegionOverlap { In = 0, Out = 1, Part = 2 }
}

native_enum! {
    /// Kind of a path segment.
    pub enum PathDataType { MoveTo = 0, LineTo = 1, CurveTo = 2, ClosePath = 3 }
}

impl Format {
    /// Bits used by one pixel.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            Format::Argb32 | Format::Rgb24 => 32,
            Format::A8 => 8,
            Format::A1 => 1,
        }
    }

    /// Content stored by the format.
    pub fn content(self) -> Content {
        match self {
            Format::Argb32 => Content::ColorAlpha,
            Format::Rgb24 => Content::Color,
            Format::A8 | Format::A1 => Content::Alpha,
        }
    }
}

impl Content {
    /// Image format used for similar image surfaces of this content.
    pub fn image_format(self) -> Format {
        match self {
            Content::Color => Format::Rgb24,
            Content::Alpha => Format::A8,
            Content::ColorAlpha => Format::Argb32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_native_defaults() {
        assert_eq!(Operator::default(), Operator::Over);
        assert_eq!(Filter::default(), Filter::Good);
        assert_eq!(Content::default(), Content::ColorAlpha);
        assert_eq!(i32::from(Operator::Saturate), 13);
    }

    #[test]
    fn test_content_values() {
        assert_eq!(i32::from(Content::Color), 0x1000);
        assert_eq!(Content::try_from(0x2000).ok(), Some(Content::Alpha));
        assert!(Format::try_from(4).is_err());
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(Format::A1.bits_per_pixel(), 1);
        assert_eq!(Format::Rgb24.content(), Content::Color);
        assert_eq!(Content::Alpha.image_format(), Format::A8);
    }
}
