//! Host names of native enum values.
//!
//! Each family is a closed set of strings. Both directions are generated
//! from one table as exhaustive `match`es, so adding a native variant without
//! a name does not compile.

use oocairo_native::{
    Antialias, Content, Extend, FillRule, Filter, FontSlant, FontType, FontWeight, Format, HintMetrics, HintStyle,
    LineCap, LineJoin, Operator, PathDataType, PatternType, RegionOverlap, SubpixelOrder, SurfaceType,
};

use crate::{ConversionError, FromValue, IntoValue, Value};

/// A native enum with host names.
pub trait EnumName: Sized + Copy + 'static {
    /// Family name used in error messages.
    const FAMILY: &'static str;

    /// Every member, in declaration order.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self>;

    /// Booleans accepted in place of names, if the family allows them.
    fn from_bool(_value: bool) -> Option<Self> {
        None
    }

    /// Comma separated list of valid names.
    fn options() -> String {
        Self::ALL.iter().map(|v| v.name()).collect::<Vec<_>>().join(", ")
    }

    fn parse(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Self::from_bool(*b).ok_or(ConversionError::TypeMismatch {
                expected: "string",
                actual: "boolean",
            }),
            Value::String(_) | Value::Bytes(_) => {
                let name = value.as_str().unwrap_or_default();
                Self::from_name(name).ok_or_else(|| ConversionError::InvalidOption {
                    family: Self::FAMILY,
                    value: name.to_string(),
                    options: Self::options(),
                })
            }
            other => Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }
}

macro_rules! enum_names {
    (
        $ty:ident, $family:literal {
            $($variant:ident => $name:literal),+ $(,)?
        }
        $(bool { true => $on:ident, false => $off:ident })?
    ) => {
        impl EnumName for $ty {
            const FAMILY: &'static str = $family;
            const ALL: &'static [Self] = &[$($ty::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some($ty::$variant),)+
                    _ => None,
                }
            }

            $(
                fn from_bool(value: bool) -> Option<Self> {
                    Some(if value { $ty::$on } else { $ty::$off })
                }
            )?
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ConversionError> {
                <$ty as EnumName>::parse(value)
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::string(self.name())
            }
        }
    };
}

enum_names! {
    Antialias, "antialias" {
        Default => "default",
        None => "none",
        Gray => "gray",
        Subpixel => "subpixel",
    }
    bool { true => Default, false => None }
}

enum_names! {
    LineCap, "line cap" {
        Butt => "butt",
        Round => "round",
        Square => "square",
    }
}

enum_names! {
    LineJoin, "line join" {
        Miter => "miter",
        Round => "round",
        Bevel => "bevel",
    }
}

enum_names! {
    FillRule, "fill rule" {
        Winding => "winding",
        EvenOdd => "even-odd",
    }
}

enum_names! {
    Operator, "operator" {
        Clear => "clear",
        Source => "source",
        Over => "over",
        In => "in",
        Out => "out",
        Atop => "atop",
        Dest => "dest",
        DestOver => "dest-over",
        DestIn => "dest-in",
        DestOut => "dest-out",
        DestAtop => "dest-atop",
        Xor => "xor",
        Add => "add",
        Saturate => "saturate",
    }
}

enum_names! {
    Extend, "extend" {
        None => "none",
        Repeat => "repeat",
        Reflect => "reflect",
        Pad => "pad",
    }
}

enum_names! {
    Filter, "filter" {
        Fast => "fast",
        Good => "good",
        Best => "best",
        Nearest => "nearest",
        Bilinear => "bilinear",
        Gaussian => "gaussian",
    }
}

enum_names! {
    Content, "content" {
        Color => "color",
        Alpha => "alpha",
        ColorAlpha => "color-alpha",
    }
}

enum_names! {
    Format, "format" {
        Argb32 => "argb32",
        Rgb24 => "rgb24",
        A8 => "a8",
        A1 => "a1",
    }
}

enum_names! {
    FontSlant, "font slant" {
        Normal => "normal",
        Italic => "italic",
        Oblique => "oblique",
    }
}

enum_names! {
    FontWeight, "font weight" {
        Normal => "normal",
        Bold => "bold",
    }
}

enum_names! {
    SubpixelOrder, "subpixel order" {
        Default => "default",
        Rgb => "rgb",
        Bgr => "bgr",
        Vrgb => "vrgb",
        Vbgr => "vbgr",
    }
}

enum_names! {
    HintStyle, "hint style" {
        Default => "default",
        None => "none",
        Slight => "slight",
        Medium => "medium",
        Full => "full",
    }
}

enum_names! {
    HintMetrics, "hint metrics" {
        Default => "default",
        Off => "off",
        On => "on",
    }
}

enum_names! {
    FontType, "font type" {
        Toy => "toy",
        Ft => "ft",
        Win32 => "win32",
        Quartz => "quartz",
        User => "user",
    }
}

enum_names! {
    SurfaceType, "surface type" {
        Image => "image",
        Recording => "recording",
        Subsurface => "subsurface",
    }
}

enum_names! {
    PatternType, "pattern type" {
        Solid => "solid",
        Surface => "surface",
        Linear => "linear",
        Radial => "radial",
    }
}

enum_names! {
    RegionOverlap, "region overlap" {
        In => "in",
        Out => "out",
        Part => "part",
    }
}

enum_names! {
    PathDataType, "path data type" {
        MoveTo => "move-to",
        LineTo => "line-to",
        CurveTo => "curve-to",
        ClosePath => "close-path",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: EnumName + FromValue + IntoValue + PartialEq + std::fmt::Debug>() {
        for &member in T::ALL {
            let value = member.into_value();
            assert_eq!(T::from_value(&value), Ok(member), "{}", T::FAMILY);
            assert_eq!(T::from_name(member.name()), Some(member));
        }
    }

    #[test]
    fn test_every_family_round_trips() {
        round_trip::<Antialias>();
        round_trip::<LineCap>();
        round_trip::<LineJoin>();
        round_trip::<FillRule>();
        round_trip::<Operator>();
        round_trip::<Extend>();
        round_trip::<Filter>();
        round_trip::<Content>();
        round_trip::<Format>();
        round_trip::<FontSlant>();
        round_trip::<FontWeight>();
        round_trip::<SubpixelOrder>();
        round_trip::<HintStyle>();
        round_trip::<HintMetrics>();
        round_trip::<FontType>();
        round_trip::<SurfaceType>();
        round_trip::<PatternType>();
        round_trip::<RegionOverlap>();
        round_trip::<PathDataType>();
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(Operator::ALL.len(), 14);
        assert_eq!(Operator::DestOver.name(), "dest-over");
        assert_eq!(FillRule::from_name("even-odd"), Some(FillRule::EvenOdd));
    }

    #[test]
    fn test_antialias_accepts_booleans() {
        assert_eq!(Antialias::from_value(&Value::Bool(true)), Ok(Antialias::Default));
        assert_eq!(Antialias::from_value(&Value::Bool(false)), Ok(Antialias::None));
        assert!(LineCap::from_value(&Value::Bool(true)).is_err());
    }

    #[test]
    fn test_unknown_name() {
        let err = Antialias::from_value(&Value::string("bogus")).unwrap_err();
        assert_eq!(
            err,
            ConversionError::InvalidOption {
                family: "antialias",
                value: "bogus".into(),
                options: "default, none, gray, subpixel".into(),
            }
        );
        assert!(matches!(
            Format::from_value(&Value::Number(1.0)),
            Err(ConversionError::TypeMismatch { expected: "string", .. })
        ));
    }
}
