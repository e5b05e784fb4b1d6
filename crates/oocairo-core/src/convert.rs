//! Conversion between host values and Rust values.
//!
//! - [`FromValue`]: extract a Rust value from a [`Value`]
//! - [`IntoValue`]: convert a Rust value into a [`Value`]
//!
//! Numbers are the host's only numeric type. Integer targets accept numbers
//! with no fractional part that fit the target type.

use std::rc::Rc;

use crate::{ConversionError, Value};

/// Extract a value from a host value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Convert a value into a host value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

/// Extract a number.
pub fn number(value: &Value) -> Result<f64, ConversionError> {
    value.as_number().ok_or_else(|| mismatch("number", value))
}

/// Extract the bytes of a string.
pub fn bytes(value: &Value) -> Result<Vec<u8>, ConversionError> {
    value
        .as_bytes()
        .map(<[u8]>::to_vec)
        .ok_or_else(|| mismatch("string", value))
}

// ============================================================================
// Numbers
// ============================================================================

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        number(value)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    let n = number(value)?;
                    if n.fract() != 0.0 || !n.is_finite() {
                        return Err(ConversionError::NotAnInteger { value: n });
                    }
                    if n < <$ty>::MIN as f64 || n > <$ty>::MAX as f64 {
                        return Err(ConversionError::OutOfRange {
                            value: n,
                            target: stringify!($ty),
                        });
                    }
                    Ok(n as $ty)
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Number(self as f64)
                }
            }
        )*
    };
}

impl_integer!(i32, i64, u32, u64, usize);

// ============================================================================
// Other scalars
// ============================================================================

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value.as_bool().ok_or_else(|| mismatch("boolean", value))
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            Value::Bytes(b) => String::from_utf8(b.to_vec()).map_err(|_| ConversionError::invalid("invalid UTF-8")),
            _ => Err(mismatch("string", value)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

impl IntoValue for Rc<str> {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Nil
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

// ============================================================================
// Containers
// ============================================================================

/// `nil` converts to `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Nil => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Nil, IntoValue::into_value)
    }
}

/// Sequences convert element by element; errors name the 1-based index.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let table = value.as_table().ok_or_else(|| mismatch("table", value))?;
        let table = table.borrow();
        table
            .array()
            .iter()
            .enumerate()
            .map(|(i, v)| T::from_value(v).map_err(|e| ConversionError::element(i + 1, e)))
            .collect()
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::list(self.into_iter().map(IntoValue::into_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(i32::from_value(&Value::Number(7.0)), Ok(7));
        assert_eq!(
            i32::from_value(&Value::Number(7.5)),
            Err(ConversionError::NotAnInteger { value: 7.5 })
        );
        assert!(matches!(
            u32::from_value(&Value::Number(-1.0)),
            Err(ConversionError::OutOfRange { target: "u32", .. })
        ));
        assert!(matches!(
            i32::from_value(&Value::string("7")),
            Err(ConversionError::TypeMismatch { expected: "number", actual: "string" })
        ));
    }

    #[test]
    fn test_option_and_vec() {
        assert_eq!(Option::<f64>::from_value(&Value::Nil), Ok(None));
        let list = Value::numbers([1.0, 2.0]);
        assert_eq!(Vec::<f64>::from_value(&list), Ok(vec![1.0, 2.0]));

        let bad = Value::list([Value::Number(1.0), Value::Bool(true)]);
        let err = Vec::<f64>::from_value(&bad).unwrap_err();
        assert!(matches!(err, ConversionError::Element { index: 2, .. }));
    }

    #[test]
    fn test_into_value() {
        assert_eq!(3u32.into_value(), Value::Number(3.0));
        assert_eq!(().into_value(), Value::Nil);
        assert_eq!(Some("a").into_value(), Value::string("a"));
        assert_eq!(vec![1.0, 2.0].into_value().len(), 2);
    }
}
