//! Error types.
//!
//! [`ConversionError`] describes why a single host value could not be
//! converted. [`BindingError`] is what a binding call returns: it adds the
//! function name and argument position, or wraps a native status.

use oocairo_native::Status;
use thiserror::Error;

// ============================================================================
// Conversion Errors
// ============================================================================

/// Failure to convert one host value into a native value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The value has the wrong host type.
    #[error("{expected} expected, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A number with a fractional part where an integer is required.
    #[error("number has no integer representation: {value}")]
    NotAnInteger { value: f64 },

    /// An integer outside the target type's range.
    #[error("value {value} out of range for {target}")]
    OutOfRange { value: f64, target: &'static str },

    /// A string that is not a member of an enum family.
    #[error("invalid {family} value '{value}' (expected one of: {options})")]
    InvalidOption {
        family: &'static str,
        value: String,
        options: String,
    },

    /// A record field that is absent.
    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    /// A record field that is present but invalid.
    #[error("field '{field}': {source}")]
    Field {
        field: &'static str,
        source: Box<ConversionError>,
    },

    /// An invalid element of a sequence (1-based index).
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<ConversionError>,
    },

    /// A number that must not be negative.
    #[error("{what} must not be negative")]
    Negative { what: &'static str },

    /// Any other constraint violation.
    #[error("{0}")]
    Invalid(String),
}

impl ConversionError {
    pub fn field(field: &'static str, source: ConversionError) -> Self {
        ConversionError::Field {
            field,
            source: Box::new(source),
        }
    }

    pub fn element(index: usize, source: ConversionError) -> Self {
        ConversionError::Element {
            index,
            source: Box::new(source),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ConversionError::Invalid(message.into())
    }
}

// ============================================================================
// Binding Errors
// ============================================================================

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

/// Errors returned by binding calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// An argument failed validation. No native call was made.
    #[error("bad argument #{position} to '{function}' ({reason})")]
    Argument {
        function: String,
        /// 1-based, counting the receiver of a method.
        position: usize,
        reason: ConversionError,
    },

    /// A handle argument has the wrong tag.
    #[error("bad argument #{position} to '{function}' ({expected} expected, got {actual})")]
    TypeMismatch {
        function: String,
        position: usize,
        expected: String,
        actual: String,
    },

    /// A handle argument whose object was already finalized.
    #[error("bad argument #{position} to '{function}' ({tag} used after it was finalized)")]
    UseAfterFree {
        function: String,
        position: usize,
        tag: String,
    },

    /// The native library reported a failure.
    #[error("{function}: {status}{}", detail_suffix(.detail))]
    NativeStatus {
        function: String,
        status: Status,
        /// Extra information from the host, such as a stream error message.
        detail: Option<String>,
    },

    /// Invalid configuration passed to a constructor.
    #[error("{function}: {message}")]
    Configuration { function: String, message: String },

    #[error("no method '{method}' on {type_name}")]
    UnknownMethod { type_name: String, method: String },

    #[error("no function '{0}' in module")]
    UnknownFunction(String),

    /// An error raised by host code.
    #[error("{0}")]
    Raised(String),
}

impl BindingError {
    pub fn native(function: impl Into<String>, status: Status) -> Self {
        BindingError::NativeStatus {
            function: function.into(),
            status,
            detail: None,
        }
    }

    pub fn configuration(function: impl Into<String>, message: impl Into<String>) -> Self {
        BindingError::Configuration {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn raised(message: impl Into<String>) -> Self {
        BindingError::Raised(message.into())
    }

    /// Native status carried by this error, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            BindingError::NativeStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Argument position, for argument-level errors.
    pub fn position(&self) -> Option<usize> {
        match self {
            BindingError::Argument { position, .. }
            | BindingError::TypeMismatch { position, .. }
            | BindingError::UseAfterFree { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, BindingError::Argument { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, BindingError::TypeMismatch { .. })
    }

    pub fn is_use_after_free(&self) -> bool {
        matches!(self, BindingError::UseAfterFree { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, BindingError::Configuration { .. })
    }
}

/// Result alias for binding calls.
pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_message() {
        let err = BindingError::Argument {
            function: "set_antialias".into(),
            position: 2,
            reason: ConversionError::InvalidOption {
                family: "antialias",
                value: "bogus".into(),
                options: "default, none, gray, subpixel".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "bad argument #2 to 'set_antialias' (invalid antialias value 'bogus' \
             (expected one of: default, none, gray, subpixel))"
        );
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_native_status_message() {
        let err = BindingError::NativeStatus {
            function: "write_to_stream".into(),
            status: Status::WriteError,
            detail: Some("disk full".into()),
        };
        assert_eq!(err.status(), Some(Status::WriteError));
        assert!(err.to_string().ends_with("(disk full)"));
        assert!(BindingError::native("f", Status::NoMemory).to_string().starts_with("f: "));
    }

    #[test]
    fn test_nested_conversion_message() {
        let err = ConversionError::element(3, ConversionError::Negative { what: "dash length" });
        assert_eq!(err.to_string(), "element 3: dash length must not be negative");
    }
}
