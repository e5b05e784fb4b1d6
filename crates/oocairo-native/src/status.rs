//! Status codes reported by the native library.
//!
//! Objects carry a sticky status: once an operation fails, the object stays in
//! the error state and every later operation on it is a no-op. Functions that
//! return a status directly (region algebra, stream output, matrix inversion)
//! use `Result<T, Status>`.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// Native status code with the library's status-to-string messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Error, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum Status {
    #[default]
    #[error("no error has occurred")]
    Success = 0,
    #[error("out of memory")]
    NoMemory = 1,
    #[error("cairo_restore() without matching cairo_save()")]
    InvalidRestore = 2,
    #[error("no saved group to pop, i.e. cairo_pop_group() without matching cairo_push_group()")]
    InvalidPopGroup = 3,
    #[error("no current point defined")]
    NoCurrentPoint = 4,
    #[error("invalid matrix (not invertible)")]
    InvalidMatrix = 5,
    #[error("invalid value for an input cairo_status_t")]
    InvalidStatus = 6,
    #[error("NULL pointer")]
    NullPointer = 7,
    #[error("input string not valid UTF-8")]
    InvalidString = 8,
    #[error("input path data not valid")]
    InvalidPathData = 9,
    #[error("error while reading from input stream")]
    ReadError = 10,
    #[error("error while writing to output stream")]
    WriteError = 11,
    #[error("the target surface has been finished")]
    SurfaceFinished = 12,
    #[error("the surface type is not appropriate for the operation")]
    SurfaceTypeMismatch = 13,
    #[error("the pattern type is not appropriate for the operation")]
    PatternTypeMismatch = 14,
    #[error("invalid value for an input cairo_content_t")]
    InvalidContent = 15,
    #[error("invalid value for an input cairo_format_t")]
    InvalidFormat = 16,
    #[error("invalid value for an input Visual*")]
    InvalidVisual = 17,
    #[error("file not found")]
    FileNotFound = 18,
    #[error("invalid value for a dash setting")]
    InvalidDash = 19,
    #[error("invalid value for a DSC comment")]
    InvalidDscComment = 20,
    #[error("invalid index passed to getter")]
    InvalidIndex = 21,
    #[error("clip region not representable in desired format")]
    ClipNotRepresentable = 22,
    #[error("error creating or writing to a temporary file")]
    TempFileError = 23,
    #[error("invalid value for stride")]
    InvalidStride = 24,
    #[error("the font type is not appropriate for the operation")]
    FontTypeMismatch = 25,
    #[error("the user-font is immutable")]
    UserFontImmutable = 26,
    #[error("error occurred in a user-font callback function")]
    UserFontError = 27,
    #[error("negative number used where it is not allowed")]
    NegativeCount = 28,
    #[error("input clusters do not represent the accompanying text and glyph arrays")]
    InvalidClusters = 29,
    #[error("invalid value for an input cairo_font_slant_t")]
    InvalidSlant = 30,
    #[error("invalid value for an input cairo_font_weight_t")]
    InvalidWeight = 31,
    #[error("invalid value (typically too big) for the size of the input (surface, pattern, etc.)")]
    InvalidSize = 32,
    #[error("user-font method not implemented")]
    UserFontNotImplemented = 33,
}

impl Status {
    /// Whether this is the success status.
    #[inline]
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// Convert to a `Result`, treating anything but success as an error.
    #[inline]
    pub fn into_result(self) -> Result<(), Status> {
        if self.is_success() { Ok(()) } else { Err(self) }
    }

    /// The status-to-string message.
    pub fn message(self) -> String {
        self.to_string()
    }

    /// Keep the first error: a sticky status is only replaced while it is still success.
    #[inline]
    pub(crate) fn set_sticky(&mut self, status: Status) {
        if self.is_success() {
            *self = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for code in 0..=33 {
            let status = Status::try_from(code).unwrap();
            assert_eq!(i32::from(status), code);
        }
        assert!(Status::try_from(34).is_err());
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(Status::Success.message(), "no error has occurred");
        assert_eq!(Status::InvalidMatrix.to_string(), "invalid matrix (not invertible)");
        assert_eq!(Status::WriteError.to_string(), "error while writing to output stream");
    }

    #[test]
    fn test_sticky_keeps_first_error() {
        let mut status = Status::Success;
        status.set_sticky(Status::NoCurrentPoint);
        status.set_sticky(Status::InvalidDash);
        assert_eq!(status, Status::NoCurrentPoint);
        assert_eq!(status.into_result(), Err(Status::NoCurrentPoint));
    }
}
