//! Error conversion utilities for the native boundary.
//!
//! Native routines report failures as an integer status plus a detail string,
//! the same shape a compiled module hands back through its wrapper layer.

use std::fmt;

use crate::error::Error;

/// Status code returned by native routines.
pub type NativeStatus = i32;

// Status codes
pub const STATUS_UNKNOWN_INDEX: NativeStatus = 1;
pub const STATUS_UNSET: NativeStatus = 2;
pub const STATUS_INVALID_ARGUMENT: NativeStatus = 3;

/// A failed native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    pub status: NativeStatus,
    /// Model index for `STATUS_UNKNOWN_INDEX`, field name for `STATUS_UNSET`,
    /// free text otherwise.
    pub detail: String,
}

impl NativeError {
    pub(crate) fn unknown_index(index: i32) -> Self {
        Self {
            status: STATUS_UNKNOWN_INDEX,
            detail: index.to_string(),
        }
    }

    pub(crate) fn unset(field: &str) -> Self {
        Self {
            status: STATUS_UNSET,
            detail: field.to_string(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_INVALID_ARGUMENT,
            detail: message.into(),
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native status {}: {}", self.status, self.detail)
    }
}

/// Convert a native error into a crate error.
///
/// `type_name` names the derived type whose registry produced the error.
pub fn error_from_native(type_name: &'static str, err: NativeError) -> Error {
    match err.status {
        STATUS_UNKNOWN_INDEX => Error::InvalidHandle {
            type_name,
            index: err.detail.parse().unwrap_or(super::INVALID_MODEL_INDEX),
        },
        STATUS_UNSET => Error::FieldRetrievalFailed { field: err.detail },
        STATUS_INVALID_ARGUMENT => Error::InvalidArgument(err.detail),
        _ => Error::InvalidArgument(err.to_string()),
    }
}

/// Check a native result and convert its error.
pub fn check_native<T>(
    type_name: &'static str,
    result: std::result::Result<T, NativeError>,
) -> crate::Result<T> {
    result.map_err(|err| error_from_native(type_name, err))
}
