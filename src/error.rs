//! Error types for the fgen_example crate.

use thiserror::Error;

/// Result type alias for fgen_example operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fgen_example operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The registry had no free slot.
    #[error("could not create instance of {type_name}: all {capacity} slots are in use")]
    AllocationExhausted {
        type_name: &'static str,
        capacity: usize,
    },

    /// A guarded operation was called on a wrapper holding the sentinel handle.
    #[error("{type_name} is uninitialised (finalized or never connected)")]
    UninitializedAccess { type_name: &'static str },

    /// Native initialization failed after a handle was allocated.
    ///
    /// The handle has been released again. If that release failed too, the
    /// secondary error is kept in `rollback`.
    #[error("failed to build {type_name}: {source}")]
    ConstructionFailed {
        type_name: &'static str,
        /// The error raised by initialization.
        source: Box<Error>,
        /// Error raised while releasing the handle during rollback.
        rollback: Option<Box<Error>>,
    },

    /// A field of the native state could not be read.
    #[error("{field} could not be retrieved, perhaps it is unset?")]
    FieldRetrievalFailed { field: String },

    /// The native side does not recognise this handle.
    #[error("invalid {type_name} handle {index}")]
    InvalidHandle { type_name: &'static str, index: i32 },

    /// Function argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unit symbol is not known.
    #[error("unknown unit: {0:?}")]
    UnknownUnit(String),

    /// Quantity cannot be converted to the expected unit.
    #[error("cannot convert from {from} to {to}")]
    IncompatibleUnits { from: String, to: String },
}

impl Error {
    /// Check if this is a pool exhaustion error.
    pub fn is_allocation_exhausted(&self) -> bool {
        matches!(self, Error::AllocationExhausted { .. })
    }

    /// Check if this is a use-after-finalize error.
    pub fn is_uninitialized_access(&self) -> bool {
        matches!(self, Error::UninitializedAccess { .. })
    }

    /// Check if this is a construction failure.
    pub fn is_construction_failed(&self) -> bool {
        matches!(self, Error::ConstructionFailed { .. })
    }

    /// Check if this is a unit error.
    pub fn is_unit_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownUnit(_) | Error::IncompatibleUnits { .. }
        )
    }

    /// The innermost error, looking through `ConstructionFailed`.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::ConstructionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_construction_failure() {
        let err = Error::ConstructionFailed {
            type_name: "DerivedType",
            source: Box::new(Error::InvalidArgument("base must be finite".into())),
            rollback: None,
        };
        assert!(err.is_construction_failed());
        assert!(matches!(err.root_cause(), Error::InvalidArgument(_)));
        assert_eq!(
            err.to_string(),
            "failed to build DerivedType: invalid argument: base must be finite"
        );
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = Error::ConstructionFailed {
            type_name: "Operator",
            source: Box::new(Error::InvalidArgument("x".into())),
            rollback: None,
        };
        assert!(err.source().is_some());
        assert!(Error::UninitializedAccess { type_name: "Operator" }
            .source()
            .is_none());
    }
}
