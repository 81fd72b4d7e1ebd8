//! Handle types for opaque references to native instances.
//!
//! Each handle type is a newtype wrapper around an `i32` model index, so a
//! `DerivedTypeIndex` can never be passed where an `OperatorIndex` is expected.

use std::fmt;

/// Model index reserved for "no instance attached".
pub const INVALID_MODEL_INDEX: i32 = -1;

/// Common behaviour of all handle types.
pub trait RawHandle: Copy + Eq + fmt::Debug + fmt::Display {
    /// Wrap a raw model index.
    fn from_raw(index: i32) -> Self;

    /// The raw model index.
    fn raw(&self) -> i32;

    /// The sentinel handle.
    fn invalid() -> Self {
        Self::from_raw(INVALID_MODEL_INDEX)
    }

    /// Check if this handle is not the sentinel.
    fn is_valid(&self) -> bool {
        self.raw() != INVALID_MODEL_INDEX
    }
}

/// Macro to define a handle type.
macro_rules! define_handle {
    ($name:ident) => {
        /// Opaque handle to a native instance.
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            index: i32,
        }

        impl $name {
            /// Create an invalid (sentinel) handle.
            #[inline]
            pub const fn invalid() -> Self {
                Self {
                    index: $crate::ffi::handles::INVALID_MODEL_INDEX,
                }
            }

            /// Check if this handle is valid (not the sentinel).
            #[inline]
            pub const fn is_valid(&self) -> bool {
                self.index != $crate::ffi::handles::INVALID_MODEL_INDEX
            }
        }

        impl $crate::ffi::handles::RawHandle for $name {
            #[inline]
            fn from_raw(index: i32) -> Self {
                Self { index }
            }

            #[inline]
            fn raw(&self) -> i32 {
                self.index
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.index)
            }
        }
    };
}

define_handle!(DerivedTypeIndex);
define_handle!(OperatorIndex);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sentinel() {
        let h = DerivedTypeIndex::default();
        assert!(!h.is_valid());
        assert_eq!(h.raw(), INVALID_MODEL_INDEX);
        assert_eq!(h, <DerivedTypeIndex as RawHandle>::invalid());
    }

    #[test]
    fn test_zero_is_valid() {
        let h = OperatorIndex::from_raw(0);
        assert!(h.is_valid());
        assert_eq!(h.to_string(), "0");
    }
}
