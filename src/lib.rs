//! Safe wrappers around native derived types, with unit verification.
//!
//! Native objects live in fixed-capacity instance registries and are
//! addressed by integer model indices. This crate hands them out as owned
//! wrapper values that check their handle before every call, release their
//! slot exactly once, and convert units at the boundary.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fgen_example::{
//!     DerivedType, DerivedTypeRegistry, InstanceRegistry, OperatorContext, OperatorRegistry,
//!     Quantity, RegistryOptions,
//! };
//!
//! fn main() -> fgen_example::Result<()> {
//!     // Registries are explicit pools; capacity is configuration.
//!     let options = RegistryOptions { capacity: 16 };
//!     let derived = Arc::new(DerivedTypeRegistry::new(options));
//!     let operators = Arc::new(OperatorRegistry::new(options));
//!
//!     // Manual lifecycle
//!     let mut dt = DerivedType::from_build_args(&derived, Quantity::new(2.0, "m")?)?;
//!     println!("{dt}");
//!     let total = dt.add(Quantity::new(3.0, "cm")?)?;
//!     println!("2 m + 3 cm = {total}");
//!     dt.finalize()?;
//!
//!     // Scoped lifecycle: released when `op` goes out of scope
//!     {
//!         let op = OperatorContext::from_build_args(&operators, Quantity::new(2.0, "1")?)?;
//!         let a = Quantity::new([1.0, 2.0, 3.0], "1")?;
//!         let b = Quantity::new([3.0, 2.0, 1.0], "1")?;
//!         assert_eq!(op.calc_vec_prod_sum(a, b)?.magnitude(), 20.0);
//!     }
//!
//!     assert_eq!(operators.n_free(), 16);
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! Lifecycle events are emitted through [`tracing`] under the
//! `fgen_example` target. The crate never installs a subscriber.

pub mod context;
pub mod derived_type;
pub mod error;
mod ffi;
pub mod operations;
pub mod registry;
pub mod types;
pub mod units;
pub mod wrapper;

// Re-export main types at the crate root
pub use context::Context;
pub use derived_type::{DerivedType, DerivedTypeContext};
pub use error::{Error, Result};
pub use ffi::{
    DerivedTypeArgs, DerivedTypeIndex, DerivedTypeRegistry, OperatorArgs, OperatorIndex,
    OperatorRegistry, RawHandle, INVALID_MODEL_INDEX,
};
pub use operations::{Operator, OperatorContext};
pub use registry::InstanceRegistry;
pub use types::{RegistryOptions, CAPACITY_ENV_VAR, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use units::{strip_units, verify_units, Dimension, Magnitude, Quantity, Unit};
pub use wrapper::{execute_finalize_on_fail, Finalize, Wrapper};

/// Get the crate version string (e.g., "0.1.0").
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
