//! Native instance registries.
//!
//! This module stands in for the compiled layer: per-type slot tables keyed
//! by integer model index, operating on plain numbers. Users should prefer
//! the safe wrappers in the parent modules.

pub mod derived_type;
pub mod error;
pub mod handles;
pub mod operations;
mod slots;

pub use derived_type::{DerivedTypeArgs, DerivedTypeRegistry};
pub use handles::*;
pub use operations::{OperatorArgs, OperatorRegistry};
