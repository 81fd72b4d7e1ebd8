//! Native side of the `DerivedType` derived type.
//!
//! Holds a scalar `base` and offers two pass-through arithmetic routines.
//! Values crossing this boundary carry no units.

use super::error::{check_native, NativeError};
use super::handles::{DerivedTypeIndex, RawHandle};
use super::slots::SlotTable;
use crate::error::Result;
use crate::registry::InstanceRegistry;
use crate::types::RegistryOptions;

#[derive(Debug, Default)]
struct DerivedTypeState {
    base: Option<f64>,
}

impl DerivedTypeState {
    fn base(&self) -> std::result::Result<f64, NativeError> {
        self.base.ok_or_else(|| NativeError::unset("base"))
    }
}

/// Field values for [`DerivedTypeRegistry::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedTypeArgs {
    pub base: f64,
}

/// Instance registry for `DerivedType`.
pub struct DerivedTypeRegistry {
    slots: SlotTable<DerivedTypeState>,
}

impl DerivedTypeRegistry {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            slots: SlotTable::new(Self::TYPE_NAME, options.capacity),
        }
    }

    /// Create a registry with room for `capacity` instances.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(RegistryOptions { capacity })
    }

    pub fn get_base(&self, handle: DerivedTypeIndex) -> Result<f64> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with(handle.raw(), DerivedTypeState::base),
        )
    }

    pub fn set_base(&self, handle: DerivedTypeIndex, base: f64) -> Result<()> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with_mut(handle.raw(), |s| {
                s.base = Some(finite("base", base)?);
                Ok(())
            }),
        )
    }

    /// `base + other`
    pub fn add(&self, handle: DerivedTypeIndex, other: f64) -> Result<f64> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with(handle.raw(), |s| Ok(s.base()? + other)),
        )
    }

    /// `2 * base`
    pub fn double(&self, handle: DerivedTypeIndex) -> Result<f64> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with(handle.raw(), |s| Ok(s.base()? * 2.0)),
        )
    }
}

impl Default for DerivedTypeRegistry {
    fn default() -> Self {
        Self::new(RegistryOptions::default())
    }
}

impl InstanceRegistry for DerivedTypeRegistry {
    const TYPE_NAME: &'static str = "DerivedType";

    type Handle = DerivedTypeIndex;
    type BuildArgs = DerivedTypeArgs;

    fn acquire(&self) -> DerivedTypeIndex {
        DerivedTypeIndex::from_raw(self.slots.acquire())
    }

    fn release(&self, handle: DerivedTypeIndex) -> Result<()> {
        check_native(Self::TYPE_NAME, self.slots.release(handle.raw()))
    }

    fn build(&self, handle: DerivedTypeIndex, args: DerivedTypeArgs) -> Result<()> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with_mut(handle.raw(), |s| {
                s.base = Some(finite("base", args.base)?);
                Ok(())
            }),
        )
    }

    fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    fn n_free(&self) -> usize {
        self.slots.n_free()
    }

    fn n_occupied(&self) -> usize {
        self.slots.n_occupied()
    }
}

pub(crate) fn finite(field: &str, value: f64) -> std::result::Result<f64, NativeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NativeError::invalid_argument(format!(
            "{field} must be finite, got {value}"
        )))
    }
}
