//! Native side of the `Operator` derived type.

use super::derived_type::finite;
use super::error::{check_native, NativeError};
use super::handles::{OperatorIndex, RawHandle};
use super::slots::SlotTable;
use crate::error::Result;
use crate::registry::InstanceRegistry;
use crate::types::RegistryOptions;

#[derive(Debug, Default)]
struct OperatorState {
    weight: Option<f64>,
}

/// Field values for [`OperatorRegistry::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorArgs {
    pub weight: f64,
}

/// Instance registry for `Operator`.
pub struct OperatorRegistry {
    slots: SlotTable<OperatorState>,
}

impl OperatorRegistry {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            slots: SlotTable::new(Self::TYPE_NAME, options.capacity),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(RegistryOptions { capacity })
    }

    pub fn get_weight(&self, handle: OperatorIndex) -> Result<f64> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with(handle.raw(), |s| {
                s.weight.ok_or_else(|| NativeError::unset("weight"))
            }),
        )
    }

    pub fn set_weight(&self, handle: OperatorIndex, weight: f64) -> Result<()> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with_mut(handle.raw(), |s| {
                s.weight = Some(finite("weight", weight)?);
                Ok(())
            }),
        )
    }

    /// Element-wise product of `a` and `b`, summed, times `weight`.
    pub fn calc_vec_prod_sum(
        &self,
        handle: OperatorIndex,
        a: [f64; 3],
        b: [f64; 3],
    ) -> Result<f64> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with(handle.raw(), |s| {
                let weight = s.weight.ok_or_else(|| NativeError::unset("weight"))?;
                let sum: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
                Ok(weight * sum)
            }),
        )
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new(RegistryOptions::default())
    }
}

impl InstanceRegistry for OperatorRegistry {
    const TYPE_NAME: &'static str = "Operator";

    type Handle = OperatorIndex;
    type BuildArgs = OperatorArgs;

    fn acquire(&self) -> OperatorIndex {
        OperatorIndex::from_raw(self.slots.acquire())
    }

    fn release(&self, handle: OperatorIndex) -> Result<()> {
        check_native(Self::TYPE_NAME, self.slots.release(handle.raw()))
    }

    fn build(&self, handle: OperatorIndex, args: OperatorArgs) -> Result<()> {
        check_native(
            Self::TYPE_NAME,
            self.slots.with_mut(handle.raw(), |s| {
                s.weight = Some(finite("weight", args.weight)?);
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
