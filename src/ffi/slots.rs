//! Fixed-capacity instance table shared by every native derived type.
//!
//! Slot `i` is addressed by model index `i`. A slot is either free (`None`)
//! or occupied by native state, which starts out as `T::default()` (all
//! fields unset) until the instance is built.

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::error::NativeError;
use super::handles::INVALID_MODEL_INDEX;

pub struct SlotTable<T> {
    type_name: &'static str,
    slots: Mutex<Vec<Option<T>>>,
}

impl<T: Default> SlotTable<T> {
    pub fn new(type_name: &'static str, capacity: usize) -> Self {
        // Model indices are i32 on the native side.
        let capacity = capacity.min(i32::MAX as usize);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            type_name,
            slots: Mutex::new(slots),
        }
    }

    /// Occupy the lowest free slot, or return `INVALID_MODEL_INDEX` when full.
    pub fn acquire(&self) -> i32 {
        let mut slots = self.slots.lock();
        match slots.iter().position(Option::is_none) {
            Some(i) => {
                slots[i] = Some(T::default());
                debug!(target: "fgen_example", type_name = self.type_name, index = i, "instance acquired");
                i as i32
            }
            None => {
                warn!(
                    target: "fgen_example",
                    type_name = self.type_name,
                    capacity = slots.len(),
                    "no free instance slot"
                );
                INVALID_MODEL_INDEX
            }
        }
    }

    /// Free an occupied slot. Free or out-of-range indices are rejected
    /// without touching the table.
    pub fn release(&self, index: i32) -> Result<(), NativeError> {
        let mut slots = self.slots.lock();
        let slot = slot_mut(&mut slots, index)?;
        *slot = None;
        debug!(target: "fgen_example", type_name = self.type_name, index, "instance released");
        Ok(())
    }

    /// Read the state of an occupied slot.
    pub fn with<R>(
        &self,
        index: i32,
        f: impl FnOnce(&T) -> Result<R, NativeError>,
    ) -> Result<R, NativeError> {
        let slots = self.slots.lock();
        let state = usize::try_from(index)
            .ok()
            .and_then(|i| slots.get(i))
            .and_then(Option::as_ref)
            .ok_or_else(|| NativeError::unknown_index(index))?;
        f(state)
    }

    /// Mutate the state of an occupied slot.
    pub fn with_mut<R>(
        &self,
        index: i32,
        f: impl FnOnce(&mut T) -> Result<R, NativeError>,
    ) -> Result<R, NativeError> {
        let mut slots = self.slots.lock();
        let slot = slot_mut(&mut slots, index)?;
        match slot.as_mut() {
            Some(state) => f(state),
            None => Err(NativeError::unknown_index(index)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn n_free(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.is_none()).count()
    }

    pub fn n_occupied(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.is_some()).count()
    }
}

fn slot_mut<T>(slots: &mut [Option<T>], index: i32) -> Result<&mut Option<T>, NativeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| slots.get_mut(i))
        .filter(|slot| slot.is_some())
        .ok_or_else(|| NativeError::unknown_index(index))
}

impl<T> Drop for SlotTable<T> {
    fn drop(&mut self) {
        let live = self.slots.get_mut().iter().filter(|s| s.is_some()).count();
        if live > 0 {
            warn!(
                target: "fgen_example",
                type_name = self.type_name,
                live,
                "registry dropped with instances that were never finalized"
            );
        }
    }
}
