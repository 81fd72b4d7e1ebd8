//! The contract between wrappers and a native instance registry.

use crate::error::Result;
use crate::ffi::RawHandle;

/// A fixed-capacity pool of native instances of one derived type.
///
/// Implementations serialize access internally, so a registry can be shared
/// between threads behind an `Arc`.
pub trait InstanceRegistry: Send + Sync {
    /// Name of the derived type, used in errors and diagnostics.
    const TYPE_NAME: &'static str;

    /// Handle type addressing instances in this registry.
    type Handle: RawHandle;

    /// Field values required to build an instance.
    type BuildArgs;

    /// Occupy a free slot. Returns the sentinel handle when the pool is
    /// exhausted.
    fn acquire(&self) -> Self::Handle;

    /// Return a slot to the free pool.
    ///
    /// Fails with [`Error::InvalidHandle`](crate::Error::InvalidHandle) for
    /// handles that are not currently occupied; the pool is left untouched.
    fn release(&self, handle: Self::Handle) -> Result<()>;

    /// Initialize the native state of an acquired instance.
    fn build(&self, handle: Self::Handle, args: Self::BuildArgs) -> Result<()>;

    /// Total number of slots.
    fn capacity(&self) -> usize;

    /// Number of free slots.
    fn n_free(&self) -> usize;

    /// Number of occupied slots.
    fn n_occupied(&self) -> usize {
        self.capacity() - self.n_free()
    }
}
