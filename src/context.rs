//! Scoped ownership of wrapped instances.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::error::Result;
use crate::wrapper::Finalize;

/// Finalizes the held value when dropped.
///
/// Release happens exactly once: either through [`Context::finalize`], which
/// consumes the guard, or on drop. Dropping covers normal scope exit, early
/// return through `?` and panic unwinding alike.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use fgen_example::{DerivedTypeContext, DerivedTypeRegistry, InstanceRegistry, Quantity};
///
/// let registry = Arc::new(DerivedTypeRegistry::with_capacity(4));
/// {
///     let dt = DerivedTypeContext::from_build_args(&registry, Quantity::new(2.0, "m")?)?;
///     assert_eq!(dt.double()?.magnitude(), 4.0);
/// }
/// assert_eq!(registry.n_free(), 4);
/// # Ok::<(), fgen_example::Error>(())
/// ```
pub struct Context<T: Finalize> {
    inner: T,
}

impl<T: Finalize> Context<T> {
    /// Take ownership of `inner`.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Release now and report any error, instead of waiting for drop.
    pub fn finalize(mut self) -> Result<()> {
        // Drop sees the released handle and does nothing.
        self.inner.finalize()
    }

    /// Run `f` with `inner`, releasing it afterwards whatever `f` returns.
    pub fn scope<O>(inner: T, f: impl FnOnce(&mut T) -> O) -> O {
        let mut guard = Self::new(inner);
        f(&mut guard)
    }
}

impl<T: Finalize> Deref for Context<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Finalize> DerefMut for Context<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Finalize + fmt::Display> fmt::Display for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<T: Finalize + fmt::Debug> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Context").field(&self.inner).finish()
    }
}

impl<T: Finalize> Drop for Context<T> {
    fn drop(&mut self) {
        if self.inner.is_initialised() {
            // Ignore errors on drop
            if let Err(e) = self.inner.finalize() {
                warn!(
                    target: "fgen_example",
                    type_name = self.inner.type_name(),
                    error = %e,
                    "finalize on scope exit failed"
                );
            }
        }
    }
}
