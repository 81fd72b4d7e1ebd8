//! Handle wrappers and the two-phase construction protocol.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ffi::RawHandle;
use crate::registry::InstanceRegistry;

/// Placeholder rendered in place of a field that could not be read.
const UNSET_FIELD: &str = "could not be retrieved, perhaps it is unset?";

/// Something owning a native instance that must be released explicitly.
pub trait Finalize {
    /// Name of the wrapped derived type.
    fn type_name(&self) -> &'static str;

    /// Whether a handle is still attached.
    fn is_initialised(&self) -> bool;

    /// Release the native instance.
    ///
    /// Fails with [`Error::UninitializedAccess`] if it was already released.
    fn finalize(&mut self) -> Result<()>;
}

/// Owner of a single handle into an [`InstanceRegistry`].
///
/// Every accessor checks the handle against the sentinel before touching the
/// registry, so a finalized wrapper fails with
/// [`Error::UninitializedAccess`] instead of reaching native code with a
/// stale index. Nothing is cached: every read goes to the registry.
///
/// The wrapper does not release its instance on drop. Call
/// [`finalize`](Wrapper::finalize) or hold it in a
/// [`Context`](crate::Context).
pub struct Wrapper<R: InstanceRegistry> {
    registry: Arc<R>,
    handle: R::Handle,
}

impl<R: InstanceRegistry> Wrapper<R> {
    /// Allocate a new instance without initializing its native state.
    pub fn from_new_connection(registry: &Arc<R>) -> Result<Self> {
        let handle = registry.acquire();
        if !handle.is_valid() {
            return Err(Error::AllocationExhausted {
                type_name: R::TYPE_NAME,
                capacity: registry.capacity(),
            });
        }

        Ok(Self {
            registry: Arc::clone(registry),
            handle,
        })
    }

    /// Allocate and initialize a new instance.
    ///
    /// If initialization fails the freshly allocated handle is released
    /// before the error is returned, so a failed build never leaks a slot.
    pub fn from_build_args(registry: &Arc<R>, args: R::BuildArgs) -> Result<Self> {
        let mut out = Self::from_new_connection(registry)?;
        let handle = out.handle;

        execute_finalize_on_fail(&mut out, |w| w.registry.build(handle, args))?;

        debug!(target: "fgen_example", type_name = R::TYPE_NAME, index = handle.raw(), "instance built");
        Ok(out)
    }

    /// The current handle; the sentinel once finalized.
    pub fn model_index(&self) -> R::Handle {
        self.handle
    }

    /// The registry this wrapper points into.
    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Return the handle, or fail if it is the sentinel.
    pub fn check_initialised(&self) -> Result<R::Handle> {
        if self.handle.is_valid() {
            Ok(self.handle)
        } else {
            Err(Error::UninitializedAccess {
                type_name: R::TYPE_NAME,
            })
        }
    }

    /// Guarded delegation: run `f` against the registry with this wrapper's
    /// handle.
    pub fn call<T>(&self, f: impl FnOnce(&R, R::Handle) -> Result<T>) -> Result<T> {
        let handle = self.check_initialised()?;
        f(&self.registry, handle)
    }

    /// Release the instance and detach the handle.
    ///
    /// The handle is set to the sentinel even if the registry reports an
    /// error, so a second call always fails with
    /// [`Error::UninitializedAccess`] and never releases twice.
    pub fn finalize(&mut self) -> Result<()> {
        let handle = self.check_initialised()?;
        self.handle = R::Handle::invalid();
        self.registry.release(handle)?;
        debug!(target: "fgen_example", type_name = R::TYPE_NAME, index = handle.raw(), "instance finalized");
        Ok(())
    }

    /// Render `Type(model_index=N, field=value, ...)`.
    ///
    /// Fields are read lazily through `fields`; a failed read is replaced by
    /// a placeholder. A finalized wrapper renders without touching any field.
    pub fn fmt_fields(
        &self,
        f: &mut fmt::Formatter<'_>,
        fields: &[(&str, &dyn Fn() -> Result<String>)],
    ) -> fmt::Result {
        if !self.handle.is_valid() {
            return write!(f, "Uninitialised {}(model_index={})", R::TYPE_NAME, self.handle);
        }

        write!(f, "{}(model_index={}", R::TYPE_NAME, self.handle)?;
        for (name, read) in fields {
            match read() {
                Ok(value) => write!(f, ", {name}={value}")?,
                Err(e) => {
                    debug!(target: "fgen_example", field = *name, error = %e, "field read failed while rendering");
                    write!(f, ", {name} {UNSET_FIELD}")?;
                }
            }
        }
        write!(f, ")")
    }
}

impl<R: InstanceRegistry> Finalize for Wrapper<R> {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn is_initialised(&self) -> bool {
        self.handle.is_valid()
    }

    fn finalize(&mut self) -> Result<()> {
        Wrapper::finalize(self)
    }
}

impl<R: InstanceRegistry> fmt::Debug for Wrapper<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(R::TYPE_NAME)
            .field("model_index", &self.handle)
            .finish()
    }
}

impl<R: InstanceRegistry> fmt::Display for Wrapper<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_fields(f, &[])
    }
}

impl<R: InstanceRegistry> Drop for Wrapper<R> {
    fn drop(&mut self) {
        if self.handle.is_valid() {
            warn!(
                target: "fgen_example",
                type_name = R::TYPE_NAME,
                index = self.handle.raw(),
                "wrapper dropped without finalize; slot stays occupied"
            );
        }
    }
}

/// Run `f` on `target`, finalizing `target` if `f` fails.
///
/// The error from `f` is returned inside [`Error::ConstructionFailed`]. A
/// failure of the rollback itself is logged and attached as `rollback`; it
/// never replaces the error from `f`.
pub fn execute_finalize_on_fail<T, O, F>(target: &mut T, f: F) -> Result<O>
where
    T: Finalize,
    F: FnOnce(&mut T) -> Result<O>,
{
    match f(target) {
        Ok(out) => Ok(out),
        Err(cause) => {
            let type_name = target.type_name();
            debug!(target: "fgen_example", type_name, error = %cause, "build failed, rolling back");

            let rollback = match target.finalize() {
                Ok(()) => None,
                Err(e) => {
                    warn!(target: "fgen_example", type_name, error = %e, "rollback finalize failed");
                    Some(Box::new(e))
                }
            };

            Err(Error::ConstructionFailed {
                type_name,
                source: Box::new(cause),
                rollback,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ffi::{DerivedTypeArgs, DerivedTypeIndex, DerivedTypeRegistry};

    fn registry(capacity: usize) -> Arc<DerivedTypeRegistry> {
        Arc::new(DerivedTypeRegistry::with_capacity(capacity))
    }

    #[test]
    fn test_new_connection_exhaustion() {
        let reg = registry(1);
        let mut first = Wrapper::from_new_connection(&reg).unwrap();
        assert!(first.model_index().is_valid());

        let err = Wrapper::from_new_connection(&reg).unwrap_err();
        assert!(err.is_allocation_exhausted());

        let h = first.model_index();
        first.finalize().unwrap();
        let mut third = Wrapper::from_new_connection(&reg).unwrap();
        assert_eq!(third.model_index(), h);
        third.finalize().unwrap();
    }

    #[test]
    fn test_finalize_twice() {
        let reg = registry(2);
        let mut w = Wrapper::from_new_connection(&reg).unwrap();
        w.finalize().unwrap();
        assert!(!w.is_initialised());
        assert!(w.finalize().unwrap_err().is_uninitialized_access());
        assert!(w
            .call(|r, h| r.get_base(h))
            .unwrap_err()
            .is_uninitialized_access());
        assert_eq!(reg.n_free(), 2);
    }

    #[test]
    fn test_build_failure_rolls_back() {
        let reg = registry(2);
        let err = Wrapper::from_build_args(&reg, DerivedTypeArgs { base: f64::NAN }).unwrap_err();
        match err {
            Error::ConstructionFailed {
                type_name,
                source,
                rollback,
            } => {
                assert_eq!(type_name, "DerivedType");
                assert!(matches!(*source, Error::InvalidArgument(_)));
                assert!(rollback.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(reg.n_free(), 2);
    }

    struct FailingRelease {
        initialised: bool,
    }

    impl Finalize for FailingRelease {
        fn type_name(&self) -> &'static str {
            "FailingRelease"
        }

        fn is_initialised(&self) -> bool {
            self.initialised
        }

        fn finalize(&mut self) -> Result<()> {
            self.initialised = false;
            Err(Error::InvalidHandle {
                type_name: "FailingRelease",
                index: 0,
            })
        }
    }

    #[test]
    fn test_rollback_failure_does_not_mask_cause() {
        let mut target = FailingRelease { initialised: true };
        let err = execute_finalize_on_fail(&mut target, |_| -> Result<()> {
            Err(Error::InvalidArgument("bad input".into()))
        })
        .unwrap_err();

        match err {
            Error::ConstructionFailed {
                source, rollback, ..
            } => {
                assert!(matches!(*source, Error::InvalidArgument(_)));
                assert!(matches!(
                    rollback.as_deref(),
                    Some(Error::InvalidHandle { .. })
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!target.initialised);
    }

    #[test]
    fn test_success_does_not_finalize() {
        let mut target = FailingRelease { initialised: true };
        let out = execute_finalize_on_fail(&mut target, |_| Ok(42)).unwrap();
        assert_eq!(out, 42);
        assert!(target.initialised);
    }

    /// Registry whose `release` always fails; `build(false)` fails too.
    #[derive(Default)]
    struct BrokenRelease {
        releases: AtomicUsize,
    }

    impl InstanceRegistry for BrokenRelease {
        const TYPE_NAME: &'static str = "BrokenRelease";
        type Handle = DerivedTypeIndex;
        type BuildArgs = bool;

        fn acquire(&self) -> DerivedTypeIndex {
            DerivedTypeIndex::from_raw(0)
        }

        fn release(&self, handle: DerivedTypeIndex) -> Result<()> {
            self.releases.fetch_add(1, Ordering::SeqCst);
            Err(Error::InvalidHandle {
                type_name: Self::TYPE_NAME,
                index: handle.raw(),
            })
        }

        fn build(&self, _handle: DerivedTypeIndex, ok: bool) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidArgument("build rejected".into()))
            }
        }

        fn capacity(&self) -> usize {
            1
        }

        fn n_free(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_failed_release_still_detaches() {
        let reg = Arc::new(BrokenRelease::default());
        let mut w = Wrapper::from_build_args(&reg, true).unwrap();

        let err = w.finalize().unwrap_err();
        assert!(matches!(err, Error::InvalidHandle { index: 0, .. }));
        assert!(!w.is_initialised());
        assert_eq!(reg.releases.load(Ordering::SeqCst), 1);

        assert!(w.finalize().unwrap_err().is_uninitialized_access());
        assert_eq!(reg.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_build_failure_with_failed_rollback() {
        let reg = Arc::new(BrokenRelease::default());
        let err = Wrapper::from_build_args(&reg, false).unwrap_err();
        match err {
            Error::ConstructionFailed {
                type_name,
                source,
                rollback,
            } => {
                assert_eq!(type_name, "BrokenRelease");
                assert!(matches!(*source, Error::InvalidArgument(ref m) if m == "build rejected"));
                assert!(matches!(
                    rollback.as_deref(),
                    Some(Error::InvalidHandle { .. })
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(reg.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_display_uninitialised() {
        let reg = registry(1);
        let mut w = Wrapper::from_new_connection(&reg).unwrap();
        assert_eq!(w.to_string(), "DerivedType(model_index=0)");
        w.finalize().unwrap();
        assert_eq!(w.to_string(), "Uninitialised DerivedType(model_index=-1)");
    }
}
