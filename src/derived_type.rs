//! Wrapper around the native `DerivedType`.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::ffi::{DerivedTypeArgs, DerivedTypeIndex, DerivedTypeRegistry};
use crate::units::{strip_units, verify_units, Quantity, Unit};
use crate::wrapper::{Finalize, Wrapper};

const BASE_UNIT: Unit = Unit::METRE;
const OTHER_UNIT: Unit = Unit::METRE;
const OUTPUT_UNIT: Unit = Unit::METRE;

/// An example of a derived type: a length `base` plus arithmetic on it.
///
/// The caller owns the native instance and must release it with
/// [`finalize`](DerivedType::finalize), or use [`DerivedTypeContext`] to
/// release it on scope exit.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use fgen_example::{DerivedType, DerivedTypeRegistry, Quantity};
///
/// let registry = Arc::new(DerivedTypeRegistry::default());
/// let mut dt = DerivedType::from_build_args(&registry, Quantity::new(2.0, "m")?)?;
///
/// let sum = dt.add(Quantity::new(3.0, "m")?)?;
/// assert_eq!(sum.magnitude(), 5.0);
///
/// dt.finalize()?;
/// assert!(dt.base().is_err());
/// # Ok::<(), fgen_example::Error>(())
/// ```
pub struct DerivedType {
    inner: Wrapper<DerivedTypeRegistry>,
}

impl DerivedType {
    /// Allocate a new instance without building it.
    ///
    /// Fields read as unset until they are assigned.
    pub fn from_new_connection(registry: &Arc<DerivedTypeRegistry>) -> Result<Self> {
        Wrapper::from_new_connection(registry).map(|inner| Self { inner })
    }

    /// Allocate and build a new instance.
    ///
    /// `base` must be a length. On a failed build the allocated instance is
    /// released before the error is returned.
    pub fn from_build_args(registry: &Arc<DerivedTypeRegistry>, base: Quantity) -> Result<Self> {
        let [base] = strip_units([BASE_UNIT], [base])?;
        Wrapper::from_build_args(registry, DerivedTypeArgs { base }).map(|inner| Self { inner })
    }

    /// The current model index; the sentinel once finalized.
    pub fn model_index(&self) -> DerivedTypeIndex {
        self.inner.model_index()
    }

    /// Base value.
    pub fn base(&self) -> Result<Quantity> {
        self.inner
            .call(|r, h| r.get_base(h))
            .map(|v| Quantity::with_unit(v, BASE_UNIT))
    }

    /// Set `base`, converting it to metres.
    pub fn set_base(&self, base: Quantity) -> Result<()> {
        let handle = self.inner.check_initialised()?;
        let [base] = strip_units([BASE_UNIT], [base])?;
        self.inner.registry().set_base(handle, base)
    }

    /// Add another value to `base`.
    pub fn add(&self, other: Quantity) -> Result<Quantity> {
        let handle = self.inner.check_initialised()?;
        verify_units([OTHER_UNIT], OUTPUT_UNIT, [other], |[other]| {
            self.inner.registry().add(handle, other)
        })
    }

    /// Double `base`.
    pub fn double(&self) -> Result<Quantity> {
        self.inner
            .call(|r, h| r.double(h))
            .map(|v| Quantity::with_unit(v, OUTPUT_UNIT))
    }

    /// Release the native instance.
    pub fn finalize(&mut self) -> Result<()> {
        self.inner.finalize()
    }
}

impl Finalize for DerivedType {
    fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    fn is_initialised(&self) -> bool {
        self.inner.is_initialised()
    }

    fn finalize(&mut self) -> Result<()> {
        self.inner.finalize()
    }
}

impl fmt::Display for DerivedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base: &dyn Fn() -> Result<String> = &|| self.base().map(|q| q.to_string());
        self.inner.fmt_fields(f, &[("base", base)])
    }
}

impl fmt::Debug for DerivedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

/// Scoped [`DerivedType`], finalized on drop.
pub type DerivedTypeContext = Context<DerivedType>;

impl Context<DerivedType> {
    /// Guarded counterpart of [`DerivedType::from_new_connection`].
    pub fn from_new_connection(registry: &Arc<DerivedTypeRegistry>) -> Result<Self> {
        DerivedType::from_new_connection(registry).map(Context::new)
    }

    /// Guarded counterpart of [`DerivedType::from_build_args`].
    pub fn from_build_args(registry: &Arc<DerivedTypeRegistry>, base: Quantity) -> Result<Self> {
        DerivedType::from_build_args(registry, base).map(Context::new)
    }
}
