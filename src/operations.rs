//! Wrapper around the native `Operator`.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::ffi::{OperatorArgs, OperatorIndex, OperatorRegistry};
use crate::units::{strip_units, verify_units, Quantity, Unit};
use crate::wrapper::{Finalize, Wrapper};

const WEIGHT_UNIT: Unit = Unit::DIMENSIONLESS;
const VECTOR_UNIT: Unit = Unit::DIMENSIONLESS;
const VEC_PROD_SUM_UNIT: Unit = Unit::DIMENSIONLESS;

/// An example of another derived type: a weight applied to vector products.
pub struct Operator {
    inner: Wrapper<OperatorRegistry>,
}

impl Operator {
    /// Allocate a new instance without building it.
    pub fn from_new_connection(registry: &Arc<OperatorRegistry>) -> Result<Self> {
        Wrapper::from_new_connection(registry).map(|inner| Self { inner })
    }

    /// Allocate and build a new instance with a dimensionless `weight`.
    pub fn from_build_args(registry: &Arc<OperatorRegistry>, weight: Quantity) -> Result<Self> {
        let [weight] = strip_units([WEIGHT_UNIT], [weight])?;
        Wrapper::from_build_args(registry, OperatorArgs { weight }).map(|inner| Self { inner })
    }

    /// The current model index; the sentinel once finalized.
    pub fn model_index(&self) -> OperatorIndex {
        self.inner.model_index()
    }

    /// Weight to apply to operations.
    pub fn weight(&self) -> Result<Quantity> {
        self.inner
            .call(|r, h| r.get_weight(h))
            .map(|v| Quantity::with_unit(v, WEIGHT_UNIT))
    }

    /// Set `weight`, which must be dimensionless.
    pub fn set_weight(&self, weight: Quantity) -> Result<()> {
        let handle = self.inner.check_initialised()?;
        let [weight] = strip_units([WEIGHT_UNIT], [weight])?;
        self.inner.registry().set_weight(handle, weight)
    }

    /// Multiply `a` and `b` element-wise, sum, and scale by `weight`.
    pub fn calc_vec_prod_sum(
        &self,
        a: Quantity<[f64; 3]>,
        b: Quantity<[f64; 3]>,
    ) -> Result<Quantity> {
        let handle = self.inner.check_initialised()?;
        verify_units(
            [VECTOR_UNIT, VECTOR_UNIT],
            VEC_PROD_SUM_UNIT,
            [a, b],
            |[a, b]| self.inner.registry().calc_vec_prod_sum(handle, a, b),
        )
    }

    /// Release the native instance.
    pub fn finalize(&mut self) -> Result<()> {
        self.inner.finalize()
    }
}

impl Finalize for Operator {
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

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weight: &dyn Fn() -> Result<String> = &|| self.weight().map(|q| q.to_string());
        self.inner.fmt_fields(f, &[("weight", weight)])
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

/// Scoped [`Operator`], finalized on drop.
pub type OperatorContext = Context<Operator>;

impl Context<Operator> {
    /// Guarded counterpart of [`Operator::from_new_connection`].
    pub fn from_new_connection(registry: &Arc<OperatorRegistry>) -> Result<Self> {
        Operator::from_new_connection(registry).map(Context::new)
    }

    /// Guarded counterpart of [`Operator::from_build_args`].
    pub fn from_build_args(registry: &Arc<OperatorRegistry>, weight: Quantity) -> Result<Self> {
        Operator::from_build_args(registry, weight).map(Context::new)
    }
}
