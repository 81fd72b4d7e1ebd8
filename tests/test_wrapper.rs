//! Wrapper usage tests.
//!
//! These exercise the typed wrappers the way a caller would: quantities in,
//! quantities out.

use std::sync::Arc;

use approx::assert_relative_eq;
use fgen_example::{
    DerivedType, DerivedTypeRegistry, InstanceRegistry, OperatorContext, OperatorRegistry,
    Quantity, Unit, DEFAULT_CAPACITY,
};

fn q(magnitude: f64, unit: &str) -> Quantity {
    Quantity::new(magnitude, unit).expect("known unit")
}

#[test]
fn test_add() {
    let registry = Arc::new(DerivedTypeRegistry::default());
    let mut dt = DerivedType::from_build_args(&registry, q(2.0, "m")).expect("build should succeed");

    let out = dt.add(q(3.0, "m")).expect("add should succeed");
    assert_eq!(out.unit(), Unit::METRE);
    assert_relative_eq!(out.magnitude(), 5.0);

    let out = dt.add(q(3.0, "mm")).expect("add should succeed");
    assert_relative_eq!(out.magnitude(), 2.003);

    dt.finalize().expect("finalize should succeed");
}

#[test]
fn test_double() {
    let registry = Arc::new(DerivedTypeRegistry::default());
    let mut dt = DerivedType::from_build_args(&registry, q(2.0, "m")).expect("build should succeed");

    let out = dt.double().expect("double should succeed");
    assert_eq!(out, q(4.0, "m"));

    dt.finalize().expect("finalize should succeed");
}

#[test]
fn test_base_in_other_units() {
    let registry = Arc::new(DerivedTypeRegistry::default());
    let mut dt = DerivedType::from_build_args(&registry, q(250.0, "cm")).expect("build should succeed");

    let base = dt.base().expect("base should be set");
    assert_eq!(base.unit(), Unit::METRE);
    assert_relative_eq!(base.magnitude(), 2.5);

    dt.finalize().expect("finalize should succeed");
}

#[test]
fn test_calc_vec_prod_sum() {
    let registry = Arc::new(OperatorRegistry::default());
    {
        let operator = OperatorContext::from_build_args(&registry, q(2.0, "1"))
            .expect("build should succeed");

        let a = Quantity::new([1.0, 2.0, 3.0], "1").expect("known unit");
        let b = Quantity::new([3.0, 2.0, 1.0], "1").expect("known unit");
        let out = operator.calc_vec_prod_sum(a, b).expect("calc should succeed");

        assert_eq!(out.unit(), Unit::DIMENSIONLESS);
        assert_relative_eq!(out.magnitude(), 20.0);
    }
    assert_eq!(registry.n_free(), DEFAULT_CAPACITY);
}
