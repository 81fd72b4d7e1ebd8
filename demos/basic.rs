//! Basic demonstration of the wrapped derived types.
//!
//! Run with: cargo run --example basic
//! Set RUST_LOG=fgen_example=debug to watch instances being acquired and released.

use std::sync::Arc;

use fgen_example::{
    DerivedType, DerivedTypeRegistry, InstanceRegistry, OperatorContext, OperatorRegistry,
    Quantity, RegistryOptions,
};
use tracing_subscriber::EnvFilter;

fn main() -> fgen_example::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("You are using fgen_example version {}", fgen_example::version());

    let options = RegistryOptions::from_env()?;
    println!("Registry capacity: {}", options.capacity);

    let derived = Arc::new(DerivedTypeRegistry::new(options));
    let operators = Arc::new(OperatorRegistry::new(options));

    println!("\n--- DerivedType ---");
    let mut dt = DerivedType::from_build_args(&derived, Quantity::new(2.0, "m")?)?;
    println!("{dt}");
    println!("base: {}", dt.base()?);
    println!("base + 3 cm: {}", dt.add(Quantity::new(3.0, "cm")?)?);
    println!("2 * base: {}", dt.double()?);

    // Incompatible units are rejected before reaching the native layer
    match dt.add(Quantity::new(3.0, "1")?) {
        Ok(out) => println!("unexpected result: {out}"),
        Err(e) => println!("add(3 dimensionless) failed: {e}"),
    }

    dt.finalize()?;
    println!("after finalize: {dt}");
    if let Err(e) = dt.base() {
        println!("base after finalize: {e}");
    }

    println!("\n--- Operator (scoped) ---");
    {
        let op = OperatorContext::from_build_args(&operators, Quantity::new(2.0, "1")?)?;
        println!("{op}");
        let a = Quantity::new([1.0, 2.0, 3.0], "1")?;
        let b = Quantity::new([3.0, 2.0, 1.0], "1")?;
        println!("calc_vec_prod_sum({a}, {b}) = {}", op.calc_vec_prod_sum(a, b)?);
    }
    println!(
        "free operator slots after scope: {}/{}",
        operators.n_free(),
        operators.capacity()
    );

    println!("\n--- Failed build ---");
    match DerivedType::from_build_args(&derived, Quantity::new(f64::NAN, "m")?) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("build failed: {e}"),
    }
    println!(
        "free derived-type slots: {}/{}",
        derived.n_free(),
        derived.capacity()
    );

    Ok(())
}
