//! Unit verification for wrapped calls.
//!
//! Native routines work on bare numbers. Wrappers take and return
//! [`Quantity`] values and use [`strip_units`] / [`verify_units`] to convert
//! arguments into the units the native side expects and to tag results with
//! their output unit. Only linear units sharing a dimension are convertible.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Physical dimension of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Length,
    Dimensionless,
}

/// A unit of measure: a dimension and a scale relative to its base unit.
#[derive(Debug, Clone, Copy)]
pub struct Unit {
    symbol: &'static str,
    dimension: Dimension,
    scale: f64,
}

impl Unit {
    pub const METRE: Unit = Unit::base("m", Dimension::Length);
    pub const DIMENSIONLESS: Unit = Unit::base("dimensionless", Dimension::Dimensionless);

    const fn base(symbol: &'static str, dimension: Dimension) -> Self {
        Self {
            symbol,
            dimension,
            scale: 1.0,
        }
    }

    const fn scaled(symbol: &'static str, dimension: Dimension, scale: f64) -> Self {
        Self {
            symbol,
            dimension,
            scale,
        }
    }

    /// Look up a unit by symbol.
    pub fn parse(symbol: &str) -> Result<Self> {
        KNOWN_UNITS
            .iter()
            .find(|u| u.symbol == symbol.trim())
            .copied()
            .ok_or_else(|| Error::UnknownUnit(symbol.to_string()))
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Factor that converts a magnitude in `self` into one in `to`.
    pub fn conversion_factor(&self, to: Unit) -> Result<f64> {
        if self.dimension != to.dimension {
            return Err(Error::IncompatibleUnits {
                from: self.symbol.to_string(),
                to: to.symbol.to_string(),
            });
        }
        Ok(self.scale / to.scale)
    }
}

const KNOWN_UNITS: &[Unit] = &[
    Unit::METRE,
    Unit::scaled("km", Dimension::Length, 1e3),
    Unit::scaled("cm", Dimension::Length, 1e-2),
    Unit::scaled("mm", Dimension::Length, 1e-3),
    Unit::DIMENSIONLESS,
    Unit::base("1", Dimension::Dimensionless),
];

// Aliases ("1" / "dimensionless") compare equal.
impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.scale == other.scale
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Unit::parse(s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

/// Numeric payload of a [`Quantity`].
pub trait Magnitude: Copy {
    fn scaled(self, factor: f64) -> Self;
}

impl Magnitude for f64 {
    fn scaled(self, factor: f64) -> Self {
        self * factor
    }
}

impl<const N: usize> Magnitude for [f64; N] {
    fn scaled(self, factor: f64) -> Self {
        self.map(|x| x * factor)
    }
}

/// A magnitude tagged with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity<M = f64> {
    magnitude: M,
    unit: Unit,
}

impl<M: Magnitude> Quantity<M> {
    /// Create a quantity from a unit symbol such as `"m"` or `"mm"`.
    pub fn new(magnitude: M, symbol: &str) -> Result<Self> {
        Ok(Self::with_unit(magnitude, Unit::parse(symbol)?))
    }

    pub fn with_unit(magnitude: M, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    pub fn magnitude(&self) -> M {
        self.magnitude
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Convert to `unit`.
    pub fn to(&self, unit: Unit) -> Result<Self> {
        Ok(Self::with_unit(self.magnitude_in(unit)?, unit))
    }

    /// The magnitude expressed in `unit`.
    pub fn magnitude_in(&self, unit: Unit) -> Result<M> {
        let factor = self.unit.conversion_factor(unit)?;
        Ok(self.magnitude.scaled(factor))
    }
}

impl fmt::Display for Quantity<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

impl<const N: usize> fmt::Display for Quantity<[f64; N]> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.magnitude, self.unit)
    }
}

/// Convert each argument into its expected unit and drop the units.
///
/// Every argument is checked before any is converted, so either all
/// conversions succeed or an error is returned.
pub fn strip_units<M: Magnitude, const N: usize>(
    expected: [Unit; N],
    args: [Quantity<M>; N],
) -> Result<[M; N]> {
    let mut factors = [1.0; N];
    for (factor, (arg, unit)) in factors.iter_mut().zip(args.iter().zip(expected)) {
        *factor = arg.unit.conversion_factor(unit)?;
    }

    let mut factors = factors.into_iter();
    Ok(args.map(|arg| arg.magnitude.scaled(factors.next().unwrap_or(1.0))))
}

/// Wrap a unit-free call: strip `args` into the `expected` units, run
/// `call`, and tag its result with `output`.
pub fn verify_units<M, O, const N: usize>(
    expected: [Unit; N],
    output: Unit,
    args: [Quantity<M>; N],
    call: impl FnOnce([M; N]) -> Result<O>,
) -> Result<Quantity<O>>
where
    M: Magnitude,
    O: Magnitude,
{
    let stripped = strip_units(expected, args)?;
    call(stripped).map(|out| Quantity::with_unit(out, output))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_parse_known_and_unknown() {
        assert_eq!(Unit::parse("m").unwrap(), Unit::METRE);
        assert_eq!("1".parse::<Unit>().unwrap(), Unit::DIMENSIONLESS);
        assert!(matches!(Unit::parse("furlong"), Err(Error::UnknownUnit(_))));
    }

    #[test]
    fn test_conversion() {
        let q = Quantity::new(3.0, "mm").unwrap();
        assert_relative_eq!(q.magnitude_in(Unit::METRE).unwrap(), 0.003);

        let q = Quantity::new(2.5, "km").unwrap().to(Unit::METRE).unwrap();
        assert_relative_eq!(q.magnitude(), 2500.0);
        assert_eq!(q.to_string(), "2500 m");
    }

    #[test]
    fn test_incompatible_dimensions() {
        let q = Quantity::new(1.0, "m").unwrap();
        let err = q.magnitude_in(Unit::DIMENSIONLESS).unwrap_err();
        assert!(err.is_unit_error());
    }

    #[test]
    fn test_strip_vectors() {
        let a = Quantity::new([1.0, 2.0, 3.0], "cm").unwrap();
        let b = Quantity::new([4.0, 5.0, 6.0], "m").unwrap();
        let [a, b] = strip_units([Unit::METRE, Unit::METRE], [a, b]).unwrap();
        assert_relative_eq!(a[2], 0.03);
        assert_eq!(b, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_verify_units_skips_call_on_mismatch() {
        let mut called = false;
        let result = verify_units(
            [Unit::METRE],
            Unit::METRE,
            [Quantity::new(1.0, "1").unwrap()],
            |[x]| {
                called = true;
                Ok(x)
            },
        );
        assert!(result.is_err());
        assert!(!called);
    }

    #[test]
    fn test_verify_units_tags_output() {
        let out = verify_units(
            [Unit::METRE],
            Unit::METRE,
            [Quantity::new(50.0, "cm").unwrap()],
            |[x]| Ok(x * 2.0),
        )
        .unwrap();
        assert_relative_eq!(out.magnitude(), 1.0);
        assert_eq!(out.unit(), Unit::METRE);
    }
}
