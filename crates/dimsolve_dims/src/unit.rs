//! The `Unit` type: a scale factor attached to a [`Dimension`].

use crate::dimension::Dimension;
use std::ops::Mul;

/// A unit of measure: a real-valued scale factor and the dimension it measures.
///
/// The seven base units (`m, kg, s, A, K, mol, cd`) each have scale `1` and a
/// one-hot dimension; every other unit is built from these by the unit
/// resolver evaluating a `UnitExpression`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub scale: f64,
    pub dim: Dimension,
}

impl Unit {
    pub fn new(scale: f64, dim: Dimension) -> Self {
        Unit { scale, dim }
    }

    pub fn dimensionless() -> Self {
        Unit::new(1.0, Dimension::dimensionless())
    }
    pub fn m() -> Self {
        Unit::new(1.0, Dimension::l())
    }
    pub fn kg() -> Self {
        Unit::new(1.0, Dimension::m())
    }
    pub fn s() -> Self {
        Unit::new(1.0, Dimension::t())
    }
    pub fn a() -> Self {
        Unit::new(1.0, Dimension::i())
    }
    pub fn k() -> Self {
        Unit::new(1.0, Dimension::k())
    }
    pub fn mol() -> Self {
        Unit::new(1.0, Dimension::n())
    }
    pub fn cd() -> Self {
        Unit::new(1.0, Dimension::j())
    }

    /// Raises the unit to an integer power: scale and dimension both follow `pow`.
    pub fn pow(self, exp: i32) -> Self {
        Unit::new(self.scale.powi(exp), self.dim.pow(exp))
    }
}

impl Mul for Unit {
    type Output = Unit;
    fn mul(self, rhs: Unit) -> Unit {
        Unit::new(self.scale * rhs.scale, self.dim * rhs.dim)
    }
}
