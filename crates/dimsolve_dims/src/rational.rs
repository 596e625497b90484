//! A reduced-fraction rational number, used for dimension exponents.
//!
//! Dimension exponents need not be integers — `root(n)` divides an exponent
//! by `n`, which can leave a fraction (e.g. `L^(1/2)` for a square root of
//! length). [`Rational`] keeps that fraction reduced by its GCD at every
//! step so equality stays a cheap structural comparison.

use std::fmt;
use std::ops::{Add, Sub};

/// A rational number stored as a reduced `(numerator, denominator)` pair.
///
/// A zero denominator is tolerated rather than rejected: it arises only
/// from degenerate exponent arithmetic (dividing an exponent by zero) and is
/// reduced to the same identity treatment as the ordinary zero value, so it
/// never causes a division panic here.
#[derive(Debug, Clone, Copy)]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    /// Constructs a rational from a numerator and denominator, reducing by
    /// their GCD. The sign of the denominator is folded into the numerator.
    pub fn new(num: i64, den: i64) -> Self {
        let g = Self::reduction_divisor(num, den);
        Rational {
            num: num / g,
            den: den / g,
        }
    }

    fn reduction_divisor(num: i64, den: i64) -> i64 {
        if den == 0 {
            if num == 0 {
                1
            } else {
                num
            }
        } else {
            gcd_signed(num, den)
        }
    }

    pub fn zero() -> Self {
        Rational { num: 0, den: 1 }
    }

    pub fn one() -> Self {
        Rational { num: 1, den: 1 }
    }

    pub fn from_int(n: i64) -> Self {
        Rational::new(n, 1)
    }

    /// Multiplies this rational by an integer (scales the numerator).
    pub fn mul_int(self, r: i64) -> Self {
        Rational::new(self.num * r, self.den)
    }

    /// Divides this rational by an integer (scales the denominator).
    pub fn div_int(self, r: i64) -> Self {
        Rational::new(self.num, self.den * r)
    }

    pub fn as_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

/// GCD of `a` and `b`, sign-adjusted so the result carries the sign of `b`
/// (mirroring the reduction rule: the stored denominator is always made
/// non-negative by folding its sign into the numerator).
fn gcd_signed(a: i64, b: i64) -> i64 {
    let sign = if b < 0 { -1 } else { 1 };
    let (mut a, mut b) = (a.abs(), b.abs());
    while a != 0 {
        let t = b % a;
        b = a;
        a = t;
    }
    b * sign
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.num * other.den == other.num * self.den
    }
}
impl Eq for Rational {}

impl Add for Rational {
    type Output = Rational;
    fn add(self, other: Rational) -> Rational {
        Rational::new(
            self.num * other.den + other.num * self.den,
            self.den * other.den,
        )
    }
}

impl Sub for Rational {
    type Output = Rational;
    fn sub(self, other: Rational) -> Rational {
        Rational::new(
            self.num * other.den - other.num * self.den,
            self.den * other.den,
        )
    }
}

impl fmt::Display for Rational {
    /// `n` when the denominator is `1` (or degenerately `0`), else `(n/d)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 0 || self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "({}/{})", self.num, self.den)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_on_construction() {
        let r = Rational::new(4, 8);
        assert_eq!(r, Rational::new(1, 2));
    }

    #[test]
    fn negative_denominator_folds_into_numerator() {
        let r = Rational::new(1, -2);
        assert_eq!(r, Rational::new(-1, 2));
    }

    #[test]
    fn add_combines_fractions() {
        let a = Rational::new(1, 2);
        let b = Rational::new(1, 3);
        assert_eq!(a + b, Rational::new(5, 6));
    }

    #[test]
    fn sub_combines_fractions() {
        let a = Rational::new(1, 2);
        let b = Rational::new(1, 3);
        assert_eq!(a - b, Rational::new(1, 6));
    }

    #[test]
    fn mul_int_scales_numerator() {
        let r = Rational::new(1, 2);
        assert_eq!(r.mul_int(3), Rational::new(3, 2));
    }

    #[test]
    fn div_int_scales_denominator() {
        let r = Rational::new(1, 2);
        assert_eq!(r.div_int(3), Rational::new(1, 6));
    }

    #[test]
    fn zero_denominator_from_div_by_zero_does_not_panic() {
        let r = Rational::one().div_int(0);
        assert_eq!(r, Rational::new(1, 0));
    }

    #[test]
    fn display_prints_integer_without_parens() {
        assert_eq!(Rational::from_int(-2).to_string(), "-2");
    }

    #[test]
    fn display_prints_fraction_with_parens() {
        assert_eq!(Rational::new(2, 3).to_string(), "(2/3)");
    }

    #[test]
    fn from_int_round_trips() {
        assert_eq!(Rational::from_int(5).as_f64(), 5.0);
    }
}
