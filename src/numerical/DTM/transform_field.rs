//! The number system a recurrence runs in. `f64` gives the numeric mode,
//! `RationalFunction` the exact symbolic mode in the unknown gamma.
use crate::numerical::DTM::dtm_errors::{DtmError, DtmResult};
use crate::symbolic::symbolic_rational::RationalFunction;
use num::bigint::BigInt;
use num::rational::BigRational;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

pub trait TransformField:
    Clone
    + fmt::Debug
    + fmt::Display
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// "numeric" or "symbolic", used in error reports
    const MODE: &'static str;

    /// exact conversion of a problem parameter
    fn from_f64(value: f64) -> DtmResult<Self>;

    fn from_usize(value: usize) -> Self;

    /// `None` when `rhs` is exactly zero
    fn checked_div(&self, rhs: &Self) -> Option<Self>;
}

impl TransformField for f64 {
    const MODE: &'static str = "numeric";

    fn from_f64(value: f64) -> DtmResult<Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DtmError::NonFiniteParameter(value))
        }
    }

    fn from_usize(value: usize) -> Self {
        value as f64
    }

    fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if *rhs == 0.0 { None } else { Some(self / rhs) }
    }
}

impl TransformField for RationalFunction {
    const MODE: &'static str = "symbolic";

    fn from_f64(value: f64) -> DtmResult<Self> {
        // every finite double is a dyadic rational, the conversion is exact
        BigRational::from_float(value)
            .map(RationalFunction::constant)
            .ok_or(DtmError::NonFiniteParameter(value))
    }

    fn from_usize(value: usize) -> Self {
        RationalFunction::constant(BigRational::from_integer(BigInt::from(value)))
    }

    fn checked_div(&self, rhs: &Self) -> Option<Self> {
        RationalFunction::checked_div(self, rhs)
    }
}

/// `t^n` by repeated multiplication
pub fn pow_field<F: TransformField>(t: &F, n: usize) -> F {
    (0..n).fold(F::one(), |acc, _| acc * t.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64_field() {
        assert_eq!(<f64 as TransformField>::checked_div(&1.0, &0.0), None);
        assert_eq!(<f64 as TransformField>::checked_div(&1.0, &4.0), Some(0.25));
        assert!(<f64 as TransformField>::from_f64(f64::NAN).is_err());
        assert_eq!(pow_field(&2.0f64, 10), 1024.0);
        assert_eq!(pow_field(&2.0f64, 0), 1.0);
    }

    #[test]
    fn test_rational_field_is_exact() {
        let a = RationalFunction::from_f64(0.1).unwrap();
        // 0.1 as a double is not 1/10
        assert_ne!(a, RationalFunction::from_integer(1).checked_div(&RationalFunction::from_integer(10)).unwrap());
        let b = RationalFunction::from_f64(1.75).unwrap();
        assert_eq!(b.to_string(), "7/4");
        assert!(RationalFunction::from_f64(f64::INFINITY).is_err());
        assert!(<RationalFunction as TransformField>::checked_div(&b, &RationalFunction::zero()).is_none());
    }
}
