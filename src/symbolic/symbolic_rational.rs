//! # Exact rational functions of gamma
//!
//! `RationalFunction` keeps a numerator/denominator pair of exact polynomials in the
//! single unknown gamma. Every constructor and operation returns the reduced form:
//! numerator and denominator share no common factor and the denominator is monic.
//! Reduced form makes equality structural, so `Y(3)` computed twice compares equal,
//! and keeps the degrees low during deep recurrences.
use crate::symbolic::symbolic_polynomial::Polynomial;
use num::bigint::BigInt;
use num::rational::BigRational;
use num::{One, Zero};
use num_complex::Complex64;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RationalFunction {
    numer: Polynomial,
    denom: Polynomial,
}

impl RationalFunction {
    /// `None` when the denominator is the zero polynomial
    pub fn new(numer: Polynomial, denom: Polynomial) -> Option<Self> {
        if denom.is_zero() {
            return None;
        }
        Some(Self::reduced(numer, denom))
    }

    fn reduced(numer: Polynomial, denom: Polynomial) -> Self {
        if numer.is_zero() {
            return RationalFunction {
                numer,
                denom: Polynomial::one(),
            };
        }
        let g = Polynomial::gcd(&numer, &denom);
        let (numer, denom) = if g.is_one() {
            (numer, denom)
        } else {
            // exact division, remainders are zero
            let n = numer.div_rem(&g).map(|(q, _)| q).unwrap_or(numer);
            let d = denom.div_rem(&g).map(|(q, _)| q).unwrap_or(denom);
            (n, d)
        };
        match denom.leading() {
            Some(lead) if !lead.is_one() => {
                let inv = lead.recip();
                RationalFunction {
                    numer: numer.scale(&inv),
                    denom: denom.scale(&inv),
                }
            }
            _ => RationalFunction { numer, denom },
        }
    }

    pub fn from_polynomial(p: Polynomial) -> Self {
        RationalFunction {
            numer: p,
            denom: Polynomial::one(),
        }
    }

    pub fn constant(c: BigRational) -> Self {
        Self::from_polynomial(Polynomial::constant(c))
    }

    pub fn from_integer(n: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(n)))
    }

    /// the unknown gamma itself
    pub fn variable() -> Self {
        Self::from_polynomial(Polynomial::variable())
    }

    pub fn numer(&self) -> &Polynomial {
        &self.numer
    }

    pub fn denom(&self) -> &Polynomial {
        &self.denom
    }

    pub fn is_polynomial(&self) -> bool {
        self.denom.is_one()
    }

    /// constant value, if gamma does not appear
    pub fn as_constant(&self) -> Option<BigRational> {
        if !self.numer.is_constant() || !self.denom.is_constant() {
            return None;
        }
        let n = self.numer.coeffs().first().cloned().unwrap_or_else(BigRational::zero);
        let d = self.denom.coeffs().first().cloned()?;
        Some(n / d)
    }

    pub fn checked_div(&self, rhs: &RationalFunction) -> Option<RationalFunction> {
        if rhs.numer.is_zero() {
            return None;
        }
        Some(Self::reduced(
            &self.numer * &rhs.denom,
            &self.denom * &rhs.numer,
        ))
    }

    pub fn recip(&self) -> Option<RationalFunction> {
        Self::one().checked_div(self)
    }

    /// exact value at a rational gamma, `None` at a pole
    pub fn substitute(&self, gamma: &BigRational) -> Option<BigRational> {
        let d = self.denom.eval_exact(gamma);
        if d.is_zero() {
            return None;
        }
        Some(self.numer.eval_exact(gamma) / d)
    }

    pub fn eval_f64(&self, gamma: f64) -> f64 {
        self.numer.eval_f64(gamma) / self.denom.eval_f64(gamma)
    }

    pub fn eval_complex(&self, gamma: Complex64) -> Complex64 {
        self.numer.eval_complex(gamma) / self.denom.eval_complex(gamma)
    }
}

impl Add for &RationalFunction {
    type Output = RationalFunction;
    fn add(self, rhs: &RationalFunction) -> RationalFunction {
        if self.denom == rhs.denom {
            return RationalFunction::reduced(&self.numer + &rhs.numer, self.denom.clone());
        }
        RationalFunction::reduced(
            &(&self.numer * &rhs.denom) + &(&rhs.numer * &self.denom),
            &self.denom * &rhs.denom,
        )
    }
}

impl Neg for &RationalFunction {
    type Output = RationalFunction;
    fn neg(self) -> RationalFunction {
        RationalFunction {
            numer: -&self.numer,
            denom: self.denom.clone(),
        }
    }
}

impl Sub for &RationalFunction {
    type Output = RationalFunction;
    fn sub(self, rhs: &RationalFunction) -> RationalFunction {
        self + &(-rhs)
    }
}

impl Mul for &RationalFunction {
    type Output = RationalFunction;
    fn mul(self, rhs: &RationalFunction) -> RationalFunction {
        if self.numer.is_zero() || rhs.numer.is_zero() {
            return RationalFunction::zero();
        }
        // constants skip the gcd
        if let Some(c) = self.as_constant() {
            return RationalFunction {
                numer: rhs.numer.scale(&c),
                denom: rhs.denom.clone(),
            };
        }
        if let Some(c) = rhs.as_constant() {
            return RationalFunction {
                numer: self.numer.scale(&c),
                denom: self.denom.clone(),
            };
        }
        RationalFunction::reduced(&self.numer * &rhs.numer, &self.denom * &rhs.denom)
    }
}

impl Add for RationalFunction {
    type Output = RationalFunction;
    fn add(self, rhs: RationalFunction) -> RationalFunction {
        &self + &rhs
    }
}

impl Sub for RationalFunction {
    type Output = RationalFunction;
    fn sub(self, rhs: RationalFunction) -> RationalFunction {
        &self - &rhs
    }
}

impl Mul for RationalFunction {
    type Output = RationalFunction;
    fn mul(self, rhs: RationalFunction) -> RationalFunction {
        &self * &rhs
    }
}

impl Neg for RationalFunction {
    type Output = RationalFunction;
    fn neg(self) -> RationalFunction {
        -&self
    }
}

impl Zero for RationalFunction {
    fn zero() -> Self {
        Self::from_polynomial(Polynomial::zero())
    }
    fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }
}

impl One for RationalFunction {
    fn one() -> Self {
        Self::from_polynomial(Polynomial::one())
    }
}

impl fmt::Display for RationalFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_polynomial() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "({})/({})", self.numer, self.denom)
        }
    }
}
