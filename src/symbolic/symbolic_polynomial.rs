//! # Exact univariate polynomials
//!
//! Dense polynomials in the single unknown `gamma` with `BigRational` coefficients.
//! Coefficients are stored in ascending powers and the vector never carries trailing
//! zeros, so the zero polynomial is the empty vector and two equal polynomials are
//! always structurally equal.
//!
//! ## Main methods
//! - `variable()`, `constant(c)`, `monomial(c, n)` - constructors
//! - `div_rem(&divisor)` - Euclidean division, `gcd(&a, &b)` - monic greatest common divisor
//! - `derivative()`, `square_free()` - used before root finding
//! - `eval_exact`, `eval_f64`, `eval_complex` - evaluation in three number systems
use num::bigint::BigInt;
use num::rational::BigRational;
use num::{One, Signed, ToPrimitive, Zero};
use num_complex::Complex64;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// name of the unknown used when printing
pub const SYMBOL: &str = "gamma";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Polynomial {
    coeffs: Vec<BigRational>,
}

impl Polynomial {
    /// builds a polynomial from coefficients in ascending powers
    pub fn from_coeffs(coeffs: Vec<BigRational>) -> Self {
        let mut p = Polynomial { coeffs };
        p.trim();
        p
    }

    pub fn zero() -> Self {
        Polynomial { coeffs: Vec::new() }
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        Self::from_coeffs(vec![c])
    }

    pub fn monomial(c: BigRational, power: usize) -> Self {
        let mut coeffs = vec![BigRational::zero(); power + 1];
        coeffs[power] = c;
        Self::from_coeffs(coeffs)
    }

    /// the polynomial `gamma`
    pub fn variable() -> Self {
        Self::monomial(BigRational::one(), 1)
    }

    pub fn from_integer(n: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(n)))
    }

    fn trim(&mut self) {
        while self.coeffs.last().is_some_and(|c| c.is_zero()) {
            self.coeffs.pop();
        }
    }

    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0].is_one()
    }

    /// `None` for the zero polynomial
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    pub fn leading(&self) -> Option<&BigRational> {
        self.coeffs.last()
    }

    pub fn scale(&self, c: &BigRational) -> Self {
        if c.is_zero() {
            return Self::zero();
        }
        Polynomial {
            coeffs: self.coeffs.iter().map(|a| a * c).collect(),
        }
    }

    /// divides all coefficients by the leading one
    pub fn monic(&self) -> Self {
        match self.leading() {
            Some(lead) if !lead.is_one() => self.scale(&lead.recip()),
            _ => self.clone(),
        }
    }

    /// Euclidean division, `None` when the divisor is the zero polynomial
    pub fn div_rem(&self, divisor: &Polynomial) -> Option<(Polynomial, Polynomial)> {
        let d_deg = divisor.degree()?;
        let d_lead = divisor.coeffs[d_deg].clone();
        let mut rem = self.coeffs.clone();
        let Some(self_deg) = self.degree() else {
            return Some((Self::zero(), Self::zero()));
        };
        if self_deg < d_deg {
            return Some((Self::zero(), self.clone()));
        }
        let mut quot = vec![BigRational::zero(); self_deg - d_deg + 1];
        for shift in (0..=self_deg - d_deg).rev() {
            let c = &rem[shift + d_deg] / &d_lead;
            if c.is_zero() {
                continue;
            }
            for (j, dc) in divisor.coeffs.iter().enumerate() {
                rem[shift + j] -= &c * dc;
            }
            quot[shift] = c;
        }
        Some((Self::from_coeffs(quot), Self::from_coeffs(rem)))
    }

    /// monic greatest common divisor; gcd(0, 0) is 0
    pub fn gcd(a: &Polynomial, b: &Polynomial) -> Polynomial {
        let mut x = a.clone();
        let mut y = b.clone();
        while !y.is_zero() {
            let r = match x.div_rem(&y) {
                Some((_, r)) => r,
                None => break,
            };
            x = y;
            y = r;
        }
        x.monic()
    }

    pub fn derivative(&self) -> Self {
        Polynomial::from_coeffs(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
                .collect(),
        )
    }

    /// removes repeated factors: p / gcd(p, p')
    pub fn square_free(&self) -> Self {
        if self.is_constant() {
            return self.clone();
        }
        let g = Self::gcd(self, &self.derivative());
        if g.is_constant() {
            return self.clone();
        }
        match self.div_rem(&g) {
            Some((q, _)) => q,
            None => self.clone(),
        }
    }

    pub fn eval_exact(&self, x: &BigRational) -> BigRational {
        self.coeffs
            .iter()
            .rev()
            .fold(BigRational::zero(), |acc, c| acc * x + c)
    }

    pub fn to_f64_coeffs(&self) -> Vec<f64> {
        self.coeffs
            .iter()
            .map(|c| c.to_f64().unwrap_or(f64::NAN))
            .collect()
    }

    pub fn eval_f64(&self, x: f64) -> f64 {
        self.to_f64_coeffs()
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }

    pub fn eval_complex(&self, z: Complex64) -> Complex64 {
        self.to_f64_coeffs()
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, c| acc * z + *c)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: &Polynomial) -> Polynomial {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        let coeffs = (0..n)
            .map(|i| match (self.coeffs.get(i), rhs.coeffs.get(i)) {
                (Some(a), Some(b)) => a + b,
                (Some(a), None) => a.clone(),
                (None, Some(b)) => b.clone(),
                (None, None) => BigRational::zero(),
            })
            .collect();
        Polynomial::from_coeffs(coeffs)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        Polynomial {
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: &Polynomial) -> Polynomial {
        self + &(-rhs)
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: &Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut coeffs = vec![BigRational::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Polynomial::from_coeffs(coeffs)
    }
}

impl Add for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Polynomial) -> Polynomial {
        &self + &rhs
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Polynomial) -> Polynomial {
        &self - &rhs
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        &self * &rhs
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        -&self
    }
}

/// prints in descending powers, e.g. `60*gamma^2 - 14*gamma - 1`
impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (power, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let magnitude = c.abs();
            if first {
                if c.is_negative() {
                    write!(f, "-")?;
                }
            } else if c.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            first = false;
            let show_coeff = power == 0 || !magnitude.is_one();
            if show_coeff {
                write!(f, "{}", magnitude)?;
            }
            match power {
                0 => {}
                1 if show_coeff => write!(f, "*{}", SYMBOL)?,
                1 => write!(f, "{}", SYMBOL)?,
                _ if show_coeff => write!(f, "*{}^{}", SYMBOL, power)?,
                _ => write!(f, "{}^{}", SYMBOL, power)?,
            }
        }
        Ok(())
    }
}
