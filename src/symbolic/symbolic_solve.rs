//! # Solving `f(gamma) = 0` for exact rational functions
//!
//! The roots of a reduced rational function are the roots of its numerator that are
//! not poles. The numerator is made square-free exactly first, so every root is simple
//! when it reaches floating point.
//! - degree 1: exact rational root
//! - degree 2: closed form
//! - degree >= 3: eigenvalues of the companion matrix, then complex Newton polishing
//!
//! Roots come back ordered: real roots ascending, then complex roots by real and
//! imaginary part.
use crate::symbolic::symbolic_polynomial::Polynomial;
use crate::symbolic::symbolic_rational::RationalFunction;
use itertools::Itertools;
use log::debug;
use nalgebra::DMatrix;
use num::{ToPrimitive, Zero};
use num_complex::Complex64;
use std::cmp::Ordering;

/// relative size of the imaginary part below which a root counts as real
pub const REAL_ROOT_TOLERANCE: f64 = 1e-10;
const POLISH_ITERATIONS: usize = 50;

#[derive(Debug, Clone)]
pub struct SymbolicRoots {
    /// square-free numerator that was solved
    pub polynomial: Polynomial,
    pub roots: Vec<Complex64>,
}

impl SymbolicRoots {
    pub fn real_roots(&self) -> Vec<f64> {
        self.roots
            .iter()
            .filter(|z| z.im == 0.0)
            .map(|z| z.re)
            .collect()
    }
}

pub fn is_real(z: &Complex64) -> bool {
    z.im.abs() <= REAL_ROOT_TOLERANCE * z.re.abs().max(1.0)
}

/// Solves `residual(gamma) = 0`.
///
/// A residual that is identically zero or a nonzero constant has no isolated roots and
/// yields an empty set.
pub fn solve_univariate(residual: &RationalFunction) -> SymbolicRoots {
    let polynomial = residual.numer().square_free();
    let roots = match polynomial.degree() {
        None | Some(0) => Vec::new(),
        Some(1) => linear_root(&polynomial),
        Some(2) => quadratic_roots(&polynomial),
        Some(_) => companion_roots(&polynomial),
    };
    let roots = roots
        .into_iter()
        .map(|z| if is_real(&z) { Complex64::new(z.re, 0.0) } else { z })
        .filter(|z| {
            // reduced form leaves no common root, guard against rounding only
            residual.denom().eval_complex(*z).norm() > 0.0
        })
        .sorted_by(root_order)
        .collect::<Vec<_>>();
    debug!(
        "solved {} = 0, {} root(s): {:?}",
        polynomial,
        roots.len(),
        roots
    );
    SymbolicRoots { polynomial, roots }
}

fn root_order(a: &Complex64, b: &Complex64) -> Ordering {
    let a_real = a.im == 0.0;
    let b_real = b.im == 0.0;
    match (a_real, b_real) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        // conjugate pairs share a real part up to rounding, compare it on a grid
        _ => ordering_grid(a.re)
            .total_cmp(&ordering_grid(b.re))
            .then(a.im.total_cmp(&b.im))
            .then(a.re.total_cmp(&b.re)),
    }
}

fn ordering_grid(x: f64) -> f64 {
    (x * 1e9).round()
}

fn linear_root(p: &Polynomial) -> Vec<Complex64> {
    let c = p.coeffs();
    let root = -(&c[0] / &c[1]);
    vec![Complex64::new(root.to_f64().unwrap_or(f64::NAN), 0.0)]
}

fn quadratic_roots(p: &Polynomial) -> Vec<Complex64> {
    let c = p.to_f64_coeffs();
    let (a, b, cc) = (c[2], c[1], c[0]);
    let disc = b * b - 4.0 * a * cc;
    if disc >= 0.0 {
        // avoids cancellation between -b and sqrt(disc)
        let q = -0.5 * (b + b.signum() * disc.sqrt());
        if q == 0.0 {
            return vec![Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0)];
        }
        vec![Complex64::new(q / a, 0.0), Complex64::new(cc / q, 0.0)]
    } else {
        let re = -b / (2.0 * a);
        let im = (-disc).sqrt() / (2.0 * a);
        vec![Complex64::new(re, -im.abs()), Complex64::new(re, im.abs())]
    }
}

fn companion_roots(p: &Polynomial) -> Vec<Complex64> {
    let monic = p.monic();
    let c = monic.to_f64_coeffs();
    let n = c.len() - 1;
    let mut companion = DMatrix::<f64>::zeros(n, n);
    for i in 1..n {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..n {
        companion[(i, n - 1)] = -c[i];
    }
    companion
        .complex_eigenvalues()
        .iter()
        .map(|z| polish_root(&monic, Complex64::new(z.re, z.im)))
        .collect()
}

/// Newton steps on the exact polynomial (evaluated in complex floating point)
fn polish_root(p: &Polynomial, mut z: Complex64) -> Complex64 {
    let dp = p.derivative();
    for _ in 0..POLISH_ITERATIONS {
        let f = p.eval_complex(z);
        let df = dp.eval_complex(z);
        if df.is_zero() || !f.is_finite() {
            break;
        }
        let step = f / df;
        if !step.is_finite() {
            break;
        }
        z -= step;
        if step.norm() <= f64::EPSILON * z.norm().max(1.0) {
            break;
        }
    }
    z
}
