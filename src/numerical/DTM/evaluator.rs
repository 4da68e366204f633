//! Power series evaluation of a coefficient sequence.
use crate::numerical::DTM::transform_field::{TransformField, pow_field};
use strum_macros::{Display, EnumString};

/// Power assigned to the j-th coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum PowerRule {
    /// `sum_j Y(j) * t^j`
    #[default]
    #[strum(serialize = "own_index")]
    OwnIndex,
    /// `sum_j Y(j) * t^n` with n the sequence length. Historical variant, kept to
    /// reproduce old results; agrees with `OwnIndex` only at t = 1.
    #[strum(serialize = "legacy")]
    LegacySequenceLength,
}

/// Evaluates `ys` as a power series at `t` in any field, so the same routine builds
/// the symbolic and the numeric boundary residual.
pub fn polynomial_model<F: TransformField>(t: &F, ys: &[F], rule: PowerRule) -> F {
    match rule {
        PowerRule::OwnIndex => ys
            .iter()
            .rev()
            .fold(F::zero(), |acc, y| acc * t.clone() + y.clone()),
        PowerRule::LegacySequenceLength => {
            let tn = pow_field(t, ys.len());
            ys.iter()
                .fold(F::zero(), |acc, y| acc + y.clone() * tn.clone())
        }
    }
}

/// Horner evaluation of `sum_j ys[j] * t^j`
pub fn eval_polynomial(t: f64, ys: &[f64]) -> f64 {
    ys.iter().rev().fold(0.0, |acc, y| acc * t + y)
}

/// `order`-th derivative of the power series at `t`
pub fn eval_polynomial_derivative(t: f64, ys: &[f64], order: usize) -> f64 {
    if order >= ys.len() {
        return 0.0;
    }
    // d^order/dt^order t^j = j!/(j-order)! t^(j-order)
    let mut acc = 0.0;
    for j in (order..ys.len()).rev() {
        let falling: f64 = ((j - order + 1)..=j).map(|i| i as f64).product();
        acc = acc * t + ys[j] * falling;
    }
    acc
}
