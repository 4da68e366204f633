//! # Generic differential transform driver
//!
//! Decouples the recurrence (problem specific) from boundary calibration and evaluation
//! (problem agnostic). Any type implementing `TransformRecurrence` can be driven in
//! either mode without touching the calibrator or the fitter.
//!
//! The extra arguments of a recurrence (for the price reduction problem: alpha and
//! beta) live in the implementing value itself; `parameters()` exposes them for cache
//! keys and reports.
use crate::numerical::DTM::dtm_errors::{DtmError, DtmResult};
use crate::numerical::DTM::transform_field::TransformField;
use crate::symbolic::symbolic_rational::RationalFunction;
use log::debug;
use num::rational::BigRational;

/// A differential transform recurrence: given the truncation order `k` and gamma = Y(1),
/// returns `[Y(0), ..., Y(k)]`.
pub trait TransformRecurrence {
    fn coefficients<F: TransformField>(&self, k: usize, gamma: F) -> DtmResult<Vec<F>>;

    /// the extra arguments, in the order the recurrence takes them
    fn parameters(&self) -> Vec<f64>;

    fn name(&self) -> String {
        "recurrence".to_string()
    }
}

/// which representation gamma takes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformMode {
    Symbolic,
    Numeric(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoefficientSequence {
    Symbolic(Vec<RationalFunction>),
    Numeric(Vec<f64>),
}

impl CoefficientSequence {
    pub fn len(&self) -> usize {
        match self {
            CoefficientSequence::Symbolic(ys) => ys.len(),
            CoefficientSequence::Numeric(ys) => ys.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            CoefficientSequence::Numeric(ys) => Some(ys),
            CoefficientSequence::Symbolic(_) => None,
        }
    }

    pub fn as_symbolic(&self) -> Option<&[RationalFunction]> {
        match self {
            CoefficientSequence::Symbolic(ys) => Some(ys),
            CoefficientSequence::Numeric(_) => None,
        }
    }

    /// Numeric values at `gamma`. Symbolic entries are substituted exactly and rounded
    /// once at the end; a pole is reported as a singular coefficient.
    pub fn substitute(&self, gamma: f64) -> DtmResult<Vec<f64>> {
        match self {
            CoefficientSequence::Numeric(ys) => Ok(ys.clone()),
            CoefficientSequence::Symbolic(ys) => {
                let g = BigRational::from_float(gamma).ok_or(DtmError::NonFiniteParameter(gamma))?;
                ys.iter()
                    .enumerate()
                    .map(|(index, y)| {
                        y.substitute(&g)
                            .map(|v| num::ToPrimitive::to_f64(&v).unwrap_or(f64::NAN))
                            .ok_or(DtmError::SingularCoefficient {
                                index,
                                mode: "symbolic",
                            })
                    })
                    .collect()
            }
        }
    }
}

/// Drives a pluggable recurrence in symbolic or numeric mode.
#[derive(Debug, Clone)]
pub struct DifferentialTransform<R: TransformRecurrence> {
    recurrence: R,
}

impl<R: TransformRecurrence> DifferentialTransform<R> {
    pub fn new(recurrence: R) -> Self {
        Self { recurrence }
    }

    pub fn recurrence(&self) -> &R {
        &self.recurrence
    }

    pub fn transform(&self, k: usize, mode: TransformMode) -> DtmResult<CoefficientSequence> {
        match mode {
            TransformMode::Symbolic => Ok(CoefficientSequence::Symbolic(self.symbolic(k)?)),
            TransformMode::Numeric(gamma) => {
                Ok(CoefficientSequence::Numeric(self.numeric(k, gamma)?))
            }
        }
    }

    pub fn numeric(&self, k: usize, gamma: f64) -> DtmResult<Vec<f64>> {
        self.recurrence.coefficients(k, gamma)
    }

    /// coefficients as exact rational functions of gamma
    pub fn symbolic(&self, k: usize) -> DtmResult<Vec<RationalFunction>> {
        let ys = self.recurrence.coefficients(k, RationalFunction::variable())?;
        debug!(
            "{}: symbolic Y({}) = {}",
            self.recurrence.name(),
            k,
            ys.last().map(|y| y.to_string()).unwrap_or_default()
        );
        Ok(ys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y' = y, y(0) = 1: Y(r) = 1/r!, gamma is ignored past Y(1)
    struct ExponentialRecurrence;

    impl TransformRecurrence for ExponentialRecurrence {
        fn coefficients<F: TransformField>(&self, k: usize, gamma: F) -> DtmResult<Vec<F>> {
            let mut ys = vec![F::one()];
            if k >= 1 {
                ys.push(gamma);
            }
            for r in 2..=k {
                let y = ys[r - 1]
                    .checked_div(&F::from_usize(r))
                    .ok_or(DtmError::SingularCoefficient { index: r, mode: F::MODE })?;
                ys.push(y);
            }
            Ok(ys)
        }

        fn parameters(&self) -> Vec<f64> {
            Vec::new()
        }
    }

    #[test]
    fn test_any_recurrence_can_be_driven() {
        let driver = DifferentialTransform::new(ExponentialRecurrence);
        let ys = driver.numeric(4, 1.0).unwrap();
        assert_eq!(ys, vec![1.0, 1.0, 0.5, 0.5 / 3.0, 0.5 / 12.0]);
        let seq = driver.transform(4, TransformMode::Symbolic).unwrap();
        assert_eq!(seq.len(), 5);
        assert!(seq.as_numeric().is_none());
        let substituted = seq.substitute(1.0).unwrap();
        for (a, b) in substituted.iter().zip(ys.iter()) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn test_numeric_mode_passes_through() {
        let driver = DifferentialTransform::new(ExponentialRecurrence);
        let seq = driver.transform(1, TransformMode::Numeric(0.3)).unwrap();
        assert_eq!(seq, CoefficientSequence::Numeric(vec![1.0, 0.3]));
        assert_eq!(seq.substitute(7.0).unwrap(), vec![1.0, 0.3]);
    }
}
