//! # Calibration of gamma = Y(1)
//!
//! Both strategies share one residual,
//! `residual(gamma) = sum_j Y(j; gamma) * t1^j - y1`,
//! built once in the exact field (symbolic) and once in `f64` (numeric).
//!
//! - Symbolic: the residual is a rational function of gamma; its numerator is solved and
//!   the first root of the ordered root set is taken. No further validation of that root
//!   is performed beyond requiring it to be real.
//! - Numeric: Newton (or secant) iteration on the float residual with a hard iteration cap.
//!   A singular coefficient met while evaluating the residual ends the iteration and is
//!   returned as is; there is no retry from another starting point.
use crate::numerical::DTM::driver::{DifferentialTransform, TransformRecurrence};
use crate::numerical::DTM::dtm_errors::{DtmError, DtmResult};
use crate::numerical::DTM::evaluator::{PowerRule, polynomial_model};
use crate::numerical::DTM::transform_field::TransformField;
use crate::numerical::optimization::minimize_scalar::{
    ClosureFunction, RootFindingConfig, RootFindingMethod, ScalarRootFinder,
};
use crate::symbolic::symbolic_rational::RationalFunction;
use crate::symbolic::symbolic_solve::{is_real, solve_univariate};
use log::{debug, info, warn};
use num_complex::Complex64;
use std::cell::RefCell;
use std::fmt;

/// far boundary y(t1) = y1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCondition {
    pub t1: f64,
    pub y1: f64,
}

impl Default for BoundaryCondition {
    fn default() -> Self {
        Self { t1: 1.0, y1: 0.9 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericOptions {
    pub initial_guess: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub method: RootFindingMethod,
}

impl Default for NumericOptions {
    fn default() -> Self {
        Self {
            initial_guess: -0.5,
            max_iterations: 1500,
            tolerance: 1.48e-8,
            method: RootFindingMethod::NewtonRaphson,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationMethod {
    Numeric(NumericOptions),
    Symbolic,
}

impl Default for CalibrationMethod {
    fn default() -> Self {
        CalibrationMethod::Numeric(NumericOptions::default())
    }
}

impl fmt::Display for CalibrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CalibrationMethod::Numeric(opts) => write!(f, "numeric ({})", opts.method),
            CalibrationMethod::Symbolic => write!(f, "symbolic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationReport {
    pub k: usize,
    pub gamma: f64,
    /// root finder iterations, 0 for the symbolic strategy
    pub iterations: usize,
    /// numeric residual at the calibrated gamma
    pub residual: f64,
    pub method: CalibrationMethod,
    /// every root of the symbolic residual, empty for the numeric strategy
    pub candidate_roots: Vec<Complex64>,
}

pub struct GammaCalibrator<'a, R: TransformRecurrence> {
    driver: &'a DifferentialTransform<R>,
    boundary: BoundaryCondition,
    power_rule: PowerRule,
}

impl<'a, R: TransformRecurrence> GammaCalibrator<'a, R> {
    pub fn new(driver: &'a DifferentialTransform<R>, boundary: BoundaryCondition) -> Self {
        Self {
            driver,
            boundary,
            power_rule: PowerRule::OwnIndex,
        }
    }

    pub fn with_power_rule(mut self, power_rule: PowerRule) -> Self {
        self.power_rule = power_rule;
        self
    }

    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    fn residual_in<F: TransformField>(&self, ys: &[F]) -> DtmResult<F> {
        let t1 = F::from_f64(self.boundary.t1)?;
        let y1 = F::from_f64(self.boundary.y1)?;
        Ok(polynomial_model(&t1, ys, self.power_rule) - y1)
    }

    /// residual at a concrete gamma
    pub fn residual_numeric(&self, k: usize, gamma: f64) -> DtmResult<f64> {
        let ys = self.driver.numeric(k, gamma)?;
        self.residual_in(&ys)
    }

    /// residual as an exact rational function of gamma
    pub fn residual_symbolic(&self, k: usize) -> DtmResult<RationalFunction> {
        let ys = self.driver.symbolic(k)?;
        self.residual_in(&ys)
    }

    pub fn calibrate(&self, k: usize, method: &CalibrationMethod) -> DtmResult<CalibrationReport> {
        if k == 0 {
            // Y(0) = 1 alone does not depend on gamma
            return Err(DtmError::InvalidTruncationOrder(
                "calibration needs k >= 1".to_string(),
            ));
        }
        let report = match method {
            CalibrationMethod::Numeric(options) => self.calibrate_numeric(k, options)?,
            CalibrationMethod::Symbolic => self.calibrate_symbolic(k)?,
        };
        info!(
            "{}: k = {}, gamma = {}, residual = {:e}, {} iterations, {}",
            self.driver.recurrence().name(),
            k,
            report.gamma,
            report.residual,
            report.iterations,
            report.method
        );
        Ok(report)
    }

    pub fn calibrate_numeric(&self, k: usize, options: &NumericOptions) -> DtmResult<CalibrationReport> {
        // the root finder only sees f64, a recurrence failure is parked here and
        // surfaced as soon as the iteration stops on the resulting NaN
        let failure: RefCell<Option<DtmError>> = RefCell::new(None);
        let residual = |gamma: f64| match self.residual_numeric(k, gamma) {
            Ok(value) => value,
            Err(e) => {
                failure.borrow_mut().get_or_insert(e);
                f64::NAN
            }
        };
        let function = ClosureFunction::new(residual, format!("boundary residual, k = {}", k));
        let solver = ScalarRootFinder::with_config(RootFindingConfig {
            tolerance: options.tolerance,
            max_iterations: options.max_iterations,
            verbose: log::log_enabled!(log::Level::Debug),
        });
        let outcome = solver.solve_with_method(&function, options.method, options.initial_guess);
        if let Some(e) = failure.take() {
            warn!("residual evaluation failed during {}: {}", options.method, e);
            return Err(e);
        }
        let result = outcome?;
        Ok(CalibrationReport {
            k,
            gamma: result.root,
            iterations: result.iterations,
            residual: result.function_value,
            method: CalibrationMethod::Numeric(*options),
            candidate_roots: Vec::new(),
        })
    }

    pub fn calibrate_symbolic(&self, k: usize) -> DtmResult<CalibrationReport> {
        let residual = self.residual_symbolic(k)?;
        debug!("symbolic residual for k = {}: {}", k, residual);
        let solution = solve_univariate(&residual);
        let first = *solution.roots.first().ok_or(DtmError::NoRoots)?;
        if solution.roots.len() > 1 {
            warn!(
                "MultipleRoots: {} roots for k = {}, taking the first {}; all: {:?}",
                solution.roots.len(),
                k,
                first,
                solution.roots
            );
        }
        if !is_real(&first) {
            return Err(DtmError::NonRealRoot {
                re: first.re,
                im: first.im,
            });
        }
        let gamma = first.re;
        let residual_value = self.residual_numeric(k, gamma)?;
        Ok(CalibrationReport {
            k,
            gamma,
            iterations: 0,
            residual: residual_value,
            method: CalibrationMethod::Symbolic,
            candidate_roots: solution.roots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::DTM::recurrence::PricingRecurrence;
    use crate::numerical::optimization::minimize_scalar::RootFindingError;
    use approx::assert_relative_eq;

    fn pricing(alpha: f64, beta: f64) -> DifferentialTransform<PricingRecurrence> {
        DifferentialTransform::new(PricingRecurrence::new(alpha, beta))
    }

    #[test]
    fn test_defaults() {
        let b = BoundaryCondition::default();
        assert_eq!((b.t1, b.y1), (1.0, 0.9));
        let CalibrationMethod::Numeric(opts) = CalibrationMethod::default() else {
            panic!("numeric calibration is the default");
        };
        assert_eq!(opts.initial_guess, -0.5);
        assert_eq!(opts.max_iterations, 1500);
        assert_eq!(opts.method, RootFindingMethod::NewtonRaphson);
    }

    #[test]
    fn test_numeric_calibration_k6() {
        let driver = pricing(5.0, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        let report = calibrator.calibrate(6, &CalibrationMethod::default()).unwrap();
        assert_relative_eq!(report.gamma, -0.05452122240942703, epsilon = 1e-8);
        assert!(report.iterations < 1500);
        let ys = driver.numeric(6, report.gamma).unwrap();
        let y_at_1: f64 = ys.iter().sum();
        assert_relative_eq!(y_at_1, 0.9, epsilon = 1e-6);
        assert!(report.candidate_roots.is_empty());
    }

    #[test]
    fn test_numeric_calibration_known_roots() {
        let driver = pricing(5.0, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        for (k, expected) in [
            (2, -0.05733844181517581),
            (3, -0.05911110900239758),
            (4, -0.055606505319343705),
            (5, -0.05444267150979378),
            (7, -0.05397695299005924),
            (10, -0.05383562067240937),
        ] {
            let report = calibrator.calibrate(k, &CalibrationMethod::default()).unwrap();
            assert_relative_eq!(report.gamma, expected, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_secant_agrees_with_newton() {
        let driver = pricing(5.0, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        let secant = CalibrationMethod::Numeric(NumericOptions {
            method: RootFindingMethod::Secant,
            ..NumericOptions::default()
        });
        let a = calibrator.calibrate(6, &secant).unwrap();
        let b = calibrator.calibrate(6, &CalibrationMethod::default()).unwrap();
        assert_relative_eq!(a.gamma, b.gamma, epsilon = 1e-7);
    }

    #[test]
    fn test_symbolic_calibration_k2() {
        // 60 g^2 - 14 g - 1 = 0
        let driver = pricing(5.0, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        let residual = calibrator.residual_symbolic(2).unwrap();
        assert_eq!(residual.numer().degree(), Some(2));
        let report = calibrator.calibrate(2, &CalibrationMethod::Symbolic).unwrap();
        assert_eq!(report.candidate_roots.len(), 2);
        assert_relative_eq!(report.gamma, -0.05733844181517581, epsilon = 1e-12);
        assert_relative_eq!(report.candidate_roots[1].re, 0.2906717751485091, epsilon = 1e-9);
        assert_relative_eq!(report.residual, 0.0, epsilon = 1e-12);
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn test_symbolic_matches_numeric_first_root() {
        let driver = pricing(5.0, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        for k in 3..=6 {
            let symbolic = calibrator.calibrate(k, &CalibrationMethod::Symbolic).unwrap();
            let numeric = calibrator.calibrate(k, &CalibrationMethod::default()).unwrap();
            assert_relative_eq!(symbolic.gamma, numeric.gamma, epsilon = 1e-7);
            // boundary property, exact up to rounding for the symbolic root
            assert_relative_eq!(symbolic.residual, 0.0, epsilon = 1e-9);
            assert!(symbolic.candidate_roots.len() >= 2);
        }
    }

    #[test]
    fn test_residual_modes_agree() {
        let driver = pricing(1.75, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition { t1: 0.8, y1: 0.93 });
        let symbolic = calibrator.residual_symbolic(5).unwrap();
        for gamma in [-0.3, -0.05, 0.01] {
            let numeric = calibrator.residual_numeric(5, gamma).unwrap();
            assert_relative_eq!(symbolic.eval_f64(gamma), numeric, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_order_zero_rejected() {
        let driver = pricing(5.0, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        for method in [CalibrationMethod::default(), CalibrationMethod::Symbolic] {
            assert!(matches!(
                calibrator.calibrate(0, &method),
                Err(DtmError::InvalidTruncationOrder(_))
            ));
        }
    }

    #[test]
    fn test_non_convergence_is_an_error() {
        // three steps from -0.5 cannot reach the step tolerance
        let driver = pricing(1.75, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        let short = CalibrationMethod::Numeric(NumericOptions {
            max_iterations: 3,
            ..NumericOptions::default()
        });
        match calibrator.calibrate(10, &short) {
            Err(DtmError::Convergence(RootFindingError::MaxIterationsReached { iterations, .. })) => {
                assert_eq!(iterations, 3)
            }
            Err(DtmError::Convergence(_)) => {}
            other => panic!("expected a convergence error, got {:?}", other),
        }
    }

    #[test]
    fn test_odd_orders_converge_for_unequal_parameters() {
        let driver = pricing(1.75, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        let r5 = calibrator.calibrate(5, &CalibrationMethod::default()).unwrap();
        assert_relative_eq!(r5.gamma, -0.03834464577249944, epsilon = 1e-7);
        let r7 = calibrator.calibrate(7, &CalibrationMethod::default()).unwrap();
        assert_relative_eq!(r7.gamma, -0.0448816911752196, epsilon = 1e-7);
    }

    #[test]
    fn test_singular_coefficient_propagates_from_newton() {
        // 3*beta*gamma - alpha = 0 at the starting point gamma = 1/3
        let driver = pricing(1.0, 1.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        let options = CalibrationMethod::Numeric(NumericOptions {
            initial_guess: 1.0 / 3.0,
            ..NumericOptions::default()
        });
        let lead = 3.0 * 1.0 * (1.0f64 / 3.0) - 1.0;
        assert_eq!(lead, 0.0);
        assert!(matches!(
            calibrator.calibrate(4, &options),
            Err(DtmError::SingularCoefficient { index: 2, .. })
        ));
    }

    #[test]
    fn test_constant_residual_has_no_roots() {
        // alpha = beta = 0 makes every denominator vanish in symbolic mode
        let driver = pricing(0.0, 0.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        assert!(matches!(
            calibrator.calibrate(3, &CalibrationMethod::Symbolic),
            Err(DtmError::SingularCoefficient { index: 2, mode: "symbolic" })
        ));
        // k = 1: residual 1 + gamma - 0.9 is linear
        let driver = pricing(5.0, 5.0);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
        let report = calibrator.calibrate(1, &CalibrationMethod::Symbolic).unwrap();
        assert_relative_eq!(report.gamma, -0.1, epsilon = 1e-15);
        let calibrator = GammaCalibrator::new(&driver, BoundaryCondition { t1: 0.0, y1: 0.9 });
        assert!(matches!(
            calibrator.calibrate(1, &CalibrationMethod::Symbolic),
            Err(DtmError::NoRoots)
        ));
    }
}
