//! # Differential Transform Method
//!
//! y(t) is approximated by its Taylor polynomial `sum_r Y(r) t^r` at t = 0. The Euler-Lagrange
//! equation turns into a recurrence for `Y(r)` in which everything past `Y(1) = gamma` is
//! determined; gamma itself is calibrated so that the series meets the far boundary.
//!
//! parameters -> recurrence -> (symbolic | numeric) residual -> gamma -> coefficients -> y(t)
//!
///# Example
/// ```
/// use RustedDTM::numerical::DTM::driver::{DifferentialTransform, TransformMode};
/// use RustedDTM::numerical::DTM::recurrence::PricingRecurrence;
/// use RustedDTM::numerical::DTM::calibrator::{BoundaryCondition, CalibrationMethod, GammaCalibrator};
/// let driver = DifferentialTransform::new(PricingRecurrence::new(5.0, 5.0));
/// // Y(2) = 1/(4*(3*beta*gamma - alpha))
/// let ys = driver.transform(2, TransformMode::Numeric(0.0)).unwrap();
/// assert_eq!(ys.as_numeric().unwrap(), &[1.0, 0.0, -0.05]);
/// let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
/// let symbolic = calibrator.calibrate(4, &CalibrationMethod::Symbolic).unwrap();
/// let numeric = calibrator.calibrate(4, &CalibrationMethod::default()).unwrap();
/// assert!((symbolic.gamma - numeric.gamma).abs() < 1e-7);
/// ```
/// ________________________________________________________________________________________________________________________________
/// error enum of the solver
pub mod dtm_errors;
/// numeric field abstraction: f64 and exact rational functions of gamma
pub mod transform_field;
/// recurrence capability and the mode switching driver
pub mod driver;
/// the price reduction recurrence
pub mod recurrence;
/// power series evaluation
pub mod evaluator;
/// symbolic and numeric calibration of gamma
pub mod calibrator;
/// fitted models, coefficient cache, parameter sweeps
pub mod fitter;
/// task documents
pub mod task_parser_dtm;
