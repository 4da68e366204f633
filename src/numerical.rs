#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// Differential Transform Method for the variational boundary value problem
///  Example#1
/// ```
/// use RustedDTM::numerical::DTM::recurrence::PricingRecurrence;
/// use RustedDTM::numerical::DTM::fitter::ModelFitter;
/// use RustedDTM::numerical::DTM::calibrator::{BoundaryCondition, CalibrationMethod};
/// // alpha = beta = 5, y(0) = 1, y(1) = 0.9
/// let mut fitter = ModelFitter::new(
///     PricingRecurrence::new(5.0, 5.0),
///     BoundaryCondition::default(),
///     CalibrationMethod::default(),
/// );
/// let model = fitter.fit(6).unwrap();
/// assert!((model.eval(1.0) - 0.9).abs() < 1e-6);
/// let y = model.as_callable();
/// println!("y(0.5) = {}", y(0.5));
/// ```
pub mod DTM;
/// scalar root finders used to calibrate gamma
pub mod optimization;
/// penalty, Lagrangian and Euler-Lagrange residual of the price reduction problem
pub mod political_pricing;
