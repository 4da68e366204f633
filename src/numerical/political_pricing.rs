//! # Price reduction problem
//!
//! A company must cut its price by 10%. The charge y(t) is penalized by
//! `P(t, y') = alpha*y'^2 + beta*(t^2 - 1)*y'^3`, the customers' tendency to wait for a
//! lower price, and the optimal path minimizes `S(y) = int_0^1 (P - y) dt` subject to
//! y(0) = 1, y(1) = 0.9.
//!
//! Everything here consumes a fitted path: the Lagrangian, its integral and the
//! Euler-Lagrange residual used to judge a fitted model against the straight line.
use crate::numerical::DTM::dtm_errors::{DtmError, DtmResult};
use crate::numerical::DTM::fitter::FittedModel;
use crate::Utils::logger::linspace;
use gauss_quad::GaussLegendre;
use tabled::{builder::Builder, settings::Style};

/// finite difference step for derivatives of an arbitrary path
pub const DERIVATIVE_STEP: f64 = 0.01;
/// Gauss-Legendre nodes for the integral of the Lagrangian
pub const QUADRATURE_DEGREE: usize = 20;

pub fn penalty(t: f64, dy: f64, alpha: f64, beta: f64) -> f64 {
    alpha * dy.powi(2) + beta * (t * t - 1.0) * dy.powi(3)
}

pub fn lagrangian(t: f64, y: f64, dy: f64, alpha: f64, beta: f64) -> f64 {
    penalty(t, dy, alpha, beta) - y
}

/// left-hand side of `2*alpha*y'' + 6*beta*(t*y'^2 + (t^2 - 1)*y'*y'') + 1 = 0`
pub fn euler_lagrange_residual(t: f64, dy: f64, ddy: f64, alpha: f64, beta: f64) -> f64 {
    2.0 * alpha * ddy + 6.0 * beta * (t * dy * dy + (t * t - 1.0) * dy * ddy) + 1.0
}

pub fn central_derivative<F: Fn(f64) -> f64>(y: &F, t: f64, dx: f64) -> f64 {
    (y(t + dx) - y(t - dx)) / (2.0 * dx)
}

pub fn central_second_derivative<F: Fn(f64) -> f64>(y: &F, t: f64, dx: f64) -> f64 {
    (y(t + dx) - 2.0 * y(t) + y(t - dx)) / (dx * dx)
}

/// Lagrangian along the path `y`, derivative by central difference
pub fn path_lagrangian<F: Fn(f64) -> f64>(y: &F, t: f64, alpha: f64, beta: f64) -> f64 {
    lagrangian(t, y(t), central_derivative(y, t, DERIVATIVE_STEP), alpha, beta)
}

/// Euler-Lagrange residual along the path `y`, derivatives by central differences
pub fn path_euler_residual<F: Fn(f64) -> f64>(y: &F, t: f64, alpha: f64, beta: f64) -> f64 {
    let dy = central_derivative(y, t, DERIVATIVE_STEP);
    let ddy = central_second_derivative(y, t, DERIVATIVE_STEP);
    euler_lagrange_residual(t, dy, ddy, alpha, beta)
}

/// `int_0^1 L(t, y, y') dt`
pub fn integrate_lagrangian<F: Fn(f64) -> f64>(y: &F, alpha: f64, beta: f64) -> DtmResult<f64> {
    let quad = GaussLegendre::new(QUADRATURE_DEGREE)
        .map_err(|e| DtmError::Quadrature(format!("Failed to create Gauss-Legendre quadrature: {:?}", e)))?;
    Ok(quad.integrate(0.0, 1.0, |t| path_lagrangian(y, t, alpha, beta)))
}

/// reference path from (0, 1) to (1, 0.9)
pub fn straight_line(t: f64) -> f64 {
    1.0 - 0.1 * t
}

/// A fitted model against the straight line on [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct PricingComparison {
    pub alpha: f64,
    pub beta: f64,
    pub k: usize,
    pub model_action: f64,
    pub line_action: f64,
    /// max |Euler-Lagrange residual| with finite difference derivatives
    pub model_max_residual: f64,
    pub line_max_residual: f64,
    /// same, with the exact derivatives of the series
    pub model_max_residual_exact: f64,
}

impl PricingComparison {
    pub fn compare(model: &FittedModel, alpha: f64, beta: f64, n_points: usize) -> DtmResult<Self> {
        let y = |t: f64| model.eval(t);
        let grid = linspace(0.0, 1.0, n_points);
        let max_abs = |f: &dyn Fn(f64) -> f64| grid.iter().map(|&t| f(t).abs()).fold(0.0, f64::max);
        Ok(Self {
            alpha,
            beta,
            k: model.k(),
            model_action: integrate_lagrangian(&y, alpha, beta)?,
            line_action: integrate_lagrangian(&straight_line, alpha, beta)?,
            model_max_residual: max_abs(&|t| path_euler_residual(&y, t, alpha, beta)),
            line_max_residual: max_abs(&|t| path_euler_residual(&straight_line, t, alpha, beta)),
            model_max_residual_exact: max_abs(&|t| {
                euler_lagrange_residual(
                    t,
                    model.eval_derivative(t, 1),
                    model.eval_derivative(t, 2),
                    alpha,
                    beta,
                )
            }),
        })
    }

    /// true when the fitted path has the smaller action
    pub fn model_is_better(&self) -> bool {
        self.model_action < self.line_action
    }

    pub fn to_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["".to_string(), "model".to_string(), "straight line".to_string()]);
        builder.push_record([
            "integral of Lagrangian".to_string(),
            format!("{:.10}", self.model_action),
            format!("{:.10}", self.line_action),
        ]);
        builder.push_record([
            "max |E-L residual|".to_string(),
            format!("{:.3e}", self.model_max_residual),
            format!("{:.3e}", self.line_max_residual),
        ]);
        builder.push_record([
            "max |E-L residual|, exact derivatives".to_string(),
            format!("{:.3e}", self.model_max_residual_exact),
            "-".to_string(),
        ]);
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::DTM::calibrator::{BoundaryCondition, CalibrationMethod};
    use crate::numerical::DTM::fitter::ModelFitter;
    use crate::numerical::DTM::recurrence::PricingRecurrence;
    use approx::assert_relative_eq;

    #[test]
    fn test_penalty_and_lagrangian() {
        assert_relative_eq!(penalty(0.0, -0.1, 5.0, 5.0), 0.05 + 0.005, epsilon = 1e-15);
        assert_eq!(penalty(1.0, 2.0, 0.0, 7.0), 0.0);
        assert_relative_eq!(lagrangian(0.0, 1.0, -0.1, 5.0, 5.0), 0.055 - 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_finite_differences() {
        let cube = |t: f64| t * t * t;
        // central difference error for t^3 is dx^2
        assert_relative_eq!(central_derivative(&cube, 0.5, 0.01), 0.75 + 1e-4, epsilon = 1e-12);
        assert_relative_eq!(central_second_derivative(&cube, 0.5, 0.01), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_straight_line_residual() {
        // y'' = 0, y' = -0.1: residual 1 + 0.06*beta*t
        for t in [0.0, 0.3, 1.0] {
            assert_relative_eq!(
                path_euler_residual(&straight_line, t, 5.0, 5.0),
                1.0 + 0.3 * t,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_integral_of_lagrangian_for_line() {
        // 0.01*alpha + (2/3)*0.001*beta - 0.95
        let s = integrate_lagrangian(&straight_line, 5.0, 5.0).unwrap();
        assert_relative_eq!(s, 0.05 + 0.01 / 3.0 - 0.95, epsilon = 1e-10);
        let s = integrate_lagrangian(&straight_line, 1.75, 5.0).unwrap();
        assert_relative_eq!(s, 0.0175 + 0.01 / 3.0 - 0.95, epsilon = 1e-10);
    }

    #[test]
    fn test_fitted_model_comparison() {
        let mut fitter = ModelFitter::new(
            PricingRecurrence::new(5.0, 5.0),
            BoundaryCondition::default(),
            CalibrationMethod::default(),
        );
        let model = fitter.fit(10).unwrap();
        let cmp = PricingComparison::compare(&model, 5.0, 5.0, 30).unwrap();
        assert_eq!(cmp.k, 10);
        // the series satisfies the Euler-Lagrange equation near t = 0 far better than the line
        assert!(model.eval(0.0) == 1.0);
        let at_zero = euler_lagrange_residual(
            0.0,
            model.eval_derivative(0.0, 1),
            model.eval_derivative(0.0, 2),
            5.0,
            5.0,
        );
        assert!(at_zero.abs() < 1e-12);
        assert!(cmp.line_max_residual > 1.0);
        assert!(cmp.model_is_better());
        let table = cmp.to_table();
        assert!(table.contains("integral of Lagrangian"));
    }
}
