//! # Scalar root finding
//!
//! Newton-Raphson and secant iterations for `f(x) = 0` with a hard iteration cap.
//! Every failure is returned as a `RootFindingError`; the last iterate is never handed
//! back as if it were a root.
use log::{debug, warn};
use std::fmt;
use strum_macros::{Display, EnumString};

/// Root finding methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum RootFindingMethod {
    #[strum(serialize = "newton", serialize = "newton_raphson", to_string = "newton_raphson")]
    NewtonRaphson,
    #[strum(serialize = "secant", to_string = "secant")]
    Secant,
}

/// Error types for root finding methods
#[derive(Debug, Clone, PartialEq)]
pub enum RootFindingError {
    /// iteration cap hit; `last` is the final iterate, reported for diagnostics only
    MaxIterationsReached { iterations: usize, last: f64 },
    DerivativeZero { x: f64 },
    /// the function or the update produced NaN or infinity
    NonFiniteIterate { iteration: usize, x: f64 },
    InvalidInput(String),
}

impl fmt::Display for RootFindingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RootFindingError::MaxIterationsReached { iterations, last } => write!(
                f,
                "Maximum iterations reached ({}), last iterate {}",
                iterations, last
            ),
            RootFindingError::DerivativeZero { x } => write!(f, "Derivative is zero at x = {}", x),
            RootFindingError::NonFiniteIterate { iteration, x } => write!(
                f,
                "Non-finite value at iteration {} (x = {})",
                iteration, x
            ),
            RootFindingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}
//////////////////////////////////TRAITS AND IMPLEMENTATIONS/////////////////////////////////
impl std::error::Error for RootFindingError {}

/// Trait for representing a nonlinear equation f(x) = 0
pub trait NonlinearFunction {
    /// Evaluate the function at point x
    fn evaluate(&self, x: f64) -> f64;

    /// Get function name for debugging/logging
    fn name(&self) -> &str {
        "unnamed_function"
    }
}

/// Simple function wrapper for closures
pub struct ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    func: F,
    name: String,
}

impl<F> ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(func: F, name: String) -> Self {
        Self { func, name }
    }
}

impl<F> NonlinearFunction for ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> f64 {
        (self.func)(x)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Result of root finding
#[derive(Debug, Clone)]
pub struct RootFindingResult {
    pub root: f64,
    pub function_value: f64,
    pub iterations: usize,
    pub converged: bool,
    pub method: String,
}

/// Configuration for root finding methods
#[derive(Debug, Clone)]
pub struct RootFindingConfig {
    /// step tolerance |x_{n+1} - x_n|
    pub tolerance: f64,
    pub max_iterations: usize,
    pub verbose: bool,
}

impl Default for RootFindingConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.48e-8,
            max_iterations: 50,
            verbose: false,
        }
    }
}

/// Main structure for scalar root finding methods
pub struct ScalarRootFinder {
    config: RootFindingConfig,
}

impl ScalarRootFinder {
    /// Create a new ScalarRootFinder with default configuration
    pub fn new() -> Self {
        Self {
            config: RootFindingConfig::default(),
        }
    }

    /// Create a new ScalarRootFinder with custom configuration
    pub fn with_config(config: RootFindingConfig) -> Self {
        Self { config }
    }

    fn check_config(&self) -> Result<(), RootFindingError> {
        if !(self.config.tolerance > 0.0) {
            return Err(RootFindingError::InvalidInput(format!(
                "tolerance must be positive, got {}",
                self.config.tolerance
            )));
        }
        if self.config.max_iterations == 0 {
            return Err(RootFindingError::InvalidInput(
                "max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Solve with specific method
    pub fn solve_with_method<F>(
        &self,
        function: &F,
        method: RootFindingMethod,
        initial_guess: f64,
    ) -> Result<RootFindingResult, RootFindingError>
    where
        F: NonlinearFunction,
    {
        match method {
            RootFindingMethod::Secant => {
                // second point of the classic secant start
                let step = if initial_guess >= 0.0 { 1e-4 } else { -1e-4 };
                let x1 = initial_guess * (1.0 + 1e-4) + step;
                self.secant(function, initial_guess, x1)
            }
            RootFindingMethod::NewtonRaphson => self.newton_raphson(function, initial_guess),
        }
    }

    /////////////////////////////////////////METHODS///////////////////////////////////////////

    /// Secant method for finding roots
    /// Requires two initial guesses x0 and x1
    pub fn secant<F>(
        &self,
        function: &F,
        mut x0: f64,
        mut x1: f64,
    ) -> Result<RootFindingResult, RootFindingError>
    where
        F: NonlinearFunction,
    {
        self.check_config()?;
        let mut f0 = function.evaluate(x0);
        let mut f1 = function.evaluate(x1);
        if !f0.is_finite() || !f1.is_finite() {
            return Err(RootFindingError::NonFiniteIterate { iteration: 0, x: x0 });
        }
        if self.config.verbose {
            debug!("Secant method for function: {}", function.name());
            debug!("Initial guesses: x0 = {}, x1 = {}", x0, x1);
        }
        if f0 == 0.0 {
            return Ok(Self::converged(x0, f0, 0, "secant"));
        }

        let mut iterations = 0;
        while iterations < self.config.max_iterations {
            if f1 == f0 {
                return Err(RootFindingError::DerivativeZero { x: x1 });
            }
            let x2 = x1 - f1 * (x1 - x0) / (f1 - f0);
            let f2 = function.evaluate(x2);
            if !x2.is_finite() || !f2.is_finite() {
                return Err(RootFindingError::NonFiniteIterate {
                    iteration: iterations + 1,
                    x: x2,
                });
            }
            if self.config.verbose {
                debug!(
                    "Iteration {}: x = {:.10}, f(x) = {:.2e}",
                    iterations + 1,
                    x2,
                    f2
                );
            }
            if f2 == 0.0 || (x2 - x1).abs() < self.config.tolerance {
                return Ok(Self::converged(x2, f2, iterations + 1, "secant"));
            }
            x0 = x1;
            f0 = f1;
            x1 = x2;
            f1 = f2;
            iterations += 1;
        }
        warn!(
            "secant: {} iterations without convergence for {}",
            iterations,
            function.name()
        );
        Err(RootFindingError::MaxIterationsReached {
            iterations,
            last: x1,
        })
    }

    /// Newton-Raphson method, derivative by central difference
    pub fn newton_raphson<F>(
        &self,
        function: &F,
        mut x: f64,
    ) -> Result<RootFindingResult, RootFindingError>
    where
        F: NonlinearFunction,
    {
        self.check_config()?;
        if self.config.verbose {
            debug!("Newton-Raphson method for function: {}", function.name());
            debug!("Initial guess: x0 = {}", x);
            debug!("Tolerance: {}", self.config.tolerance);
        }

        let mut iterations = 0;
        while iterations < self.config.max_iterations {
            let fx = function.evaluate(x);
            if !fx.is_finite() {
                return Err(RootFindingError::NonFiniteIterate {
                    iteration: iterations,
                    x,
                });
            }
            if self.config.verbose {
                debug!(
                    "Iteration {}: x = {:.10}, f(x) = {:.2e}",
                    iterations + 1,
                    x,
                    fx
                );
            }
            if fx == 0.0 {
                return Ok(Self::converged(x, fx, iterations, "newton_raphson"));
            }

            let h = 1e-8 * x.abs().max(1.0);
            let fpx = (function.evaluate(x + h) - function.evaluate(x - h)) / (2.0 * h);
            if !fpx.is_finite() {
                return Err(RootFindingError::NonFiniteIterate {
                    iteration: iterations,
                    x,
                });
            }
            if fpx == 0.0 {
                return Err(RootFindingError::DerivativeZero { x });
            }

            let x_new = x - fx / fpx;
            if (x_new - x).abs() < self.config.tolerance {
                let f_new = function.evaluate(x_new);
                if !f_new.is_finite() {
                    return Err(RootFindingError::NonFiniteIterate {
                        iteration: iterations + 1,
                        x: x_new,
                    });
                }
                return Ok(Self::converged(
                    x_new,
                    f_new,
                    iterations + 1,
                    "newton_raphson",
                ));
            }

            x = x_new;
            iterations += 1;
        }
        warn!(
            "newton_raphson: {} iterations without convergence for {}",
            iterations,
            function.name()
        );
        Err(RootFindingError::MaxIterationsReached {
            iterations,
            last: x,
        })
    }

    fn converged(root: f64, function_value: f64, iterations: usize, method: &str) -> RootFindingResult {
        RootFindingResult {
            root,
            function_value,
            iterations,
            converged: true,
            method: method.to_string(),
        }
    }
}
