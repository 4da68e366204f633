use crate::numerical::optimization::minimize_scalar::RootFindingError;
use std::fmt;

/// Error types of the differential transform solver
#[derive(Debug, Clone)]
pub enum DtmError {
    /// truncation order is negative, not an integer, or too small for the operation
    InvalidTruncationOrder(String),
    /// a recurrence denominator vanished exactly
    SingularCoefficient { index: usize, mode: &'static str },
    /// the numeric root finder failed to satisfy its tolerance
    Convergence(RootFindingError),
    /// the selected symbolic root has a nonzero imaginary part
    NonRealRoot { re: f64, im: f64 },
    /// the boundary residual has no isolated root in gamma
    NoRoots,
    /// a problem parameter that must be finite is NaN or infinite
    NonFiniteParameter(f64),
    Config(String),
    Quadrature(String),
    Io(String),
}

impl fmt::Display for DtmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DtmError::InvalidTruncationOrder(msg) => {
                write!(f, "Invalid truncation order: {}", msg)
            }
            DtmError::SingularCoefficient { index, mode } => write!(
                f,
                "Singular coefficient: denominator of Y({}) is zero ({} mode)",
                index, mode
            ),
            DtmError::Convergence(e) => write!(f, "Calibration did not converge: {}", e),
            DtmError::NonRealRoot { re, im } => {
                write!(f, "Selected root is not real: {} + {}i", re, im)
            }
            DtmError::NoRoots => write!(f, "Boundary residual has no roots in gamma"),
            DtmError::NonFiniteParameter(value) => {
                write!(f, "Problem parameter must be finite, got {}", value)
            }
            DtmError::Config(msg) => write!(f, "Task configuration error: {}", msg),
            DtmError::Quadrature(msg) => write!(f, "Quadrature error: {}", msg),
            DtmError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for DtmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DtmError::Convergence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RootFindingError> for DtmError {
    fn from(e: RootFindingError) -> Self {
        DtmError::Convergence(e)
    }
}

impl From<std::io::Error> for DtmError {
    fn from(e: std::io::Error) -> Self {
        DtmError::Io(e.to_string())
    }
}

impl From<csv::Error> for DtmError {
    fn from(e: csv::Error) -> Self {
        DtmError::Io(e.to_string())
    }
}

pub type DtmResult<T> = Result<T, DtmError>;
