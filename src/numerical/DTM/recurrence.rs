//! # r-th differential transform of the price reduction Euler-Lagrange equation
//!
//! The penalty `P(t, y') = alpha*y'^2 + beta*(t^2 - 1)*y'^3` with Lagrangian `P - y`
//! leads to the Euler-Lagrange equation
//!
//! `2*alpha*y'' + 6*beta*(t*y'^2 + (t^2 - 1)*y'*y'') + 1 = 0`
//!
//! Equating its r-th Taylor coefficient at t = 0 to zero gives, for r >= 1,
//!
//! `Y(r+2) = 6*beta*(S(r) + r*Y(r)*Y(1) - 2*r*(r+1)*Y(r+1)*Y(2)) / (2*(r+1)*(r+2)*(3*beta*Y(1) - alpha))`
//!
//! with `S(r) = sum_{m=0}^{r-2} [(m+1)(m+2)Y(m+2)(r-m-1)Y(r-m-1) + (m+1)(r-m)Y(m+1)Y(r-m)
//! - (m+1)(m+2)Y(m+2)(r-m+1)Y(r-m+1)]`, and the closed form `Y(2) = 1/(4*(3*beta*Y(1) - alpha))`
//! from r = 0.
//!
//! The table is filled left to right, each `Y(r)` reads only the already computed prefix.
use crate::numerical::DTM::driver::TransformRecurrence;
use crate::numerical::DTM::dtm_errors::{DtmError, DtmResult};
use crate::numerical::DTM::transform_field::TransformField;
use std::fmt;

/// Number of series terms past Y(0). Raw orders coming from task files or user input
/// are validated here, before any coefficient is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TruncationOrder(pub usize);

/// largest order the O(k^2) table is built for
pub const MAX_TRUNCATION_ORDER: usize = 10_000;

fn too_large<T: fmt::Display>(k: T) -> DtmError {
    DtmError::InvalidTruncationOrder(format!(
        "k = {} exceeds the maximum order {}",
        k, MAX_TRUNCATION_ORDER
    ))
}

impl TruncationOrder {
    pub fn new(k: usize) -> DtmResult<Self> {
        if k > MAX_TRUNCATION_ORDER {
            return Err(too_large(k));
        }
        Ok(TruncationOrder(k))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for TruncationOrder {
    type Error = DtmError;
    fn try_from(k: i64) -> Result<Self, Self::Error> {
        let k = usize::try_from(k)
            .map_err(|_| DtmError::InvalidTruncationOrder(format!("k = {} is negative", k)))?;
        TruncationOrder::new(k)
    }
}

impl TryFrom<f64> for TruncationOrder {
    type Error = DtmError;
    fn try_from(k: f64) -> Result<Self, Self::Error> {
        if !k.is_finite() || k.fract() != 0.0 {
            return Err(DtmError::InvalidTruncationOrder(format!(
                "k = {} is not an integer",
                k
            )));
        }
        if k < 0.0 {
            return Err(DtmError::InvalidTruncationOrder(format!("k = {} is negative", k)));
        }
        if k > MAX_TRUNCATION_ORDER as f64 {
            return Err(too_large(k));
        }
        TruncationOrder::new(k as usize)
    }
}

impl fmt::Display for TruncationOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRecurrence {
    pub alpha: f64,
    pub beta: f64,
}

impl PricingRecurrence {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }
}

impl TransformRecurrence for PricingRecurrence {
    fn coefficients<F: TransformField>(&self, k: usize, gamma: F) -> DtmResult<Vec<F>> {
        let alpha = F::from_f64(self.alpha)?;
        let beta = F::from_f64(self.beta)?;
        let n = F::from_usize;
        let k = TruncationOrder::new(k)?.get();

        let mut ys: Vec<F> = Vec::with_capacity(k + 1);
        ys.push(F::one()); // y(0) = 1
        if k == 0 {
            return Ok(ys);
        }
        ys.push(gamma.clone());
        if k == 1 {
            return Ok(ys);
        }
        // leading coefficient of y'' at t = 0
        let lead = n(3) * beta.clone() * gamma.clone() - alpha;
        let y2 = F::one()
            .checked_div(&(n(4) * lead.clone()))
            .ok_or(DtmError::SingularCoefficient {
                index: 2,
                mode: F::MODE,
            })?;
        ys.push(y2);

        for index in 3..=k {
            let r = index - 2;
            let delta = n(2 * (r + 1) * (r + 2)) * lead.clone();
            let add_term = n(r) * ys[r].clone() * gamma.clone()
                - n(2 * r * (r + 1)) * ys[r + 1].clone() * ys[2].clone();
            let mut summatory = F::zero();
            for m in 0..r - 1 {
                summatory = summatory
                    + n((m + 1) * (m + 2)) * ys[m + 2].clone() * n(r - m - 1) * ys[r - m - 1].clone()
                    + n((m + 1) * (r - m)) * ys[m + 1].clone() * ys[r - m].clone()
                    - n((m + 1) * (m + 2)) * ys[m + 2].clone() * n(r - m + 1) * ys[r - m + 1].clone();
            }
            let numerator = n(6) * beta.clone() * (summatory + add_term);
            let y = numerator
                .checked_div(&delta)
                .ok_or(DtmError::SingularCoefficient {
                    index,
                    mode: F::MODE,
                })?;
            ys.push(y);
        }
        Ok(ys)
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.alpha, self.beta]
    }

    fn name(&self) -> String {
        format!("pricing(alpha = {}, beta = {})", self.alpha, self.beta)
    }
}
