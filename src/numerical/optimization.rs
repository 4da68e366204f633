/// scalar root finding: Newton-Raphson and secant iterations with an iteration cap
pub mod minimize_scalar;
