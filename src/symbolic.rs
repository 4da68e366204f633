#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! # Exact algebra in one unknown
//!
//! The symbolic side of the differential transform: every coefficient `Y(r)` computed in
//! symbolic mode is a rational function of the single unknown `gamma = Y(1)` with exact
//! rational coefficients, so no floating point drift accumulates over deep recurrences.
///
///# Example
/// ```
/// use RustedDTM::symbolic::symbolic_rational::RationalFunction;
/// use RustedDTM::symbolic::symbolic_solve::solve_univariate;
/// // 1 + gamma - 9/10 = 0
/// let gamma = RationalFunction::variable();
/// let residual = RationalFunction::from_integer(1) + gamma
///     - RationalFunction::from_integer(9).checked_div(&RationalFunction::from_integer(10)).unwrap();
/// let roots = solve_univariate(&residual);
/// assert!((roots.real_roots()[0] + 0.1).abs() < 1e-15);
/// ```
/// ________________________________________________________________________________________________________________________________
/// dense polynomials with `BigRational` coefficients, Euclidean division and gcd
pub mod symbolic_polynomial;
/// reduced rational functions: the field used by the symbolic mode of the recurrence
pub mod symbolic_rational;
/// roots of rational functions: closed forms and companion matrix eigenvalues
pub mod symbolic_solve;
