//! # Model fitting
//!
//! `ModelFitter::fit` calibrates gamma, recomputes the recurrence once in numeric mode at
//! that gamma and binds the resulting coefficients to the power series evaluator.
//! The recomputation can go through a caller-owned `CoefficientCache`.
use crate::numerical::DTM::calibrator::{
    BoundaryCondition, CalibrationMethod, CalibrationReport, GammaCalibrator,
};
use crate::numerical::DTM::driver::{DifferentialTransform, TransformRecurrence};
use crate::numerical::DTM::dtm_errors::DtmResult;
use crate::numerical::DTM::evaluator::{
    PowerRule, eval_polynomial, eval_polynomial_derivative, polynomial_model,
};
use crate::numerical::DTM::recurrence::PricingRecurrence;
use log::{debug, info};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// Calibrated, fully numeric power series approximation of y(t) on [0, t1].
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    k: usize,
    gamma: f64,
    coefficients: Vec<f64>,
    boundary: BoundaryCondition,
    power_rule: PowerRule,
}

impl FittedModel {
    pub fn new(
        k: usize,
        gamma: f64,
        coefficients: Vec<f64>,
        boundary: BoundaryCondition,
        power_rule: PowerRule,
    ) -> Self {
        Self {
            k,
            gamma,
            coefficients,
            boundary,
            power_rule,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    pub fn power_rule(&self) -> PowerRule {
        self.power_rule
    }

    pub fn eval(&self, t: f64) -> f64 {
        match self.power_rule {
            PowerRule::OwnIndex => eval_polynomial(t, &self.coefficients),
            rule => polynomial_model(&t, &self.coefficients, rule),
        }
    }

    pub fn eval_many(&self, ts: &[f64]) -> Vec<f64> {
        ts.iter().map(|&t| self.eval(t)).collect()
    }

    /// exact derivative of the series, independent of the power rule
    pub fn eval_derivative(&self, t: f64, order: usize) -> f64 {
        eval_polynomial_derivative(t, &self.coefficients, order)
    }

    /// owning closure t -> y(t)
    pub fn as_callable(&self) -> impl Fn(f64) -> f64 + Send + Sync + 'static {
        let model = self.clone();
        move |t| model.eval(t)
    }

    /// y(t1) - y1
    pub fn boundary_residual(&self) -> f64 {
        self.eval(self.boundary.t1) - self.boundary.y1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    k: usize,
    parameters: Vec<u64>,
    gamma: u64,
}

/// Numeric coefficient sequences keyed by (k, parameters, gamma), compared bitwise.
/// Owned and passed by the caller, nothing is shared between fitters implicitly.
#[derive(Debug, Clone, Default)]
pub struct CoefficientCache {
    entries: HashMap<CacheKey, Vec<f64>>,
    hits: usize,
    misses: usize,
}

impl CoefficientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<R: TransformRecurrence>(
        &mut self,
        driver: &DifferentialTransform<R>,
        k: usize,
        gamma: f64,
    ) -> DtmResult<Vec<f64>> {
        let key = CacheKey {
            k,
            parameters: driver
                .recurrence()
                .parameters()
                .iter()
                .map(|p| p.to_bits())
                .collect(),
            gamma: gamma.to_bits(),
        };
        if let Some(ys) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(ys.clone());
        }
        self.misses += 1;
        let ys = driver.numeric(k, gamma)?;
        self.entries.insert(key, ys.clone());
        Ok(ys)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

pub struct ModelFitter<R: TransformRecurrence> {
    driver: DifferentialTransform<R>,
    boundary: BoundaryCondition,
    method: CalibrationMethod,
    power_rule: PowerRule,
    cache: Option<CoefficientCache>,
    last_report: Option<CalibrationReport>,
}

impl<R: TransformRecurrence> ModelFitter<R> {
    pub fn new(recurrence: R, boundary: BoundaryCondition, method: CalibrationMethod) -> Self {
        Self {
            driver: DifferentialTransform::new(recurrence),
            boundary,
            method,
            power_rule: PowerRule::OwnIndex,
            cache: None,
            last_report: None,
        }
    }

    pub fn with_cache(mut self, cache: CoefficientCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// evaluation rule of the residual and of the produced models
    pub fn with_power_rule(mut self, power_rule: PowerRule) -> Self {
        self.power_rule = power_rule;
        self
    }

    pub fn set_method(&mut self, method: CalibrationMethod) {
        self.method = method;
    }

    pub fn driver(&self) -> &DifferentialTransform<R> {
        &self.driver
    }

    pub fn cache(&self) -> Option<&CoefficientCache> {
        self.cache.as_ref()
    }

    /// hands the cache back to the caller
    pub fn take_cache(&mut self) -> Option<CoefficientCache> {
        self.cache.take()
    }

    pub fn last_report(&self) -> Option<&CalibrationReport> {
        self.last_report.as_ref()
    }

    pub fn fit(&mut self, k: usize) -> DtmResult<FittedModel> {
        let begin = Instant::now();
        let calibrator =
            GammaCalibrator::new(&self.driver, self.boundary).with_power_rule(self.power_rule);
        let report = calibrator.calibrate(k, &self.method)?;
        let coefficients = match self.cache.as_mut() {
            Some(cache) => cache.get_or_compute(&self.driver, k, report.gamma)?,
            None => self.driver.numeric(k, report.gamma)?,
        };
        debug!("fitted coefficients: {:?}", coefficients);
        let model = FittedModel::new(k, report.gamma, coefficients, self.boundary, self.power_rule);
        self.calc_statistics(&model, &report, begin.elapsed().as_secs_f64());
        self.last_report = Some(report);
        Ok(model)
    }

    fn calc_statistics(&self, model: &FittedModel, report: &CalibrationReport, elapsed: f64) {
        let mut builder = Builder::default();
        builder.push_record(["recurrence".to_string(), self.driver.recurrence().name()]);
        builder.push_record(["method".to_string(), report.method.to_string()]);
        builder.push_record(["truncation order k".to_string(), model.k().to_string()]);
        builder.push_record(["gamma = Y(1)".to_string(), format!("{:.15}", model.gamma())]);
        builder.push_record(["iterations".to_string(), report.iterations.to_string()]);
        builder.push_record([
            "candidate roots".to_string(),
            report.candidate_roots.len().to_string(),
        ]);
        builder.push_record([
            "boundary residual".to_string(),
            format!("{:e}", model.boundary_residual()),
        ]);
        if let Some(cache) = &self.cache {
            builder.push_record([
                "cache hits/misses".to_string(),
                format!("{}/{}", cache.hits(), cache.misses()),
            ]);
        }
        builder.push_record(["time, s".to_string(), format!("{:.6}", elapsed)]);
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table.to_string());
    }
}

/// Fits independent price reduction problems, one per (alpha, beta), in parallel.
/// Results keep the input order.
pub fn fit_parameter_sweep(
    parameters: &[(f64, f64)],
    k: usize,
    boundary: BoundaryCondition,
    method: CalibrationMethod,
) -> Vec<DtmResult<FittedModel>> {
    parameters
        .par_iter()
        .map(|&(alpha, beta)| {
            ModelFitter::new(PricingRecurrence::new(alpha, beta), boundary, method).fit(k)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::DTM::dtm_errors::DtmError;
    use approx::assert_relative_eq;

    fn default_fitter(alpha: f64, beta: f64) -> ModelFitter<PricingRecurrence> {
        ModelFitter::new(
            PricingRecurrence::new(alpha, beta),
            BoundaryCondition::default(),
            CalibrationMethod::default(),
        )
    }

    #[test]
    fn test_fit_satisfies_both_boundaries() {
        let mut fitter = default_fitter(5.0, 5.0);
        let model = fitter.fit(6).unwrap();
        assert_eq!(model.coefficients().len(), 7);
        assert_eq!(model.eval(0.0), 1.0);
        assert_relative_eq!(model.eval(1.0), 0.9, epsilon = 1e-6);
        assert!(model.boundary_residual().abs() < 1e-6);
        assert_relative_eq!(model.gamma(), model.coefficients()[1]);
        assert!(fitter.last_report().is_some());
    }

    #[test]
    fn test_callable_outlives_model() {
        let f = {
            let model = default_fitter(5.0, 5.0).fit(10).unwrap();
            model.as_callable()
        };
        assert_eq!(f(0.0), 1.0);
        assert_relative_eq!(f(1.0), 0.9, epsilon = 1e-6);
        // close to the straight line on the interior
        for t in [0.25, 0.5, 0.75] {
            assert!((f(t) - (1.0 - 0.1 * t)).abs() < 0.05);
        }
    }

    #[test]
    fn test_eval_many_and_derivative() {
        let model = default_fitter(5.0, 5.0).fit(7).unwrap();
        let ts = [0.0, 0.5, 1.0];
        let ys = model.eval_many(&ts);
        assert_eq!(ys.len(), 3);
        assert_eq!(ys[1], model.eval(0.5));
        assert_relative_eq!(model.eval_derivative(0.0, 1), model.gamma(), epsilon = 1e-15);
        assert_relative_eq!(
            model.eval_derivative(0.0, 2),
            2.0 * model.coefficients()[2],
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_symbolic_fit_matches_numeric_fit() {
        let numeric = default_fitter(5.0, 5.0).fit(5).unwrap();
        let mut fitter = default_fitter(5.0, 5.0);
        fitter.set_method(CalibrationMethod::Symbolic);
        let symbolic = fitter.fit(5).unwrap();
        assert_relative_eq!(symbolic.gamma(), numeric.gamma(), epsilon = 1e-7);
        for (a, b) in symbolic.coefficients().iter().zip(numeric.coefficients()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
        assert!(fitter.last_report().unwrap().candidate_roots.len() > 1);
    }

    #[test]
    fn test_cache_is_used_for_repeated_fits() {
        let mut fitter = default_fitter(5.0, 5.0).with_cache(CoefficientCache::new());
        let a = fitter.fit(6).unwrap();
        let b = fitter.fit(6).unwrap();
        assert_eq!(a, b);
        let cache = fitter.take_cache().unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        assert!(fitter.cache().is_none());
    }

    #[test]
    fn test_cache_keys_distinguish_parameters() {
        let mut cache = CoefficientCache::new();
        let d1 = DifferentialTransform::new(PricingRecurrence::new(5.0, 5.0));
        let d2 = DifferentialTransform::new(PricingRecurrence::new(1.75, 5.0));
        let y1 = cache.get_or_compute(&d1, 4, -0.05).unwrap();
        let y2 = cache.get_or_compute(&d2, 4, -0.05).unwrap();
        assert_ne!(y1, y2);
        cache.get_or_compute(&d1, 5, -0.05).unwrap();
        cache.get_or_compute(&d1, 4, -0.05).unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.hits(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_legacy_power_rule_model() {
        let mut fitter = default_fitter(5.0, 5.0).with_power_rule(PowerRule::LegacySequenceLength);
        let legacy = fitter.fit(6).unwrap();
        let current = default_fitter(5.0, 5.0).fit(6).unwrap();
        // the residual only looks at t1 = 1 where both rules agree
        assert_relative_eq!(legacy.gamma(), current.gamma(), epsilon = 1e-12);
        assert_eq!(legacy.eval(0.0), 0.0);
        assert_relative_eq!(legacy.eval(1.0), current.eval(1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_parameter_sweep_keeps_order() {
        let params = [(5.0, 5.0), (1.75, 5.0), (5.0, 5.0)];
        let results = fit_parameter_sweep(&params, 7, BoundaryCondition::default(), CalibrationMethod::default());
        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        let second = results[1].as_ref().unwrap();
        let third = results[2].as_ref().unwrap();
        assert_eq!(first, third);
        assert_relative_eq!(second.gamma(), -0.0448816911752196, epsilon = 1e-7);
    }

    #[test]
    fn test_fit_errors_surface() {
        let mut fitter = default_fitter(5.0, 5.0);
        assert!(matches!(fitter.fit(0), Err(DtmError::InvalidTruncationOrder(_))));
    }
}
