//! # DTM task documents
//!
//! A task document describes one price reduction problem and how to solve it:
//!
//! ```text
//! problem
//!   alpha: 5.0
//!   beta: 5.0
//! boundary
//!   t1: 1.0
//!   y1: 0.9
//! solver
//!   k: 10
//!   // newton, secant or symbolic
//!   method: newton
//!   initial_guess: -0.5
//!   max_iterations: 1500
//!   tolerance: 1.48e-8
//!   loglevel: info
//! postprocessing
//!   save_csv: model.csv
//!   n_points: 30
//!   compare: true
//! ```
//!
//! Only `alpha`, `beta` and `k` are required. Section titles and keys are case
//! insensitive and accept a few pseudonyms (`order` for `k`, `gamma0` for
//! `initial_guess`, `solver_settings` for `solver` ...).
use crate::Utils::logger::{init_logger, parse_loglevel, save_model_to_csv};
use crate::Utils::task_parser::{DocumentMap, DocumentParser, SectionMap, Value};
use crate::numerical::DTM::calibrator::{BoundaryCondition, CalibrationMethod, NumericOptions};
use crate::numerical::DTM::dtm_errors::{DtmError, DtmResult};
use crate::numerical::DTM::evaluator::PowerRule;
use crate::numerical::DTM::fitter::{FittedModel, ModelFitter};
use crate::numerical::DTM::recurrence::{PricingRecurrence, TruncationOrder};
use crate::numerical::optimization::minimize_scalar::RootFindingMethod;
use crate::numerical::political_pricing::PricingComparison;
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct DtmTask {
    pub alpha: f64,
    pub beta: f64,
    pub boundary: BoundaryCondition,
    pub k: usize,
    pub method: CalibrationMethod,
    pub power_rule: PowerRule,
    pub loglevel: Option<String>,
    pub save_csv: Option<PathBuf>,
    pub n_points: usize,
    pub compare: bool,
}

fn headers_pseudonims() -> HashMap<String, Vec<String>> {
    HashMap::from([
        (
            "problem".to_string(),
            vec!["parameters".to_string(), "problem_parameters".to_string()],
        ),
        (
            "boundary".to_string(),
            vec![
                "bounds".to_string(),
                "boundaries".to_string(),
                "boundary_conditions".to_string(),
            ],
        ),
        (
            "solver".to_string(),
            vec![
                "solver_settings".to_string(),
                "solve_settings".to_string(),
                "solving_settings".to_string(),
            ],
        ),
        (
            "postprocessing".to_string(),
            vec!["postprocess".to_string(), "output".to_string()],
        ),
    ])
}

fn field_name_pseudonims() -> HashMap<String, Vec<String>> {
    HashMap::from([
        (
            "k".to_string(),
            vec!["order".to_string(), "truncation_order".to_string()],
        ),
        (
            "initial_guess".to_string(),
            vec!["gamma0".to_string(), "x0".to_string(), "initial_gamma".to_string()],
        ),
        (
            "max_iterations".to_string(),
            vec!["max_iter".to_string(), "maxiter".to_string()],
        ),
        (
            "tolerance".to_string(),
            vec!["tol".to_string(), "abs_tolerance".to_string()],
        ),
    ])
}

fn first_value<'a>(section: Option<&'a SectionMap>, key: &str) -> Option<&'a Value> {
    section?.get(key)?.as_ref()?.first()
}

fn get_f64(section: Option<&SectionMap>, title: &str, key: &str) -> DtmResult<Option<f64>> {
    match first_value(section, key) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| DtmError::Config(format!("{}.{} must be a number, got '{}'", title, key, v))),
    }
}

fn get_usize(section: Option<&SectionMap>, title: &str, key: &str) -> DtmResult<Option<usize>> {
    match first_value(section, key) {
        None => Ok(None),
        Some(Value::Integer(i)) if *i >= 0 => Ok(Some(*i as usize)),
        Some(v) => Err(DtmError::Config(format!(
            "{}.{} must be a non-negative integer, got '{}'",
            title, key, v
        ))),
    }
}

fn required(value: Option<f64>, title: &str, key: &str) -> DtmResult<f64> {
    value.ok_or_else(|| DtmError::Config(format!("missing {}.{}", title, key)))
}

/// `k` goes through `TruncationOrder` so negative and fractional orders are rejected
fn parse_truncation_order(value: Option<&Value>) -> DtmResult<usize> {
    let order = match value {
        None => return Err(DtmError::Config("missing solver.k".to_string())),
        Some(Value::Integer(i)) => TruncationOrder::try_from(*i)?,
        Some(Value::Float(f)) => TruncationOrder::try_from(*f)?,
        Some(other) => {
            return Err(DtmError::InvalidTruncationOrder(format!(
                "k = '{}' is not a number",
                other
            )));
        }
    };
    Ok(order.get())
}

impl DtmTask {
    pub fn from_document(doc: &DocumentMap) -> DtmResult<Self> {
        let problem = doc.get("problem");
        let boundary_section = doc.get("boundary");
        let solver = doc.get("solver");
        let post = doc.get("postprocessing");

        let alpha = required(get_f64(problem, "problem", "alpha")?, "problem", "alpha")?;
        let beta = required(get_f64(problem, "problem", "beta")?, "problem", "beta")?;
        let defaults = BoundaryCondition::default();
        let boundary = BoundaryCondition {
            t1: get_f64(boundary_section, "boundary", "t1")?.unwrap_or(defaults.t1),
            y1: get_f64(boundary_section, "boundary", "y1")?.unwrap_or(defaults.y1),
        };
        if boundary.t1 == 0.0 {
            return Err(DtmError::Config("boundary.t1 must be nonzero".to_string()));
        }

        let k = parse_truncation_order(first_value(solver, "k"))?;
        let method_name = match first_value(solver, "method") {
            None => "newton".to_string(),
            Some(v) => v.to_string().to_lowercase(),
        };
        let method = if method_name == "symbolic" {
            CalibrationMethod::Symbolic
        } else {
            let root_finder = RootFindingMethod::from_str(&method_name).map_err(|_| {
                DtmError::Config(format!(
                    "solver.method must be newton, secant or symbolic, got '{}'",
                    method_name
                ))
            })?;
            let d = NumericOptions::default();
            CalibrationMethod::Numeric(NumericOptions {
                initial_guess: get_f64(solver, "solver", "initial_guess")?.unwrap_or(d.initial_guess),
                max_iterations: get_usize(solver, "solver", "max_iterations")?.unwrap_or(d.max_iterations),
                tolerance: get_f64(solver, "solver", "tolerance")?.unwrap_or(d.tolerance),
                method: root_finder,
            })
        };
        let power_rule = match first_value(solver, "power_rule") {
            None => PowerRule::default(),
            Some(v) => PowerRule::from_str(&v.to_string())
                .map_err(|_| DtmError::Config(format!("unknown solver.power_rule '{}'", v)))?,
        };
        let loglevel = first_value(solver, "loglevel").map(|v| v.to_string());
        if let Some(level) = &loglevel {
            parse_loglevel(level)?;
        }

        let save_csv = match first_value(post, "save_csv") {
            None | Some(Value::Boolean(false)) => None,
            Some(Value::Boolean(true)) => Some(PathBuf::from("dtm_model.csv")),
            Some(v) => Some(PathBuf::from(v.to_string())),
        };
        let n_points = get_usize(post, "postprocessing", "n_points")?.unwrap_or(30);
        let compare = match first_value(post, "compare") {
            None => false,
            Some(v) => v.as_boolean().ok_or_else(|| {
                DtmError::Config(format!("postprocessing.compare must be true or false, got '{}'", v))
            })?,
        };

        Ok(Self {
            alpha,
            beta,
            boundary,
            k,
            method,
            power_rule,
            loglevel,
            save_csv,
            n_points,
            compare,
        })
    }

    /// Parses a task document, accepting section and key pseudonyms
    pub fn parse_task(input: &str) -> DtmResult<Self> {
        let mut parser = DocumentParser::new(input.to_owned());
        parser.with_pseudonims(Some(headers_pseudonims()), Some(field_name_pseudonims()));
        parser.parse_document().map_err(DtmError::Config)?;
        let doc = parser
            .get_result()
            .ok_or_else(|| DtmError::Config("No result after parsing".to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_file(path: &Path) -> DtmResult<Self> {
        let mut parser = DocumentParser::default();
        parser
            .setting_from_file(path.to_path_buf())
            .map_err(DtmError::Io)?;
        parser.with_pseudonims(Some(headers_pseudonims()), Some(field_name_pseudonims()));
        parser.parse_document().map_err(DtmError::Config)?;
        let doc = parser
            .get_result()
            .ok_or_else(|| DtmError::Config("No result after parsing".to_string()))?;
        Self::from_document(doc)
    }

    pub fn fitter(&self) -> ModelFitter<PricingRecurrence> {
        ModelFitter::new(
            PricingRecurrence::new(self.alpha, self.beta),
            self.boundary,
            self.method,
        )
        .with_power_rule(self.power_rule)
    }

    /// fits the model, then runs the requested postprocessing
    pub fn run(&self) -> DtmResult<(FittedModel, Option<PricingComparison>)> {
        init_logger(self.loglevel.as_deref(), false)?;
        let model = self.fitter().fit(self.k)?;
        if let Some(path) = &self.save_csv {
            save_model_to_csv(path, &model, self.n_points)?;
            info!("model saved to {:?}", path);
        }
        let comparison = if self.compare {
            let cmp = PricingComparison::compare(&model, self.alpha, self.beta, self.n_points)?;
            info!("\n{}", cmp.to_table());
            Some(cmp)
        } else {
            None
        };
        Ok((model, comparison))
    }
}

/// Writes a commented task template
pub fn create_template_file(path: &Path) -> DtmResult<()> {
    let form = r#"
    // DTM task template
    problem
        // P(t, y') = alpha*y'^2 + beta*(t^2 - 1)*y'^3
        alpha: 5.0
        beta: 5.0
    boundary
        // y(0) = 1 is fixed, y(t1) = y1
        t1: 1.0
        y1: 0.9
    solver
        // truncation order, non-negative integer
        k: 10
        // newton, secant or symbolic
        method: newton
        initial_guess: -0.5
        max_iterations: 1500
        tolerance: 1.48e-8
        // own_index or legacy
        power_rule: own_index
        // debug, info, warn, error or off
        loglevel: info
    postprocessing
        // file name or false
        save_csv: false
        n_points: 30
        compare: true
    "#;
    std::fs::write(path, form)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    const TASK: &str = "
    problem
        alpha: 5
        beta: 5.0
    boundary
        y1: 0.9
    solver
        k: 6
        method: newton
        tolerance: 1e-10
    ";

    #[test]
    fn test_parse_minimal_task() {
        let task = DtmTask::parse_task(TASK).unwrap();
        assert_eq!(task.alpha, 5.0);
        assert_eq!(task.beta, 5.0);
        assert_eq!(task.k, 6);
        assert_eq!(task.boundary, BoundaryCondition::default());
        let CalibrationMethod::Numeric(opts) = task.method else {
            panic!("newton is numeric");
        };
        assert_eq!(opts.tolerance, 1e-10);
        assert_eq!(opts.initial_guess, -0.5);
        assert_eq!(opts.max_iterations, 1500);
        assert_eq!(task.save_csv, None);
        assert_eq!(task.n_points, 30);
        assert!(!task.compare);
    }

    #[test]
    fn test_pseudonyms() {
        let input = "
        PARAMETERS alpha: 1.75 beta: 5
        solver_settings
            order: 7
            method: Secant
            gamma0: -0.2
            max_iter: 40
        ";
        let task = DtmTask::parse_task(input).unwrap();
        assert_eq!(task.alpha, 1.75);
        assert_eq!(task.k, 7);
        assert_eq!(
            task.method,
            CalibrationMethod::Numeric(NumericOptions {
                initial_guess: -0.2,
                max_iterations: 40,
                tolerance: 1.48e-8,
                method: RootFindingMethod::Secant,
            })
        );
    }

    #[test]
    fn test_invalid_truncation_orders() {
        for k in ["-1", "2.5", "six", "1e19"] {
            let input = format!("problem alpha: 5 beta: 5\nsolver k: {}", k);
            assert!(
                matches!(DtmTask::parse_task(&input), Err(DtmError::InvalidTruncationOrder(_))),
                "k = {}",
                k
            );
        }
        let task = DtmTask::parse_task("problem alpha: 5 beta: 5\nsolver k: 4.0").unwrap();
        assert_eq!(task.k, 4);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            DtmTask::parse_task("solver k: 3"),
            Err(DtmError::Config(_))
        ));
        assert!(matches!(
            DtmTask::parse_task("problem alpha: 5 beta: 5"),
            Err(DtmError::Config(_))
        ));
        assert!(matches!(
            DtmTask::parse_task("problem alpha: 5 beta: 5\nsolver k: 3 method: bisection"),
            Err(DtmError::Config(_))
        ));
        assert!(matches!(
            DtmTask::parse_task("problem alpha: five beta: 5\nsolver k: 3"),
            Err(DtmError::Config(_))
        ));
        assert!(matches!(
            DtmTask::parse_task("problem alpha: 5 beta: 5\nsolver k: 3 loglevel: loud"),
            Err(DtmError::Config(_))
        ));
    }

    #[test]
    fn test_symbolic_task_runs() {
        let task = DtmTask::parse_task("problem alpha: 5 beta: 5\nsolver k: 4 method: symbolic").unwrap();
        assert_eq!(task.method, CalibrationMethod::Symbolic);
        let (model, cmp) = task.run().unwrap();
        assert_relative_eq!(model.gamma(), -0.055606505319343705, epsilon = 1e-7);
        assert!(cmp.is_none());
    }

    #[test]
    fn test_template_round_trip_and_run() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("task.txt");
        create_template_file(&template).unwrap();
        let mut task = DtmTask::from_file(&template).unwrap();
        assert_eq!(task.k, 10);
        assert_eq!(task.loglevel.as_deref(), Some("info"));
        assert!(task.compare);
        let csv_path = dir.path().join("model.csv");
        task.save_csv = Some(csv_path.clone());
        let (model, cmp) = task.run().unwrap();
        assert_relative_eq!(model.gamma(), -0.05383562067240937, epsilon = 1e-7);
        assert!(cmp.unwrap().model_is_better());
        let text = std::fs::read_to_string(csv_path).unwrap();
        assert_eq!(text.lines().count(), 31);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            DtmTask::from_file(&dir.path().join("nothing.txt")),
            Err(DtmError::Io(_))
        ));
    }
}
