use crate::Utils::logger::{init_logger, save_model_to_csv};
use crate::numerical::DTM::calibrator::{
    BoundaryCondition, CalibrationMethod, GammaCalibrator, NumericOptions,
};
use crate::numerical::DTM::driver::DifferentialTransform;
use crate::numerical::DTM::fitter::{CoefficientCache, ModelFitter, fit_parameter_sweep};
use crate::numerical::DTM::recurrence::PricingRecurrence;
use crate::numerical::DTM::task_parser_dtm::{DtmTask, create_template_file};
use crate::numerical::optimization::minimize_scalar::RootFindingMethod;
use crate::numerical::political_pricing::PricingComparison;
use log::{error, info};
use std::path::PathBuf;

pub fn dtm_examples(example: usize) {
    if let Err(e) = init_logger(Some("info"), false) {
        eprintln!("logger was not initialized: {}", e);
    }
    match example {
        0 => {
            // alpha = beta = 5, k = 10: the fitted path beats the straight line
            let mut fitter = ModelFitter::new(
                PricingRecurrence::new(5.0, 5.0),
                BoundaryCondition::default(),
                CalibrationMethod::default(),
            );
            match fitter.fit(10) {
                Ok(model) => {
                    info!("gamma = {}", model.gamma());
                    info!("y(t) at 0, 0.25, 0.5, 0.75, 1: {:?}", model.eval_many(&[0.0, 0.25, 0.5, 0.75, 1.0]));
                    match PricingComparison::compare(&model, 5.0, 5.0, 30) {
                        Ok(cmp) => info!("\n{}\n model is better: {}", cmp.to_table(), cmp.model_is_better()),
                        Err(e) => error!("{}", e),
                    }
                }
                Err(e) => error!("{}", e),
            }
        }
        1 => {
            // alpha = 7/4, beta = 5 at two truncation orders, secant this time
            let method = CalibrationMethod::Numeric(NumericOptions {
                method: RootFindingMethod::Secant,
                ..NumericOptions::default()
            });
            let mut fitter = ModelFitter::new(
                PricingRecurrence::new(1.75, 5.0),
                BoundaryCondition::default(),
                method,
            )
            .with_cache(CoefficientCache::new());
            for k in [5, 7] {
                match fitter.fit(k) {
                    Ok(model) => {
                        info!("k = {}, gamma = {}", k, model.gamma());
                        if let Ok(cmp) = PricingComparison::compare(&model, 1.75, 5.0, 30) {
                            info!("\n{}", cmp.to_table());
                        }
                    }
                    Err(e) => error!("k = {}: {}", k, e),
                }
            }
        }
        2 => {
            // exact residual in gamma against Newton on the numeric residual
            let driver = DifferentialTransform::new(PricingRecurrence::new(5.0, 5.0));
            let calibrator = GammaCalibrator::new(&driver, BoundaryCondition::default());
            for k in 2..=6 {
                if let Ok(residual) = calibrator.residual_symbolic(k) {
                    info!("k = {}, residual(gamma) = {}", k, residual);
                }
                let symbolic = calibrator.calibrate(k, &CalibrationMethod::Symbolic);
                let numeric = calibrator.calibrate(k, &CalibrationMethod::default());
                match (symbolic, numeric) {
                    (Ok(s), Ok(n)) => info!(
                        "k = {}: symbolic {} (roots {:?}), numeric {} after {} iterations",
                        k, s.gamma, s.candidate_roots, n.gamma, n.iterations
                    ),
                    (s, n) => error!("k = {}: {:?} / {:?}", k, s.err(), n.err()),
                }
            }
        }
        3 => {
            // task document: template written, parsed and run, model saved to csv
            let dir = std::env::temp_dir();
            let task_path = dir.join("dtm_task.txt");
            let result = create_template_file(&task_path)
                .and_then(|_| DtmTask::from_file(&task_path))
                .and_then(|mut task| {
                    task.save_csv = Some(dir.join("dtm_model.csv"));
                    task.run()
                });
            match result {
                Ok((model, _)) => info!("task solved, gamma = {}", model.gamma()),
                Err(e) => error!("{}", e),
            }
        }
        4 => {
            // independent problems in parallel
            let parameters: Vec<(f64, f64)> =
                [0.5, 1.0, 1.75, 3.0, 5.0].iter().map(|&alpha| (alpha, 5.0)).collect();
            let results = fit_parameter_sweep(&parameters, 7, BoundaryCondition::default(), CalibrationMethod::default());
            for ((alpha, beta), res) in parameters.iter().zip(results) {
                match res {
                    Ok(model) => info!("alpha = {}, beta = {}: gamma = {}", alpha, beta, model.gamma()),
                    Err(e) => error!("alpha = {}, beta = {}: {}", alpha, beta, e),
                }
            }
        }
        5 => {
            // symbolic calibration of k = 10 written to csv next to the straight line
            let mut fitter = ModelFitter::new(
                PricingRecurrence::new(5.0, 5.0),
                BoundaryCondition::default(),
                CalibrationMethod::Symbolic,
            );
            let path = PathBuf::from("dtm_k10.csv");
            match fitter.fit(10).and_then(|model| save_model_to_csv(&path, &model, 50)) {
                Ok(()) => info!("saved to {:?}", path),
                Err(e) => error!("{}", e),
            }
        }
        _ => {
            println!("example not found");
        }
    }
}
