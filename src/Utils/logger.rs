use crate::numerical::DTM::dtm_errors::{DtmError, DtmResult};
use crate::numerical::DTM::fitter::FittedModel;
use chrono::Local;
use csv::Writer;
use simplelog::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// "debug", "info", "warn", "error", "off"/"none"
pub fn parse_loglevel(level: &str) -> DtmResult<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        other => Err(DtmError::Config(format!(
            "loglevel must be debug, info, warn, error or off, got '{}'",
            other
        ))),
    }
}

/// Terminal logger, plus a `log_<date>_<time>.txt` file logger when `save_log` is set.
/// Returns the log file path. A logger installed earlier in the process is left in place.
pub fn init_logger(loglevel: Option<&str>, save_log: bool) -> DtmResult<Option<PathBuf>> {
    let log_option = match loglevel {
        Some(level) => parse_loglevel(level)?,
        None => LevelFilter::Info,
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let mut log_path = None;
    if save_log {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = PathBuf::from(format!("log_{}.txt", date_and_time));
        loggers.push(WriteLogger::new(
            log_option,
            Config::default(),
            File::create(&name)?,
        ));
        log_path = Some(name);
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => Ok(log_path),
        Err(_) => Ok(None),
    }
}

/// `n` evenly spaced points from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let h = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * h).collect()
        }
    }
}

/// Writes `t, y, straight_line` rows on `n_points` points of [0, t1]; the straight line
/// joins (0, 1) and (t1, y1).
pub fn save_model_to_csv(path: &Path, model: &FittedModel, n_points: usize) -> DtmResult<()> {
    let boundary = model.boundary();
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["t", "y", "straight_line"])?;
    for t in linspace(0.0, boundary.t1, n_points) {
        let line = 1.0 + (boundary.y1 - 1.0) * t / boundary.t1;
        writer.write_record(&[t.to_string(), model.eval(t).to_string(), line.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::DTM::calibrator::BoundaryCondition;
    use crate::numerical::DTM::evaluator::PowerRule;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_loglevels() {
        assert_eq!(parse_loglevel("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_loglevel(" Warn ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_loglevel("none").unwrap(), LevelFilter::Off);
        assert!(matches!(parse_loglevel("loud"), Err(DtmError::Config(_))));
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.5, 1.0, 1), vec![0.5]);
        let ts = linspace(0.0, 1.0, 5);
        assert_eq!(ts.len(), 5);
        assert_eq!(ts[0], 0.0);
        assert_relative_eq!(ts[4], 1.0);
        assert_relative_eq!(ts[1], 0.25);
    }

    #[test]
    fn test_save_model_to_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.csv");
        // y = 1 - 0.1 t
        let model = FittedModel::new(
            1,
            -0.1,
            vec![1.0, -0.1],
            BoundaryCondition::default(),
            PowerRule::OwnIndex,
        );
        save_model_to_csv(&path, &model, 3).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["t", "y", "straight_line"]);
        let rows: Vec<Vec<f64>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 3);
        for row in rows {
            assert_relative_eq!(row[1], row[2], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let model = FittedModel::new(0, 0.0, vec![1.0], BoundaryCondition::default(), PowerRule::OwnIndex);
        let res = save_model_to_csv(&dir.path().join("no_such_dir").join("m.csv"), &model, 2);
        assert!(matches!(res, Err(DtmError::Io(_))));
    }
}
