use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::types::AveragingPolicy;

// ──────────────────────────────────────────────────────────────────────────────
// JSON-inn/JSON-ut; Python-siden holder seg til str.
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
#[pyo3(signature = (records_json, policy=None))]
fn aggregate_metrics_json(records_json: &str, policy: Option<&str>) -> PyResult<String> {
    let policy_json = match policy {
        None => None,
        Some("zero_fill") => Some(r#""zero_fill""#),
        Some("skip_missing") => Some(r#""skip_missing""#),
        Some(other) => {
            return Err(PyValueError::new_err(format!(
                "ukjent policy '{other}' (forventet zero_fill eller skip_missing)"
            )))
        }
    };
    crate::aggregate_json(records_json, policy_json).map_err(PyValueError::new_err)
}

#[pyfunction]
#[pyo3(signature = (records_json, sessions_json=None))]
fn punch_metrics_json(records_json: &str, sessions_json: Option<&str>) -> PyResult<String> {
    crate::punch_metrics_json(records_json, sessions_json).map_err(PyValueError::new_err)
}

#[pyfunction]
#[pyo3(signature = (response_json, skip_missing=false))]
fn fetched_metrics_json(response_json: &str, skip_missing: bool) -> PyResult<String> {
    let policy = if skip_missing {
        AveragingPolicy::SkipMissing
    } else {
        AveragingPolicy::ZeroFill
    };
    crate::fetched_metrics_json(response_json, policy).map_err(PyValueError::new_err)
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-MODUL
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn strikemetric_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(aggregate_metrics_json, m)?)?;
    m.add_function(wrap_pyfunction!(punch_metrics_json, m)?)?;
    m.add_function(wrap_pyfunction!(fetched_metrics_json, m)?)?;
    Ok(())
}
