pub mod api;
pub mod combo;
pub mod config;
pub mod dashboard;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod notes;
pub mod storage;
pub mod summary;
pub mod telemetry;
pub mod types;

#[cfg(feature = "python")]
mod py;

use serde::Deserialize;
use serde_path_to_error as spte;

pub use api::{HttpPunchClient, PunchSource, StaticPunchSource};
pub use combo::{ComboBuilder, ComboEntry, IdGenerator, SequentialIds, UuidIds};
pub use config::ApiConfig;
pub use dashboard::{Dashboard, DashboardEvent, DashboardState};
pub use entry::{EntryAction, EntryMode, EntryState};
pub use error::FetchError;
pub use metrics::{aggregate, aggregate_with};
pub use notes::{NoteForm, NotesHistory};
pub use storage::{load_notes, save_notes};
pub use types::*;

fn parse_json<T: for<'de> Deserialize<'de>>(what: &str, json_in: &str) -> Result<T, String> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    spte::deserialize(&mut de).map_err(|e| format!("parse error ({what}) at {}: {}", e.path(), e))
}

/// JSON inn (liste med `PunchRecord`) -> JSON ut (`AggregateMetrics`).
/// `policy_json` er valgfri: "zero_fill" | "skip_missing".
pub fn aggregate_json(records_json: &str, policy_json: Option<&str>) -> Result<String, String> {
    let records: Vec<PunchRecord> = parse_json("records", records_json)?;
    let policy: AveragingPolicy = match policy_json {
        Some(p) => parse_json("policy", p)?,
        None => AveragingPolicy::default(),
    };
    let out = metrics::aggregate_with(&records, policy);
    serde_json::to_string(&out).map_err(|e| e.to_string())
}

/// JSON inn (poster + valgfrie økter) -> fullt `PunchMetrics`-objekt.
pub fn punch_metrics_json(records_json: &str, sessions_json: Option<&str>) -> Result<String, String> {
    let records: Vec<PunchRecord> = parse_json("records", records_json)?;
    let sessions: Vec<TrainingSession> = match sessions_json {
        Some(s) => parse_json("sessions", s)?,
        None => Vec::new(),
    };
    let out = metrics::punch_metrics(&records, &sessions);
    serde_json::to_string(&out).map_err(|e| e.to_string())
}

/// Rå respons fra GET /punch-analysis -> dashboard-metrikk (gyldige poster + avvist-antall).
pub fn fetched_metrics_json(response_json: &str, policy: AveragingPolicy) -> Result<String, String> {
    let outcome = api::parse_punch_analysis(response_json).map_err(|e| e.to_string())?;
    let m = metrics::fetched_metrics(&outcome.records, policy);
    let mut v = serde_json::to_value(&m).map_err(|e| e.to_string())?;
    v["rejected"] = serde_json::to_value(&outcome.rejected).map_err(|e| e.to_string())?;
    Ok(v.to_string())
}
