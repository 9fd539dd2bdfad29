// core/src/api.rs
use std::io::BufReader;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::IntoDeserializer;
use serde::Deserialize;
use serde_json::Value;
use serde_path_to_error as spte;
use ureq::Agent;

use crate::config::{ApiConfig, Endpoint};
use crate::error::FetchError;
use crate::types::{FetchOutcome, FetchedPunch, PunchRecord, PunchType, RejectedRecord};

/// Rå post slik backend leverer den (snake_case, camelCase aksepteres).
#[derive(Debug, Clone, Deserialize)]
struct PunchAnalysisIn {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default, alias = "userId")]
    user_id: Option<u64>,
    #[serde(default, alias = "punchType")]
    punch_type: Option<String>,
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    force: Option<f64>,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(default, alias = "createdAt", alias = "created_at")]
    timestamp: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// ISO-tid: RFC 3339, ellers naiv tid tolket som UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn validate(rec: PunchAnalysisIn) -> Result<FetchedPunch, String> {
    let punch_type = rec
        .punch_type
        .as_deref()
        .ok_or_else(|| "missing punch_type".to_string())?
        .parse::<PunchType>()
        .map_err(|e| e.to_string())?;

    let timestamp = match rec.timestamp.as_deref() {
        None => return Err("missing timestamp".into()),
        Some(ts) => parse_timestamp(ts).ok_or_else(|| format!("invalid timestamp '{ts}'"))?,
    };

    for (name, v) in [("speed", rec.speed), ("force", rec.force)] {
        if matches!(v, Some(x) if x < 0.0) {
            return Err(format!("negative {name}"));
        }
    }
    if matches!(rec.accuracy, Some(a) if !(0.0..=100.0).contains(&a)) {
        return Err("accuracy outside 0..=100".into());
    }

    Ok(FetchedPunch {
        id: rec.id,
        user_id: rec.user_id,
        punch_type,
        speed: rec.speed,
        force: rec.force,
        accuracy: rec.accuracy,
        timestamp,
        notes: rec.notes.filter(|n| !n.trim().is_empty()),
    })
}

/// Tolker svaret fra GET /punch-analysis. Enkeltposter som ikke validerer
/// avvises med indeks og grunn; kun en ikke-liste feiler hele hentingen.
pub fn parse_punch_analysis(body: &str) -> Result<FetchOutcome, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(invalid_body)?;
    punch_analysis_from_value(value)
}

fn invalid_body(e: serde_json::Error) -> FetchError {
    if e.is_io() {
        FetchError::Unreachable
    } else {
        FetchError::Decode(format!("Invalid punch analysis response: {e}"))
    }
}

/// Som `parse_punch_analysis`, men for et allerede tolket JSON-dokument.
pub fn punch_analysis_from_value(value: Value) -> Result<FetchOutcome, FetchError> {
    let Value::Array(items) = value else {
        return Err(FetchError::Decode(
            "Invalid punch analysis response: expected a JSON array".into(),
        ));
    };

    let mut out = FetchOutcome::default();
    for (index, item) in items.into_iter().enumerate() {
        let parsed: Result<PunchAnalysisIn, _> = spte::deserialize(item.into_deserializer());
        let result = parsed
            .map_err(|e| format!("parse error at {}: {}", e.path(), e.inner()))
            .and_then(validate);
        match result {
            Ok(p) => out.records.push(p),
            Err(reason) => {
                log::warn!("punch-analysis post {index} avvist: {reason}");
                out.rejected.push(RejectedRecord { index, reason });
            }
        }
    }
    Ok(out)
}

/// Kilde for slagdata (prod: `HttpPunchClient`, test: `StaticPunchSource`).
pub trait PunchSource {
    fn fetch_punches(&self) -> Result<FetchOutcome, FetchError>;
}

/// Enkel blocking-klient (ureq) mot punch-analysis-API-et.
pub struct HttpPunchClient {
    agent: Agent,
    config: ApiConfig,
}

impl HttpPunchClient {
    pub fn new(config: ApiConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let agent = builder.build();
        Self { agent, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// POST ett slag.
    pub fn submit_punch(&self, record: &PunchRecord) -> Result<(), FetchError> {
        let url = self.config.url(Endpoint::PunchAnalysis);
        self.agent
            .post(&url)
            .set("Accept", "application/json")
            .send_json(record)?;
        log::info!("slag sendt til {url}");
        Ok(())
    }

    /// POST en hel kombinasjon i én forespørsel. Tom liste sendes ikke.
    pub fn submit_batch(&self, records: &[PunchRecord]) -> Result<(), FetchError> {
        if records.is_empty() {
            return Ok(());
        }
        let url = self.config.url(Endpoint::PunchAnalysisBatch);
        self.agent
            .post(&url)
            .set("Accept", "application/json")
            .send_json(records)?;
        log::info!("{} slag sendt til {url}", records.len());
        Ok(())
    }
}

impl Default for HttpPunchClient {
    fn default() -> Self {
        Self::new(ApiConfig::from_env())
    }
}

impl PunchSource for HttpPunchClient {
    fn fetch_punches(&self) -> Result<FetchOutcome, FetchError> {
        let url = self.config.url(Endpoint::PunchAnalysis);
        log::debug!("henter {url}");
        let resp = self.agent.get(&url).set("Accept", "application/json").call()?;
        // Leses som strøm: `into_string` har et tak på 10 MB.
        let value: Value =
            serde_json::from_reader(BufReader::new(resp.into_reader())).map_err(invalid_body)?;
        punch_analysis_from_value(value)
    }
}

/// Fast svar, for tester og offline-bruk.
#[derive(Debug, Clone)]
pub struct StaticPunchSource {
    pub response: Result<FetchOutcome, FetchError>,
}

impl StaticPunchSource {
    pub fn ok(records: Vec<FetchedPunch>) -> Self {
        Self { response: Ok(FetchOutcome { records, rejected: Vec::new() }) }
    }

    pub fn failing(err: FetchError) -> Self {
        Self { response: Err(err) }
    }
}

impl PunchSource for StaticPunchSource {
    fn fetch_punches(&self) -> Result<FetchOutcome, FetchError> {
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_and_naive() {
        let a = parse_timestamp("2024-05-01T10:30:00Z").unwrap();
        let b = parse_timestamp("2024-05-01T12:30:00+02:00").unwrap();
        assert_eq!(a, b);
        let c = parse_timestamp("2024-05-01T10:30:00.250").unwrap();
        assert_eq!(c.hour(), 10);
        assert_eq!(c.day(), 1);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn rejects_records_missing_required_fields() {
        let body = r#"[
            {"id": 1, "punch_type": "jab", "speed": 6.5, "timestamp": "2024-05-01T10:00:00Z"},
            {"id": 2, "speed": 7.0, "timestamp": "2024-05-01T10:00:01Z"},
            {"id": 3, "punch_type": "hook"},
            {"id": 4, "punch_type": "kick", "timestamp": "2024-05-01T10:00:02Z"},
            {"id": 5, "punchType": "cross", "force": null, "createdAt": "2024-05-01 10:00:03"}
        ]"#;
        let out = parse_punch_analysis(body).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].punch_type, PunchType::Cross);
        assert_eq!(out.records[1].force, None);

        let idx: Vec<usize> = out.rejected.iter().map(|r| r.index).collect();
        assert_eq!(idx, vec![1, 2, 3]);
        assert_eq!(out.rejected[0].reason, "missing punch_type");
        assert_eq!(out.rejected[1].reason, "missing timestamp");
    }

    #[test]
    fn wrong_field_type_reports_path() {
        let body = r#"[{"punch_type": "jab", "speed": "fast", "timestamp": "2024-05-01T10:00:00Z"}]"#;
        let out = parse_punch_analysis(body).unwrap();
        assert!(out.records.is_empty());
        assert!(out.rejected[0].reason.contains("speed"), "{}", out.rejected[0].reason);
    }

    #[test]
    fn out_of_range_values_are_flagged() {
        let body = r#"[
            {"punch_type": "jab", "speed": -1, "timestamp": "2024-05-01T10:00:00Z"},
            {"punch_type": "jab", "accuracy": 120, "timestamp": "2024-05-01T10:00:00Z"}
        ]"#;
        let out = parse_punch_analysis(body).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.rejected.len(), 2);
    }

    #[test]
    fn non_array_body_is_decode_error() {
        let err = parse_punch_analysis(r#"{"detail": "oops"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(parse_punch_analysis("not json").is_err());
    }

    #[test]
    fn parsed_value_goes_through_same_validation() {
        let value = serde_json::json!([
            {"punch_type": "uppercut", "force": 410.0, "timestamp": "2024-05-02T08:00:00Z"},
            {"punch_type": "uppercut"}
        ]);
        let out = punch_analysis_from_value(value).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.rejected[0].index, 1);
        assert!(matches!(
            punch_analysis_from_value(serde_json::json!(null)),
            Err(FetchError::Decode(_))
        ));
    }
}
