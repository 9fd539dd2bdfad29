use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunchType {
    Jab,
    Cross,
    Hook,
    Uppercut,
}

impl PunchType {
    /// Fast rekkefølge, brukt i fordeling og skjemavalg.
    pub const ALL: [PunchType; 4] = [
        PunchType::Jab,
        PunchType::Cross,
        PunchType::Hook,
        PunchType::Uppercut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PunchType::Jab => "jab",
            PunchType::Cross => "cross",
            PunchType::Hook => "hook",
            PunchType::Uppercut => "uppercut",
        }
    }

    /// "jab" -> "Jab"
    pub fn label(&self) -> &'static str {
        match self {
            PunchType::Jab => "Jab",
            PunchType::Cross => "Cross",
            PunchType::Hook => "Hook",
            PunchType::Uppercut => "Uppercut",
        }
    }
}

impl fmt::Display for PunchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPunchType(pub String);

impl fmt::Display for UnknownPunchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown punch type '{}'", self.0)
    }
}

impl std::error::Error for UnknownPunchType {}

impl FromStr for PunchType {
    type Err = UnknownPunchType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jab" => Ok(PunchType::Jab),
            "cross" => Ok(PunchType::Cross),
            "hook" => Ok(PunchType::Hook),
            "uppercut" => Ok(PunchType::Uppercut),
            other => Err(UnknownPunchType(other.to_string())),
        }
    }
}

/// Kombinasjons-tagg på et slag: felles id + 1-basert posisjon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboTag {
    pub combo_id: String,
    pub sequence: u32,
}

/// Normalisert slag klart for innsending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchRecord {
    pub athlete_id: u64,
    pub session_id: u64,
    pub punch_type: PunchType,
    pub speed: f64,    // m/s
    pub force: f64,    // N
    pub accuracy: f64, // %
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo: Option<ComboTag>,
}

/// Validert post fra GET /punch-analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedPunch {
    pub id: Option<u64>,
    pub user_id: Option<u64>,
    pub punch_type: PunchType,
    pub speed: Option<f64>,
    pub force: Option<f64>,
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: String,
}

/// Resultatet av én henting: gyldige poster + det som ble avvist ved grensen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub records: Vec<FetchedPunch>,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: u64,
    pub date: NaiveDate,
    pub athlete_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Technique,
    Progress,
    Concern,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotePriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    Open,
    Addressed,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachNote {
    pub id: u64,
    pub athlete_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,
    pub note: String,
    #[serde(rename = "type")]
    pub kind: NoteType,
    pub priority: NotePriority,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub total_punches: usize,
    pub average_speed: f64,
    pub average_force: f64,
    pub average_accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingPolicy {
    /// Manglende verdier teller som 0 (nevneren er alltid N).
    #[default]
    ZeroFill,
    /// Manglende verdier hoppes over (nevneren per felt).
    SkipMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Speed,
    Force,
    Accuracy,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestValues {
    pub best_speed: f64,
    pub best_force: f64,
    pub best_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub session_id: u64,
    pub date: NaiveDate,
    pub speed: f64,
    pub force: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboStat {
    pub sequence: Vec<PunchType>,
    pub frequency: usize,
    pub average_speed: f64,
    pub average_force: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weakness {
    pub punch_type: PunchType,
    pub metric: MetricKind,
    pub value: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBreakdown {
    pub punch_type: PunchType,
    pub metrics: AggregateMetrics,
}

/// Fullt metrikk-sett for dashboard/coach-visning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchMetrics {
    #[serde(flatten)]
    pub aggregate: AggregateMetrics,
    pub punch_type_distribution: BTreeMap<PunchType, usize>,
    pub by_punch_type: Vec<TypeBreakdown>,
    pub best: BestValues,
    pub speed_progression: Vec<ProgressPoint>,
    pub force_progression: Vec<ProgressPoint>,
    pub common_combos: Vec<ComboStat>,
    pub weaknesses: Vec<Weakness>,
}

/// Felles lesetilgang for aggregatoren; innsendte og hentede slag har ulik form.
pub trait Measured {
    fn punch_type(&self) -> PunchType;
    fn speed(&self) -> Option<f64>;
    fn force(&self) -> Option<f64>;
    fn accuracy(&self) -> Option<f64>;

    fn metric(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::Speed => self.speed(),
            MetricKind::Force => self.force(),
            MetricKind::Accuracy => self.accuracy(),
        }
    }
}

impl Measured for PunchRecord {
    fn punch_type(&self) -> PunchType { self.punch_type }
    fn speed(&self) -> Option<f64> { Some(self.speed) }
    fn force(&self) -> Option<f64> { Some(self.force) }
    fn accuracy(&self) -> Option<f64> { Some(self.accuracy) }
}

impl Measured for FetchedPunch {
    fn punch_type(&self) -> PunchType { self.punch_type }
    fn speed(&self) -> Option<f64> { self.speed }
    fn force(&self) -> Option<f64> { self.force }
    fn accuracy(&self) -> Option<f64> { self.accuracy }
}
