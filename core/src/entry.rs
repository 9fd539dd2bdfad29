//! Registreringsskjema: enkeltslag + kombinasjonsbygger, drevet av én reducer.

use serde::{Deserialize, Serialize};

use crate::combo::{self, ComboBuilder, IdGenerator};
use crate::telemetry;
use crate::types::{PunchRecord, PunchType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    #[default]
    Single,
    Combo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryAction {
    SelectAthlete(Option<u64>),
    SelectSession(Option<u64>),
    SetMode(EntryMode),
    SetPunchType(Option<PunchType>),
    SetSpeed(String),
    SetForce(String),
    SetAccuracy(String),
    SetNotes(String),
    SubmitSingle,
    AddToCombo(PunchType),
    ApplyTemplate(Vec<PunchType>),
    ApplyNamedTemplate(String),
    Reorder { id: String, new_index: usize },
    ReorderOnto { active_id: String, over_id: String },
    RemoveFromCombo(usize),
    SubmitCombo,
}

/// Tilstand for skjemaet. Utøver/økt overlever innsending, resten er transient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryState {
    pub athlete_id: Option<u64>,
    pub session_id: Option<u64>,
    pub mode: EntryMode,
    pub punch_type: Option<PunchType>,
    pub speed: String,
    pub force: String,
    pub accuracy: String,
    pub notes: String,
    pub combo: ComboBuilder,
}

/// Tekstfelt -> tall; tomt eller ugyldig blir 0.
pub fn parse_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

impl EntryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Én synkron overgang. Returnerer postene overgangen sendte ut (ofte ingen).
    pub fn apply(&mut self, action: EntryAction, ids: &mut dyn IdGenerator) -> Vec<PunchRecord> {
        match action {
            EntryAction::SelectAthlete(id) => self.athlete_id = id,
            EntryAction::SelectSession(id) => self.session_id = id,
            EntryAction::SetMode(mode) => self.mode = mode,
            EntryAction::SetPunchType(t) => self.punch_type = t,
            EntryAction::SetSpeed(v) => self.speed = v,
            EntryAction::SetForce(v) => self.force = v,
            EntryAction::SetAccuracy(v) => self.accuracy = v,
            EntryAction::SetNotes(v) => self.notes = v,
            EntryAction::SubmitSingle => {
                return self.submit_single().into_iter().collect();
            }
            EntryAction::AddToCombo(t) => self.combo.append(t, ids),
            EntryAction::ApplyTemplate(seq) => self.combo.apply_template(&seq, ids),
            EntryAction::ApplyNamedTemplate(name) => match combo::template(&name) {
                Some(seq) => self.combo.apply_template(seq, ids),
                None => log::warn!("ukjent kombinasjonsmal '{name}'"),
            },
            EntryAction::Reorder { id, new_index } => self.combo.reorder(&id, new_index),
            EntryAction::ReorderOnto { active_id, over_id } => {
                self.combo.reorder_onto(&active_id, &over_id)
            }
            EntryAction::RemoveFromCombo(index) => self.combo.remove(index),
            EntryAction::SubmitCombo => {
                let out = self.combo.submit(self.athlete_id, self.session_id, ids);
                telemetry::records_emitted("combo", out.len());
                return out;
            }
        }
        Vec::new()
    }

    /// Krever utøver, økt og slagtype. Nullstiller transiente felt ved suksess.
    pub fn submit_single(&mut self) -> Option<PunchRecord> {
        let athlete_id = self.athlete_id?;
        let session_id = self.session_id?;
        let punch_type = self.punch_type?;

        let notes = self.notes.trim();
        let record = PunchRecord {
            athlete_id,
            session_id,
            punch_type,
            speed: parse_number(&self.speed).max(0.0),
            force: parse_number(&self.force).max(0.0),
            accuracy: parse_number(&self.accuracy).clamp(0.0, 100.0),
            notes: if notes.is_empty() { None } else { Some(notes.to_string()) },
            combo: None,
        };

        log::debug!("enkeltslag registrert: {punch_type} (utøver={athlete_id}, økt={session_id})");
        telemetry::records_emitted("single", 1);
        self.reset_transient();
        Some(record)
    }

    fn reset_transient(&mut self) {
        self.punch_type = None;
        self.speed.clear();
        self.force.clear();
        self.accuracy.clear();
        self.notes.clear();
    }
}
