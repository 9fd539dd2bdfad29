use serde::{Deserialize, Serialize};

use crate::types::{ComboTag, PunchRecord, PunchType};

/// Kilde for lokale id-er (kombinasjonsrader og comboId).
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Standard: UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministisk teller ("{prefix}-1", "{prefix}-2", ...).
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    counter: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), counter: 0 }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("{}-{}", self.prefix, self.counter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboEntry {
    pub id: String,
    pub punch_type: PunchType,
}

/// Navngitte maler (hurtigknapper).
pub const COMMON_COMBOS: [(&str, &[PunchType]); 4] = [
    ("Basic 1-2", &[PunchType::Jab, PunchType::Cross]),
    ("Triple Hook", &[PunchType::Hook, PunchType::Hook, PunchType::Hook]),
    ("Body Head", &[PunchType::Hook, PunchType::Uppercut]),
    ("1-2-3", &[PunchType::Jab, PunchType::Cross, PunchType::Hook]),
];

pub fn template(name: &str) -> Option<&'static [PunchType]> {
    COMMON_COMBOS.iter().find(|(n, _)| *n == name).map(|(_, seq)| *seq)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboBuilder {
    entries: Vec<ComboEntry>,
}

impl ComboBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ComboEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn punch_types(&self) -> Vec<PunchType> {
        self.entries.iter().map(|e| e.punch_type).collect()
    }

    pub fn append(&mut self, punch_type: PunchType, ids: &mut dyn IdGenerator) {
        self.entries.push(ComboEntry { id: ids.next_id(), punch_type });
    }

    /// Erstatter hele sekvensen; hver rad får ny id.
    pub fn apply_template(&mut self, seq: &[PunchType], ids: &mut dyn IdGenerator) {
        self.entries = seq
            .iter()
            .map(|t| ComboEntry { id: ids.next_id(), punch_type: *t })
            .collect();
    }

    /// Stabil flytting. Ukjent id er no-op; `new_index` forbi slutten havner sist.
    pub fn reorder(&mut self, id: &str, new_index: usize) {
        let Some(from) = self.position(id) else {
            log::debug!("reorder: ukjent combo-id {id}");
            return;
        };
        let to = new_index.min(self.entries.len() - 1);
        if from == to {
            return;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
    }

    /// Drag-slutt: flytt `active_id` til plassen `over_id` har nå.
    pub fn reorder_onto(&mut self, active_id: &str, over_id: &str) {
        if active_id == over_id {
            return;
        }
        if let (Some(_), Some(to)) = (self.position(active_id), self.position(over_id)) {
            self.reorder(active_id, to);
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Én post per rad, sekvens 1..=N og felles comboId. Tømmer lista.
    /// Mangler utøver, økt eller rader: stille no-op (ingen poster, uendret tilstand).
    pub fn submit(
        &mut self,
        athlete_id: Option<u64>,
        session_id: Option<u64>,
        ids: &mut dyn IdGenerator,
    ) -> Vec<PunchRecord> {
        let (Some(athlete_id), Some(session_id)) = (athlete_id, session_id) else {
            return Vec::new();
        };
        if self.entries.is_empty() {
            return Vec::new();
        }

        let combo_id = ids.next_id();
        let out: Vec<PunchRecord> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| PunchRecord {
                athlete_id,
                session_id,
                punch_type: e.punch_type,
                speed: 0.0,
                force: 0.0,
                accuracy: 0.0,
                notes: None,
                combo: Some(ComboTag { combo_id: combo_id.clone(), sequence: i as u32 + 1 }),
            })
            .collect();

        log::info!(
            "combo {combo_id} sendt inn: {} slag (utøver={athlete_id}, økt={session_id})",
            out.len()
        );
        self.entries.clear();
        out
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}
