use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CoachNote, NotePriority, NoteStatus, NoteType};

/// Skjema for nytt coach-notat. Type og prioritet står igjen etter lagring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteForm {
    pub kind: NoteType,
    pub priority: NotePriority,
    pub text: String,
}

impl Default for NoteForm {
    fn default() -> Self {
        Self {
            kind: NoteType::Technique,
            priority: NotePriority::Medium,
            text: String::new(),
        }
    }
}

/// Notathistorikk: kun tillegg, ingen redigering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotesHistory {
    notes: Vec<CoachNote>,
    next_id: u64,
}

impl NotesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_notes(notes: Vec<CoachNote>) -> Self {
        let next_id = notes.iter().map(|n| n.id).max().unwrap_or(0);
        Self { notes, next_id }
    }

    pub fn notes(&self) -> &[CoachNote] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn add_note(
        &mut self,
        form: &mut NoteForm,
        athlete_id: u64,
        session_id: Option<u64>,
    ) -> Option<&CoachNote> {
        self.add_note_at(form, athlete_id, session_id, Utc::now())
    }

    /// Tom tekst er stille no-op. Ellers: nytt notat med status `open`, teksten tømmes.
    pub fn add_note_at(
        &mut self,
        form: &mut NoteForm,
        athlete_id: u64,
        session_id: Option<u64>,
        now: DateTime<Utc>,
    ) -> Option<&CoachNote> {
        let text = form.text.trim();
        if text.is_empty() {
            return None;
        }
        self.next_id += 1;
        let note = CoachNote {
            id: self.next_id,
            athlete_id,
            session_id,
            note: text.to_string(),
            kind: form.kind,
            priority: form.priority,
            status: NoteStatus::Open,
            created_at: now,
        };
        log::info!(
            "coach-notat {} lagt til (utøver={athlete_id}, prioritet={:?})",
            note.id,
            note.priority
        );
        form.text.clear();
        self.notes.push(note);
        self.notes.last()
    }

    pub fn for_athlete(&self, athlete_id: u64) -> impl Iterator<Item = &CoachNote> {
        self.notes.iter().filter(move |n| n.athlete_id == athlete_id)
    }

    pub fn for_session(&self, session_id: u64) -> impl Iterator<Item = &CoachNote> {
        self.notes.iter().filter(move |n| n.session_id == Some(session_id))
    }

    pub fn open(&self) -> impl Iterator<Item = &CoachNote> {
        self.notes.iter().filter(|n| n.status == NoteStatus::Open)
    }
}
