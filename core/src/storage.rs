use std::path::Path;

use anyhow::Context;

use crate::notes::NotesHistory;
use crate::types::CoachNote;

/// Leser notathistorikk fra disk (JSON-liste).
/// Hvis filen ikke finnes, returneres en tom historikk.
pub fn load_notes(path: impl AsRef<Path>) -> anyhow::Result<NotesHistory> {
    let path = path.as_ref();
    if !path.exists() {
        log::warn!("fant ikke notater på {}, starter med tom historikk", path.display());
        return Ok(NotesHistory::new());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("kunne ikke lese {}", path.display()))?;
    let notes: Vec<CoachNote> = serde_json::from_str(&contents)
        .with_context(|| format!("ugyldige notater i {}", path.display()))?;
    log::info!("{} notater lastet fra {}", notes.len(), path.display());
    Ok(NotesHistory::from_notes(notes))
}

/// Lagrer notathistorikk til disk som JSON (pretty-print).
pub fn save_notes(history: &NotesHistory, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(history.notes())?;
    std::fs::write(path, json).with_context(|| format!("kunne ikke skrive {}", path.display()))?;
    log::info!("{} notater lagret til {}", history.len(), path.display());
    Ok(())
}
