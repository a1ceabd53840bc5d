//! Serialization of a judgment store to a portable CSV file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::errors::SessionError;
use crate::judgment::JudgmentStore;

const HEADER: [&str; 5] = ["item_id", "coder_id", "category", "note", "recorded_at"];

/// Write the store as CSV, one row per judgment in insertion order.
///
/// Exporting the same store twice without intervening mutation yields
/// identical bytes; timestamps are fixed at save time, not export time.
pub fn write_csv<W: Write>(store: &JudgmentStore, writer: W) -> Result<(), SessionError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for j in store.all() {
        wtr.write_record([
            j.item_id.as_str(),
            j.coder_id.as_str(),
            j.category.as_str(),
            j.note.as_deref().unwrap_or(""),
            &j.recorded_at.to_rfc3339(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Deterministic, collision-resistant export filename.
///
/// Embeds the normalized coder name and a second-resolution timestamp. Two
/// exports by the same coder within the same second collide; for a
/// single-user tool that is a documented limitation, not a defect.
pub fn export_filename(coder_id: &str, at: DateTime<Utc>) -> String {
    let normalized: String = coder_id
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let safe = if normalized.is_empty() {
        "coder"
    } else {
        &normalized
    };
    format!("coded_{}_{}.csv", safe, at.format("%Y%m%d_%H%M%S"))
}

/// Export the store into `dir` under the standard filename; returns the path.
pub fn export_to_dir(
    store: &JudgmentStore,
    dir: &Path,
    coder_id: &str,
    at: DateTime<Utc>,
) -> Result<PathBuf, SessionError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(coder_id, at));
    let file = File::create(&path)?;
    write_csv(store, file)?;
    tracing::info!(path = %path.display(), rows = store.len(), "results exported");
    Ok(path)
}
