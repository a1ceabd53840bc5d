//! Parsing of previously exported judgment files for session resume.
//!
//! Accepts both the canonical export header (`item_id`, `coder_id`,
//! `category`, `note`, `recorded_at`) and the legacy coding-interface header
//! (`coding_id`, `coder_name`, `classification`, `notes`, `coded_at`), so a
//! file produced by any version of the tool resumes cleanly.

use std::io::Read;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use tracing::warn;

use crate::errors::SessionError;
use crate::judgment::{clip_note, Category, Judgment};

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim() == *n))
}

/// Parse resume candidates from CSV bytes.
///
/// Column validation happens before any row is materialized, so a malformed
/// file fails here and never reaches the store (all-or-nothing imports).
/// Rows whose classification falls outside the closed label set are corrected
/// to the default `none`, matching the original interface's display fallback.
pub fn parse_judgments<R: Read>(reader: R) -> Result<Vec<Judgment>, SessionError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let id_col = find_column(&headers, &["coding_id", "item_id"]);
    let coder_col = find_column(&headers, &["coder_name", "coder_id"]);
    let category_col = find_column(&headers, &["classification", "category"]);
    let note_col = find_column(&headers, &["notes", "note"]);
    let at_col = find_column(&headers, &["coded_at", "recorded_at"]);

    let mut missing = Vec::new();
    if id_col.is_none() {
        missing.push("coding_id".to_string());
    }
    if coder_col.is_none() {
        missing.push("coder_name".to_string());
    }
    if category_col.is_none() {
        missing.push("classification".to_string());
    }
    if !missing.is_empty() {
        return Err(SessionError::MalformedImport { missing });
    }
    let (id_col, coder_col, category_col) =
        (id_col.unwrap(), coder_col.unwrap(), category_col.unwrap());

    let mut candidates = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let item_id = field(id_col).to_string();
        let coder_id = field(coder_col).to_string();
        let raw_category = field(category_col);
        let category = Category::from_str(raw_category).unwrap_or_else(|_| {
            warn!(item_id = %item_id, raw = raw_category, "unknown classification in resume row, using 'none'");
            Category::None
        });

        let note = note_col.map(|c| field(c).to_string()).filter(|n| !n.is_empty());
        let recorded_at = at_col
            .and_then(|c| DateTime::parse_from_rfc3339(field(c)).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        candidates.push(Judgment {
            item_id,
            coder_id,
            category,
            note: note.map(clip_note),
            recorded_at,
        });
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_legacy_header() {
        let data = "\
coding_id,coder_name,classification,notes,coded_at
I1,Bob,moderate,looks right,2025-02-03T10:00:00+00:00
I2,Bob,flat,,
";
        let rows = parse_judgments(Cursor::new(data)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item_id, "I1");
        assert_eq!(rows[0].coder_id, "Bob");
        assert_eq!(rows[0].category, Category::Moderate);
        assert_eq!(rows[0].note.as_deref(), Some("looks right"));
        assert_eq!(
            rows[0].recorded_at,
            DateTime::parse_from_rfc3339("2025-02-03T10:00:00+00:00").unwrap()
        );
        assert_eq!(rows[1].note, None);
    }

    #[test]
    fn parses_canonical_export_header() {
        let data = "\
item_id,coder_id,category,note,recorded_at
I1,Alice,steep,,2025-02-03T10:00:00+00:00
";
        let rows = parse_judgments(Cursor::new(data)).unwrap();
        assert_eq!(rows[0].coder_id, "Alice");
        assert_eq!(rows[0].category, Category::Steep);
    }

    #[test]
    fn missing_columns_are_named() {
        let data = "coding_id,notes\nI1,x\n";
        let err = parse_judgments(Cursor::new(data)).unwrap_err();
        match err {
            SessionError::MalformedImport { missing } => {
                assert_eq!(missing, vec!["coder_name", "classification"]);
            }
            other => panic!("expected MalformedImport, got {other:?}"),
        }
    }

    #[test]
    fn unknown_classification_falls_back_to_none() {
        let data = "coding_id,coder_name,classification\nI1,Bob,sideways\n";
        let rows = parse_judgments(Cursor::new(data)).unwrap();
        assert_eq!(rows[0].category, Category::None);
    }
}
