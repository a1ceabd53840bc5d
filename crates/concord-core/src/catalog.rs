use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::errors::SessionError;

/// One unit of text presented for human classification.
///
/// Items are immutable once loaded; the session only ever refers to them by
/// index or id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub text: String,
    pub description: Option<String>,
    pub explanation: Option<String>,
    pub variable: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    coding_id: String,
    quotation: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    variable: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Ordered, read-only list of labelable items for one session.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl ItemCatalog {
    /// Load a catalog from a CSV file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let file = File::open(path).map_err(|e| SessionError::Load {
            path: label.clone(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file, &label)
    }

    /// Load a catalog from any reader producing CSV bytes. `label` names the
    /// source in error messages (a path, "upload", ...).
    pub fn from_reader<R: Read>(reader: R, label: &str) -> Result<Self, SessionError> {
        let load_err = |reason: String| SessionError::Load {
            path: label.to_string(),
            reason,
        };

        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| load_err(e.to_string()))?
            .clone();

        let missing: Vec<&str> = ["coding_id", "quotation"]
            .into_iter()
            .filter(|required| !headers.iter().any(|h| h == *required))
            .collect();
        if !missing.is_empty() {
            return Err(load_err(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut items = Vec::new();
        let mut index = HashMap::new();
        for row in rdr.deserialize::<RawRow>() {
            let raw = row.map_err(|e| load_err(e.to_string()))?;
            let id = raw.coding_id.trim().to_string();
            if id.is_empty() {
                return Err(load_err(format!(
                    "row {} has an empty coding_id",
                    items.len() + 1
                )));
            }
            if index.insert(id.clone(), items.len()).is_some() {
                return Err(load_err(format!("duplicate coding_id '{id}'")));
            }
            items.push(Item {
                id,
                text: raw.quotation,
                description: non_blank(raw.description),
                explanation: non_blank(raw.explanation),
                variable: non_blank(raw.variable),
            });
        }

        tracing::debug!(items = items.len(), source = label, "catalog loaded");
        Ok(Self { items, index })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn index_of(&self, item_id: &str) -> Option<usize> {
        self.index.get(item_id).copied()
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.items.iter().map(|i| i.id.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
coding_id,quotation,description,explanation,variable
I1,Tight labor markets drive wages,first,,Inflation
I2,No acceleration in inflation, ,weak link,Employment
I3,Some modest pressure,,,
";

    #[test]
    fn loads_rows_and_blank_optionals_become_none() {
        let cat = ItemCatalog::from_reader(Cursor::new(SAMPLE), "test").unwrap();
        assert_eq!(cat.len(), 3);
        assert_eq!(cat.get(0).unwrap().description.as_deref(), Some("first"));
        assert_eq!(cat.get(1).unwrap().description, None);
        assert_eq!(cat.get(2).unwrap().variable, None);
        assert_eq!(cat.index_of("I2"), Some(1));
        assert_eq!(cat.index_of("I9"), None);
    }

    #[test]
    fn missing_required_column_is_a_load_error() {
        let err = ItemCatalog::from_reader(Cursor::new("coding_id,notes\nI1,x\n"), "test")
            .unwrap_err();
        match err {
            SessionError::Load { reason, .. } => assert!(reason.contains("quotation")),
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let data = "coding_id,quotation\nI1,a\nI1,b\n";
        let err = ItemCatalog::from_reader(Cursor::new(data), "test").unwrap_err();
        match err {
            SessionError::Load { reason, .. } => assert!(reason.contains("duplicate")),
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = ItemCatalog::from_path("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, SessionError::Load { .. }));
    }

    #[test]
    fn loads_from_tempfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coding.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let cat = ItemCatalog::from_path(&path).unwrap();
        assert_eq!(cat.len(), 3);
    }

    #[test]
    fn empty_catalog_is_valid() {
        let cat = ItemCatalog::from_reader(Cursor::new("coding_id,quotation\n"), "test").unwrap();
        assert!(cat.is_empty());
    }
}
