use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SessionError;

/// Upper bound on free-text note length, in characters.
pub const MAX_NOTE_LEN: usize = 500;

/// Closed label set for the classification task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Steep,
    Flat,
    Moderate,
    None,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Steep,
        Category::Flat,
        Category::Moderate,
        Category::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Steep => "steep",
            Category::Flat => "flat",
            Category::Moderate => "moderate",
            Category::None => "none",
        }
    }

    /// Coder-facing guidance shown next to each choice.
    pub fn guidance(self) -> &'static str {
        match self {
            Category::Steep => "labor market conditions SIGNIFICANTLY affect inflation",
            Category::Flat => "labor markets have LITTLE or NO effect on inflation",
            Category::Moderate => "a qualified or partial relationship",
            Category::None => "no such belief expressed (default)",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steep" => Ok(Category::Steep),
            "flat" => Ok(Category::Flat),
            "moderate" => Ok(Category::Moderate),
            // "null" is the legacy spelling in upstream classifier output
            "none" | "null" => Ok(Category::None),
            other => Err(SessionError::InvalidCategory {
                given: other.to_string(),
            }),
        }
    }
}

/// One coder's current answer for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub item_id: String,
    pub coder_id: String,
    pub category: Category,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl Judgment {
    /// Build a judgment stamped with the current time. Notes are clipped to
    /// [`MAX_NOTE_LEN`] characters.
    pub fn new(
        item_id: impl Into<String>,
        coder_id: impl Into<String>,
        category: Category,
        note: Option<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            coder_id: coder_id.into(),
            category,
            note: note.map(clip_note),
            recorded_at: Utc::now(),
        }
    }
}

pub(crate) fn clip_note(note: String) -> String {
    if note.chars().count() <= MAX_NOTE_LEN {
        note
    } else {
        note.chars().take(MAX_NOTE_LEN).collect()
    }
}

/// In-memory mapping from item id to the latest judgment.
///
/// Insertion order is preserved across overwrites, so exports are stable
/// under repeated saves of the same item.
#[derive(Debug, Clone, Default)]
pub struct JudgmentStore {
    rows: Vec<Judgment>,
    by_id: HashMap<String, usize>,
}

impl JudgmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite-in-place; at most one judgment per item id.
    pub fn upsert(&mut self, judgment: Judgment) {
        match self.by_id.get(&judgment.item_id) {
            Some(&i) => self.rows[i] = judgment,
            None => {
                self.by_id.insert(judgment.item_id.clone(), self.rows.len());
                self.rows.push(judgment);
            }
        }
    }

    pub fn get(&self, item_id: &str) -> Option<&Judgment> {
        self.by_id.get(item_id).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.by_id.contains_key(item_id)
    }

    /// Snapshot for export, in insertion order.
    pub fn all(&self) -> &[Judgment] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace the store's contents with the candidates whose id is in
    /// `valid_ids`; returns `(accepted, rejected)` row counts.
    ///
    /// If no candidate matches, the store is left untouched so a failed
    /// resume cannot destroy in-progress work.
    pub fn import_bulk(
        &mut self,
        candidates: Vec<Judgment>,
        valid_ids: &HashSet<&str>,
    ) -> (usize, usize) {
        let mut next = JudgmentStore::new();
        let mut accepted = 0usize;
        let mut rejected = 0usize;
        for candidate in candidates {
            if valid_ids.contains(candidate.item_id.as_str()) {
                accepted += 1;
                next.upsert(candidate);
            } else {
                rejected += 1;
            }
        }
        if accepted > 0 {
            *self = next;
        }
        (accepted, rejected)
    }
}
