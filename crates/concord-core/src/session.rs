use std::io::Read;

use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::{Item, ItemCatalog};
use crate::errors::SessionError;
use crate::judgment::{clip_note, Category, Judgment, JudgmentStore};
use crate::resume;

/// Observable phase of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No coder identity committed yet.
    AwaitingCoder,
    /// Cursor points at a catalog item.
    Browsing,
    /// Cursor is one past the last item; explicit navigation leaves this.
    Exhausted,
}

/// Navigation actions over the catalog cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Prev,
    Next,
    /// Jump to an absolute index. Clamped to `0..=len` rather than erroring,
    /// the forgiving contract for interactive use.
    Goto(usize),
}

/// Progress snapshot for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub coded: usize,
    pub total: usize,
    pub cursor: usize,
}

/// Outcome of a successful resume import.
#[derive(Debug, Clone)]
pub struct ResumeReport {
    pub accepted: usize,
    pub rejected: usize,
    pub message: String,
}

/// Single-coder session over an immutable catalog.
///
/// All mutation goes through the methods below; each handler runs to
/// completion before the next is accepted, so invariants are checked at the
/// mutation points rather than guarded by locks.
#[derive(Debug)]
pub struct SessionController {
    catalog: ItemCatalog,
    store: JudgmentStore,
    cursor: usize,
    coder_id: Option<String>,
    generation: u64,
}

impl SessionController {
    pub fn new(catalog: ItemCatalog) -> Self {
        Self {
            catalog,
            store: JudgmentStore::new(),
            cursor: 0,
            coder_id: None,
            generation: 0,
        }
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &JudgmentStore {
        &self.store
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn coder_id(&self) -> Option<&str> {
        self.coder_id.as_deref()
    }

    /// Render-identity token for presentation layers: bumped on every bulk
    /// state replacement so cached input widgets know to discard their state.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> SessionPhase {
        if self.coder_id.is_none() {
            SessionPhase::AwaitingCoder
        } else if self.cursor >= self.catalog.len() {
            SessionPhase::Exhausted
        } else {
            SessionPhase::Browsing
        }
    }

    /// The item under the cursor, or `None` when exhausted.
    pub fn current_item(&self) -> Option<&Item> {
        self.catalog.get(self.cursor)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            coded: self.store.len(),
            total: self.catalog.len(),
            cursor: self.cursor,
        }
    }

    /// Commit the coder identity. The first successful call locks the name
    /// for the rest of the session; repeating the committed name is an Ok
    /// no-op, while any other name is rejected without altering the lock.
    pub fn set_coder_id(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyCoderName);
        }
        match &self.coder_id {
            None => {
                info!(coder = name, "coder identity locked");
                self.coder_id = Some(name.to_string());
                Ok(())
            }
            Some(locked) if locked == name => Ok(()),
            Some(locked) => Err(SessionError::CoderLocked {
                locked: locked.clone(),
            }),
        }
    }

    /// Move the cursor; returns its new value. Never leaves `0..=len`.
    pub fn navigate(&mut self, nav: Nav) -> usize {
        let len = self.catalog.len();
        self.cursor = match nav {
            Nav::Prev => self.cursor.saturating_sub(1),
            Nav::Next => (self.cursor + 1).min(len),
            Nav::Goto(n) => n.min(len),
        };
        debug!(cursor = self.cursor, "navigated");
        self.cursor
    }

    /// Persist a judgment for the current item and advance, as one step.
    ///
    /// The judgment is stamped with the locked coder id and the current time.
    /// The advance only fires when a next item exists; saving on the last
    /// item stays put so the coder can review, and reaching the exhausted
    /// state requires an explicit `navigate(Nav::Next)`.
    pub fn save(&mut self, category: Category, note: Option<String>) -> Result<(), SessionError> {
        let coder_id = self.coder_id.clone().ok_or(SessionError::Unauthorized)?;
        let item = self
            .catalog
            .get(self.cursor)
            .ok_or(SessionError::NoCurrentItem)?;

        self.store.upsert(Judgment {
            item_id: item.id.clone(),
            coder_id,
            category,
            note: note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .map(clip_note),
            recorded_at: Utc::now(),
        });

        if self.cursor + 1 < self.catalog.len() {
            self.cursor += 1;
        }
        debug!(coded = self.store.len(), cursor = self.cursor, "judgment saved");
        Ok(())
    }

    /// Reconcile a previously exported judgment set against the current
    /// catalog and replace the store with the overlap.
    ///
    /// Column validation happens before any mutation; a zero-overlap file
    /// fails with `NoMatch` and leaves everything untouched. On success the
    /// coder identity is locked to the first accepted row (when not already
    /// locked), the generation counter is bumped, and the cursor jumps to the
    /// first item without a judgment (or to the exhausted position when every
    /// item is covered).
    pub fn resume_import<R: Read>(&mut self, reader: R) -> Result<ResumeReport, SessionError> {
        let candidates = resume::parse_judgments(reader)?;

        let valid_ids = self.catalog.ids();
        let first_accepted_coder = candidates
            .iter()
            .find(|c| valid_ids.contains(c.item_id.as_str()))
            .map(|c| c.coder_id.clone());
        if first_accepted_coder.is_none() {
            return Err(SessionError::NoMatch);
        }

        let (accepted, rejected) = self.store.import_bulk(candidates, &valid_ids);

        if self.coder_id.is_none() {
            // Resuming someone's session must not relabel it under a new name.
            self.coder_id = first_accepted_coder;
            info!(coder = self.coder_id.as_deref(), "coder identity locked from resume file");
        }
        self.generation += 1;

        self.cursor = self
            .catalog
            .iter()
            .position(|item| !self.store.contains(&item.id))
            .unwrap_or(self.catalog.len());

        let message = if rejected > 0 {
            format!(
                "loaded {accepted} judgments; {rejected} rows referenced unknown items and were ignored"
            )
        } else {
            format!("loaded {accepted} judgments")
        };
        info!(accepted, rejected, cursor = self.cursor, "session resumed");

        Ok(ResumeReport {
            accepted,
            rejected,
            message,
        })
    }
}
