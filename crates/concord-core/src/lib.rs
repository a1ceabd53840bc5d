//! Core library for `concord`, a toolkit for human validation of
//! machine-produced text-classification labels.
//!
//! The centerpiece is [`SessionController`], a synchronous state machine over
//! one coder's labeling session: it owns the cursor into an immutable
//! [`ItemCatalog`], the coder-identity lock, the [`JudgmentStore`] of
//! collected answers, and the resume protocol that reconciles a previously
//! exported judgment set against the current catalog. Presentation layers
//! (the `concord` CLI, or any other front end) wrap these synchronous
//! handlers; no state is mutated outside controller methods.

pub mod catalog;
pub mod errors;
pub mod export;
pub mod judgment;
pub mod resume;
pub mod sample;
pub mod session;

pub use catalog::{Item, ItemCatalog};
pub use errors::SessionError;
pub use export::{export_filename, export_to_dir, write_csv};
pub use judgment::{Category, Judgment, JudgmentStore, MAX_NOTE_LEN};
pub use sample::{SampleArtifacts, SampleConfig, SampleStats};
pub use session::{Nav, Progress, ResumeReport, SessionController, SessionPhase};
