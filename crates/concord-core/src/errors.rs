use thiserror::Error;

/// Error taxonomy for the coding session.
///
/// `Load` is fatal (no session can start without a catalog). Everything else
/// is recoverable: the caller reports the message and the session state is
/// guaranteed unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to load catalog from {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("resume file is missing required columns: {}", missing.join(", "))]
    MalformedImport { missing: Vec<String> },

    #[error("no rows in the resume file match the current catalog")]
    NoMatch,

    #[error("'{given}' is not a valid category (expected steep, flat, moderate or none)")]
    InvalidCategory { given: String },

    #[error("a coder name must be set before judgments can be saved")]
    Unauthorized,

    #[error("coder name is locked to '{locked}' for this session")]
    CoderLocked { locked: String },

    #[error("coder name must not be empty")]
    EmptyCoderName,

    #[error("no item at the current cursor position")]
    NoCurrentItem,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
