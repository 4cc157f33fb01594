// src/domain/outcome.rs
use crate::domain::{ParseError, RemoteError};
use thiserror::Error;

/// Result of synchronizing one note file.
#[derive(Debug)]
pub enum SyncOutcome {
    Created(i64),
    Updated,
    Failed(SyncFailure),
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Error, Debug)]
pub enum SyncFailure {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// The note exists remotely but its id could not be written back.
    #[error("created note {note_id} but could not record its id in the file: {reason}")]
    PersistId { note_id: i64, reason: String },
}
