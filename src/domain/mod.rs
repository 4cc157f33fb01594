// src/domain/mod.rs
pub mod error;
pub mod note_file;
pub mod outcome;

pub use error::{DocumentError, ParseError, RemoteError};
pub use note_file::{Fields, NoteFile, NotePayload, RemoteNote, Tags};
pub use outcome::{SyncFailure, SyncOutcome};
