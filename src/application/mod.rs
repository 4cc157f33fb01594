// src/application/mod.rs
pub mod note_checker;
pub mod note_synchronizer;
pub mod sync_run;

pub use note_checker::{check_files, CheckReport};
pub use note_synchronizer::{NoteRepository, NoteSynchronizer};
pub use sync_run::{FileReport, SyncReport, SyncRun};
