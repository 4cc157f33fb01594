// src/application/note_checker.rs
use crate::domain::{NoteFile, ParseError};
use crate::infrastructure::note_file::parse_note_file;
use std::path::PathBuf;

/// Parse results of a dry run, valid and invalid files kept apart.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub valid: Vec<NoteFile>,
    pub invalid: Vec<ParseError>,
}

impl CheckReport {
    pub fn has_failures(&self) -> bool {
        !self.invalid.is_empty()
    }
}

/// Parse every file without contacting the collection.
pub fn check_files<I>(paths: I) -> CheckReport
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut report = CheckReport::default();
    for path in paths {
        match parse_note_file(&path) {
            Ok(note) => report.valid.push(note),
            Err(e) => report.invalid.push(e),
        }
    }
    report
}
