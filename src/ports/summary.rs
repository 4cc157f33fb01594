// src/ports/summary.rs
use crate::application::{CheckReport, SyncReport};
use crate::domain::{SyncFailure, SyncOutcome};
use std::fmt::Write;

/// Plain-text rendering of run results for the terminal.
#[derive(Debug, Default)]
pub struct SummaryPresenter;

impl SummaryPresenter {
    pub fn new() -> Self {
        Self
    }

    pub fn render_sync(&self, report: &SyncReport) -> String {
        let mut out = String::new();
        for file in &report.files {
            let path = file.path.display();
            // writing to a String cannot fail
            let _ = match &file.outcome {
                SyncOutcome::Created(id) => writeln!(out, "created  {path} (note {id})"),
                SyncOutcome::Updated => writeln!(out, "updated  {path}"),
                // parse errors already name their file
                SyncOutcome::Failed(reason @ SyncFailure::Parse(_)) => {
                    writeln!(out, "FAILED   {reason}")
                }
                SyncOutcome::Failed(reason) => writeln!(out, "FAILED   {path}: {reason}"),
            };
        }

        let _ = write!(
            out,
            "\nSummary:\n  Notes added:    {}\n  Notes updated:  {}\n  Errors:         {}\n",
            report.created(),
            report.updated(),
            report.failed()
        );
        out
    }

    pub fn render_check(&self, report: &CheckReport) -> String {
        let mut out = String::new();
        for note in &report.valid {
            let state = match note.note_id {
                Some(id) => format!("note {id}"),
                None => "new".to_string(),
            };
            let _ = writeln!(
                out,
                "ok       {} ({state}, {} fields)",
                note.path.display(),
                note.fields.len()
            );
        }
        for error in &report.invalid {
            let _ = writeln!(out, "INVALID  {error}");
        }

        let _ = write!(
            out,
            "\nSummary:\n  Valid files:    {}\n  Invalid files:  {}\n",
            report.valid.len(),
            report.invalid.len()
        );
        out
    }
}
