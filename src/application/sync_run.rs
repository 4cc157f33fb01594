// src/application/sync_run.rs
use crate::application::{NoteRepository, NoteSynchronizer};
use crate::domain::SyncOutcome;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: SyncOutcome,
}

/// Per-file outcomes of one run, in processing order.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub files: Vec<FileReport>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Created(_)))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Updated))
    }

    pub fn failed(&self) -> usize {
        self.count(SyncOutcome::is_failure)
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_failure())
    }

    fn count(&self, predicate: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }
}

/// Synchronize files one after another. A failing file never stops the run.
pub struct SyncRun<R: NoteRepository> {
    synchronizer: NoteSynchronizer<R>,
}

impl<R: NoteRepository> SyncRun<R> {
    pub fn new(repository: R) -> Self {
        Self {
            synchronizer: NoteSynchronizer::new(repository),
        }
    }

    pub fn repository(&self) -> &R {
        self.synchronizer.repository()
    }

    pub fn run<I>(&mut self, paths: I) -> SyncReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut report = SyncReport::default();
        for path in paths {
            let outcome = self.synchronizer.process_file(&path);
            report.files.push(FileReport { path, outcome });
        }

        info!(
            created = report.created(),
            updated = report.updated(),
            failed = report.failed(),
            "Synchronization finished"
        );
        report
    }
}
