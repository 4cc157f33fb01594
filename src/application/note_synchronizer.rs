// src/application/note_synchronizer.rs
use crate::domain::{NoteFile, NotePayload, RemoteError, RemoteNote, SyncFailure, SyncOutcome};
use crate::infrastructure::file_writer;
use crate::infrastructure::note_file::parse_note_file;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

/// The collection a note file is synchronized into.
pub trait NoteRepository {
    /// Create a note and return the id the collection assigned to it.
    fn create_note(&mut self, note: NotePayload<'_>) -> Result<i64, RemoteError>;

    /// Overwrite fields and tags of an existing note.
    ///
    /// Returns [`RemoteError::NotFound`] if there is no note with `note_id`.
    fn update_note(&mut self, note_id: i64, note: NotePayload<'_>) -> Result<(), RemoteError>;

    fn find_note(&mut self, note_id: i64) -> Result<Option<RemoteNote>, RemoteError>;
}

pub struct NoteSynchronizer<R: NoteRepository> {
    repository: R,
}

impl<R: NoteRepository> NoteSynchronizer<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Parse the file at `path` and synchronize it.
    ///
    /// A file that does not parse never reaches the repository.
    pub fn process_file(&mut self, path: impl AsRef<Path>) -> SyncOutcome {
        match parse_note_file(path) {
            Ok(note) => self.synchronize(&note),
            Err(e) => {
                warn!(path = %e.path().display(), error = %e, "Skipping invalid note file");
                SyncOutcome::Failed(e.into())
            }
        }
    }

    /// Create or update the note in the collection.
    ///
    /// On creation the new id is written back into the note file. On any
    /// failure the file is left as it was.
    #[instrument(level = "debug", skip_all, fields(path = %note.path.display()))]
    pub fn synchronize(&mut self, note: &NoteFile) -> SyncOutcome {
        match note.note_id {
            None => self.create(note),
            Some(note_id) => self.update(note_id, note),
        }
    }

    fn create(&mut self, note: &NoteFile) -> SyncOutcome {
        debug!(deck = %note.deck_name, model = %note.model_name, "Adding note");
        let note_id = match self.repository.create_note(note.payload()) {
            Ok(id) => id,
            Err(e) => {
                warn!(path = %note.path.display(), error = %e, "Failed to add note");
                return SyncOutcome::Failed(e.into());
            }
        };

        if let Err(e) = file_writer::persist_note_id(&note.path, note_id) {
            let reason = format!("{e:#}");
            error!(
                path = %note.path.display(),
                note_id,
                error = %reason,
                "Note was added but its id could not be recorded, add `note_id: {}` by hand",
                note_id
            );
            return SyncOutcome::Failed(SyncFailure::PersistId { note_id, reason });
        }

        info!(path = %note.path.display(), note_id, "Added note");
        SyncOutcome::Created(note_id)
    }

    fn update(&mut self, note_id: i64, note: &NoteFile) -> SyncOutcome {
        debug!(note_id, "Updating note");
        match self.repository.update_note(note_id, note.payload()) {
            Ok(()) => {
                info!(path = %note.path.display(), note_id, "Updated note");
                SyncOutcome::Updated
            }
            Err(e) => {
                warn!(path = %note.path.display(), note_id, error = %e, "Failed to update note");
                SyncOutcome::Failed(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Fields, Tags};
    use crate::util::testing::{MockNoteRepository, RepositoryCall};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn note(path: PathBuf, note_id: Option<i64>) -> NoteFile {
        let mut fields = Fields::new();
        fields.insert("Front".to_string(), "Q".to_string());
        fields.insert("Back".to_string(), "A".to_string());
        NoteFile {
            path,
            note_id,
            deck_name: "Default".to_string(),
            model_name: "Basic".to_string(),
            tags: Tags::new(),
            fields,
        }
    }

    #[test]
    fn given_note_without_id_when_synchronizing_then_creates_and_records_id() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("n.anki.md");
        let content = "---\ndeck_name: Default\nmodel_name: Basic\n---\n## Front\nQ\n## Back\nA\n";
        fs::write(&path, content).unwrap();
        let mock = MockNoteRepository::builder().with_next_id(555).build();
        let mut synchronizer = NoteSynchronizer::new(mock);

        let outcome = synchronizer.synchronize(&note(path.clone(), None));

        assert!(matches!(outcome, SyncOutcome::Created(555)));
        assert!(fs::read_to_string(&path).unwrap().contains("note_id: 555"));
    }

    #[test]
    fn given_create_rejected_when_synchronizing_then_fails_and_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("n.anki.md");
        let content = "---\ndeck_name: Nope\nmodel_name: Basic\n---\n## Front\nQ\n";
        fs::write(&path, content).unwrap();
        let mock = MockNoteRepository::builder()
            .with_create_error(RemoteError::Other("deck was not found: Nope".to_string()))
            .build();
        let mut synchronizer = NoteSynchronizer::new(mock);

        let outcome = synchronizer.synchronize(&note(path.clone(), None));

        assert!(matches!(
            outcome,
            SyncOutcome::Failed(SyncFailure::Remote(RemoteError::Other(_)))
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn given_known_id_when_synchronizing_then_updates_without_create() {
        let mock = MockNoteRepository::builder().with_existing_note(77, "Basic").build();
        let mut synchronizer = NoteSynchronizer::new(mock);

        let outcome = synchronizer.synchronize(&note(PathBuf::from("unused.anki.md"), Some(77)));

        assert!(matches!(outcome, SyncOutcome::Updated));
        assert_eq!(synchronizer.repository().calls(), &[RepositoryCall::Update(77)]);
    }

    #[test]
    fn given_unknown_id_when_synchronizing_then_fails_not_found_without_create() {
        let mock = MockNoteRepository::builder().build();
        let mut synchronizer = NoteSynchronizer::new(mock);

        let outcome =
            synchronizer.synchronize(&note(PathBuf::from("unused.anki.md"), Some(999999999)));

        assert!(matches!(
            outcome,
            SyncOutcome::Failed(SyncFailure::Remote(RemoteError::NotFound(999999999)))
        ));
        assert_eq!(synchronizer.repository().create_count(), 0);
    }

    #[test]
    fn given_created_note_whose_file_vanished_when_synchronizing_then_reports_persist_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.anki.md");
        let mock = MockNoteRepository::builder().with_next_id(10).build();
        let mut synchronizer = NoteSynchronizer::new(mock);

        let outcome = synchronizer.synchronize(&note(path, None));

        assert!(matches!(
            outcome,
            SyncOutcome::Failed(SyncFailure::PersistId { note_id: 10, .. })
        ));
    }

    #[test]
    fn given_invalid_file_when_processing_then_repository_is_not_called() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.anki.md");
        fs::write(&path, "---\ndeck_name: D\n---\n## Front\nQ\n").unwrap();
        let mut synchronizer = NoteSynchronizer::new(MockNoteRepository::builder().build());

        let outcome = synchronizer.process_file(&path);

        assert!(matches!(outcome, SyncOutcome::Failed(SyncFailure::Parse(_))));
        assert!(synchronizer.repository().calls().is_empty());
    }
}
