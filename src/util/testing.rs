// src/util/testing.rs

use anyhow::Result;
use std::collections::HashMap;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::NoteRepository;
use crate::domain::{NotePayload, RemoteError, RemoteNote};

/// A repository call as seen by [`MockNoteRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryCall {
    Create {
        deck_name: String,
        field_names: Vec<String>,
    },
    Update(i64),
    Find(i64),
}

/// Shared in-memory repository for testing the synchronization use cases.
///
/// Created notes are stored, so a later update of the same id succeeds.
/// The deck of every stored note is tracked, and every call is recorded in order.
///
/// # Examples
///
/// ```
/// use ankisync::util::testing::MockNoteRepository;
///
/// let mock = MockNoteRepository::builder()
///     .with_next_id(1000)
///     .with_existing_note(123, "Basic")
///     .build();
/// assert_eq!(mock.create_count(), 0);
/// ```
pub struct MockNoteRepository {
    notes: HashMap<i64, RemoteNote>,
    decks: HashMap<i64, String>,
    next_id: i64,
    create_error: Option<RemoteError>,
    update_errors: HashMap<i64, RemoteError>,
    calls: Vec<RepositoryCall>,
}

impl MockNoteRepository {
    pub fn builder() -> MockNoteRepositoryBuilder {
        MockNoteRepositoryBuilder::new()
    }

    pub fn calls(&self) -> &[RepositoryCall] {
        &self.calls
    }

    pub fn create_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RepositoryCall::Create { .. }))
            .count()
    }

    pub fn update_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RepositoryCall::Update(_)))
            .count()
    }

    /// The stored state of a note, without recording a call.
    pub fn note(&self, id: i64) -> Option<&RemoteNote> {
        self.notes.get(&id)
    }

    /// The deck a stored note currently lives in.
    pub fn deck_of(&self, id: i64) -> Option<&str> {
        self.decks.get(&id).map(String::as_str)
    }
}

impl NoteRepository for MockNoteRepository {
    fn create_note(&mut self, note: NotePayload<'_>) -> Result<i64, RemoteError> {
        self.calls.push(RepositoryCall::Create {
            deck_name: note.deck_name.to_string(),
            field_names: note.fields.keys().cloned().collect(),
        });
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }

        let id = self.next_id;
        self.next_id += 1;
        self.notes.insert(
            id,
            RemoteNote {
                id,
                model_name: note.model_name.to_string(),
                tags: note.tags.iter().cloned().collect(),
                fields: note.fields.clone(),
            },
        );
        self.decks.insert(id, note.deck_name.to_string());
        Ok(id)
    }

    fn update_note(&mut self, note_id: i64, note: NotePayload<'_>) -> Result<(), RemoteError> {
        self.calls.push(RepositoryCall::Update(note_id));
        if let Some(err) = self.update_errors.get(&note_id) {
            return Err(err.clone());
        }

        let stored = self
            .notes
            .get_mut(&note_id)
            .ok_or(RemoteError::NotFound(note_id))?;
        if stored.model_name != note.model_name {
            return Err(RemoteError::Other(format!(
                "note {note_id} uses model `{}`",
                stored.model_name
            )));
        }
        stored.fields = note.fields.clone();
        stored.tags = note.tags.iter().cloned().collect();
        self.decks.insert(note_id, note.deck_name.to_string());
        Ok(())
    }

    fn find_note(&mut self, note_id: i64) -> Result<Option<RemoteNote>, RemoteError> {
        self.calls.push(RepositoryCall::Find(note_id));
        Ok(self.notes.get(&note_id).cloned())
    }
}

/// Builder for MockNoteRepository
///
/// Provides a fluent interface for configuring mock behavior.
pub struct MockNoteRepositoryBuilder {
    notes: HashMap<i64, RemoteNote>,
    decks: HashMap<i64, String>,
    next_id: i64,
    create_error: Option<RemoteError>,
    update_errors: HashMap<i64, RemoteError>,
}

impl MockNoteRepositoryBuilder {
    pub fn new() -> Self {
        Self {
            notes: HashMap::new(),
            decks: HashMap::new(),
            next_id: 1,
            create_error: None,
            update_errors: HashMap::new(),
        }
    }

    /// Id handed out by the next successful create; later creates count up from it
    pub fn with_next_id(mut self, id: i64) -> Self {
        self.next_id = id;
        self
    }

    /// Add a note with no fields, in the `Default` deck, that update_note and
    /// find_note can see
    pub fn with_existing_note(mut self, id: i64, model_name: &str) -> Self {
        self.decks.insert(id, "Default".to_string());
        self.notes.insert(
            id,
            RemoteNote {
                id,
                model_name: model_name.to_string(),
                tags: vec![],
                fields: Default::default(),
            },
        );
        self
    }

    /// Make every create_note call fail with `err`
    pub fn with_create_error(mut self, err: RemoteError) -> Self {
        self.create_error = Some(err);
        self
    }

    /// Make update_note fail with `err` for a specific id
    pub fn with_update_error(mut self, id: i64, err: RemoteError) -> Self {
        self.update_errors.insert(id, err);
        self
    }

    pub fn build(self) -> MockNoteRepository {
        MockNoteRepository {
            notes: self.notes,
            decks: self.decks,
            next_id: self.next_id,
            create_error: self.create_error,
            update_errors: self.update_errors,
            calls: Vec::new(),
        }
    }
}

impl Default for MockNoteRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["anki", "reqwest", "hyper", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
