// src/infrastructure/collection.rs
use crate::application::NoteRepository;
use crate::domain::{NotePayload, RemoteError, RemoteNote};
use anki::collection::{Collection, CollectionBuilder};
use anki::decks::DeckId;
use anki::notes::{Note, NoteId};
use anki::notetype::Notetype;
use anki::search::SortMode;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Notes stored directly in a `collection.anki2` file.
///
/// Anki must not be running while this is open.
pub struct CollectionRepository {
    collection: Collection,
}

impl CollectionRepository {
    pub fn new<P: AsRef<Path>>(collection_path: P) -> Result<Self> {
        let path = PathBuf::from(collection_path.as_ref());
        debug!(?path, "Creating new CollectionRepository");

        // Check if file exists
        if !path.exists() {
            anyhow::bail!("Collection file not found: {}", path.display());
        }

        let metadata = fs::metadata(&path)
            .with_context(|| format!("Failed to read collection metadata: {}", path.display()))?;
        if metadata.permissions().readonly() {
            anyhow::bail!("No write permission for collection: {}", path.display());
        }

        let collection = CollectionBuilder::new(path.clone())
            .build()
            .with_context(|| "Failed to open Anki collection. Is Anki currently running?")?;

        info!(?path, "Successfully opened Anki collection");
        Ok(Self { collection })
    }

    fn notetype_by_name(&mut self, model_name: &str) -> Result<Arc<Notetype>, RemoteError> {
        self.collection
            .get_notetype_by_name(model_name)
            .map_err(RemoteError::other)?
            .ok_or_else(|| RemoteError::Other(format!("model was not found: {model_name}")))
    }

    fn deck_id_by_name(&mut self, deck_name: &str) -> Result<DeckId, RemoteError> {
        self.collection
            .get_deck_id(deck_name)
            .map_err(RemoteError::other)?
            .ok_or_else(|| RemoteError::Other(format!("deck was not found: {deck_name}")))
    }

    /// Move the cards of `note_id` that live outside `deck_id` into it.
    fn move_cards(&mut self, note_id: i64, deck_id: DeckId) -> Result<usize, RemoteError> {
        // did: matches the deck itself, not its children
        let search = format!("nid:{note_id} -did:{}", deck_id.0);
        let cards = self
            .collection
            .search_cards(search.as_str(), SortMode::NoOrder)
            .map_err(RemoteError::other)?;
        if cards.is_empty() {
            return Ok(0);
        }

        self.collection
            .set_deck(&cards, deck_id)
            .map_err(RemoteError::other)?;
        Ok(cards.len())
    }
}

/// Copy payload fields and tags onto `note`, by field name.
fn fill_note(
    notetype: &Notetype,
    note: &mut Note,
    payload: NotePayload<'_>,
) -> Result<(), RemoteError> {
    for (name, value) in payload.fields {
        let index = notetype
            .fields
            .iter()
            .position(|field| field.name == *name)
            .ok_or_else(|| {
                RemoteError::Other(format!("model `{}` has no field `{name}`", notetype.name))
            })?;
        note.set_field(index, value.clone()).map_err(RemoteError::other)?;
    }
    note.tags = payload.tags.iter().cloned().collect();
    Ok(())
}

impl NoteRepository for CollectionRepository {
    #[instrument(
        level = "debug",
        skip(self, note),
        fields(deck = note.deck_name, model = note.model_name)
    )]
    fn create_note(&mut self, note: NotePayload<'_>) -> Result<i64, RemoteError> {
        let notetype = self.notetype_by_name(note.model_name)?;
        let deck_id = self.deck_id_by_name(note.deck_name)?;

        let mut new_note = notetype.new_note();
        fill_note(&notetype, &mut new_note, note)?;
        self.collection
            .add_note(&mut new_note, deck_id)
            .map_err(RemoteError::other)?;

        info!(note_id = new_note.id.0, "Added note to collection");
        Ok(new_note.id.0)
    }

    #[instrument(level = "debug", skip(self, note))]
    fn update_note(&mut self, note_id: i64, note: NotePayload<'_>) -> Result<(), RemoteError> {
        let mut existing = self
            .collection
            .storage
            .get_note(NoteId(note_id))
            .map_err(RemoteError::other)?
            .ok_or(RemoteError::NotFound(note_id))?;

        let notetype = self
            .collection
            .get_notetype(existing.notetype_id)
            .map_err(RemoteError::other)?
            .ok_or_else(|| RemoteError::other("Notetype not found"))?;
        if notetype.name != note.model_name {
            return Err(RemoteError::Other(format!(
                "note {note_id} uses model `{}` but the file names `{}`; \
                 changing the note type is not supported",
                notetype.name, note.model_name
            )));
        }
        let deck_id = self.deck_id_by_name(note.deck_name)?;

        fill_note(&notetype, &mut existing, note)?;
        self.collection
            .update_note(&mut existing)
            .map_err(RemoteError::other)?;

        let moved = self.move_cards(note_id, deck_id)?;
        if moved > 0 {
            info!(note_id, moved, deck = note.deck_name, "Moved cards to deck");
        }

        debug!(note_id, "Updated note in collection");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn find_note(&mut self, note_id: i64) -> Result<Option<RemoteNote>, RemoteError> {
        let Some(note) = self
            .collection
            .storage
            .get_note(NoteId(note_id))
            .map_err(RemoteError::other)?
        else {
            return Ok(None);
        };

        let notetype = self
            .collection
            .get_notetype(note.notetype_id)
            .map_err(RemoteError::other)?
            .ok_or_else(|| RemoteError::other("Notetype not found"))?;

        let fields = notetype
            .fields
            .iter()
            .map(|field| field.name.clone())
            .zip(note.fields().iter().cloned())
            .collect();

        Ok(Some(RemoteNote {
            id: note.id.0,
            model_name: notetype.name.clone(),
            tags: note.tags.to_vec(),
            fields,
        }))
    }
}
