// src/domain/note_file.rs
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Field name -> raw field value, in the order the sections appear in the file.
pub type Fields = IndexMap<String, String>;
pub type Tags = BTreeSet<String>;

/// One parsed note file. Built fresh on every run and never mutated while syncing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteFile {
    pub path: PathBuf,
    pub note_id: Option<i64>,
    pub deck_name: String,
    pub model_name: String,
    pub tags: Tags,
    pub fields: Fields,
}

impl NoteFile {
    pub fn payload(&self) -> NotePayload<'_> {
        NotePayload {
            deck_name: &self.deck_name,
            model_name: &self.model_name,
            fields: &self.fields,
            tags: &self.tags,
        }
    }
}

/// What gets sent to the collection for a create or update.
///
/// Serializes to the AnkiConnect note shape (`deckName`, `modelName`, ...).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload<'a> {
    pub deck_name: &'a str,
    pub model_name: &'a str,
    pub fields: &'a Fields,
    pub tags: &'a Tags,
}

/// A note as currently stored in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteNote {
    pub id: i64,
    pub model_name: String,
    pub tags: Vec<String>,
    pub fields: Fields,
}
