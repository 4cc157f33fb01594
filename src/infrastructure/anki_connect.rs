//! Typed client for the AnkiConnect add-on of the Anki desktop app.
use crate::application::NoteRepository;
use crate::constants::ANKI_CONNECT_API_VERSION;
use crate::domain::{Fields, NotePayload, RemoteError, RemoteNote, Tags};
use crate::infrastructure::config::AnkiConnectConfig;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

// ── AnkiConnect wire types ──────────────────────────

#[derive(Debug, Serialize)]
pub struct Request<'a, P: Serialize> {
    pub action: &'a str,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<&'a str>,
    pub params: P,
}

#[derive(Debug, Deserialize)]
pub struct Response<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> Response<T> {
    pub fn into_result(self) -> Result<Option<T>, RemoteError> {
        match self.error {
            Some(error) => Err(RemoteError::Other(error)),
            None => Ok(self.result),
        }
    }
}

#[derive(Debug, Serialize)]
struct AddNoteParams<'a> {
    note: AddNote<'a>,
}

#[derive(Debug, Serialize)]
struct AddNote<'a> {
    #[serde(flatten)]
    payload: NotePayload<'a>,
    options: AddNoteOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddNoteOptions {
    allow_duplicate: bool,
}

#[derive(Debug, Serialize)]
struct UpdateNoteParams<'a> {
    note: UpdateNote<'a>,
}

#[derive(Debug, Serialize)]
struct UpdateNote<'a> {
    id: i64,
    fields: &'a Fields,
    tags: &'a Tags,
}

#[derive(Debug, Serialize)]
struct NotesInfoParams {
    notes: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct GetDecksParams<'a> {
    cards: &'a [i64],
}

#[derive(Debug, Serialize)]
struct ChangeDeckParams<'a> {
    cards: &'a [i64],
    deck: &'a str,
}

/// One `notesInfo` entry. AnkiConnect answers `{}` for an unknown id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    #[serde(default)]
    pub note_id: Option<i64>,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: HashMap<String, FieldInfo>,
    #[serde(default)]
    pub cards: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FieldInfo {
    pub value: String,
    pub order: usize,
}

impl NoteInfo {
    pub fn into_remote_note(self) -> Option<RemoteNote> {
        let id = self.note_id?;
        let mut fields: Vec<_> = self.fields.into_iter().collect();
        fields.sort_by_key(|(_, field)| field.order);
        Some(RemoteNote {
            id,
            model_name: self.model_name,
            tags: self.tags,
            fields: fields
                .into_iter()
                .map(|(name, field)| (name, field.value))
                .collect(),
        })
    }
}

/// Whether `getDecks` reports any card outside `deck_name`.
fn needs_deck_change(decks: &HashMap<String, Vec<i64>>, deck_name: &str) -> bool {
    decks
        .iter()
        .any(|(name, cards)| name != deck_name && !cards.is_empty())
}

/// Decode a raw AnkiConnect response body.
pub fn decode_response<T: DeserializeOwned>(body: Value) -> Result<Option<T>, RemoteError> {
    let response: Response<T> = serde_json::from_value(body)
        .map_err(|e| RemoteError::Other(format!("Unexpected AnkiConnect response: {e}")))?;
    response.into_result()
}

// ── Client impl ─────────────────────────────────────

pub struct AnkiConnectRepository {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
    allow_duplicate: bool,
}

impl AnkiConnectRepository {
    pub fn new(config: &AnkiConnectConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        debug!(url = %config.url, "Created AnkiConnect client");
        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            api_key: (!config.api_key.is_empty()).then(|| config.api_key.clone()),
            allow_duplicate: config.allow_duplicate,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request<'a, P: Serialize>(&'a self, action: &'a str, params: P) -> Request<'a, P> {
        Request {
            action,
            version: ANKI_CONNECT_API_VERSION,
            key: self.api_key.as_deref(),
            params,
        }
    }

    #[instrument(level = "trace", skip(self, params))]
    fn invoke<P: Serialize, T: DeserializeOwned>(
        &self,
        action: &str,
        params: P,
    ) -> Result<Option<T>, RemoteError> {
        let body: Value = self
            .client
            .post(&self.url)
            .json(&self.request(action, params))
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(|e| RemoteError::Other(format!("AnkiConnect `{action}` failed: {e}")))?;

        decode_response(body)
    }

    fn note_info(&self, note_id: i64) -> Result<Option<NoteInfo>, RemoteError> {
        let infos = self
            .invoke::<_, Vec<NoteInfo>>("notesInfo", NotesInfoParams { notes: vec![note_id] })?
            .unwrap_or_default();
        Ok(infos.into_iter().next().filter(|info| info.note_id.is_some()))
    }

    /// Move all cards to `deck_name` unless they are all there already.
    fn move_cards(&self, cards: &[i64], deck_name: &str) -> Result<bool, RemoteError> {
        if cards.is_empty() {
            return Ok(false);
        }
        let decks = self
            .invoke::<_, HashMap<String, Vec<i64>>>("getDecks", GetDecksParams { cards })?
            .unwrap_or_default();
        if !needs_deck_change(&decks, deck_name) {
            return Ok(false);
        }

        self.invoke::<_, Value>(
            "changeDeck",
            ChangeDeckParams {
                cards,
                deck: deck_name,
            },
        )?;
        Ok(true)
    }

    /// AnkiConnect API version; doubles as a reachability check.
    pub fn version(&self) -> Result<u32, RemoteError> {
        let version = self
            .invoke::<_, u32>("version", serde_json::json!({}))?
            .ok_or_else(|| RemoteError::other("AnkiConnect returned no version"))?;
        info!(version, url = %self.url, "Connected to AnkiConnect");
        Ok(version)
    }
}

impl NoteRepository for AnkiConnectRepository {
    #[instrument(
        level = "debug",
        skip(self, note),
        fields(deck = note.deck_name, model = note.model_name)
    )]
    fn create_note(&mut self, note: NotePayload<'_>) -> Result<i64, RemoteError> {
        let params = AddNoteParams {
            note: AddNote {
                payload: note,
                options: AddNoteOptions {
                    allow_duplicate: self.allow_duplicate,
                },
            },
        };
        self.invoke::<_, i64>("addNote", params)?
            .ok_or_else(|| RemoteError::other("AnkiConnect addNote returned no id"))
    }

    #[instrument(level = "debug", skip(self, note))]
    fn update_note(&mut self, note_id: i64, note: NotePayload<'_>) -> Result<(), RemoteError> {
        let existing = self
            .note_info(note_id)?
            .ok_or(RemoteError::NotFound(note_id))?;
        if existing.model_name != note.model_name {
            return Err(RemoteError::Other(format!(
                "note {note_id} uses model `{}` but the file names `{}`; \
                 changing the note type is not supported",
                existing.model_name, note.model_name
            )));
        }

        let params = UpdateNoteParams {
            note: UpdateNote {
                id: note_id,
                fields: note.fields,
                tags: note.tags,
            },
        };
        self.invoke::<_, Value>("updateNote", params)?;

        if self.move_cards(&existing.cards, note.deck_name)? {
            info!(note_id, deck = note.deck_name, "Moved cards to deck");
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn find_note(&mut self, note_id: i64) -> Result<Option<RemoteNote>, RemoteError> {
        Ok(self.note_info(note_id)?.and_then(NoteInfo::into_remote_note))
    }
}
