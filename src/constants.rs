// src/constants.rs
//
// Application-wide constants shared between configuration defaults and the
// code that relies on them.

/// Double extension marking a file as a note file, e.g. `borrowing.anki.md`.
///
/// Used in: `infrastructure/config.rs`
pub const NOTE_FILE_EXTENSION: &str = ".anki.md";

/// Where the AnkiConnect add-on listens by default.
///
/// Used in: `infrastructure/config.rs`
pub const ANKI_CONNECT_URL: &str = "http://127.0.0.1:8765";

/// Upper bound for one AnkiConnect request, in seconds.
///
/// Used in: `infrastructure/config.rs`
pub const ANKI_CONNECT_TIMEOUT_SECS: u64 = 30;

/// AnkiConnect API version the request envelopes are written for.
///
/// Used in: `infrastructure/anki_connect.rs`
pub const ANKI_CONNECT_API_VERSION: u32 = 6;

/// Prefix of the temporary file written next to a note file before it replaces it.
///
/// Used in: `infrastructure/file_writer.rs`
pub const TEMP_FILE_PREFIX: &str = ".ankisync-";
