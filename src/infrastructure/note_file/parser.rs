use crate::domain::{DocumentError, NoteFile, ParseError};
use crate::infrastructure::file_writer;
use crate::infrastructure::note_file::document::split_document;
use crate::infrastructure::note_file::preamble::decode_preamble;
use crate::infrastructure::note_file::sections::extract_sections;
use std::path::Path;
use tracing::{debug, instrument};

/// Read and parse a note file. Never writes.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_note_file(path: impl AsRef<Path>) -> Result<NoteFile, ParseError> {
    let path = path.as_ref();
    let content = file_writer::read_note_file(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_note_str(path, &content)
}

/// Parse note file content that has already been read from `path`.
pub fn parse_note_str(path: &Path, content: &str) -> Result<NoteFile, ParseError> {
    let note = parse_document(path, content).map_err(|source| ParseError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        note_id = ?note.note_id,
        deck = %note.deck_name,
        model = %note.model_name,
        fields = note.fields.len(),
        "Parsed note file"
    );
    Ok(note)
}

fn parse_document(path: &Path, content: &str) -> Result<NoteFile, DocumentError> {
    let document = split_document(content)?;
    let preamble = decode_preamble(document.preamble, document.preamble_first_line)?;
    let fields = extract_sections(document.body, document.body_first_line)?;

    Ok(NoteFile {
        path: path.to_path_buf(),
        note_id: preamble.note_id,
        deck_name: preamble.deck_name,
        model_name: preamble.model_name,
        tags: preamble.tags,
        fields,
    })
}
