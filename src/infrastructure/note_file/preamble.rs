use crate::domain::{DocumentError, Tags};
use crate::util::text::lines;

pub const NOTE_ID_KEY: &str = "note_id";
pub const DECK_NAME_KEY: &str = "deck_name";
pub const MODEL_NAME_KEY: &str = "model_name";
pub const TAGS_KEY: &str = "tags";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreambleRecord {
    pub note_id: Option<i64>,
    pub deck_name: String,
    pub model_name: String,
    pub tags: Tags,
}

/// Split a preamble line at its first `:` into trimmed key and value.
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

/// Decode the `key: value` lines of a preamble.
///
/// `first_line` is the file line number of the first preamble line, used in errors.
pub fn decode_preamble(preamble: &str, first_line: usize) -> Result<PreambleRecord, DocumentError> {
    let mut note_id: Option<Option<i64>> = None;
    let mut deck_name: Option<String> = None;
    let mut model_name: Option<String> = None;
    let mut tags: Option<Tags> = None;

    for line in lines(preamble) {
        if line.is_blank() {
            continue;
        }
        let line_number = first_line + line.number - 1;
        let (key, value) = split_key_value(line.text).ok_or_else(|| {
            DocumentError::malformed(
                line_number,
                format!("expected `key: value`, found {:?}", line.text.trim()),
            )
        })?;

        match key {
            NOTE_ID_KEY => {
                let id = parse_note_id(value, line_number)?;
                set_once(&mut note_id, id, key, line_number)?
            }
            DECK_NAME_KEY => set_once(&mut deck_name, value.to_string(), key, line_number)?,
            MODEL_NAME_KEY => set_once(&mut model_name, value.to_string(), key, line_number)?,
            TAGS_KEY => set_once(
                &mut tags,
                value.split_whitespace().map(str::to_string).collect(),
                key,
                line_number,
            )?,
            _ => {}
        }
    }

    Ok(PreambleRecord {
        note_id: note_id.flatten(),
        deck_name: required(deck_name, DECK_NAME_KEY)?,
        model_name: required(model_name, MODEL_NAME_KEY)?,
        tags: tags.unwrap_or_default(),
    })
}

fn parse_note_id(value: &str, line_number: usize) -> Result<Option<i64>, DocumentError> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<i64>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(DocumentError::malformed(
            line_number,
            format!("`{NOTE_ID_KEY}` must be a positive integer, found {value:?}"),
        )),
    }
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    key: &str,
    line_number: usize,
) -> Result<(), DocumentError> {
    if slot.is_some() {
        return Err(DocumentError::malformed(
            line_number,
            format!("key `{key}` is given more than once"),
        ));
    }
    *slot = Some(value);
    Ok(())
}

fn required(value: Option<String>, key: &'static str) -> Result<String, DocumentError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(DocumentError::MissingField(key))
}
