use crate::constants::TEMP_FILE_PREFIX;
use crate::domain::DocumentError;
use crate::infrastructure::note_file::document::split_document;
use crate::infrastructure::note_file::preamble::{split_key_value, NOTE_ID_KEY};
use crate::util::text::lines;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Read note file content
pub fn read_note_file(path: impl AsRef<Path>) -> io::Result<String> {
    fs::read_to_string(path.as_ref())
}

/// Return `content` with the preamble's `note_id` set to `note_id`.
///
/// Only the value of the `note_id` line changes. When the key is missing a
/// `note_id: <id>` line is inserted right after the opening delimiter, using
/// the file's own line ending.
pub fn set_note_id(content: &str, note_id: i64) -> Result<String, DocumentError> {
    let document = split_document(content)?;

    for line in lines(document.preamble) {
        let Some((key, value)) = split_key_value(line.text) else {
            continue;
        };
        if key != NOTE_ID_KEY {
            continue;
        }

        let line_start = document.preamble_start + line.start;
        // split_key_value found a ':', so this cannot fail
        let colon = line.text.find(':').unwrap_or(0);
        let after_colon = &line.text[colon + 1..];
        let value_start = colon + 1 + (after_colon.len() - after_colon.trim_start().len());
        let value_end = value_start + value.len();

        let replacement = if value.is_empty() && value_start == colon + 1 {
            format!(" {note_id}")
        } else {
            note_id.to_string()
        };

        let mut updated = String::with_capacity(content.len() + replacement.len());
        updated.push_str(&content[..line_start + value_start]);
        updated.push_str(&replacement);
        updated.push_str(&content[line_start + value_end..]);
        return Ok(updated);
    }

    let insert_at = document.preamble_start;
    let mut updated = String::with_capacity(content.len() + 32);
    updated.push_str(&content[..insert_at]);
    updated.push_str(&format!("{NOTE_ID_KEY}: {note_id}"));
    updated.push_str(document.line_ending);
    updated.push_str(&content[insert_at..]);
    Ok(updated)
}

/// Replace `path` with `content` so the file is never observed half written.
///
/// The content goes to a temporary file in the same directory first, which is
/// then renamed over the original. If anything fails before the rename the
/// temporary file is removed and the original stays untouched. A symlink is
/// resolved first, so the link stays a link and its target is rewritten.
pub fn write_atomically(path: impl AsRef<Path>, content: &str) -> io::Result<()> {
    let path = fs::canonicalize(path.as_ref())?;
    let path = path.as_path();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Record `note_id` in the note file at `path`.
pub fn persist_note_id(path: impl AsRef<Path>, note_id: i64) -> Result<()> {
    let path = path.as_ref();
    let content = read_note_file(path).context("Failed to read note file")?;
    let updated = set_note_id(&content, note_id).context("Note file is no longer well formed")?;
    write_atomically(path, &updated).context("Failed to write note file")?;
    debug!(?path, note_id, "Recorded note id in file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn given_existing_note_id_line_when_setting_then_only_value_changes() {
        let content = "---\ndeck_name: D\nnote_id: 1\nmodel_name: M\n---\n\n## Front\nQ\n";

        let updated = set_note_id(content, 1700000000000).unwrap();

        assert_eq!(
            updated,
            "---\ndeck_name: D\nnote_id: 1700000000000\nmodel_name: M\n---\n\n## Front\nQ\n"
        );
    }

    #[test]
    fn given_missing_note_id_when_setting_then_inserts_after_opening_delimiter() {
        let content = "---\ndeck_name: D\nmodel_name: M\n---\n## Front\nQ";

        let updated = set_note_id(content, 42).unwrap();

        assert_eq!(
            updated,
            "---\nnote_id: 42\ndeck_name: D\nmodel_name: M\n---\n## Front\nQ"
        );
    }

    #[test]
    fn given_empty_note_id_value_when_setting_then_fills_line_in_place() {
        let content = "---\ndeck_name: D\nnote_id:\nmodel_name: M\n---\n## F\nQ\n";

        let updated = set_note_id(content, 7).unwrap();

        assert_eq!(updated, "---\ndeck_name: D\nnote_id: 7\nmodel_name: M\n---\n## F\nQ\n");
    }

    #[test]
    fn given_unusual_spacing_when_setting_then_keeps_spacing_around_value() {
        let content = "---\n  note_id :   5   \ndeck_name: D\n---\n";

        let updated = set_note_id(content, 99).unwrap();

        assert_eq!(updated, "---\n  note_id :   99   \ndeck_name: D\n---\n");
    }

    #[test]
    fn given_crlf_file_when_inserting_then_uses_crlf() {
        let content = "---\r\ndeck_name: D\r\nmodel_name: M\r\n---\r\n## F\r\nQ\r\n";

        let updated = set_note_id(content, 3).unwrap();

        assert_eq!(
            updated,
            "---\r\nnote_id: 3\r\ndeck_name: D\r\nmodel_name: M\r\n---\r\n## F\r\nQ\r\n"
        );
    }

    #[test]
    fn given_note_id_text_in_body_when_setting_then_body_is_untouched() {
        let content = "---\ndeck_name: D\nmodel_name: M\n---\n## Back\nnote_id: 123\n";

        let updated = set_note_id(content, 8).unwrap();

        assert_eq!(
            updated,
            "---\nnote_id: 8\ndeck_name: D\nmodel_name: M\n---\n## Back\nnote_id: 123\n"
        );
    }

    #[test]
    fn given_content_without_preamble_when_setting_then_fails() {
        assert!(set_note_id("## Front\nQ\n", 1).is_err());
    }

    #[test]
    fn given_file_when_writing_atomically_then_replaces_content_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("note.anki.md");
        fs::write(&path, "old").unwrap();

        write_atomically(&path, "new content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn given_missing_file_when_writing_atomically_then_fails_without_creating_it() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.anki.md");

        let result = write_atomically(&path, "content");

        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn given_rename_failure_when_writing_atomically_then_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // renaming a file over a directory fails after the temp file exists
        let path = temp_dir.path().join("note.anki.md");
        fs::create_dir(&path).unwrap();

        let result = write_atomically(&path, "content");

        assert!(result.is_err());
        assert!(path.is_dir());
        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("note.anki.md")]);
    }

    #[cfg(unix)]
    #[test]
    fn given_symlinked_note_file_when_persisting_id_then_target_changes_and_link_stays() {
        let temp_dir = TempDir::new().unwrap();
        let notes = temp_dir.path().join("notes");
        fs::create_dir(&notes).unwrap();
        let target = notes.join("real.anki.md");
        let link = temp_dir.path().join("link.anki.md");
        fs::write(&target, "---\ndeck_name: D\nmodel_name: M\n---\n## Front\nQ\n").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        persist_note_id(&link, 5).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert!(fs::read_to_string(&target).unwrap().starts_with("---\nnote_id: 5\n"));
        assert_eq!(fs::read_dir(&notes).unwrap().count(), 1);
    }

    #[test]
    fn given_note_file_when_persisting_id_then_file_has_id() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("note.anki.md");
        fs::write(&path, "---\ndeck_name: D\nmodel_name: M\n---\n## Front\nQ\n").unwrap();

        persist_note_id(&path, 1234).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("---\nnote_id: 1234\n"));
    }

    #[test]
    fn given_file_without_preamble_when_persisting_id_then_leaves_file_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("note.anki.md");
        fs::write(&path, "no preamble").unwrap();

        let result = persist_note_id(&path, 1234);

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "no preamble");
    }
}
