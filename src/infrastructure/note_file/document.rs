use crate::domain::DocumentError;
use crate::util::text::{lines, Line};

pub const DELIMITER: &str = "---";

/// A note file cut into preamble and body. All slices borrow from the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub preamble: &'a str,
    pub body: &'a str,
    /// Byte offset of the preamble within the raw text
    pub preamble_start: usize,
    /// File line number of the first preamble line
    pub preamble_first_line: usize,
    /// File line number of the first body line
    pub body_first_line: usize,
    /// Line ending of the opening delimiter, reused when inserting preamble lines
    pub line_ending: &'a str,
}

fn is_delimiter(line: &Line<'_>) -> bool {
    line.text.trim_end() == DELIMITER
}

/// Split raw note text into preamble and body at the `---` delimiter lines.
pub fn split_document(raw: &str) -> Result<SplitDocument<'_>, DocumentError> {
    let mut all = lines(raw);

    let opening = all.next().ok_or_else(|| {
        DocumentError::malformed(1, "empty file, expected `---` on the first line")
    })?;
    if !is_delimiter(&opening) {
        return Err(DocumentError::malformed(
            1,
            format!("expected `---` on the first line, found {:?}", opening.text),
        ));
    }

    let closing = all.find(is_delimiter).ok_or_else(|| {
        DocumentError::malformed(
            opening.number,
            "preamble is never closed by a `---` line",
        )
    })?;

    Ok(SplitDocument {
        preamble: &raw[opening.end()..closing.start],
        body: &raw[closing.end()..],
        preamble_start: opening.end(),
        preamble_first_line: opening.number + 1,
        body_first_line: closing.number + 1,
        line_ending: opening.terminator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_well_formed_file_when_splitting_then_separates_preamble_and_body() {
        let raw = "---\ndeck_name: D\nmodel_name: M\n---\n## Front\nQ\n";

        let document = split_document(raw).unwrap();

        assert_eq!(document.preamble, "deck_name: D\nmodel_name: M\n");
        assert_eq!(document.body, "## Front\nQ\n");
        assert_eq!(document.preamble_start, 4);
        assert_eq!(document.preamble_first_line, 2);
        assert_eq!(document.body_first_line, 5);
        assert_eq!(document.line_ending, "\n");
    }

    #[test]
    fn given_text_before_delimiter_when_splitting_then_fails_on_line_one() {
        let raw = "# Title\n---\ndeck_name: D\n---\n";

        let err = split_document(raw).unwrap_err();

        assert!(matches!(err, DocumentError::Malformed { line: 1, .. }));
    }

    #[test]
    fn given_unclosed_preamble_when_splitting_then_fails() {
        let raw = "---\ndeck_name: D\nmodel_name: M\n## Front\nQ";

        let err = split_document(raw).unwrap_err();

        assert!(matches!(err, DocumentError::Malformed { .. }));
        assert!(err.to_string().contains("never closed"));
    }

    #[test]
    fn given_empty_file_when_splitting_then_fails() {
        assert!(split_document("").is_err());
    }

    #[test]
    fn given_crlf_file_when_splitting_then_keeps_crlf_line_ending() {
        let raw = "---\r\ndeck_name: D\r\n---\r\n## Front\r\nQ";

        let document = split_document(raw).unwrap();

        assert_eq!(document.preamble, "deck_name: D\r\n");
        assert_eq!(document.body, "## Front\r\nQ");
        assert_eq!(document.line_ending, "\r\n");
    }

    #[test]
    fn given_delimiter_with_trailing_spaces_when_splitting_then_accepts_it() {
        let raw = "---  \ndeck_name: D\n---\t\nbody";

        let document = split_document(raw).unwrap();

        assert_eq!(document.body, "body");
    }

    #[test]
    fn given_closing_delimiter_at_end_of_file_when_splitting_then_body_is_empty() {
        let document = split_document("---\nk: v\n---").unwrap();

        assert_eq!(document.body, "");
    }
}
