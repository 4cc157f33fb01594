// src/util/text.rs

/// One line of a text buffer, with its position in that buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number within the scanned text
    pub number: usize,
    /// Byte offset of the first character of the line
    pub start: usize,
    /// Line content without its terminator
    pub text: &'a str,
    /// `"\n"`, `"\r\n"`, or `""` for a final unterminated line
    pub terminator: &'a str,
}

impl Line<'_> {
    /// Byte offset just past the terminator.
    pub fn end(&self) -> usize {
        self.start + self.text.len() + self.terminator.len()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Iterate over the lines of `text`, keeping byte offsets and terminators.
///
/// Unlike `str::lines` this never loses information: concatenating
/// `text + terminator` of every line yields the input.
///
/// # Examples
///
/// ```
/// use ankisync::util::text::lines;
///
/// let collected: Vec<_> = lines("a\r\nb").map(|l| (l.text, l.terminator)).collect();
/// assert_eq!(collected, vec![("a", "\r\n"), ("b", "")]);
/// ```
pub fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .enumerate()
        .map(move |(index, raw)| {
            let content_len = if raw.ends_with("\r\n") {
                raw.len() - 2
            } else if raw.ends_with('\n') {
                raw.len() - 1
            } else {
                raw.len()
            };
            let line = Line {
                number: index + 1,
                start: offset,
                text: &raw[..content_len],
                terminator: &raw[content_len..],
            };
            offset += raw.len();
            line
        })
}

/// Drop the leading and trailing runs of blank lines, keep everything in between verbatim.
///
/// The terminator of the last kept line is dropped as well.
pub fn trim_blank_lines(text: &str) -> &str {
    let start = lines(text)
        .find(|line| !line.is_blank())
        .map(|line| line.start);

    let Some(start) = start else {
        return "";
    };

    let end = lines(text)
        .filter(|line| !line.is_blank())
        .last()
        .map(|line| line.start + line.text.len())
        .unwrap_or(start);

    &text[start..end]
}
