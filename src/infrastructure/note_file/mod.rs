//! Reading the `.anki.md` note file format: a `---` delimited `key: value`
//! preamble followed by `## Field` sections.
pub mod document;
pub mod parser;
pub mod preamble;
pub mod sections;

pub use parser::{parse_note_file, parse_note_str};
