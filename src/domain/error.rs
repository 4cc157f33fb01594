// src/domain/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Problems with the content of a note file. Line numbers are 1-based file lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("missing required preamble key `{0}`")]
    MissingField(&'static str),
    #[error("no `## ` sections found in body")]
    NoSections,
    #[error("line {line}: duplicate section `{name}`")]
    DuplicateSection { name: String, line: usize },
}

impl DocumentError {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}

/// A parse failure tagged with the file it came from.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{}: failed to read note file: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
}

impl ParseError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Invalid { path, .. } => path,
        }
    }

    /// The content error, if the file could be read at all.
    pub fn document_error(&self) -> Option<&DocumentError> {
        match self {
            Self::Invalid { source, .. } => Some(source),
            Self::Io { .. } => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("note {0} does not exist in the collection")]
    NotFound(i64),
    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    pub fn other(message: impl std::fmt::Display) -> Self {
        Self::Other(message.to_string())
    }
}
