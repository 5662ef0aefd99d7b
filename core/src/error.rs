use std::path::PathBuf;

use thiserror::Error;

/// Recoverable per-line failures. None of these abort ingestion: the caller
/// keeps the raw line and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unparsable line: {reason}")]
    UnparsableLine { reason: &'static str },

    #[error("unsupported event: {event}")]
    UnsupportedEvent { event: String },

    #[error("cannot extract {field} at parameter {index} of {event}")]
    FieldExtraction {
        event: String,
        field: &'static str,
        index: usize,
    },
}

impl ParseError {
    pub(crate) fn unparsable(reason: &'static str) -> Self {
        Self::UnparsableLine { reason }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
