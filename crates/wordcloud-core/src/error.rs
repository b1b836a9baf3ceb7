use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::stream::StreamMode;

/// Coarse classification used by callers that only care about which stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Resource,
    Validation,
    Parse,
    Render,
}

#[derive(Debug, Error)]
pub enum WordcloudError {
    #[error("invalid argument: argument \"-\" with mode {mode}")]
    UnsupportedStandardStream { mode: StreamMode },

    #[error("can't open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {label}: {source}")]
    Read {
        label: String,
        #[source]
        source: io::Error,
    },

    #[error("specify either a color mask or a color function")]
    ConflictingColorOptions,

    #[error("invalid argument: {0}")]
    InvalidArguments(String),

    #[error("{label}:{line_number}: {reason} in line '{line}'")]
    Wordlist {
        label: String,
        line_number: usize,
        line: String,
        reason: WordlistIssue,
    },

    #[error("failed to decode image {label}: {source}")]
    ImageDecode {
        label: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode PNG: {0}")]
    ImageEncode(#[source] image::ImageError),

    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("unsupported color mode '{0}' (expected RGB or RGBA)")]
    UnsupportedColorMode(String),

    #[error("failed to write {label}: {source}")]
    Write {
        label: String,
        #[source]
        source: io::Error,
    },
}

/// Reason a wordlist line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordlistIssue {
    #[error("missing ';' separator")]
    MissingSeparator,
    #[error("expected exactly one ';' separator")]
    ExtraSeparator,
    #[error("count '{0}' is not a non-negative integer")]
    InvalidCount(String),
}

impl WordcloudError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedStandardStream { .. }
            | Self::Open { .. }
            | Self::Read { .. }
            | Self::ImageDecode { .. } => ErrorKind::Resource,
            Self::ConflictingColorOptions | Self::InvalidArguments(_) => ErrorKind::Validation,
            Self::Wordlist { .. } => ErrorKind::Parse,
            Self::ImageEncode(_)
            | Self::InvalidColor(_)
            | Self::UnsupportedColorMode(_)
            | Self::Write { .. } => ErrorKind::Render,
        }
    }
}

pub type WordcloudResult<T> = Result<T, WordcloudError>;
