use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Transkripto's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Transkripto's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// No captions were available, or no language track could be resolved.
    #[error("no transcript available")]
    EmptyTranscript,

    /// The transcript source could not be reached or returned something unusable.
    #[error("failed to fetch transcript: {0}")]
    Fetch(String),

    /// The video exists but its owner has disabled captions.
    #[error("transcripts are disabled for video '{0}'")]
    TranscriptsDisabled(String),

    /// The video does not exist or is not playable.
    #[error("video '{0}' not found or unavailable")]
    VideoNotFound(String),

    #[error("could not extract a video id from '{0}'")]
    InvalidVideoUrl(String),

    /// The requested export format is not one of the supported formats.
    #[error("unsupported export format '{0}' (expected one of: txt, csv, json, docx, srt)")]
    UnsupportedFormat(String),

    /// The export destination could not be written.
    #[error("failed to write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_names_the_destination() {
        let err = Error::write(
            "/nope/out.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to write '/nope/out.txt'");
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn anyhow_errors_keep_their_context_chain() {
        let err: Error = anyhow::anyhow!("inner").context("outer").into();
        assert_eq!(err.to_string(), "outer: inner");
    }
}
