//! Error types for replaykit.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for replaykit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No fixture exists at the resolved path
    #[error("Fixture not found: {}", path.display())]
    FixtureNotFound {
        /// Resolved fixture path
        path: PathBuf,
    },

    /// Fixture exists but could not be read
    #[error("Cannot read fixture {}: {source}", path.display())]
    FixtureRead {
        /// Resolved fixture path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Fixture could not be written (directory creation or file write)
    #[error("Cannot update fixture {}: {source}", path.display())]
    FixtureWrite {
        /// Resolved fixture path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Fixture content is not a valid HTTP response dump
    #[error("Malformed HTTP response in {}: {reason}", path.display())]
    MalformedResponse {
        /// Resolved fixture path
        path: PathBuf,
        /// What the parser rejected
        reason: String,
    },

    /// Upstream transport failure while recording
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request cannot be mapped or sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Mock session started twice without stop
    #[error("Mock session already started")]
    SessionAlreadyStarted,

    /// Mock session stopped without start
    #[error("Mock session not started")]
    SessionNotStarted,

    /// Output capture setup or teardown failure
    #[error("Capture error: {0}")]
    Capture(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an IO error raised while reading `path`.
    ///
    /// A missing file maps to [`Error::FixtureNotFound`] so callers can tell
    /// "never recorded" apart from "recorded but unreadable".
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::FixtureNotFound { path }
        } else {
            Error::FixtureRead { path, source }
        }
    }

    /// Wrap an IO error raised while writing `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FixtureWrite {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
