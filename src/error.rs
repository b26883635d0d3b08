use std::io;

use thiserror::Error;

/// Terminal failure delivered through an upload event stream.
///
/// Stream errors are cloneable so a single terminal failure can be replayed
/// to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StreamError {
    message: String,
}

impl StreamError {
    /// Creates a stream error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error type produced by upload transfer and delete operations.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The underlying move primitive failed.
    #[error("error transferring upload `{name}`")]
    Io {
        /// Field name of the upload being transferred.
        name: String,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// A unique temporary destination could not be created.
    #[error("unable to create temporary destination")]
    TempFile {
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The event stream terminated without the upload reaching completion.
    #[error("transfer did not complete")]
    Incomplete,
    /// The upload was already transferred by an earlier call.
    #[error("upload was already transferred")]
    AlreadyTransferred,
    /// The event stream failed before the upload completed.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Error returned when validating uploader configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The replay buffer limit must be greater than zero when set.
    #[error("replay buffer limit must be greater than zero")]
    InvalidReplayLimit,
}
