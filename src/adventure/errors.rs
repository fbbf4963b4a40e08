use thiserror::Error;

/// Errors that can arise while running an adventure session.
#[derive(Debug, Error)]
pub enum AdventureError {
    /// An asset could not be fetched from the content source.
    #[error("could not load {path}: {reason}")]
    ContentLoad { path: String, reason: String },

    /// An asset was fetched but is not a valid document.
    #[error("could not parse {path}: {source}")]
    ContentParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted player record is unreadable.
    #[error("save game corrupted: {0}")]
    SaveCorruption(#[source] serde_json::Error),

    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around JSON serialization errors (saving, writing content).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Gameplay input arrived before `start` or `continue`.
    #[error("no adventure session is active")]
    NoSession,
}

impl AdventureError {
    pub(crate) fn load(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ContentLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
