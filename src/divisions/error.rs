use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DivisionError {
    #[error("Failed to read division dataset '{0}'")]
    DatasetRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse division dataset")]
    DatasetParse(#[from] serde_json::Error),

    #[error("Failed to read dataset snapshot '{0}'")]
    SnapshotRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode dataset snapshot '{0}'")]
    SnapshotDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode dataset snapshot")]
    SnapshotEncode(#[source] Box<bincode::error::EncodeError>),

    #[error("Failed to write dataset snapshot '{0}'")]
    SnapshotWrite(PathBuf, #[source] std::io::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// No candidate at any level, including parent fallback, reached the
    /// minimum confidence floor.
    #[error("No administrative division matches '{query}'")]
    PlaceNotFound { query: String },
}
