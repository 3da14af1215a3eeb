use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to read cache file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Corrupt cache entry '{0}'")]
    Corrupt(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode cache entry")]
    Encode(#[source] Box<bincode::error::EncodeError>),

    #[error("Failed to write cache file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
