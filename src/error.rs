use crate::divisions::error::{DivisionError, ResolveError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TianqiError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Division(#[from] DivisionError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
