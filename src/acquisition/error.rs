use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse JSON payload")]
    JsonParse(#[from] serde_json::Error),

    /// Structurally valid JSON that does not describe a usable forecast
    /// (mismatched array lengths, missing hours for the target date, ...).
    #[error("Malformed upstream payload: {0}")]
    Payload(String),
}

impl AcquisitionError {
    /// Transient failures are retried; malformed payloads are not, since the
    /// same bytes would come back again.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            AcquisitionError::Timeout(_)
                | AcquisitionError::NetworkRequest(_, _)
                | AcquisitionError::HttpStatus { .. }
        )
    }
}
