use async_trait::async_trait;
use thiserror::Error;

use mediqueue_common::QueueStatusPayload;

/// Transport-level failure while fetching a queue snapshot
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
}

/// Where the view model gets queue snapshots from.
///
/// Implementations only fetch and decode; validation happens in the view
/// model so that every source is held to the same rules.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_queue_status(&self, appointment_id: &str) -> Result<QueueStatusPayload, FetchError>;
}
