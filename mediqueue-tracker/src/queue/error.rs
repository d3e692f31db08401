use std::sync::Arc;
use thiserror::Error;

use mediqueue_common::SnapshotError;

use crate::api::FetchError;

#[derive(Debug, Clone, Error)]
pub enum InitError {
    #[error("no appointment id provided")]
    MissingIdentifier,

    #[error("already tracking appointment {0}")]
    AlreadyInitialized(String),

    #[error("queue tracking has been stopped")]
    Disposed,
}

#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    #[error("no appointment id provided")]
    MissingIdentifier,

    #[error("failed to load queue status: {0}")]
    FetchFailed(#[source] Arc<FetchError>),

    #[error("queue status is inconsistent: {0}")]
    InvalidSnapshot(#[from] SnapshotError),

    #[error("queue tracking has not been started")]
    NotInitialized,

    #[error("refresh #{seq} was overtaken by a newer one")]
    Superseded { seq: u64 },

    #[error("queue tracking has been stopped")]
    Disposed,
}

impl RefreshError {
    /// Errors that end up in the observable state. The others only describe
    /// what happened to one particular call.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            RefreshError::MissingIdentifier | RefreshError::FetchFailed(_) | RefreshError::InvalidSnapshot(_)
        )
    }

    /// `MissingIdentifier` is the only error the display cannot recover from
    pub fn is_terminal(&self) -> bool {
        matches!(self, RefreshError::MissingIdentifier)
    }
}

impl From<FetchError> for RefreshError {
    fn from(err: FetchError) -> Self {
        RefreshError::FetchFailed(Arc::new(err))
    }
}
