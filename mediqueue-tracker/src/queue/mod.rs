//! Live queue position tracking for a single appointment

pub mod error;
pub mod progress;
pub mod view_model;

pub use error::{InitError, RefreshError};
pub use progress::{ProgressRow, ProgressView, derive_progress, percent_complete};
pub use view_model::{DEFAULT_POLL_INTERVAL, QueueStatusViewModel, QueueViewState};
