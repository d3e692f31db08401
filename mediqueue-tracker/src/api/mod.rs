pub mod client;
pub mod source;

pub use client::QueueApiClient;
pub use source::{FetchError, SnapshotSource};
