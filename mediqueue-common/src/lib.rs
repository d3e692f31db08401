pub mod snapshot;
pub mod types;

pub use snapshot::{QueueSnapshot, SnapshotError};
pub use types::{
    DoctorQueue, DoctorQueueStats, EntryStatus, QueueEntry, QueueStatusPayload, QueuedPatient,
};
