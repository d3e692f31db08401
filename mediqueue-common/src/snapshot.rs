use thiserror::Error;

use crate::types::{QueueEntry, QueueStatusPayload};

/// Why a decoded payload cannot be used as a snapshot for this viewer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("`{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("token {token} appears {count} times in the queue")]
    DuplicateMyToken { token: String, count: usize },

    #[error("patientsAhead is {patients_ahead} but token {token} is at position {position}")]
    PositionMismatch {
        token: String,
        patients_ahead: u32,
        position: usize,
    },
}

/// One validated, point-in-time view of a queue.
///
/// `entries` keeps the backend's order (front of the queue first); nothing
/// here sorts or deduplicates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Empty when the viewer is not queued
    pub my_token: String,
    /// May be empty, and may be absent from `entries`
    pub current_token: String,
    pub patients_ahead: u32,
    pub estimated_wait_minutes: u32,
    pub entries: Vec<QueueEntry>,
}

impl QueueSnapshot {
    /// 1-based position of the viewer's own entry, `None` if not queued
    pub fn my_position(&self) -> Option<usize> {
        if self.my_token.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .position(|e| e.token == self.my_token)
            .map(|idx| idx + 1)
    }

    /// Tokens occurring more than once, in order of first repetition
    pub fn duplicate_tokens(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !seen.insert(entry.token.as_str()) && !duplicates.contains(&entry.token) {
                duplicates.push(entry.token.clone());
            }
        }
        duplicates
    }

    fn check_consistency(&self) -> Result<(), SnapshotError> {
        if self.my_token.is_empty() {
            return Ok(());
        }

        let count = self.entries.iter().filter(|e| e.token == self.my_token).count();
        if count > 1 {
            return Err(SnapshotError::DuplicateMyToken {
                token: self.my_token.clone(),
                count,
            });
        }

        if let Some(position) = self.my_position() {
            if self.patients_ahead as usize != position - 1 {
                return Err(SnapshotError::PositionMismatch {
                    token: self.my_token.clone(),
                    patients_ahead: self.patients_ahead,
                    position,
                });
            }
        }

        Ok(())
    }
}

fn counter(field: &'static str, value: Option<i64>) -> Result<u32, SnapshotError> {
    let value = value.ok_or(SnapshotError::MissingField(field))?;
    u32::try_from(value).map_err(|_| SnapshotError::OutOfRange { field, value })
}

impl TryFrom<QueueStatusPayload> for QueueSnapshot {
    type Error = SnapshotError;

    fn try_from(payload: QueueStatusPayload) -> Result<Self, Self::Error> {
        let entries = payload.entries.ok_or(SnapshotError::MissingField("queue"))?;
        let my_token = payload.my_token.ok_or(SnapshotError::MissingField("myToken"))?;
        let patients_ahead = counter("patientsAhead", payload.patients_ahead)?;
        let estimated_wait_minutes = counter("estimatedWaitTime", payload.estimated_wait_minutes)?;

        let snapshot = QueueSnapshot {
            my_token,
            current_token: payload.current_token.unwrap_or_default(),
            patients_ahead,
            estimated_wait_minutes,
            entries,
        };
        snapshot.check_consistency()?;

        Ok(snapshot)
    }
}
