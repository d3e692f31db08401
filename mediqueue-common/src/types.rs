use serde::{Deserialize, Serialize};

/// Status of one queue participant, as decided by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "waiting")]
    Waiting,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Current => "current",
            EntryStatus::Waiting => "waiting",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current" => Ok(EntryStatus::Current),
            "waiting" => Ok(EntryStatus::Waiting),
            _ => Err(format!("Unknown queue entry status: {}", s)),
        }
    }
}

/// One queue participant as seen by the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Opaque slot identifier, e.g. "T045"
    pub token: String,
    /// Label shown next to the token; the viewer's own row may read "You"
    #[serde(rename = "name")]
    pub display_name: String,
    pub status: EntryStatus,
}

impl QueueEntry {
    pub fn new(token: impl Into<String>, display_name: impl Into<String>, status: EntryStatus) -> Self {
        Self {
            token: token.into(),
            display_name: display_name.into(),
            status,
        }
    }
}

/// Body of `GET /queue/patient/{appointmentId}`.
///
/// Every field is optional and counters are signed so that a structurally
/// incomplete body still decodes; [`crate::QueueSnapshot::try_from`] decides
/// whether it is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patients_ahead: Option<i64>,

    #[serde(rename = "estimatedWaitTime", default, skip_serializing_if = "Option::is_none")]
    pub estimated_wait_minutes: Option<i64>,

    #[serde(rename = "queue", default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<QueueEntry>>,
}

/// A patient as listed in a doctor's queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedPatient {
    pub token: String,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    /// Slot time as displayed by the backend, e.g. "10:30 AM"
    #[serde(default)]
    pub appointment_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorQueueStats {
    /// Minutes
    #[serde(default)]
    pub avg_consultation_time: u32,
    #[serde(default)]
    pub total_patients_today: u32,
}

/// Body of `GET /queue/doctor/{doctorId}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorQueue {
    #[serde(default)]
    pub current_patient: Option<QueuedPatient>,
    #[serde(default)]
    pub next_patients: Vec<QueuedPatient>,
    #[serde(default)]
    pub stats: DoctorQueueStats,
}
