use mediqueue_common::{EntryStatus, QueueEntry, QueueSnapshot};

/// One display row, in queue order
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRow {
    pub entry: QueueEntry,
    /// The entry is being served right now
    pub is_current: bool,
    /// The entry belongs to the viewer
    pub is_mine: bool,
}

/// Everything the rendering layer needs for one refresh.
///
/// Always built from scratch by [`derive_progress`] and replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    /// In `[0, 100]`
    pub percent_complete: f64,
    pub rows: Vec<ProgressRow>,
    pub my_token: String,
    pub current_token: String,
    pub patients_ahead: u32,
    pub estimated_wait_minutes: u32,
    pub total_in_queue: usize,
    /// 1-based; 0 when the viewer is not in the queue
    pub position_from_front: usize,
    /// Tokens listed more than once by the backend
    pub duplicate_tokens: Vec<String>,
}

impl ProgressView {
    pub fn is_queued(&self) -> bool {
        self.position_from_front > 0
    }

    pub fn my_row(&self) -> Option<&ProgressRow> {
        self.rows.iter().find(|row| row.is_mine)
    }
}

/// Share of the queue already behind the viewer, as a percentage.
///
/// Position 0 means the viewer has been served or has left the queue.
pub fn percent_complete(total_in_queue: usize, position_from_front: usize) -> f64 {
    if total_in_queue == 0 {
        return 0.0;
    }
    let total = total_in_queue as f64;
    let position = position_from_front as f64;
    (((total - position) / total) * 100.0).clamp(0.0, 100.0)
}

pub fn derive_progress(snapshot: &QueueSnapshot) -> ProgressView {
    let total_in_queue = snapshot.entries.len();
    let position_from_front = snapshot.my_position().unwrap_or(0);

    let rows = snapshot
        .entries
        .iter()
        .map(|entry| ProgressRow {
            entry: entry.clone(),
            is_current: entry.status == EntryStatus::Current,
            is_mine: !snapshot.my_token.is_empty() && entry.token == snapshot.my_token,
        })
        .collect();

    let duplicate_tokens = snapshot.duplicate_tokens();
    if !duplicate_tokens.is_empty() {
        tracing::warn!("Queue snapshot lists duplicate tokens: {:?}", duplicate_tokens);
    }

    ProgressView {
        percent_complete: percent_complete(total_in_queue, position_from_front),
        rows,
        my_token: snapshot.my_token.clone(),
        current_token: snapshot.current_token.clone(),
        patients_ahead: snapshot.patients_ahead,
        estimated_wait_minutes: snapshot.estimated_wait_minutes,
        total_in_queue,
        position_from_front,
        duplicate_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(my_token: &str, patients_ahead: u32, tokens: &[&str]) -> QueueSnapshot {
        QueueSnapshot {
            my_token: my_token.to_string(),
            current_token: tokens.first().map(|t| t.to_string()).unwrap_or_default(),
            patients_ahead,
            estimated_wait_minutes: patients_ahead * 15,
            entries: tokens
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let status = if i == 0 { EntryStatus::Current } else { EntryStatus::Waiting };
                    QueueEntry::new(*t, format!("Patient {}", t), status)
                })
                .collect(),
        }
    }

    #[test]
    fn test_reference_example() {
        let view = derive_progress(&snapshot("T045", 3, &["T042", "T043", "T044", "T045", "T046"]));
        assert_eq!(view.position_from_front, 4);
        assert_eq!(view.total_in_queue, 5);
        assert!((view.percent_complete - 20.0).abs() < 1e-9);
        assert_eq!(view.estimated_wait_minutes, 45);
        assert_eq!(view.current_token, "T042");
        assert_eq!(view.my_row().map(|r| r.entry.token.as_str()), Some("T045"));
        assert!(view.rows[0].is_current);
    }

    #[test]
    fn test_already_served() {
        let view = derive_progress(&snapshot("T041", 0, &["T042", "T043"]));
        assert_eq!(view.position_from_front, 0);
        assert_eq!(view.percent_complete, 100.0);
        assert!(!view.is_queued());
        assert!(view.rows.iter().all(|r| !r.is_mine));
    }

    #[test]
    fn test_empty_queue() {
        let view = derive_progress(&snapshot("T045", 0, &[]));
        assert_eq!(view.percent_complete, 0.0);
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_empty_my_token_marks_no_row() {
        let mut snap = snapshot("", 0, &["T042", "T043"]);
        snap.entries[1].token = String::new();
        let view = derive_progress(&snap);
        assert!(view.rows.iter().all(|r| !r.is_mine));
    }

    #[test]
    fn test_formula_for_every_position() {
        let tokens = ["A", "B", "C", "D", "E", "F", "G"];
        for (idx, token) in tokens.iter().enumerate() {
            let view = derive_progress(&snapshot(token, idx as u32, &tokens));
            let n = tokens.len() as f64;
            let p = (idx + 1) as f64;
            assert!((view.percent_complete - (n - p) / n * 100.0).abs() < 1e-9);
            assert!((0.0..=100.0).contains(&view.percent_complete));
            assert_eq!(view.rows.iter().filter(|r| r.is_mine).count(), 1);
        }
    }

    #[test]
    fn test_rows_preserve_backend_order() {
        let tokens = ["T050", "T003", "T999", "T001"];
        let view = derive_progress(&snapshot("T999", 2, &tokens));
        let order: Vec<&str> = view.rows.iter().map(|r| r.entry.token.as_str()).collect();
        assert_eq!(order, tokens);
    }

    #[test]
    fn test_current_and_mine_can_coincide() {
        let view = derive_progress(&snapshot("T042", 0, &["T042", "T043"]));
        assert!(view.rows[0].is_current && view.rows[0].is_mine);
        assert!((view.percent_complete - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicates_are_kept_and_reported() {
        let view = derive_progress(&snapshot("T045", 2, &["T042", "T042", "T045"]));
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.duplicate_tokens, vec!["T042".to_string()]);
    }

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(percent_complete(3, 10), 0.0);
        assert_eq!(percent_complete(0, 4), 0.0);
        assert_eq!(percent_complete(4, 0), 100.0);
    }

    #[test]
    fn test_padded_token_in_queue_is_found() {
        let payload = mediqueue_common::QueueStatusPayload {
            my_token: Some(" T043".to_string()),
            current_token: Some("T042".to_string()),
            patients_ahead: Some(1),
            estimated_wait_minutes: Some(15),
            entries: Some(vec![
                QueueEntry::new("T042", "Patient A", EntryStatus::Current),
                QueueEntry::new(" T043", "You", EntryStatus::Waiting),
            ]),
        };
        let view = derive_progress(&QueueSnapshot::try_from(payload).unwrap());

        assert_eq!(view.position_from_front, 2);
        assert!((view.percent_complete - 50.0).abs() < 1e-9);
        assert_eq!(view.rows.iter().filter(|r| r.is_mine).count(), 1);
        assert!(view.rows[1].is_mine);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let snap = snapshot("T044", 2, &["T042", "T043", "T044"]);
        assert_eq!(derive_progress(&snap), derive_progress(&snap));
    }
}
