//! Plain-text rendering of the queue display for the terminal

use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

use mediqueue_common::{DoctorQueue, QueuedPatient};

use crate::queue::{ProgressView, QueueViewState, RefreshError};

const BAR_WIDTH: usize = 30;
const RULE: &str = "────────────────────────────────────────";

/// Render the whole display for one state.
///
/// Without an appointment id only the explanation is shown. Other errors are
/// shown as a notice next to the last good progress, if there is one.
pub fn render_state(state: &QueueViewState) -> String {
    let mut out = String::new();

    if let Some(err @ RefreshError::MissingIdentifier) = &state.error {
        let _ = writeln!(out, "Live Queue Status");
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "{}.", capitalize(&err.to_string()));
        let _ = writeln!(out, "Open the tracker from an appointment to follow its queue.");
        return out;
    }

    let Some(progress) = &state.progress else {
        let _ = writeln!(out, "Live Queue Status");
        let _ = writeln!(out, "{}", RULE);
        match &state.error {
            Some(err) => {
                let _ = writeln!(out, "! {}", err);
                let _ = writeln!(out, "Waiting for the first update...");
            }
            None => {
                let _ = writeln!(out, "Loading queue status...");
            }
        }
        return out;
    };

    out.push_str(&render_progress(progress));

    if let Some(err) = &state.error {
        let _ = writeln!(out);
        let _ = writeln!(out, "! {} (showing last known status)", err);
    }
    if let Some(updated) = state.last_updated {
        let _ = writeln!(out);
        let _ = writeln!(out, "Last updated {}", format_time(updated));
    }

    out
}

pub fn render_progress(view: &ProgressView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Live Queue Status");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Your token            {}", or_dash(&view.my_token));
    let _ = writeln!(out, "Now serving           {}", or_dash(&view.current_token));
    if view.is_queued() {
        let _ = writeln!(out, "Patients ahead of you {}", view.patients_ahead);
        let _ = writeln!(out, "Estimated wait        {} minutes", view.estimated_wait_minutes);
    } else {
        let _ = writeln!(out, "You are not waiting in this queue.");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Queue progress");
    let _ = writeln!(out, "{} {:>3}%", progress_bar(view.percent_complete), view.percent_complete.round());

    let _ = writeln!(out);
    let _ = writeln!(out, "Current queue ({} patients)", view.total_in_queue);
    for (idx, row) in view.rows.iter().enumerate() {
        let badge = if row.is_current {
            "[Current]"
        } else if row.is_mine {
            "[You]"
        } else {
            ""
        };
        let marker = if row.is_mine { '>' } else { ' ' };
        let line = format!(
            "{} {:>2}. {:<6} {:<20} {}",
            marker,
            idx + 1,
            row.entry.token,
            row.entry.display_name,
            badge
        );
        // Rows without a badge would otherwise end in padding
        let _ = writeln!(out, "{}", line.trim_end());
    }

    if !view.duplicate_tokens.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "! Listed more than once: {}", view.duplicate_tokens.join(", "));
    }

    out
}

pub fn render_doctor_queue(doctor_id: &str, queue: &DoctorQueue) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Doctor queue for {}", doctor_id);
    let _ = writeln!(out, "{}", RULE);
    match &queue.current_patient {
        Some(patient) => {
            let _ = writeln!(out, "Now serving  {}", patient_line(patient));
        }
        None => {
            let _ = writeln!(out, "Now serving  -");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Up next ({})", queue.next_patients.len());
    for (idx, patient) in queue.next_patients.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {}", idx + 1, patient_line(patient));
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Avg consultation {} min, {} patients today",
        queue.stats.avg_consultation_time, queue.stats.total_patients_today
    );

    out
}

fn patient_line(patient: &QueuedPatient) -> String {
    let mut line = format!("{:<6} {}", patient.token, patient.name);
    if let Some(age) = patient.age {
        line.push_str(&format!(", {}", age));
    }
    if !patient.appointment_time.is_empty() {
        line.push_str(&format!(" @ {}", patient.appointment_time));
    }
    line
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn or_dash(token: &str) -> &str {
    if token.is_empty() { "-" } else { token }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::queue::derive_progress;
    use mediqueue_common::{DoctorQueueStats, EntryStatus, QueueEntry, QueueSnapshot};
    use std::sync::Arc;

    fn reference_view() -> ProgressView {
        let names = ["Patient A", "Patient B", "Patient C", "You", "Patient D"];
        let entries = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let status = if i == 0 { EntryStatus::Current } else { EntryStatus::Waiting };
                QueueEntry::new(format!("T04{}", 2 + i), *name, status)
            })
            .collect();
        derive_progress(&QueueSnapshot {
            my_token: "T045".to_string(),
            current_token: "T042".to_string(),
            patients_ahead: 3,
            estimated_wait_minutes: 45,
            entries,
        })
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(30)));
        assert_eq!(progress_bar(100.0), format!("[{}]", "#".repeat(30)));
        assert_eq!(progress_bar(20.0), format!("[{}{}]", "#".repeat(6), "-".repeat(24)));
    }

    #[test]
    fn test_render_progress() {
        let text = render_progress(&reference_view());
        assert!(text.contains("Your token            T045"));
        assert!(text.contains("Patients ahead of you 3"));
        assert!(text.contains("Estimated wait        45 minutes"));
        assert!(text.contains(" 20%"));
        assert!(text.contains("   1. T042   Patient A            [Current]\n"));
        assert!(text.contains(">  4. T045   You                  [You]\n"));
        assert!(text.contains("   5. T046   Patient D\n"));
    }

    #[test]
    fn test_render_not_queued() {
        let mut view = reference_view();
        view.position_from_front = 0;
        let text = render_progress(&view);
        assert!(text.contains("You are not waiting in this queue."));
        assert!(!text.contains("Patients ahead"));
    }

    #[test]
    fn test_missing_identifier_blocks_display() {
        let state = QueueViewState {
            progress: Some(Arc::new(reference_view())),
            error: Some(RefreshError::MissingIdentifier),
            ..Default::default()
        };
        let text = render_state(&state);
        assert!(text.contains("No appointment id provided."));
        assert!(!text.contains("Queue progress"));
    }

    #[test]
    fn test_error_notice_keeps_last_view() {
        let state = QueueViewState {
            progress: Some(Arc::new(reference_view())),
            error: Some(RefreshError::from(FetchError::Unavailable("offline".to_string()))),
            last_updated: Some(Utc::now()),
            sequence: 4,
        };
        let text = render_state(&state);
        assert!(text.contains("Queue progress"));
        assert!(text.contains("(showing last known status)"));
        assert!(text.contains("Last updated"));
    }

    #[test]
    fn test_loading_and_first_error() {
        assert!(render_state(&QueueViewState::default()).contains("Loading queue status..."));

        let state = QueueViewState {
            error: Some(RefreshError::from(FetchError::Unavailable("offline".to_string()))),
            ..Default::default()
        };
        assert!(render_state(&state).contains("Waiting for the first update..."));
    }

    #[test]
    fn test_render_doctor_queue() {
        let queue = DoctorQueue {
            current_patient: Some(QueuedPatient {
                token: "T042".to_string(),
                name: "Rajesh Kumar".to_string(),
                age: Some(45),
                appointment_time: "10:00 AM".to_string(),
            }),
            next_patients: vec![QueuedPatient {
                token: "T043".to_string(),
                name: "Priya Sharma".to_string(),
                age: None,
                appointment_time: String::new(),
            }],
            stats: DoctorQueueStats {
                avg_consultation_time: 12,
                total_patients_today: 24,
            },
        };
        let text = render_doctor_queue("d-7", &queue);
        assert!(text.contains("Now serving  T042   Rajesh Kumar, 45 @ 10:00 AM"));
        assert!(text.contains("   1. T043   Priya Sharma\n"));
        assert!(text.contains("Avg consultation 12 min, 24 patients today"));
    }
}
