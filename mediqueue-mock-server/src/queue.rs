//! Simulated single-doctor queue

use std::collections::VecDeque;

use mediqueue_common::{
    DoctorQueue, DoctorQueueStats, EntryStatus, QueueEntry, QueueStatusPayload, QueuedPatient,
};

const SEED: &[(&str, u32, &str)] = &[
    ("Rajesh Kumar", 45, "10:00 AM"),
    ("Priya Sharma", 32, "10:30 AM"),
    ("Amit Patel", 28, "11:00 AM"),
    ("Sunita Devi", 55, "11:30 AM"),
    ("Vikram Singh", 40, "12:00 PM"),
    ("Anita Reddy", 35, "12:30 PM"),
];
const FIRST_TOKEN: u32 = 42;
/// How many served tokens still resolve to a status
const SERVED_HISTORY: usize = 50;
const WALK_IN_NAMES: &[&str] = &["Kavya Nair", "Arjun Mehta", "Neha Gupta", "Rohan Das"];

#[derive(Debug, Clone)]
struct Patient {
    token: String,
    name: String,
    age: u32,
    appointment_time: String,
}

/// Appointment ids are derived from tokens, e.g. T045 -> apt-t045
pub fn appointment_id_for(token: &str) -> String {
    format!("apt-{}", token.to_lowercase())
}

fn token_for(number: u32) -> String {
    format!("T{:03}", number)
}

/// Letter label used when other patients' names are hidden, A, B, ..., Z, AA, ...
fn redacted_label(index: usize) -> String {
    let mut label = String::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        label.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    format!("Patient {}", label)
}

pub struct MockQueue {
    /// Front is the patient being seen
    waiting: VecDeque<Patient>,
    /// Most recently served last, at most `SERVED_HISTORY` tokens
    served: VecDeque<String>,
    next_number: u32,
    minutes_per_patient: u32,
    total_today: u32,
}

impl MockQueue {
    pub fn new(minutes_per_patient: u32) -> Self {
        let waiting: VecDeque<Patient> = SEED
            .iter()
            .enumerate()
            .map(|(i, (name, age, time))| Patient {
                token: token_for(FIRST_TOKEN + i as u32),
                name: name.to_string(),
                age: *age,
                appointment_time: time.to_string(),
            })
            .collect();

        Self {
            total_today: waiting.len() as u32,
            next_number: FIRST_TOKEN + waiting.len() as u32,
            waiting,
            served: VecDeque::with_capacity(SERVED_HISTORY),
            minutes_per_patient,
        }
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn current_token(&self) -> Option<&str> {
        self.waiting.front().map(|p| p.token.as_str())
    }

    /// Finish the current consultation and let a walk-in join at the back.
    /// Returns the token that was served.
    pub fn advance(&mut self) -> Option<String> {
        let served = self.waiting.pop_front()?;
        if self.served.len() == SERVED_HISTORY {
            self.served.pop_front();
        }
        self.served.push_back(served.token.clone());

        let number = self.next_number;
        self.next_number += 1;
        self.total_today += 1;
        self.waiting.push_back(Patient {
            token: token_for(number),
            name: WALK_IN_NAMES[number as usize % WALK_IN_NAMES.len()].to_string(),
            age: 30 + number % 40,
            appointment_time: "Walk-in".to_string(),
        });

        Some(served.token)
    }

    /// The queue as shown to the holder of `appointment_id`, or `None` if the
    /// appointment is unknown.
    pub fn patient_status(&self, appointment_id: &str) -> Option<QueueStatusPayload> {
        let position = self
            .waiting
            .iter()
            .position(|p| appointment_id_for(&p.token) == appointment_id);

        let my_token = match position {
            Some(idx) => self.waiting[idx].token.clone(),
            None => self
                .served
                .iter()
                .find(|t| appointment_id_for(t) == appointment_id)?
                .clone(),
        };

        let mut others = 0;
        let entries = self
            .waiting
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                let name = if Some(idx) == position {
                    "You".to_string()
                } else {
                    others += 1;
                    redacted_label(others - 1)
                };
                let status = if idx == 0 { EntryStatus::Current } else { EntryStatus::Waiting };
                QueueEntry::new(p.token.clone(), name, status)
            })
            .collect();

        let ahead = position.unwrap_or(0) as i64;
        Some(QueueStatusPayload {
            my_token: Some(my_token),
            current_token: self.current_token().map(str::to_string),
            patients_ahead: Some(ahead),
            estimated_wait_minutes: Some(ahead * self.minutes_per_patient as i64),
            entries: Some(entries),
        })
    }

    pub fn doctor_queue(&self) -> DoctorQueue {
        let to_wire = |p: &Patient| QueuedPatient {
            token: p.token.clone(),
            name: p.name.clone(),
            age: Some(p.age),
            appointment_time: p.appointment_time.clone(),
        };

        DoctorQueue {
            current_patient: self.waiting.front().map(to_wire),
            next_patients: self.waiting.iter().skip(1).map(to_wire).collect(),
            stats: DoctorQueueStats {
                avg_consultation_time: self.minutes_per_patient,
                total_patients_today: self.total_today,
            },
        }
    }
}
