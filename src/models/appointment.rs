use serde::{Deserialize, Serialize};

/// A scheduled, completable agenda entry.
///
/// Timestamps are epoch milliseconds. The serialized form uses camelCase
/// field names and is the persisted representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
    pub created_at: i64,
    pub appointment_date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointmentRequest {
    pub title: String,
    pub appointment_date: i64,
}

/// Counters over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgendaSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl AgendaSummary {
    pub fn from_appointments(appointments: &[Appointment]) -> Self {
        let total = appointments.len();
        let completed = appointments.iter().filter(|a| a.is_completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}
