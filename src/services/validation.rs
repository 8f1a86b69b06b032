use chrono::Duration;

use crate::error::ValidationError;

pub const DEFAULT_PAST_GRACE_SECS: i64 = 60;

/// A creation request that passed [`AppointmentPolicy::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub title: String,
    pub appointment_date: i64,
}

/// Input rules applied by the caller before an appointment is created.
/// The agenda store itself accepts any title and date.
#[derive(Debug, Clone, Copy)]
pub struct AppointmentPolicy {
    pub past_grace: Duration,
}

impl Default for AppointmentPolicy {
    fn default() -> Self {
        Self {
            past_grace: Duration::seconds(DEFAULT_PAST_GRACE_SECS),
        }
    }
}

impl AppointmentPolicy {
    pub fn new(past_grace: Duration) -> Self {
        Self { past_grace }
    }

    /// Trims `title` and rejects it when empty; rejects dates earlier than
    /// `now_ms` minus the grace window.
    pub fn validate(
        &self,
        title: &str,
        appointment_date: i64,
        now_ms: i64,
    ) -> Result<NewAppointment, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        if appointment_date < now_ms - self.past_grace.num_milliseconds() {
            return Err(ValidationError::InPast);
        }

        Ok(NewAppointment {
            title: title.to_string(),
            appointment_date,
        })
    }
}
