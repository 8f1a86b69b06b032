pub mod appointment;

pub use appointment::{AgendaSummary, Appointment, NewAppointmentRequest};
