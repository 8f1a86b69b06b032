pub mod agenda_store;
pub mod ids;
pub mod save_queue;
pub mod validation;

pub use agenda_store::{AgendaStore, StoreState};
pub use validation::{AppointmentPolicy, NewAppointment};
