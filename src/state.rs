use std::sync::Arc;

use tokio::sync::Mutex;

use crate::services::{AgendaStore, AppointmentPolicy};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<AgendaStore>>,
    pub policy: AppointmentPolicy,
}

impl AppState {
    pub fn new(store: AgendaStore, policy: AppointmentPolicy) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            policy,
        }
    }
}
