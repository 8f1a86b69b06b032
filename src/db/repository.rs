use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::db::KeyValueStore;
use crate::error::StorageError;
use crate::models::Appointment;

pub const DEFAULT_STORAGE_KEY: &str = "@agenda:appointments";

/// Whole-collection load/save boundary used by the agenda store.
///
/// Neither operation fails from the caller's point of view: a failed load
/// yields an empty collection, a failed save is logged and dropped.
#[async_trait]
pub trait AgendaPersistence: Send + Sync {
    async fn load(&self) -> Vec<Appointment>;
    async fn save(&self, appointments: &[Appointment]);
}

/// Stores the collection as one JSON array under a fixed key.
pub struct JsonAgendaPersistence {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl JsonAgendaPersistence {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { kv, key: key.into() }
    }

    pub fn with_default_key(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::new(kv, DEFAULT_STORAGE_KEY)
    }

    async fn try_load(&self) -> Result<Vec<Appointment>, StorageError> {
        match self.kv.get_item(&self.key).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn try_save(&self, appointments: &[Appointment]) -> Result<(), StorageError> {
        let json = serde_json::to_string(appointments)?;
        self.kv.set_item(&self.key, &json).await
    }
}

#[async_trait]
impl AgendaPersistence for JsonAgendaPersistence {
    async fn load(&self) -> Vec<Appointment> {
        match self.try_load().await {
            Ok(appointments) => {
                debug!("loaded {} appointments", appointments.len());
                appointments
            }
            Err(e) => {
                error!("failed to load appointments: {}", e);
                Vec::new()
            }
        }
    }

    async fn save(&self, appointments: &[Appointment]) {
        match self.try_save(appointments).await {
            Ok(()) => debug!("saved {} appointments", appointments.len()),
            Err(e) => error!("failed to save appointments: {}", e),
        }
    }
}
