pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{JsonAgendaPersistence, KeyValueStore, SqliteKeyValueStore};
use crate::error::StorageError;
use crate::services::{AgendaStore, AppointmentPolicy};
use crate::state::AppState;

/// Opens storage, loads the agenda and returns ready-to-serve state.
pub async fn build_state(config: &AppConfig) -> Result<AppState, StorageError> {
    let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::connect(&config.database_url).await?);
    let persistence = JsonAgendaPersistence::new(kv, config.storage_key.clone());

    let mut store = AgendaStore::new(Arc::new(persistence));
    store.initialize().await;

    Ok(AppState::new(store, AppointmentPolicy::new(config.past_grace)))
}
