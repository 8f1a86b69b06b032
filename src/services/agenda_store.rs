use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::db::AgendaPersistence;
use crate::models::{AgendaSummary, Appointment};
use crate::services::ids::IdSequence;
use crate::services::save_queue::SaveQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Loading,
    Ready,
}

/// Owns the agenda collection for the lifetime of the process.
///
/// Starts in [`StoreState::Loading`]; [`AgendaStore::initialize`] replaces
/// the collection with whatever was persisted and moves to
/// [`StoreState::Ready`]. From then on each mutation that changes the
/// collection queues a full-collection save.
///
/// Title and date rules are not checked here, see
/// [`AppointmentPolicy`](crate::services::AppointmentPolicy).
pub struct AgendaStore {
    persistence: Arc<dyn AgendaPersistence>,
    state: StoreState,
    appointments: Vec<Appointment>,
    ids: IdSequence,
    writer: Option<SaveQueue>,
}

impl AgendaStore {
    pub fn new(persistence: Arc<dyn AgendaPersistence>) -> Self {
        Self {
            persistence,
            state: StoreState::Loading,
            appointments: Vec::new(),
            ids: IdSequence::new(),
            writer: None,
        }
    }

    pub async fn initialize(&mut self) {
        if self.state == StoreState::Ready {
            warn!("agenda store already initialized");
            return;
        }

        let loaded = self.persistence.load().await;
        self.ids.observe(loaded.iter().map(|a| a.id));
        self.appointments = loaded;
        self.writer = Some(SaveQueue::spawn(self.persistence.clone()));
        self.state = StoreState::Ready;

        info!("agenda ready with {} appointments", self.appointments.len());
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    /// Storage order: most recently created first.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn create(&mut self, title: impl Into<String>, appointment_date: i64) -> Appointment {
        self.create_at(title, appointment_date, Utc::now().timestamp_millis())
    }

    /// Same as [`AgendaStore::create`] with an explicit creation time.
    pub fn create_at(
        &mut self,
        title: impl Into<String>,
        appointment_date: i64,
        now_ms: i64,
    ) -> Appointment {
        let id = match self.ids.next(now_ms) {
            Some(id) => id,
            None => {
                let id = self.smallest_unused_id();
                warn!("id sequence exhausted, reusing free id {}", id);
                id
            }
        };
        let appointment = Appointment {
            id,
            title: title.into(),
            is_completed: false,
            created_at: now_ms,
            appointment_date,
        };
        debug!("created appointment {}", appointment.id);

        self.appointments.insert(0, appointment.clone());
        self.persist();
        appointment
    }

    /// Flips `is_completed`. `None` when no appointment has `id`.
    pub fn toggle(&mut self, id: i64) -> Option<Appointment> {
        let appointment = self.appointments.iter_mut().find(|a| a.id == id)?;
        appointment.is_completed = !appointment.is_completed;
        let updated = appointment.clone();
        debug!("toggled appointment {} to completed={}", id, updated.is_completed);

        self.persist();
        Some(updated)
    }

    pub fn remove(&mut self, id: i64) -> Option<Appointment> {
        let index = self.appointments.iter().position(|a| a.id == id)?;
        let removed = self.appointments.remove(index);
        debug!("removed appointment {}", id);

        self.persist();
        Some(removed)
    }

    /// Display order: incomplete before completed, then by appointment date.
    pub fn ordered_view(&self) -> Vec<Appointment> {
        let mut sorted = self.appointments.clone();
        sorted.sort_by_key(|a| (a.is_completed, a.appointment_date));
        sorted
    }

    pub fn summary(&self) -> AgendaSummary {
        AgendaSummary::from_appointments(&self.appointments)
    }

    /// Waits until every save queued so far has been written.
    pub async fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush().await;
        }
    }

    /// Lowest non-negative id not held by any appointment. The collection is
    /// finite, so one always exists.
    fn smallest_unused_id(&self) -> i64 {
        let taken: HashSet<i64> = self.appointments.iter().map(|a| a.id).collect();
        let mut candidate = 0;
        while taken.contains(&candidate) {
            candidate += 1;
        }
        candidate
    }

    fn persist(&self) {
        match &self.writer {
            Some(writer) => writer.enqueue(self.appointments.clone()),
            None => debug!("store still loading, skipping save"),
        }
    }
}
