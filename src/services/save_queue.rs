use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::db::AgendaPersistence;
use crate::models::Appointment;

enum SaveRequest {
    Snapshot(Vec<Appointment>),
    Flush(oneshot::Sender<()>),
}

/// Serializes all agenda writes through one background task.
///
/// At most one save is in flight. Snapshots that pile up while a save runs
/// are collapsed so only the newest one is written next.
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveRequest>,
}

impl SaveQueue {
    /// Must be called from within a tokio runtime.
    pub fn spawn(persistence: Arc<dyn AgendaPersistence>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(persistence, rx));
        Self { tx }
    }

    pub fn enqueue(&self, snapshot: Vec<Appointment>) {
        if self.tx.send(SaveRequest::Snapshot(snapshot)).is_err() {
            warn!("save queue is closed, dropping snapshot");
        }
    }

    /// Resolves once every snapshot enqueued before this call is on disk
    /// (or superseded by a newer snapshot that is).
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SaveRequest::Flush(done_tx)).is_err() {
            warn!("save queue is closed, nothing to flush");
            return;
        }
        if done_rx.await.is_err() {
            warn!("save queue stopped before flush completed");
        }
    }
}

async fn run(
    persistence: Arc<dyn AgendaPersistence>,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
) {
    while let Some(first) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();
        let mut snapshots = 0usize;

        let mut next = Some(first);
        while let Some(request) = next {
            match request {
                SaveRequest::Snapshot(snapshot) => {
                    latest = Some(snapshot);
                    snapshots += 1;
                }
                SaveRequest::Flush(waiter) => waiters.push(waiter),
            }
            next = rx.try_recv().ok();
        }

        if let Some(snapshot) = latest {
            if snapshots > 1 {
                debug!("coalesced {} pending snapshots into one save", snapshots);
            }
            persistence.save(&snapshot).await;
        }

        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    debug!("save queue stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    /// Records every save; each save takes a little while so requests queue up.
    #[derive(Default)]
    struct RecordingPersistence {
        saves: Mutex<Vec<Vec<Appointment>>>,
    }

    #[async_trait]
    impl AgendaPersistence for RecordingPersistence {
        async fn load(&self) -> Vec<Appointment> {
            Vec::new()
        }

        async fn save(&self, appointments: &[Appointment]) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.saves
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(appointments.to_vec());
        }
    }

    fn snapshot(ids: &[i64]) -> Vec<Appointment> {
        ids.iter()
            .map(|&id| Appointment {
                id,
                title: format!("appointment {}", id),
                is_completed: false,
                created_at: id,
                appointment_date: id,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_flush_waits_for_enqueued_snapshot() {
        let persistence = Arc::new(RecordingPersistence::default());
        let queue = SaveQueue::spawn(persistence.clone());

        queue.enqueue(snapshot(&[1]));
        queue.flush().await;

        let saves = persistence.saves.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(saves.as_slice(), &[snapshot(&[1])]);
    }

    #[tokio::test]
    async fn test_last_write_is_latest_snapshot() {
        let persistence = Arc::new(RecordingPersistence::default());
        let queue = SaveQueue::spawn(persistence.clone());

        for n in 1..=10 {
            let ids: Vec<i64> = (1..=n).collect();
            queue.enqueue(snapshot(&ids));
        }
        queue.flush().await;

        let saves = persistence.saves.lock().unwrap_or_else(|e| e.into_inner());
        let expected: Vec<i64> = (1..=10).collect();
        assert_eq!(saves.last(), Some(&snapshot(&expected)));
        assert!(saves.len() < 10, "expected coalescing, got {} saves", saves.len());
        // writes never go backwards
        for pair in saves.windows(2) {
            assert!(pair[0].len() < pair[1].len());
        }
    }

    #[tokio::test]
    async fn test_flush_without_snapshots_returns() {
        let persistence = Arc::new(RecordingPersistence::default());
        let queue = SaveQueue::spawn(persistence.clone());

        queue.flush().await;
        assert!(persistence.saves.lock().unwrap_or_else(|e| e.into_inner()).is_empty());
    }
}
