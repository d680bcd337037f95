use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use randblem_core::{EmblemEvent, EmblemEventSink};
use tokio::sync::watch;

use crate::{AppError, RandomizerSnapshot};

/// Folds poller events into the shared snapshot and notifies subscribers.
#[derive(Clone)]
pub struct SnapshotEventSink {
    pub(crate) state: Arc<Mutex<RandomizerSnapshot>>,
    pub(crate) updates: watch::Sender<RandomizerSnapshot>,
}

#[async_trait]
impl EmblemEventSink for SnapshotEventSink {
    type Error = AppError;

    async fn emit(&self, event: EmblemEvent) -> Result<(), Self::Error> {
        let snapshot = {
            let mut state = self.state.lock().map_err(|_| AppError::StatePoisoned)?;
            state.apply(&event);
            state.clone()
        };
        self.updates.send_replace(snapshot);
        Ok(())
    }
}
