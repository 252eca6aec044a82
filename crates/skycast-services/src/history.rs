//! Search history synchronizer.
//!
//! The local list is a copy of the service's and is never edited in place:
//! every successful mutation is followed by a full refetch.

use parking_lot::Mutex;
use skycast_auth::{Confirmer, SessionContext};
use skycast_core::{AppError, RequestSequence, Result, Ticket};
use std::sync::Arc;

use crate::client::ApiClient;
use crate::models::HistoryEntry;

/// Result of a deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; nothing was sent
    Cancelled,
}

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<HistoryEntry>,
    error: Option<String>,
}

pub struct HistoryView {
    api: Arc<ApiClient>,
    session: Arc<SessionContext>,
    confirmer: Arc<dyn Confirmer>,
    seq: RequestSequence,
    state: Mutex<HistoryState>,
}

impl HistoryView {
    pub fn new(
        api: Arc<ApiClient>,
        session: Arc<SessionContext>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            session,
            confirmer,
            seq: RequestSequence::new(),
            state: Mutex::new(HistoryState::default()),
        }
    }

    /// Entries as last fetched, in service order.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.state.lock().entries.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Re-fetch the full list.
    ///
    /// A response that arrives after a newer refresh was issued is dropped.
    pub async fn refresh(&self) -> Result<Vec<HistoryEntry>> {
        let token = self.session.require()?;
        let ticket = self.seq.issue();

        let result = self.api.list_history(&token).await;

        if let Err(e) = &result {
            self.session.handle_failure(&token, e);
        }
        if !self.commit(ticket, &result) {
            tracing::debug!("Dropping superseded history response");
        }
        result
    }

    /// Store `result` if `ticket` is still current; checked under the state lock.
    fn commit(&self, ticket: Ticket, result: &Result<Vec<HistoryEntry>>) -> bool {
        let mut state = self.state.lock();
        if !self.seq.is_current(ticket) {
            return false;
        }

        match result {
            Ok(entries) => {
                tracing::debug!("History has {} entries", entries.len());
                state.entries = entries.clone();
                state.error = None;
            }
            Err(e) => state.error = Some(e.user_message()),
        }
        true
    }

    /// Delete one entry after the user confirms, then refresh.
    pub async fn delete_entry(&self, id: i64) -> Result<DeleteOutcome> {
        let token = self.session.require()?;

        let label = self
            .state
            .lock()
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.city.clone());
        let prompt = match label {
            Some(city) => format!("Delete \"{}\" from your search history?", city),
            None => format!("Delete search history entry {}?", id),
        };

        if !self.confirmer.confirm(&prompt) {
            tracing::info!("History deletion of {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(e) = self.api.delete_history(&token, id).await {
            self.fail(&token, &e);
            return Err(e);
        }

        tracing::info!("Deleted history entry {}", id);
        // The deletion stands even if the list cannot be reloaded; the
        // refresh failure is kept in `error()`.
        if let Err(e) = self.refresh().await {
            tracing::warn!("History refresh after delete failed: {}", e);
        }
        Ok(DeleteOutcome::Deleted)
    }

    fn fail(&self, token: &str, error: &AppError) {
        self.session.handle_failure(token, error);
        self.state.lock().error = Some(error.user_message());
    }

    /// Ignore any response still in flight.
    pub fn leave(&self) {
        let _state = self.state.lock();
        self.seq.abandon();
    }
}
