//! Snapshot persistence for the in-progress session.

use tracing::{debug, warn};

use super::kv::KvStore;
use crate::error::StoreError;
use crate::timer::PhaseState;

pub const SESSION_KEY: &str = "study_timer.active_session";

/// Reads and writes the [`PhaseState`] snapshot in a [`KvStore`].
pub struct SessionStore<'a, S: KvStore + ?Sized> {
    kv: &'a S,
}

impl<'a, S: KvStore + ?Sized> SessionStore<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    /// Write a snapshot of `state`, replacing any previous one.
    pub fn save(&self, state: &PhaseState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)
            .map_err(|e| StoreError::QueryFailed(format!("encode session: {e}")))?;
        self.kv.set(SESSION_KEY, &json)
    }

    /// The stored snapshot, if there is one and it parses.
    ///
    /// An unparseable snapshot is removed and reported as absent.
    pub fn load(&self) -> Result<Option<PhaseState>, StoreError> {
        let Some(json) = self.kv.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<PhaseState>(&json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(error = %e, "discarding corrupt session snapshot");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// The snapshot of a session that should be resumed.
    ///
    /// A snapshot of a session that is no longer running is stale: it is
    /// removed and `None` is returned.
    pub fn recover(&self) -> Result<Option<PhaseState>, StoreError> {
        match self.load()? {
            Some(state) if state.running => Ok(Some(state)),
            Some(_) => {
                debug!("clearing stale session snapshot");
                self.clear()?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(SESSION_KEY)
    }
}
