//! Active call registry.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use switch_protocol::{CallId, SignalError};
use tracing::debug;

use crate::call::ActiveCall;

/// Concurrent set of currently known calls, keyed by call id.
///
/// The only shared mutable structure in the core. All operations are safe
/// under concurrent dispatch and never touch I/O; `find`/`all` never
/// observe a partially inserted entry.
pub struct CallRegistry {
    calls: DashMap<CallId, Arc<ActiveCall>>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self {
            calls: DashMap::new(),
        }
    }

    /// Insert a call keyed by its id.
    ///
    /// Fails with [`SignalError::DuplicateCall`] if the id is already
    /// present — the registry never merges; avoiding re-adds is the
    /// caller's responsibility.
    pub fn add(&self, call: Arc<ActiveCall>) -> Result<(), SignalError> {
        match self.calls.entry(call.id.clone()) {
            Entry::Occupied(_) => Err(SignalError::DuplicateCall(call.id.clone())),
            Entry::Vacant(slot) => {
                debug!(call_id = %call.id, "call registered");
                slot.insert(call);
                Ok(())
            }
        }
    }

    /// Non-blocking lookup.
    pub fn find(&self, id: &CallId) -> Option<Arc<ActiveCall>> {
        self.calls.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Lookup for callers that treat absence as an error condition.
    pub fn get(&self, id: &CallId) -> Result<Arc<ActiveCall>, SignalError> {
        self.find(id).ok_or_else(|| SignalError::UnknownCall(id.clone()))
    }

    pub fn contains(&self, id: &CallId) -> bool {
        self.calls.contains_key(id)
    }

    /// Remove and return the call if present. Removing an absent id is a
    /// logged no-op and does not affect other entries.
    pub fn remove(&self, id: &CallId) -> Option<Arc<ActiveCall>> {
        match self.calls.remove(id) {
            Some((_, call)) => {
                debug!(call_id = %id, "call removed");
                Some(call)
            }
            None => {
                debug!(call_id = %id, "remove for a call not in the registry");
                None
            }
        }
    }

    /// Snapshot of all active calls, for diagnostics. Callers never see
    /// the live container.
    pub fn all(&self) -> Vec<Arc<ActiveCall>> {
        self.calls.iter().map(|entry| Arc::clone(entry.value())).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl Default for CallRegistry {
    fn default() -> Self {
        Self::new()
    }
}
