//! Active call state and its inbox.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use switch_protocol::CallId;
use tokio::sync::mpsc;

/// A call the dispatcher has admitted.
///
/// Owned by the registry from creation until explicit removal; the
/// dispatcher and router hold only transient `Arc` references. The inbox
/// is an unbounded FIFO channel — enqueueing never blocks, and the send
/// order is the delivery order the single consumer observes.
pub struct ActiveCall {
    pub id: CallId,
    /// Signaling headers carried on the initial offer.
    pub headers: HashMap<String, String>,
    inbox_tx: mpsc::UnboundedSender<Value>,
    inbox_rx: Mutex<Option<CallInbox>>,
}

impl ActiveCall {
    /// Build a call from an accepted offer.
    pub fn from_offer(id: CallId, headers: HashMap<String, String>) -> Arc<Self> {
        let (inbox_tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            id,
            headers,
            inbox_tx,
            inbox_rx: Mutex::new(Some(CallInbox { rx })),
        })
    }

    /// Enqueue an event payload into the inbox. Non-blocking.
    ///
    /// Returns `false` if the consumer has dropped the inbox.
    pub fn deliver(&self, payload: Value) -> bool {
        self.inbox_tx.send(payload).is_ok()
    }

    /// Hand the inbox to its single consumer. Later calls return `None`.
    pub fn take_inbox(&self) -> Option<CallInbox> {
        self.inbox_rx.lock().take()
    }
}

impl fmt::Debug for ActiveCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveCall")
            .field("id", &self.id)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Receiving half of a call's inbox. One consumer per call.
pub struct CallInbox {
    rx: mpsc::UnboundedReceiver<Value>,
}

impl CallInbox {
    /// Receive the next event, in arrival order. `None` once the call's
    /// sender side is gone and the queue is drained.
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    /// Non-blocking receive, for draining in tests and diagnostics.
    pub fn try_recv(&mut self) -> Option<Value> {
        self.rx.try_recv().ok()
    }
}
