//! Inbound signaling events and their building blocks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque per-call identifier, assigned by the transport on the initial
/// offer and carried on every subsequent event for that call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CallId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Cause code sent back through the transport when an offer is not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCause {
    /// The server declined the call (known lifecycle state, not accepting).
    Declined,
    /// The server could not make a sound admission decision.
    Error,
}

impl RejectCause {
    /// Cause token as it appears on the wire.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::Declined => "decline",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RejectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// Handler entry point a component event carries with it.
///
/// Component targets are self-describing: the dispatcher invokes this
/// directly, without consulting the call registry.
pub trait ComponentHandler: Send + Sync + 'static {
    fn trigger_event(&self, call_id: &CallId, payload: Value);
}

/// Reference to a sub-resource of a call (e.g. a media action) bundled
/// with its own event handler.
#[derive(Clone)]
pub struct ComponentRef {
    id: String,
    handler: Arc<dyn ComponentHandler>,
}

impl ComponentRef {
    pub fn new(id: impl Into<String>, handler: Arc<dyn ComponentHandler>) -> Self {
        Self {
            id: id.into(),
            handler,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Invoke the embedded handler with an event payload.
    pub fn trigger(&self, call_id: &CallId, payload: Value) {
        self.handler.trigger_event(call_id, payload);
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Every event the transport can deliver to the dispatcher.
///
/// Ownership transfers from the connection to the dispatcher on delivery,
/// then to the target inbox or handler.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// Initial signaling event announcing a new inbound call.
    Offer {
        call_id: CallId,
        /// Signaling headers carried on the offer (to/from etc.).
        headers: HashMap<String, String>,
    },
    /// Subsequent event scoped to an already-known call.
    CallEvent { call_id: CallId, payload: Value },
    /// Event scoped to a sub-resource of a call, carrying its own handler.
    ComponentEvent {
        call_id: CallId,
        component: ComponentRef,
        payload: Value,
    },
}

impl InboundEvent {
    /// The call this event belongs to.
    pub fn call_id(&self) -> &CallId {
        match self {
            Self::Offer { call_id, .. }
            | Self::CallEvent { call_id, .. }
            | Self::ComponentEvent { call_id, .. } => call_id,
        }
    }

    /// Offer with no headers, mostly useful in tests.
    pub fn offer(call_id: impl Into<CallId>) -> Self {
        Self::Offer {
            call_id: call_id.into(),
            headers: HashMap::new(),
        }
    }
}
