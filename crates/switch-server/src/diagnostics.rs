//! Diagnostic reporting sink.

use serde_json::Value;
use switch_protocol::CallId;
use tracing::{debug, warn};

use crate::lifecycle::LifecycleState;

/// Structured sink for dispatch traces and anomalies.
///
/// The default implementation forwards to `tracing`; tests install a
/// recording sink to observe entries deterministically. Nothing reported
/// here is fatal — every entry corresponds to a locally resolved condition.
pub trait DiagnosticSink: Send + Sync + 'static {
    /// A call event was delivered into an active call's inbox.
    fn event_delivered(&self, call_id: &CallId, payload: &Value);

    /// A call event arrived for a call id not present in the registry.
    /// The event is dropped after this report.
    fn inactive_call_event(&self, call_id: &CallId, payload: &Value);

    /// An offer arrived while the lifecycle state was outside the modeled
    /// enumeration; the call is rejected with cause `error`.
    fn unmodeled_lifecycle_state(&self, state: &LifecycleState, call_id: &CallId);

    /// An offer re-used an id already in the registry; the offer is
    /// rejected rather than admitted twice.
    fn duplicate_offer(&self, call_id: &CallId);
}

/// Default sink — forwards everything to `tracing`.
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn event_delivered(&self, call_id: &CallId, payload: &Value) {
        debug!(%call_id, %payload, "event received for call");
    }

    fn inactive_call_event(&self, call_id: &CallId, payload: &Value) {
        warn!(%call_id, %payload, "event received for inactive call");
    }

    fn unmodeled_lifecycle_state(&self, state: &LifecycleState, call_id: &CallId) {
        warn!(%state, %call_id, "offer during unmodeled lifecycle state, rejecting with error");
    }

    fn duplicate_offer(&self, call_id: &CallId) {
        warn!(%call_id, "offer for an already-registered call id");
    }
}
