//! Event dispatcher — the single entry point for inbound signaling events.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use switch_protocol::{CallId, InboundEvent, RejectCause};
use switch_transport::{ConnectionAdapter, EventSink};
use tracing::{debug, warn};

use crate::call::ActiveCall;
use crate::diagnostics::DiagnosticSink;
use crate::latch::CompletionLatch;
use crate::lifecycle::{Admission, LifecycleGate, LifecycleState};
use crate::registry::CallRegistry;
use crate::router::{CallRouter, CallRouterDyn};

/// Classifies every inbound event and routes it to the registry, the
/// routing collaborator, or a component handler.
///
/// Re-entrant: the transport may invoke it from any number of delivery
/// tasks concurrently. Events for the same call id reach that call's inbox
/// in arrival order — the inbox channel is the per-id serialization point;
/// there is no global lock across calls.
pub struct EventDispatcher {
    registry: Arc<CallRegistry>,
    gate: Arc<LifecycleGate>,
    router: Arc<dyn CallRouterDyn>,
    connection: ConnectionAdapter,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl EventDispatcher {
    pub fn new<R: CallRouter>(
        registry: Arc<CallRegistry>,
        gate: Arc<LifecycleGate>,
        router: Arc<R>,
        connection: ConnectionAdapter,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            gate,
            router,
            connection,
            diagnostics,
        })
    }

    /// Dispatch one event, optionally counting down `latch` once local
    /// handling completes. The latch is for deterministic observation in
    /// tests; production callers pass `None` via [`EventSink::on_event`].
    pub fn dispatch(&self, event: InboundEvent, latch: Option<Arc<CompletionLatch>>) {
        match event {
            InboundEvent::Offer { call_id, headers } => self.dispatch_offer(call_id, headers),
            InboundEvent::CallEvent { call_id, payload } => {
                self.dispatch_call_event(call_id, payload)
            }
            InboundEvent::ComponentEvent {
                call_id,
                component,
                payload,
            } => {
                // Component targets are self-describing; the registry is
                // not consulted.
                debug!(%call_id, component = component.id(), "component event");
                component.trigger(&call_id, payload);
            }
        }

        if let Some(latch) = latch {
            latch.count_down();
        }
    }

    fn dispatch_offer(&self, call_id: CallId, headers: HashMap<String, String>) {
        let state = self.gate.state();
        match Admission::for_state(&state) {
            Admission::Accept => {
                let call = ActiveCall::from_offer(call_id.clone(), headers);
                match self.registry.add(Arc::clone(&call)) {
                    Ok(()) => {
                        debug!(%call_id, "offer accepted");
                        // The router runs on its own task so event intake
                        // never waits on controller selection.
                        let router = Arc::clone(&self.router);
                        tokio::spawn(async move {
                            router.dispatch_dyn(call).await;
                        });
                    }
                    Err(_) => {
                        self.diagnostics.duplicate_offer(&call_id);
                        self.connection.reject(&call_id, RejectCause::Error);
                    }
                }
            }
            Admission::Reject(cause) => {
                if matches!(state, LifecycleState::Other(_)) {
                    self.diagnostics.unmodeled_lifecycle_state(&state, &call_id);
                } else {
                    debug!(%call_id, %state, %cause, "offer rejected");
                }
                self.connection.reject(&call_id, cause);
            }
        }
    }

    fn dispatch_call_event(&self, call_id: CallId, payload: Value) {
        match self.registry.get(&call_id) {
            Ok(call) => {
                self.diagnostics.event_delivered(&call_id, &payload);
                if !call.deliver(payload) {
                    warn!(%call_id, "inbox consumer gone, event dropped");
                }
            }
            // Non-fatal: report and drop, never propagate.
            Err(_) => self.diagnostics.inactive_call_event(&call_id, &payload),
        }
    }
}

impl EventSink for EventDispatcher {
    fn on_event(&self, event: InboundEvent) {
        self.dispatch(event, None);
    }
}
