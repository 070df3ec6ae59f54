//! Event dispatcher tests — admission gating, call event routing,
//! component delivery, and the completion latch.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use switch_protocol::{CallId, ComponentHandler, ComponentRef, InboundEvent, RejectCause};
    use switch_server::*;
    use switch_transport::{connect, ConnectionConfig, EventSink, Platform, RejectOutbox};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    struct RecordingRouter {
        tx: mpsc::UnboundedSender<Arc<ActiveCall>>,
    }

    impl CallRouter for RecordingRouter {
        async fn dispatch(&self, call: Arc<ActiveCall>) {
            let _ = self.tx.send(call);
        }
    }

    #[derive(Debug, PartialEq)]
    enum Entry {
        Delivered(CallId),
        Inactive(CallId),
        Unmodeled(String, CallId),
        Duplicate(CallId),
    }

    #[derive(Default)]
    struct RecordingDiagnostics {
        entries: Mutex<Vec<Entry>>,
    }

    impl DiagnosticSink for RecordingDiagnostics {
        fn event_delivered(&self, call_id: &CallId, _payload: &Value) {
            self.entries.lock().push(Entry::Delivered(call_id.clone()));
        }

        fn inactive_call_event(&self, call_id: &CallId, _payload: &Value) {
            self.entries.lock().push(Entry::Inactive(call_id.clone()));
        }

        fn unmodeled_lifecycle_state(&self, state: &LifecycleState, call_id: &CallId) {
            self.entries
                .lock()
                .push(Entry::Unmodeled(state.to_string(), call_id.clone()));
        }

        fn duplicate_offer(&self, call_id: &CallId) {
            self.entries.lock().push(Entry::Duplicate(call_id.clone()));
        }
    }

    struct Harness {
        registry: Arc<CallRegistry>,
        gate: Arc<LifecycleGate>,
        dispatcher: Arc<EventDispatcher>,
        outbox: RejectOutbox,
        routed: mpsc::UnboundedReceiver<Arc<ActiveCall>>,
        diagnostics: Arc<RecordingDiagnostics>,
    }

    fn harness() -> Harness {
        let config = ConnectionConfig {
            platform: Platform::Asterisk,
            host: Some("127.0.0.1".into()),
            port: Some(5038),
            ..ConnectionConfig::default()
        };
        let (adapter, outbox) = connect(&config).unwrap();

        let registry = Arc::new(CallRegistry::new());
        let gate = Arc::new(LifecycleGate::new());
        let (tx, routed) = mpsc::unbounded_channel();
        let diagnostics = Arc::new(RecordingDiagnostics::default());

        let dispatcher = EventDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&gate),
            Arc::new(RecordingRouter { tx }),
            adapter,
            Arc::clone(&diagnostics) as Arc<dyn DiagnosticSink>,
        );

        Harness {
            registry,
            gate,
            dispatcher,
            outbox,
            routed,
            diagnostics,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Offer admission
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn running_offer_is_accepted_and_routed() {
        let mut h = harness();
        h.gate.set_state(LifecycleState::Running);

        h.dispatcher.dispatch(InboundEvent::offer("42"), None);

        assert!(h.registry.contains(&CallId::new("42")));
        let routed = timeout(Duration::from_secs(1), h.routed.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(routed.id, CallId::new("42"));
        assert!(h.outbox.try_recv().is_none());
    }

    #[tokio::test]
    async fn booting_offer_is_declined() {
        let mut h = harness();
        assert_eq!(h.gate.state(), LifecycleState::Booting);

        h.dispatcher.dispatch(InboundEvent::offer("7"), None);

        assert!(!h.registry.contains(&CallId::new("7")));
        assert_eq!(
            h.outbox.try_recv(),
            Some((CallId::new("7"), RejectCause::Declined))
        );
        assert!(h.routed.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejecting_and_stopping_offers_are_declined() {
        for state in [LifecycleState::Rejecting, LifecycleState::Stopping] {
            let mut h = harness();
            h.gate.set_state(state);

            h.dispatcher.dispatch(InboundEvent::offer("7"), None);

            assert!(h.registry.is_empty());
            assert_eq!(
                h.outbox.try_recv(),
                Some((CallId::new("7"), RejectCause::Declined))
            );
        }
    }

    #[tokio::test]
    async fn unmodeled_state_offer_is_rejected_with_error() {
        let mut h = harness();
        h.gate.set_state(LifecycleState::Other("foobar".into()));

        h.dispatcher.dispatch(InboundEvent::offer("9"), None);

        assert!(!h.registry.contains(&CallId::new("9")));
        assert_eq!(
            h.outbox.try_recv(),
            Some((CallId::new("9"), RejectCause::Error))
        );
        assert_eq!(
            *h.diagnostics.entries.lock(),
            vec![Entry::Unmodeled("foobar".into(), CallId::new("9"))]
        );
    }

    #[tokio::test]
    async fn duplicate_offer_is_rejected_not_readmitted() {
        let mut h = harness();
        h.gate.set_state(LifecycleState::Running);

        h.dispatcher.dispatch(InboundEvent::offer("42"), None);
        h.dispatcher.dispatch(InboundEvent::offer("42"), None);

        assert_eq!(h.registry.len(), 1);
        assert_eq!(
            h.outbox.try_recv(),
            Some((CallId::new("42"), RejectCause::Error))
        );
        assert_eq!(
            *h.diagnostics.entries.lock(),
            vec![Entry::Duplicate(CallId::new("42"))]
        );

        // The router saw the first admission only.
        let first = timeout(Duration::from_secs(1), h.routed.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.id, CallId::new("42"));
        assert!(h.routed.try_recv().is_err());
    }

    #[tokio::test]
    async fn accepted_offer_keeps_its_headers() {
        let mut h = harness();
        h.gate.set_state(LifecycleState::Running);

        let mut headers = HashMap::new();
        headers.insert("from".to_string(), "sip:bob@example.com".to_string());
        h.dispatcher.dispatch(
            InboundEvent::Offer {
                call_id: CallId::new("h1"),
                headers,
            },
            None,
        );

        let routed = timeout(Duration::from_secs(1), h.routed.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            routed.headers.get("from").map(String::as_str),
            Some("sip:bob@example.com")
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // Call events
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn call_event_reaches_the_active_call_inbox() {
        let h = harness();
        let call = ActiveCall::from_offer(CallId::new("5"), HashMap::new());
        let mut inbox = call.take_inbox().unwrap();
        h.registry.add(call).unwrap();

        h.dispatcher.dispatch(
            InboundEvent::CallEvent {
                call_id: CallId::new("5"),
                payload: json!({"kind": "answered"}),
            },
            None,
        );

        assert_eq!(inbox.try_recv().unwrap(), json!({"kind": "answered"}));
        assert_eq!(
            *h.diagnostics.entries.lock(),
            vec![Entry::Delivered(CallId::new("5"))]
        );
    }

    #[tokio::test]
    async fn call_events_for_one_call_stay_in_order() {
        let h = harness();
        let call = ActiveCall::from_offer(CallId::new("5"), HashMap::new());
        let mut inbox = call.take_inbox().unwrap();
        h.registry.add(call).unwrap();

        for seq in 0..10 {
            h.dispatcher.dispatch(
                InboundEvent::CallEvent {
                    call_id: CallId::new("5"),
                    payload: json!({"seq": seq}),
                },
                None,
            );
        }

        for seq in 0..10 {
            assert_eq!(inbox.try_recv().unwrap(), json!({"seq": seq}));
        }
    }

    #[tokio::test]
    async fn unknown_call_event_is_reported_once_and_dropped() {
        let h = harness();

        h.dispatcher.dispatch(
            InboundEvent::CallEvent {
                call_id: CallId::new("99"),
                payload: json!({"kind": "answered"}),
            },
            None,
        );

        assert!(h.registry.is_empty());
        assert_eq!(
            *h.diagnostics.entries.lock(),
            vec![Entry::Inactive(CallId::new("99"))]
        );
    }

    #[tokio::test]
    async fn concurrent_dispatch_preserves_per_call_order() {
        let h = harness();

        let mut inboxes = Vec::new();
        for id in ["a", "b"] {
            let call = ActiveCall::from_offer(CallId::new(id), HashMap::new());
            inboxes.push(call.take_inbox().unwrap());
            h.registry.add(call).unwrap();
        }

        let mut producers = Vec::new();
        for id in ["a", "b"] {
            let dispatcher = Arc::clone(&h.dispatcher);
            producers.push(tokio::spawn(async move {
                for seq in 0..100 {
                    dispatcher.dispatch(
                        InboundEvent::CallEvent {
                            call_id: CallId::new(id),
                            payload: json!({"seq": seq}),
                        },
                        None,
                    );
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        for inbox in &mut inboxes {
            for seq in 0..100 {
                assert_eq!(inbox.try_recv().unwrap(), json!({"seq": seq}));
            }
            assert!(inbox.try_recv().is_none());
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Component events
    // ─────────────────────────────────────────────────────────────────────

    struct RecordingHandler {
        seen: Mutex<Vec<(CallId, Value)>>,
    }

    impl ComponentHandler for RecordingHandler {
        fn trigger_event(&self, call_id: &CallId, payload: Value) {
            self.seen.lock().push((call_id.clone(), payload));
        }
    }

    #[tokio::test]
    async fn component_event_bypasses_the_registry() {
        let h = harness();
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
        });

        // The call id is not registered; the embedded handler is still hit.
        h.dispatcher.dispatch(
            InboundEvent::ComponentEvent {
                call_id: CallId::new("77"),
                component: ComponentRef::new("output-1", Arc::clone(&handler) as Arc<dyn ComponentHandler>),
                payload: json!({"complete": true}),
            },
            None,
        );

        let seen = handler.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], (CallId::new("77"), json!({"complete": true})));
        assert!(h.diagnostics.entries.lock().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Completion latch and the sink entry point
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn latch_observes_dispatch_completion() {
        let h = harness();
        let call = ActiveCall::from_offer(CallId::new("5"), HashMap::new());
        let mut inbox = call.take_inbox().unwrap();
        h.registry.add(call).unwrap();

        let latch = CompletionLatch::new(2);
        for seq in 0..2 {
            h.dispatcher.dispatch(
                InboundEvent::CallEvent {
                    call_id: CallId::new("5"),
                    payload: json!({"seq": seq}),
                },
                Some(Arc::clone(&latch)),
            );
        }

        assert!(latch.wait(Duration::from_secs(1)).await);
        assert_eq!(inbox.try_recv().unwrap(), json!({"seq": 0}));
        assert_eq!(inbox.try_recv().unwrap(), json!({"seq": 1}));
    }

    #[tokio::test]
    async fn on_event_is_the_production_entry_point() {
        let mut h = harness();
        h.gate.set_state(LifecycleState::Running);

        h.dispatcher.on_event(InboundEvent::offer("42"));

        assert!(h.registry.contains(&CallId::new("42")));
        let routed = timeout(Duration::from_secs(1), h.routed.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(routed.id, CallId::new("42"));
    }
}
