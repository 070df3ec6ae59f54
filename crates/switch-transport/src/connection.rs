//! Platform connection types and the event callback contract.
//!
//! Each connection owns the validated startup config and the two seams the
//! core cares about: inbound events come in through an [`EventInjector`]
//! (driven by the wire layer), outbound rejects go out through a
//! [`RejectOutbox`] (drained by the wire layer).

use std::sync::Arc;

use parking_lot::RwLock;
use switch_protocol::{CallId, InboundEvent, RejectCause};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{ConnectionConfig, Platform, TransportError};

/// Sink for inbound signaling events, implemented by the event dispatcher.
///
/// Called on the wire layer's delivery task for every event; implementations
/// must be safe under concurrent calls and must return quickly.
pub trait EventSink: Send + Sync + 'static {
    fn on_event(&self, event: InboundEvent);
}

/// A single connection to the signaling transport.
pub trait SignalingConnection: Send + Sync + 'static {
    fn platform(&self) -> Platform;

    /// The configuration this connection was established with.
    fn config(&self) -> &ConnectionConfig;

    /// Register the inbound event callback. Events delivered before a sink
    /// is bound are dropped with a warning.
    fn bind_sink(&self, sink: Arc<dyn EventSink>);

    /// Forward a call reject to the wire layer. Fire-and-forget.
    fn reject(&self, call_id: &CallId, cause: RejectCause);

    /// Handle the wire layer uses to deliver inbound events.
    fn injector(&self) -> EventInjector;
}

type SinkSlot = Arc<RwLock<Option<Arc<dyn EventSink>>>>;

/// Inbound delivery handle held by the wire layer.
#[derive(Clone)]
pub struct EventInjector {
    sink: SinkSlot,
}

impl EventInjector {
    /// Deliver one inbound event to the bound sink.
    pub fn deliver(&self, event: InboundEvent) {
        let sink = self.sink.read().clone();
        match sink {
            Some(sink) => sink.on_event(event),
            None => warn!(call_id = %event.call_id(), "inbound event dropped: no sink bound"),
        }
    }
}

/// Receiving half of the outbound reject queue.
#[derive(Debug)]
pub struct RejectOutbox {
    rx: mpsc::UnboundedReceiver<(CallId, RejectCause)>,
}

impl RejectOutbox {
    pub async fn recv(&mut self) -> Option<(CallId, RejectCause)> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<(CallId, RejectCause)> {
        self.rx.try_recv().ok()
    }
}

/// Mechanics shared by every platform connection.
struct ConnectionCore {
    config: ConnectionConfig,
    sink: SinkSlot,
    reject_tx: mpsc::UnboundedSender<(CallId, RejectCause)>,
}

impl ConnectionCore {
    fn new(config: ConnectionConfig) -> (Self, RejectOutbox) {
        let (reject_tx, reject_rx) = mpsc::unbounded_channel();
        let core = Self {
            config,
            sink: Arc::new(RwLock::new(None)),
            reject_tx,
        };
        (core, RejectOutbox { rx: reject_rx })
    }

    fn bind_sink(&self, sink: Arc<dyn EventSink>) {
        *self.sink.write() = Some(sink);
    }

    fn reject(&self, call_id: &CallId, cause: RejectCause) {
        debug!(%call_id, %cause, "rejecting call");
        if self.reject_tx.send((call_id.clone(), cause)).is_err() {
            warn!(%call_id, "reject dropped: outbox closed");
        }
    }

    fn injector(&self) -> EventInjector {
        EventInjector {
            sink: Arc::clone(&self.sink),
        }
    }
}

fn require<T>(
    value: &Option<T>,
    platform: Platform,
    field: &'static str,
) -> Result<(), TransportError> {
    if value.is_some() {
        Ok(())
    } else {
        Err(TransportError::MissingField {
            platform: platform.as_str(),
            field,
        })
    }
}

/// Connection to an XMPP (Rayo-style) signaling server.
pub struct XmppConnection {
    core: ConnectionCore,
}

impl XmppConnection {
    /// Validate the config and establish the connection scaffolding.
    /// Requires account credentials.
    pub fn new(config: ConnectionConfig) -> Result<(Self, RejectOutbox), TransportError> {
        require(&config.username, Platform::Xmpp, "username")?;
        require(&config.password, Platform::Xmpp, "password")?;
        let (core, outbox) = ConnectionCore::new(config);
        Ok((Self { core }, outbox))
    }
}

impl SignalingConnection for XmppConnection {
    fn platform(&self) -> Platform {
        Platform::Xmpp
    }

    fn config(&self) -> &ConnectionConfig {
        &self.core.config
    }

    fn bind_sink(&self, sink: Arc<dyn EventSink>) {
        self.core.bind_sink(sink);
    }

    fn reject(&self, call_id: &CallId, cause: RejectCause) {
        self.core.reject(call_id, cause);
    }

    fn injector(&self) -> EventInjector {
        self.core.injector()
    }
}

/// Connection to an Asterisk signaling bridge.
pub struct AsteriskConnection {
    core: ConnectionCore,
}

impl AsteriskConnection {
    /// Validate the config and establish the connection scaffolding.
    /// Requires an explicit host and port.
    pub fn new(config: ConnectionConfig) -> Result<(Self, RejectOutbox), TransportError> {
        require(&config.host, Platform::Asterisk, "host")?;
        require(&config.port, Platform::Asterisk, "port")?;
        let (core, outbox) = ConnectionCore::new(config);
        Ok((Self { core }, outbox))
    }
}

impl SignalingConnection for AsteriskConnection {
    fn platform(&self) -> Platform {
        Platform::Asterisk
    }

    fn config(&self) -> &ConnectionConfig {
        &self.core.config
    }

    fn bind_sink(&self, sink: Arc<dyn EventSink>) {
        self.core.bind_sink(sink);
    }

    fn reject(&self, call_id: &CallId, cause: RejectCause) {
        self.core.reject(call_id, cause);
    }

    fn injector(&self) -> EventInjector {
        self.core.injector()
    }
}
