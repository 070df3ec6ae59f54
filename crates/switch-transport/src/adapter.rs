//! Connection adapter — owns the single signaling connection per process.

use std::fmt;
use std::sync::Arc;

use switch_protocol::{CallId, RejectCause};
use tracing::info;

use crate::config::{ConnectionConfig, Platform, TransportError};
use crate::connection::{
    AsteriskConnection, EventInjector, EventSink, RejectOutbox, SignalingConnection,
    XmppConnection,
};

/// Thin wrapper around the platform connection selected at startup.
///
/// Pure adaptation: registers the dispatcher as the transport's event
/// callback and forwards rejects. No business logic lives here.
#[derive(Clone)]
pub struct ConnectionAdapter {
    connection: Arc<dyn SignalingConnection>,
}

impl fmt::Debug for ConnectionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionAdapter").finish_non_exhaustive()
    }
}

/// Build the platform connection from config and wrap it in an adapter.
///
/// Returns the adapter together with the outbound reject queue the wire
/// layer drains.
pub fn connect(config: &ConnectionConfig) -> Result<(ConnectionAdapter, RejectOutbox), TransportError> {
    let (connection, outbox): (Arc<dyn SignalingConnection>, RejectOutbox) = match config.platform {
        Platform::Xmpp => {
            let (conn, outbox) = XmppConnection::new(config.clone())?;
            (Arc::new(conn), outbox)
        }
        Platform::Asterisk => {
            let (conn, outbox) = AsteriskConnection::new(config.clone())?;
            (Arc::new(conn), outbox)
        }
    };

    info!(platform = %config.platform, "signaling connection established");
    Ok((ConnectionAdapter { connection }, outbox))
}

impl ConnectionAdapter {
    pub fn platform(&self) -> Platform {
        self.connection.platform()
    }

    pub fn config(&self) -> &ConnectionConfig {
        self.connection.config()
    }

    /// Register the event dispatcher as the transport's event callback.
    pub fn bind(&self, sink: Arc<dyn EventSink>) {
        self.connection.bind_sink(sink);
    }

    /// Reject a call with the given cause. Fire-and-forget.
    pub fn reject(&self, call_id: &CallId, cause: RejectCause) {
        self.connection.reject(call_id, cause);
    }

    /// Inbound delivery handle for the wire layer.
    pub fn injector(&self) -> EventInjector {
        self.connection.injector()
    }
}
