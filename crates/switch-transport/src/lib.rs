//! Signaling transport boundary for switchd.
//!
//! The wire protocol (stanza parsing, authentication, TLS, reconnection) is
//! an external concern. This crate owns the seam between it and the core:
//! - Platform selection and the startup configuration surface
//! - The `SignalingConnection` contract: bind an event sink, reject a call
//! - `ConnectionAdapter`, which owns exactly one connection per process
//!
//! The core is decoupled from connection internals via the `EventSink`
//! trait; the wire layer feeds inbound events through an `EventInjector`
//! and drains outbound rejects from the connection's `RejectOutbox`.

pub mod adapter;
pub mod config;
pub mod connection;

pub use adapter::{connect, ConnectionAdapter};
pub use config::{ConnectionConfig, Platform, TransportError};
pub use connection::{
    AsteriskConnection, EventInjector, EventSink, RejectOutbox, SignalingConnection,
    XmppConnection,
};
