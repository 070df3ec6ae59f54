//! Signaling protocol types for switchd.
//!
//! This crate is the single source of truth for the inbound event model,
//! call identifiers, reject causes, and the signaling error taxonomy.
//! The wire protocol itself lives behind the transport boundary; everything
//! here is the in-process representation the dispatcher works with.

pub mod error;
pub mod event;

pub use error::SignalError;
pub use event::{CallId, ComponentHandler, ComponentRef, InboundEvent, RejectCause};
