//! switchd event dispatch core.
//!
//! Sits between the signaling transport and application logic: classifies
//! every inbound event, admission-gates new call offers on process
//! lifecycle state, and routes accepted events to the right target — an
//! active call's inbox, the routing collaborator, or a component's own
//! handler. No event is ever silently dropped or misrouted; anomalies go
//! to the diagnostic sink.

pub mod call;
pub mod diagnostics;
pub mod dispatcher;
pub mod latch;
pub mod lifecycle;
pub mod registry;
pub mod router;

pub use call::{ActiveCall, CallInbox};
pub use diagnostics::{DiagnosticSink, TracingDiagnostics};
pub use dispatcher::EventDispatcher;
pub use latch::CompletionLatch;
pub use lifecycle::{Admission, LifecycleGate, LifecycleState};
pub use registry::CallRegistry;
pub use router::CallRouter;
