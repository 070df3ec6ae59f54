//! Signaling error taxonomy.
//!
//! Every variant here has a defined local resolution inside the core; none
//! of them escape the dispatcher boundary as a fault.

use thiserror::Error;

use crate::event::CallId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// Registry `add` was called with an id already present. The offending
    /// offer is never admitted a second time.
    #[error("call {0} is already registered")]
    DuplicateCall(CallId),

    /// An event was addressed to a call id the registry does not know.
    /// Recovered by reporting to the diagnostic channel and dropping the
    /// event.
    #[error("no active call with id {0}")]
    UnknownCall(CallId),
}

impl SignalError {
    /// The call id the error refers to.
    pub fn call_id(&self) -> &CallId {
        match self {
            Self::DuplicateCall(id) | Self::UnknownCall(id) => id,
        }
    }
}
