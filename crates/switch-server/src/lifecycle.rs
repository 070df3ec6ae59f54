//! Process lifecycle state and the call admission gate.

use std::fmt;

use parking_lot::RwLock;
use switch_protocol::RejectCause;
use tracing::info;

/// Lifecycle phase of the surrounding application process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Booting,
    Running,
    Stopping,
    Rejecting,
    /// Catch-all for state names the host injects that the core does not
    /// model.
    Other(String),
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booting => f.write_str("booting"),
            Self::Running => f.write_str("running"),
            Self::Stopping => f.write_str("stopping"),
            Self::Rejecting => f.write_str("rejecting"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Admission decision for a new call offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accept,
    Reject(RejectCause),
}

impl Admission {
    /// Pure, total mapping from lifecycle state to admission decision.
    ///
    /// Offers are only accepted while running. Recognized non-running
    /// states decline the call; anything unmodeled fails closed with
    /// [`RejectCause::Error`] so an unknown lifecycle phase can never
    /// silently admit calls.
    pub fn for_state(state: &LifecycleState) -> Self {
        match state {
            LifecycleState::Running => Self::Accept,
            LifecycleState::Booting | LifecycleState::Stopping | LifecycleState::Rejecting => {
                Self::Reject(RejectCause::Declined)
            }
            LifecycleState::Other(_) => Self::Reject(RejectCause::Error),
        }
    }
}

/// Holder of the current lifecycle state.
///
/// Mutated by the host application via [`set_state`](Self::set_state), read
/// by the dispatcher on every offer. Read-mostly, so a reader-biased lock.
pub struct LifecycleGate {
    state: RwLock<LifecycleState>,
}

impl LifecycleGate {
    /// A new gate starts in `Booting`: offers arriving before the host
    /// declares itself running are declined.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LifecycleState::Booting),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state.read().clone()
    }

    pub fn set_state(&self, state: LifecycleState) {
        info!(%state, "lifecycle state changed");
        *self.state.write() = state;
    }

    /// Admission decision for the current state.
    pub fn decide_admission(&self) -> Admission {
        Admission::for_state(&self.state.read())
    }
}

impl Default for LifecycleGate {
    fn default() -> Self {
        Self::new()
    }
}
