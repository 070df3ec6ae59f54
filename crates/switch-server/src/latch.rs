//! Countdown latch for observing dispatch completion.
//!
//! Opt-in per dispatch and meant for test synchronization; production
//! paths never construct one, and correct operation never depends on it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// One-shot countdown primitive with a bounded async wait.
pub struct CompletionLatch {
    count: watch::Sender<usize>,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            count: watch::Sender::new(count),
        })
    }

    /// Decrement the count, waking waiters once it reaches zero.
    /// Counting down an exhausted latch is a no-op.
    pub fn count_down(&self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }

    pub fn remaining(&self) -> usize {
        *self.count.borrow()
    }

    /// Wait until the count reaches zero, bounded by `timeout`.
    /// Returns whether the latch was released in time.
    pub async fn wait(&self, timeout: Duration) -> bool {
        let mut rx = self.count.subscribe();
        matches!(
            tokio::time::timeout(timeout, rx.wait_for(|n| *n == 0)).await,
            Ok(Ok(_))
        )
    }
}
