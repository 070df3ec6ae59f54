//! Routing collaborator seam.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::call::ActiveCall;

/// Selects and invokes a controller for an accepted call.
///
/// Invoked once per admitted offer, on its own task — the dispatcher never
/// waits for it. Failures inside the router are the router's own
/// responsibility, not the core's.
pub trait CallRouter: Send + Sync + 'static {
    fn dispatch(&self, call: Arc<ActiveCall>) -> impl Future<Output = ()> + Send;
}

/// Object-safe wrapper so the dispatcher can hold any router boxed.
pub(crate) trait CallRouterDyn: Send + Sync {
    fn dispatch_dyn(
        &self,
        call: Arc<ActiveCall>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

impl<T: CallRouter> CallRouterDyn for T {
    fn dispatch_dyn(
        &self,
        call: Arc<ActiveCall>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.dispatch(call))
    }
}
