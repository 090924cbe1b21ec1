//! Zero-payload signal telling list views to reload their data.

use tracing::trace;

use crate::state::observers::{Observers, Subscription};

/// Stateless event bus between catalog mutators and list views.
///
/// Emitting with no subscribers drops the event. Nothing is retained
/// between emissions.
#[derive(Debug, Default)]
pub struct ListRefreshSignal {
    observers: Observers<()>,
}

impl ListRefreshSignal {
    pub fn new() -> Self {
        Self {
            observers: Observers::new(),
        }
    }

    /// Invokes every current handler once, in subscription order.
    pub fn emit(&self) {
        trace!(subscribers = self.observers.len(), "List refresh emitted");
        self.observers.notify(&());
    }

    /// Registers a handler invoked once per [`emit`](Self::emit).
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.subscribe(move |_| handler())
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }
}
