use std::fmt;

use crate::{EventBus, bus::SubscriptionId};

/// A scoped subscription: the subscriber stays registered until this guard
/// is dropped or [`close`](Self::close)d.
///
/// Dropping runs on every exit path, including unwinding from a panic, so
/// a handler can never outlive the block it was opened for.
///
/// # Example
///
/// ```ignore
/// let subscription = bus.subscribe_scoped("sql", counter.clone());
/// run_block();
/// drop(subscription); // counter no longer receives events
/// ```
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    bus: EventBus,
    closed: bool,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, bus: EventBus) -> Self {
        Self {
            id,
            bus,
            closed: false,
        }
    }

    /// Returns the subscription ID.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unsubscribe now.
    ///
    /// Returns `false` if the subscriber was already gone (e.g. removed
    /// after panicking).
    pub fn close(mut self) -> bool {
        self.closed = true;
        self.bus.unsubscribe(self.id)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.closed {
            self.bus.unsubscribe(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
