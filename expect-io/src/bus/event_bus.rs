use std::{
    collections::BTreeMap,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Event, EventId, Instrument, Payload, Subscribe,
    bus::{Subscriber, Subscription, SubscriptionId},
};

struct SubscriberEntry {
    filter: Subscribe,
    subscriber: Arc<dyn Subscriber>,
}

#[derive(Default)]
struct Registry {
    subscribers: BTreeMap<SubscriptionId, SubscriberEntry>,
    last_id: SubscriptionId,
}

/// Synchronous in-process event bus.
///
/// `EventBus` is cheap to clone; clones share the same subscriber registry.
/// Pass it explicitly to whatever performs the instrumented I/O and to the
/// [`Probe`](crate::Probe) that counts it.
///
/// # Dispatch
///
/// [`emit`](Self::emit) takes a snapshot of the accepting subscribers and
/// calls each one in registration order, inline. The registry lock is not
/// held during callbacks, so a subscriber may itself emit, subscribe or
/// unsubscribe. A subscriber that panics is removed and the panic does not
/// reach the emitting code.
///
/// # Example
///
/// ```rust
/// use expect_io::{EventBus, Payload, QueryCounter};
///
/// let bus = EventBus::new();
/// let counter = QueryCounter::new(None);
/// let id = bus.subscribe("sql", counter.clone());
///
/// bus.emit("sql", Payload::sql("SELECT 1"));
/// bus.unsubscribe(id);
///
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a subscriber and return its ID.
    ///
    /// The subscriber stays registered until [`unsubscribe`](Self::unsubscribe)
    /// is called. Prefer [`subscribe_scoped`](Self::subscribe_scoped) when the
    /// subscription belongs to a block of code.
    pub fn subscribe<S>(&self, filter: impl Into<Subscribe>, subscriber: S) -> SubscriptionId
    where
        S: Subscriber + 'static,
    {
        let filter = filter.into();
        let mut registry = self.registry();
        registry.last_id += 1;
        let id = registry.last_id;
        tracing::debug!(subscription_id = id, filter = %filter, "subscribed");
        registry.subscribers.insert(
            id,
            SubscriberEntry {
                filter,
                subscriber: Arc::new(subscriber),
            },
        );
        id
    }

    /// Register a subscriber for as long as the returned guard lives.
    pub fn subscribe_scoped<S>(&self, filter: impl Into<Subscribe>, subscriber: S) -> Subscription
    where
        S: Subscriber + 'static,
    {
        let id = self.subscribe(filter, subscriber);
        Subscription::new(id, self.clone())
    }

    /// Remove a subscriber by its ID.
    ///
    /// Returns `false` if no subscriber had that ID.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.registry().subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!(subscription_id = id, "unsubscribed");
        }
        removed
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }

    /// Build an event and deliver it to every accepting subscriber.
    pub fn emit(&self, name: impl Into<Arc<str>>, payload: Payload) -> EventId {
        let event = Event::new(name, payload);
        self.publish(&event);
        event.id()
    }

    /// Deliver an already built event to every accepting subscriber.
    pub fn publish(&self, event: &Event) {
        let targets: Vec<(SubscriptionId, Arc<dyn Subscriber>)> = self
            .registry()
            .subscribers
            .iter()
            .filter(|(_, entry)| entry.filter.accepts(event.name()))
            .map(|(id, entry)| (*id, entry.subscriber.clone()))
            .collect();

        tracing::trace!(event = %event.name(), subscribers = targets.len(), "dispatching");

        for (id, subscriber) in targets {
            let result = catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event)));
            if result.is_err() {
                tracing::error!(subscription_id = id, event = %event.name(), "Subscriber panicked, removing");
                self.registry().subscribers.remove(&id);
            }
        }
    }
}

impl Instrument for EventBus {
    fn instrument(&self, name: &str, payload: Payload) {
        self.emit(name, payload);
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry();
        f.debug_struct("EventBus")
            .field("subscribers.len()", &registry.subscribers.len())
            .field("last_id", &registry.last_id)
            .finish()
    }
}
