use crate::Event;

/// Receives events from an [`EventBus`](crate::EventBus).
///
/// `on_event` is called synchronously, once per accepted event, on the
/// thread that emitted it. Implementations must not fail: a field that is
/// missing or of an unexpected type should be treated as "does not match".
/// A panic is contained by the bus, logged, and the subscriber is removed.
///
/// Closures taking `&Event` implement this trait directly.
///
/// # Example
///
/// ```rust
/// use expect_io::{Event, Subscriber};
///
/// struct NameLogger;
///
/// impl Subscriber for NameLogger {
///     fn on_event(&self, event: &Event) {
///         println!("[{}] {:?}", event.name(), event.payload());
///     }
/// }
/// ```
pub trait Subscriber: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl<F> Subscriber for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}
