use crate::{Event, Subscriber};

/// A subscriber that logs every event it receives to the `tracing` crate.
///
/// Useful when an expectation fails and the log alone does not explain
/// where the I/O came from. Log levels:
/// - `trace` - every event, with its payload
/// - `debug` - events carrying a `backend_id`
///
/// # Example
///
/// ```rust
/// use expect_io::{EventBus, Subscribe, monitors::Tracer};
///
/// let bus = EventBus::new();
/// let _tracing = bus.subscribe_scoped(Subscribe::all(), Tracer);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracer;

impl Subscriber for Tracer {
    fn on_event(&self, event: &Event) {
        match event.payload().u64_field(crate::payload::BACKEND_ID) {
            Some(backend_id) => tracing::debug!(
                event_id = %event.id(),
                event = %event.name(),
                backend_id,
                payload = ?event.payload(),
                "event from tagged backend"
            ),
            None => tracing::trace!(
                event_id = %event.id(),
                event = %event.name(),
                payload = ?event.payload(),
                "event"
            ),
        }
    }
}
