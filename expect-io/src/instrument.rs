use std::sync::Arc;

use crate::Payload;

/// The channel a backend reports its operations through.
///
/// A cache store or database adapter holds some `Instrument` and calls
/// [`instrument`](Self::instrument) once per operation it performs. The
/// [`EventBus`](crate::EventBus) is the terminal implementation;
/// [`Tagged`](crate::Tagged) sits in front of another instrument and stamps
/// the backend's identity on the way through.
///
/// # Example
///
/// ```rust
/// use expect_io::{CacheOp, EventBus, Instrument, Payload};
///
/// struct Store<I> {
///     notifications: I,
/// }
///
/// impl<I: Instrument> Store<I> {
///     fn read(&self, key: &str) -> Option<String> {
///         self.notifications
///             .instrument(&CacheOp::Read.event_name(), Payload::key(key));
///         None
///     }
/// }
///
/// let store = Store { notifications: EventBus::new() };
/// assert_eq!(store.read("user:1"), None);
/// ```
pub trait Instrument: Send + Sync {
    fn instrument(&self, name: &str, payload: Payload);
}

impl<I: Instrument + ?Sized> Instrument for &I {
    fn instrument(&self, name: &str, payload: Payload) {
        (**self).instrument(name, payload)
    }
}

impl<I: Instrument + ?Sized> Instrument for Arc<I> {
    fn instrument(&self, name: &str, payload: Payload) {
        (**self).instrument(name, payload)
    }
}
