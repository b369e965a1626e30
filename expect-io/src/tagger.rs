use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use crate::{BackendId, Instrument, Payload, payload::BACKEND_ID};

/// A backend whose events can be attributed to it.
///
/// [`ensure_tagged`](Self::ensure_tagged) installs identity tagging on the
/// instance if it is not installed yet and returns the instance's
/// [`BackendId`]. Calling it again returns the same ID and changes nothing.
pub trait Backend: Send + Sync {
    fn ensure_tagged(&self) -> BackendId;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn ensure_tagged(&self) -> BackendId {
        (**self).ensure_tagged()
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn ensure_tagged(&self) -> BackendId {
        (**self).ensure_tagged()
    }
}

/// Identity-tagging wrapper in front of a backend's [`Instrument`].
///
/// Construct the backend with `Tagged::new(instrument)` as its event sink.
/// Until [`ensure_tagged`](Backend::ensure_tagged) is called the wrapper
/// forwards events unchanged; from then on every event carries a
/// `backend_id` field with this instance's ID.
///
/// Each wrapper owns its own identity slot: tagging one backend never
/// affects another backend of the same type. Tags are never removed.
///
/// An event that already carries a `backend_id` is passed on unchanged.
/// When tagged wrappers are nested, the outermost one stamps first, so its
/// ID is the one subscribers see.
///
/// # Example
///
/// ```rust
/// use expect_io::{Backend, Event, EventBus, Instrument, Payload, Tagged};
/// use std::sync::{Arc, Mutex};
///
/// let bus = EventBus::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// let _sub = bus.subscribe_scoped("cache_write", move |e: &Event| {
///     sink.lock().unwrap().push(e.payload().u64_field("backend_id"));
/// });
///
/// let store = Tagged::new(bus.clone());
/// store.instrument("cache_write", Payload::key("a"));
/// let id = store.ensure_tagged();
/// assert_eq!(store.ensure_tagged(), id);
/// store.instrument("cache_write", Payload::key("b"));
///
/// assert_eq!(*seen.lock().unwrap(), vec![None, Some(id.value())]);
/// ```
pub struct Tagged<I> {
    inner: I,
    id: OnceLock<BackendId>,
}

impl<I: Instrument> Tagged<I> {
    /// Wrap `inner` without tagging yet.
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            id: OnceLock::new(),
        }
    }

    /// Wrap `inner` and install tagging immediately.
    pub fn tagged(inner: I) -> Self {
        let tagged = Self::new(inner);
        tagged.ensure_tagged();
        tagged
    }

    /// The installed ID, or `None` if tagging has not been installed.
    pub fn backend_id(&self) -> Option<BackendId> {
        self.id.get().copied()
    }

    /// Returns a reference to the wrapped instrument.
    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I: Instrument> Backend for Tagged<I> {
    fn ensure_tagged(&self) -> BackendId {
        *self.id.get_or_init(|| {
            let id = BackendId::next();
            tracing::debug!(backend_id = %id, "backend identity tagging installed");
            id
        })
    }
}

impl<I: Instrument> Instrument for Tagged<I> {
    fn instrument(&self, name: &str, mut payload: Payload) {
        // Outermost tagged wrapper wins; inner wrappers keep its stamp.
        if let Some(id) = self.id.get().filter(|_| payload.get(BACKEND_ID).is_none()) {
            payload.insert(BACKEND_ID, id.value());
        }
        self.inner.instrument(name, payload);
    }
}

impl<I> fmt::Debug for Tagged<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tagged")
            .field("id", &self.id.get())
            .finish_non_exhaustive()
    }
}
