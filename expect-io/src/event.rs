use std::{fmt, sync::Arc};

use crate::{EventId, Meta, Payload};

/// A named occurrence emitted by an instrumented backend.
///
/// The `name` identifies the category (`"sql"`, `"cache_read"`,
/// `"cache_write_multi"`, ...), the [`Payload`] carries the semantic fields,
/// and [`Meta`] is stamped by the bus at emission.
///
/// Handlers only borrow an `Event` for the synchronous duration of one
/// dispatch.
///
/// # Example
///
/// ```rust
/// use expect_io::{Event, Payload};
///
/// let event = Event::new("cache_read", Payload::key("user:1"));
/// assert_eq!(event.name(), "cache_read");
/// assert_eq!(event.payload().str_field("key"), Some("user:1"));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    #[serde(flatten)]
    meta: Meta,
    name: Arc<str>,
    payload: Payload,
}

impl Event {
    pub fn new(name: impl Into<Arc<str>>, payload: Payload) -> Self {
        Self {
            meta: Meta::now(),
            name: name.into(),
            payload,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    #[inline]
    pub fn id(&self) -> EventId {
        self.meta.id()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.meta.id())
    }
}
