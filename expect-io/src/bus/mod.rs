//! In-process, synchronous publish/subscribe for instrumentation events.
//!
//! # Overview
//!
//! Backends report each I/O operation by emitting a named [`Event`](crate::Event)
//! on an [`EventBus`]. Every [`Subscriber`] whose [`Subscribe`](crate::Subscribe)
//! filter accepts the event name is called inline, on the emitting thread,
//! before `emit` returns.
//!
//! # Example
//!
//! ```rust
//! use expect_io::{Event, EventBus, Payload, Subscribe};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! let bus = EventBus::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//!
//! let subscription = bus.subscribe_scoped("sql", move |_: &Event| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//! });
//! bus.emit("sql", Payload::sql("SELECT 1"));
//! drop(subscription);
//! bus.emit("sql", Payload::sql("SELECT 2"));
//!
//! assert_eq!(seen.load(Ordering::Relaxed), 1);
//! ```

mod event_bus;
mod subscriber;
mod subscription;

/// Unique identifier for a registered subscriber.
pub type SubscriptionId = u64;

pub use event_bus::EventBus;
pub use subscriber::Subscriber;
pub use subscription::Subscription;
