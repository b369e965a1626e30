#![cfg_attr(docsrs, feature(doc_cfg))]
//! # expect-io
//!
//! Assert how many database queries and cache operations a block of code
//! performs.
//!
//! Storage backends report each operation as a named event on an
//! [`EventBus`]. A [`Probe`] subscribes counters for exactly the duration of
//! a block, runs it once, and checks the counts against an expectation.
//! Typical uses are guarding against N+1 queries and proving that a cache
//! is actually hit.
//!
//! ## Quick Start
//!
//! ```rust
//! use expect_io::*;
//!
//! let bus = EventBus::new();
//! let cache = Tagged::new(bus.clone());
//! let probe = Probe::new(bus.clone());
//!
//! // A query that must happen exactly once.
//! probe.assert_queries(QueryExpectation::exactly(1).matching("INSERT"), || {
//!     bus.emit("sql", Payload::sql("INSERT INTO users (name) VALUES ('a')"));
//! });
//!
//! // One write to this particular cache store, nothing else.
//! probe.assert_cache_ops(CacheExpectation::new().store(&cache).total(1).writes(1), || {
//!     cache.instrument("cache_write", Payload::key("user:1"));
//! });
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EventBus`] | Synchronous in-process pub/sub for instrumentation events |
//! | [`Event`] | A named notification with a [`Payload`] |
//! | [`Instrument`] | What a backend emits its events through |
//! | [`Tagged`] | Stamps a backend's events with its [`BackendId`] |
//! | [`QueryCounter`] | Counts user-issued queries |
//! | [`CacheCounter`] | Classifies and counts cache operations by [`CacheOp`] |
//! | [`Probe`] | Runs a block under counters and judges the result |
//! | [`Outcome`] | The verdict plus the block's value |
//! | [`Config`] | Event names, default backend, [`UnscopedPolicy`] |
//!
//! ## Scoping Cache Counts
//!
//! Several cache stores may share one bus. Wrap each store's instrument in
//! [`Tagged`] and name the store in the expectation; only operations from
//! that store are counted:
//!
//! ```rust,ignore
//! let expectation = CacheExpectation::new().stores([&sessions, &fragments]).writes(2);
//! ```
//!
//! Without a store the [`Config`] default backend is used. If there is none,
//! the [`UnscopedPolicy`] decides between an error and counting everything.
//!
//! ## Features
//!
//! - **`recorder`** - Built-in [`Recorder`](monitors::Recorder) subscriber for
//!   writing events to JSON Lines files

mod backend_id;
mod bus;
mod cache_op;
mod config;
mod counters;
mod error;
mod event;
mod event_id;
mod expect;
mod instrument;
mod matcher;
mod meta;
mod subscribe;
mod tagger;
mod unscoped_policy;

pub mod monitors;
pub mod payload;

pub use backend_id::BackendId;
pub use bus::{EventBus, Subscriber, Subscription, SubscriptionId};
pub use cache_op::CacheOp;
pub use config::{Config, DEFAULT_CACHE_EVENTS, DEFAULT_QUERY_EVENT};
pub use counters::{CacheCounter, CacheCounts, CacheLogEntry, IGNORED_OPERATIONS, QueryCounter};
pub use error::Error;
pub use event::Event;
pub use event_id::EventId;
pub use expect::{
    And, BlockMatcher, CacheExpectation, CacheOpsMatcher, IoExpectation, Outcome, Probe,
    QueriesMatcher, QueryExpectation,
};
pub use instrument::Instrument;
pub use matcher::Matcher;
pub use meta::Meta;
pub use payload::{Key, Payload};
pub use subscribe::Subscribe;
pub use tagger::{Backend, Tagged};
pub use unscoped_policy::UnscopedPolicy;

/// Convenience alias for `Result<T, expect_io::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
