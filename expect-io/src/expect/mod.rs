//! Assertions over the I/O a block of code performs.
//!
//! A [`Probe`] runs a block with counters subscribed to its [`EventBus`](crate::EventBus)
//! and judges the counts against an expectation:
//!
//! - [`QueryExpectation`] - exact count, upper bound, or "some", optionally
//!   restricted to queries matching a [`Matcher`](crate::Matcher)
//! - [`CacheExpectation`] - total and per-kind cache operation counts,
//!   scoped to one or more backends
//! - [`IoExpectation`] - both over the same run of the block
//!
//! Every assertion comes in three shapes:
//!
//! - `expect_*` returns an [`Outcome`] to inspect
//! - `assert_*` panics with the failure message, for use inside `#[test]`
//! - [`BlockMatcher`]s built with [`Probe::queries`] and [`Probe::cache_ops`]
//!   can be stored, combined with [`BlockMatcher::and`], and run later
//!
//! # Example
//!
//! ```rust
//! use expect_io::{CacheExpectation, EventBus, Instrument, IoExpectation, Payload, Probe,
//!     QueryExpectation, Tagged};
//!
//! let bus = EventBus::new();
//! let cache = Tagged::new(bus.clone());
//! let probe = Probe::new(bus.clone());
//!
//! let id = probe.assert_io(
//!     IoExpectation::new()
//!         .queries(QueryExpectation::exactly(1).matching("INSERT"))
//!         .cache(CacheExpectation::new().store(&cache).writes(1)),
//!     || {
//!         bus.emit("sql", Payload::sql("INSERT INTO users VALUES (1)"));
//!         cache.instrument("cache_write", Payload::key("user:1"));
//!         1
//!     },
//! );
//! assert_eq!(id, 1);
//! ```

mod block_matcher;
mod cache_expectation;
mod io_expectation;
mod outcome;
mod probe;
mod query_expectation;

pub use block_matcher::{And, BlockMatcher, CacheOpsMatcher, QueriesMatcher};
pub use cache_expectation::CacheExpectation;
pub use io_expectation::IoExpectation;
pub use outcome::Outcome;
pub use probe::Probe;
pub use query_expectation::QueryExpectation;
