//! Subscribers that count storage I/O events.
//!
//! - [`QueryCounter`] - counts user-issued database queries (`sql` events)
//! - [`CacheCounter`] - classifies and counts cache operations (`cache_*` events)
//!
//! Both are cheap to clone; clones share state, so one clone can be handed
//! to the [`EventBus`](crate::EventBus) while another is read afterwards.

mod cache_counter;
mod query_counter;

pub use cache_counter::{CacheCounter, CacheCounts, CacheLogEntry};
pub use query_counter::{IGNORED_OPERATIONS, QueryCounter};
