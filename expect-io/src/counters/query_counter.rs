use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    Event, Matcher, Subscriber,
    payload::{CACHED, OPERATION_NAME, SQL},
};

/// Query labels that mark housekeeping rather than user-issued queries.
pub const IGNORED_OPERATIONS: [&str; 3] = ["SCHEMA", "TRANSACTION", "EXPLAIN"];

/// Counts database query events.
///
/// An event is counted unless:
/// - its `cached` field is `true` (a replay from an in-process memo),
/// - its `operation_name` is one of [`IGNORED_OPERATIONS`],
/// - a matcher is configured and the `sql` text is absent or does not match.
///
/// Every counted query's text is appended to the log in arrival order.
///
/// ```ignore
/// let counter = QueryCounter::new(Some("INSERT".into()));
/// let _sub = bus.subscribe_scoped("sql", counter.clone());
/// run_block();
/// assert_eq!(counter.count(), counter.log().len());
/// ```
#[derive(Clone)]
pub struct QueryCounter {
    inner: Arc<Mutex<QueryCounterInner>>,
}

struct QueryCounterInner {
    matching: Option<Matcher>,
    observed: usize,
    log: Vec<String>,
}

impl QueryCounter {
    pub fn new(matching: Option<Matcher>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueryCounterInner {
                matching,
                observed: 0,
                log: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueryCounterInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of counted queries.
    pub fn count(&self) -> usize {
        self.lock().log.len()
    }

    /// Number of user-visible queries seen, before the matcher was applied.
    pub fn observed(&self) -> usize {
        self.lock().observed
    }

    /// Text of every counted query, in arrival order.
    pub fn log(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    /// The configured matcher, if any.
    pub fn matching(&self) -> Option<Matcher> {
        self.lock().matching.clone()
    }
}

impl Subscriber for QueryCounter {
    fn on_event(&self, event: &Event) {
        let payload = event.payload();
        if payload.bool_field(CACHED) == Some(true) {
            return;
        }
        if payload
            .str_field(OPERATION_NAME)
            .is_some_and(|op| IGNORED_OPERATIONS.contains(&op))
        {
            return;
        }

        let sql = payload.str_field(SQL);
        let mut inner = self.lock();
        inner.observed += 1;
        if let Some(matcher) = &inner.matching {
            if !matcher.test_opt(sql) {
                return;
            }
        }
        inner.log.push(sql.unwrap_or_default().to_owned());
    }
}

impl Default for QueryCounter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for QueryCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("QueryCounter")
            .field("matching", &inner.matching)
            .field("observed", &inner.observed)
            .field("count", &inner.log.len())
            .finish()
    }
}
