use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    BackendId, CacheOp, Event, Key, Matcher, Subscriber,
    payload::BACKEND_ID,
};

/// Per-kind cache operation counts with a running total.
///
/// `total()` always equals the sum of every per-kind count. Kinds that
/// never occurred read as `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheCounts {
    by_kind: BTreeMap<CacheOp, usize>,
    total: usize,
}

impl CacheCounts {
    pub fn get(&self, op: CacheOp) -> usize {
        self.by_kind.get(&op).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Kinds that occurred at least once, with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (CacheOp, usize)> + '_ {
        self.by_kind.iter().map(|(op, n)| (*op, *n))
    }

    fn record(&mut self, op: CacheOp) {
        *self.by_kind.entry(op).or_insert(0) += 1;
        self.total += 1;
    }
}

/// One counted cache operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CacheLogEntry {
    pub op: CacheOp,
    pub key: Option<Key>,
}

impl fmt::Display for CacheLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}: {}", self.op, key),
            None => write!(f, "{}: ", self.op),
        }
    }
}

/// Classifies and counts cache operation events.
///
/// For each event:
/// 1. The kind is derived from the event name with
///    [`CacheOp::from_event_name`]; unknown names are ignored.
/// 2. With a backend scope, the event's `backend_id` must be in the scope.
/// 3. With a matcher, a single key must match, or at least one key of a
///    batch must match. Absent keys never match.
///
/// Counted events increment their kind and the total, and are appended to
/// the log as `(kind, key)` in arrival order.
///
/// ```ignore
/// let counter = CacheCounter::new(None, Some(HashSet::from([store.ensure_tagged()])));
/// let _sub = bus.subscribe_scoped(Subscribe::all(), counter.clone());
/// run_block();
/// assert_eq!(counter.counts().get(CacheOp::Read), 1);
/// ```
#[derive(Clone)]
pub struct CacheCounter {
    inner: Arc<Mutex<CacheCounterInner>>,
}

struct CacheCounterInner {
    matching: Option<Matcher>,
    scope: Option<HashSet<BackendId>>,
    counts: CacheCounts,
    log: Vec<CacheLogEntry>,
}

impl CacheCounter {
    /// Create a counter. `scope: None` counts events from every backend.
    pub fn new(matching: Option<Matcher>, scope: Option<HashSet<BackendId>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheCounterInner {
                matching,
                scope,
                counts: CacheCounts::default(),
                log: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheCounterInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the counts so far.
    pub fn counts(&self) -> CacheCounts {
        self.lock().counts.clone()
    }

    pub fn total(&self) -> usize {
        self.lock().counts.total()
    }

    /// Every counted operation, in arrival order.
    pub fn log(&self) -> Vec<CacheLogEntry> {
        self.lock().log.clone()
    }

    /// The configured matcher, if any.
    pub fn matching(&self) -> Option<Matcher> {
        self.lock().matching.clone()
    }
}

impl Subscriber for CacheCounter {
    fn on_event(&self, event: &Event) {
        let Some(op) = CacheOp::from_event_name(event.name()) else {
            return;
        };
        let payload = event.payload();
        let key = payload.cache_key();

        let mut inner = self.lock();
        if let Some(scope) = &inner.scope {
            let in_scope = payload
                .u64_field(BACKEND_ID)
                .is_some_and(|id| scope.contains(&BackendId::from(id)));
            if !in_scope {
                return;
            }
        }
        if let Some(matcher) = &inner.matching {
            let matched = key.as_ref().is_some_and(|k| k.any(|k| matcher.test(k)));
            if !matched {
                return;
            }
        }

        inner.counts.record(op);
        inner.log.push(CacheLogEntry { op, key });
    }
}

impl Default for CacheCounter {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl fmt::Debug for CacheCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("CacheCounter")
            .field("matching", &inner.matching)
            .field("scope", &inner.scope)
            .field("counts", &inner.counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Payload;

    fn op_event(op: CacheOp, payload: Payload) -> Event {
        Event::new(op.event_name(), payload)
    }

    #[test]
    fn counts_per_kind_and_total() {
        let counter = CacheCounter::default();
        counter.on_event(&op_event(CacheOp::Read, Payload::key("a")));
        counter.on_event(&op_event(CacheOp::Write, Payload::key("a")));
        counter.on_event(&op_event(CacheOp::Read, Payload::key("b")));

        let counts = counter.counts();
        assert_eq!(counts.get(CacheOp::Read), 2);
        assert_eq!(counts.get(CacheOp::Write), 1);
        assert_eq!(counts.get(CacheOp::Delete), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn ignores_unknown_names() {
        let counter = CacheCounter::default();
        counter.on_event(&Event::new("cache_cleanup", Payload::new()));
        counter.on_event(&Event::new("sql", Payload::sql("SELECT 1")));

        assert_eq!(counter.total(), 0);
        assert!(counter.log().is_empty());
    }

    #[test]
    fn accepts_spaced_event_names() {
        let counter = CacheCounter::default();
        counter.on_event(&Event::new("cache write multi", Payload::keys(["a", "b"])));

        assert_eq!(counter.counts().get(CacheOp::WriteMulti), 1);
    }

    #[test]
    fn scope_requires_member_backend_id() {
        let a = BackendId::from(100);
        let b = BackendId::from(200);
        let counter = CacheCounter::new(None, Some(HashSet::from([a])));

        counter.on_event(&op_event(CacheOp::Write, Payload::key("x").with(BACKEND_ID, a.value())));
        counter.on_event(&op_event(CacheOp::Write, Payload::key("y").with(BACKEND_ID, b.value())));
        counter.on_event(&op_event(CacheOp::Write, Payload::key("z")));
        counter.on_event(&op_event(CacheOp::Write, Payload::key("w").with(BACKEND_ID, "100")));

        assert_eq!(counter.total(), 1);
        assert_eq!(counter.log()[0].key, Some(Key::from("x")));
    }

    #[test]
    fn batch_keys_match_if_any_key_matches() {
        let counter = CacheCounter::new(Some("user".into()), None);
        counter.on_event(&op_event(CacheOp::ReadMulti, Payload::keys(["post:1", "user:1"])));
        counter.on_event(&op_event(CacheOp::ReadMulti, Payload::keys(["post:1", "post:2"])));

        assert_eq!(counter.counts().get(CacheOp::ReadMulti), 1);
    }

    #[test]
    fn single_key_must_match() {
        let counter = CacheCounter::new(Some("user".into()), None);
        counter.on_event(&op_event(CacheOp::Read, Payload::key("user:1")));
        counter.on_event(&op_event(CacheOp::Read, Payload::key("post:1")));
        counter.on_event(&op_event(CacheOp::Read, Payload::new()));

        assert_eq!(counter.total(), 1);
    }

    #[test]
    fn missing_key_is_counted_without_a_matcher() {
        let counter = CacheCounter::default();
        counter.on_event(&op_event(CacheOp::Delete, Payload::new()));

        assert_eq!(counter.total(), 1);
        assert_eq!(counter.log()[0].to_string(), "delete: ");
    }

    #[test]
    fn log_entries_render_kind_and_key() {
        let counter = CacheCounter::default();
        counter.on_event(&op_event(CacheOp::Read, Payload::key("user:1")));
        counter.on_event(&op_event(CacheOp::WriteMulti, Payload::keys(["a", "b"])));

        let rendered: Vec<String> = counter.log().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["read: user:1", "write_multi: [a, b]"]);
    }

    fn op_strategy() -> impl Strategy<Value = CacheOp> {
        prop::sample::select(CacheOp::ALL.to_vec())
    }

    fn key_strategy() -> impl Strategy<Value = Payload> {
        prop_oneof![
            "[a-z]{1,6}:[0-9]".prop_map(|k: String| Payload::key(k)),
            prop::collection::vec("[a-z]{1,6}:[0-9]", 0..4).prop_map(|ks: Vec<String>| Payload::keys(ks)),
            Just(Payload::new()),
        ]
    }

    proptest! {
        /// Property: the total always equals the sum of per-kind counts,
        /// and the log holds exactly the counted events.
        #[test]
        fn prop_total_is_sum_of_kinds(
            events in prop::collection::vec((op_strategy(), key_strategy()), 0..40),
            filtered in any::<bool>(),
        ) {
            let matching = filtered.then(|| Matcher::substring("user"));
            let counter = CacheCounter::new(matching, None);
            for (op, payload) in events {
                counter.on_event(&op_event(op, payload));
            }

            let counts = counter.counts();
            let sum: usize = counts.iter().map(|(_, n)| n).sum();
            prop_assert_eq!(counts.total(), sum);
            prop_assert_eq!(counter.log().len(), counts.total());
        }

        /// Property: a batch matches iff any of its keys matches.
        #[test]
        fn prop_batch_any_match(keys in prop::collection::vec("(user|post):[0-9]", 0..5)) {
            let counter = CacheCounter::new(Some("user".into()), None);
            let expected = keys.iter().any(|k| k.contains("user"));
            counter.on_event(&op_event(CacheOp::ReadMulti, Payload::keys(keys)));

            prop_assert_eq!(counter.total() == 1, expected);
        }
    }
}
