use std::{collections::HashSet, fmt::Write};

use crate::{Backend, BackendId, CacheCounter, CacheOp, Matcher, Result};

/// What a block is expected to do in terms of cache operations.
///
/// Every specified count must hold: `total` against the total of counted
/// operations, and each per-kind count against that kind. An expectation
/// with no counts at all passes trivially (a warning is logged).
///
/// Operations are attributed to backends. Target one with
/// [`store`](Self::store), several with [`stores`](Self::stores), or leave
/// both out to fall back to the [`Config`](crate::Config) default backend.
///
/// # Example
///
/// ```rust
/// use expect_io::{CacheExpectation, CacheOp, EventBus, Tagged};
///
/// let store = Tagged::new(EventBus::new());
/// let expectation = CacheExpectation::new()
///     .store(&store)
///     .writes(1)
///     .kind(CacheOp::Delete, 0)
///     .matching("user:");
/// # let _ = expectation;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheExpectation {
    total: Option<usize>,
    matching: Option<Matcher>,
    store: Option<BackendId>,
    stores: Vec<BackendId>,
    kinds: Vec<(CacheOp, usize)>,
}

impl CacheExpectation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect exactly `total` counted operations of any kind.
    pub fn total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Only count operations whose key (or any key of a batch) satisfies
    /// `matcher`.
    pub fn matching(mut self, matcher: impl Into<Matcher>) -> Self {
        self.matching = Some(matcher.into());
        self
    }

    /// Count only operations performed by `store`.
    ///
    /// Installs identity tagging on the store right away.
    pub fn store<B: Backend + ?Sized>(mut self, store: &B) -> Self {
        self.store = Some(store.ensure_tagged());
        self
    }

    /// Count only operations performed by any of `stores`.
    ///
    /// Takes precedence over [`store`](Self::store). An empty list counts as
    /// not given.
    pub fn stores<I>(mut self, stores: I) -> Self
    where
        I: IntoIterator,
        I::Item: Backend,
    {
        self.stores = stores.into_iter().map(|s| s.ensure_tagged()).collect();
        self
    }

    /// Expect exactly `count` operations of kind `op`.
    ///
    /// Setting the same kind twice keeps the last count.
    pub fn kind(mut self, op: CacheOp, count: usize) -> Self {
        match self.kinds.iter_mut().find(|(kind, _)| *kind == op) {
            Some(entry) => entry.1 = count,
            None => self.kinds.push((op, count)),
        }
        self
    }

    /// Like [`kind`](Self::kind), parsing the kind from its name
    /// (`"read"`, `"write_multi"`, ...).
    pub fn kind_named(self, op: &str, count: usize) -> Result<Self> {
        Ok(self.kind(op.parse()?, count))
    }

    pub fn reads(self, count: usize) -> Self {
        self.kind(CacheOp::Read, count)
    }

    pub fn writes(self, count: usize) -> Self {
        self.kind(CacheOp::Write, count)
    }

    pub fn deletes(self, count: usize) -> Self {
        self.kind(CacheOp::Delete, count)
    }

    pub(crate) fn matcher(&self) -> Option<Matcher> {
        self.matching.clone()
    }

    /// Backend IDs named by the expectation itself, `stores` first.
    pub(crate) fn explicit_scope(&self) -> Option<HashSet<BackendId>> {
        if !self.stores.is_empty() {
            return Some(self.stores.iter().copied().collect());
        }
        self.store.map(|id| HashSet::from([id]))
    }

    pub(crate) fn constrains_anything(&self) -> bool {
        self.total.is_some() || !self.kinds.is_empty()
    }

    /// Check the counter against this expectation.
    ///
    /// Returns `None` when every specified count holds, or the rendered
    /// failure message.
    pub(crate) fn evaluate(&self, counter: &CacheCounter) -> Option<String> {
        if !self.constrains_anything() {
            tracing::warn!("cache expectation constrains nothing and passes trivially");
            return None;
        }

        let counts = counter.counts();
        let passed = self.total.is_none_or(|total| counts.total() == total)
            && self.kinds.iter().all(|(op, n)| counts.get(*op) == *n);
        if passed {
            return None;
        }

        let mut expected = Vec::new();
        if let Some(total) = self.total {
            expected.push(format!("total {total}"));
        }
        expected.extend(self.kinds.iter().map(|(op, n)| format!("{op}: {n}")));

        let mut actual = vec![format!("total {}", counts.total())];
        actual.extend(
            self.kinds
                .iter()
                .map(|(op, _)| format!("{op}: {}", counts.get(*op))),
        );

        let mut message = format!("expected cache operations: {}", expected.join(", "));
        if let Some(matcher) = &self.matching {
            let _ = write!(message, " matching {matcher}");
        }
        let _ = write!(message, "\nbut got: {}", actual.join(", "));

        let log = counter.log();
        if !log.is_empty() {
            message.push_str("\nCache operations performed:");
            for (i, entry) in log.iter().enumerate() {
                let _ = write!(message, "\n{}. {entry}", i + 1);
            }
        }
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Event, EventBus, Payload, Subscriber, Tagged};

    fn counter_with(ops: &[(CacheOp, &str)]) -> CacheCounter {
        let counter = CacheCounter::default();
        for (op, key) in ops {
            counter.on_event(&Event::new(op.event_name(), Payload::key(*key)));
        }
        counter
    }

    #[test]
    fn kind_replaces_earlier_count() {
        let expectation = CacheExpectation::new().reads(1).reads(3);
        assert_eq!(expectation.kinds, vec![(CacheOp::Read, 3)]);
    }

    #[test]
    fn kind_named_parses_or_fails() {
        let expectation = CacheExpectation::new().kind_named("write_multi", 2).unwrap();
        assert_eq!(expectation.kinds, vec![(CacheOp::WriteMulti, 2)]);

        let err = CacheExpectation::new().kind_named("flush", 1).unwrap_err();
        assert_eq!(err, Error::UnknownCacheOp("flush".to_owned()));
    }

    #[test]
    fn stores_take_precedence_over_store() {
        let a = Tagged::new(EventBus::new());
        let b = Tagged::new(EventBus::new());
        let c = Tagged::new(EventBus::new());

        let expectation = CacheExpectation::new().store(&a).stores([&b, &c]);
        let scope = expectation.explicit_scope().unwrap();

        assert_eq!(
            scope,
            HashSet::from([b.ensure_tagged(), c.ensure_tagged()])
        );
        assert!(a.backend_id().is_some());
    }

    #[test]
    fn empty_stores_fall_back_to_store() {
        let a = Tagged::new(EventBus::new());
        let none: [&Tagged<EventBus>; 0] = [];
        let expectation = CacheExpectation::new().store(&a).stores(none);

        assert_eq!(
            expectation.explicit_scope(),
            Some(HashSet::from([a.ensure_tagged()]))
        );
        assert_eq!(CacheExpectation::new().explicit_scope(), None);
    }

    #[test]
    fn total_and_kinds_are_conjoined() {
        let counter = counter_with(&[(CacheOp::Read, "a"), (CacheOp::Write, "a")]);

        assert_eq!(CacheExpectation::new().total(2).reads(1).evaluate(&counter), None);
        assert!(CacheExpectation::new().total(2).reads(2).evaluate(&counter).is_some());
        assert!(CacheExpectation::new().total(3).reads(1).evaluate(&counter).is_some());
    }

    #[test]
    fn unconstrained_expectation_passes() {
        let counter = counter_with(&[(CacheOp::Read, "a")]);
        assert_eq!(CacheExpectation::new().evaluate(&counter), None);
    }

    #[test]
    fn failure_message_lists_expected_actual_and_log() {
        let counter = counter_with(&[(CacheOp::Read, "user:1")]);
        let message = CacheExpectation::new()
            .total(2)
            .reads(1)
            .writes(1)
            .matching("user")
            .evaluate(&counter)
            .unwrap();

        assert_eq!(
            message,
            "expected cache operations: total 2, read: 1, write: 1 matching \"user\"\n\
             but got: total 1, read: 1, write: 0\n\
             Cache operations performed:\n\
             1. read: user:1"
        );
    }
}
