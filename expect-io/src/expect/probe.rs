use std::{collections::HashSet, fmt};

use crate::{
    Backend, BackendId, CacheCounter, CacheExpectation, Config, Error, EventBus, IoExpectation,
    Outcome, QueryCounter, QueryExpectation, Result, Subscribe, Subscription, UnscopedPolicy,
    expect::{CacheOpsMatcher, QueriesMatcher},
};

/// Entry point for asserting on the I/O a block of code performs.
///
/// A `Probe` holds a handle to the [`EventBus`] the code under test emits
/// through, and the [`Config`] that names the events to count. For each
/// assertion it:
///
/// 1. validates the expectation (usage errors are returned before anything
///    is subscribed),
/// 2. subscribes a fresh counter for the duration of the block,
/// 3. runs the block exactly once,
/// 4. evaluates the counter into an [`Outcome`].
///
/// The subscription is released on every exit path, including a panic in
/// the block. Events emitted before or after the block are not counted.
///
/// # Example
///
/// ```rust
/// use expect_io::{EventBus, Payload, Probe, QueryExpectation};
///
/// let bus = EventBus::new();
/// let probe = Probe::new(bus.clone());
///
/// let outcome = probe
///     .expect_queries(QueryExpectation::exactly(1).matching("INSERT"), || {
///         bus.emit("sql", Payload::sql("INSERT INTO users VALUES (1)"));
///     })
///     .unwrap();
/// assert!(outcome.passed());
/// ```
#[derive(Clone)]
pub struct Probe {
    bus: EventBus,
    config: Config,
}

impl Probe {
    /// Create a probe with the default configuration.
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Count the queries `block` makes and check them against `expectation`.
    ///
    /// # Errors
    ///
    /// [`Error::ConflictingOptions`] if both `count` and `at_most` are set.
    /// The block is not run in that case.
    pub fn expect_queries<R>(
        &self,
        expectation: QueryExpectation,
        block: impl FnOnce() -> R,
    ) -> Result<Outcome<R>> {
        let counter = self.arm_queries(&expectation)?;
        let value = {
            let _subscription = self.watch_queries(&counter);
            block()
        };
        Ok(Outcome::new(
            value,
            self.judge_queries(&expectation, &counter).into_iter().collect(),
        ))
    }

    /// Count the cache operations `block` performs and check them against
    /// `expectation`.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedScope`] if no backend could be resolved and the
    /// configured [`UnscopedPolicy`] rejects unscoped counting. The block is
    /// not run in that case.
    pub fn expect_cache_ops<R>(
        &self,
        expectation: CacheExpectation,
        block: impl FnOnce() -> R,
    ) -> Result<Outcome<R>> {
        let counter = self.arm_cache_ops(&expectation)?;
        let value = {
            let _subscription = self.watch_cache_ops(&counter);
            block()
        };
        Ok(Outcome::new(
            value,
            self.judge_cache_ops(&expectation, &counter).into_iter().collect(),
        ))
    }

    /// Check queries and cache operations of a single run of `block`.
    ///
    /// Both counters are subscribed around the same run. The outcome passes
    /// only if every given expectation holds, and its failure message
    /// carries each failing side.
    pub fn expect_io<R>(
        &self,
        expectation: IoExpectation,
        block: impl FnOnce() -> R,
    ) -> Result<Outcome<R>> {
        let IoExpectation { queries, cache } = expectation;
        if queries.is_none() && cache.is_none() {
            tracing::warn!("io expectation constrains nothing and passes trivially");
        }

        let query_counter = queries
            .as_ref()
            .map(|q| self.arm_queries(q))
            .transpose()?;
        let cache_counter = cache
            .as_ref()
            .map(|c| self.arm_cache_ops(c))
            .transpose()?;

        let value = {
            let _queries = query_counter.as_ref().map(|c| self.watch_queries(c));
            let _cache = cache_counter.as_ref().map(|c| self.watch_cache_ops(c));
            block()
        };

        let mut failures = Vec::new();
        if let (Some(expectation), Some(counter)) = (&queries, &query_counter) {
            failures.extend(self.judge_queries(expectation, counter));
        }
        if let (Some(expectation), Some(counter)) = (&cache, &cache_counter) {
            failures.extend(self.judge_cache_ops(expectation, counter));
        }
        Ok(Outcome::new(value, failures))
    }

    /// Async form of [`expect_queries`](Self::expect_queries).
    ///
    /// The subscription is held across the `.await`: every query made while
    /// `block` is being polled is counted, including queries emitted by
    /// other tasks in the meantime. Dropping the returned future releases
    /// the subscription.
    pub async fn expect_queries_async<F>(
        &self,
        expectation: QueryExpectation,
        block: F,
    ) -> Result<Outcome<F::Output>>
    where
        F: Future,
    {
        let counter = self.arm_queries(&expectation)?;
        let value = {
            let _subscription = self.watch_queries(&counter);
            block.await
        };
        Ok(Outcome::new(
            value,
            self.judge_queries(&expectation, &counter).into_iter().collect(),
        ))
    }

    /// Async form of [`expect_cache_ops`](Self::expect_cache_ops).
    pub async fn expect_cache_ops_async<F>(
        &self,
        expectation: CacheExpectation,
        block: F,
    ) -> Result<Outcome<F::Output>>
    where
        F: Future,
    {
        let counter = self.arm_cache_ops(&expectation)?;
        let value = {
            let _subscription = self.watch_cache_ops(&counter);
            block.await
        };
        Ok(Outcome::new(
            value,
            self.judge_cache_ops(&expectation, &counter).into_iter().collect(),
        ))
    }

    /// Like [`expect_queries`](Self::expect_queries), panicking on a usage
    /// error or a failed expectation. Returns the block's value.
    #[track_caller]
    pub fn assert_queries<R>(&self, expectation: QueryExpectation, block: impl FnOnce() -> R) -> R {
        match self.expect_queries(expectation, block) {
            Ok(outcome) => outcome.assert(),
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`expect_cache_ops`](Self::expect_cache_ops), panicking on a
    /// usage error or a failed expectation. Returns the block's value.
    #[track_caller]
    pub fn assert_cache_ops<R>(
        &self,
        expectation: CacheExpectation,
        block: impl FnOnce() -> R,
    ) -> R {
        match self.expect_cache_ops(expectation, block) {
            Ok(outcome) => outcome.assert(),
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`expect_io`](Self::expect_io), panicking on a usage error or a
    /// failed expectation. Returns the block's value.
    #[track_caller]
    pub fn assert_io<R>(&self, expectation: IoExpectation, block: impl FnOnce() -> R) -> R {
        match self.expect_io(expectation, block) {
            Ok(outcome) => outcome.assert(),
            Err(err) => panic!("{err}"),
        }
    }

    /// Block-style matcher for query expectations.
    pub fn queries(&self, expectation: QueryExpectation) -> QueriesMatcher<'_> {
        QueriesMatcher::new(self, expectation)
    }

    /// Block-style matcher for cache expectations.
    pub fn cache_ops(&self, expectation: CacheExpectation) -> CacheOpsMatcher<'_> {
        CacheOpsMatcher::new(self, expectation)
    }

    /// Backends whose operations a cache expectation counts.
    ///
    /// Resolution order: the expectation's `stores`, its `store`, the
    /// configured default backend. Every resolved backend is tagged. With
    /// nothing resolved the [`UnscopedPolicy`] decides: `Reject` is an
    /// error, `CountAll` counts every backend (`None`).
    pub(crate) fn resolve_scope(
        &self,
        expectation: &CacheExpectation,
    ) -> Result<Option<HashSet<BackendId>>> {
        if let Some(scope) = expectation.explicit_scope() {
            return Ok(Some(scope));
        }
        if let Some(backend) = self.config.default_backend() {
            return Ok(Some(HashSet::from([backend.ensure_tagged()])));
        }
        match self.config.unscoped_policy() {
            UnscopedPolicy::Reject => Err(Error::UnresolvedScope),
            UnscopedPolicy::CountAll => {
                tracing::warn!("no cache backend resolved, counting operations from every backend");
                Ok(None)
            }
        }
    }

    fn arm_queries(&self, expectation: &QueryExpectation) -> Result<QueryCounter> {
        expectation.validate()?;
        Ok(QueryCounter::new(expectation.matcher()))
    }

    fn arm_cache_ops(&self, expectation: &CacheExpectation) -> Result<CacheCounter> {
        let scope = self.resolve_scope(expectation)?;
        Ok(CacheCounter::new(expectation.matcher(), scope))
    }

    fn watch_queries(&self, counter: &QueryCounter) -> Subscription {
        self.bus
            .subscribe_scoped(self.config.query_event(), counter.clone())
    }

    fn watch_cache_ops(&self, counter: &CacheCounter) -> Subscription {
        self.bus.subscribe_scoped(
            Subscribe::matching(self.config.cache_events().clone()),
            counter.clone(),
        )
    }

    fn judge_queries(
        &self,
        expectation: &QueryExpectation,
        counter: &QueryCounter,
    ) -> Option<String> {
        let failure = expectation.evaluate(counter);
        tracing::debug!(
            count = counter.count(),
            observed = counter.observed(),
            passed = failure.is_none(),
            "query expectation evaluated"
        );
        failure
    }

    fn judge_cache_ops(
        &self,
        expectation: &CacheExpectation,
        counter: &CacheCounter,
    ) -> Option<String> {
        let failure = expectation.evaluate(counter);
        tracing::debug!(
            total = counter.total(),
            passed = failure.is_none(),
            "cache expectation evaluated"
        );
        failure
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("bus", &self.bus)
            .field("config", &self.config)
            .finish()
    }
}
