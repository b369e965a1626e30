use crate::{CacheExpectation, Probe, QueryExpectation, Result};

/// A reusable check that runs a block and judges the I/O it performed.
///
/// Matchers are built from a [`Probe`] with [`Probe::queries`] and
/// [`Probe::cache_ops`] and combined with [`and`](Self::and). A combined
/// matcher runs the block once, under every constituent.
///
/// # Example
///
/// ```rust
/// use expect_io::{BlockMatcher, CacheExpectation, EventBus, Instrument, Payload, Probe,
///     QueryExpectation, Tagged};
///
/// let bus = EventBus::new();
/// let store = Tagged::new(bus.clone());
/// let probe = Probe::new(bus.clone());
///
/// let mut matcher = probe
///     .queries(QueryExpectation::exactly(1))
///     .and(probe.cache_ops(CacheExpectation::new().store(&store).writes(1)));
///
/// let passed = matcher
///     .matches(&mut || {
///         bus.emit("sql", Payload::sql("INSERT INTO users VALUES (1)"));
///         store.instrument("cache_write", Payload::key("user:1"));
///     })
///     .unwrap();
/// assert!(passed, "{}", matcher.failure_message().unwrap_or_default());
/// ```
pub trait BlockMatcher {
    /// Report usage errors without running anything.
    fn validate(&self) -> Result;

    /// Run `block` once and return whether the expectation held.
    fn matches(&mut self, block: &mut dyn FnMut()) -> Result<bool>;

    /// The failure message of the last [`matches`](Self::matches) call, or
    /// `None` if it passed or has not run.
    fn failure_message(&self) -> Option<String>;

    /// Combine two matchers over a single run of the block.
    fn and<M: BlockMatcher>(self, other: M) -> And<Self, M>
    where
        Self: Sized,
    {
        And {
            left: self,
            right: other,
        }
    }
}

/// Block-style form of [`Probe::expect_queries`].
#[derive(Debug)]
pub struct QueriesMatcher<'p> {
    probe: &'p Probe,
    expectation: QueryExpectation,
    failure: Option<String>,
}

impl<'p> QueriesMatcher<'p> {
    pub(crate) fn new(probe: &'p Probe, expectation: QueryExpectation) -> Self {
        Self {
            probe,
            expectation,
            failure: None,
        }
    }
}

impl BlockMatcher for QueriesMatcher<'_> {
    fn validate(&self) -> Result {
        self.expectation.validate()
    }

    fn matches(&mut self, block: &mut dyn FnMut()) -> Result<bool> {
        let outcome = self.probe.expect_queries(self.expectation.clone(), block)?;
        self.failure = outcome.failure_message().map(str::to_owned);
        Ok(outcome.passed())
    }

    fn failure_message(&self) -> Option<String> {
        self.failure.clone()
    }
}

/// Block-style form of [`Probe::expect_cache_ops`].
#[derive(Debug)]
pub struct CacheOpsMatcher<'p> {
    probe: &'p Probe,
    expectation: CacheExpectation,
    failure: Option<String>,
}

impl<'p> CacheOpsMatcher<'p> {
    pub(crate) fn new(probe: &'p Probe, expectation: CacheExpectation) -> Self {
        Self {
            probe,
            expectation,
            failure: None,
        }
    }
}

impl BlockMatcher for CacheOpsMatcher<'_> {
    fn validate(&self) -> Result {
        self.probe.resolve_scope(&self.expectation).map(|_| ())
    }

    fn matches(&mut self, block: &mut dyn FnMut()) -> Result<bool> {
        let outcome = self.probe.expect_cache_ops(self.expectation.clone(), block)?;
        self.failure = outcome.failure_message().map(str::to_owned);
        Ok(outcome.passed())
    }

    fn failure_message(&self) -> Option<String> {
        self.failure.clone()
    }
}

/// Both matchers over one run of the block. See [`BlockMatcher::and`].
#[derive(Debug)]
pub struct And<A, B> {
    left: A,
    right: B,
}

impl<A: BlockMatcher, B: BlockMatcher> BlockMatcher for And<A, B> {
    fn validate(&self) -> Result {
        self.left.validate()?;
        self.right.validate()
    }

    fn matches(&mut self, block: &mut dyn FnMut()) -> Result<bool> {
        self.validate()?;
        let And { left, right } = self;

        let mut inner = None;
        let outer = left.matches(&mut || inner = Some(right.matches(&mut *block)))?;
        let inner = inner.transpose()?.unwrap_or(false);
        Ok(outer && inner)
    }

    fn failure_message(&self) -> Option<String> {
        let messages: Vec<String> = [self.left.failure_message(), self.right.failure_message()]
            .into_iter()
            .flatten()
            .collect();
        (!messages.is_empty()).then(|| messages.join("\n\n"))
    }
}
