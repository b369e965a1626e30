use crate::{CacheExpectation, QueryExpectation};

/// Query and cache expectations checked against the same block.
///
/// Either side may be left out; a block checked against an empty
/// `IoExpectation` always passes.
///
/// ```rust
/// use expect_io::{CacheExpectation, IoExpectation, QueryExpectation};
///
/// let expectation = IoExpectation::new()
///     .queries(QueryExpectation::exactly(1).matching("INSERT"))
///     .cache(CacheExpectation::new().writes(1));
/// # let _ = expectation;
/// ```
#[derive(Debug, Clone, Default)]
pub struct IoExpectation {
    pub(crate) queries: Option<QueryExpectation>,
    pub(crate) cache: Option<CacheExpectation>,
}

impl IoExpectation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queries(mut self, expectation: QueryExpectation) -> Self {
        self.queries = Some(expectation);
        self
    }

    pub fn cache(mut self, expectation: CacheExpectation) -> Self {
        self.cache = Some(expectation);
        self
    }
}

impl From<QueryExpectation> for IoExpectation {
    fn from(expectation: QueryExpectation) -> Self {
        Self::new().queries(expectation)
    }
}

impl From<CacheExpectation> for IoExpectation {
    fn from(expectation: CacheExpectation) -> Self {
        Self::new().cache(expectation)
    }
}
