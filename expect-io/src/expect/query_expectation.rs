use std::fmt::Write;

use crate::{Error, Matcher, QueryCounter, Result};

/// What a block is expected to do in terms of database queries.
///
/// Count modes, checked in this order:
/// - `at_most(n)`: passes if at most `n` queries were made,
/// - `count(n)`: passes if exactly `n` queries were made,
/// - neither: passes if at least one query was made.
///
/// `count` and `at_most` are mutually exclusive; combining them is a usage
/// error reported before the block runs.
///
/// # Example
///
/// ```rust
/// use expect_io::QueryExpectation;
///
/// let exactly_one_insert = QueryExpectation::exactly(1).matching("INSERT");
/// let cheap = QueryExpectation::new().at_most(3);
/// let some = QueryExpectation::new();
/// # let _ = (exactly_one_insert, cheap, some);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryExpectation {
    count: Option<usize>,
    at_most: Option<usize>,
    matching: Option<Matcher>,
}

impl QueryExpectation {
    /// Expect at least one query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect exactly `count` queries.
    pub fn exactly(count: usize) -> Self {
        Self::new().count(count)
    }

    /// Expect exactly `count` queries.
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Expect no more than `limit` queries.
    pub fn at_most(mut self, limit: usize) -> Self {
        self.at_most = Some(limit);
        self
    }

    /// Only count queries whose text satisfies `matcher`.
    pub fn matching(mut self, matcher: impl Into<Matcher>) -> Self {
        self.matching = Some(matcher.into());
        self
    }

    pub(crate) fn matcher(&self) -> Option<Matcher> {
        self.matching.clone()
    }

    pub(crate) fn validate(&self) -> Result {
        if self.count.is_some() && self.at_most.is_some() {
            return Err(Error::conflict("count", "at_most"));
        }
        Ok(())
    }

    /// Check the counter against this expectation.
    ///
    /// Returns `None` when the expectation holds, or the rendered failure
    /// message.
    pub(crate) fn evaluate(&self, counter: &QueryCounter) -> Option<String> {
        let actual = counter.count();
        let (passed, expected) = match (self.at_most, self.count) {
            (Some(limit), _) => (actual <= limit, format!("at most {limit} queries")),
            (None, Some(count)) => (actual == count, format!("{count} queries")),
            (None, None) => (actual > 0, "some queries".to_owned()),
        };
        if passed {
            return None;
        }

        let mut message = format!("expected {expected}");
        if let Some(matcher) = &self.matching {
            let _ = write!(message, " matching {matcher}");
        }
        if actual == 0 && self.at_most.is_none() && self.count.is_none() {
            message.push_str(", but made none");
        } else {
            let _ = write!(message, ", but made {actual}");
        }
        if self.matching.is_some() {
            let _ = write!(
                message,
                " ({actual} of {} queries matched)",
                counter.observed()
            );
        }

        let log = counter.log();
        if !log.is_empty() {
            message.push_str("\nQueries run:");
            for (i, sql) in log.iter().enumerate() {
                let _ = write!(message, "\n{}. {sql}", i + 1);
            }
        }
        Some(message)
    }
}
