use std::fmt;

use crate::{Error, Result};

/// The verdict of one expectation over one block, plus the block's value.
///
/// A failed outcome carries the rendered message: expected vs actual counts
/// and the full log of matched events, so a failing test explains itself.
///
/// # Example
///
/// ```rust
/// use expect_io::{EventBus, Payload, Probe, QueryExpectation};
///
/// # fn main() -> expect_io::Result {
/// let bus = EventBus::new();
/// let probe = Probe::new(bus.clone());
///
/// let outcome = probe.expect_queries(QueryExpectation::exactly(1), || {
///     bus.emit("sql", Payload::sql("INSERT INTO users (name) VALUES ('Foo')"));
///     7
/// })?;
/// if !outcome.passed() {
///     eprintln!("{}", outcome.failure_message().unwrap_or_default());
/// }
/// let id = outcome.into_result()?;
/// assert_eq!(id, 7);
/// # Ok(())
/// # }
/// ```
#[must_use = "an outcome does nothing unless it is checked"]
pub struct Outcome<R> {
    value: R,
    failure: Option<String>,
}

impl<R> Outcome<R> {
    pub(crate) fn new(value: R, failures: Vec<String>) -> Self {
        let failure = (!failures.is_empty()).then(|| failures.join("\n\n"));
        Self { value, failure }
    }

    /// Returns true if every expectation held.
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// The rendered failure message, or `None` if the outcome passed.
    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Returns a reference to the block's value.
    pub fn value(&self) -> &R {
        &self.value
    }

    /// Returns the block's value, whether or not the outcome passed.
    pub fn into_value(self) -> R {
        self.value
    }

    /// Returns the block's value, or [`Error::ExpectationFailed`].
    pub fn into_result(self) -> Result<R> {
        match self.failure {
            None => Ok(self.value),
            Some(message) => Err(Error::ExpectationFailed(message)),
        }
    }

    /// Returns the block's value, panicking with the failure message.
    #[track_caller]
    pub fn assert(self) -> R {
        match self.failure {
            None => self.value,
            Some(message) => panic!("{message}"),
        }
    }

    /// Logical AND of two outcomes. Failure messages are concatenated.
    pub fn and<S>(self, other: Outcome<S>) -> Outcome<(R, S)> {
        let failures = [self.failure, other.failure].into_iter().flatten().collect();
        Outcome::new((self.value, other.value), failures)
    }

    /// Transform the block's value, keeping the verdict.
    pub fn map<S>(self, f: impl FnOnce(R) -> S) -> Outcome<S> {
        Outcome {
            value: f(self.value),
            failure: self.failure,
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Outcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("value", &self.value)
            .field("failure", &self.failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_outcome() {
        let outcome = Outcome::new(5, Vec::new());
        assert!(outcome.passed());
        assert_eq!(outcome.failure_message(), None);
        assert_eq!(outcome.into_result(), Ok(5));
    }

    #[test]
    fn failing_outcome_keeps_value_and_message() {
        let outcome = Outcome::new("v", vec!["expected 1 queries, but made 0".into()]);
        assert!(!outcome.passed());
        assert_eq!(*outcome.value(), "v");
        assert_eq!(
            outcome.into_result(),
            Err(Error::ExpectationFailed("expected 1 queries, but made 0".into()))
        );
    }

    #[test]
    fn and_is_conjunction() {
        let both = Outcome::new(1, Vec::new()).and(Outcome::new(2, Vec::new()));
        assert!(both.passed());
        assert_eq!(both.into_value(), (1, 2));

        let one = Outcome::new(1, vec!["left".into()]).and(Outcome::new(2, Vec::new()));
        assert_eq!(one.failure_message(), Some("left"));

        let none = Outcome::new(1, vec!["left".into()]).and(Outcome::new(2, vec!["right".into()]));
        assert_eq!(none.failure_message(), Some("left\n\nright"));
    }

    #[test]
    #[should_panic(expected = "expected some queries, but made none")]
    fn assert_panics_with_message() {
        Outcome::new((), vec!["expected some queries, but made none".into()]).assert();
    }
}
