//! String matching for query text and cache keys.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

type MatchFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A predicate over query text or a cache key.
///
/// `Matcher` can match candidates by:
/// - Substring (exact, case-sensitive containment)
/// - Compiled regular expression
/// - Custom predicate
///
/// # Example
///
/// ```rust
/// use expect_io::Matcher;
/// use regex::Regex;
///
/// let matcher = Matcher::substring("UPDATE");
/// assert!(matcher.test("UPDATE users SET name = 'x'"));
///
/// let matcher = Matcher::pattern(Regex::new(r"^user:\d+$").unwrap());
/// assert!(matcher.test("user:42"));
///
/// let matcher = Matcher::predicate(|key| key.len() > 3);
/// assert!(!matcher.test("abc"));
///
/// // &str and Regex convert directly
/// let matcher: Matcher = "user".into();
/// assert!(matcher.test("user:1"));
/// ```
#[derive(Clone)]
pub struct Matcher {
    kind: MatcherKind,
}

#[derive(Clone)]
enum MatcherKind {
    Substring(String),
    Pattern(Regex),
    Predicate(MatchFn),
}

impl Matcher {
    /// Match candidates containing `needle`.
    pub fn substring(needle: impl Into<String>) -> Self {
        Self {
            kind: MatcherKind::Substring(needle.into()),
        }
    }

    /// Match candidates the regular expression finds a match in.
    pub fn pattern(regex: Regex) -> Self {
        Self {
            kind: MatcherKind::Pattern(regex),
        }
    }

    /// Match candidates using a custom predicate.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: MatcherKind::Predicate(Arc::new(predicate)),
        }
    }

    /// Returns true if `candidate` satisfies this matcher.
    pub fn test(&self, candidate: &str) -> bool {
        match &self.kind {
            MatcherKind::Substring(needle) => candidate.contains(needle.as_str()),
            MatcherKind::Pattern(regex) => regex.is_match(candidate),
            MatcherKind::Predicate(predicate) => predicate(candidate),
        }
    }

    /// Like [`test`](Self::test), with an absent candidate never matching.
    pub(crate) fn test_opt(&self, candidate: Option<&str>) -> bool {
        candidate.is_some_and(|c| self.test(c))
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MatcherKind::Substring(needle) => f.debug_tuple("Substring").field(needle).finish(),
            MatcherKind::Pattern(regex) => f.debug_tuple("Pattern").field(regex).finish(),
            MatcherKind::Predicate(_) => f.debug_struct("Predicate").finish_non_exhaustive(),
        }
    }
}

/// Renders the matcher the way failure messages quote it:
/// `"text"` for substrings, `/regex/` for patterns.
impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MatcherKind::Substring(needle) => write!(f, "{needle:?}"),
            MatcherKind::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
            MatcherKind::Predicate(_) => write!(f, "<predicate>"),
        }
    }
}

impl From<&str> for Matcher {
    fn from(needle: &str) -> Self {
        Matcher::substring(needle)
    }
}

impl From<String> for Matcher {
    fn from(needle: String) -> Self {
        Matcher::substring(needle)
    }
}

impl From<Regex> for Matcher {
    fn from(regex: Regex) -> Self {
        Matcher::pattern(regex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_matches_containment() {
        let matcher = Matcher::substring("INSERT");
        assert!(matcher.test("INSERT INTO users (name) VALUES ('Foo')"));
        assert!(!matcher.test("insert into users"));
    }

    #[test]
    fn pattern_matches_anywhere() {
        let matcher = Matcher::pattern(Regex::new("(?i)update").unwrap());
        assert!(matcher.test("update users set x = 1"));
        assert!(!matcher.test("SELECT 1"));
    }

    #[test]
    fn predicate_is_called() {
        let matcher = Matcher::predicate(|c| c.ends_with(":1"));
        assert!(matcher.test("user:1"));
        assert!(!matcher.test("user:2"));
    }

    #[test]
    fn absent_candidate_never_matches() {
        let matcher = Matcher::predicate(|_| true);
        assert!(!matcher.test_opt(None));
        assert!(matcher.test_opt(Some("")));
    }

    #[test]
    fn display_quotes_the_pattern() {
        assert_eq!(Matcher::from("user").to_string(), "\"user\"");
        assert_eq!(
            Matcher::from(Regex::new("^UPDATE").unwrap()).to_string(),
            "/^UPDATE/"
        );
    }
}
