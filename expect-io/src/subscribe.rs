use std::collections::HashSet;

use regex::Regex;

/// Specifies which event names a subscriber receives.
///
/// Use the static constructors to create subscriptions:
///
/// - [`Subscribe::all()`] - receive every event (e.g. diagnostic monitors)
/// - [`Subscribe::to`] - receive events with specific names
/// - [`Subscribe::matching`] - receive events whose name matches a pattern
///
/// For convenience, a `&str` or an array of names converts to `Subscribe`
/// automatically, and a [`Regex`] converts to a pattern subscription:
///
/// ```ignore
/// // These are equivalent:
/// bus.subscribe("sql", counter.clone());
/// bus.subscribe(Subscribe::to(["sql"]), counter.clone());
/// ```
#[derive(Debug, Clone)]
pub struct Subscribe(pub(crate) Filter);

#[derive(Debug, Clone)]
pub(crate) enum Filter {
    All,
    Names(HashSet<String>),
    Pattern(Regex),
}

impl Subscribe {
    /// Subscribe to every event.
    pub fn all() -> Self {
        Subscribe(Filter::All)
    }

    /// Subscribe to events with exactly these names.
    ///
    /// Accepts any iterator of names:
    /// ```ignore
    /// Subscribe::to(["cache_read", "cache_write"])
    /// Subscribe::to(vec!["sql".to_string()])
    /// ```
    pub fn to<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Subscribe(Filter::Names(names.into_iter().map(Into::into).collect()))
    }

    /// Subscribe to events whose name the pattern finds a match in.
    pub fn matching(pattern: Regex) -> Self {
        Subscribe(Filter::Pattern(pattern))
    }

    /// Returns true if an event named `name` is delivered under this subscription.
    pub fn accepts(&self, name: &str) -> bool {
        match &self.0 {
            Filter::All => true,
            Filter::Names(names) => names.contains(name),
            Filter::Pattern(pattern) => pattern.is_match(name),
        }
    }
}

impl std::fmt::Display for Subscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Filter::All => write!(f, "*"),
            Filter::Names(names) => {
                let mut names: Vec<_> = names.iter().map(String::as_str).collect();
                names.sort_unstable();
                write!(f, "{}", names.join("|"))
            }
            Filter::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
        }
    }
}

impl From<&str> for Subscribe {
    fn from(name: &str) -> Self {
        Subscribe::to([name])
    }
}

impl From<String> for Subscribe {
    fn from(name: String) -> Self {
        Subscribe::to([name])
    }
}

impl<const N: usize> From<[&str; N]> for Subscribe {
    fn from(names: [&str; N]) -> Self {
        Subscribe::to(names)
    }
}

impl From<Regex> for Subscribe {
    fn from(pattern: Regex) -> Self {
        Subscribe::matching(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_accepts_everything() {
        let sub = Subscribe::all();
        assert!(sub.accepts("sql"));
        assert!(sub.accepts(""));
    }

    #[test]
    fn names_are_exact() {
        let sub = Subscribe::from(["cache_read", "cache_write"]);
        assert!(sub.accepts("cache_read"));
        assert!(!sub.accepts("cache_read_multi"));
        assert!(!sub.accepts("sql"));
    }

    #[test]
    fn pattern_matches_names() {
        let sub = Subscribe::from(Regex::new("^cache[_ .]").unwrap());
        assert!(sub.accepts("cache_write"));
        assert!(sub.accepts("cache write multi"));
        assert!(!sub.accepts("sql"));
        assert!(!sub.accepts("cached_sql"));
    }

    #[test]
    fn display_lists_sorted_names() {
        assert_eq!(Subscribe::to(["b", "a"]).to_string(), "a|b");
        assert_eq!(Subscribe::all().to_string(), "*");
    }
}
