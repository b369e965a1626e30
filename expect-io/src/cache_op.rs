use std::{fmt, str::FromStr};

use crate::Error;

/// The classified kind of a cache event.
///
/// Cache events are named `cache_<kind>` (optionally with a `.namespace`
/// suffix). [`CacheOp::from_event_name`] strips the category prefix and
/// normalizes the rest:
///
/// | Event name | Kind |
/// |------------|------|
/// | `cache_read` | [`Read`](Self::Read) |
/// | `cache read` | [`Read`](Self::Read) |
/// | `cache write multi` | [`WriteMulti`](Self::WriteMulti) |
/// | `cache_exist?.active_support` | [`Exist`](Self::Exist) |
///
/// # Example
///
/// ```rust
/// use expect_io::CacheOp;
///
/// assert_eq!(CacheOp::from_event_name("cache_read"), Some(CacheOp::Read));
/// assert_eq!(CacheOp::from_event_name("cache write multi"), Some(CacheOp::WriteMulti));
/// assert_eq!(CacheOp::from_event_name("sql"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOp {
    Read,
    Write,
    Delete,
    Exist,
    Increment,
    Decrement,
    ReadMulti,
    WriteMulti,
    DeleteMulti,
    FetchMulti,
}

impl CacheOp {
    pub const ALL: [CacheOp; 10] = [
        CacheOp::Read,
        CacheOp::Write,
        CacheOp::Delete,
        CacheOp::Exist,
        CacheOp::Increment,
        CacheOp::Decrement,
        CacheOp::ReadMulti,
        CacheOp::WriteMulti,
        CacheOp::DeleteMulti,
        CacheOp::FetchMulti,
    ];

    /// Classify a cache event by its name.
    ///
    /// Returns `None` for names outside the cache category and for cache
    /// names that are not a known kind.
    pub fn from_event_name(name: &str) -> Option<Self> {
        let name = name.split('.').next().unwrap_or_default();
        let rest = name
            .strip_prefix("cache")?
            .strip_prefix(['_', ' ', '.'])?;
        let kind = rest
            .trim()
            .trim_end_matches('?')
            .replace([' ', '-'], "_")
            .to_ascii_lowercase();
        kind.parse().ok()
    }

    /// The event name a backend emits for this kind (`cache_<kind>`).
    pub fn event_name(&self) -> String {
        format!("cache_{}", self.as_str())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOp::Read => "read",
            CacheOp::Write => "write",
            CacheOp::Delete => "delete",
            CacheOp::Exist => "exist",
            CacheOp::Increment => "increment",
            CacheOp::Decrement => "decrement",
            CacheOp::ReadMulti => "read_multi",
            CacheOp::WriteMulti => "write_multi",
            CacheOp::DeleteMulti => "delete_multi",
            CacheOp::FetchMulti => "fetch_multi",
        }
    }
}

impl fmt::Display for CacheOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::UnknownCacheOp(s.to_owned()))
    }
}
