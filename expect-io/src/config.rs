use std::{fmt, sync::Arc};

use regex::Regex;

use crate::{Backend, UnscopedPolicy};

/// Event name of database query events.
pub const DEFAULT_QUERY_EVENT: &str = "sql";

/// Pattern matching the names of all cache events.
pub const DEFAULT_CACHE_EVENTS: &str = r"^cache[_ .]";

/// Configuration for a [`Probe`](crate::Probe).
///
/// Controls which event names are counted and how cache expectations
/// resolve their backend scope. Use the builder pattern to customize, or
/// use [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use expect_io::{Config, EventBus, Tagged, UnscopedPolicy};
/// use std::sync::Arc;
///
/// let bus = EventBus::new();
/// let cache = Arc::new(Tagged::new(bus.clone()));
///
/// let config = Config::default()
///     .with_query_event("sql.active_record")    // Host-specific query event name
///     .with_default_backend(cache)               // Scope cache expectations to this store
///     .with_unscoped_policy(UnscopedPolicy::Reject);
/// assert_eq!(config.query_event(), "sql.active_record");
/// ```
#[derive(Clone)]
pub struct Config {
    /// Name of the event a database emits per query.
    /// Default: `"sql"`
    query_event: String,

    /// Pattern selecting cache event names for the cache subscription.
    /// Kind classification still happens per event.
    /// Default: `^cache[_ .]`
    cache_events: Regex,

    /// Backend that cache expectations scope to when no store is given.
    /// Default: none
    default_backend: Option<Arc<dyn Backend>>,

    /// What cache expectations do when no backend resolves.
    /// Default: [`UnscopedPolicy::Reject`]
    unscoped: UnscopedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            query_event: DEFAULT_QUERY_EVENT.to_owned(),
            cache_events: Regex::new(DEFAULT_CACHE_EVENTS)
                .unwrap_or_else(|e| unreachable!("default cache pattern is valid: {e}")),
            default_backend: None,
            unscoped: UnscopedPolicy::default(),
        }
    }
}

impl Config {
    /// Set the name of query events.
    pub fn with_query_event(mut self, name: impl Into<String>) -> Self {
        self.query_event = name.into();
        self
    }

    /// Returns the name of query events.
    pub fn query_event(&self) -> &str {
        &self.query_event
    }

    /// Set the pattern that selects cache event names.
    pub fn with_cache_events(mut self, pattern: Regex) -> Self {
        self.cache_events = pattern;
        self
    }

    /// Returns the pattern that selects cache event names.
    pub fn cache_events(&self) -> &Regex {
        &self.cache_events
    }

    /// Set the backend cache expectations fall back to.
    pub fn with_default_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.default_backend = Some(backend);
        self
    }

    /// Returns the backend cache expectations fall back to.
    pub fn default_backend(&self) -> Option<&Arc<dyn Backend>> {
        self.default_backend.as_ref()
    }

    /// Set the policy for cache expectations without any backend.
    pub fn with_unscoped_policy(mut self, policy: UnscopedPolicy) -> Self {
        self.unscoped = policy;
        self
    }

    /// Returns the policy for cache expectations without any backend.
    pub fn unscoped_policy(&self) -> UnscopedPolicy {
        self.unscoped
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("query_event", &self.query_event)
            .field("cache_events", &self.cache_events.as_str())
            .field("default_backend", &self.default_backend.is_some())
            .field("unscoped", &self.unscoped)
            .finish()
    }
}
