use std::fmt;

/// Controls what a cache expectation does when no backend can be resolved.
///
/// Cache expectations scope counting to backends: the explicit `stores`,
/// else the single `store`, else the default backend injected through
/// [`Config`](crate::Config). When none of those exist the policy decides.
///
/// | Policy | Without a backend | Use case |
/// |--------|-------------------|----------|
/// | [`Reject`](Self::Reject) | Fail with [`Error::UnresolvedScope`](crate::Error::UnresolvedScope) | Hosts with several live caches |
/// | [`CountAll`](Self::CountAll) | Count events from every backend | Hosts with a single cache |
///
/// # Default
///
/// The default is `Reject`. Counting every backend silently picks up
/// operations of unrelated caches, so it has to be chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum UnscopedPolicy {
    /// Refuse to run the block and return a usage error.
    #[default]
    Reject,

    /// Count cache events regardless of which backend emitted them.
    CountAll,
}

impl UnscopedPolicy {
    /// Returns `true` if this is the [`Reject`](Self::Reject) policy.
    pub fn is_reject(&self) -> bool {
        matches!(self, UnscopedPolicy::Reject)
    }

    /// Returns `true` if this is the [`CountAll`](Self::CountAll) policy.
    pub fn is_count_all(&self) -> bool {
        matches!(self, UnscopedPolicy::CountAll)
    }
}

impl fmt::Display for UnscopedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnscopedPolicy::Reject => write!(f, "Reject"),
            UnscopedPolicy::CountAll => write!(f, "CountAll"),
        }
    }
}
