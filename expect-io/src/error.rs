/// The single error type for all expect-io operations.
///
/// Event handling itself never fails: malformed payloads are treated as
/// "does not match". Errors only surface from the assertion façade, either
/// as usage errors before a block runs or as a failed expectation after it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("`{first}` and `{second}` cannot be combined in one expectation")]
    ConflictingOptions {
        first: &'static str,
        second: &'static str,
    },

    #[error(
        "No cache backend to scope counting to. Pass a store, configure a default backend, or allow unscoped counting."
    )]
    UnresolvedScope,

    #[error("Unknown cache operation '{0}'")]
    UnknownCacheOp(String),

    #[error("{0}")]
    ExpectationFailed(String),
}

impl Error {
    pub(crate) fn conflict(first: &'static str, second: &'static str) -> Self {
        Error::ConflictingOptions { first, second }
    }
}
