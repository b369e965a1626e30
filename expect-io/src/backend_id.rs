use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_BACKEND_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a backend instance.
///
/// Assigned once when identity tagging is installed on a backend (see
/// [`Tagged`](crate::Tagged)) and stamped on every event that backend emits
/// afterwards, under the `backend_id` payload field. IDs are never reused
/// within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct BackendId(u64);

impl BackendId {
    pub(crate) fn next() -> Self {
        Self(NEXT_BACKEND_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for BackendId {
    fn from(value: u64) -> Self {
        BackendId(value)
    }
}

impl From<BackendId> for u64 {
    fn from(value: BackendId) -> Self {
        value.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend#{}", self.0)
    }
}
