use std::{fmt, time::SystemTime};

use crate::EventId;

/// When and under which ID an [`Event`](crate::Event) was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Meta {
    id: EventId,
    timestamp: u64,
}

impl Meta {
    /// Fresh metadata: a random ID and the current time.
    pub fn now() -> Self {
        Self {
            id: EventId::random(),
            timestamp: nanos_since_epoch(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// Emission time in nanoseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

// A clock set before the epoch reads as 0 instead of failing the emit.
fn nanos_since_epoch() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}ns", self.id, self.timestamp)
    }
}
