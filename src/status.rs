use serde::{Deserialize, Serialize};
use std::fmt;

/// Health status of a single component or of the application as a whole.
///
/// Statuses are totally ordered by severity: `Up < Degraded < Down`.
/// Aggregation always yields the most severe applicable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// The application or component is up and functioning as expected.
    Up,
    /// Up and functional, but experiencing non-critical issues that degrade
    /// the experience.
    Degraded,
    /// Not functional; for all intents and purposes down.
    Down,
}

impl Status {
    /// HTTP status code reported for this status.
    ///
    /// Degraded deliberately maps to 200: orchestrators must keep routing
    /// traffic to a degraded-but-functional instance.
    pub fn http_status_code(self) -> u16 {
        match self {
            Status::Up => 200,
            Status::Degraded => 200,
            Status::Down => 503,
        }
    }

    /// Gauge encoding used by the metrics endpoint: 0 is down, 1 is
    /// degraded, 2 is up.
    pub fn gauge_value(self) -> u8 {
        match self {
            Status::Down => 0,
            Status::Degraded => 1,
            Status::Up => 2,
        }
    }

    /// Severity encoding used for atomic storage: Up=0, Degraded=1, Down=2.
    pub(crate) fn severity(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Status::severity`].
    ///
    /// Panics on any other byte. A status slot can only hold a value written
    /// by [`Status::severity`], so anything else is a local defect and an
    /// unrecoverable invariant violation, not a condition to coerce.
    pub(crate) fn from_severity(raw: u8) -> Status {
        match raw {
            0 => Status::Up,
            1 => Status::Degraded,
            2 => Status::Down,
            other => panic!("{} is not a valid status encoding", other),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => write!(f, "UP"),
            Status::Degraded => write!(f, "DEGRADED"),
            Status::Down => write!(f, "DOWN"),
        }
    }
}
