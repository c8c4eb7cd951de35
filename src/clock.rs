use chrono::{DateTime, Utc};

/// Source of "now" for everything time-dependent: link expiration and the
/// rolling month window.
///
/// Handlers read the clock once per request and pass the instant down, so a
/// single response never mixes two different notions of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant. Used by tests and by anything replaying a
/// past view of the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
