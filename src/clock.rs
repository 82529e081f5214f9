use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::time::{Duration, Instant};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A wall clock that advances with tokio's clock, so a paused runtime
/// controls it along with every timer.
#[derive(Debug, Copy, Clone)]
pub struct TokioClock {
    origin: DateTime<Utc>,
    anchor: Instant,
}

impl TokioClock {
    /// A clock that reads `origin` now.
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            anchor: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        ChronoDuration::from_std(self.anchor.elapsed())
            .ok()
            .and_then(|elapsed| self.origin.checked_add_signed(elapsed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Time from `now` until `target`. A target in the past gives zero.
pub fn duration_until(target: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let millis = u64::try_from((target - now).num_milliseconds()).unwrap_or(0);
    Duration::from_millis(millis)
}

/// Fixed instant that tests anchor their clocks to.
#[cfg(test)]
pub fn test_epoch() -> DateTime<Utc> {
    use chrono::TimeZone;
    Utc.with_ymd_and_hms(2023, 4, 1, 12, 0, 0).unwrap()
}
