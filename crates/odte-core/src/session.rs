//! Market session calendar and clock abstraction.

use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use chrono_tz::US::Eastern;

/// Trading session parameters for the underlying's exchange.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Regular session open, exchange-local
    pub open: NaiveTime,
    /// Regular session close, exchange-local
    pub close: NaiveTime,
    /// Buffer added to the close before the time-based exit fires
    pub close_buffer: Duration,
    /// Exchange time zone
    pub timezone: Tz,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            close_buffer: Duration::minutes(30),
            timezone: Eastern,
        }
    }
}

impl SessionConfig {
    /// The close-plus-buffer cutoff for the session day containing `at`.
    pub fn close_cutoff(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let local = at.with_timezone(&self.timezone);
        let close_naive = local.date_naive().and_time(self.close);
        let close = match self.timezone.from_local_datetime(&close_naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            // DST transitions never land on the cash close; fall back to
            // the sample's own instant rather than inventing a time.
            LocalResult::None => local,
        };
        close.with_timezone(&Utc) + self.close_buffer
    }

    /// True once `at` is at or past the close-plus-buffer cutoff.
    pub fn is_past_close_cutoff(&self, at: DateTime<Utc>) -> bool {
        at >= self.close_cutoff(at)
    }
}

/// Clock seam so the manager can be driven deterministically in tests.
pub trait SessionClock: Send + Sync {
    /// Current wall time.
    fn now(&self) -> DateTime<Utc>;

    /// True once `at` is at or past the session close plus buffer.
    fn is_past_close_cutoff(&self, at: DateTime<Utc>) -> bool;
}

/// Wall clock over a session calendar.
#[derive(Debug, Clone, Default)]
pub struct WallClock {
    config: SessionConfig,
}

impl WallClock {
    /// Create a wall clock for the given session calendar.
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

impl SessionClock for WallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn is_past_close_cutoff(&self, at: DateTime<Utc>) -> bool {
        self.config.is_past_close_cutoff(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    #[test]
    fn test_close_cutoff_is_eastern_close_plus_buffer() {
        let config = SessionConfig::default();
        // 2025-06-16 is an EDT Monday: 16:30 Eastern == 20:30 UTC.
        let morning = Utc.with_ymd_and_hms(2025, 6, 16, 14, 0, 0).unwrap();
        let cutoff = config.close_cutoff(morning);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2025, 6, 16, 20, 30, 0).unwrap());
    }

    #[test]
    fn test_is_past_close_cutoff() {
        let config = SessionConfig::default();
        let before = Utc.with_ymd_and_hms(2025, 6, 16, 20, 29, 59).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 6, 16, 20, 30, 0).unwrap();
        assert!(!config.is_past_close_cutoff(before));
        assert!(config.is_past_close_cutoff(at));
    }

    #[test]
    fn test_cutoff_in_winter_uses_est() {
        let config = SessionConfig::default();
        // 2025-01-15 is EST: 16:30 Eastern == 21:30 UTC.
        let morning = Utc.with_ymd_and_hms(2025, 1, 15, 15, 0, 0).unwrap();
        let cutoff = config.close_cutoff(morning);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2025, 1, 15, 21, 30, 0).unwrap());
    }
}
