//! Wall-clock timestamps for instance and template bookkeeping.
//!
//! Timestamps are epoch milliseconds, the unit stored in `createdAt` and
//! `updatedAt`. [`now_millis`] never goes backwards within a process so that
//! `updatedAt >= createdAt` holds even across small clock adjustments.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Current time in epoch milliseconds, monotonic within this process.
#[must_use]
pub fn now_millis() -> i64 {
    let current = Utc::now().timestamp_millis();
    let previous = LAST_MILLIS.fetch_max(current, Ordering::Relaxed);
    current.max(previous)
}

/// Format epoch milliseconds as RFC 3339 for human-facing output.
#[must_use]
pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |dt| dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_millis_is_monotonic() {
        let mut last = now_millis();
        for _ in 0..1000 {
            let next = now_millis();
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn format_epoch_zero() {
        assert_eq!(format_millis(0), "1970-01-01T00:00:00+00:00");
    }
}
