//! Time utilities for wardend
//!
//! Wall-clock time drives the daily ledger (usage records are keyed by
//! calendar date), so everything time-sensitive goes through [`now`].
//!
//! # Mock Time for Development
//!
//! In debug builds, the `WARDEN_MOCK_TIME` environment variable can be set
//! to override the system time. This is useful for exercising day rollover
//! and the startup purge without waiting for midnight.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2026-01-01 23:59:00`)

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "WARDEN_MOCK_TIME";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                if let Ok(naive_dt) =
                    NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S")
                {
                    if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                        let real_now = chrono::Local::now();
                        let offset = mock_dt.signed_duration_since(real_now);
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    } else {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            "Failed to convert mock time to local timezone"
                        );
                    }
                } else {
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        expected_format = "%Y-%m-%d %H:%M:%S",
                        "Invalid mock time format"
                    );
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
///
/// In release builds, this always returns the real system time.
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_tracks_system_clock_without_mock() {
        // The env var is not set under test, so now() is the real clock.
        let a = now();
        let b = chrono::Local::now();
        assert!((b - a).num_seconds().abs() < 2);
    }

    #[test]
    fn mock_time_inactive_by_default() {
        assert!(!is_mock_time_active());
    }
}
