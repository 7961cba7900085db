//! Daily check-in / streak accounting on the client side.
//!
//! Day boundaries are UTC buckets over milliseconds-since-epoch, not
//! timezone-aware calendar days. The points formula here is a provisional
//! estimate for immediate UI feedback; the persisted numbers are computed by
//! the remote reducer and arrive later as a `user_stats` update event, which
//! overwrites anything estimated here.

use crate::model::{CheckInRecord, UserStats};

pub const MS_PER_DAY: i64 = 86_400_000;

/// Start-of-UTC-day timestamp for a millisecond timestamp.
pub fn day_start(ts_ms: i64) -> i64 {
    ts_ms - ts_ms.rem_euclid(MS_PER_DAY)
}

/// Whether any cached record falls in the same UTC day bucket as `now_ms`.
/// Derived by scanning, recomputed reactively, never stored.
pub fn has_checked_in_today(records: &[CheckInRecord], now_ms: i64) -> bool {
    let today = day_start(now_ms);
    records.iter().any(|r| day_start(r.checkin_date) == today)
}

/// Client-side plan for a check-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInPlan {
    /// A record already exists for today's bucket; the action is a no-op.
    AlreadyCheckedIn,
    /// Accepted: the estimate to show until the authoritative row arrives.
    Accepted(CheckInEstimate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInEstimate {
    pub new_streak: i64,
    pub points_earned: i64,
}

/// Decide whether today's check-in should be forwarded, and estimate its
/// effect from cached stats. `stats` is absent for first-time users.
pub fn plan_checkin(
    stats: Option<&UserStats>,
    records: &[CheckInRecord],
    now_ms: i64,
) -> CheckInPlan {
    if has_checked_in_today(records, now_ms) {
        return CheckInPlan::AlreadyCheckedIn;
    }
    let new_streak = stats.map_or(1, |s| s.current_streak + 1);
    CheckInPlan::Accepted(CheckInEstimate {
        new_streak,
        points_earned: 10 + new_streak * 2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(checkin_date: i64) -> CheckInRecord {
        CheckInRecord {
            checkin_id: 1,
            user_identifier: "fid-999".to_string(),
            username: "satoshi".to_string(),
            pfp_url: String::new(),
            checkin_date,
            points_earned: 12,
            streak_count: 1,
        }
    }

    fn stats(current_streak: i64) -> UserStats {
        UserStats {
            user_identifier: "fid-999".to_string(),
            username: "satoshi".to_string(),
            pfp_url: String::new(),
            total_points: 36,
            current_streak,
            longest_streak: current_streak,
            last_checkin_date: 0,
            total_checkins: current_streak,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_day_start_same_day_same_bucket() {
        // Two timestamps inside the same UTC day
        let morning = 1_700_000_000_000; // 2023-11-14 22:13:20 UTC
        let later = morning + 3_600_000;
        assert_eq!(day_start(morning), day_start(later));
        assert_eq!(day_start(morning) % MS_PER_DAY, 0);
    }

    #[test]
    fn test_day_start_adjacent_days_differ() {
        let ts = 1_700_000_000_000;
        let bucket = day_start(ts);
        assert_eq!(day_start(bucket - 1), bucket - MS_PER_DAY);
        assert_eq!(day_start(bucket + MS_PER_DAY), bucket + MS_PER_DAY);
    }

    #[test]
    fn test_has_checked_in_today() {
        let now = 1_700_000_000_000;
        assert!(!has_checked_in_today(&[], now));
        assert!(has_checked_in_today(&[record(now - 1000)], now));
        // Yesterday's record does not count
        assert!(!has_checked_in_today(&[record(now - MS_PER_DAY)], now));
    }

    #[test]
    fn test_plan_rejects_second_checkin_same_day() {
        let now = 1_700_000_000_000;
        let plan = plan_checkin(Some(&stats(3)), &[record(now - 60_000)], now);
        assert_eq!(plan, CheckInPlan::AlreadyCheckedIn);
    }

    #[test]
    fn test_plan_first_time_user_starts_streak_at_one() {
        let plan = plan_checkin(None, &[], 1_700_000_000_000);
        assert_eq!(
            plan,
            CheckInPlan::Accepted(CheckInEstimate {
                new_streak: 1,
                points_earned: 12,
            })
        );
    }

    #[test]
    fn test_plan_extends_streak_and_estimates_points() {
        let plan = plan_checkin(Some(&stats(4)), &[], 1_700_000_000_000);
        assert_eq!(
            plan,
            CheckInPlan::Accepted(CheckInEstimate {
                new_streak: 5,
                points_earned: 20,
            })
        );
    }

    #[test]
    fn test_yesterdays_record_allows_today() {
        let now = 1_700_000_000_000;
        let plan = plan_checkin(Some(&stats(1)), &[record(now - MS_PER_DAY)], now);
        assert!(matches!(plan, CheckInPlan::Accepted(_)));
    }
}
