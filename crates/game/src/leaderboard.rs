//! Weekly check-in leaderboard: a full recompute over cached rows. Table
//! sizes are bounded by realistic check-in volume for a single game, so no
//! incremental maintenance is attempted.

use crate::checkin::MS_PER_DAY;
use crate::model::{CheckInRecord, LeaderboardEntry, UserStats};
use std::collections::HashMap;

/// Rank users by check-ins within the trailing window, ties broken by total
/// points. Users without a stats row keep streak/points at zero.
pub fn weekly_leaderboard(
    checkins: &[CheckInRecord],
    stats: &[UserStats],
    window_days: u32,
    now_ms: i64,
    top_n: usize,
) -> Vec<LeaderboardEntry> {
    let cutoff = now_ms - i64::from(window_days) * MS_PER_DAY;

    let mut by_user: HashMap<&str, LeaderboardEntry> = HashMap::new();
    for record in checkins {
        if record.checkin_date < cutoff {
            continue;
        }
        by_user
            .entry(record.user_identifier.as_str())
            .and_modify(|e| e.weekly_checkins += 1)
            .or_insert_with(|| LeaderboardEntry {
                user_identifier: record.user_identifier.clone(),
                username: record.username.clone(),
                pfp_url: record.pfp_url.clone(),
                weekly_checkins: 1,
                current_streak: 0,
                total_points: 0,
            });
    }

    for stat in stats {
        if let Some(entry) = by_user.get_mut(stat.user_identifier.as_str()) {
            entry.current_streak = stat.current_streak;
            entry.total_points = stat.total_points;
        }
    }

    let mut entries: Vec<LeaderboardEntry> = by_user.into_values().collect();
    entries.sort_by(|a, b| {
        b.weekly_checkins
            .cmp(&a.weekly_checkins)
            .then(b.total_points.cmp(&a.total_points))
    });
    entries.truncate(top_n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn record(user: &str, days_ago: i64) -> CheckInRecord {
        CheckInRecord {
            checkin_id: 0,
            user_identifier: user.to_string(),
            username: user.to_string(),
            pfp_url: String::new(),
            checkin_date: NOW - days_ago * MS_PER_DAY,
            points_earned: 12,
            streak_count: 1,
        }
    }

    fn stat(user: &str, streak: i64, points: i64) -> UserStats {
        UserStats {
            user_identifier: user.to_string(),
            username: user.to_string(),
            pfp_url: String::new(),
            total_points: points,
            current_streak: streak,
            longest_streak: streak,
            last_checkin_date: NOW,
            total_checkins: 10,
            created_at: 0,
            updated_at: NOW,
        }
    }

    #[test]
    fn test_window_excludes_old_records() {
        let checkins = vec![
            record("fid-1", 8), // outside 7-day window
            record("fid-1", 6), // inside
        ];
        let board = weekly_leaderboard(&checkins, &[], 7, NOW, 10);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].weekly_checkins, 1);
    }

    #[test]
    fn test_groups_and_counts_per_user() {
        let checkins = vec![
            record("fid-1", 0),
            record("fid-1", 1),
            record("fid-1", 2),
            record("fid-2", 0),
        ];
        let board = weekly_leaderboard(&checkins, &[], 7, NOW, 10);
        assert_eq!(board[0].user_identifier, "fid-1");
        assert_eq!(board[0].weekly_checkins, 3);
        assert_eq!(board[1].weekly_checkins, 1);
    }

    #[test]
    fn test_joins_stats_and_defaults_to_zero() {
        let checkins = vec![record("fid-1", 0), record("fid-2", 0)];
        let stats = vec![stat("fid-1", 5, 120)];
        let board = weekly_leaderboard(&checkins, &stats, 7, NOW, 10);
        let with_stats = board.iter().find(|e| e.user_identifier == "fid-1").unwrap();
        let without = board.iter().find(|e| e.user_identifier == "fid-2").unwrap();
        assert_eq!(with_stats.current_streak, 5);
        assert_eq!(with_stats.total_points, 120);
        assert_eq!(without.current_streak, 0);
        assert_eq!(without.total_points, 0);
    }

    #[test]
    fn test_ties_break_on_total_points() {
        let checkins = vec![record("fid-1", 0), record("fid-2", 0)];
        let stats = vec![stat("fid-1", 1, 50), stat("fid-2", 1, 200)];
        let board = weekly_leaderboard(&checkins, &stats, 7, NOW, 10);
        assert_eq!(board[0].user_identifier, "fid-2");
    }

    #[test]
    fn test_truncates_to_top_n() {
        let mut checkins = Vec::new();
        for fid in 0..25 {
            let user = format!("fid-{fid}");
            for day in 0..=(fid % 7) {
                checkins.push(record(&user, i64::from(day)));
            }
        }
        let board = weekly_leaderboard(&checkins, &[], 7, NOW, 10);
        assert_eq!(board.len(), 10);
        for pair in board.windows(2) {
            assert!(
                pair[0].weekly_checkins > pair[1].weekly_checkins
                    || (pair[0].weekly_checkins == pair[1].weekly_checkins
                        && pair[0].total_points >= pair[1].total_points)
            );
        }
    }

    #[test]
    fn test_empty_inputs_give_empty_board() {
        assert!(weekly_leaderboard(&[], &[], 7, NOW, 10).is_empty());
        // Stats without any check-ins in the window do not create entries
        assert!(weekly_leaderboard(&[], &[stat("fid-1", 5, 100)], 7, NOW, 10).is_empty());
    }
}
