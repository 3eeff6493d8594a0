//! Meditation statistics
//!
//! Summarizes a user's session history for the progress page. Pure: the
//! caller passes `now`, so the same history always yields the same stats.

use chrono::{DateTime, Duration, Utc};
use lotus_common::db::MeditationSession;
use serde::Serialize;

/// Sessions per week the progress page asks users to aim for
pub const WEEKLY_GOAL: u32 = 5;

const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_sessions: u32,
    pub total_minutes: u64,
    pub current_streak: u32,
    /// Mirrors `current_streak`; runs earlier in the history are not scanned yet
    pub longest_streak: u32,
    pub weekly_goal: u32,
    pub this_week_sessions: u32,
}

/// Compute summary statistics over a session history in any order
pub fn compute_stats(sessions: &[MeditationSession], now: DateTime<Utc>) -> Stats {
    let total_sessions = sessions.len() as u32;
    let total_minutes = sessions
        .iter()
        .map(|s| u64::from(s.duration.unwrap_or(0)))
        .sum();

    let mut dates: Vec<DateTime<Utc>> = sessions.iter().map(|s| s.date).collect();
    dates.sort_by(|a, b| b.cmp(a));

    let current_streak = streak_from(&dates, now);

    let week_start = now - Duration::days(7);
    let this_week_sessions = sessions.iter().filter(|s| s.date >= week_start).count() as u32;

    Stats {
        total_sessions,
        total_minutes,
        current_streak,
        longest_streak: current_streak,
        weekly_goal: WEEKLY_GOAL,
        this_week_sessions,
    }
}

/// Walk dates (most recent first) from `now`.
///
/// A session extends the streak while its whole-day distance from the
/// previously counted session is no larger than the streak so far. The
/// first gap wider than that ends the walk.
fn streak_from(dates_desc: &[DateTime<Utc>], now: DateTime<Utc>) -> u32 {
    let mut streak: u32 = 0;
    let mut check_date = now;

    for date in dates_desc {
        let days_diff = (check_date - *date).num_milliseconds().div_euclid(MILLIS_PER_DAY);
        if days_diff <= i64::from(streak) {
            streak += 1;
            check_date = *date;
        } else {
            break;
        }
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap()
    }

    fn session_at(date: DateTime<Utc>, duration: Option<u32>) -> MeditationSession {
        MeditationSession {
            user_id: "u".to_string(),
            session_id: date.to_rfc3339(),
            date,
            duration,
            session_type: None,
            mood_before: None,
            mood_after: None,
            notes: None,
            created_at: date,
        }
    }

    fn days_ago(days: i64, duration: u32) -> MeditationSession {
        session_at(now() - Duration::days(days), Some(duration))
    }

    #[test]
    fn test_empty_history() {
        let stats = compute_stats(&[], now());
        assert_eq!(
            stats,
            Stats {
                total_sessions: 0,
                total_minutes: 0,
                current_streak: 0,
                longest_streak: 0,
                weekly_goal: 5,
                this_week_sessions: 0,
            }
        );
    }

    #[test]
    fn test_today_yesterday_and_five_days_ago() {
        let sessions = vec![days_ago(5, 15), days_ago(0, 10), days_ago(1, 20)];
        let stats = compute_stats(&sessions, now());

        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_minutes, 45);
        // Gap of 4 days after yesterday exceeds the running streak of 2
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.this_week_sessions, 3);
    }

    #[test]
    fn test_gap_allowance_grows_with_streak() {
        // 0 → 1 day → 2 more days: the third gap (2) fits a streak of 2
        let sessions = vec![days_ago(0, 5), days_ago(1, 5), days_ago(3, 5), days_ago(10, 5)];
        let stats = compute_stats(&sessions, now());
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn test_stale_history_has_no_streak() {
        let sessions = vec![days_ago(2, 10), days_ago(3, 10)];
        let stats = compute_stats(&sessions, now());
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.total_minutes, 20);
    }

    #[test]
    fn test_same_day_sessions_all_count() {
        let first = now() - Duration::hours(3);
        let second = now() - Duration::hours(1);
        let sessions = vec![
            session_at(first, Some(10)),
            session_at(second, Some(10)),
            session_at(second, Some(10)),
        ];
        let stats = compute_stats(&sessions, now());
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn test_missing_duration_counts_as_zero() {
        let sessions = vec![session_at(now(), None), days_ago(0, 12)];
        let stats = compute_stats(&sessions, now());
        assert_eq!(stats.total_minutes, 12);
        assert_eq!(stats.total_sessions, 2);
    }

    #[test]
    fn test_this_week_window() {
        let sessions = vec![
            days_ago(0, 1),
            days_ago(7, 1),
            session_at(now() - Duration::days(7) - Duration::minutes(1), Some(1)),
            days_ago(30, 1),
        ];
        let stats = compute_stats(&sessions, now());
        assert_eq!(stats.this_week_sessions, 2);
    }

    #[test]
    fn test_partial_day_floors() {
        // 23 hours ago is zero whole days, so it extends an empty streak
        let sessions = vec![session_at(now() - Duration::hours(23), Some(5))];
        assert_eq!(compute_stats(&sessions, now()).current_streak, 1);

        // 25 hours ago is one whole day, which a zero streak cannot absorb
        let sessions = vec![session_at(now() - Duration::hours(25), Some(5))];
        assert_eq!(compute_stats(&sessions, now()).current_streak, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(compute_stats(&[], now())).unwrap();
        assert_eq!(json["weeklyGoal"], 5);
        assert_eq!(json["thisWeekSessions"], 0);
        assert_eq!(json["longestStreak"], 0);
    }
}
