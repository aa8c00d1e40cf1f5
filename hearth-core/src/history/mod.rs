//! Task history transitions and the leaderboard aggregator.
//!
//! History is append-only: records are created on assignment and move through
//! `assigned -> completed -> reviewed` by field update. Insertion order is
//! preserved for replay and debugging.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{Error, Result};
use crate::types::{LeaderboardEntry, TaskEvent, TaskStatus};

/// Append a new `assigned` record to the history.
pub fn assign(
    history: &mut Vec<TaskEvent>,
    task_id: impl Into<String>,
    task_name: impl Into<String>,
    user: impl Into<String>,
    reviewer: Option<String>,
    now: DateTime<Utc>,
) {
    history.push(TaskEvent {
        task_id: task_id.into(),
        task_name: task_name.into(),
        user: user.into(),
        reviewer,
        status: TaskStatus::Assigned,
        assigned_at: now,
        completed_at: None,
        reviewed_at: None,
        on_time: false,
        efficiency_score: 0.0,
    });
}

/// Move the matching `assigned` record for `(task_id, user)` to `completed`.
///
/// `expected` is the stage's expected duration, when one is configured: a
/// completion within it is on time, and the efficiency score is the ratio of
/// expected to actual time capped at 1.0. Without an expectation the
/// completion counts as on time with full efficiency.
///
/// Returns `TaskNotFound` (history untouched) when no record matches.
pub fn complete(
    history: &mut [TaskEvent],
    task_id: &str,
    user: &str,
    now: DateTime<Utc>,
    expected: Option<TimeDelta>,
) -> Result<TaskEvent> {
    let event = history
        .iter_mut()
        .find(|ev| ev.task_id == task_id && ev.user == user && ev.status == TaskStatus::Assigned)
        .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

    event.status = TaskStatus::Completed;
    event.completed_at = Some(now);
    match expected {
        Some(expected) => {
            let actual = now - event.assigned_at;
            event.on_time = actual <= expected;
            let expected_secs = expected.num_seconds().max(1) as f64;
            let actual_secs = actual.num_seconds().max(1) as f64;
            event.efficiency_score = (expected_secs / actual_secs).min(1.0);
        }
        None => {
            event.on_time = true;
            event.efficiency_score = 1.0;
        }
    }
    Ok(event.clone())
}

/// Move the matching `completed` record for `(task_id, reviewer)` to
/// `reviewed`. Returns `ReviewNotFound` (history untouched) when no record
/// matches.
pub fn review(
    history: &mut [TaskEvent],
    task_id: &str,
    reviewer: &str,
    now: DateTime<Utc>,
) -> Result<TaskEvent> {
    let event = history
        .iter_mut()
        .find(|ev| {
            ev.task_id == task_id
                && ev.reviewer.as_deref() == Some(reviewer)
                && ev.status == TaskStatus::Completed
        })
        .ok_or_else(|| Error::ReviewNotFound(task_id.to_string()))?;

    event.status = TaskStatus::Reviewed;
    event.reviewed_at = Some(now);
    Ok(event.clone())
}

/// Derive the leaderboard from the history.
///
/// Pure and deterministic: groups by user, counts completed/reviewed events,
/// averages efficiency across them (zero counts leave the average at zero),
/// counts on-time completions, and sorts by descending average efficiency
/// with ties broken by user id.
pub fn leaderboard(history: &[TaskEvent]) -> Vec<LeaderboardEntry> {
    let mut stats: HashMap<&str, LeaderboardEntry> = HashMap::new();
    for event in history {
        let entry = stats
            .entry(event.user.as_str())
            .or_insert_with(|| LeaderboardEntry {
                user: event.user.clone(),
                completed: 0,
                avg_efficiency: 0.0,
                on_time: 0,
            });
        if matches!(event.status, TaskStatus::Completed | TaskStatus::Reviewed) {
            entry.completed += 1;
            entry.avg_efficiency += event.efficiency_score;
            if event.on_time {
                entry.on_time += 1;
            }
        }
    }

    let mut entries: Vec<LeaderboardEntry> = stats
        .into_values()
        .map(|mut e| {
            if e.completed > 0 {
                e.avg_efficiency /= e.completed as f64;
            }
            e
        })
        .collect();

    entries.sort_by(|a, b| {
        b.avg_efficiency
            .partial_cmp(&a.avg_efficiency)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.user.cmp(&b.user))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn assigned(task_id: &str, user: &str) -> TaskEvent {
        TaskEvent {
            task_id: task_id.to_string(),
            task_name: task_id.to_string(),
            user: user.to_string(),
            reviewer: None,
            status: TaskStatus::Assigned,
            assigned_at: ts(0),
            completed_at: None,
            reviewed_at: None,
            on_time: false,
            efficiency_score: 0.0,
        }
    }

    fn finished(user: &str, efficiency: f64, on_time: bool) -> TaskEvent {
        TaskEvent {
            status: TaskStatus::Completed,
            completed_at: Some(ts(60)),
            on_time,
            efficiency_score: efficiency,
            ..assigned("t", user)
        }
    }

    #[test]
    fn test_complete_transitions_record() {
        let mut history = vec![assigned("t1", "alice")];
        let event = complete(&mut history, "t1", "alice", ts(60), None).unwrap();
        assert_eq!(event.status, TaskStatus::Completed);
        assert_eq!(event.completed_at, Some(ts(60)));
        assert!(event.on_time);
        assert_eq!(event.efficiency_score, 1.0);
        assert_eq!(history[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_complete_not_found_leaves_history_unchanged() {
        let mut history = vec![assigned("t1", "bob")];
        let before = history.clone();
        let err = complete(&mut history, "t1", "alice", ts(60), None).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(_)));
        assert_eq!(history, before);
    }

    #[test]
    fn test_complete_already_completed_is_not_found() {
        let mut history = vec![assigned("t1", "alice")];
        complete(&mut history, "t1", "alice", ts(60), None).unwrap();
        let err = complete(&mut history, "t1", "alice", ts(90), None).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(_)));
    }

    #[test]
    fn test_complete_on_time_and_efficiency_from_expectation() {
        let mut history = vec![assigned("t1", "alice")];
        let event = complete(
            &mut history,
            "t1",
            "alice",
            ts(120),
            Some(TimeDelta::seconds(240)),
        )
        .unwrap();
        assert!(event.on_time);
        assert_eq!(event.efficiency_score, 1.0); // faster than expected, capped

        let mut history = vec![assigned("t2", "alice")];
        let event = complete(
            &mut history,
            "t2",
            "alice",
            ts(480),
            Some(TimeDelta::seconds(240)),
        )
        .unwrap();
        assert!(!event.on_time);
        assert_eq!(event.efficiency_score, 0.5);
    }

    #[test]
    fn test_review_transitions_record() {
        let mut history = vec![TaskEvent {
            reviewer: Some("carol".to_string()),
            ..assigned("t1", "alice")
        }];
        complete(&mut history, "t1", "alice", ts(60), None).unwrap();
        let event = review(&mut history, "t1", "carol", ts(120)).unwrap();
        assert_eq!(event.status, TaskStatus::Reviewed);
        assert_eq!(event.reviewed_at, Some(ts(120)));
    }

    #[test]
    fn test_review_not_found_when_not_completed() {
        let mut history = vec![TaskEvent {
            reviewer: Some("carol".to_string()),
            ..assigned("t1", "alice")
        }];
        let before = history.clone();
        let err = review(&mut history, "t1", "carol", ts(120)).unwrap_err();
        assert!(matches!(err, Error::ReviewNotFound(_)));
        assert_eq!(history, before);
    }

    #[test]
    fn test_review_not_found_for_wrong_reviewer() {
        let mut history = vec![TaskEvent {
            reviewer: Some("carol".to_string()),
            ..assigned("t1", "alice")
        }];
        complete(&mut history, "t1", "alice", ts(60), None).unwrap();
        let err = review(&mut history, "t1", "dave", ts(120)).unwrap_err();
        assert!(matches!(err, Error::ReviewNotFound(_)));
    }

    #[test]
    fn test_leaderboard_aggregates_finished_events_only() {
        let history = vec![
            finished("a", 0.8, true),
            finished("a", 0.6, false),
            assigned("t3", "b"),
        ];
        let entries = leaderboard(&history);
        assert_eq!(entries.len(), 2);

        let a = entries.iter().find(|e| e.user == "a").unwrap();
        assert_eq!(a.completed, 2);
        assert!((a.avg_efficiency - 0.7).abs() < 1e-9);
        assert_eq!(a.on_time, 1);

        let b = entries.iter().find(|e| e.user == "b").unwrap();
        assert_eq!(b.completed, 0);
        assert_eq!(b.avg_efficiency, 0.0);
        assert_eq!(b.on_time, 0);
    }

    #[test]
    fn test_leaderboard_sorted_descending_with_stable_ties() {
        let history = vec![
            finished("zoe", 0.5, true),
            finished("amy", 0.5, true),
            finished("mia", 0.9, true),
        ];
        let entries = leaderboard(&history);
        assert_eq!(entries[0].user, "mia");
        // Equal efficiency ties break by user id for determinism.
        assert_eq!(entries[1].user, "amy");
        assert_eq!(entries[2].user, "zoe");
    }

    #[test]
    fn test_leaderboard_empty_history() {
        assert!(leaderboard(&[]).is_empty());
    }
}
