use crate::duration::format_minutes;
use crate::models::{
    DailyStats, Habit, HabitBreakdown, HabitLog, HabitSession, Period, WeekdayBreakdown,
};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

const ALL_TIME_START: (i32, u32, u32) = (2020, 1, 1);

/// Completion percentage, rounded half up and deliberately not capped at
/// 100. A habit that overshoots its target reports the true figure; only
/// gauge fills clamp (see [`progress_fill`]). A zero or missing target
/// yields 0 rather than dividing by zero.
pub fn calculate_progress(time_spent_minutes: i64, target_minutes: i64) -> i64 {
    if target_minutes <= 0 {
        return 0;
    }
    ((time_spent_minutes as f64 / target_minutes as f64) * 100.0).round() as i64
}

/// Fill fraction for a bar or ring, clamped to 0..=100 while the raw
/// percentage stays uncapped.
pub fn progress_fill(progress: i64) -> i64 {
    progress.clamp(0, 100)
}

/// The calendar day an instant belongs to. Days are server-local
/// throughout: log dates, session attribution, and clearing all use this
/// one rule.
pub fn local_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn build_daily_stats(
    date: NaiveDate,
    habits: &[Habit],
    logs: &[HabitLog],
    sessions: &[HabitSession],
) -> DailyStats {
    let day_logs: Vec<&HabitLog> = logs.iter().filter(|log| log.date == date).collect();
    let day_sessions: Vec<&HabitSession> = sessions
        .iter()
        .filter(|session| local_day(session.start_time) == date)
        .collect();

    let log_minutes: i64 = day_logs.iter().map(|log| log.duration_minutes).sum();
    let session_minutes: i64 = day_sessions
        .iter()
        .map(|session| session.duration_minutes.unwrap_or(0))
        .sum();

    // Only a persisted log's flag marks a habit completed; sessions never do.
    let completed_habits = day_logs.iter().filter(|log| log.is_completed).count();
    let total_habits = habits.len();
    let progress = calculate_progress(completed_habits as i64, total_habits as i64);

    // Logs and sessions are additive per habit: manually logged time and
    // tracked time on the same day both count.
    let mut habit_time_spent = BTreeMap::new();
    for log in &day_logs {
        *habit_time_spent.entry(log.habit_id).or_insert(0) += log.duration_minutes;
    }
    for session in &day_sessions {
        *habit_time_spent.entry(session.habit_id).or_insert(0) +=
            session.duration_minutes.unwrap_or(0);
    }

    let mut habit_streaks = BTreeMap::new();
    for habit in habits {
        let days = activity_days(habit.id, logs, sessions);
        habit_streaks.insert(habit.id, streak_length(&days, date));
    }

    let total_minutes = log_minutes + session_minutes;
    DailyStats {
        date,
        total_minutes,
        total_formatted: format_minutes(total_minutes),
        completed_habits,
        total_habits,
        progress,
        habit_time_spent,
        habit_streaks,
    }
}

/// Consecutive days of activity ending on the reference day, or on the
/// most recent active day before it when the reference day itself has
/// none.
pub fn streak_length(activity: &BTreeSet<NaiveDate>, reference: NaiveDate) -> i64 {
    let Some(&anchor) = activity.range(..=reference).next_back() else {
        return 0;
    };
    let mut streak = 0;
    let mut day = anchor;
    while activity.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }
    streak
}

fn activity_days(habit_id: Uuid, logs: &[HabitLog], sessions: &[HabitSession]) -> BTreeSet<NaiveDate> {
    let mut days = BTreeSet::new();
    for log in logs {
        if log.habit_id == habit_id && log.duration_minutes > 0 {
            days.insert(log.date);
        }
    }
    for session in sessions {
        if session.habit_id == habit_id && session.duration_minutes.unwrap_or(0) > 0 {
            days.insert(local_day(session.start_time));
        }
    }
    days
}

/// Per-habit hours for a reporting period, sorted most-tracked first, with
/// each habit's share of the period total. Only logged rows count here.
pub fn period_breakdown(
    period: Period,
    today: NaiveDate,
    habits: &[Habit],
    logs: &[HabitLog],
) -> Vec<HabitBreakdown> {
    let (start, end) = period_bounds(period, today);
    let mut entries: Vec<HabitBreakdown> = habits
        .iter()
        .map(|habit| {
            let minutes: i64 = logs
                .iter()
                .filter(|log| log.habit_id == habit.id && log.date >= start && log.date <= end)
                .map(|log| log.duration_minutes)
                .sum();
            HabitBreakdown {
                habit: habit.name.clone(),
                hours: round_hours(minutes),
                color: habit.color.clone(),
                percentage: 0,
            }
        })
        .collect();

    let total_hours: f64 = entries.iter().map(|entry| entry.hours).sum();
    if total_hours > 0.0 {
        for entry in &mut entries {
            entry.percentage = ((entry.hours / total_hours) * 100.0).round() as i64;
        }
    }

    entries.sort_by(|a, b| b.hours.partial_cmp(&a.hours).unwrap_or(std::cmp::Ordering::Equal));
    entries
}

pub fn period_bounds(period: Period, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        Period::ThisWeek => (week_start(today), today),
        Period::LastWeek => {
            let start = week_start(today) - Duration::weeks(1);
            (start, start + Duration::days(6))
        }
        Period::LastMonth => {
            let end = today.with_day(1).unwrap_or(today) - Duration::days(1);
            (end.with_day(1).unwrap_or(end), end)
        }
        Period::AllTime => {
            let (year, month, day) = ALL_TIME_START;
            (
                NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN),
                today,
            )
        }
    }
}

/// Completion counts and hours for each day of the current week.
pub fn weekly_breakdown(
    today: NaiveDate,
    habits: &[Habit],
    logs: &[HabitLog],
) -> Vec<WeekdayBreakdown> {
    let start = week_start(today);
    let total = habits.len();
    let mut days = Vec::with_capacity(7);
    for offset in 0..7 {
        let date = start + Duration::days(offset);
        let minutes: i64 = logs
            .iter()
            .filter(|log| log.date == date)
            .map(|log| log.duration_minutes)
            .sum();
        let completed = logs
            .iter()
            .filter(|log| log.date == date && log.is_completed)
            .count();
        days.push(WeekdayBreakdown {
            day: date.format("%a").to_string(),
            date,
            completed,
            total,
            hours: round_hours(minutes),
        });
    }
    days
}

/// All-time tracked hours across every log.
pub fn total_time_tracked(logs: &[HabitLog]) -> f64 {
    round_hours(logs.iter().map(|log| log.duration_minutes).sum())
}

// Weeks run Sunday through Saturday.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn round_hours(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HabitCategory, HabitStatus};

    fn habit(name: &str, target: i64) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            owner_id: "owner".to_string(),
            name: name.to_string(),
            description: None,
            category: HabitCategory::Other,
            target_minutes: target,
            status: HabitStatus::Active,
            color: "#3B82F6".to_string(),
            icon: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn log(habit_id: Uuid, date: NaiveDate, minutes: i64, completed: bool) -> HabitLog {
        HabitLog {
            id: Uuid::new_v4(),
            habit_id,
            owner_id: "owner".to_string(),
            date,
            duration_minutes: minutes,
            notes: String::new(),
            is_completed: completed,
            logged_at: Utc::now(),
        }
    }

    fn session(habit_id: Uuid, start: DateTime<Utc>, minutes: Option<i64>) -> HabitSession {
        HabitSession {
            id: Uuid::new_v4(),
            habit_id,
            owner_id: "owner".to_string(),
            start_time: start,
            end_time: None,
            duration_minutes: minutes,
            is_active: minutes.is_none(),
            notes: None,
        }
    }

    fn day(year: i32, month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, d).unwrap()
    }

    #[test]
    fn progress_is_uncapped() {
        assert_eq!(calculate_progress(150, 100), 150);
        assert_eq!(calculate_progress(50, 100), 50);
        assert_eq!(calculate_progress(1, 3), 33);
        assert_eq!(calculate_progress(2, 3), 67);
    }

    #[test]
    fn progress_with_no_target_is_zero() {
        assert_eq!(calculate_progress(90, 0), 0);
        assert_eq!(calculate_progress(90, -5), 0);
    }

    #[test]
    fn fill_clamps_while_raw_does_not() {
        assert_eq!(progress_fill(150), 100);
        assert_eq!(progress_fill(85), 85);
        assert_eq!(progress_fill(-1), 0);
    }

    #[test]
    fn daily_stats_sums_logs_and_sessions() {
        let habit_a = habit("Coding", 120);
        let habit_b = habit("Reading", 60);
        let habits = vec![habit_a.clone(), habit_b.clone()];
        let date = today();

        let logs = vec![
            log(habit_a.id, date, 30, true),
            log(habit_b.id, date, 0, false),
        ];
        let sessions = vec![session(habit_a.id, Utc::now(), Some(15))];

        let stats = build_daily_stats(date, &habits, &logs, &sessions);
        assert_eq!(stats.total_minutes, 45);
        assert_eq!(stats.total_formatted, "45m");
        assert_eq!(stats.completed_habits, 1);
        assert_eq!(stats.total_habits, 2);
        assert_eq!(stats.progress, 50);
        assert_eq!(stats.habit_time_spent.get(&habit_a.id), Some(&45));
        assert_eq!(stats.habit_time_spent.get(&habit_b.id), Some(&0));
    }

    #[test]
    fn daily_stats_ignores_other_days_and_null_durations() {
        let tracked = habit("Coding", 120);
        let habits = vec![tracked.clone()];
        let date = today();
        let now = Utc::now();

        let logs = vec![log(tracked.id, date - Duration::days(1), 45, true)];
        // Active session, no duration yet: contributes nothing.
        let sessions = vec![session(tracked.id, now, None)];

        let stats = build_daily_stats(date, &habits, &logs, &sessions);
        assert_eq!(stats.total_minutes, 0);
        assert_eq!(stats.completed_habits, 0);
        assert_eq!(stats.habit_time_spent.get(&tracked.id), Some(&0));
    }

    #[test]
    fn daily_stats_with_no_habits_has_zero_progress() {
        let stats = build_daily_stats(today(), &[], &[], &[]);
        assert_eq!(stats.total_habits, 0);
        assert_eq!(stats.progress, 0);
        assert!(stats.habit_time_spent.is_empty());
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let reference = day(2026, 8, 4);
        let activity: BTreeSet<NaiveDate> = [
            day(2026, 8, 4),
            day(2026, 8, 3),
            day(2026, 8, 2),
            day(2026, 7, 30),
        ]
        .into_iter()
        .collect();
        assert_eq!(streak_length(&activity, reference), 3);
    }

    #[test]
    fn streak_anchors_on_most_recent_active_day() {
        let reference = day(2026, 8, 4);
        let activity: BTreeSet<NaiveDate> =
            [day(2026, 8, 1), day(2026, 7, 31)].into_iter().collect();
        assert_eq!(streak_length(&activity, reference), 2);
    }

    #[test]
    fn streak_ignores_future_days_and_empty_history() {
        let reference = day(2026, 8, 4);
        let future: BTreeSet<NaiveDate> = [day(2026, 8, 10)].into_iter().collect();
        assert_eq!(streak_length(&future, reference), 0);
        assert_eq!(streak_length(&BTreeSet::new(), reference), 0);
    }

    #[test]
    fn streaks_are_deterministic_per_habit() {
        let tracked = habit("Coding", 120);
        let habits = vec![tracked.clone()];
        let date = today();
        let logs = vec![
            log(tracked.id, date, 30, true),
            log(tracked.id, date - Duration::days(1), 30, true),
        ];

        let first = build_daily_stats(date, &habits, &logs, &[]);
        let second = build_daily_stats(date, &habits, &logs, &[]);
        assert_eq!(first.habit_streaks.get(&tracked.id), Some(&2));
        assert_eq!(first.habit_streaks, second.habit_streaks);
    }

    #[test]
    fn period_bounds_for_weeks_and_month() {
        // 2026-08-04 is a Tuesday; the Sunday-based week starts 08-02.
        let reference = day(2026, 8, 4);
        assert_eq!(
            period_bounds(Period::ThisWeek, reference),
            (day(2026, 8, 2), reference)
        );
        assert_eq!(
            period_bounds(Period::LastWeek, reference),
            (day(2026, 7, 26), day(2026, 8, 1))
        );
        assert_eq!(
            period_bounds(Period::LastMonth, reference),
            (day(2026, 7, 1), day(2026, 7, 31))
        );
    }

    #[test]
    fn period_breakdown_sorts_and_computes_shares() {
        let habit_a = habit("Coding", 120);
        let habit_b = habit("Reading", 60);
        let habits = vec![habit_a.clone(), habit_b.clone()];
        let reference = day(2026, 8, 4);

        let logs = vec![
            log(habit_a.id, day(2026, 8, 3), 30, true),
            log(habit_b.id, day(2026, 8, 2), 90, true),
            // Outside this week, must not count.
            log(habit_a.id, day(2026, 7, 20), 600, true),
        ];

        let breakdown = period_breakdown(Period::ThisWeek, reference, &habits, &logs);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].habit, "Reading");
        assert_eq!(breakdown[0].hours, 1.5);
        assert_eq!(breakdown[0].percentage, 75);
        assert_eq!(breakdown[1].hours, 0.5);
        assert_eq!(breakdown[1].percentage, 25);
    }

    #[test]
    fn weekly_breakdown_covers_each_day() {
        let tracked = habit("Coding", 120);
        let habits = vec![tracked.clone()];
        let reference = day(2026, 8, 4);
        let logs = vec![log(tracked.id, day(2026, 8, 3), 90, true)];

        let week = weekly_breakdown(reference, &habits, &logs);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day(2026, 8, 2));
        assert_eq!(week[0].day, "Sun");
        let monday = &week[1];
        assert_eq!(monday.completed, 1);
        assert_eq!(monday.total, 1);
        assert_eq!(monday.hours, 1.5);
    }

    #[test]
    fn total_time_is_rounded_hours() {
        let tracked = habit("Coding", 120);
        let logs = vec![
            log(tracked.id, day(2026, 8, 1), 90, true),
            log(tracked.id, day(2026, 8, 2), 45, true),
        ];
        assert_eq!(total_time_tracked(&logs), 2.3);
    }
}
