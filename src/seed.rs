//! Deterministic starter data for a fresh owner: the six sample habits
//! and a week of plausible logs, so the dashboard has something to show.

use crate::errors::AppError;
use crate::models::{HabitCategory, NewHabitRequest};
use crate::storage::{self, StoreData};
use chrono::{Duration, NaiveDate};

const SAMPLE_HABITS: [(&str, &str, HabitCategory, i64, &str, &str); 6] = [
    (
        "Coding",
        "Daily programming and development work",
        HabitCategory::Development,
        120,
        "#F59E0B",
        "code2",
    ),
    (
        "Reading",
        "Reading books and articles",
        HabitCategory::Learning,
        60,
        "#10B981",
        "book",
    ),
    (
        "Exercise",
        "Physical fitness and workouts",
        HabitCategory::Health,
        45,
        "#3B82F6",
        "dumbbell",
    ),
    (
        "Meditation",
        "Mindfulness and meditation practice",
        HabitCategory::Wellness,
        20,
        "#8B5CF6",
        "brain",
    ),
    (
        "Writing",
        "Blog posts, journaling, and creative writing",
        HabitCategory::Creative,
        30,
        "#F43F5E",
        "book",
    ),
    (
        "Learning",
        "Online courses and skill development",
        HabitCategory::Learning,
        90,
        "#14B8A6",
        "book",
    ),
];

/// Seeds the sample habits plus a week of logs for an owner with no data.
/// Returns false (and changes nothing) when the owner already has habits.
pub fn seed_owner(data: &mut StoreData, owner: &str, today: NaiveDate) -> Result<bool, AppError> {
    if data.habits.values().any(|habit| habit.owner_id == owner) {
        return Ok(false);
    }

    let mut created = Vec::with_capacity(SAMPLE_HABITS.len());
    for (name, description, category, target, color, icon) in SAMPLE_HABITS {
        let habit = storage::create_habit(
            data,
            owner,
            NewHabitRequest {
                name: name.to_string(),
                description: Some(description.to_string()),
                category,
                target_minutes: Some(target),
                color: Some(color.to_string()),
                icon: Some(icon.to_string()),
            },
        );
        created.push(habit);
    }

    // Roughly two of every three habit-days over the past week, with
    // durations spread across 15..=120 minutes.
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        for (index, habit) in created.iter().enumerate() {
            if (offset as usize + index) % 3 == 2 {
                continue;
            }
            let minutes = 15 + ((offset * 37 + index as i64 * 23) % 106);
            let notes = format!("Sample log for {}", habit.name);
            storage::upsert_log(data, owner, habit.id, date, minutes, &notes)?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::today;
    use crate::storage::{active_habits, list_logs};

    #[test]
    fn seeds_habits_and_a_week_of_logs() {
        let mut data = StoreData::default();
        assert!(seed_owner(&mut data, "owner", today()).unwrap());

        let habits = active_habits(&data, "owner");
        assert_eq!(habits.len(), 6);

        let logs = list_logs(&data, "owner", None);
        assert!(!logs.is_empty());
        assert!(logs
            .iter()
            .all(|log| (15..=120).contains(&log.duration_minutes) && log.is_completed));
        assert!(logs.iter().all(|log| log.notes.starts_with("Sample log for ")));
    }

    #[test]
    fn seeding_twice_changes_nothing() {
        let mut data = StoreData::default();
        assert!(seed_owner(&mut data, "owner", today()).unwrap());
        let habits_before = data.habits.len();
        let logs_before = data.logs.len();

        assert!(!seed_owner(&mut data, "owner", today()).unwrap());
        assert_eq!(data.habits.len(), habits_before);
        assert_eq!(data.logs.len(), logs_before);
    }

    #[test]
    fn seeding_is_per_owner() {
        let mut data = StoreData::default();
        assert!(seed_owner(&mut data, "first", today()).unwrap());
        assert!(seed_owner(&mut data, "second", today()).unwrap());
        assert_eq!(active_habits(&data, "first").len(), 6);
        assert_eq!(active_habits(&data, "second").len(), 6);
    }
}
