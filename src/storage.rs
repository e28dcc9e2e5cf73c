use crate::duration::minutes_from_seconds;
use crate::errors::AppError;
use crate::models::{
    Habit, HabitLog, HabitSession, HabitStatus, NewHabitRequest, UpdateHabitRequest,
};
use crate::stats::local_day;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;
use uuid::Uuid;

pub const DEFAULT_TARGET_MINUTES: i64 = 60;
pub const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    pub habits: BTreeMap<Uuid, Habit>,
    pub logs: BTreeMap<Uuid, HabitLog>,
    pub sessions: BTreeMap<Uuid, HabitSession>,
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_data(path: &Path) -> StoreData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                StoreData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            StoreData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Active habits for an owner, newest first.
pub fn active_habits(data: &StoreData, owner: &str) -> Vec<Habit> {
    let mut habits: Vec<Habit> = data
        .habits
        .values()
        .filter(|habit| habit.owner_id == owner && habit.status == HabitStatus::Active)
        .cloned()
        .collect();
    habits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    habits
}

pub fn create_habit(data: &mut StoreData, owner: &str, request: NewHabitRequest) -> Habit {
    let now = Utc::now();
    let habit = Habit {
        id: Uuid::new_v4(),
        owner_id: owner.to_string(),
        name: request.name.trim().to_string(),
        description: request.description,
        category: request.category,
        target_minutes: request.target_minutes.unwrap_or(DEFAULT_TARGET_MINUTES),
        status: HabitStatus::Active,
        color: request.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        icon: request.icon,
        created_at: now,
        updated_at: now,
    };
    data.habits.insert(habit.id, habit.clone());
    habit
}

pub fn update_habit(
    data: &mut StoreData,
    owner: &str,
    id: Uuid,
    updates: UpdateHabitRequest,
) -> Result<Habit, AppError> {
    let habit = data
        .habits
        .get_mut(&id)
        .filter(|habit| habit.owner_id == owner)
        .ok_or_else(|| AppError::not_found("habit"))?;

    if let Some(name) = updates.name {
        habit.name = name.trim().to_string();
    }
    if let Some(description) = updates.description {
        habit.description = Some(description);
    }
    if let Some(category) = updates.category {
        habit.category = category;
    }
    if let Some(target) = updates.target_minutes {
        habit.target_minutes = target;
    }
    if let Some(status) = updates.status {
        habit.status = status;
    }
    if let Some(color) = updates.color {
        habit.color = color;
    }
    if let Some(icon) = updates.icon {
        habit.icon = Some(icon);
    }
    habit.updated_at = Utc::now();
    Ok(habit.clone())
}

/// Removes the habit and everything hanging off it. Returns the ids of
/// removed sessions so callers can cancel their tickers.
pub fn delete_habit(data: &mut StoreData, owner: &str, id: Uuid) -> Result<Vec<Uuid>, AppError> {
    if !data
        .habits
        .get(&id)
        .is_some_and(|habit| habit.owner_id == owner)
    {
        return Err(AppError::not_found("habit"));
    }
    data.habits.remove(&id);
    data.logs.retain(|_, log| log.habit_id != id);

    let removed: Vec<Uuid> = data
        .sessions
        .values()
        .filter(|session| session.habit_id == id)
        .map(|session| session.id)
        .collect();
    data.sessions.retain(|_, session| session.habit_id != id);
    Ok(removed)
}

/// Logs for an owner, optionally narrowed to one day, newest first.
pub fn list_logs(data: &StoreData, owner: &str, date: Option<NaiveDate>) -> Vec<HabitLog> {
    let mut logs: Vec<HabitLog> = data
        .logs
        .values()
        .filter(|log| log.owner_id == owner && date.is_none_or(|d| log.date == d))
        .cloned()
        .collect();
    logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
    logs
}

/// Insert-or-merge keyed by (habit, owner, date), done in one step under
/// the store lock so there is no window between a failed insert and a
/// corrective update. A second log on the same day sums durations, joins
/// notes with "; ", recomputes the completion flag, and refreshes
/// `logged_at`.
pub fn upsert_log(
    data: &mut StoreData,
    owner: &str,
    habit_id: Uuid,
    date: NaiveDate,
    duration_minutes: i64,
    notes: &str,
) -> Result<HabitLog, AppError> {
    if !data
        .habits
        .get(&habit_id)
        .is_some_and(|habit| habit.owner_id == owner)
    {
        return Err(AppError::not_found("habit"));
    }

    let existing = data
        .logs
        .values_mut()
        .find(|log| log.habit_id == habit_id && log.owner_id == owner && log.date == date);

    let log = match existing {
        Some(log) => {
            log.duration_minutes += duration_minutes;
            log.notes = merge_notes(&log.notes, notes);
            log.is_completed = log.duration_minutes > 0;
            log.logged_at = Utc::now();
            log.clone()
        }
        None => {
            let log = HabitLog {
                id: Uuid::new_v4(),
                habit_id,
                owner_id: owner.to_string(),
                date,
                duration_minutes,
                notes: notes.trim().to_string(),
                is_completed: duration_minutes > 0,
                logged_at: Utc::now(),
            };
            data.logs.insert(log.id, log.clone());
            log
        }
    };
    Ok(log)
}

pub fn delete_logs(data: &mut StoreData, owner: &str, date: Option<NaiveDate>) {
    data.logs
        .retain(|_, log| log.owner_id != owner || date.is_some_and(|d| log.date != d));
}

/// Every session for an owner, most recent first.
pub fn list_sessions(data: &StoreData, owner: &str) -> Vec<HabitSession> {
    let mut sessions: Vec<HabitSession> = data
        .sessions
        .values()
        .filter(|session| session.owner_id == owner)
        .cloned()
        .collect();
    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    sessions
}

pub fn active_sessions(data: &StoreData, owner: &str) -> Vec<HabitSession> {
    data.sessions
        .values()
        .filter(|session| session.owner_id == owner && session.is_active)
        .cloned()
        .collect()
}

/// Ends any active session for the habit (stamping its end time), then
/// creates the new active one. Both happen under the same store lock, so
/// at most one active session per habit holds at any instant. Returns the
/// ids of the sessions that were implicitly ended.
pub fn start_session(
    data: &mut StoreData,
    owner: &str,
    habit_id: Uuid,
) -> Result<(HabitSession, Vec<Uuid>), AppError> {
    if !data
        .habits
        .get(&habit_id)
        .is_some_and(|habit| habit.owner_id == owner)
    {
        return Err(AppError::not_found("habit"));
    }

    let now = Utc::now();
    let mut ended = Vec::new();
    for session in data.sessions.values_mut() {
        if session.habit_id == habit_id && session.owner_id == owner && session.is_active {
            session.is_active = false;
            session.end_time = Some(now);
            ended.push(session.id);
        }
    }

    let session = HabitSession {
        id: Uuid::new_v4(),
        habit_id,
        owner_id: owner.to_string(),
        start_time: now,
        end_time: None,
        duration_minutes: None,
        is_active: true,
        notes: None,
    };
    data.sessions.insert(session.id, session.clone());
    Ok((session, ended))
}

/// Stamps the end time, records the rounded duration, and clears the
/// active flag. Never writes a log; callers log tracked time explicitly.
pub fn end_session(
    data: &mut StoreData,
    owner: &str,
    session_id: Uuid,
) -> Result<HabitSession, AppError> {
    let session = data
        .sessions
        .get_mut(&session_id)
        .filter(|session| session.owner_id == owner)
        .ok_or_else(|| AppError::not_found("session"))?;

    let end = Utc::now();
    session.end_time = Some(end);
    session.duration_minutes = Some(minutes_from_seconds((end - session.start_time).num_seconds()));
    session.is_active = false;
    Ok(session.clone())
}

/// Removes sessions, optionally only those whose start falls on the given
/// day. Returns the removed ids so callers can cancel tickers.
pub fn delete_sessions(data: &mut StoreData, owner: &str, date: Option<NaiveDate>) -> Vec<Uuid> {
    let removed: Vec<Uuid> = data
        .sessions
        .values()
        .filter(|session| {
            session.owner_id == owner && date.is_none_or(|d| local_day(session.start_time) == d)
        })
        .map(|session| session.id)
        .collect();
    for id in &removed {
        data.sessions.remove(id);
    }
    removed
}

/// Drops every habit, log, and session the owner has. Returns removed
/// session ids for ticker cleanup.
pub fn delete_owner_data(data: &mut StoreData, owner: &str) -> Vec<Uuid> {
    let removed = delete_sessions(data, owner, None);
    data.logs.retain(|_, log| log.owner_id != owner);
    data.habits.retain(|_, habit| habit.owner_id != owner);
    removed
}

fn merge_notes(existing: &str, incoming: &str) -> String {
    if existing.is_empty() {
        incoming.trim().to_string()
    } else {
        format!("{existing}; {incoming}").trim().to_string()
    }
}
