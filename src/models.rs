use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    Development,
    Learning,
    Health,
    Wellness,
    Productivity,
    Creative,
    Social,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    Active,
    Paused,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: HabitCategory,
    pub target_minutes: i64,
    pub status: HabitStatus,
    pub color: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row per (habit, owner, date); the storage upsert merges repeats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitLog {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub owner_id: String,
    pub date: NaiveDate,
    pub duration_minutes: i64,
    pub notes: String,
    pub is_completed: bool,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitSession {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub owner_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub is_active: bool,
    pub notes: Option<String>,
}

/// Variants are declared low to high so the derived order matches urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Calendar task. Held in process memory only, never written to the data file.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub priority: TaskPriority,
    pub date: NaiveDate,
}

/// Read-time aggregation for one calendar day. `habit_time_spent` is keyed
/// by the habits with a log or session row that day; `habit_streaks` covers
/// every active habit.
#[derive(Debug, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_minutes: i64,
    pub total_formatted: String,
    pub completed_habits: usize,
    pub total_habits: usize,
    pub progress: i64,
    pub habit_time_spent: BTreeMap<Uuid, i64>,
    pub habit_streaks: BTreeMap<Uuid, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    ThisWeek,
    LastWeek,
    LastMonth,
    AllTime,
}

/// One habit's share of a reporting period, hours rounded to a tenth.
#[derive(Debug, Serialize)]
pub struct HabitBreakdown {
    pub habit: String,
    pub hours: f64,
    pub color: String,
    pub percentage: i64,
}

#[derive(Debug, Serialize)]
pub struct WeekdayBreakdown {
    pub day: String,
    pub date: NaiveDate,
    pub completed: usize,
    pub total: usize,
    pub hours: f64,
}

#[derive(Debug, Serialize)]
pub struct TotalTimeResponse {
    pub hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct NewHabitRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: HabitCategory,
    #[serde(default)]
    pub target_minutes: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<HabitCategory>,
    #[serde(default)]
    pub target_minutes: Option<i64>,
    #[serde(default)]
    pub status: Option<HabitStatus>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogTimeRequest {
    pub habit_id: Uuid,
    pub duration_minutes: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub habit_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct NewTaskRequest {
    pub text: String,
    pub date: NaiveDate,
    pub priority: TaskPriority,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Period,
}
