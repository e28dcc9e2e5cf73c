use crate::errors::AppError;
use crate::models::{
    DailyStats, DateQuery, Habit, HabitBreakdown, HabitLog, HabitSession, LogTimeRequest,
    NewHabitRequest, NewTaskRequest, PeriodQuery, StartSessionRequest, Task, TotalTimeResponse,
    UpdateHabitRequest, WeekdayBreakdown,
};
use crate::seed::seed_owner;
use crate::state::AppState;
use crate::stats::{
    build_daily_stats, period_breakdown, today, total_time_tracked, weekly_breakdown,
};
use crate::storage::{self, persist_data};
use crate::ticker::Ticker;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

// Range a single manual log entry is allowed to cover; the engine itself
// does not enforce this.
const MIN_LOG_MINUTES: i64 = 1;
const MAX_LOG_MINUTES: i64 = 480;

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub seeded: bool,
}

fn owner_from(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("x-owner-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|owner| !owner.is_empty())
        .map(String::from)
        .ok_or_else(AppError::unauthenticated)
}

pub async fn list_habits(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Habit>>, AppError> {
    let owner = owner_from(&headers)?;
    let data = state.data.lock().await;
    Ok(Json(storage::active_habits(&data, &owner)))
}

pub async fn create_habit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NewHabitRequest>,
) -> Result<Json<Habit>, AppError> {
    let owner = owner_from(&headers)?;
    if request.name.trim().is_empty() {
        return Err(AppError::bad_request("habit name must not be empty"));
    }
    if request.target_minutes.is_some_and(|target| target < 0) {
        return Err(AppError::bad_request("target duration must not be negative"));
    }

    let mut data = state.data.lock().await;
    let habit = storage::create_habit(&mut data, &owner, request);
    persist_data(&state.data_path, &data).await?;
    Ok(Json(habit))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(updates): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, AppError> {
    let owner = owner_from(&headers)?;
    if updates
        .name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(AppError::bad_request("habit name must not be empty"));
    }
    if updates.target_minutes.is_some_and(|target| target < 0) {
        return Err(AppError::bad_request("target duration must not be negative"));
    }

    let mut data = state.data.lock().await;
    let habit = storage::update_habit(&mut data, &owner, id, updates)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let owner = owner_from(&headers)?;
    let removed = {
        let mut data = state.data.lock().await;
        let removed = storage::delete_habit(&mut data, &owner, id)?;
        persist_data(&state.data_path, &data).await?;
        removed
    };
    cancel_tickers(&state, &removed).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<HabitLog>>, AppError> {
    let owner = owner_from(&headers)?;
    let data = state.data.lock().await;
    Ok(Json(storage::list_logs(&data, &owner, query.date)))
}

pub async fn log_time(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LogTimeRequest>,
) -> Result<Json<HabitLog>, AppError> {
    let owner = owner_from(&headers)?;
    if !(MIN_LOG_MINUTES..=MAX_LOG_MINUTES).contains(&request.duration_minutes) {
        return Err(AppError::bad_request(format!(
            "duration must be between {MIN_LOG_MINUTES} and {MAX_LOG_MINUTES} minutes"
        )));
    }

    let mut data = state.data.lock().await;
    let log = storage::upsert_log(
        &mut data,
        &owner,
        request.habit_id,
        today(),
        request.duration_minutes,
        request.notes.as_deref().unwrap_or(""),
    )?;
    persist_data(&state.data_path, &data).await?;
    Ok(Json(log))
}

pub async fn active_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<HabitSession>>, AppError> {
    let owner = owner_from(&headers)?;
    let data = state.data.lock().await;
    Ok(Json(storage::active_sessions(&data, &owner)))
}

pub async fn start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<HabitSession>, AppError> {
    let owner = owner_from(&headers)?;
    let (session, ended) = {
        let mut data = state.data.lock().await;
        let started = storage::start_session(&mut data, &owner, request.habit_id)?;
        persist_data(&state.data_path, &data).await?;
        started
    };
    cancel_tickers(&state, &ended).await;

    let session_id = session.id;
    let habit_id = session.habit_id;
    let ticker = Ticker::spawn(TICK_PERIOD, move |elapsed| {
        debug!(session = %session_id, habit = %habit_id, elapsed_seconds = elapsed, "session running");
    });
    state.tickers.lock().await.insert(session.id, ticker);

    Ok(Json(session))
}

pub async fn stop_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<HabitSession>, AppError> {
    let owner = owner_from(&headers)?;
    let session = {
        let mut data = state.data.lock().await;
        let session = storage::end_session(&mut data, &owner, id)?;
        persist_data(&state.data_path, &data).await?;
        session
    };
    cancel_tickers(&state, &[session.id]).await;
    Ok(Json(session))
}

pub async fn daily_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailyStats>, AppError> {
    let owner = owner_from(&headers)?;
    let date = query.date.unwrap_or_else(today);
    let data = state.data.lock().await;
    let habits = storage::active_habits(&data, &owner);
    let logs = storage::list_logs(&data, &owner, None);
    let sessions = storage::list_sessions(&data, &owner);
    Ok(Json(build_daily_stats(date, &habits, &logs, &sessions)))
}

pub async fn weekly_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WeekdayBreakdown>>, AppError> {
    let owner = owner_from(&headers)?;
    let data = state.data.lock().await;
    let habits = storage::active_habits(&data, &owner);
    let logs = storage::list_logs(&data, &owner, None);
    Ok(Json(weekly_breakdown(today(), &habits, &logs)))
}

pub async fn analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<HabitBreakdown>>, AppError> {
    let owner = owner_from(&headers)?;
    let data = state.data.lock().await;
    let habits = storage::active_habits(&data, &owner);
    let logs = storage::list_logs(&data, &owner, None);
    Ok(Json(period_breakdown(query.period, today(), &habits, &logs)))
}

pub async fn total_time(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TotalTimeResponse>, AppError> {
    let owner = owner_from(&headers)?;
    let data = state.data.lock().await;
    let logs = storage::list_logs(&data, &owner, None);
    Ok(Json(TotalTimeResponse {
        hours: total_time_tracked(&logs),
    }))
}

pub async fn clear_today(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let owner = owner_from(&headers)?;
    let removed = {
        let mut data = state.data.lock().await;
        storage::delete_logs(&mut data, &owner, Some(today()));
        let removed = storage::delete_sessions(&mut data, &owner, Some(today()));
        persist_data(&state.data_path, &data).await?;
        removed
    };
    cancel_tickers(&state, &removed).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let owner = owner_from(&headers)?;
    let removed = {
        let mut data = state.data.lock().await;
        let removed = storage::delete_owner_data(&mut data, &owner);
        persist_data(&state.data_path, &data).await?;
        removed
    };
    cancel_tickers(&state, &removed).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn seed(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SeedResponse>, AppError> {
    let owner = owner_from(&headers)?;
    let mut data = state.data.lock().await;
    let seeded = seed_owner(&mut data, &owner, today())?;
    if seeded {
        persist_data(&state.data_path, &data).await?;
    }
    Ok(Json(SeedResponse { seeded }))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<Task>>, AppError> {
    owner_from(&headers)?;
    let date = query.date.unwrap_or_else(today);
    let tasks = state.tasks.lock().await;
    Ok(Json(tasks.for_date(date)))
}

pub async fn add_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NewTaskRequest>,
) -> Result<Json<Task>, AppError> {
    owner_from(&headers)?;
    if request.text.trim().is_empty() {
        return Err(AppError::bad_request("task text must not be empty"));
    }
    let mut tasks = state.tasks.lock().await;
    let task = tasks.add(request.date, request.text.trim().to_string(), request.priority);
    Ok(Json(task))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Query(query): Query<DateQuery>,
) -> Result<Json<Task>, AppError> {
    owner_from(&headers)?;
    let date = query.date.unwrap_or_else(today);
    let mut tasks = state.tasks.lock().await;
    let task = tasks
        .toggle(date, id)
        .ok_or_else(|| AppError::not_found("task"))?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Query(query): Query<DateQuery>,
) -> Result<StatusCode, AppError> {
    owner_from(&headers)?;
    let date = query.date.unwrap_or_else(today);
    let mut tasks = state.tasks.lock().await;
    tasks
        .remove(date, id)
        .ok_or_else(|| AppError::not_found("task"))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cancel_tickers(state: &AppState, session_ids: &[Uuid]) {
    let mut tickers = state.tickers.lock().await;
    for id in session_ids {
        if let Some(ticker) = tickers.remove(id) {
            ticker.cancel();
        }
    }
}
