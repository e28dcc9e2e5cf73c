use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/habits/:id",
            patch(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route("/api/logs", get(handlers::list_logs).post(handlers::log_time))
        .route("/api/sessions/active", get(handlers::active_sessions))
        .route("/api/sessions/start", post(handlers::start_session))
        .route("/api/sessions/:id/stop", post(handlers::stop_session))
        .route("/api/stats/daily", get(handlers::daily_stats))
        .route("/api/stats/weekly", get(handlers::weekly_stats))
        .route("/api/stats/analytics", get(handlers::analytics))
        .route("/api/stats/total-time", get(handlers::total_time))
        .route("/api/tasks", get(handlers::list_tasks).post(handlers::add_task))
        .route("/api/tasks/:id", delete(handlers::delete_task))
        .route("/api/tasks/:id/toggle", post(handlers::toggle_task))
        .route("/api/seed", post(handlers::seed))
        .route("/api/data/today", delete(handlers::clear_today))
        .route("/api/data", delete(handlers::clear_all))
        .with_state(state)
}
