use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/date/back", post(handlers::date_back))
        .route("/date/forward", post(handlers::date_forward))
        .route("/routines/:id/complete", post(handlers::complete_form))
        .route("/routines/:id/uncomplete", post(handlers::uncomplete_form))
        .route("/routines/:id/calendar", get(handlers::calendar_page))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/reload", post(handlers::reload))
        .route("/api/date", post(handlers::navigate))
        .route("/api/routines/:id/calendar", get(handlers::get_calendar))
        .route(
            "/api/entries",
            post(handlers::create_entry).delete(handlers::delete_entry),
        )
        .with_state(state)
}
