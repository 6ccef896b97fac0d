use crate::calendar::{CalendarView, YearMonth};
use crate::errors::{AppError, ClientError};
use crate::models::{EntryPayload, RoutineId};
use crate::mutator::MutationOutcome;
use crate::state::AppState;
use crate::ui::{render_calendar, render_index};
use crate::view::DashboardView;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct CompleteForm {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateRequest {
    pub direction: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    pub routine_id: RoutineId,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryQuery {
    pub routine_id: RoutineId,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    #[serde(default)]
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DateResponse {
    pub moved: bool,
    pub view: DashboardView,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub outcome: MutationOutcome,
    pub message: &'static str,
    pub view: DashboardView,
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    absorb(&state, state.dashboard.roll_over(today()).await)?;
    let view = state.dashboard.view().await;
    Ok(Html(render_index(&view)))
}

pub async fn date_back(State(state): State<AppState>) -> Result<Redirect, AppError> {
    absorb(&state, state.dashboard.go_back().await)?;
    Ok(Redirect::to("/"))
}

pub async fn date_forward(State(state): State<AppState>) -> Result<Redirect, AppError> {
    absorb(&state, state.dashboard.go_forward().await)?;
    Ok(Redirect::to("/"))
}

pub async fn complete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CompleteForm>,
) -> Result<Redirect, AppError> {
    let payload = EntryPayload {
        value: parse_value(form.value.as_deref())?,
        notes: form.notes,
    };
    absorb(&state, state.dashboard.complete(&RoutineId::new(id), payload).await)?;
    Ok(Redirect::to("/"))
}

pub async fn uncomplete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    absorb(&state, state.dashboard.uncomplete(&RoutineId::new(id)).await)?;
    Ok(Redirect::to("/"))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardView>, AppError> {
    absorb(&state, state.dashboard.roll_over(today()).await)?;
    Ok(Json(state.dashboard.view().await))
}

pub async fn reload(State(state): State<AppState>) -> Result<Json<DashboardView>, AppError> {
    absorb(&state, state.dashboard.reload().await)?;
    Ok(Json(state.dashboard.view().await))
}

pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<DateRequest>,
) -> Result<Json<DateResponse>, AppError> {
    let moved = match payload.direction.trim() {
        "back" => absorb(&state, state.dashboard.go_back().await)?,
        "forward" => absorb(&state, state.dashboard.go_forward().await)?,
        _ => return Err(AppError::bad_request("direction must be 'back' or 'forward'")),
    };

    Ok(Json(DateResponse {
        moved: moved.unwrap_or(false),
        view: state.dashboard.view().await,
    }))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<EntryRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let entry = EntryPayload {
        value: payload.value,
        notes: payload.notes,
    };
    let outcome = state
        .dashboard
        .complete(&payload.routine_id, entry)
        .await
        .map_err(|err| AppError::from_client(err, &state.login_url))?;
    Ok(Json(mutation_response(&state, outcome).await))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<MutationResponse>, AppError> {
    let outcome = state
        .dashboard
        .uncomplete(&query.routine_id)
        .await
        .map_err(|err| AppError::from_client(err, &state.login_url))?;
    Ok(Json(mutation_response(&state, outcome).await))
}

pub async fn calendar_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Html<String>, AppError> {
    let view = load_calendar(&state, id, query).await?;
    Ok(Html(render_calendar(&view)))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarView>, AppError> {
    Ok(Json(load_calendar(&state, id, query).await?))
}

async fn load_calendar(
    state: &AppState,
    id: String,
    query: CalendarQuery,
) -> Result<CalendarView, AppError> {
    let month = parse_month(query.month.as_deref())?;
    state
        .dashboard
        .calendar(&RoutineId::new(id), month)
        .await
        .map_err(|err| {
            warn!(%err, "calendar unavailable");
            match err {
                ClientError::NotFound(message) => AppError::not_found(message),
                err => AppError::from_client(err, &state.login_url),
            }
        })
}

async fn mutation_response(state: &AppState, outcome: MutationOutcome) -> MutationResponse {
    MutationResponse {
        outcome,
        message: outcome.message(),
        view: state.dashboard.view().await,
    }
}

/// Passes an expired session up as a login redirect; every other failure is
/// already reflected in the dashboard view.
fn absorb<T>(state: &AppState, result: Result<T, ClientError>) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_auth_expired() => Err(AppError::from_client(err, &state.login_url)),
        Err(err) => {
            warn!(%err, "dashboard action failed");
            Ok(None)
        }
    }
}

fn parse_value(raw: Option<&str>) -> Result<Option<i64>, AppError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::bad_request("value must be a whole number")),
        None => Ok(None),
    }
}

fn parse_month(raw: Option<&str>) -> Result<Option<YearMonth>, AppError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw
            .parse::<YearMonth>()
            .map(Some)
            .map_err(|err| AppError::bad_request(err.to_string())),
        None => Ok(None),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_value_parsing() {
        assert_eq!(parse_value(None).unwrap(), None);
        assert_eq!(parse_value(Some("  ")).unwrap(), None);
        assert_eq!(parse_value(Some("12")).unwrap(), Some(12));
        assert!(parse_value(Some("1.5")).is_err());
    }

    #[test]
    fn month_query_parsing() {
        assert_eq!(parse_month(None).unwrap(), None);
        assert_eq!(
            parse_month(Some("2024-03")).unwrap().map(|month| month.to_string()),
            Some("2024-03".to_string())
        );
        assert_eq!(parse_month(Some("03/2024")).unwrap_err().status, axum::http::StatusCode::BAD_REQUEST);
    }
}
