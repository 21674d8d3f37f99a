//! REST endpoints for quote sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use super::manager::{QuoteManager, QuoteSnapshot};
use super::model::{Budget, ProjectRoute, Timeline};
use crate::error::QuoteError;

/// Shared state for quote routes.
#[derive(Clone)]
pub struct QuoteRouteState {
    pub manager: Arc<QuoteManager>,
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        let status = match &self {
            QuoteError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            QuoteError::RouteNotSelected => StatusCode::CONFLICT,
            QuoteError::UnknownRoute(_)
            | QuoteError::UnknownBudget(_)
            | QuoteError::UnknownTimeline(_)
            | QuoteError::UnknownLeadStatus(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Body for mutating endpoints: whether the call took effect plus the
/// resulting session view.
fn mutation(result: (bool, QuoteSnapshot)) -> Json<serde_json::Value> {
    let (applied, session) = result;
    Json(serde_json::json!({ "applied": applied, "session": session }))
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    route: String,
}

#[derive(Debug, Deserialize)]
struct SpecificBody {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct BudgetBody {
    budget: String,
}

#[derive(Debug, Deserialize)]
struct TimelineBody {
    timeline: String,
}

#[derive(Debug, Deserialize)]
struct ContactBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// GET /api/quote/options
///
/// Gateway routes plus the budget and timeline choices.
async fn get_options() -> impl IntoResponse {
    let routes: Vec<_> = ProjectRoute::ALL
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r,
                "label": r.label(),
                "description": r.description(),
                "fields": r.specific_keys(),
            })
        })
        .collect();
    let budgets: Vec<_> = Budget::ALL.iter().map(Budget::label).collect();
    let timelines: Vec<_> = Timeline::ALL.iter().map(Timeline::label).collect();
    Json(serde_json::json!({
        "routes": routes,
        "budgets": budgets,
        "timelines": timelines,
    }))
}

/// POST /api/quote/sessions
async fn create_session(State(state): State<QuoteRouteState>) -> impl IntoResponse {
    let snapshot = state.manager.create_session().await;
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/quote/sessions/{id}
async fn get_session(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuoteSnapshot>, QuoteError> {
    Ok(Json(state.manager.snapshot(id).await?))
}

/// DELETE /api/quote/sessions/{id}
async fn close_session(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, QuoteError> {
    if state.manager.close_session(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(QuoteError::SessionNotFound(id))
    }
}

/// POST /api/quote/sessions/{id}/route
async fn select_route(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RouteBody>,
) -> Result<Json<serde_json::Value>, QuoteError> {
    let route: ProjectRoute = body.route.parse()?;
    Ok(mutation(state.manager.select_route(id, route).await?))
}

/// POST /api/quote/sessions/{id}/specifics
async fn update_specific(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SpecificBody>,
) -> Result<Json<serde_json::Value>, QuoteError> {
    Ok(mutation(
        state
            .manager
            .update_specific(id, &body.key, &body.value)
            .await?,
    ))
}

/// POST /api/quote/sessions/{id}/budget
async fn set_budget(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<BudgetBody>,
) -> Result<Json<serde_json::Value>, QuoteError> {
    let budget: Budget = body.budget.parse()?;
    Ok(mutation(state.manager.set_budget(id, budget).await?))
}

/// POST /api/quote/sessions/{id}/timeline
async fn set_timeline(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TimelineBody>,
) -> Result<Json<serde_json::Value>, QuoteError> {
    let timeline: Timeline = body.timeline.parse()?;
    Ok(mutation(state.manager.set_timeline(id, timeline).await?))
}

/// POST /api/quote/sessions/{id}/contact
async fn set_contact(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ContactBody>,
) -> Result<Json<serde_json::Value>, QuoteError> {
    Ok(mutation(
        state
            .manager
            .set_contact(id, body.name.as_deref(), body.email.as_deref())
            .await?,
    ))
}

/// POST /api/quote/sessions/{id}/advance
async fn advance(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, QuoteError> {
    Ok(mutation(state.manager.advance(id).await?))
}

/// POST /api/quote/sessions/{id}/retreat
async fn retreat(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, QuoteError> {
    Ok(mutation(state.manager.retreat(id).await?))
}

/// POST /api/quote/sessions/{id}/submit
///
/// Always 200 for a known session; `submitted`, `rejected`, and
/// `session.error` tell the outcome apart.
async fn submit(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, QuoteError> {
    Ok(Json(state.manager.submit(id).await?))
}

/// GET /api/quote/sessions/{id}/handoff
async fn handoff(
    State(state): State<QuoteRouteState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, QuoteError> {
    Ok(Json(state.manager.handoff(id).await?))
}

/// Build the quote REST routes.
pub fn quote_routes(state: QuoteRouteState) -> Router {
    Router::new()
        .route("/api/quote/options", get(get_options))
        .route("/api/quote/sessions", post(create_session))
        .route(
            "/api/quote/sessions/{id}",
            get(get_session).delete(close_session),
        )
        .route("/api/quote/sessions/{id}/route", post(select_route))
        .route("/api/quote/sessions/{id}/specifics", post(update_specific))
        .route("/api/quote/sessions/{id}/budget", post(set_budget))
        .route("/api/quote/sessions/{id}/timeline", post(set_timeline))
        .route("/api/quote/sessions/{id}/contact", post(set_contact))
        .route("/api/quote/sessions/{id}/advance", post(advance))
        .route("/api/quote/sessions/{id}/retreat", post(retreat))
        .route("/api/quote/sessions/{id}/submit", post(submit))
        .route("/api/quote/sessions/{id}/handoff", get(handoff))
        .with_state(state)
}
