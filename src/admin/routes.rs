//! REST endpoints for reviewing submitted leads.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::quote::model::LeadStatus;
use crate::store::Database;

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 500;

/// Shared state for admin routes.
#[derive(Clone)]
pub struct AdminRouteState {
    pub store: Arc<dyn Database>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

fn store_error(e: DatabaseError) -> Response {
    error!(error = %e, "Lead store error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
        .into_response()
}

fn lead_not_found(id: Uuid) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": format!("Lead {id} not found")})),
    )
        .into_response()
}

/// GET /api/admin/leads?limit=N
async fn list_leads(
    State(state): State<AdminRouteState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    match state.store.list_leads(limit).await {
        Ok(leads) => Json(serde_json::json!({ "leads": leads })).into_response(),
        Err(e) => store_error(e),
    }
}

/// GET /api/admin/leads/{id}
async fn get_lead(State(state): State<AdminRouteState>, Path(id): Path<Uuid>) -> Response {
    match state.store.get_lead(id).await {
        Ok(Some(lead)) => Json(lead).into_response(),
        Ok(None) => lead_not_found(id),
        Err(e) => store_error(e),
    }
}

/// POST /api/admin/leads/{id}/status
async fn update_status(
    State(state): State<AdminRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Response {
    let status: LeadStatus = match body.status.parse() {
        Ok(status) => status,
        Err(e) => return e.into_response(),
    };
    match state.store.update_lead_status(id, status).await {
        Ok(true) => {
            info!(lead_id = %id, %status, "Lead status updated");
            Json(serde_json::json!({"id": id, "status": status})).into_response()
        }
        Ok(false) => lead_not_found(id),
        Err(e) => store_error(e),
    }
}

/// GET /api/admin/stats
async fn stats(State(state): State<AdminRouteState>) -> Response {
    match state.store.lead_counts().await {
        Ok(counts) => Json(counts).into_response(),
        Err(e) => store_error(e),
    }
}

/// Build the admin REST routes.
pub fn admin_routes(state: AdminRouteState) -> Router {
    Router::new()
        .route("/api/admin/leads", get(list_leads))
        .route("/api/admin/leads/{id}", get(get_lead))
        .route("/api/admin/leads/{id}/status", post(update_status))
        .route("/api/admin/stats", get(stats))
        .with_state(state)
}
