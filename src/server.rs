//! HTTP application assembly: quote and admin routes behind one router.

use std::sync::Arc;

use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::admin::{AdminRouteState, admin_routes};
use crate::quote::{QuoteManager, QuoteRouteState, quote_routes};
use crate::store::Database;

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "studio-quote"
    }))
}

/// Build the full router. The site front end is served from another
/// origin, so CORS is open.
pub fn build_app(manager: Arc<QuoteManager>, store: Arc<dyn Database>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(quote_routes(QuoteRouteState { manager }))
        .merge(admin_routes(AdminRouteState { store }))
        .layer(cors)
}
