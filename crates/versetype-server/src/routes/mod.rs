//! HTTP routes.

pub mod ws;

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::warn;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let ws_routes = Router::new()
        .route("/ws", get(ws::upgrade))
        .route_layer(middleware::from_fn_with_state(state.clone(), check_origin));

    Router::new()
        .route("/health", get(health))
        .merge(ws_routes)
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reject WebSocket upgrades from origins we don't serve.
async fn check_origin(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let allowed = match req.headers().get(header::ORIGIN) {
        None => true,
        Some(value) => value
            .to_str()
            .map(|origin| origin_allowed(origin, &state.config.allowed_origins))
            .unwrap_or(false),
    };

    if allowed {
        next.run(req).await
    } else {
        warn!(target: "versetype::ws", "Rejected WebSocket from origin {:?}", req.headers().get(header::ORIGIN));
        StatusCode::FORBIDDEN.into_response()
    }
}

/// Local development origins are always accepted.
pub fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    origin.starts_with("http://localhost:")
        || origin.starts_with("http://127.0.0.1:")
        || allowed.iter().any(|a| a == origin)
}
