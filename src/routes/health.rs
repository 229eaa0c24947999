use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{database::pool::ping, AppState};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are reachable"),
        (status = 503, description = "Database unreachable")
    )
)]
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = ping(&state.pool).await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if database { "ok" } else { "degraded" },
        "database": if database { "up" } else { "down" },
        "timestamp": chrono::Utc::now(),
    });
    (status, Json(body))
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "HUB CRM API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/api/docs/openapi.json",
        "health": "/health",
    }))
}

pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Rota não encontrada",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}
