use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    responses((status = 200, description = "Contract, client and vaga aggregates", body = crate::services::analytics_service::Dashboard))
)]
#[axum::debug_handler]
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.analytics_service.dashboard().await?))
}
