use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::vaga_dto::{
        CreateVagaPayload, GerarLinkPublicoPayload, UpdateVagaPayload,
        UpdateVagaStatusPayload, VagaListQuery, VagaPublicaResponse, VagaStatisticsQuery,
        VincularCandidatoPayload,
    },
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/vagas",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("client_id" = Option<i64>, Query, description = "Filter by client"),
        ("user_id" = Option<i64>, Query, description = "Filter by consultant"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sigilosa" = Option<bool>, Query, description = "Filter confidential vagas"),
        ("tipo_cargo" = Option<String>, Query, description = "Filter by position type"),
        ("search" = Option<String>, Query, description = "Codigo or cargo")
    ),
    responses((status = 200, description = "Paginated vagas"))
)]
#[axum::debug_handler]
pub async fn list_vagas(
    State(state): State<AppState>,
    Query(query): Query<VagaListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.vaga_service.list(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/vagas/statistics",
    params(
        ("client_id" = Option<i64>, Query, description = "Filter by client"),
        ("user_id" = Option<i64>, Query, description = "Filter by consultant"),
        ("date_from" = Option<String>, Query, description = "Opening date from (YYYY-MM-DD)"),
        ("date_to" = Option<String>, Query, description = "Opening date to (YYYY-MM-DD)")
    ),
    responses((status = 200, description = "Aggregated vaga statistics", body = crate::services::metrics::VagaStatistics))
)]
#[axum::debug_handler]
pub async fn vaga_statistics(
    State(state): State<AppState>,
    Query(query): Query<VagaStatisticsQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.vaga_service.statistics(query).await?))
}

#[axum::debug_handler]
pub async fn next_codigo(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let codigo = state.vaga_service.next_codigo().await?;
    Ok(Json(json!({ "codigo": codigo })))
}

#[utoipa::path(
    get,
    path = "/api/vagas/{id}",
    params(("id" = i64, Path, description = "Vaga ID")),
    responses(
        (status = 200, description = "Vaga found", body = crate::models::vaga::VagaDetail),
        (status = 404, description = "Vaga not found")
    )
)]
#[axum::debug_handler]
pub async fn get_vaga(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    Ok(Json(state.vaga_service.get_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/vagas",
    request_body = CreateVagaPayload,
    responses(
        (status = 201, description = "Vaga created with a generated codigo", body = crate::models::vaga::VagaDetail),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_vaga(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Json(payload): Json<CreateVagaPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let vaga = state.vaga_service.create(payload, actor.id).await?;
    Ok((StatusCode::CREATED, Json(vaga)))
}

#[utoipa::path(
    put,
    path = "/api/vagas/{id}",
    params(("id" = i64, Path, description = "Vaga ID")),
    request_body = UpdateVagaPayload,
    responses(
        (status = 200, description = "Vaga updated", body = crate::models::vaga::VagaDetail),
        (status = 404, description = "Vaga not found")
    )
)]
#[axum::debug_handler]
pub async fn update_vaga(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateVagaPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.vaga_service.update(id, payload, actor.id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/vagas/{id}/status",
    params(("id" = i64, Path, description = "Vaga ID")),
    request_body = UpdateVagaStatusPayload,
    responses(
        (status = 200, description = "Status written and recorded in history", body = crate::models::vaga::VagaDetail),
        (status = 400, description = "Unknown status")
    )
)]
#[axum::debug_handler]
pub async fn update_vaga_status(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateVagaStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.vaga_service.update_status(id, payload, actor.id).await?))
}

#[axum::debug_handler]
pub async fn delete_vaga(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    state.vaga_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/vagas/{id}/gerar-link-publico",
    params(("id" = i64, Path, description = "Vaga ID")),
    request_body = GerarLinkPublicoPayload,
    responses(
        (status = 200, description = "Public link generated", body = crate::dto::vaga_dto::LinkPublicoResponse),
        (status = 404, description = "Vaga not found")
    )
)]
#[axum::debug_handler]
pub async fn gerar_link_publico(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Option<Json<GerarLinkPublicoPayload>>,
) -> Result<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    let config = crate::config::get_config();
    let link = state
        .vaga_service
        .generate_public_link(id, payload, &config.public_app_url)
        .await?;
    Ok(Json(link))
}

#[axum::debug_handler]
pub async fn remover_link_publico(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.vaga_service.remove_public_link(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/vagas/{id}/historico-status",
    params(("id" = i64, Path, description = "Vaga ID")),
    responses((status = 200, description = "Status changes, newest first", body = [crate::models::vaga::VagaStatusHistory]))
)]
#[axum::debug_handler]
pub async fn historico_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.vaga_service.status_history(id).await?))
}

#[axum::debug_handler]
pub async fn list_vaga_candidatos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.vaga_service.candidatos_com_entrevistas(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/vagas/{id}/candidatos",
    params(("id" = i64, Path, description = "Vaga ID")),
    request_body = VincularCandidatoPayload,
    responses(
        (status = 201, description = "Candidate linked"),
        (status = 409, description = "Candidate already linked")
    )
)]
#[axum::debug_handler]
pub async fn vincular_candidato(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<VincularCandidatoPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let link = state.vaga_service.vincular_candidato(id, payload).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

#[axum::debug_handler]
pub async fn desvincular_candidato(
    State(state): State<AppState>,
    Path((id, candidato_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse> {
    state
        .vaga_service
        .desvincular_candidato(id, candidato_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/vagas/publico/{token}",
    params(("token" = String, Path, description = "Public link token")),
    responses(
        (status = 200, description = "Public view of the vaga", body = VagaPublicaResponse),
        (status = 404, description = "Link invalid or expired")
    )
)]
#[axum::debug_handler]
pub async fn vaga_publica(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let vaga = state.vaga_service.find_public(&token).await?;
    Ok(Json(VagaPublicaResponse::from(vaga)))
}

#[axum::debug_handler]
pub async fn historico_publico(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.vaga_service.public_status_history(&token).await?))
}
