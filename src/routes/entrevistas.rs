use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::entrevista_dto::{CreateEntrevistaPayload, UpdateEntrevistaPayload},
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/entrevistas",
    request_body = CreateEntrevistaPayload,
    responses(
        (status = 201, description = "Interview scheduled", body = crate::models::entrevista::EntrevistaDetail),
        (status = 400, description = "Unknown link or interviewer")
    )
)]
#[axum::debug_handler]
pub async fn create_entrevista(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Json(payload): Json<CreateEntrevistaPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let entrevista = state.entrevista_service.create(payload, actor.id).await?;
    Ok((StatusCode::CREATED, Json(entrevista)))
}

#[axum::debug_handler]
pub async fn get_entrevista(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    Ok(Json(state.entrevista_service.get_by_id(id).await?))
}

#[axum::debug_handler]
pub async fn update_entrevista(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEntrevistaPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.entrevista_service.update(id, payload).await?))
}

#[axum::debug_handler]
pub async fn delete_entrevista(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    state.entrevista_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/entrevistas/vaga-candidato/{id}",
    params(("id" = i64, Path, description = "Vaga-candidate link ID")),
    responses((status = 200, description = "Interviews for the link, newest first", body = [crate::models::entrevista::EntrevistaDetail]))
)]
#[axum::debug_handler]
pub async fn list_by_vaga_candidato(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.entrevista_service.list_by_vaga_candidato(id).await?))
}
