use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::candidato_dto::{
        CandidatoEmailQuery, CandidatoListQuery, CreateCandidatoPayload, UpdateCandidatoPayload,
        UpdateCandidatoStatusPayload, UpdateVagaCandidatoPayload,
    },
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/candidatos",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "pendente, aprovado or reprovado"),
        ("search" = Option<String>, Query, description = "Nome, email or telefone")
    ),
    responses((status = 200, description = "Paginated candidatos"))
)]
#[axum::debug_handler]
pub async fn list_candidatos(
    State(state): State<AppState>,
    Query(query): Query<CandidatoListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.candidato_service.list(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/candidatos/by-email",
    params(("email" = String, Query, description = "Email, case-insensitive")),
    responses(
        (status = 200, description = "Candidate found", body = crate::models::candidato::Candidato),
        (status = 404, description = "No candidate with this email")
    )
)]
#[axum::debug_handler]
pub async fn find_by_email(
    State(state): State<AppState>,
    Query(query): Query<CandidatoEmailQuery>,
) -> Result<impl IntoResponse> {
    if query.email.trim().is_empty() {
        return Err(Error::BadRequest("Email é obrigatório".into()));
    }
    let candidato = state
        .candidato_service
        .find_by_email(&query.email)
        .await?
        .ok_or_else(|| Error::NotFound("Candidato não encontrado".into()))?;
    Ok(Json(candidato))
}

#[axum::debug_handler]
pub async fn get_candidato(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    Ok(Json(state.candidato_service.get_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/candidatos",
    request_body = CreateCandidatoPayload,
    responses((status = 201, description = "Candidate created", body = crate::models::candidato::Candidato))
)]
#[axum::debug_handler]
pub async fn create_candidato(
    State(state): State<AppState>,
    Json(payload): Json<CreateCandidatoPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidato = state.candidato_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(candidato)))
}

#[axum::debug_handler]
pub async fn update_candidato(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCandidatoPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.candidato_service.update(id, payload).await?))
}

#[axum::debug_handler]
pub async fn update_candidato_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCandidatoStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(
        state
            .candidato_service
            .update_status(id, &payload.status)
            .await?,
    ))
}

#[axum::debug_handler]
pub async fn delete_candidato(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    state.candidato_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn vagas_do_candidato(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.candidato_service.vagas_do_candidato(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/vaga-candidatos/{id}",
    params(("id" = i64, Path, description = "Vaga-candidate link ID")),
    request_body = UpdateVagaCandidatoPayload,
    responses(
        (status = 200, description = "Link updated", body = crate::models::candidato::VagaCandidatoDetail),
        (status = 404, description = "Link not found")
    )
)]
#[axum::debug_handler]
pub async fn update_vaga_candidato(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateVagaCandidatoPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(
        state
            .candidato_service
            .update_vaga_candidato(id, payload)
            .await?,
    ))
}
