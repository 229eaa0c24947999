use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::client_dto::{ClientListQuery, CreateClientPayload, UpdateClientPayload},
    error::Result,
    middleware::auth::CurrentUser,
    routes::attachments::read_upload,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/clients",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("client_type" = Option<String>, Query, description = "pf or pj"),
        ("search" = Option<String>, Query, description = "Name, email, CPF or CNPJ")
    ),
    responses((status = 200, description = "Paginated clients"))
)]
#[axum::debug_handler]
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.client_service.list(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client found", body = crate::models::client::ClientDetail),
        (status = 404, description = "Client not found")
    )
)]
#[axum::debug_handler]
pub async fn get_client(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    Ok(Json(state.client_service.get_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Client created", body = crate::models::client::ClientDetail),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "CPF/CNPJ already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_client(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let client = state.client_service.create(payload, actor.id).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

#[axum::debug_handler]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.client_service.update(id, payload).await?))
}

#[axum::debug_handler]
pub async fn delete_client(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    state.client_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/clients/{id}/logo",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Logo replaced", body = crate::models::client::ClientDetail),
        (status = 400, description = "Not an accepted image")
    )
)]
#[axum::debug_handler]
pub async fn upload_logo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let file = read_upload(&mut multipart, "logo").await?;
    let client = state
        .client_service
        .update_logo(id, &file.filename, &file.data)
        .await?;
    Ok(Json(client))
}
