use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::service_dto::{
        CreateServicePayload, CreateServiceStagePayload, ServiceListQuery, UpdateServicePayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/services",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Name or category")
    ),
    responses((status = 200, description = "Paginated services"))
)]
#[axum::debug_handler]
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ServiceListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.catalog_service.list(query).await?))
}

#[axum::debug_handler]
pub async fn get_service(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    Ok(Json(state.catalog_service.get_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/services",
    request_body = CreateServicePayload,
    responses((status = 201, description = "Service created", body = crate::models::service::Service))
)]
#[axum::debug_handler]
pub async fn create_service(
    State(state): State<AppState>,
    Json(payload): Json<CreateServicePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let service = state.catalog_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateServicePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.catalog_service.update(id, payload).await?))
}

#[axum::debug_handler]
pub async fn delete_service(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    state.catalog_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_service_stages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.catalog_service.stages(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/services/{id}/stages",
    params(("id" = i64, Path, description = "Service ID")),
    request_body = CreateServiceStagePayload,
    responses(
        (status = 201, description = "Stage template created", body = crate::models::service::ServiceStage),
        (status = 404, description = "Service not found")
    )
)]
#[axum::debug_handler]
pub async fn create_service_stage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateServiceStagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let stage = state.catalog_service.add_stage(id, payload).await?;
    Ok((StatusCode::CREATED, Json(stage)))
}

#[axum::debug_handler]
pub async fn delete_service_stage(
    State(state): State<AppState>,
    Path(stage_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.catalog_service.delete_stage(stage_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
