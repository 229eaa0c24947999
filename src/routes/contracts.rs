use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::contract_dto::{
        AttachServicePayload, ContractListQuery, CreateContractPayload,
        UpdateContractPayload, UpdateStagePayload,
    },
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/contracts",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("client_id" = Option<i64>, Query, description = "Filter by client"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("search" = Option<String>, Query, description = "Contract number or client name")
    ),
    responses((status = 200, description = "Paginated contracts"))
)]
#[axum::debug_handler]
pub async fn list_contracts(
    State(state): State<AppState>,
    Query(query): Query<ContractListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.contract_service.list(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    params(("id" = i64, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract found", body = crate::models::contract::ContractDetail),
        (status = 404, description = "Contract not found")
    )
)]
#[axum::debug_handler]
pub async fn get_contract(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    Ok(Json(state.contract_service.get_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/contracts",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contract created", body = crate::models::contract::ContractDetail),
        (status = 409, description = "Contract number already exists")
    )
)]
#[axum::debug_handler]
pub async fn create_contract(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let contract = state.contract_service.create(payload, actor.id).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

#[axum::debug_handler]
pub async fn update_contract(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateContractPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.contract_service.update(id, payload).await?))
}

#[axum::debug_handler]
pub async fn delete_contract(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    state.contract_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/contracts/{id}/services",
    params(("id" = i64, Path, description = "Contract ID")),
    request_body = AttachServicePayload,
    responses(
        (status = 201, description = "Service attached with its stages", body = crate::models::contract::ContractServiceDetail),
        (status = 404, description = "Contract or service not found")
    )
)]
#[axum::debug_handler]
pub async fn attach_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AttachServicePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let attached = state.contract_service.attach_service(id, payload).await?;
    Ok((StatusCode::CREATED, Json(attached)))
}

#[axum::debug_handler]
pub async fn list_contract_services(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.contract_service.list_services(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/contract-services/{id}/stages",
    params(("id" = i64, Path, description = "Contract service ID")),
    responses((status = 200, description = "Stages in order", body = [crate::models::contract::ContractServiceStage]))
)]
#[axum::debug_handler]
pub async fn list_stages(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    Ok(Json(state.contract_service.stages(id).await?))
}

#[axum::debug_handler]
pub async fn update_stage(
    State(state): State<AppState>,
    Path(stage_id): Path<i64>,
    Json(payload): Json<UpdateStagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(state.contract_service.update_stage(stage_id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/contract-services/{id}/stages/complete-all",
    params(("id" = i64, Path, description = "Contract service ID")),
    responses(
        (status = 200, description = "Per-stage outcome counts", body = crate::dto::contract_dto::BulkStageResult),
        (status = 404, description = "Contract service not found")
    )
)]
#[axum::debug_handler]
pub async fn complete_all_stages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.contract_service.complete_all_stages(id).await?))
}
