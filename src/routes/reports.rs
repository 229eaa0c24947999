use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{
    dto::report_dto::ReportQuery, error::Result, services::report_service::ReportFile, AppState,
};

fn download(file: ReportFile) -> impl IntoResponse {
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
}

#[utoipa::path(
    get,
    path = "/api/reports/rs/general",
    params(
        ("format" = Option<String>, Query, description = "pdf (default) or excel"),
        ("start_date" = Option<String>, Query, description = "Closure date from (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Closure date to (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Report document"),
        (status = 403, description = "Role not allowed")
    )
)]
#[axum::debug_handler]
pub async fn general_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse> {
    let file = state
        .report_service
        .general(query.format, query.start_date, query.end_date)
        .await?;
    Ok(download(file))
}

#[utoipa::path(
    get,
    path = "/api/reports/rs/client/{client_id}",
    params(
        ("client_id" = i64, Path, description = "Client ID"),
        ("format" = Option<String>, Query, description = "pdf (default) or excel"),
        ("start_date" = Option<String>, Query, description = "Closure date from (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Closure date to (YYYY-MM-DD)")
    ),
    responses((status = 200, description = "Report document"))
)]
#[axum::debug_handler]
pub async fn client_report(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse> {
    let file = state
        .report_service
        .by_client(query.format, client_id, query.start_date, query.end_date)
        .await?;
    Ok(download(file))
}

#[utoipa::path(
    get,
    path = "/api/reports/rs/consultant/{user_id}",
    params(
        ("user_id" = i64, Path, description = "Consultant user ID"),
        ("format" = Option<String>, Query, description = "pdf (default) or excel"),
        ("start_date" = Option<String>, Query, description = "Closure date from (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Closure date to (YYYY-MM-DD)")
    ),
    responses((status = 200, description = "Report document with commissions"))
)]
#[axum::debug_handler]
pub async fn consultant_report(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse> {
    let file = state
        .report_service
        .by_consultant(query.format, user_id, query.start_date, query.end_date)
        .await?;
    Ok(download(file))
}

#[utoipa::path(
    get,
    path = "/api/reports/rs/open-vacancies",
    params(("format" = Option<String>, Query, description = "pdf (default) or excel")),
    responses((status = 200, description = "Report document"))
)]
#[axum::debug_handler]
pub async fn open_vacancies_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse> {
    let file = state.report_service.open_vacancies(query.format).await?;
    Ok(download(file))
}

#[utoipa::path(
    get,
    path = "/api/reports/rs/vagas/{id}",
    params(
        ("id" = i64, Path, description = "Vaga ID"),
        ("format" = Option<String>, Query, description = "pdf (default) or excel")
    ),
    responses(
        (status = 200, description = "Report document"),
        (status = 404, description = "Vaga not found")
    )
)]
#[axum::debug_handler]
pub async fn individual_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse> {
    let file = state.report_service.individual(query.format, id).await?;
    Ok(download(file))
}
