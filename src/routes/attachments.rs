use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use tokio_util::io::ReaderStream;

use crate::{
    error::{Error, Result},
    middleware::auth::CurrentUser,
    models::attachment::Attachment,
    services::attachment_service::{ENTITY_CLIENT, ENTITY_CONTRACT},
    AppState,
};

pub(crate) struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Reads the first multipart field named `field`; other fields are skipped.
pub(crate) async fn read_upload(multipart: &mut Multipart, field: &str) -> Result<UploadedFile> {
    while let Some(part) = multipart.next_field().await.map_err(Error::Multipart)? {
        if part.name() != Some(field) {
            continue;
        }
        let filename = part
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::BadRequest("Nome do arquivo ausente".into()))?;
        let content_type = part.content_type().map(str::to_string);
        let data = part.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read upload bytes");
            Error::BadRequest("Falha ao ler o arquivo enviado".into())
        })?;
        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }
    Err(Error::BadRequest(format!("Campo '{}' é obrigatório", field)))
}

fn disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

async fn upload(
    state: &AppState,
    entity_type: &str,
    entity_id: i64,
    actor: &CurrentUser,
    multipart: &mut Multipart,
) -> Result<Attachment> {
    let file = read_upload(multipart, "file").await?;
    state
        .attachment_service
        .upload(
            entity_type,
            entity_id,
            &file.filename,
            file.content_type,
            &file.data,
            actor.id,
        )
        .await
}

#[utoipa::path(
    post,
    path = "/api/contracts/{id}/attachments",
    params(("id" = i64, Path, description = "Contract ID")),
    responses(
        (status = 201, description = "File stored", body = crate::models::attachment::Attachment),
        (status = 400, description = "File type not allowed or content mismatch"),
        (status = 404, description = "Contract not found")
    )
)]
#[axum::debug_handler]
pub async fn upload_contract_attachment(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let attachment = upload(&state, ENTITY_CONTRACT, id, &actor, &mut multipart).await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

#[axum::debug_handler]
pub async fn list_contract_attachments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.attachment_service.list(ENTITY_CONTRACT, id).await?))
}

#[axum::debug_handler]
pub async fn upload_client_attachment(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let attachment = upload(&state, ENTITY_CLIENT, id, &actor, &mut multipart).await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

#[axum::debug_handler]
pub async fn list_client_attachments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.attachment_service.list(ENTITY_CLIENT, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/attachments/{id}/download",
    params(("id" = i64, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "File contents"),
        (status = 404, description = "Attachment or file not found")
    )
)]
#[axum::debug_handler]
pub async fn download_attachment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let (attachment, file) = state.attachment_service.open(id).await?;
    let content_type = attachment
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition(&attachment.original_name)),
            (header::CONTENT_LENGTH, attachment.size_bytes.to_string()),
        ],
        body,
    ))
}

#[axum::debug_handler]
pub async fn delete_attachment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.attachment_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_neutralises_quotes() {
        assert_eq!(
            disposition("contrato \"final\".pdf"),
            "attachment; filename=\"contrato _final_.pdf\""
        );
    }
}
