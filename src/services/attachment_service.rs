use std::path::{Path, PathBuf};

use sqlx::PgPool;
use tokio::fs;

use crate::error::{Error, Result};
use crate::models::attachment::Attachment;

pub const DOCUMENT_EXTENSIONS: [&str; 10] = [
    "pdf", "doc", "docx", "xls", "xlsx", "txt", "jpg", "jpeg", "png", "webp",
];
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

pub const ENTITY_CONTRACT: &str = "contract";
pub const ENTITY_CLIENT: &str = "client";

/// Lower-cased extension of an allowed upload whose leading bytes match its type.
pub fn check_upload(filename: &str, data: &[u8], allowed: &[&str]) -> Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !allowed.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "Tipo de arquivo .{} não permitido",
            ext
        )));
    }
    if data.is_empty() {
        return Err(Error::BadRequest("Arquivo vazio".into()));
    }

    let matches = match ext.as_str() {
        "pdf" => data.starts_with(b"%PDF"),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "webp" => data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP",
        "docx" | "xlsx" => data.starts_with(b"PK\x03\x04"),
        "doc" | "xls" => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]),
        _ => true,
    };
    if !matches {
        tracing::warn!(filename, "upload content does not match its extension");
        return Err(Error::BadRequest(format!(
            "Conteúdo inválido para arquivo .{}",
            ext
        )));
    }
    Ok(ext)
}

/// Writes `data` to `<root>/<dir>/<uuid>.<ext>` and returns the path relative to `root`.
pub async fn save_upload(root: &str, dir: &str, ext: &str, data: &[u8]) -> Result<String> {
    let target_dir = Path::new(root).join(dir);
    fs::create_dir_all(&target_dir).await?;

    let relative = format!("{}/{}.{}", dir, uuid::Uuid::new_v4(), ext);
    let full = Path::new(root).join(&relative);
    fs::write(&full, data).await.map_err(|e| {
        tracing::error!(error = %e, path = %full.display(), "failed to write upload");
        Error::Internal(format!("Falha ao salvar arquivo: {}", e))
    })?;
    Ok(relative)
}

fn entity_dir(entity_type: &str) -> &'static str {
    if entity_type == ENTITY_CLIENT {
        "clients"
    } else {
        "contracts"
    }
}

#[derive(Clone)]
pub struct AttachmentService {
    pool: PgPool,
    uploads_dir: String,
}

impl AttachmentService {
    pub fn new(pool: PgPool, uploads_dir: String) -> Self {
        Self { pool, uploads_dir }
    }

    pub fn absolute_path(&self, attachment: &Attachment) -> PathBuf {
        Path::new(&self.uploads_dir).join(&attachment.stored_path)
    }

    async fn ensure_entity(&self, entity_type: &str, entity_id: i64) -> Result<()> {
        let (sql, missing) = match entity_type {
            ENTITY_CONTRACT => ("SELECT EXISTS(SELECT 1 FROM contracts WHERE id = $1)", "Contrato não encontrado"),
            ENTITY_CLIENT => ("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)", "Cliente não encontrado"),
            other => {
                return Err(Error::BadRequest(format!("Tipo de entidade inválido: {}", other)));
            }
        };
        let exists: bool = sqlx::query_scalar(sql)
            .bind(entity_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao verificar entidade do anexo", e))?;
        if exists {
            Ok(())
        } else {
            Err(Error::NotFound(missing.into()))
        }
    }

    pub async fn upload(
        &self,
        entity_type: &str,
        entity_id: i64,
        original_name: &str,
        content_type: Option<String>,
        data: &[u8],
        actor_id: i64,
    ) -> Result<Attachment> {
        self.ensure_entity(entity_type, entity_id).await?;
        let ext = check_upload(original_name, data, &DOCUMENT_EXTENSIONS)?;
        let stored_path = save_upload(&self.uploads_dir, entity_dir(entity_type), &ext, data).await?;

        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (
                entity_type, entity_id, original_name, stored_path, content_type, size_bytes, uploaded_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(original_name)
        .bind(&stored_path)
        .bind(content_type)
        .bind(data.len() as i64)
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao registrar anexo", e))?;

        tracing::info!(attachment_id = attachment.id, entity_type, entity_id, "attachment stored");
        Ok(attachment)
    }

    pub async fn list(&self, entity_type: &str, entity_id: i64) -> Result<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE entity_type = $1 AND entity_id = $2 ORDER BY created_at DESC",
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao buscar anexos", e))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Attachment> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar anexo", e))?
            .ok_or_else(|| Error::NotFound("Anexo não encontrado".into()))
    }

    /// Metadata plus an open handle for streaming the file back.
    pub async fn open(&self, id: i64) -> Result<(Attachment, fs::File)> {
        let attachment = self.get_by_id(id).await?;
        let file = fs::File::open(self.absolute_path(&attachment))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    Error::NotFound("Arquivo do anexo não encontrado".into())
                }
                _ => Error::Io(e),
            })?;
        Ok((attachment, file))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let attachment = self.get_by_id(id).await?;
        sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao excluir anexo", e))?;

        if let Err(e) = fs::remove_file(self.absolute_path(&attachment)).await {
            tracing::warn!(error = %e, attachment_id = id, "attachment file already gone");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_content() {
        assert_eq!(
            check_upload("Contrato.PDF", b"%PDF-1.7 ...", &DOCUMENT_EXTENSIONS).unwrap(),
            "pdf"
        );
        assert_eq!(
            check_upload("logo.png", &[0x89, 0x50, 0x4E, 0x47, 0x0D], &IMAGE_EXTENSIONS).unwrap(),
            "png"
        );
        assert_eq!(
            check_upload("planilha.xlsx", b"PK\x03\x04rest", &DOCUMENT_EXTENSIONS).unwrap(),
            "xlsx"
        );
    }

    #[test]
    fn rejects_disallowed_extension() {
        let err = check_upload("script.exe", b"MZ", &DOCUMENT_EXTENSIONS).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert!(check_upload("contrato.pdf", b"%PDF", &IMAGE_EXTENSIONS).is_err());
        assert!(check_upload("semextensao", b"%PDF", &DOCUMENT_EXTENSIONS).is_err());
    }

    #[test]
    fn rejects_spoofed_content() {
        assert!(check_upload("fake.pdf", b"<html>", &DOCUMENT_EXTENSIONS).is_err());
        assert!(check_upload("fake.jpg", b"GIF89a", &IMAGE_EXTENSIONS).is_err());
        assert!(check_upload("fake.webp", b"RIFF1234WAVE", &IMAGE_EXTENSIONS).is_err());
        assert!(check_upload("vazio.txt", b"", &DOCUMENT_EXTENSIONS).is_err());
    }

    #[tokio::test]
    async fn saved_upload_lands_under_kind_directory() {
        let root = std::env::temp_dir().join(format!("hub-crm-test-{}", uuid::Uuid::new_v4()));
        let root = root.to_string_lossy().to_string();

        let relative = save_upload(&root, "contracts", "txt", b"ola").await.unwrap();
        assert!(relative.starts_with("contracts/"));
        assert!(relative.ends_with(".txt"));
        let written = tokio::fs::read(Path::new(&root).join(&relative)).await.unwrap();
        assert_eq!(written, b"ola");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
