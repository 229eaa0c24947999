use sqlx::PgPool;

use crate::dto::entrevista_dto::{CreateEntrevistaPayload, UpdateEntrevistaPayload};
use crate::dto::ensure_opt_one_of;
use crate::error::{Error, Result};
use crate::models::entrevista::{Entrevista, EntrevistaDetail, ENTREVISTA_STATUSES};

/// Interview joined with candidate and interviewer names; callers append the WHERE clause.
pub const ENTREVISTA_SELECT: &str = r#"
    SELECT e.*,
           c.nome AS candidato_nome,
           u.name AS entrevistador_nome
    FROM entrevistas e
    JOIN vaga_candidatos vc ON vc.id = e.vaga_candidato_id
    LEFT JOIN candidatos c ON c.id = vc.candidato_id
    LEFT JOIN users u ON u.id = e.entrevistador_id
"#;

#[derive(Clone)]
pub struct EntrevistaService {
    pool: PgPool,
}

impl EntrevistaService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<EntrevistaDetail> {
        let sql = format!("{} WHERE e.id = $1", ENTREVISTA_SELECT);
        sqlx::query_as::<_, EntrevistaDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar entrevista", e))?
            .ok_or_else(|| Error::NotFound("Entrevista não encontrada".into()))
    }

    pub async fn list_by_vaga_candidato(&self, vaga_candidato_id: i64) -> Result<Vec<EntrevistaDetail>> {
        let sql = format!(
            "{} WHERE e.vaga_candidato_id = $1 ORDER BY e.data_entrevista DESC, e.hora_entrevista DESC",
            ENTREVISTA_SELECT
        );
        sqlx::query_as::<_, EntrevistaDetail>(&sql)
            .bind(vaga_candidato_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar entrevistas", e))
    }

    pub async fn create(&self, payload: CreateEntrevistaPayload, actor_id: i64) -> Result<EntrevistaDetail> {
        ensure_opt_one_of("status", payload.status.as_deref(), &ENTREVISTA_STATUSES)?;

        let entrevista = sqlx::query_as::<_, Entrevista>(
            r#"
            INSERT INTO entrevistas (
                vaga_candidato_id, data_entrevista, hora_entrevista, status,
                link_chamada, observacoes, entrevistador_id, created_by
            ) VALUES ($1, $2, $3, COALESCE($4, 'agendada'), $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(payload.vaga_candidato_id)
        .bind(payload.data_entrevista)
        .bind(&payload.hora_entrevista)
        .bind(&payload.status)
        .bind(&payload.link_chamada)
        .bind(&payload.observacoes)
        .bind(payload.entrevistador_id)
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return Error::BadRequest(
                        "Candidato da vaga ou entrevistador inexistente".into(),
                    );
                }
            }
            Error::store("Erro ao criar entrevista", e)
        })?;

        // the link moves forward once an interview is booked
        sqlx::query(
            r#"
            UPDATE vaga_candidatos SET status = 'entrevista_agendada', updated_at = NOW()
            WHERE id = $1 AND status IN ('inscrito', 'triagem')
            "#,
        )
        .bind(payload.vaga_candidato_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao atualizar candidato na vaga", e))?;

        tracing::info!(entrevista_id = entrevista.id, "entrevista scheduled");
        self.get_by_id(entrevista.id).await
    }

    pub async fn update(&self, id: i64, payload: UpdateEntrevistaPayload) -> Result<EntrevistaDetail> {
        ensure_opt_one_of("status", payload.status.as_deref(), &ENTREVISTA_STATUSES)?;

        let res = sqlx::query(
            r#"
            UPDATE entrevistas SET
                data_entrevista = COALESCE($2, data_entrevista),
                hora_entrevista = COALESCE($3, hora_entrevista),
                status = COALESCE($4, status),
                link_chamada = COALESCE($5, link_chamada),
                observacoes = COALESCE($6, observacoes),
                entrevistador_id = COALESCE($7, entrevistador_id),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.data_entrevista)
        .bind(&payload.hora_entrevista)
        .bind(&payload.status)
        .bind(&payload.link_chamada)
        .bind(&payload.observacoes)
        .bind(payload.entrevistador_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao atualizar entrevista", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Entrevista não encontrada".into()));
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM entrevistas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao excluir entrevista", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Entrevista não encontrada".into()));
        }
        Ok(())
    }
}
