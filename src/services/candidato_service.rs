use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::candidato_dto::{
    CandidatoListQuery, CreateCandidatoPayload, UpdateCandidatoPayload, UpdateVagaCandidatoPayload,
};
use crate::dto::{ensure_one_of, ensure_opt_one_of, ListResponse, PageWindow};
use crate::error::{Error, Result};
use crate::models::candidato::{
    Candidato, VagaCandidatoDetail, CANDIDATO_STATUSES, VAGA_CANDIDATO_STATUSES,
};

/// Vaga link joined with the candidate's contact columns; callers append the WHERE clause.
pub const VAGA_CANDIDATO_SELECT: &str = r#"
    SELECT vc.*,
           c.nome AS candidato_nome,
           c.email AS candidato_email,
           c.telefone AS candidato_telefone,
           c.status AS candidato_status
    FROM vaga_candidatos vc
    JOIN candidatos c ON c.id = vc.candidato_id
"#;

#[derive(Clone)]
pub struct CandidatoService {
    pool: PgPool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &CandidatoListQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (nome ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR telefone ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Empty strings from forms are stored as NULL so the email lookup stays meaningful.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CandidatoService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: CandidatoListQuery) -> Result<ListResponse<Candidato>> {
        let window = PageWindow::resolve(query.page, query.per_page);

        let mut items_qb = QueryBuilder::<Postgres>::new("SELECT * FROM candidatos");
        push_filters(&mut items_qb, &query);
        items_qb
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let items = items_qb
            .build_query_as::<Candidato>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar candidatos", e))?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM candidatos");
        push_filters(&mut count_qb, &query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao contar candidatos", e))?;

        Ok(ListResponse::new(items, total, window))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Candidato> {
        sqlx::query_as::<_, Candidato>("SELECT * FROM candidatos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar candidato", e))?
            .ok_or_else(|| Error::NotFound("Candidato não encontrado".into()))
    }

    /// `None` when no candidate uses the address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Candidato>> {
        sqlx::query_as::<_, Candidato>(
            "SELECT * FROM candidatos WHERE LOWER(email) = LOWER($1) ORDER BY id LIMIT 1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao buscar candidato por email", e))
    }

    pub async fn create(&self, payload: CreateCandidatoPayload) -> Result<Candidato> {
        ensure_opt_one_of("status", payload.status.as_deref(), &CANDIDATO_STATUSES)?;

        let candidato = sqlx::query_as::<_, Candidato>(
            r#"
            INSERT INTO candidatos (nome, email, telefone, status, observacoes)
            VALUES ($1, $2, $3, COALESCE($4, 'pendente'), $5)
            RETURNING *
            "#,
        )
        .bind(payload.nome.trim())
        .bind(blank_to_none(payload.email))
        .bind(blank_to_none(payload.telefone))
        .bind(payload.status)
        .bind(payload.observacoes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao criar candidato", e))?;

        tracing::info!(candidato_id = candidato.id, "candidato created");
        Ok(candidato)
    }

    pub async fn update(&self, id: i64, payload: UpdateCandidatoPayload) -> Result<Candidato> {
        ensure_opt_one_of("status", payload.status.as_deref(), &CANDIDATO_STATUSES)?;

        sqlx::query_as::<_, Candidato>(
            r#"
            UPDATE candidatos SET
                nome = COALESCE($2, nome),
                email = COALESCE($3, email),
                telefone = COALESCE($4, telefone),
                status = COALESCE($5, status),
                observacoes = COALESCE($6, observacoes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.nome)
        .bind(blank_to_none(payload.email))
        .bind(blank_to_none(payload.telefone))
        .bind(payload.status)
        .bind(payload.observacoes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao atualizar candidato", e))?
        .ok_or_else(|| Error::NotFound("Candidato não encontrado".into()))
    }

    pub async fn update_status(&self, id: i64, status: &str) -> Result<Candidato> {
        ensure_one_of("status", status, &CANDIDATO_STATUSES)?;

        sqlx::query_as::<_, Candidato>(
            "UPDATE candidatos SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao atualizar status do candidato", e))?
        .ok_or_else(|| Error::NotFound("Candidato não encontrado".into()))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM candidatos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao excluir candidato", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Candidato não encontrado".into()));
        }
        Ok(())
    }

    /// Updates a vaga-candidate link; observações are kept when not supplied.
    pub async fn update_vaga_candidato(
        &self,
        vaga_candidato_id: i64,
        payload: UpdateVagaCandidatoPayload,
    ) -> Result<VagaCandidatoDetail> {
        ensure_one_of("status", &payload.status, &VAGA_CANDIDATO_STATUSES)?;

        let res = sqlx::query(
            r#"
            UPDATE vaga_candidatos SET
                status = $2,
                observacoes = COALESCE($3, observacoes),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(vaga_candidato_id)
        .bind(&payload.status)
        .bind(&payload.observacoes)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao atualizar candidato na vaga", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Vínculo não encontrado".into()));
        }

        let sql = format!("{} WHERE vc.id = $1", VAGA_CANDIDATO_SELECT);
        sqlx::query_as::<_, VagaCandidatoDetail>(&sql)
            .bind(vaga_candidato_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar vínculo", e))
    }

    /// Every vaga a candidate is linked to.
    pub async fn vagas_do_candidato(&self, candidato_id: i64) -> Result<Vec<VagaCandidatoDetail>> {
        let sql = format!(
            "{} WHERE vc.candidato_id = $1 ORDER BY vc.data_inscricao DESC",
            VAGA_CANDIDATO_SELECT
        );
        sqlx::query_as::<_, VagaCandidatoDetail>(&sql)
            .bind(candidato_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar vagas do candidato", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_become_null() {
        assert_eq!(blank_to_none(Some("  ".into())), None);
        assert_eq!(blank_to_none(None), None);
        assert_eq!(
            blank_to_none(Some(" ana@x.com ".into())).as_deref(),
            Some("ana@x.com")
        );
    }
}
