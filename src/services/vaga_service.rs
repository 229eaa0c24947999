use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, Duration};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::vaga_dto::{
    CreateVagaPayload, GerarLinkPublicoPayload, LinkPublicoResponse, UpdateVagaPayload,
    UpdateVagaStatusPayload, VagaListQuery, VagaStatisticsQuery, VincularCandidatoPayload,
};
use crate::dto::{ensure_one_of, ensure_opt_one_of, ListResponse, PageWindow};
use crate::error::{Error, Result};
use crate::models::candidato::{VagaCandidatoDetail, VAGA_CANDIDATO_STATUSES};
use crate::models::entrevista::EntrevistaDetail;
use crate::models::vaga::{
    is_final_status, Vaga, VagaDetail, VagaStatusHistory, FONTES_RECRUTAMENTO, STATUS_ABERTA,
    TIPOS_ABERTURA, TIPOS_CARGO, VAGA_STATUSES,
};
use crate::services::candidato_service::VAGA_CANDIDATO_SELECT;
use crate::services::entrevista_service::ENTREVISTA_SELECT;
use crate::services::metrics::{vaga_statistics, VagaStatistics};
use crate::services::report_service::{VagaReportFilter, VagaSource};
use crate::utils::codigo::{codigo_prefix, next_codigo};
use crate::utils::time::{now, today};
use crate::utils::token::generate_public_token;

const VAGA_DETAIL_SELECT: &str = r#"
    SELECT v.*,
           COALESCE(NULLIF(pj.company_name, ''), NULLIF(pf.full_name, '')) AS client_name,
           u.name AS user_name,
           ca.nome AS candidato_aprovado_nome
    FROM vagas v
    LEFT JOIN clients_pj pj ON pj.client_id = v.client_id
    LEFT JOIN clients_pf pf ON pf.client_id = v.client_id
    LEFT JOIN users u ON u.id = v.user_id
    LEFT JOIN candidatos ca ON ca.id = v.candidato_aprovado_id
"#;

const HISTORY_SELECT: &str = r#"
    SELECT h.*, u.name AS changed_by_name
    FROM vaga_status_history h
    LEFT JOIN users u ON u.id = h.changed_by
"#;

const CODIGO_CONSTRAINT: &str = "vagas_codigo_key";
const CODIGO_ATTEMPTS: usize = 5;

/// Linked candidate together with the interviews scheduled for that link.
#[derive(Debug, Clone, Serialize)]
pub struct VagaCandidatoComEntrevistas {
    #[serde(flatten)]
    pub candidato: VagaCandidatoDetail,
    pub entrevistas: Vec<EntrevistaDetail>,
}

#[derive(Clone)]
pub struct VagaService {
    pool: PgPool,
}

fn percent(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64).map(|d| d.round_dp(2))
}

fn is_codigo_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(CODIGO_CONSTRAINT)
        }
        _ => false,
    }
}

fn push_list_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &VagaListQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(client_id) = query.client_id {
        qb.push(" AND v.client_id = ").push_bind(client_id);
    }
    if let Some(user_id) = query.user_id {
        qb.push(" AND v.user_id = ").push_bind(user_id);
    }
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND v.status = ").push_bind(status.to_string());
    }
    if let Some(sigilosa) = query.sigilosa {
        qb.push(" AND v.sigilosa = ").push_bind(sigilosa);
    }
    if let Some(tipo) = query.tipo_cargo.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND v.tipo_cargo = ").push_bind(tipo.to_string());
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (v.codigo ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.cargo ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

impl VagaService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: VagaListQuery) -> Result<ListResponse<VagaDetail>> {
        let window = PageWindow::resolve(query.page, query.per_page);

        let mut items_qb = QueryBuilder::<Postgres>::new(VAGA_DETAIL_SELECT);
        push_list_filters(&mut items_qb, &query);
        items_qb
            .push(" ORDER BY v.created_at DESC LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let items = items_qb
            .build_query_as::<VagaDetail>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar vagas", e))?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vagas v");
        push_list_filters(&mut count_qb, &query);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao contar vagas", e))?;

        Ok(ListResponse::new(items, total, window))
    }

    pub async fn find_detail(&self, id: i64) -> Result<Option<VagaDetail>> {
        let sql = format!("{} WHERE v.id = $1", VAGA_DETAIL_SELECT);
        sqlx::query_as::<_, VagaDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar vaga", e))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<VagaDetail> {
        self.find_detail(id)
            .await?
            .ok_or_else(|| Error::NotFound("Vaga não encontrada".into()))
    }

    /// Next free code for the current year, derived from the highest existing one.
    pub async fn next_codigo(&self) -> Result<String> {
        let year = today().year();
        let pattern = format!("{}%", codigo_prefix(year));
        let last: Option<String> = sqlx::query_scalar(
            r#"
            SELECT codigo FROM vagas
            WHERE codigo LIKE $1
            ORDER BY LENGTH(codigo) DESC, codigo DESC
            LIMIT 1
            "#,
        )
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao gerar código da vaga", e))?;

        Ok(next_codigo(year, last.as_deref()))
    }

    pub async fn create(&self, payload: CreateVagaPayload, actor_id: i64) -> Result<VagaDetail> {
        ensure_one_of("tipo_cargo", &payload.tipo_cargo, &TIPOS_CARGO)?;
        ensure_opt_one_of("tipo_abertura", payload.tipo_abertura.as_deref(), &TIPOS_ABERTURA)?;
        ensure_opt_one_of("status", payload.status.as_deref(), &VAGA_STATUSES)?;
        ensure_opt_one_of(
            "fonte_recrutamento",
            payload.fonte_recrutamento.as_deref(),
            &FONTES_RECRUTAMENTO,
        )?;

        let status = payload.status.clone().unwrap_or_else(|| STATUS_ABERTA.to_string());
        let tipo_abertura = payload.tipo_abertura.clone().unwrap_or_else(|| "nova".to_string());
        let user_id = payload.user_id.unwrap_or(actor_id);
        let data_abertura = payload.data_abertura.unwrap_or_else(today);
        let closed_at = is_final_status(&status).then(now);

        for attempt in 1..=CODIGO_ATTEMPTS {
            let codigo = self.next_codigo().await?;
            let mut tx = self.pool.begin().await?;

            let inserted = sqlx::query_as::<_, Vaga>(
                r#"
                INSERT INTO vagas (
                    codigo, client_id, contract_id, user_id, cargo, tipo_cargo, tipo_abertura,
                    status, fonte_recrutamento, salario, pretensao_salarial, data_abertura,
                    data_fechamento_cancelamento, observacoes, porcentagem_faturamento,
                    valor_faturamento, sigilosa, imposto_estado, created_by, updated_by
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7,
                    $8, $9, $10, $11, $12,
                    $13, $14, $15,
                    $16, $17, $18, $19, $19
                )
                RETURNING *
                "#,
            )
            .bind(&codigo)
            .bind(payload.client_id)
            .bind(payload.contract_id)
            .bind(user_id)
            .bind(&payload.cargo)
            .bind(&payload.tipo_cargo)
            .bind(&tipo_abertura)
            .bind(&status)
            .bind(&payload.fonte_recrutamento)
            .bind(payload.salario)
            .bind(payload.pretensao_salarial)
            .bind(data_abertura)
            .bind(closed_at)
            .bind(&payload.observacoes)
            .bind(percent(payload.porcentagem_faturamento))
            .bind(payload.valor_faturamento)
            .bind(payload.sigilosa)
            .bind(percent(payload.imposto_estado))
            .bind(actor_id)
            .fetch_one(&mut *tx)
            .await;

            let vaga = match inserted {
                Ok(vaga) => vaga,
                Err(e) if is_codigo_collision(&e) => {
                    tracing::warn!(codigo = %codigo, attempt, "codigo already taken, retrying");
                    continue;
                }
                Err(e) => return Err(Error::store("Erro ao criar vaga", e)),
            };

            record_history(&mut tx, vaga.id, None, &status, Some("Vaga criada"), actor_id).await?;
            tx.commit().await?;

            tracing::info!(vaga_id = vaga.id, codigo = %vaga.codigo, "vaga created");
            return self.get_by_id(vaga.id).await;
        }

        Err(Error::Conflict(
            "Não foi possível gerar um código único para a vaga".into(),
        ))
    }

    pub async fn update(&self, id: i64, payload: UpdateVagaPayload, actor_id: i64) -> Result<VagaDetail> {
        ensure_opt_one_of("tipo_cargo", payload.tipo_cargo.as_deref(), &TIPOS_CARGO)?;
        ensure_opt_one_of("tipo_abertura", payload.tipo_abertura.as_deref(), &TIPOS_ABERTURA)?;
        ensure_opt_one_of("status", payload.status.as_deref(), &VAGA_STATUSES)?;
        ensure_opt_one_of(
            "fonte_recrutamento",
            payload.fonte_recrutamento.as_deref(),
            &FONTES_RECRUTAMENTO,
        )?;

        let mut tx = self.pool.begin().await?;
        let previous: Option<String> =
            sqlx::query_scalar("SELECT status FROM vagas WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| Error::store("Erro ao buscar vaga", e))?;
        let previous = previous.ok_or_else(|| Error::NotFound("Vaga não encontrada".into()))?;

        let closed_at = payload.status.as_deref().filter(|s| is_final_status(s)).map(|_| now());

        sqlx::query(
            r#"
            UPDATE vagas SET
                client_id = COALESCE($2, client_id),
                contract_id = COALESCE($3, contract_id),
                user_id = COALESCE($4, user_id),
                cargo = COALESCE($5, cargo),
                tipo_cargo = COALESCE($6, tipo_cargo),
                tipo_abertura = COALESCE($7, tipo_abertura),
                status = COALESCE($8, status),
                fonte_recrutamento = COALESCE($9, fonte_recrutamento),
                salario = COALESCE($10, salario),
                pretensao_salarial = COALESCE($11, pretensao_salarial),
                data_abertura = COALESCE($12, data_abertura),
                candidato_aprovado_id = COALESCE($13, candidato_aprovado_id),
                observacoes = COALESCE($14, observacoes),
                porcentagem_faturamento = COALESCE($15, porcentagem_faturamento),
                valor_faturamento = COALESCE($16, valor_faturamento),
                sigilosa = COALESCE($17, sigilosa),
                imposto_estado = COALESCE($18, imposto_estado),
                data_fechamento_cancelamento = COALESCE($19, data_fechamento_cancelamento),
                updated_by = $20,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.client_id)
        .bind(payload.contract_id)
        .bind(payload.user_id)
        .bind(&payload.cargo)
        .bind(&payload.tipo_cargo)
        .bind(&payload.tipo_abertura)
        .bind(&payload.status)
        .bind(&payload.fonte_recrutamento)
        .bind(payload.salario)
        .bind(payload.pretensao_salarial)
        .bind(payload.data_abertura)
        .bind(payload.candidato_aprovado_id)
        .bind(&payload.observacoes)
        .bind(percent(payload.porcentagem_faturamento))
        .bind(payload.valor_faturamento)
        .bind(payload.sigilosa)
        .bind(percent(payload.imposto_estado))
        .bind(closed_at)
        .bind(actor_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::store("Erro ao atualizar vaga", e))?;

        if let Some(status) = payload.status.as_deref().filter(|s| *s != previous) {
            record_history(&mut tx, id, Some(&previous), status, None, actor_id).await?;
        }
        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Writes any enumerated status; final statuses stamp the closure date.
    pub async fn update_status(
        &self,
        id: i64,
        payload: UpdateVagaStatusPayload,
        actor_id: i64,
    ) -> Result<VagaDetail> {
        ensure_one_of("status", &payload.status, &VAGA_STATUSES)?;

        let mut tx = self.pool.begin().await?;
        let previous: Option<String> =
            sqlx::query_scalar("SELECT status FROM vagas WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| Error::store("Erro ao buscar vaga", e))?;
        let previous = previous.ok_or_else(|| Error::NotFound("Vaga não encontrada".into()))?;

        let closed_at = is_final_status(&payload.status).then(now);
        sqlx::query(
            r#"
            UPDATE vagas SET
                status = $2,
                data_fechamento_cancelamento = COALESCE($3, data_fechamento_cancelamento),
                candidato_aprovado_id = COALESCE($4, candidato_aprovado_id),
                updated_by = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.status)
        .bind(closed_at)
        .bind(payload.candidato_aprovado_id)
        .bind(actor_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::store("Erro ao atualizar status da vaga", e))?;

        if previous != payload.status {
            record_history(
                &mut tx,
                id,
                Some(&previous),
                &payload.status,
                payload.motivo.as_deref(),
                actor_id,
            )
            .await?;
        }
        tx.commit().await?;

        tracing::info!(vaga_id = id, from = %previous, to = %payload.status, "vaga status changed");
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM vagas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao excluir vaga", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Vaga não encontrada".into()));
        }
        tracing::info!(vaga_id = id, "vaga deleted");
        Ok(())
    }

    pub async fn generate_public_link(
        &self,
        id: i64,
        payload: GerarLinkPublicoPayload,
        public_app_url: &str,
    ) -> Result<LinkPublicoResponse> {
        let token = generate_public_token();
        let expires_at = payload.expires_in_days.map(|days| now() + Duration::days(days));

        let row: Option<(i64, bool)> = sqlx::query_as(
            r#"
            UPDATE vagas
            SET unique_token = $2, token_expires_at = $3, is_public = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, is_public
            "#,
        )
        .bind(id)
        .bind(&token)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao gerar link público", e))?;
        let (id, is_public) = row.ok_or_else(|| Error::NotFound("Vaga não encontrada".into()))?;

        tracing::info!(vaga_id = id, "public link generated");
        Ok(LinkPublicoResponse {
            id,
            public_url: format!(
                "{}/vagas/publico/{}",
                public_app_url.trim_end_matches('/'),
                token
            ),
            unique_token: token,
            token_expires_at: expires_at,
            is_public,
        })
    }

    pub async fn remove_public_link(&self, id: i64) -> Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE vagas
            SET unique_token = NULL, token_expires_at = NULL, is_public = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao remover link público", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Vaga não encontrada".into()));
        }
        Ok(())
    }

    /// Resolves a public token; unpublished or expired links are not found.
    pub async fn find_public(&self, token: &str) -> Result<VagaDetail> {
        let sql = format!(
            "{} WHERE v.unique_token = $1 AND v.is_public \
             AND (v.token_expires_at IS NULL OR v.token_expires_at > NOW())",
            VAGA_DETAIL_SELECT
        );
        sqlx::query_as::<_, VagaDetail>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar vaga pública", e))?
            .ok_or_else(|| Error::NotFound("Link público inválido ou expirado".into()))
    }

    pub async fn status_history(&self, vaga_id: i64) -> Result<Vec<VagaStatusHistory>> {
        let sql = format!("{} WHERE h.vaga_id = $1 ORDER BY h.changed_at DESC, h.id DESC", HISTORY_SELECT);
        sqlx::query_as::<_, VagaStatusHistory>(&sql)
            .bind(vaga_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar histórico da vaga", e))
    }

    pub async fn public_status_history(&self, token: &str) -> Result<Vec<VagaStatusHistory>> {
        let vaga = self.find_public(token).await?;
        self.status_history(vaga.vaga.id).await
    }

    pub async fn linked_candidatos(&self, vaga_id: i64) -> Result<Vec<VagaCandidatoDetail>> {
        let sql = format!(
            "{} WHERE vc.vaga_id = $1 ORDER BY vc.data_inscricao DESC",
            VAGA_CANDIDATO_SELECT
        );
        sqlx::query_as::<_, VagaCandidatoDetail>(&sql)
            .bind(vaga_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar candidatos da vaga", e))
    }

    pub async fn entrevistas(&self, vaga_id: i64) -> Result<Vec<EntrevistaDetail>> {
        let sql = format!(
            "{} WHERE vc.vaga_id = $1 ORDER BY e.data_entrevista, e.hora_entrevista",
            ENTREVISTA_SELECT
        );
        sqlx::query_as::<_, EntrevistaDetail>(&sql)
            .bind(vaga_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar entrevistas da vaga", e))
    }

    pub async fn candidatos_com_entrevistas(
        &self,
        vaga_id: i64,
    ) -> Result<Vec<VagaCandidatoComEntrevistas>> {
        self.get_by_id(vaga_id).await?;
        let candidatos = self.linked_candidatos(vaga_id).await?;
        let entrevistas = self.entrevistas(vaga_id).await?;
        Ok(group_entrevistas(candidatos, entrevistas))
    }

    pub async fn vincular_candidato(
        &self,
        vaga_id: i64,
        payload: VincularCandidatoPayload,
    ) -> Result<VagaCandidatoDetail> {
        ensure_opt_one_of("status", payload.status.as_deref(), &VAGA_CANDIDATO_STATUSES)?;
        self.get_by_id(vaga_id).await?;

        let status = payload.status.unwrap_or_else(|| "inscrito".to_string());
        let link_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO vaga_candidatos (vaga_id, candidato_id, status, observacoes)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(vaga_id)
        .bind(payload.candidato_id)
        .bind(&status)
        .bind(&payload.observacoes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return Error::Conflict("Candidato já vinculado a esta vaga".into());
                }
                if db.is_foreign_key_violation() {
                    return Error::NotFound("Candidato não encontrado".into());
                }
            }
            Error::store("Erro ao vincular candidato", e)
        })?;

        tracing::info!(vaga_id, candidato_id = payload.candidato_id, "candidato linked");
        let sql = format!("{} WHERE vc.id = $1", VAGA_CANDIDATO_SELECT);
        sqlx::query_as::<_, VagaCandidatoDetail>(&sql)
            .bind(link_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar vínculo", e))
    }

    pub async fn desvincular_candidato(&self, vaga_id: i64, candidato_id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM vaga_candidatos WHERE vaga_id = $1 AND candidato_id = $2")
            .bind(vaga_id)
            .bind(candidato_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao desvincular candidato", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Vínculo não encontrado".into()));
        }
        Ok(())
    }

    pub async fn statistics(&self, query: VagaStatisticsQuery) -> Result<VagaStatistics> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT v.* FROM vagas v WHERE 1 = 1");
        if let Some(client_id) = query.client_id {
            qb.push(" AND v.client_id = ").push_bind(client_id);
        }
        if let Some(user_id) = query.user_id {
            qb.push(" AND v.user_id = ").push_bind(user_id);
        }
        if let Some(from) = query.date_from {
            qb.push(" AND v.data_abertura >= ").push_bind(from);
        }
        if let Some(to) = query.date_to {
            qb.push(" AND v.data_abertura <= ").push_bind(to);
        }
        let rows = qb
            .build_query_as::<Vaga>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao calcular estatísticas de vagas", e))?;

        Ok(vaga_statistics(&rows, today()))
    }

    /// Every vaga matching the report filters, newest opening first.
    pub async fn report_rows(&self, filter: &VagaReportFilter) -> Result<Vec<VagaDetail>> {
        let mut qb = QueryBuilder::<Postgres>::new(VAGA_DETAIL_SELECT);
        qb.push(" WHERE 1 = 1");
        if let Some(client_id) = filter.client_id {
            qb.push(" AND v.client_id = ").push_bind(client_id);
        }
        if let Some(user_id) = filter.user_id {
            qb.push(" AND v.user_id = ").push_bind(user_id);
        }
        if let Some(status) = filter.status.as_deref() {
            qb.push(" AND v.status = ").push_bind(status.to_string());
        }
        qb.push(" ORDER BY v.data_abertura DESC, v.id DESC");

        qb.build_query_as::<VagaDetail>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar vagas", e))
    }
}

async fn record_history(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    vaga_id: i64,
    previous: Option<&str>,
    status: &str,
    motivo: Option<&str>,
    actor_id: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO vaga_status_history (vaga_id, status_anterior, status_novo, motivo, changed_by)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(vaga_id)
    .bind(previous)
    .bind(status)
    .bind(motivo)
    .bind(actor_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| Error::store("Erro ao registrar histórico da vaga", e))?;
    Ok(())
}

fn group_entrevistas(
    candidatos: Vec<VagaCandidatoDetail>,
    entrevistas: Vec<EntrevistaDetail>,
) -> Vec<VagaCandidatoComEntrevistas> {
    let mut by_link: HashMap<i64, Vec<EntrevistaDetail>> = HashMap::new();
    for e in entrevistas {
        by_link.entry(e.entrevista.vaga_candidato_id).or_default().push(e);
    }
    candidatos
        .into_iter()
        .map(|candidato| VagaCandidatoComEntrevistas {
            entrevistas: by_link.remove(&candidato.link.id).unwrap_or_default(),
            candidato,
        })
        .collect()
}

#[async_trait]
impl VagaSource for VagaService {
    async fn fetch_vagas(&self, filter: &VagaReportFilter) -> Result<Vec<VagaDetail>> {
        self.report_rows(filter).await
    }

    async fn client_name(&self, client_id: i64) -> Result<Option<String>> {
        let name: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT COALESCE(NULLIF(pj.company_name, ''), NULLIF(pf.full_name, ''))
            FROM clients c
            LEFT JOIN clients_pj pj ON pj.client_id = c.id
            LEFT JOIN clients_pf pf ON pf.client_id = c.id
            WHERE c.id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao buscar cliente", e))?;
        Ok(name.flatten())
    }

    async fn user_name(&self, user_id: i64) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar consultora", e))
    }

    async fn vaga_detail(&self, vaga_id: i64) -> Result<Option<VagaDetail>> {
        self.find_detail(vaga_id).await
    }

    async fn vaga_candidatos(&self, vaga_id: i64) -> Result<Vec<VagaCandidatoDetail>> {
        self.linked_candidatos(vaga_id).await
    }

    async fn vaga_entrevistas(&self, vaga_id: i64) -> Result<Vec<EntrevistaDetail>> {
        self.entrevistas(vaga_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidato::VagaCandidato;
    use crate::models::entrevista::Entrevista;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn link(id: i64, nome: &str) -> VagaCandidatoDetail {
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        VagaCandidatoDetail {
            link: VagaCandidato {
                id,
                vaga_id: 1,
                candidato_id: id * 10,
                status: "inscrito".into(),
                data_inscricao: at,
                observacoes: None,
                created_at: at,
                updated_at: at,
            },
            candidato_nome: nome.into(),
            candidato_email: None,
            candidato_telefone: None,
            candidato_status: "pendente".into(),
        }
    }

    fn entrevista(id: i64, vaga_candidato_id: i64) -> EntrevistaDetail {
        let at = Utc.with_ymd_and_hms(2024, 1, 12, 0, 0, 0).unwrap();
        EntrevistaDetail {
            entrevista: Entrevista {
                id,
                vaga_candidato_id,
                data_entrevista: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                hora_entrevista: "14:00".into(),
                status: "agendada".into(),
                link_chamada: None,
                observacoes: None,
                entrevistador_id: None,
                created_by: None,
                created_at: at,
                updated_at: at,
            },
            candidato_nome: None,
            entrevistador_nome: None,
        }
    }

    #[test]
    fn interviews_are_grouped_under_their_link() {
        let grouped = group_entrevistas(
            vec![link(1, "Ana"), link(2, "Bruno")],
            vec![entrevista(10, 2), entrevista(11, 1), entrevista(12, 2)],
        );
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].candidato.candidato_nome, "Ana");
        assert_eq!(grouped[0].entrevistas.len(), 1);
        assert_eq!(grouped[1].entrevistas.len(), 2);
    }

    #[test]
    fn candidate_without_interviews_gets_empty_list() {
        let grouped = group_entrevistas(vec![link(3, "Carla")], vec![entrevista(1, 99)]);
        assert!(grouped[0].entrevistas.is_empty());
    }

    #[test]
    fn grouped_link_serializes_flat() {
        let grouped = group_entrevistas(vec![link(1, "Ana")], Vec::new());
        let json = serde_json::to_value(&grouped[0]).unwrap();
        assert_eq!(json["candidato_nome"], "Ana");
        assert_eq!(json["vaga_id"], 1);
        assert!(json["entrevistas"].as_array().unwrap().is_empty());
    }

    #[test]
    fn percent_rounds_to_two_places() {
        assert_eq!(percent(Some(7.25)), Some(Decimal::new(725, 2)));
        assert_eq!(percent(Some(1.0 / 3.0)), Some(Decimal::new(33, 2)));
        assert_eq!(percent(None), None);
    }

    #[test]
    fn only_codigo_unique_violations_are_retried() {
        assert!(!is_codigo_collision(&sqlx::Error::RowNotFound));
    }
}
