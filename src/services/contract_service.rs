use std::collections::BTreeMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::contract_dto::{
    AttachServicePayload, BulkStageResult, ContractListQuery, CreateContractPayload,
    UpdateContractPayload, UpdateStagePayload, CONTRACT_STATUSES,
};
use crate::dto::{ensure_one_of, ensure_opt_one_of, ListResponse, PageWindow};
use crate::error::{Error, Result};
use crate::models::contract::{
    ContractDetail, ContractServiceDetail, ContractServiceStage, STAGE_COMPLETED, STAGE_PENDING,
};

const CONTRACT_DETAIL_SELECT: &str = r#"
    SELECT ct.*,
           COALESCE(NULLIF(pj.company_name, ''), NULLIF(pf.full_name, '')) AS client_name
    FROM contracts ct
    LEFT JOIN clients_pj pj ON pj.client_id = ct.client_id
    LEFT JOIN clients_pf pf ON pf.client_id = ct.client_id
"#;

const CONTRACT_SERVICE_SELECT: &str = r#"
    SELECT cs.*, s.name AS service_name
    FROM contract_services cs
    JOIN services s ON s.id = cs.service_id
"#;

/// Progress of a contract service derived from its stages.
pub fn rollup_status(completed: i64, total: i64) -> &'static str {
    if total > 0 && completed >= total {
        "completed"
    } else if completed > 0 {
        "in_progress"
    } else {
        "not_started"
    }
}

#[derive(Clone)]
pub struct ContractService {
    pool: PgPool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ContractListQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(client_id) = query.client_id {
        qb.push(" AND ct.client_id = ").push_bind(client_id);
    }
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND ct.status = ").push_bind(status.to_string());
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (ct.contract_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR pj.company_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR pf.full_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn duplicate_number(e: sqlx::Error, context: &str) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return Error::Conflict("Número de contrato já existe".into());
        }
        if db.is_foreign_key_violation() {
            return Error::BadRequest("Cliente não encontrado".into());
        }
    }
    Error::store(context, e)
}

impl ContractService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: ContractListQuery) -> Result<ListResponse<ContractDetail>> {
        let window = PageWindow::resolve(query.page, query.per_page);

        let mut items_qb = QueryBuilder::<Postgres>::new(CONTRACT_DETAIL_SELECT);
        push_filters(&mut items_qb, &query);
        items_qb
            .push(" ORDER BY ct.created_at DESC LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let items = items_qb
            .build_query_as::<ContractDetail>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar contratos", e))?;

        let mut count_qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM contracts ct \
             LEFT JOIN clients_pj pj ON pj.client_id = ct.client_id \
             LEFT JOIN clients_pf pf ON pf.client_id = ct.client_id",
        );
        push_filters(&mut count_qb, &query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao contar contratos", e))?;

        Ok(ListResponse::new(items, total, window))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ContractDetail> {
        let sql = format!("{} WHERE ct.id = $1", CONTRACT_DETAIL_SELECT);
        sqlx::query_as::<_, ContractDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar contrato", e))?
            .ok_or_else(|| Error::NotFound("Contrato não encontrado".into()))
    }

    pub async fn create(&self, payload: CreateContractPayload, actor_id: i64) -> Result<ContractDetail> {
        ensure_opt_one_of("status", payload.status.as_deref(), &CONTRACT_STATUSES)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contracts (
                contract_number, client_id, contract_type, status, start_date, end_date,
                total_value, payment_method, notes, created_by
            ) VALUES ($1, $2, $3, COALESCE($4, 'active'), $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(payload.contract_number.trim())
        .bind(payload.client_id)
        .bind(&payload.contract_type)
        .bind(&payload.status)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.total_value)
        .bind(&payload.payment_method)
        .bind(&payload.notes)
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_number(e, "Erro ao criar contrato"))?;

        tracing::info!(contract_id = id, "contract created");
        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i64, payload: UpdateContractPayload) -> Result<ContractDetail> {
        ensure_opt_one_of("status", payload.status.as_deref(), &CONTRACT_STATUSES)?;

        let res = sqlx::query(
            r#"
            UPDATE contracts SET
                contract_number = COALESCE($2, contract_number),
                client_id = COALESCE($3, client_id),
                contract_type = COALESCE($4, contract_type),
                status = COALESCE($5, status),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                total_value = COALESCE($8, total_value),
                payment_method = COALESCE($9, payment_method),
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.contract_number)
        .bind(payload.client_id)
        .bind(&payload.contract_type)
        .bind(&payload.status)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.total_value)
        .bind(&payload.payment_method)
        .bind(&payload.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_number(e, "Erro ao atualizar contrato"))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Contrato não encontrado".into()));
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao excluir contrato", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Contrato não encontrado".into()));
        }
        tracing::info!(contract_id = id, "contract deleted");
        Ok(())
    }

    /// Adds a service to the contract and copies the service's stage templates onto it.
    pub async fn attach_service(
        &self,
        contract_id: i64,
        payload: AttachServicePayload,
    ) -> Result<ContractServiceDetail> {
        self.get_by_id(contract_id).await?;

        let mut tx = self.pool.begin().await?;
        let contract_service_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO contract_services (contract_id, service_id, unit_value, quantity)
            SELECT $1, s.id, COALESCE($3, s.value), COALESCE($4, 1)
            FROM services s
            WHERE s.id = $2
            RETURNING id
            "#,
        )
        .bind(contract_id)
        .bind(payload.service_id)
        .bind(payload.unit_value)
        .bind(payload.quantity)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Error::store("Erro ao adicionar serviço ao contrato", e))?;
        let contract_service_id =
            contract_service_id.ok_or_else(|| Error::NotFound("Serviço não encontrado".into()))?;

        let copied = sqlx::query(
            r#"
            INSERT INTO contract_service_stages (contract_service_id, name, sort_order)
            SELECT $1, name, sort_order
            FROM service_stages
            WHERE service_id = $2
            ORDER BY sort_order, id
            "#,
        )
        .bind(contract_service_id)
        .bind(payload.service_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::store("Erro ao copiar etapas do serviço", e))?;
        tx.commit().await?;

        tracing::info!(
            contract_id,
            contract_service_id,
            stages = copied.rows_affected(),
            "service attached to contract"
        );
        self.get_contract_service(contract_service_id).await
    }

    pub async fn get_contract_service(&self, id: i64) -> Result<ContractServiceDetail> {
        let sql = format!("{} WHERE cs.id = $1", CONTRACT_SERVICE_SELECT);
        sqlx::query_as::<_, ContractServiceDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar serviço do contrato", e))?
            .ok_or_else(|| Error::NotFound("Serviço do contrato não encontrado".into()))
    }

    pub async fn list_services(&self, contract_id: i64) -> Result<Vec<ContractServiceDetail>> {
        let sql = format!("{} WHERE cs.contract_id = $1 ORDER BY cs.id", CONTRACT_SERVICE_SELECT);
        sqlx::query_as::<_, ContractServiceDetail>(&sql)
            .bind(contract_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar serviços do contrato", e))
    }

    pub async fn stages(&self, contract_service_id: i64) -> Result<Vec<ContractServiceStage>> {
        sqlx::query_as::<_, ContractServiceStage>(
            r#"
            SELECT * FROM contract_service_stages
            WHERE contract_service_id = $1
            ORDER BY sort_order, id
            "#,
        )
        .bind(contract_service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao buscar etapas", e))
    }

    pub async fn update_stage(&self, stage_id: i64, payload: UpdateStagePayload) -> Result<ContractServiceStage> {
        ensure_one_of("status", &payload.status, &[STAGE_PENDING, STAGE_COMPLETED])?;

        let stage = sqlx::query_as::<_, ContractServiceStage>(
            r#"
            UPDATE contract_service_stages SET
                status = $2,
                completed_at = CASE WHEN $2 = 'completed' THEN COALESCE(completed_at, NOW()) ELSE NULL END,
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(stage_id)
        .bind(&payload.status)
        .bind(&payload.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao atualizar etapa", e))?
        .ok_or_else(|| Error::NotFound("Etapa não encontrada".into()))?;

        self.refresh_rollup(stage.contract_service_id).await?;
        Ok(stage)
    }

    /// Completes each pending stage on its own; failures are counted, not propagated.
    pub async fn complete_all_stages(&self, contract_service_id: i64) -> Result<BulkStageResult> {
        self.get_contract_service(contract_service_id).await?;
        let pending: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM contract_service_stages WHERE contract_service_id = $1 AND status = $2 ORDER BY sort_order, id",
        )
        .bind(contract_service_id)
        .bind(STAGE_PENDING)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao buscar etapas", e))?;

        let mut result = BulkStageResult::default();
        for stage_id in pending {
            let outcome = sqlx::query(
                r#"
                UPDATE contract_service_stages
                SET status = 'completed', completed_at = NOW(), updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(stage_id)
            .execute(&self.pool)
            .await;
            match outcome {
                Ok(_) => result.success += 1,
                Err(e) => {
                    tracing::error!(error = %e, stage_id, "failed to complete stage");
                    result.errors += 1;
                }
            }
        }

        self.refresh_rollup(contract_service_id).await?;
        tracing::info!(
            contract_service_id,
            success = result.success,
            errors = result.errors,
            "bulk stage completion finished"
        );
        Ok(result)
    }

    async fn refresh_rollup(&self, contract_service_id: i64) -> Result<()> {
        let (completed, total): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'completed'), COUNT(*)
            FROM contract_service_stages
            WHERE contract_service_id = $1
            "#,
        )
        .bind(contract_service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao calcular progresso do serviço", e))?;

        sqlx::query("UPDATE contract_services SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(contract_service_id)
            .bind(rollup_status(completed, total))
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao atualizar progresso do serviço", e))?;
        Ok(())
    }

    pub async fn count_by_status(&self) -> Result<BTreeMap<String, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM contracts GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| Error::store("Erro ao contar contratos", e))?;
        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollup_follows_stage_completion() {
        assert_eq!(rollup_status(0, 0), "not_started");
        assert_eq!(rollup_status(0, 4), "not_started");
        assert_eq!(rollup_status(2, 4), "in_progress");
        assert_eq!(rollup_status(4, 4), "completed");
    }
}
