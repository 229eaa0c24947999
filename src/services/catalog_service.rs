use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::service_dto::{
    CreateServicePayload, CreateServiceStagePayload, ServiceListQuery, UpdateServicePayload,
};
use crate::dto::{ListResponse, PageWindow};
use crate::error::{Error, Result};
use crate::models::service::{Service, ServiceStage};

/// Catalog of sellable services and the stage templates copied onto contracts.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ServiceListQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(active) = query.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: ServiceListQuery) -> Result<ListResponse<Service>> {
        let window = PageWindow::resolve(query.page, query.per_page);

        let mut items_qb = QueryBuilder::<Postgres>::new("SELECT * FROM services");
        push_filters(&mut items_qb, &query);
        items_qb
            .push(" ORDER BY name LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let items = items_qb
            .build_query_as::<Service>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar serviços", e))?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM services");
        push_filters(&mut count_qb, &query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao contar serviços", e))?;

        Ok(ListResponse::new(items, total, window))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Service> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar serviço", e))?
            .ok_or_else(|| Error::NotFound("Serviço não encontrado".into()))
    }

    pub async fn create(&self, payload: CreateServicePayload) -> Result<Service> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, category, description, value, duration_days, is_active)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE))
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.category)
        .bind(&payload.description)
        .bind(payload.value)
        .bind(payload.duration_days)
        .bind(payload.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao criar serviço", e))?;

        tracing::info!(service_id = service.id, "service created");
        Ok(service)
    }

    pub async fn update(&self, id: i64, payload: UpdateServicePayload) -> Result<Service> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                description = COALESCE($4, description),
                value = COALESCE($5, value),
                duration_days = COALESCE($6, duration_days),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.category)
        .bind(&payload.description)
        .bind(payload.value)
        .bind(payload.duration_days)
        .bind(payload.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao atualizar serviço", e))?
        .ok_or_else(|| Error::NotFound("Serviço não encontrado".into()))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return Error::Conflict("Serviço está vinculado a contratos".into());
                    }
                }
                Error::store("Erro ao excluir serviço", e)
            })?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Serviço não encontrado".into()));
        }
        Ok(())
    }

    pub async fn stages(&self, service_id: i64) -> Result<Vec<ServiceStage>> {
        sqlx::query_as::<_, ServiceStage>(
            "SELECT * FROM service_stages WHERE service_id = $1 ORDER BY sort_order, id",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao buscar etapas do serviço", e))
    }

    /// Without an explicit order the stage is appended after the last one.
    pub async fn add_stage(&self, service_id: i64, payload: CreateServiceStagePayload) -> Result<ServiceStage> {
        self.get_by_id(service_id).await?;
        sqlx::query_as::<_, ServiceStage>(
            r#"
            INSERT INTO service_stages (service_id, name, sort_order)
            VALUES (
                $1, $2,
                COALESCE($3, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM service_stages WHERE service_id = $1))
            )
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(payload.name.trim())
        .bind(payload.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao criar etapa do serviço", e))
    }

    pub async fn delete_stage(&self, stage_id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM service_stages WHERE id = $1")
            .bind(stage_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao excluir etapa do serviço", e))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Etapa não encontrada".into()));
        }
        Ok(())
    }
}
