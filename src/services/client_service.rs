use std::path::Path;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::client_dto::{
    ClientListQuery, CreateClientPayload, UpdateClientPayload, CLIENT_TYPE_PF, CLIENT_TYPE_PJ,
};
use crate::dto::{ensure_one_of, ensure_opt_one_of, ListResponse, PageWindow};
use crate::error::{Error, Result};
use crate::models::client::ClientDetail;
use crate::services::attachment_service::{check_upload, save_upload, IMAGE_EXTENSIONS};

const CLIENT_DETAIL_SELECT: &str = r#"
    SELECT c.*, pf.cpf, pf.full_name, pj.cnpj, pj.company_name, pj.trade_name
    FROM clients c
    LEFT JOIN clients_pf pf ON pf.client_id = c.id
    LEFT JOIN clients_pj pj ON pj.client_id = c.id
"#;

#[derive(Clone)]
pub struct ClientService {
    pool: PgPool,
    uploads_dir: String,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ClientListQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(kind) = query.client_type.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND c.client_type = ").push_bind(kind.to_string());
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (");
        let mut columns = qb.separated(" OR ");
        for column in [
            "pf.full_name",
            "pj.company_name",
            "pj.trade_name",
            "c.email",
            "pf.cpf",
            "pj.cnpj",
        ] {
            columns.push(format!("{} ILIKE ", column));
            columns.push_bind_unseparated(pattern.clone());
        }
        qb.push(")");
    }
}

/// PF needs CPF and name, PJ needs CNPJ and company name.
fn check_subtype_fields(payload: &CreateClientPayload) -> Result<()> {
    let present = |v: &Option<String>| v.as_deref().map(str::trim).is_some_and(|s| !s.is_empty());
    let ok = if payload.client_type == CLIENT_TYPE_PF {
        present(&payload.cpf) && present(&payload.full_name)
    } else {
        present(&payload.cnpj) && present(&payload.company_name)
    };
    if ok {
        Ok(())
    } else if payload.client_type == CLIENT_TYPE_PF {
        Err(Error::BadRequest("CPF e nome completo são obrigatórios para pessoa física".into()))
    } else {
        Err(Error::BadRequest("CNPJ e razão social são obrigatórios para pessoa jurídica".into()))
    }
}

impl ClientService {
    pub fn new(pool: PgPool, uploads_dir: String) -> Self {
        Self { pool, uploads_dir }
    }

    pub async fn list(&self, query: ClientListQuery) -> Result<ListResponse<ClientDetail>> {
        ensure_opt_one_of(
            "client_type",
            query.client_type.as_deref().filter(|s| !s.is_empty()),
            &[CLIENT_TYPE_PF, CLIENT_TYPE_PJ],
        )?;
        let window = PageWindow::resolve(query.page, query.per_page);

        let mut items_qb = QueryBuilder::<Postgres>::new(CLIENT_DETAIL_SELECT);
        push_filters(&mut items_qb, &query);
        items_qb
            .push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let items = items_qb
            .build_query_as::<ClientDetail>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar clientes", e))?;

        let mut count_qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM clients c \
             LEFT JOIN clients_pf pf ON pf.client_id = c.id \
             LEFT JOIN clients_pj pj ON pj.client_id = c.id",
        );
        push_filters(&mut count_qb, &query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao contar clientes", e))?;

        Ok(ListResponse::new(items, total, window))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ClientDetail> {
        let sql = format!("{} WHERE c.id = $1", CLIENT_DETAIL_SELECT);
        sqlx::query_as::<_, ClientDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar cliente", e))?
            .ok_or_else(|| Error::NotFound("Cliente não encontrado".into()))
    }

    /// Base row and PF/PJ row are written in one transaction.
    pub async fn create(&self, payload: CreateClientPayload, actor_id: i64) -> Result<ClientDetail> {
        ensure_one_of("client_type", &payload.client_type, &[CLIENT_TYPE_PF, CLIENT_TYPE_PJ])?;
        check_subtype_fields(&payload)?;

        let contact = &payload.contact;
        let mut tx = self.pool.begin().await?;
        let client_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO clients (
                client_type, email, phone, street, number, complement,
                neighborhood, city, state, zipcode, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&payload.client_type)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.street)
        .bind(&contact.number)
        .bind(&contact.complement)
        .bind(&contact.neighborhood)
        .bind(&contact.city)
        .bind(&contact.state)
        .bind(&contact.zipcode)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Error::store("Erro ao criar cliente", e))?;

        let subtype = if payload.client_type == CLIENT_TYPE_PF {
            sqlx::query("INSERT INTO clients_pf (client_id, cpf, full_name) VALUES ($1, $2, $3)")
                .bind(client_id)
                .bind(&payload.cpf)
                .bind(&payload.full_name)
                .execute(&mut *tx)
                .await
        } else {
            sqlx::query(
                "INSERT INTO clients_pj (client_id, cnpj, company_name, trade_name) VALUES ($1, $2, $3, $4)",
            )
            .bind(client_id)
            .bind(&payload.cnpj)
            .bind(&payload.company_name)
            .bind(&payload.trade_name)
            .execute(&mut *tx)
            .await
        };
        if let Err(e) = subtype {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    let document = if payload.client_type == CLIENT_TYPE_PF { "CPF" } else { "CNPJ" };
                    return Err(Error::Conflict(format!("{} já cadastrado", document)));
                }
            }
            return Err(Error::store("Erro ao criar cliente", e));
        }
        tx.commit().await?;

        tracing::info!(client_id, client_type = %payload.client_type, "client created");
        self.get_by_id(client_id).await
    }

    pub async fn update(&self, id: i64, payload: UpdateClientPayload) -> Result<ClientDetail> {
        let current = self.get_by_id(id).await?;
        let contact = &payload.contact;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            UPDATE clients SET
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                street = COALESCE($4, street),
                number = COALESCE($5, number),
                complement = COALESCE($6, complement),
                neighborhood = COALESCE($7, neighborhood),
                city = COALESCE($8, city),
                state = COALESCE($9, state),
                zipcode = COALESCE($10, zipcode),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.street)
        .bind(&contact.number)
        .bind(&contact.complement)
        .bind(&contact.neighborhood)
        .bind(&contact.city)
        .bind(&contact.state)
        .bind(&contact.zipcode)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::store("Erro ao atualizar cliente", e))?;

        if current.client.client_type == CLIENT_TYPE_PF {
            sqlx::query("UPDATE clients_pf SET full_name = COALESCE($2, full_name) WHERE client_id = $1")
                .bind(id)
                .bind(&payload.full_name)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::store("Erro ao atualizar cliente", e))?;
        } else {
            sqlx::query(
                r#"
                UPDATE clients_pj SET
                    company_name = COALESCE($2, company_name),
                    trade_name = COALESCE($3, trade_name)
                WHERE client_id = $1
                "#,
            )
            .bind(id)
            .bind(&payload.company_name)
            .bind(&payload.trade_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::store("Erro ao atualizar cliente", e))?;
        }
        tx.commit().await?;

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return Error::Conflict(
                            "Cliente possui contratos ou vagas vinculados".into(),
                        );
                    }
                }
                Error::store("Erro ao excluir cliente", e)
            })?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Cliente não encontrado".into()));
        }
        tracing::info!(client_id = id, "client deleted");
        Ok(())
    }

    /// Replaces the client's logo; the previous file is removed.
    pub async fn update_logo(&self, id: i64, filename: &str, data: &[u8]) -> Result<ClientDetail> {
        let current = self.get_by_id(id).await?;
        let ext = check_upload(filename, data, &IMAGE_EXTENSIONS)?;
        let stored = save_upload(&self.uploads_dir, "logos", &ext, data).await?;

        sqlx::query("UPDATE clients SET logo_path = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(&stored)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao salvar logo do cliente", e))?;

        if let Some(old) = current.client.logo_path {
            if let Err(e) = tokio::fs::remove_file(Path::new(&self.uploads_dir).join(&old)).await {
                tracing::warn!(error = %e, client_id = id, "previous logo not removed");
            }
        }
        self.get_by_id(id).await
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao contar clientes", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> CreateClientPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn pf_requires_cpf_and_name() {
        assert!(check_subtype_fields(&payload(
            r#"{"client_type":"pf","cpf":"12345678901","full_name":"Ana Souza"}"#
        ))
        .is_ok());
        assert!(check_subtype_fields(&payload(r#"{"client_type":"pf","cpf":"12345678901"}"#)).is_err());
    }

    #[test]
    fn pj_requires_cnpj_and_company() {
        assert!(check_subtype_fields(&payload(
            r#"{"client_type":"pj","cnpj":"12345678000199","company_name":"ACME"}"#
        ))
        .is_ok());
        let err = check_subtype_fields(&payload(
            r#"{"client_type":"pj","cnpj":"12345678000199","company_name":"  "}"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("CNPJ"));
    }
}
