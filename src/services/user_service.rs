use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::auth_dto::{LoginPayload, LoginResponse};
use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UserListQuery};
use crate::dto::{ensure_opt_one_of, ListResponse, PageWindow};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::{User, UserSummary, ALL_ROLES, ROLE_USER};
use crate::utils::crypto::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Email ou senha inválidos";

/// Signs an HS256 token for `user` valid for `hours`.
pub fn issue_token(user: &User, secret: &str, hours: i64) -> Result<String> {
    let exp = (Utc::now() + Duration::hours(hours)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        exp,
        role: Some(user.role.clone()),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

fn hash(plain: &str) -> Result<String> {
    hash_password(plain).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        Error::Internal("Falha ao processar senha".into())
    })
}

fn duplicate_email(e: sqlx::Error, context: &str) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return Error::Conflict("Email já cadastrado".into());
        }
    }
    Error::store(context, e)
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &UserListQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(role) = query.role.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND role = ").push_bind(role.to_string());
    }
    if let Some(active) = query.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn login(&self, payload: LoginPayload, secret: &str, hours: i64) -> Result<LoginResponse> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(payload.email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar usuário", e))?;

        let Some(user) = user else {
            tracing::warn!(email = %payload.email, "login with unknown email");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.into()));
        };
        let matches = verify_password(&payload.password, &user.password_hash).map_err(|e| {
            tracing::error!(error = %e, user_id = user.id, "stored password hash is malformed");
            Error::Unauthorized(INVALID_CREDENTIALS.into())
        })?;
        if !matches {
            tracing::warn!(user_id = user.id, "login with wrong password");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        if !user.is_active {
            return Err(Error::Forbidden("Usuário inativo".into()));
        }

        let token = issue_token(&user, secret, hours)?;
        self.touch_activity(user.id).await;
        tracing::info!(user_id = user.id, role = %user.role, "user logged in");
        Ok(LoginResponse {
            token,
            token_type: "Bearer",
            expires_in: hours * 3600,
            user,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar usuário", e))?
            .ok_or_else(|| Error::NotFound("Usuário não encontrado".into()))
    }

    pub async fn list(&self, query: UserListQuery) -> Result<ListResponse<User>> {
        let window = PageWindow::resolve(query.page, query.per_page);

        let mut items_qb = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_filters(&mut items_qb, &query);
        items_qb
            .push(" ORDER BY name LIMIT ")
            .push_bind(window.per_page)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let items = items_qb
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao buscar usuários", e))?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count_qb, &query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store("Erro ao contar usuários", e))?;

        Ok(ListResponse::new(items, total, window))
    }

    /// Active users that can be assigned as interviewers.
    pub async fn entrevistadores(&self) -> Result<Vec<UserSummary>> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name FROM users WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::store("Erro ao buscar entrevistadores", e))
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        ensure_opt_one_of("role", payload.role.as_deref(), &ALL_ROLES)?;
        let password_hash = hash(&payload.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, LOWER($2), $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.email.trim())
        .bind(password_hash)
        .bind(payload.role.as_deref().unwrap_or(ROLE_USER))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_email(e, "Erro ao criar usuário"))?;

        tracing::info!(user_id = user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub async fn update(&self, id: i64, payload: UpdateUserPayload) -> Result<User> {
        ensure_opt_one_of("role", payload.role.as_deref(), &ALL_ROLES)?;
        let password_hash = payload.password.as_deref().map(hash).transpose()?;

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE(LOWER($3), email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(password_hash)
        .bind(&payload.role)
        .bind(payload.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_email(e, "Erro ao atualizar usuário"))?
        .ok_or_else(|| Error::NotFound("Usuário não encontrado".into()))
    }

    pub async fn delete(&self, id: i64, actor_id: i64) -> Result<()> {
        if id == actor_id {
            return Err(Error::BadRequest("Não é possível excluir o próprio usuário".into()));
        }
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return Error::Conflict(
                            "Usuário possui registros vinculados; desative-o".into(),
                        );
                    }
                }
                Error::store("Erro ao excluir usuário", e)
            })?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Usuário não encontrado".into()));
        }
        Ok(())
    }

    /// Best effort; a failure here never blocks the request.
    pub async fn touch_activity(&self, id: i64) {
        if let Err(e) = sqlx::query("UPDATE users SET last_activity_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            tracing::warn!(error = %e, user_id = id, "failed to record user activity");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_token;

    fn user(role: &str) -> User {
        User {
            id: 42,
            name: "Ana".into(),
            email: "ana@hub.com".into(),
            password_hash: String::new(),
            role: role.into(),
            is_active: true,
            last_activity_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_carries_id_and_role() {
        let token = issue_token(&user("consultor_rs"), "segredo", 2).unwrap();
        let claims = decode_token(&token, "segredo").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role.as_deref(), Some("consultor_rs"));
        assert!(claims.exp as i64 > Utc::now().timestamp());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&user("admin"), "segredo", 1).unwrap();
        assert!(decode_token(&token, "outro").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(&user("admin"), "segredo", -2).unwrap();
        assert!(decode_token(&token, "segredo").is_err());
    }
}
