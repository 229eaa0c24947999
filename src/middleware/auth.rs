use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::user::{ROLE_ADMIN, ROLE_ADMIN_GERENCIAL, ROLE_CONSULTOR_RS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Authenticated caller, available to handlers as `Extension<CurrentUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub role: String,
}

pub const REPORT_ROLES: [&str; 3] = [ROLE_ADMIN, ROLE_ADMIN_GERENCIAL, ROLE_CONSULTOR_RS];
pub const ADMIN_ROLES: [&str; 1] = [ROLE_ADMIN];

pub fn decode_token(token: &str, secret: &str) -> crate::error::Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

/// Validates the bearer token and resolves it into a [`CurrentUser`].
fn authenticate(req: &Request) -> Result<CurrentUser, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let claims = decode_token(token.trim(), &config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        reject(StatusCode::UNAUTHORIZED, "invalid_token")
    })?;
    let id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_token"))?;
    Ok(CurrentUser {
        id,
        role: claims.role.unwrap_or_default(),
    })
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match authenticate(&req) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(response) => response,
    }
}

/// Same as [`require_bearer_auth`] but also checks the role; an empty list allows any role.
pub async fn require_roles(mut req: Request, next: Next, allowed: &[&str]) -> Response {
    let user = match authenticate(&req) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if !allowed.is_empty() && !allowed.iter().any(|r| r.eq_ignore_ascii_case(&user.role)) {
        tracing::warn!(user_id = user.id, role = %user.role, "role not allowed");
        return reject(StatusCode::FORBIDDEN, "forbidden");
    }
    req.extensions_mut().insert(user);
    next.run(req).await
}

pub async fn require_report_roles(req: Request, next: Next) -> Response {
    require_roles(req, next, &REPORT_ROLES).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require_roles(req, next, &ADMIN_ROLES).await
}
