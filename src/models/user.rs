use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_ADMIN_GERENCIAL: &str = "admin_gerencial";
pub const ROLE_CONSULTOR_RS: &str = "consultor_rs";
pub const ROLE_USER: &str = "user";

pub const ALL_ROLES: [&str; 4] = [ROLE_ADMIN, ROLE_ADMIN_GERENCIAL, ROLE_CONSULTOR_RS, ROLE_USER];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
}
