use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub value: Option<Decimal>,
    pub duration_days: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceStage {
    pub id: i64,
    pub service_id: i64,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}
