use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const STAGE_PENDING: &str = "pending";
pub const STAGE_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contract {
    pub id: i64,
    pub contract_number: String,
    pub client_id: i64,
    pub contract_type: Option<String>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total_value: Option<Decimal>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contract: Contract,
    pub client_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractService {
    pub id: i64,
    pub contract_id: i64,
    pub service_id: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub unit_value: Option<Decimal>,
    pub quantity: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractServiceDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contract_service: ContractService,
    pub service_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractServiceStage {
    pub id: i64,
    pub contract_service_id: i64,
    pub name: String,
    pub sort_order: i32,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
