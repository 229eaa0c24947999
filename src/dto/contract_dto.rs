use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const CONTRACT_STATUSES: [&str; 4] = ["active", "completed", "cancelled", "suspended"];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateContractPayload {
    #[validate(length(min = 1, max = 50))]
    pub contract_number: String,
    pub client_id: i64,
    pub contract_type: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_value: Option<Decimal>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateContractPayload {
    #[validate(length(min = 1, max = 50))]
    pub contract_number: Option<String>,
    pub client_id: Option<i64>,
    pub contract_type: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_value: Option<Decimal>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub client_id: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachServicePayload {
    pub service_id: i64,
    pub unit_value: Option<Decimal>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStagePayload {
    pub status: String,
    pub notes: Option<String>,
}

/// Outcome of marking every stage of a contract service complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStageResult {
    pub success: usize,
    pub errors: usize,
}
