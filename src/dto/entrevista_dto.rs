use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEntrevistaPayload {
    pub vaga_candidato_id: i64,
    pub data_entrevista: NaiveDate,
    #[validate(length(min = 4, max = 8))]
    pub hora_entrevista: String,
    pub status: Option<String>,
    #[validate(url)]
    pub link_chamada: Option<String>,
    pub observacoes: Option<String>,
    pub entrevistador_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEntrevistaPayload {
    pub data_entrevista: Option<NaiveDate>,
    #[validate(length(min = 4, max = 8))]
    pub hora_entrevista: Option<String>,
    pub status: Option<String>,
    #[validate(url)]
    pub link_chamada: Option<String>,
    pub observacoes: Option<String>,
    pub entrevistador_id: Option<i64>,
}
