use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ENTREVISTA_STATUSES: [&str; 5] = [
    "agendada",
    "realizada",
    "cancelada",
    "nao_compareceu",
    "remarcada",
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entrevista {
    pub id: i64,
    pub vaga_candidato_id: i64,
    pub data_entrevista: NaiveDate,
    pub hora_entrevista: String,
    pub status: String,
    pub link_chamada: Option<String>,
    pub observacoes: Option<String>,
    pub entrevistador_id: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntrevistaDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entrevista: Entrevista,
    pub candidato_nome: Option<String>,
    pub entrevistador_nome: Option<String>,
}
