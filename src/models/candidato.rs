use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const CANDIDATO_STATUSES: [&str; 3] = ["pendente", "aprovado", "reprovado"];

pub const VAGA_CANDIDATO_STATUSES: [&str; 7] = [
    "inscrito",
    "triagem",
    "entrevista_agendada",
    "entrevista_realizada",
    "aprovado",
    "reprovado",
    "desistiu",
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidato {
    pub id: i64,
    pub nome: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub status: String,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VagaCandidato {
    pub id: i64,
    pub vaga_id: i64,
    pub candidato_id: i64,
    pub status: String,
    pub data_inscricao: DateTime<Utc>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vaga link joined with the linked candidate's contact columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VagaCandidatoDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub link: VagaCandidato,
    pub candidato_nome: String,
    pub candidato_email: Option<String>,
    pub candidato_telefone: Option<String>,
    pub candidato_status: String,
}
