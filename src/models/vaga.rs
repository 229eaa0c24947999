use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const STATUS_ABERTA: &str = "aberta";
pub const STATUS_FECHADA: &str = "fechada";
pub const STATUS_FECHADA_REP: &str = "fechada_rep";
pub const STATUS_CANCELADA_CLIENTE: &str = "cancelada_cliente";

pub const VAGA_STATUSES: [&str; 11] = [
    "aberta",
    "divulgacao_prospec",
    "entrevista_nc",
    "entrevista_empresa",
    "testes",
    "fechada",
    "fechada_rep",
    "cancelada_cliente",
    "standby",
    "nao_cobrada",
    "encerramento_cont",
];

/// Statuses counted as closed (filled) vacancies.
pub const CLOSED_STATUSES: [&str; 2] = [STATUS_FECHADA, STATUS_FECHADA_REP];

/// Statuses that still need recruitment work.
pub const ACTIVE_STATUSES: [&str; 6] = [
    "aberta",
    "divulgacao_prospec",
    "entrevista_nc",
    "entrevista_empresa",
    "testes",
    "standby",
];

/// Statuses between opening and closing.
pub const IN_PROGRESS_STATUSES: [&str; 4] = [
    "divulgacao_prospec",
    "entrevista_nc",
    "entrevista_empresa",
    "testes",
];

/// Writing one of these stamps `data_fechamento_cancelamento`.
pub const FINAL_STATUSES: [&str; 3] = [STATUS_FECHADA, STATUS_FECHADA_REP, STATUS_CANCELADA_CLIENTE];

pub const TIPOS_CARGO: [&str; 6] = [
    "administrativo",
    "comercial",
    "estagio",
    "gestao",
    "operacional",
    "jovem_aprendiz",
];

pub const TIPOS_ABERTURA: [&str; 2] = ["nova", "reposicao"];

pub const FONTES_RECRUTAMENTO: [&str; 7] = [
    "catho",
    "email",
    "indicacao",
    "linkedin",
    "whatsapp",
    "trafego",
    "outros",
];

pub fn is_closed_status(status: &str) -> bool {
    CLOSED_STATUSES.contains(&status)
}

pub fn is_final_status(status: &str) -> bool {
    FINAL_STATUSES.contains(&status)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vaga {
    pub id: i64,
    pub codigo: String,
    pub client_id: i64,
    pub contract_id: Option<i64>,
    pub user_id: i64,
    pub cargo: String,
    pub tipo_cargo: String,
    pub tipo_abertura: String,
    pub status: String,
    pub fonte_recrutamento: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub salario: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub pretensao_salarial: Option<Decimal>,
    pub data_abertura: NaiveDate,
    pub data_fechamento_cancelamento: Option<DateTime<Utc>>,
    pub candidato_aprovado_id: Option<i64>,
    pub observacoes: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub porcentagem_faturamento: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub valor_faturamento: Option<Decimal>,
    pub sigilosa: bool,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub imposto_estado: Option<Decimal>,
    #[serde(skip_serializing)]
    pub unique_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AsRef<Vaga> for Vaga {
    fn as_ref(&self) -> &Vaga {
        self
    }
}

/// Vaga joined with the names the listings and reports display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VagaDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub vaga: Vaga,
    pub client_name: Option<String>,
    pub user_name: Option<String>,
    pub candidato_aprovado_nome: Option<String>,
}

impl AsRef<Vaga> for VagaDetail {
    fn as_ref(&self) -> &Vaga {
        &self.vaga
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VagaStatusHistory {
    pub id: i64,
    pub vaga_id: i64,
    pub status_anterior: Option<String>,
    pub status_novo: String,
    pub motivo: Option<String>,
    pub changed_by: Option<i64>,
    pub changed_at: DateTime<Utc>,
    pub changed_by_name: Option<String>,
}
