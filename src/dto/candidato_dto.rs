use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCandidatoPayload {
    #[validate(length(min = 1, max = 255))]
    pub nome: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub telefone: Option<String>,
    pub status: Option<String>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCandidatoPayload {
    #[validate(length(min = 1, max = 255))]
    pub nome: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub telefone: Option<String>,
    pub status: Option<String>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCandidatoStatusPayload {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateVagaCandidatoPayload {
    #[validate(length(min = 1))]
    pub status: String,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidatoListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidatoEmailQuery {
    pub email: String,
}
