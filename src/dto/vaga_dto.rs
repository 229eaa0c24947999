use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vaga::{Vaga, VagaDetail};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVagaPayload {
    pub client_id: i64,
    pub contract_id: Option<i64>,
    /// Responsible consultant; defaults to the caller.
    pub user_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub cargo: String,
    pub tipo_cargo: String,
    pub tipo_abertura: Option<String>,
    pub status: Option<String>,
    pub fonte_recrutamento: Option<String>,
    pub salario: Option<Decimal>,
    pub pretensao_salarial: Option<Decimal>,
    pub data_abertura: Option<NaiveDate>,
    pub observacoes: Option<String>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub porcentagem_faturamento: Option<f64>,
    pub valor_faturamento: Option<Decimal>,
    #[serde(default)]
    pub sigilosa: bool,
    #[validate(range(min = 0.0, max = 100.0))]
    pub imposto_estado: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVagaPayload {
    pub client_id: Option<i64>,
    pub contract_id: Option<i64>,
    pub user_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub cargo: Option<String>,
    pub tipo_cargo: Option<String>,
    pub tipo_abertura: Option<String>,
    pub status: Option<String>,
    pub fonte_recrutamento: Option<String>,
    pub salario: Option<Decimal>,
    pub pretensao_salarial: Option<Decimal>,
    pub data_abertura: Option<NaiveDate>,
    pub candidato_aprovado_id: Option<i64>,
    pub observacoes: Option<String>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub porcentagem_faturamento: Option<f64>,
    pub valor_faturamento: Option<Decimal>,
    pub sigilosa: Option<bool>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub imposto_estado: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateVagaStatusPayload {
    #[validate(length(min = 1))]
    pub status: String,
    pub motivo: Option<String>,
    pub candidato_aprovado_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VagaListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub client_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<String>,
    pub sigilosa: Option<bool>,
    pub tipo_cargo: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VagaStatisticsQuery {
    pub client_id: Option<i64>,
    pub user_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GerarLinkPublicoPayload {
    #[validate(range(min = 1, max = 365))]
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPublicoResponse {
    pub id: i64,
    pub unique_token: String,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VincularCandidatoPayload {
    pub candidato_id: i64,
    pub status: Option<String>,
    pub observacoes: Option<String>,
}

/// What an anonymous holder of a public link may see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VagaPublicaResponse {
    pub id: i64,
    pub codigo: String,
    pub cargo: String,
    pub tipo_cargo: String,
    pub tipo_abertura: String,
    pub status: String,
    pub data_abertura: NaiveDate,
    pub data_fechamento_cancelamento: Option<DateTime<Utc>>,
    pub client_name: Option<String>,
    pub user_name: Option<String>,
    pub sigilosa: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl From<VagaDetail> for VagaPublicaResponse {
    fn from(value: VagaDetail) -> Self {
        let VagaDetail {
            vaga,
            client_name,
            user_name,
            ..
        } = value;
        let Vaga {
            id,
            codigo,
            cargo,
            tipo_cargo,
            tipo_abertura,
            status,
            data_abertura,
            data_fechamento_cancelamento,
            sigilosa,
            token_expires_at,
            ..
        } = vaga;
        Self {
            id,
            codigo,
            cargo,
            tipo_cargo,
            tipo_abertura,
            status,
            data_abertura,
            data_fechamento_cancelamento,
            // confidential vagas never expose the client
            client_name: if sigilosa { None } else { client_name },
            user_name,
            sigilosa,
            token_expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metrics::tests::vaga;

    #[test]
    fn public_view_hides_client_of_confidential_vaga() {
        let mut v = vaga("aberta", None, None);
        v.sigilosa = true;
        let detail = VagaDetail {
            vaga: v,
            client_name: Some("ACME".into()),
            user_name: Some("Marina".into()),
            candidato_aprovado_nome: None,
        };
        let public = VagaPublicaResponse::from(detail);
        assert!(public.client_name.is_none());
        assert_eq!(public.user_name.as_deref(), Some("Marina"));
    }

    #[test]
    fn list_query_defaults_to_no_filters() {
        let q: VagaListQuery = serde_json::from_str("{}").unwrap();
        assert!(q.status.is_none());
        assert!(q.page.is_none());
    }
}
