use serde::{Deserialize, Serialize};
use validator::Validate;

pub const CLIENT_TYPE_PF: &str = "pf";
pub const CLIENT_TYPE_PJ: &str = "pj";

/// Contact and address columns shared by both client kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientContact {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    #[validate(length(max = 2))]
    pub state: Option<String>,
    #[validate(length(max = 10))]
    pub zipcode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateClientPayload {
    pub client_type: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub contact: ClientContact,
    /// PF only.
    #[validate(length(min = 11, max = 14))]
    pub cpf: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    /// PJ only.
    #[validate(length(min = 14, max = 18))]
    pub cnpj: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub company_name: Option<String>,
    pub trade_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateClientPayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub contact: ClientContact,
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub company_name: Option<String>,
    pub trade_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub client_type: Option<String>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn pj_payload_reads_flattened_contact() {
        let payload: CreateClientPayload = serde_json::from_str(
            r#"{"client_type":"pj","cnpj":"12345678000199","company_name":"ACME","email":"a@acme.com","city":"Recife"}"#,
        )
        .unwrap();
        assert_eq!(payload.contact.city.as_deref(), Some("Recife"));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn bad_contact_email_fails_validation() {
        let payload: CreateClientPayload = serde_json::from_str(
            r#"{"client_type":"pf","cpf":"12345678901","full_name":"Ana","email":"nope"}"#,
        )
        .unwrap();
        assert!(payload.validate().is_err());
    }
}
