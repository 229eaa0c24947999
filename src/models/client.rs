use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i64,
    pub client_type: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub logo_path: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client row joined with its PF/PJ sub-type columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub client: Client,
    pub cpf: Option<String>,
    pub full_name: Option<String>,
    pub cnpj: Option<String>,
    pub company_name: Option<String>,
    pub trade_name: Option<String>,
}

impl ClientDetail {
    pub fn display_name(&self) -> &str {
        client_display_name(self.company_name.as_deref(), self.full_name.as_deref())
    }
}

/// Company name wins over the individual's name; `N/A` when neither exists.
pub fn client_display_name<'a>(company_name: Option<&'a str>, full_name: Option<&'a str>) -> &'a str {
    company_name
        .filter(|n| !n.is_empty())
        .or(full_name.filter(|n| !n.is_empty()))
        .unwrap_or("N/A")
}
