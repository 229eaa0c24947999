pub mod auth_dto;
pub mod candidato_dto;
pub mod client_dto;
pub mod contract_dto;
pub mod entrevista_dto;
pub mod report_dto;
pub mod service_dto;
pub mod user_dto;
pub mod vaga_dto;

use serde::Serialize;

use crate::error::{Error, Result};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Paginated listing returned by every `GET` collection endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, total: i64, window: PageWindow) -> Self {
        let total_pages = ((total as f64) / (window.per_page as f64)).ceil() as i64;
        Self {
            items,
            total,
            page: window.page,
            per_page: window.per_page,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub offset: i64,
}

impl PageWindow {
    pub fn resolve(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        Self {
            page,
            per_page,
            offset: (page - 1) * per_page,
        }
    }
}

/// Rejects values outside a fixed enumeration with a 400.
pub fn ensure_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        tracing::warn!(field, value, "rejected value outside enumeration");
        Err(Error::BadRequest(format!(
            "Valor inválido para {}: {} (permitidos: {})",
            field,
            value,
            allowed.join(", ")
        )))
    }
}

pub fn ensure_opt_one_of(field: &str, value: Option<&str>, allowed: &[&str]) -> Result<()> {
    match value {
        Some(v) => ensure_one_of(field, v, allowed),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults_and_clamps() {
        assert_eq!(
            PageWindow::resolve(None, None),
            PageWindow { page: 1, per_page: 20, offset: 0 }
        );
        assert_eq!(
            PageWindow::resolve(Some(3), Some(500)),
            PageWindow { page: 3, per_page: 100, offset: 200 }
        );
        assert_eq!(PageWindow::resolve(Some(0), Some(0)).offset, 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let list = ListResponse::new(vec![1, 2], 41, PageWindow::resolve(Some(1), Some(20)));
        assert_eq!(list.total_pages, 3);
    }

    #[test]
    fn enumeration_check_rejects_unknown() {
        assert!(ensure_one_of("status", "aberta", &["aberta", "fechada"]).is_ok());
        assert!(matches!(
            ensure_one_of("status", "xyz", &["aberta"]),
            Err(Error::BadRequest(_))
        ));
        assert!(ensure_opt_one_of("status", None, &["aberta"]).is_ok());
    }
}
