use chrono::NaiveDate;
use serde::Deserialize;

use crate::services::report_service::ReportFormat;

/// Query accepted by every R&S report endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportQuery {
    pub format: ReportFormat,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_pdf() {
        let q: ReportQuery = serde_json::from_str(r#"{"start_date":"2024-01-01"}"#).unwrap();
        assert_eq!(q.format, ReportFormat::Pdf);
        assert_eq!(q.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(q.end_date.is_none());
    }

    #[test]
    fn excel_is_requested_by_name() {
        let q: ReportQuery = serde_json::from_str(r#"{"format":"excel"}"#).unwrap();
        assert_eq!(q.format, ReportFormat::Excel);
    }
}
