use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::candidato::VagaCandidatoDetail;
use crate::models::entrevista::EntrevistaDetail;
use crate::models::vaga::{VagaDetail, STATUS_ABERTA};
use crate::services::export_service::ExportService;
use crate::services::metrics::{calculate_metrics, filter_by_closure_date, total_commissions};
use crate::services::report_pdf;
use crate::utils::time::today;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    #[serde(alias = "xlsx")]
    Excel,
}

impl ReportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Pdf => PDF_CONTENT_TYPE,
            ReportFormat::Excel => XLSX_CONTENT_TYPE,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "xlsx",
        }
    }
}

/// Store-level filters plus the closure-date window applied after fetching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VagaReportFilter {
    pub client_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Everything the individual vaga report shows.
#[derive(Debug, Clone)]
pub struct VagaReportBundle {
    pub vaga: VagaDetail,
    pub candidatos: Vec<VagaCandidatoDetail>,
    pub entrevistas: Vec<EntrevistaDetail>,
}

#[derive(Debug, Clone)]
pub struct ReportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VagaSource: Send + Sync {
    /// Rows matching client/user/status, newest opening first.
    async fn fetch_vagas(&self, filter: &VagaReportFilter) -> Result<Vec<VagaDetail>>;
    async fn client_name(&self, client_id: i64) -> Result<Option<String>>;
    async fn user_name(&self, user_id: i64) -> Result<Option<String>>;
    async fn vaga_detail(&self, vaga_id: i64) -> Result<Option<VagaDetail>>;
    async fn vaga_candidatos(&self, vaga_id: i64) -> Result<Vec<VagaCandidatoDetail>>;
    async fn vaga_entrevistas(&self, vaga_id: i64) -> Result<Vec<EntrevistaDetail>>;
}

#[derive(Clone)]
pub struct ReportService {
    source: Arc<dyn VagaSource>,
}

impl ReportService {
    pub fn new(source: Arc<dyn VagaSource>) -> Self {
        Self { source }
    }

    pub async fn fetch_filtered(&self, filter: &VagaReportFilter) -> Result<Vec<VagaDetail>> {
        let rows = self.source.fetch_vagas(filter).await?;
        Ok(filter_by_closure_date(rows, filter.start_date, filter.end_date))
    }

    pub async fn general(
        &self,
        format: ReportFormat,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<ReportFile> {
        let filter = VagaReportFilter {
            start_date,
            end_date,
            ..Default::default()
        };
        let rows = self.fetch_filtered(&filter).await?;
        let metrics = calculate_metrics(&rows);
        let generated_on = today();
        tracing::info!(rows = rows.len(), ?format, "Generating general R&S report");

        let bytes = match format {
            ReportFormat::Pdf => report_pdf::general(&rows, &metrics, generated_on),
            ReportFormat::Excel => ExportService::general_xlsx(&rows, &metrics, generated_on)?,
        };
        Ok(file("relatorio-geral-rs", generated_on, format, bytes))
    }

    pub async fn by_client(
        &self,
        format: ReportFormat,
        client_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<ReportFile> {
        let filter = VagaReportFilter {
            client_id: Some(client_id),
            start_date,
            end_date,
            ..Default::default()
        };
        let rows = self.fetch_filtered(&filter).await?;
        let metrics = calculate_metrics(&rows);
        let client_name = self
            .source
            .client_name(client_id)
            .await?
            .unwrap_or_else(|| "Cliente não encontrado".to_string());
        let generated_on = today();
        tracing::info!(client_id, rows = rows.len(), ?format, "Generating client R&S report");

        let bytes = match format {
            ReportFormat::Pdf => report_pdf::by_client(&rows, &metrics, &client_name, generated_on),
            ReportFormat::Excel => ExportService::client_xlsx(&rows, &metrics, &client_name)?,
        };
        Ok(file(
            &format!("relatorio-rs-cliente-{}", client_id),
            generated_on,
            format,
            bytes,
        ))
    }

    pub async fn by_consultant(
        &self,
        format: ReportFormat,
        user_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<ReportFile> {
        let filter = VagaReportFilter {
            user_id: Some(user_id),
            start_date,
            end_date,
            ..Default::default()
        };
        let rows = self.fetch_filtered(&filter).await?;
        let metrics = calculate_metrics(&rows);
        let commissions = total_commissions(&rows, user_id);
        let user_name = self
            .source
            .user_name(user_id)
            .await?
            .unwrap_or_else(|| "Consultora não encontrada".to_string());
        let generated_on = today();
        tracing::info!(user_id, rows = rows.len(), ?format, "Generating consultant R&S report");

        let bytes = match format {
            ReportFormat::Pdf => report_pdf::by_consultant(
                &rows,
                &metrics,
                commissions,
                &user_name,
                user_id,
                generated_on,
            ),
            ReportFormat::Excel => {
                ExportService::consultant_xlsx(&rows, &metrics, commissions, &user_name, user_id)?
            }
        };
        Ok(file(
            &format!("relatorio-rs-consultora-{}", user_id),
            generated_on,
            format,
            bytes,
        ))
    }

    pub async fn open_vacancies(&self, format: ReportFormat) -> Result<ReportFile> {
        let filter = VagaReportFilter {
            status: Some(STATUS_ABERTA.to_string()),
            ..Default::default()
        };
        let rows = self.fetch_filtered(&filter).await?;
        let generated_on = today();
        tracing::info!(rows = rows.len(), ?format, "Generating open vacancies report");

        let bytes = match format {
            ReportFormat::Pdf => report_pdf::open_vacancies(&rows, generated_on),
            ReportFormat::Excel => ExportService::open_vacancies_xlsx(&rows)?,
        };
        Ok(file("relatorio-vagas-abertas", generated_on, format, bytes))
    }

    pub async fn individual(&self, format: ReportFormat, vaga_id: i64) -> Result<ReportFile> {
        let bundle = self.load_bundle(vaga_id).await?;
        let generated_on = today();
        tracing::info!(vaga_id, ?format, "Generating individual vaga report");

        let bytes = match format {
            ReportFormat::Pdf => report_pdf::individual(&bundle, generated_on),
            ReportFormat::Excel => ExportService::individual_xlsx(&bundle)?,
        };
        Ok(file(
            &format!("relatorio-vaga-{}", bundle.vaga.vaga.codigo),
            generated_on,
            format,
            bytes,
        ))
    }

    pub async fn load_bundle(&self, vaga_id: i64) -> Result<VagaReportBundle> {
        let vaga = self
            .source
            .vaga_detail(vaga_id)
            .await?
            .ok_or_else(|| Error::NotFound("Vaga não encontrada".to_string()))?;
        let candidatos = self.source.vaga_candidatos(vaga_id).await?;
        let entrevistas = self.source.vaga_entrevistas(vaga_id).await?;
        Ok(VagaReportBundle {
            vaga,
            candidatos,
            entrevistas,
        })
    }
}

fn file(stem: &str, generated_on: NaiveDate, format: ReportFormat, bytes: Vec<u8>) -> ReportFile {
    ReportFile {
        filename: format!(
            "{}-{}.{}",
            stem,
            generated_on.format("%Y-%m-%d"),
            format.extension()
        ),
        content_type: format.content_type(),
        bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vaga::Vaga;
    use crate::services::metrics::tests::vaga;
    use chrono::{TimeZone, Utc};

    fn detail(v: Vaga) -> VagaDetail {
        VagaDetail {
            vaga: v,
            client_name: Some("ACME Ltda".into()),
            user_name: Some("Marina".into()),
            candidato_aprovado_nome: None,
        }
    }

    fn closed_on(status: &str, day: u32) -> VagaDetail {
        let mut v = vaga(status, Some(1000.0), Some(10.0));
        v.data_fechamento_cancelamento = Some(Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap());
        detail(v)
    }

    fn service(mock: MockVagaSource) -> ReportService {
        ReportService::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn fetch_filtered_applies_closure_window() {
        let mut mock = MockVagaSource::new();
        mock.expect_fetch_vagas().returning(|_| {
            Ok(vec![
                closed_on("fechada", 15),
                closed_on("fechada", 2),
                detail(vaga("aberta", None, None)),
            ])
        });

        let filter = VagaReportFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            ..Default::default()
        };
        let rows = service(mock).fetch_filtered(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].vaga.data_fechamento_cancelamento.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[tokio::test]
    async fn open_vacancies_asks_store_for_aberta_only() {
        let mut mock = MockVagaSource::new();
        mock.expect_fetch_vagas()
            .withf(|f| f.status.as_deref() == Some("aberta") && f.client_id.is_none())
            .times(1)
            .returning(|_| Ok(vec![detail(vaga("aberta", None, None))]));

        let report = service(mock)
            .open_vacancies(ReportFormat::Pdf)
            .await
            .unwrap();
        assert_eq!(report.content_type, PDF_CONTENT_TYPE);
        assert!(report.filename.starts_with("relatorio-vagas-abertas-"));
        assert!(report.filename.ends_with(".pdf"));
        assert!(report.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn client_report_renders_spreadsheet() {
        let mut mock = MockVagaSource::new();
        mock.expect_fetch_vagas()
            .withf(|f| f.client_id == Some(3))
            .returning(|_| Ok(vec![closed_on("fechada", 15)]));
        mock.expect_client_name()
            .returning(|_| Ok(Some("ACME Ltda".into())));

        let report = service(mock)
            .by_client(ReportFormat::Excel, 3, None, None)
            .await
            .unwrap();
        assert_eq!(report.content_type, XLSX_CONTENT_TYPE);
        assert!(report.filename.ends_with(".xlsx"));
        // xlsx is a zip container
        assert!(report.bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn consultant_report_tolerates_unknown_user() {
        let mut mock = MockVagaSource::new();
        mock.expect_fetch_vagas()
            .withf(|f| f.user_id == Some(9))
            .returning(|_| Ok(vec![closed_on("fechada", 15), closed_on("aberta", 16)]));
        mock.expect_user_name().returning(|_| Ok(None));

        let report = service(mock)
            .by_consultant(ReportFormat::Pdf, 9, None, None)
            .await
            .unwrap();
        assert!(report.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn individual_report_for_missing_vaga_is_not_found() {
        let mut mock = MockVagaSource::new();
        mock.expect_vaga_detail().returning(|_| Ok(None));

        let err = service(mock)
            .individual(ReportFormat::Pdf, 42)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let mut mock = MockVagaSource::new();
        mock.expect_fetch_vagas()
            .returning(|_| Err(Error::store("Erro ao buscar vagas", sqlx::Error::PoolTimedOut)));

        let err = service(mock)
            .general(ReportFormat::Excel, None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Erro ao buscar vagas"));
    }

    #[test]
    fn format_accepts_excel_aliases() {
        let parse = |s: &str| serde_json::from_str::<ReportFormat>(&format!("\"{}\"", s));
        assert_eq!(parse("pdf").unwrap(), ReportFormat::Pdf);
        assert_eq!(parse("excel").unwrap(), ReportFormat::Excel);
        assert_eq!(parse("xlsx").unwrap(), ReportFormat::Excel);
        assert!(parse("csv").is_err());
    }
}
