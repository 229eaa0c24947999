pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::services::{
    analytics_service::AnalyticsService, attachment_service::AttachmentService,
    candidato_service::CandidatoService, catalog_service::CatalogService,
    client_service::ClientService, contract_service::ContractService,
    entrevista_service::EntrevistaService, report_service::ReportService,
    user_service::UserService, vaga_service::VagaService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub client_service: ClientService,
    pub catalog_service: CatalogService,
    pub contract_service: ContractService,
    pub attachment_service: AttachmentService,
    pub vaga_service: VagaService,
    pub candidato_service: CandidatoService,
    pub entrevista_service: EntrevistaService,
    pub report_service: ReportService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let user_service = UserService::new(pool.clone());
        let client_service = ClientService::new(pool.clone(), config.uploads_dir.clone());
        let catalog_service = CatalogService::new(pool.clone());
        let contract_service = ContractService::new(pool.clone());
        let attachment_service = AttachmentService::new(pool.clone(), config.uploads_dir.clone());
        let vaga_service = VagaService::new(pool.clone());
        let candidato_service = CandidatoService::new(pool.clone());
        let entrevista_service = EntrevistaService::new(pool.clone());
        let report_service = ReportService::new(Arc::new(vaga_service.clone()));
        let analytics_service = AnalyticsService::new(
            contract_service.clone(),
            client_service.clone(),
            vaga_service.clone(),
        );

        Self {
            pool,
            user_service,
            client_service,
            catalog_service,
            contract_service,
            attachment_service,
            vaga_service,
            candidato_service,
            entrevista_service,
            report_service,
            analytics_service,
        }
    }
}
