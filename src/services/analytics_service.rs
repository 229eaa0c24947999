use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::services::client_service::ClientService;
use crate::services::contract_service::ContractService;
use crate::services::metrics::{monthly_vagas, vaga_buckets, MonthlyVagas, VagaBuckets};
use crate::services::report_service::VagaReportFilter;
use crate::services::vaga_service::VagaService;

const DASHBOARD_MONTHS: u32 = 6;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub contracts_by_status: BTreeMap<String, i64>,
    pub total_contracts: i64,
    pub total_clients: i64,
    pub vagas: VagaBuckets,
    pub vagas_por_mes: Vec<MonthlyVagas>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    contracts: ContractService,
    clients: ClientService,
    vagas: VagaService,
}

impl AnalyticsService {
    pub fn new(contracts: ContractService, clients: ClientService, vagas: VagaService) -> Self {
        Self {
            contracts,
            clients,
            vagas,
        }
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        let contracts_by_status = self.contracts.count_by_status().await?;
        let total_clients = self.clients.count().await?;
        let rows = self.vagas.report_rows(&VagaReportFilter::default()).await?;

        Ok(Dashboard {
            total_contracts: contracts_by_status.values().sum(),
            contracts_by_status,
            total_clients,
            vagas: vaga_buckets(&rows),
            vagas_por_mes: monthly_vagas(&rows, Utc::now().date_naive(), DASHBOARD_MONTHS),
        })
    }
}
