pub mod analytics_service;
pub mod attachment_service;
pub mod candidato_service;
pub mod catalog_service;
pub mod client_service;
pub mod contract_service;
pub mod entrevista_service;
pub mod export_service;
pub mod metrics;
pub mod pdf_service;
pub mod report_pdf;
pub mod report_service;
pub mod user_service;
pub mod vaga_service;
