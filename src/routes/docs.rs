use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(title = "HUB CRM API", description = "Contracts, clients, services and R&S recruitment"),
    paths(
        routes::health::health,
        routes::auth::login,
        routes::auth::me,
        routes::users::list_users,
        routes::users::create_user,
        routes::clients::list_clients,
        routes::clients::get_client,
        routes::clients::create_client,
        routes::clients::upload_logo,
        routes::services::list_services,
        routes::services::create_service,
        routes::services::create_service_stage,
        routes::contracts::list_contracts,
        routes::contracts::get_contract,
        routes::contracts::create_contract,
        routes::contracts::attach_service,
        routes::contracts::list_stages,
        routes::contracts::complete_all_stages,
        routes::attachments::upload_contract_attachment,
        routes::attachments::download_attachment,
        routes::vagas::list_vagas,
        routes::vagas::vaga_statistics,
        routes::vagas::get_vaga,
        routes::vagas::create_vaga,
        routes::vagas::update_vaga,
        routes::vagas::update_vaga_status,
        routes::vagas::gerar_link_publico,
        routes::vagas::historico_status,
        routes::vagas::vincular_candidato,
        routes::vagas::vaga_publica,
        routes::candidatos::list_candidatos,
        routes::candidatos::find_by_email,
        routes::candidatos::create_candidato,
        routes::candidatos::update_vaga_candidato,
        routes::entrevistas::create_entrevista,
        routes::entrevistas::list_by_vaga_candidato,
        routes::reports::general_report,
        routes::reports::client_report,
        routes::reports::consultant_report,
        routes::reports::open_vacancies_report,
        routes::reports::individual_report,
        routes::analytics::dashboard,
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
