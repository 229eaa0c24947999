pub mod analytics;
pub mod attachments;
pub mod auth;
pub mod candidatos;
pub mod clients;
pub mod contracts;
pub mod docs;
pub mod entrevistas;
pub mod health;
pub mod reports;
pub mod services;
pub mod users;
pub mod vagas;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::get_config;
use crate::middleware::{
    activity::track_activity,
    auth::{require_admin, require_bearer_auth, require_report_roles},
    cors::cors_layer,
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::AppState;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/api/docs/openapi.json", get(docs::openapi_json))
        .route("/api/vagas/publico/:token", get(vagas::vaga_publica))
        .route("/api/vagas/publico/:token/historico", get(vagas::historico_publico))
}

fn auth_routes(auth_rps: u32) -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route_layer(from_fn_with_state(new_rps_state(auth_rps), rps_middleware))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/users/entrevistadores", get(users::list_entrevistadores))
        // clients
        .route("/api/clients", get(clients::list_clients).post(clients::create_client))
        .route(
            "/api/clients/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route("/api/clients/:id/logo", post(clients::upload_logo))
        .route(
            "/api/clients/:id/attachments",
            get(attachments::list_client_attachments).post(attachments::upload_client_attachment),
        )
        // service catalog
        .route("/api/services", get(services::list_services).post(services::create_service))
        .route(
            "/api/services/:id",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route(
            "/api/services/:id/stages",
            get(services::list_service_stages).post(services::create_service_stage),
        )
        .route(
            "/api/service-stages/:id",
            axum::routing::delete(services::delete_service_stage),
        )
        // contracts
        .route("/api/contracts", get(contracts::list_contracts).post(contracts::create_contract))
        .route(
            "/api/contracts/:id",
            get(contracts::get_contract)
                .put(contracts::update_contract)
                .delete(contracts::delete_contract),
        )
        .route(
            "/api/contracts/:id/services",
            get(contracts::list_contract_services).post(contracts::attach_service),
        )
        .route(
            "/api/contracts/:id/attachments",
            get(attachments::list_contract_attachments)
                .post(attachments::upload_contract_attachment),
        )
        .route("/api/contract-services/:id/stages", get(contracts::list_stages))
        .route(
            "/api/contract-services/:id/stages/complete-all",
            post(contracts::complete_all_stages),
        )
        .route("/api/contract-stages/:id", put(contracts::update_stage))
        .route(
            "/api/attachments/:id",
            axum::routing::delete(attachments::delete_attachment),
        )
        .route("/api/attachments/:id/download", get(attachments::download_attachment))
        // recruitment
        .route("/api/vagas", get(vagas::list_vagas).post(vagas::create_vaga))
        .route("/api/vagas/statistics", get(vagas::vaga_statistics))
        .route("/api/vagas/next-codigo", get(vagas::next_codigo))
        .route(
            "/api/vagas/:id",
            get(vagas::get_vaga)
                .put(vagas::update_vaga)
                .delete(vagas::delete_vaga),
        )
        .route("/api/vagas/:id/status", patch(vagas::update_vaga_status))
        .route("/api/vagas/:id/gerar-link-publico", post(vagas::gerar_link_publico))
        .route(
            "/api/vagas/:id/remover-link-publico",
            axum::routing::delete(vagas::remover_link_publico),
        )
        .route("/api/vagas/:id/historico-status", get(vagas::historico_status))
        .route(
            "/api/vagas/:id/candidatos",
            get(vagas::list_vaga_candidatos).post(vagas::vincular_candidato),
        )
        .route(
            "/api/vagas/:id/candidatos/:candidato_id",
            axum::routing::delete(vagas::desvincular_candidato),
        )
        .route(
            "/api/candidatos",
            get(candidatos::list_candidatos).post(candidatos::create_candidato),
        )
        .route("/api/candidatos/by-email", get(candidatos::find_by_email))
        .route(
            "/api/candidatos/:id",
            get(candidatos::get_candidato)
                .put(candidatos::update_candidato)
                .delete(candidatos::delete_candidato),
        )
        .route("/api/candidatos/:id/status", patch(candidatos::update_candidato_status))
        .route("/api/candidatos/:id/vagas", get(candidatos::vagas_do_candidato))
        .route("/api/vaga-candidatos/:id", put(candidatos::update_vaga_candidato))
        .route("/api/entrevistas", post(entrevistas::create_entrevista))
        .route(
            "/api/entrevistas/:id",
            get(entrevistas::get_entrevista)
                .put(entrevistas::update_entrevista)
                .delete(entrevistas::delete_entrevista),
        )
        .route(
            "/api/entrevistas/vaga-candidato/:id",
            get(entrevistas::list_by_vaga_candidato),
        )
        .route("/api/analytics/dashboard", get(analytics::dashboard))
        .route_layer(from_fn_with_state(state, track_activity))
        .route_layer(from_fn(require_bearer_auth))
}

fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/reports/rs/general", get(reports::general_report))
        .route("/api/reports/rs/client/:client_id", get(reports::client_report))
        .route("/api/reports/rs/consultant/:user_id", get(reports::consultant_report))
        .route("/api/reports/rs/open-vacancies", get(reports::open_vacancies_report))
        .route("/api/reports/rs/vagas/:id", get(reports::individual_report))
        .route_layer(from_fn_with_state(state, track_activity))
        .route_layer(from_fn(require_report_roles))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(from_fn_with_state(state, track_activity))
        .route_layer(from_fn(require_admin))
}

/// Full application router with every middleware layer applied.
pub fn app_router(state: AppState) -> Router {
    let config = get_config();

    Router::new()
        .merge(public_routes())
        .merge(auth_routes(config.auth_rps))
        .merge(protected_routes(state.clone()))
        .merge(report_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .fallback(health::not_found)
        .with_state(state)
        .layer(from_fn_with_state(new_rps_state(config.api_rps), rps_middleware))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
}
