use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::auth_dto::LoginPayload,
    error::Result,
    middleware::auth::CurrentUser,
    models::user::User,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Authenticated", body = crate::dto::auth_dto::LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Inactive user")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let config = crate::config::get_config();
    let response = state
        .user_service
        .login(payload, &config.jwt_secret, config.jwt_expiration_hours)
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let user: User = state.user_service.get_by_id(user.id).await?;
    Ok(Json(user))
}
