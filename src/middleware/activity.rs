use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use crate::middleware::auth::CurrentUser;
use crate::AppState;

/// Stamps `last_activity_at` for the authenticated caller once the handler has run.
pub async fn track_activity(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let user_id = req.extensions().get::<CurrentUser>().map(|u| u.id);
    let response = next.run(req).await;
    if let Some(id) = user_id {
        if response.status().is_success() {
            state.user_service.touch_activity(id).await;
        }
    }
    response
}
