use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/auth/authenticate",
            post(handlers::sessions::authenticate),
        )
        .route(
            "/api/auth/validate-session",
            post(handlers::sessions::validate_session),
        )
        .route(
            "/api/auth/change-password",
            post(handlers::sessions::change_password),
        )
        .route("/api/auth/toggle-mfa", post(handlers::sessions::toggle_mfa))
}
