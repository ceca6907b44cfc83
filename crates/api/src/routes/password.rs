use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/password/request-reset",
            post(handlers::password_reset::request_password_reset),
        )
        .route(
            "/api/password/admin-reset",
            post(handlers::password_reset::admin_reset_password),
        )
}
