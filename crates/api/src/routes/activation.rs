use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/activation/verify-teacher-account",
            post(handlers::activation::verify_teacher_account),
        )
        .route(
            "/api/activation/verify-student-account",
            post(handlers::activation::verify_student_account),
        )
        .route(
            "/api/activation/set-password",
            post(handlers::activation::set_password),
        )
}
