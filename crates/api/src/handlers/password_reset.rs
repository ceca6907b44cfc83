//! Password resets: the public anti-enumeration request flow and the
//! admin-initiated reset.
//!
//! The public flow never reveals whether an address corresponds to an
//! account. Unknown address, inactive account, and rate-limit hit all
//! produce the identical generic success envelope; the real reason only
//! appears in server-side logs.

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use eduvate_core::{
    errors::AuthError,
    models::account::{
        AdminResetPasswordRequest, AdminResetPasswordResponse, MessageResponse,
        RequestPasswordResetRequest,
    },
    password::validate_password,
    roles::{authorize, ADMIN_ROLES},
};
use eduvate_db::repositories::account;

use crate::{
    auth::{credentials, tokens, RESET_RATE_RULE, RESET_TTL_HOURS},
    handlers::{normalize_email, sessions::require_session},
    middleware::error_handling::AppError,
    ApiState,
};

/// The one message every request-reset outcome returns.
pub(crate) const GENERIC_RESET_MESSAGE: &str =
    "If an account exists for this address, a password reset link is on its way.";

fn reset_link(base_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        base_url.trim_end_matches('/'),
        token
    )
}

#[axum::debug_handler]
pub async fn request_password_reset(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RequestPasswordResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = normalize_email(&payload.email)?;

    let decision = state.rate_limiter.check(
        &format!("reset:{email}"),
        RESET_RATE_RULE.0,
        StdDuration::from_secs(RESET_RATE_RULE.1),
    );
    if !decision.allowed {
        tracing::warn!("Rate-limited password reset request for {}", email);
        return Ok(Json(MessageResponse::ok(GENERIC_RESET_MESSAGE)));
    }

    match account::get_account_by_email(&state.db_pool, &email).await? {
        None => {
            tracing::warn!("Password reset requested for unknown address");
        }
        Some(target) if !target.is_active || target.password_digest.is_none() => {
            tracing::warn!(
                "Password reset requested for non-resettable account {}",
                target.id
            );
        }
        Some(target) => {
            let token = tokens::new_token();
            let expires_at = Utc::now() + Duration::hours(RESET_TTL_HOURS);
            account::set_invitation_token(&state.db_pool, target.id, &token, expires_at).await?;

            let base_url = payload
                .app_base_url
                .as_deref()
                .unwrap_or(&state.config.app_base_url);
            let link = reset_link(base_url, &token);
            let html = format!(
                "<p>A password reset was requested for your EduVate account.</p>\
                 <p>The link below is valid for {RESET_TTL_HOURS} hours. If you did not \
                 request this, you can ignore this email.</p>\
                 <p><a href=\"{link}\">Reset my password</a></p>"
            );

            if let Err(err) = state
                .mailer
                .send(&email, "Reset your EduVate password", &html)
                .await
            {
                tracing::warn!("Reset mail for account {} failed to send: {}", target.id, err);
            } else {
                tracing::info!("Reset token issued for account {}", target.id);
            }
        }
    }

    Ok(Json(MessageResponse::ok(GENERIC_RESET_MESSAGE)))
}

/// Admin-initiated reset. Unlike the public flow this reveals account
/// existence by construction, so failures are specific. The new password
/// is returned exactly once and the target's session is invalidated.
#[axum::debug_handler]
pub async fn admin_reset_password(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<AdminResetPasswordRequest>,
) -> Result<Json<AdminResetPasswordResponse>, AppError> {
    let (_caller, caller_roles) = require_session(&state, &payload.session_token).await?;

    let target = account::get_account_by_id(&state.db_pool, payload.user_id)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    if !authorize(&caller_roles, &ADMIN_ROLES, target.tenant_id) {
        return Err(AppError(AuthError::Authorization(
            "You are not allowed to reset passwords for this account".to_string(),
        )));
    }

    let password = match payload.new_password {
        Some(password) => {
            validate_password(&password).map_err(AuthError::Validation)?;
            password
        }
        None => tokens::random_password(),
    };

    let digest = credentials::hash_password(&password)?;
    account::set_password_digest(&state.db_pool, target.id, &digest, true).await?;

    tracing::info!("Administrator reset password for account {}", target.id);

    Ok(Json(AdminResetPasswordResponse {
        success: true,
        password,
    }))
}
