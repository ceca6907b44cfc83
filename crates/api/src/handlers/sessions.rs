//! Sign-in, session validation, password change, and MFA toggling.
//!
//! Sessions are single-per-account and stored on the account row; issuing
//! a new one overwrites the old. Validation slides a session forward when
//! it is within a day of expiry: the rotation is a conditional update on
//! the old token, so concurrent validations cannot both mint a
//! replacement.

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use std::sync::Arc;

use eduvate_core::{
    errors::AuthError,
    models::{
        account::{Account, MessageResponse, UserView},
        session::{
            AuthenticateRequest, ChangePasswordRequest, SessionResponse, ToggleMfaRequest,
            ValidateSessionRequest,
        },
    },
    password::validate_password,
    roles::{resolve_primary_role, Role, RoleAssignment},
};
use eduvate_db::models::{DbAccount, DbRoleAssignment};
use eduvate_db::repositories::{account, role};

use crate::{
    auth::{credentials, tokens, SESSION_ROTATE_WITHIN_HOURS, SESSION_TTL_DAYS},
    handlers::normalize_email,
    middleware::error_handling::AppError,
    ApiState,
};

/// Uniform message for every credential failure; never distinguishes
/// "no such email" from "wrong password" or "disabled".
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub(crate) fn to_role_assignments(rows: &[DbRoleAssignment]) -> Vec<RoleAssignment> {
    rows.iter()
        .filter_map(|row| match Role::parse(&row.role) {
            Some(role) => Some(RoleAssignment {
                role,
                tenant_id: row.tenant_id,
            }),
            None => {
                tracing::warn!(
                    "Ignoring unknown role '{}' on account {}",
                    row.role,
                    row.account_id
                );
                None
            }
        })
        .collect()
}

/// Resolves and checks the caller's session for privileged endpoints.
/// No slide-forward here; only `validate_session` rotates tokens.
pub(crate) async fn require_session(
    state: &ApiState,
    session_token: &str,
) -> Result<(DbAccount, Vec<RoleAssignment>), AuthError> {
    let caller = account::get_account_by_session_token(&state.db_pool, session_token)
        .await
        .map_err(AuthError::Database)?
        .ok_or_else(|| AuthError::Authentication("Invalid session".to_string()))?;

    let expires_at = caller
        .session_expires_at
        .ok_or_else(|| AuthError::Authentication("Invalid session".to_string()))?;
    if expires_at <= Utc::now() {
        account::clear_session(&state.db_pool, caller.id)
            .await
            .map_err(AuthError::Database)?;
        return Err(AuthError::Authentication("Session expired".to_string()));
    }

    if !caller.is_active {
        return Err(AuthError::StateConflict("Account is disabled".to_string()));
    }

    let role_rows = role::get_roles_for_account(&state.db_pool, caller.id)
        .await
        .map_err(AuthError::Database)?;

    Ok((caller, to_role_assignments(&role_rows)))
}

fn session_response(
    db_account: DbAccount,
    assignments: Vec<RoleAssignment>,
    session_token: String,
    session_expires_at: chrono::DateTime<Utc>,
) -> SessionResponse {
    let account: Account = db_account.into();
    let primary_role = resolve_primary_role(&assignments, account.tenant_id);

    SessionResponse {
        success: true,
        user: UserView::from(&account),
        roles: assignments,
        primary_role,
        session_token,
        session_expires_at,
    }
}

#[axum::debug_handler]
pub async fn authenticate(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<AuthenticateRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let email = normalize_email(&payload.email)?;

    let db_account = account::get_account_by_email(&state.db_pool, &email)
        .await?
        .ok_or_else(|| AuthError::Authentication(INVALID_CREDENTIALS.to_string()))?;

    // No digest at all means the invitation was never consumed. Reported
    // distinctly so the client can route the user to activation.
    let stored_digest = match &db_account.password_digest {
        Some(digest) => digest.clone(),
        None => {
            return Err(AppError(AuthError::StateConflict(
                "Account pending activation. Set a password using your invitation link."
                    .to_string(),
            )))
        }
    };

    if !db_account.is_active {
        tracing::warn!("Sign-in attempt on inactive account {}", db_account.id);
        return Err(AppError(AuthError::Authentication(
            INVALID_CREDENTIALS.to_string(),
        )));
    }

    let outcome = credentials::verify_password(&payload.password, &stored_digest);
    if !outcome.valid {
        tracing::warn!("Failed sign-in for account {}", db_account.id);
        return Err(AppError(AuthError::Authentication(
            INVALID_CREDENTIALS.to_string(),
        )));
    }

    // Opportunistic digest rewrite; a failure here must not block sign-in.
    if let Some(fresh) = outcome.rewrite_digest {
        if let Err(err) =
            account::set_password_digest(&state.db_pool, db_account.id, &fresh, false).await
        {
            tracing::warn!("Digest rewrite failed for account {}: {}", db_account.id, err);
        }
    }

    let session_token = tokens::new_token();
    let session_expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    account::issue_session(&state.db_pool, db_account.id, &session_token, session_expires_at)
        .await?;

    let role_rows = role::get_roles_for_account(&state.db_pool, db_account.id).await?;
    let assignments = to_role_assignments(&role_rows);

    tracing::info!("Account {} signed in", db_account.id);

    Ok(Json(session_response(
        db_account,
        assignments,
        session_token,
        session_expires_at,
    )))
}

#[axum::debug_handler]
pub async fn validate_session(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ValidateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let db_account = account::get_account_by_session_token(&state.db_pool, &payload.session_token)
        .await?
        .ok_or_else(|| AuthError::Authentication("Invalid session".to_string()))?;

    let expires_at = db_account
        .session_expires_at
        .ok_or_else(|| AuthError::Authentication("Invalid session".to_string()))?;

    let now = Utc::now();
    if expires_at <= now {
        // Lazy expiry: the stale token is cleared as a side effect.
        account::clear_session(&state.db_pool, db_account.id).await?;
        return Err(AppError(AuthError::Authentication(
            "Session expired".to_string(),
        )));
    }

    if !db_account.is_active {
        return Err(AppError(AuthError::StateConflict(
            "Account is disabled".to_string(),
        )));
    }

    // Slide-forward: rotate when under the threshold. The conditional
    // update loses cleanly if a concurrent call already rotated.
    let (session_token, session_expires_at) =
        if expires_at - now < Duration::hours(SESSION_ROTATE_WITHIN_HOURS) {
            let new_token = tokens::new_token();
            let new_expires_at = now + Duration::days(SESSION_TTL_DAYS);
            let rotated = account::rotate_session(
                &state.db_pool,
                db_account.id,
                &payload.session_token,
                &new_token,
                new_expires_at,
            )
            .await?;
            if !rotated {
                return Err(AppError(AuthError::Authentication(
                    "Invalid session".to_string(),
                )));
            }
            (new_token, new_expires_at)
        } else {
            (payload.session_token.clone(), expires_at)
        };

    // Role/tenant resolution is re-run on every validation; it is never
    // cached beyond the assignment rows themselves.
    let role_rows = role::get_roles_for_account(&state.db_pool, db_account.id).await?;
    let assignments = to_role_assignments(&role_rows);

    Ok(Json(session_response(
        db_account,
        assignments,
        session_token,
        session_expires_at,
    )))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // Same validity rules as every other session-authenticated path,
    // including the disabled-account rejection.
    let (db_account, _roles) = require_session(&state, &payload.session_token).await?;

    // The presented session must belong to the account being changed.
    if db_account.id != payload.user_id {
        return Err(AppError(AuthError::Authentication(
            "Session mismatch".to_string(),
        )));
    }

    let stored_digest = db_account.password_digest.as_deref().ok_or_else(|| {
        AuthError::StateConflict("Account pending activation".to_string())
    })?;
    if !credentials::verify_password(&payload.current_password, stored_digest).valid {
        return Err(AppError(AuthError::Authentication(
            "Current password is incorrect".to_string(),
        )));
    }

    validate_password(&payload.new_password).map_err(AuthError::Validation)?;

    let digest = credentials::hash_password(&payload.new_password)?;
    account::set_password_digest(&state.db_pool, db_account.id, &digest, false).await?;

    tracing::info!("Account {} changed its password", db_account.id);

    Ok(Json(MessageResponse::ok("Password updated")))
}

#[axum::debug_handler]
pub async fn toggle_mfa(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ToggleMfaRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (caller, _roles) = require_session(&state, &payload.session_token).await?;

    account::update_mfa(
        &state.db_pool,
        caller.id,
        payload.enabled,
        payload.mfa_type.as_deref(),
    )
    .await?;

    tracing::info!(
        "Account {} {} MFA",
        caller.id,
        if payload.enabled { "enabled" } else { "disabled" }
    );

    Ok(Json(MessageResponse::ok("MFA settings updated")))
}
