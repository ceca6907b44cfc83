//! Invitation and activation: verifying a teacher/student email against
//! the school directory, auto-provisioning the login account, issuing the
//! activation link, and consuming the token to set the first password.
//!
//! Re-running verification for the same email is harmless: the resolver
//! finds the already-provisioned account and a fresh token simply
//! replaces the outstanding one (the old link stops working).

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use eduvate_core::{
    errors::AuthError,
    models::account::{
        AccountKind, MessageResponse, SetPasswordRequest, SetPasswordResponse, TokenMode,
        VerifyAccountRequest,
    },
    password::validate_password,
};
use eduvate_db::models::DbAccount;
use eduvate_db::repositories::{account, directory, role};

use crate::{
    auth::{credentials, tokens, INVITATION_TTL_DAYS},
    handlers::normalize_email,
    middleware::error_handling::AppError,
    ApiState,
};

/// Outcome of resolving an email + school identifier to an activatable
/// account. `AlreadyActive` is a normal outcome, not an error: it tells
/// the caller not to send another invitation.
#[derive(Debug)]
pub(crate) enum ActivationLookup {
    Resolved(DbAccount),
    AlreadyActive,
    TenantNotFound,
    BackingRecordNotFound,
}

/// Finds or auto-provisions the account backing an activation request.
///
/// Idempotent: a second call for the same email/tenant finds the account
/// the first call created rather than inserting a duplicate. Provisioning
/// also grants the default role matching the backing-record kind.
pub(crate) async fn resolve_account_for_activation(
    pool: &Pool<Postgres>,
    email: &str,
    school_identifier: &str,
    kind: AccountKind,
) -> eyre::Result<ActivationLookup> {
    let tenant = match directory::get_tenant_by_identifier(pool, school_identifier).await? {
        Some(tenant) => tenant,
        None => return Ok(ActivationLookup::TenantNotFound),
    };

    if let Some(existing) = account::get_account_for_activation(pool, email, tenant.id, kind).await?
    {
        if existing.is_active {
            return Ok(ActivationLookup::AlreadyActive);
        }
        return Ok(ActivationLookup::Resolved(existing));
    }

    let (backing_id, first_name, last_name, phone) = match kind {
        AccountKind::Teacher => match directory::get_teacher_by_email(pool, tenant.id, email).await? {
            Some(teacher) => (teacher.id, teacher.first_name, teacher.last_name, teacher.phone),
            None => return Ok(ActivationLookup::BackingRecordNotFound),
        },
        AccountKind::Student => match directory::get_student_by_email(pool, tenant.id, email).await? {
            Some(student) => (student.id, student.first_name, student.last_name, student.phone),
            None => return Ok(ActivationLookup::BackingRecordNotFound),
        },
    };

    let provisioned = account::create_provisioned_account(
        pool,
        email,
        first_name.as_deref(),
        last_name.as_deref(),
        phone.as_deref(),
        tenant.id,
        kind,
        backing_id,
    )
    .await?;

    role::create_role_assignment(pool, provisioned.id, kind.as_str(), Some(tenant.id), None)
        .await?;

    if provisioned.is_active {
        // The race loser can land on an account activated in between.
        return Ok(ActivationLookup::AlreadyActive);
    }

    Ok(ActivationLookup::Resolved(provisioned))
}

fn activation_link(base_url: &str, token: &str) -> String {
    format!("{}/activate?token={}", base_url.trim_end_matches('/'), token)
}

async fn verify_account(
    state: Arc<ApiState>,
    kind: AccountKind,
    payload: VerifyAccountRequest,
) -> Result<Json<MessageResponse>, AppError> {
    let email = normalize_email(&payload.email)?;

    let resolved = resolve_account_for_activation(
        &state.db_pool,
        &email,
        &payload.school_identifier,
        kind,
    )
    .await?;

    let target = match resolved {
        ActivationLookup::TenantNotFound => {
            return Err(AppError(AuthError::NotFound("School not found".to_string())))
        }
        ActivationLookup::BackingRecordNotFound => {
            return Err(AppError(AuthError::NotFound(format!(
                "No {} record matches this email at this school",
                kind.as_str()
            ))))
        }
        ActivationLookup::AlreadyActive => {
            return Err(AppError(AuthError::StateConflict(
                "This account is already active. Sign in instead.".to_string(),
            )))
        }
        ActivationLookup::Resolved(account) => account,
    };

    // A new token replaces any outstanding one.
    let token = tokens::new_token();
    let expires_at = Utc::now() + Duration::days(INVITATION_TTL_DAYS);
    account::set_invitation_token(&state.db_pool, target.id, &token, expires_at).await?;

    let base_url = payload
        .app_base_url
        .as_deref()
        .unwrap_or(&state.config.app_base_url);
    let link = activation_link(base_url, &token);

    let html = format!(
        "<p>Welcome to EduVate!</p>\
         <p>Click the link below to activate your account and choose a password. \
         The link is valid for {INVITATION_TTL_DAYS} days.</p>\
         <p><a href=\"{link}\">Activate my account</a></p>"
    );

    match state
        .mailer
        .send(&email, "Activate your EduVate account", &html)
        .await
    {
        Ok(()) => {
            tracing::info!("Invitation issued for account {}", target.id);
            Ok(Json(MessageResponse::ok(format!(
                "Invitation sent to {email}"
            ))))
        }
        Err(err) => {
            // The token is already persisted; an administrator can hand
            // the link over out-of-band.
            tracing::warn!(
                "Invitation mail for account {} failed to send: {}",
                target.id,
                err
            );
            Ok(Json(MessageResponse::ok_with_warning(
                "Invitation created",
                "The invitation email could not be delivered; an administrator can resend the activation link",
            )))
        }
    }
}

#[axum::debug_handler]
pub async fn verify_teacher_account(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<VerifyAccountRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    verify_account(state, AccountKind::Teacher, payload).await
}

#[axum::debug_handler]
pub async fn verify_student_account(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<VerifyAccountRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    verify_account(state, AccountKind::Student, payload).await
}

/// Consumes an invitation or reset token and sets the account password.
///
/// The mode is inferred from the account: a row that already has a digest
/// is doing a reset, one without is activating for the first time. The
/// final consumption is a single conditional update, so a token can only
/// ever be spent once even under concurrent calls.
#[axum::debug_handler]
pub async fn set_password(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<Json<SetPasswordResponse>, AppError> {
    validate_password(&payload.password).map_err(AuthError::Validation)?;

    let target = account::get_account_by_invitation_token(&state.db_pool, &payload.token)
        .await?
        .ok_or_else(|| {
            AuthError::NotFound("Invalid or already used activation link".to_string())
        })?;

    // Valid only while expiry is strictly in the future; a token expiring
    // exactly now is dead. Matches the conditional update's predicate.
    let expired = match target.invitation_expires_at {
        Some(expires_at) => expires_at <= Utc::now(),
        None => true,
    };
    if expired {
        return Err(AppError(AuthError::StateConflict(
            "This link has expired. Request a new one.".to_string(),
        )));
    }

    let mode = if target.password_digest.is_some() {
        TokenMode::Reset
    } else {
        TokenMode::Activation
    };

    // Reset tokens are valid on active accounts by design; activation
    // tokens are not.
    if mode == TokenMode::Activation && target.is_active {
        return Err(AppError(AuthError::StateConflict(
            "This account is already active. Sign in instead.".to_string(),
        )));
    }

    let digest = credentials::hash_password(&payload.password)?;
    let consumed = account::consume_invitation_token(
        &state.db_pool,
        &payload.token,
        &digest,
        mode == TokenMode::Reset,
    )
    .await?
    .ok_or_else(|| {
        AuthError::NotFound("Invalid or already used activation link".to_string())
    })?;

    tracing::info!(
        "Account {} consumed {} token",
        consumed.id,
        match mode {
            TokenMode::Activation => "activation",
            TokenMode::Reset => "reset",
        }
    );

    Ok(Json(SetPasswordResponse {
        success: true,
        mode,
        email: consumed.email,
    }))
}
