//! Administrative account deletion.
//!
//! The server re-checks authorization regardless of what the client
//! believes the caller's role to be: admin role with matching tenant
//! scope, no self-deletion, and global-admin targets only removable by
//! another global admin.

use axum::{extract::State, Json};
use std::sync::Arc;

use eduvate_core::{
    errors::AuthError,
    models::account::{DeleteAccountRequest, MessageResponse},
    roles::{authorize, check_deletion_allowed, ADMIN_ROLES},
};
use eduvate_db::repositories::{account, role};

use crate::{
    handlers::sessions::{require_session, to_role_assignments},
    middleware::error_handling::AppError,
    ApiState,
};

#[axum::debug_handler]
pub async fn delete_account(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<DeleteAccountRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (caller, caller_roles) = require_session(&state, &payload.session_token).await?;

    let target = account::get_account_by_id(&state.db_pool, payload.user_id)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    let target_role_rows = role::get_roles_for_account(&state.db_pool, target.id).await?;
    let target_roles = to_role_assignments(&target_role_rows);

    check_deletion_allowed(caller.id, &caller_roles, target.id, &target_roles)?;

    if !authorize(&caller_roles, &ADMIN_ROLES, target.tenant_id) {
        return Err(AppError(AuthError::Authorization(
            "You are not allowed to delete accounts for this school".to_string(),
        )));
    }

    // The FK cascade covers assignments too; the explicit delete keeps
    // pre-cascade schemas correct.
    role::delete_roles_for_account(&state.db_pool, target.id).await?;
    account::delete_account(&state.db_pool, target.id).await?;

    tracing::info!("Account {} deleted by {}", target.id, caller.id);

    Ok(Json(MessageResponse::ok("Account deleted")))
}
