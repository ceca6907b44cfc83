use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::UserView;
use crate::roles::{PrimaryRole, RoleAssignment};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateSessionRequest {
    pub session_token: String,
}

/// Returned by both authenticate and validate-session.
///
/// `session_token` may differ from the token the client presented: when a
/// session is within a day of expiry, validation rotates it and the old
/// token stops working. Clients must always store the returned token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: UserView,
    pub roles: Vec<RoleAssignment>,
    pub primary_role: PrimaryRole,
    pub session_token: String,
    pub session_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub user_id: Uuid,
    pub current_password: String,
    pub new_password: String,
    pub session_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleMfaRequest {
    pub session_token: String,
    pub enabled: bool,
    pub mfa_type: Option<String>,
}
