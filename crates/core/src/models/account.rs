use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of backing record an account is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Teacher,
    Student,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Teacher => "teacher",
            AccountKind::Student => "student",
        }
    }
}

/// A login-capable identity.
///
/// Session and invitation state live directly on the account: one live
/// session token at most, and one outstanding invitation/reset token at
/// most. A `session_expires_at` in the past is equivalent to no session;
/// expiry is lazy, nothing sweeps stale rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub password_digest: Option<String>,
    pub session_token: Option<String>,
    pub session_expires_at: Option<DateTime<Utc>>,
    pub invitation_token: Option<String>,
    pub invitation_expires_at: Option<DateTime<Utc>>,
    pub teacher_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub mfa_enabled: bool,
    pub mfa_type: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The public projection of an account returned to clients. Never carries
/// credential or token material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub teacher_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub mfa_enabled: bool,
    pub mfa_type: Option<String>,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        UserView {
            id: account.id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            phone: account.phone.clone(),
            avatar_url: account.avatar_url.clone(),
            is_active: account.is_active,
            teacher_id: account.teacher_id,
            student_id: account.student_id,
            tenant_id: account.tenant_id,
            mfa_enabled: account.mfa_enabled,
            mfa_type: account.mfa_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyAccountRequest {
    pub email: String,
    pub school_identifier: String,
    pub app_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Whether a consumed token activated the account or reset its password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMode {
    Activation,
    Reset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPasswordResponse {
    pub success: bool,
    pub mode: TokenMode,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPasswordResetRequest {
    pub email: String,
    pub app_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResetPasswordRequest {
    pub session_token: String,
    pub user_id: Uuid,
    pub new_password: Option<String>,
}

/// The generated password is shown exactly once, in this response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResetPasswordResponse {
    pub success: bool,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountRequest {
    pub session_token: String,
    pub user_id: Uuid,
}

/// Generic success envelope. `warning` is set when a side effect (mail
/// delivery) failed but the operation itself went through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        MessageResponse {
            success: true,
            message: message.into(),
            warning: None,
        }
    }

    pub fn ok_with_warning(message: impl Into<String>, warning: impl Into<String>) -> Self {
        MessageResponse {
            success: true,
            message: message.into(),
            warning: Some(warning.into()),
        }
    }
}
