use chrono::{DateTime, Utc};
use eduvate_core::models::account::Account;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAccount {
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
    pub mfa_code: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<DbAccount> for Account {
    fn from(row: DbAccount) -> Self {
        Account {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            avatar_url: row.avatar_url,
            is_active: row.is_active,
            password_digest: row.password_digest,
            session_token: row.session_token,
            session_expires_at: row.session_expires_at,
            invitation_token: row.invitation_token,
            invitation_expires_at: row.invitation_expires_at,
            teacher_id: row.teacher_id,
            student_id: row.student_id,
            tenant_id: row.tenant_id,
            mfa_enabled: row.mfa_enabled,
            mfa_type: row.mfa_type,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRoleAssignment {
    pub id: Uuid,
    pub account_id: Uuid,
    pub role: String,
    pub tenant_id: Option<Uuid>,
    pub granted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// External collaborator rows. The auth core only reads these.

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTenant {
    pub id: Uuid,
    pub identifier: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTeacher {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStudent {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}
