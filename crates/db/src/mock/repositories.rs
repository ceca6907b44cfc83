use chrono::{DateTime, Utc};
use eduvate_core::models::account::AccountKind;
use mockall::mock;
use uuid::Uuid;

use crate::models::{DbAccount, DbRoleAssignment, DbStudent, DbTeacher, DbTenant};

// Mock repositories for testing

mock! {
    pub AccountRepo {
        pub async fn get_account_by_id(&self, id: Uuid) -> eyre::Result<Option<DbAccount>>;

        pub async fn get_account_by_email(
            &self,
            email: &'static str,
        ) -> eyre::Result<Option<DbAccount>>;

        pub async fn get_account_by_session_token(
            &self,
            session_token: &'static str,
        ) -> eyre::Result<Option<DbAccount>>;

        pub async fn get_account_by_invitation_token(
            &self,
            invitation_token: &'static str,
        ) -> eyre::Result<Option<DbAccount>>;

        pub async fn get_account_for_activation(
            &self,
            email: &'static str,
            tenant_id: Uuid,
            kind: AccountKind,
        ) -> eyre::Result<Option<DbAccount>>;

        pub async fn create_provisioned_account(
            &self,
            email: &'static str,
            tenant_id: Uuid,
            kind: AccountKind,
            backing_id: Uuid,
        ) -> eyre::Result<DbAccount>;

        pub async fn set_invitation_token(
            &self,
            account_id: Uuid,
            token: &'static str,
            expires_at: DateTime<Utc>,
        ) -> eyre::Result<()>;

        pub async fn consume_invitation_token(
            &self,
            token: &'static str,
            password_digest: &'static str,
            clear_session: bool,
        ) -> eyre::Result<Option<DbAccount>>;

        pub async fn issue_session(
            &self,
            account_id: Uuid,
            token: &'static str,
            expires_at: DateTime<Utc>,
        ) -> eyre::Result<()>;

        pub async fn rotate_session(
            &self,
            account_id: Uuid,
            old_token: &'static str,
            new_token: &'static str,
            new_expires_at: DateTime<Utc>,
        ) -> eyre::Result<bool>;

        pub async fn clear_session(&self, account_id: Uuid) -> eyre::Result<()>;

        pub async fn set_password_digest(
            &self,
            account_id: Uuid,
            digest: &'static str,
            clear_session: bool,
        ) -> eyre::Result<()>;

        pub async fn update_mfa(
            &self,
            account_id: Uuid,
            enabled: bool,
            mfa_type: Option<&'static str>,
        ) -> eyre::Result<()>;

        pub async fn delete_account(&self, account_id: Uuid) -> eyre::Result<()>;
    }
}

mock! {
    pub RoleRepo {
        pub async fn get_roles_for_account(
            &self,
            account_id: Uuid,
        ) -> eyre::Result<Vec<DbRoleAssignment>>;

        pub async fn create_role_assignment(
            &self,
            account_id: Uuid,
            role: &'static str,
            tenant_id: Option<Uuid>,
            granted_by: Option<Uuid>,
        ) -> eyre::Result<()>;

        pub async fn delete_roles_for_account(&self, account_id: Uuid) -> eyre::Result<()>;
    }
}

mock! {
    pub DirectoryRepo {
        pub async fn get_tenant_by_identifier(
            &self,
            identifier: &'static str,
        ) -> eyre::Result<Option<DbTenant>>;

        pub async fn get_teacher_by_email(
            &self,
            tenant_id: Uuid,
            email: &'static str,
        ) -> eyre::Result<Option<DbTeacher>>;

        pub async fn get_student_by_email(
            &self,
            tenant_id: Uuid,
            email: &'static str,
        ) -> eyre::Result<Option<DbStudent>>;
    }
}
