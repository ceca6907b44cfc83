use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Tenants, teachers, and students belong to the wider platform schema;
    // they are created here so the auth core can run standalone.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenants (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            identifier VARCHAR(255) NOT NULL UNIQUE,
            name VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teachers (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tenant_id UUID NOT NULL REFERENCES tenants(id),
            email VARCHAR(255) NOT NULL,
            first_name VARCHAR(255) NULL,
            last_name VARCHAR(255) NULL,
            phone VARCHAR(64) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tenant_id UUID NOT NULL REFERENCES tenants(id),
            email VARCHAR(255) NOT NULL,
            first_name VARCHAR(255) NULL,
            last_name VARCHAR(255) NULL,
            phone VARCHAR(64) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Emails are stored lowercased; uniqueness is case-insensitive by
    // construction. Session and invitation tokens are opaque and unique.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(255) NOT NULL UNIQUE,
            first_name VARCHAR(255) NULL,
            last_name VARCHAR(255) NULL,
            phone VARCHAR(64) NULL,
            avatar_url VARCHAR(1024) NULL,
            is_active BOOLEAN NOT NULL DEFAULT FALSE,
            password_digest TEXT NULL,
            session_token TEXT NULL UNIQUE,
            session_expires_at TIMESTAMP WITH TIME ZONE NULL,
            invitation_token TEXT NULL UNIQUE,
            invitation_expires_at TIMESTAMP WITH TIME ZONE NULL,
            teacher_id UUID NULL REFERENCES teachers(id),
            student_id UUID NULL REFERENCES students(id),
            tenant_id UUID NULL REFERENCES tenants(id),
            mfa_enabled BOOLEAN NOT NULL DEFAULT FALSE,
            mfa_type VARCHAR(32) NULL,
            mfa_code VARCHAR(64) NULL,
            last_login_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS role_assignments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            role VARCHAR(32) NOT NULL,
            tenant_id UUID NULL REFERENCES tenants(id),
            granted_by UUID NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT role_assignments_unique UNIQUE (account_id, role, tenant_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_accounts_session_token ON accounts(session_token);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_accounts_invitation_token ON accounts(invitation_token);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_role_assignments_account ON role_assignments(account_id);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_teachers_email ON teachers(tenant_id, LOWER(email));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_students_email ON students(tenant_id, LOWER(email));
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized");
    Ok(())
}
