use crate::models::DbRoleAssignment;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_roles_for_account(
    pool: &Pool<Postgres>,
    account_id: Uuid,
) -> Result<Vec<DbRoleAssignment>> {
    let roles = sqlx::query_as::<_, DbRoleAssignment>(
        r#"
        SELECT * FROM role_assignments WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(roles)
}

/// Idempotent: the unique constraint on (account_id, role, tenant_id)
/// makes repeat grants a no-op.
pub async fn create_role_assignment(
    pool: &Pool<Postgres>,
    account_id: Uuid,
    role: &str,
    tenant_id: Option<Uuid>,
    granted_by: Option<Uuid>,
) -> Result<()> {
    tracing::debug!(
        "Granting role {} to account {} (tenant: {:?})",
        role,
        account_id,
        tenant_id
    );

    sqlx::query(
        r#"
        INSERT INTO role_assignments (account_id, role, tenant_id, granted_by)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT ON CONSTRAINT role_assignments_unique DO NOTHING
        "#,
    )
    .bind(account_id)
    .bind(role)
    .bind(tenant_id)
    .bind(granted_by)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_roles_for_account(pool: &Pool<Postgres>, account_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM role_assignments WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .execute(pool)
    .await?;

    Ok(())
}
