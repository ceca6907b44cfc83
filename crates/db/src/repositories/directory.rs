//! Read-only lookups against the platform's tenant/teacher/student tables.
//! The auth core never writes to these; they belong to the school
//! management side of the schema.

use crate::models::{DbStudent, DbTeacher, DbTenant};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_tenant_by_identifier(
    pool: &Pool<Postgres>,
    identifier: &str,
) -> Result<Option<DbTenant>> {
    tracing::debug!("Looking up tenant by identifier: {}", identifier);

    let tenant = sqlx::query_as::<_, DbTenant>(
        r#"
        SELECT * FROM tenants WHERE identifier = $1
        "#,
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(tenant)
}

pub async fn get_teacher_by_email(
    pool: &Pool<Postgres>,
    tenant_id: Uuid,
    email: &str,
) -> Result<Option<DbTeacher>> {
    let teacher = sqlx::query_as::<_, DbTeacher>(
        r#"
        SELECT * FROM teachers WHERE tenant_id = $1 AND LOWER(email) = LOWER($2)
        "#,
    )
    .bind(tenant_id)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(teacher)
}

pub async fn get_student_by_email(
    pool: &Pool<Postgres>,
    tenant_id: Uuid,
    email: &str,
) -> Result<Option<DbStudent>> {
    let student = sqlx::query_as::<_, DbStudent>(
        r#"
        SELECT * FROM students WHERE tenant_id = $1 AND LOWER(email) = LOWER($2)
        "#,
    )
    .bind(tenant_id)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(student)
}
