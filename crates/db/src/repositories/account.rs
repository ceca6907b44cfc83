use crate::models::DbAccount;
use chrono::{DateTime, Utc};
use eduvate_core::models::account::AccountKind;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_account_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAccount>> {
    tracing::debug!("Getting account by id: {}", id);

    let account = sqlx::query_as::<_, DbAccount>(
        r#"
        SELECT * FROM accounts WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Email lookup is case-insensitive; rows store lowercased addresses but
/// legacy imports are not guaranteed to.
pub async fn get_account_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<DbAccount>> {
    let account = sqlx::query_as::<_, DbAccount>(
        r#"
        SELECT * FROM accounts WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

pub async fn get_account_by_session_token(
    pool: &Pool<Postgres>,
    session_token: &str,
) -> Result<Option<DbAccount>> {
    let account = sqlx::query_as::<_, DbAccount>(
        r#"
        SELECT * FROM accounts WHERE session_token = $1
        "#,
    )
    .bind(session_token)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

pub async fn get_account_by_invitation_token(
    pool: &Pool<Postgres>,
    invitation_token: &str,
) -> Result<Option<DbAccount>> {
    let account = sqlx::query_as::<_, DbAccount>(
        r#"
        SELECT * FROM accounts WHERE invitation_token = $1
        "#,
    )
    .bind(invitation_token)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Finds an account for the activation flow: same tenant, same email, and
/// linked to a backing record of the right kind.
pub async fn get_account_for_activation(
    pool: &Pool<Postgres>,
    email: &str,
    tenant_id: Uuid,
    kind: AccountKind,
) -> Result<Option<DbAccount>> {
    tracing::debug!(
        "Looking up {} account for activation: email={}, tenant={}",
        kind.as_str(),
        email,
        tenant_id
    );

    let backing_column = match kind {
        AccountKind::Teacher => "teacher_id",
        AccountKind::Student => "student_id",
    };

    let sql = format!(
        "SELECT * FROM accounts \
         WHERE LOWER(email) = LOWER($1) AND tenant_id = $2 AND {backing_column} IS NOT NULL"
    );

    let account = sqlx::query_as::<_, DbAccount>(&sql)
        .bind(email)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

    Ok(account)
}

/// Auto-provisions an inactive account bound to a backing record. No
/// password, no session; activation happens via the invitation token.
///
/// `ON CONFLICT (email) DO NOTHING` keeps re-invocations idempotent: when a
/// concurrent call won the insert, the follow-up select returns its row.
pub async fn create_provisioned_account(
    pool: &Pool<Postgres>,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    phone: Option<&str>,
    tenant_id: Uuid,
    kind: AccountKind,
    backing_id: Uuid,
) -> Result<DbAccount> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Provisioning inactive {} account: id={}, email={}, tenant={}",
        kind.as_str(),
        id,
        email,
        tenant_id
    );

    let backing_column = match kind {
        AccountKind::Teacher => "teacher_id",
        AccountKind::Student => "student_id",
    };

    let sql = format!(
        "INSERT INTO accounts \
         (id, email, first_name, last_name, phone, is_active, tenant_id, {backing_column}) \
         VALUES ($1, LOWER($2), $3, $4, $5, FALSE, $6, $7) \
         ON CONFLICT (email) DO NOTHING \
         RETURNING *"
    );

    let inserted = sqlx::query_as::<_, DbAccount>(&sql)
        .bind(id)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .bind(tenant_id)
        .bind(backing_id)
        .fetch_optional(pool)
        .await?;

    match inserted {
        Some(account) => Ok(account),
        None => {
            // Lost the race; the existing row is the one we want.
            let existing = get_account_by_email(pool, email).await?;
            existing.ok_or_else(|| eyre::eyre!("Account insert conflicted but row not found"))
        }
    }
}

/// Overwrites any outstanding invitation/reset token. The prior link, if
/// one was issued, silently stops working.
pub async fn set_invitation_token(
    pool: &Pool<Postgres>,
    account_id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE accounts
        SET invitation_token = $2, invitation_expires_at = $3
        WHERE id = $1
        "#,
    )
    .bind(account_id)
    .bind(token)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Consumes an invitation/reset token in one conditional update.
///
/// The WHERE clause re-checks the token and its expiry, so two concurrent
/// consumers cannot both succeed: the loser matches zero rows and gets
/// `None`. Reset mode additionally clears the session to force a re-login
/// with the new credential.
pub async fn consume_invitation_token(
    pool: &Pool<Postgres>,
    token: &str,
    password_digest: &str,
    clear_session: bool,
) -> Result<Option<DbAccount>> {
    tracing::debug!("Consuming invitation token (clear_session={})", clear_session);

    let account = if clear_session {
        sqlx::query_as::<_, DbAccount>(
            r#"
            UPDATE accounts
            SET password_digest = $2,
                is_active = TRUE,
                invitation_token = NULL,
                invitation_expires_at = NULL,
                session_token = NULL,
                session_expires_at = NULL
            WHERE invitation_token = $1 AND invitation_expires_at > NOW()
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(password_digest)
        .fetch_optional(pool)
        .await?
    } else {
        sqlx::query_as::<_, DbAccount>(
            r#"
            UPDATE accounts
            SET password_digest = $2,
                is_active = TRUE,
                invitation_token = NULL,
                invitation_expires_at = NULL
            WHERE invitation_token = $1 AND invitation_expires_at > NOW()
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(password_digest)
        .fetch_optional(pool)
        .await?
    };

    Ok(account)
}

/// Issues a fresh session, overwriting any prior token (single live
/// session per account), and records the login time.
pub async fn issue_session(
    pool: &Pool<Postgres>,
    account_id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    tracing::debug!("Issuing session for account {}", account_id);

    sqlx::query(
        r#"
        UPDATE accounts
        SET session_token = $2, session_expires_at = $3, last_login_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(account_id)
    .bind(token)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Slide-forward rotation: replaces the session token only if the old one
/// still matches. Returns false when another request rotated it first.
pub async fn rotate_session(
    pool: &Pool<Postgres>,
    account_id: Uuid,
    old_token: &str,
    new_token: &str,
    new_expires_at: DateTime<Utc>,
) -> Result<bool> {
    tracing::debug!("Rotating session for account {}", account_id);

    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET session_token = $3, session_expires_at = $4
        WHERE id = $1 AND session_token = $2
        "#,
    )
    .bind(account_id)
    .bind(old_token)
    .bind(new_token)
    .bind(new_expires_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn clear_session(pool: &Pool<Postgres>, account_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE accounts
        SET session_token = NULL, session_expires_at = NULL
        WHERE id = $1
        "#,
    )
    .bind(account_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_password_digest(
    pool: &Pool<Postgres>,
    account_id: Uuid,
    digest: &str,
    clear_session: bool,
) -> Result<()> {
    if clear_session {
        sqlx::query(
            r#"
            UPDATE accounts
            SET password_digest = $2, session_token = NULL, session_expires_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(digest)
        .execute(pool)
        .await?;
    } else {
        sqlx::query(
            r#"
            UPDATE accounts SET password_digest = $2 WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(digest)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn update_mfa(
    pool: &Pool<Postgres>,
    account_id: Uuid,
    enabled: bool,
    mfa_type: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE accounts SET mfa_enabled = $2, mfa_type = $3 WHERE id = $1
        "#,
    )
    .bind(account_id)
    .bind(enabled)
    .bind(mfa_type)
    .execute(pool)
    .await?;

    Ok(())
}

/// Role assignments go with the account via the FK cascade; the explicit
/// delete in the role repository covers schemas migrated before the
/// cascade existed.
pub async fn delete_account(pool: &Pool<Postgres>, account_id: Uuid) -> Result<()> {
    tracing::debug!("Deleting account {}", account_id);

    sqlx::query(
        r#"
        DELETE FROM accounts WHERE id = $1
        "#,
    )
    .bind(account_id)
    .execute(pool)
    .await?;

    Ok(())
}
