use chrono::{DateTime, Duration, Utc};
use mockall::predicate;
use uuid::Uuid;

use eduvate_api::auth::{credentials, tokens, INVITATION_TTL_DAYS};
use eduvate_core::{
    errors::AuthError,
    models::account::{AccountKind, TokenMode},
    password::validate_password,
};
use eduvate_db::models::DbAccount;

use crate::test_utils::{blank_account, student, tenant, with_invitation, TestContext};

#[derive(Debug)]
enum Lookup {
    Resolved(DbAccount),
    AlreadyActive,
    TenantNotFound,
    BackingRecordNotFound,
}

// Wrapper replicating the student-activation resolver against mocks.
async fn resolve_student_wrapper(
    ctx: &TestContext,
    email: &'static str,
    school: &'static str,
) -> eyre::Result<Lookup> {
    let tenant = match ctx.directory_repo.get_tenant_by_identifier(school).await? {
        Some(tenant) => tenant,
        None => return Ok(Lookup::TenantNotFound),
    };

    if let Some(existing) = ctx
        .account_repo
        .get_account_for_activation(email, tenant.id, AccountKind::Student)
        .await?
    {
        if existing.is_active {
            return Ok(Lookup::AlreadyActive);
        }
        return Ok(Lookup::Resolved(existing));
    }

    let backing = match ctx.directory_repo.get_student_by_email(tenant.id, email).await? {
        Some(student) => student,
        None => return Ok(Lookup::BackingRecordNotFound),
    };

    let provisioned = ctx
        .account_repo
        .create_provisioned_account(email, tenant.id, AccountKind::Student, backing.id)
        .await?;
    ctx.role_repo
        .create_role_assignment(provisioned.id, "student", Some(tenant.id), None)
        .await?;

    Ok(Lookup::Resolved(provisioned))
}

// Wrapper replicating token consumption; `now` is injected so the expiry
// boundary can be pinned exactly.
async fn consume_wrapper(
    ctx: &TestContext,
    token: &'static str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<TokenMode, AuthError> {
    validate_password(password).map_err(AuthError::Validation)?;

    let target = ctx
        .account_repo
        .get_account_by_invitation_token(token)
        .await
        .map_err(AuthError::Database)?
        .ok_or_else(|| {
            AuthError::NotFound("Invalid or already used activation link".to_string())
        })?;

    let expired = match target.invitation_expires_at {
        Some(expires_at) => expires_at <= now,
        None => true,
    };
    if expired {
        return Err(AuthError::StateConflict(
            "This link has expired. Request a new one.".to_string(),
        ));
    }

    let mode = if target.password_digest.is_some() {
        TokenMode::Reset
    } else {
        TokenMode::Activation
    };

    if mode == TokenMode::Activation && target.is_active {
        return Err(AuthError::StateConflict(
            "This account is already active. Sign in instead.".to_string(),
        ));
    }

    let digest = credentials::hash_password(password).map_err(AuthError::Database)?;
    let digest_static: &'static str = Box::leak(digest.into_boxed_str());
    ctx.account_repo
        .consume_invitation_token(token, digest_static, mode == TokenMode::Reset)
        .await
        .map_err(AuthError::Database)?
        .ok_or_else(|| {
            AuthError::NotFound("Invalid or already used activation link".to_string())
        })?;

    Ok(mode)
}

#[tokio::test]
async fn unknown_school_identifier_fails() {
    let mut ctx = TestContext::new();
    ctx.directory_repo
        .expect_get_tenant_by_identifier()
        .with(predicate::eq("nope"))
        .returning(|_| Ok(None));

    let lookup = resolve_student_wrapper(&ctx, "a@b.com", "nope").await.unwrap();
    assert!(matches!(lookup, Lookup::TenantNotFound));
}

#[tokio::test]
async fn missing_backing_record_fails() {
    let mut ctx = TestContext::new();
    let school = tenant("lvh");
    let school_id = school.id;
    ctx.directory_repo
        .expect_get_tenant_by_identifier()
        .returning(move |_| Ok(Some(school.clone())));
    ctx.account_repo
        .expect_get_account_for_activation()
        .returning(|_, _, _| Ok(None));
    ctx.directory_repo
        .expect_get_student_by_email()
        .with(predicate::eq(school_id), predicate::eq("a@b.com"))
        .returning(|_, _| Ok(None));

    let lookup = resolve_student_wrapper(&ctx, "a@b.com", "lvh").await.unwrap();
    assert!(matches!(lookup, Lookup::BackingRecordNotFound));
}

#[tokio::test]
async fn new_student_is_provisioned_inactive_with_default_role() {
    let mut ctx = TestContext::new();
    let school = tenant("lvh");
    let school_id = school.id;
    let backing = student(school_id, "a@b.com");
    let backing_id = backing.id;

    ctx.directory_repo
        .expect_get_tenant_by_identifier()
        .returning(move |_| Ok(Some(school.clone())));
    ctx.account_repo
        .expect_get_account_for_activation()
        .returning(|_, _, _| Ok(None));
    ctx.directory_repo
        .expect_get_student_by_email()
        .returning(move |_, _| Ok(Some(backing.clone())));

    let mut provisioned = blank_account("a@b.com");
    provisioned.tenant_id = Some(school_id);
    provisioned.student_id = Some(backing_id);
    let provisioned_id = provisioned.id;
    ctx.account_repo
        .expect_create_provisioned_account()
        .withf(move |email, tenant_id, kind, id| {
            email == "a@b.com"
                && *tenant_id == school_id
                && *kind == AccountKind::Student
                && *id == backing_id
        })
        .times(1)
        .returning(move |_, _, _, _| Ok(provisioned.clone()));
    ctx.role_repo
        .expect_create_role_assignment()
        .with(
            predicate::eq(provisioned_id),
            predicate::eq("student"),
            predicate::eq(Some(school_id)),
            predicate::eq(None::<Uuid>),
        )
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let lookup = resolve_student_wrapper(&ctx, "a@b.com", "lvh").await.unwrap();
    match lookup {
        Lookup::Resolved(account) => {
            assert!(!account.is_active);
            assert!(account.password_digest.is_none());
            assert_eq!(account.student_id, Some(backing_id));
        }
        other => panic!("expected Resolved, got {other:?}"),
    }
}

#[tokio::test]
async fn reinvocation_finds_the_provisioned_account() {
    let mut ctx = TestContext::new();
    let school = tenant("lvh");
    let school_id = school.id;
    ctx.directory_repo
        .expect_get_tenant_by_identifier()
        .returning(move |_| Ok(Some(school.clone())));

    let mut existing = blank_account("a@b.com");
    existing.tenant_id = Some(school_id);
    existing.student_id = Some(Uuid::new_v4());
    ctx.account_repo
        .expect_get_account_for_activation()
        .returning(move |_, _, _| Ok(Some(existing.clone())));
    // No provisioning expectations: a second insert would fail the test.

    let lookup = resolve_student_wrapper(&ctx, "a@b.com", "lvh").await.unwrap();
    assert!(matches!(lookup, Lookup::Resolved(_)));
}

#[tokio::test]
async fn already_active_account_is_a_distinct_outcome() {
    let mut ctx = TestContext::new();
    let school = tenant("lvh");
    let school_id = school.id;
    ctx.directory_repo
        .expect_get_tenant_by_identifier()
        .returning(move |_| Ok(Some(school.clone())));

    let mut existing = blank_account("a@b.com");
    existing.tenant_id = Some(school_id);
    existing.student_id = Some(Uuid::new_v4());
    existing.is_active = true;
    ctx.account_repo
        .expect_get_account_for_activation()
        .returning(move |_, _, _| Ok(Some(existing.clone())));

    let lookup = resolve_student_wrapper(&ctx, "a@b.com", "lvh").await.unwrap();
    assert!(matches!(lookup, Lookup::AlreadyActive));
}

#[tokio::test]
async fn invitation_expiry_is_about_seven_days_out() {
    let mut ctx = TestContext::new();
    let account = blank_account("a@b.com");
    let account_id = account.id;

    ctx.account_repo
        .expect_set_invitation_token()
        .withf(move |id, token, expires_at| {
            let remaining = *expires_at - Utc::now();
            *id == account_id
                && token.len() == 72
                && remaining > Duration::days(INVITATION_TTL_DAYS) - Duration::minutes(1)
                && remaining <= Duration::days(INVITATION_TTL_DAYS)
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let token = tokens::new_token();
    let token_static: &'static str = Box::leak(token.into_boxed_str());
    let expires_at = Utc::now() + Duration::days(INVITATION_TTL_DAYS);
    ctx.account_repo
        .set_invitation_token(account_id, token_static, expires_at)
        .await
        .unwrap();
}

#[tokio::test]
async fn weak_password_is_rejected_with_itemized_rules_before_any_lookup() {
    let ctx = TestContext::new();
    // No mock expectations: any repository call would panic.

    let err = consume_wrapper(&ctx, "some-token", "Weak1", Utc::now())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, AuthError::Validation(_)));
    assert!(message.contains("characters long"));
    assert!(message.contains("special character"));
}

#[tokio::test]
async fn unknown_token_is_invalid() {
    let mut ctx = TestContext::new();
    ctx.account_repo
        .expect_get_account_by_invitation_token()
        .returning(|_| Ok(None));

    let err = consume_wrapper(&ctx, "missing", "Str0ng!Passw0rd", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound(_)));
}

#[tokio::test]
async fn token_expiring_exactly_now_is_expired() {
    let mut ctx = TestContext::new();
    let now = Utc::now();
    let account = with_invitation(blank_account("a@b.com"), "edge-token", now);
    ctx.account_repo
        .expect_get_account_by_invitation_token()
        .returning(move |_| Ok(Some(account.clone())));

    let err = consume_wrapper(&ctx, "edge-token", "Str0ng!Passw0rd", now)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("expired"));
}

#[tokio::test]
async fn activation_sets_mode_and_spends_the_token_once() {
    let mut ctx = TestContext::new();
    let account = with_invitation(
        blank_account("a@b.com"),
        "fresh-token",
        Utc::now() + Duration::days(7),
    );
    let activated = {
        let mut activated = account.clone();
        activated.is_active = true;
        activated.password_digest = Some("$argon2id$placeholder".to_string());
        activated.invitation_token = None;
        activated.invitation_expires_at = None;
        activated
    };

    // First consumption finds the row; after it, the token is cleared.
    let lookup_account = account.clone();
    ctx.account_repo
        .expect_get_account_by_invitation_token()
        .times(1)
        .returning(move |_| Ok(Some(lookup_account.clone())));
    ctx.account_repo
        .expect_consume_invitation_token()
        .withf(|_, digest, clear_session| digest.starts_with("$argon2") && !*clear_session)
        .times(1)
        .returning(move |_, _, _| Ok(Some(activated.clone())));
    ctx.account_repo
        .expect_get_account_by_invitation_token()
        .returning(|_| Ok(None));

    let mode = consume_wrapper(&ctx, "fresh-token", "Str0ng!Passw0rd", Utc::now())
        .await
        .unwrap();
    assert_eq!(mode, TokenMode::Activation);

    // Single-use: the same token now fails as invalid.
    let err = consume_wrapper(&ctx, "fresh-token", "Str0ng!Passw0rd", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound(_)));
}

#[tokio::test]
async fn reset_mode_accepts_active_accounts_and_clears_the_session() {
    let mut ctx = TestContext::new();
    let mut account = with_invitation(
        blank_account("a@b.com"),
        "reset-token",
        Utc::now() + Duration::hours(2),
    );
    account.is_active = true;
    account.password_digest = Some(credentials::hash_password("Old!Passw0rd123").unwrap());

    let consumed = account.clone();
    ctx.account_repo
        .expect_get_account_by_invitation_token()
        .returning(move |_| Ok(Some(account.clone())));
    ctx.account_repo
        .expect_consume_invitation_token()
        .withf(|_, _, clear_session| *clear_session)
        .times(1)
        .returning(move |_, _, _| Ok(Some(consumed.clone())));

    let mode = consume_wrapper(&ctx, "reset-token", "New!Passw0rd456", Utc::now())
        .await
        .unwrap();
    assert_eq!(mode, TokenMode::Reset);
}

#[tokio::test]
async fn activation_token_on_an_active_account_is_rejected() {
    let mut ctx = TestContext::new();
    let mut account = with_invitation(
        blank_account("a@b.com"),
        "late-token",
        Utc::now() + Duration::days(1),
    );
    // Active but digest-less: activation mode with the guard tripped.
    account.is_active = true;
    ctx.account_repo
        .expect_get_account_by_invitation_token()
        .returning(move |_| Ok(Some(account.clone())));

    let err = consume_wrapper(&ctx, "late-token", "Str0ng!Passw0rd", Utc::now())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already active"));
}
