//! Cache-aside round trips between the durable and ancillary stores.
//!
//! The ancillary store is disposable: wiping it never changes what callers
//! read, and the next read puts the record back.

mod common;

use common::TestApp;
use promo_platform::application::{
    FindCompanyByEmailQuery, FindUserByEmailQuery, GetCompanyQuery, GetUserQuery,
    RegisterCompanyCommand, UpdateUserProfileCommand,
};
use promo_platform::domain::foundation::ErrorCode;
use promo_platform::domain::user::ProfilePatch;

#[tokio::test]
async fn wiped_cache_is_repaired_on_read() {
    let app = TestApp::new();
    let user = app.user("cached@example.com", 30, "US").await;
    let key = format!("user:{}", user.id);
    assert!(app.ancillary.contains_key(&key).await);

    app.ancillary.clear().await;

    let loaded = app
        .handlers
        .get_user
        .handle(GetUserQuery { user_id: user.id })
        .await
        .unwrap();
    assert_eq!(loaded, user);
    assert!(app.ancillary.contains_key(&key).await);
}

#[tokio::test]
async fn email_lookup_survives_a_wiped_index() {
    let app = TestApp::new();
    let company = app.company("Indexed Inc", "team@indexed.io").await;
    let user = app.user("Someone@Example.com", 30, "US").await;

    app.ancillary.clear().await;

    let found_company = app
        .handlers
        .find_company_by_email
        .handle(FindCompanyByEmailQuery {
            email: "team@indexed.io".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(found_company.id, company.id);

    let found_user = app
        .handlers
        .find_user_by_email
        .handle(FindUserByEmailQuery {
            email: "someone@example.com".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(found_user.id, user.id);
}

#[tokio::test]
async fn profile_update_refreshes_cached_copy() {
    let app = TestApp::new();
    let user = app.user("update@example.com", 30, "US").await;

    app.handlers
        .update_user_profile
        .handle(UpdateUserProfileCommand {
            user_id: user.id,
            patch: ProfilePatch {
                name: Some("Robin".to_string()),
                ..ProfilePatch::default()
            },
        })
        .await
        .unwrap();

    let loaded = app
        .handlers
        .get_user
        .handle(GetUserQuery { user_id: user.id })
        .await
        .unwrap();
    assert_eq!(loaded.name, "Robin");
}

#[tokio::test]
async fn duplicate_company_email_conflicts_even_without_cache() {
    let app = TestApp::new();
    let company = app.company("First Firm", "shared@firm.io").await;
    app.ancillary.clear().await;

    let err = app
        .handlers
        .register_company
        .handle(RegisterCompanyCommand {
            name: "Second Firm".to_string(),
            email: "shared@firm.io".to_string(),
            password_hash: "argon2-hash".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);

    let still_first = app
        .handlers
        .get_company
        .handle(GetCompanyQuery {
            company_id: company.id,
        })
        .await
        .unwrap();
    assert_eq!(still_first.name, "First Firm");
}
