//! Concurrent redemptions never hand out more than the promo's capacity.
//!
//! Many tasks race on one promo from a multi-threaded runtime; exactly
//! `capacity` of them succeed and the rest see the promo exhausted.

mod common;

use std::collections::HashSet;

use common::TestApp;
use promo_platform::application::{GetUserPromoQuery, RedeemPromoCommand};
use promo_platform::domain::foundation::{ErrorCategory, PromoId};
use promo_platform::domain::promo::{PromoError, Target, Unavailability};
use promo_platform::domain::user::User;
use promo_platform::ports::PromoRepository;

const CONTENDERS: usize = 24;

async fn contenders(app: &TestApp) -> Vec<User> {
    let mut users = Vec::with_capacity(CONTENDERS);
    for i in 0..CONTENDERS {
        users.push(app.user(&format!("racer{}@example.com", i), 30, "US").await);
    }
    users
}

async fn race(app: &TestApp, users: &[User], promo_id: PromoId) -> Vec<Result<String, PromoError>> {
    let tasks: Vec<_> = users
        .iter()
        .map(|user| {
            let handlers = app.handlers.clone();
            let user_id = user.id;
            tokio::spawn(async move {
                handlers
                    .redeem_promo
                    .handle(RedeemPromoCommand { user_id, promo_id })
                    .await
                    .map(|r| r.promo)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for task in futures::future::join_all(tasks).await {
        results.push(task.expect("redemption task panicked"));
    }
    results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_code_capacity_is_never_exceeded() {
    let app = TestApp::new();
    let company = app.company("Flash Sale Co", "ops@flashsale.io").await;
    let promo = app.common_promo(&company, "FLASH", 5).await;
    let users = contenders(&app).await;

    let results = race(&app, &users, promo.id).await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 5);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.category(), ErrorCategory::PermissionDenied, "{:?}", err);
    }

    let stored = app.db.find_by_id(&promo.id).await.unwrap().unwrap();
    assert_eq!(stored.capacity.used(), 5);
    assert!(!stored.active);
    assert_eq!(app.db.activation_count().await, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_unit_goes_to_exactly_one_contender() {
    let app = TestApp::new();
    let company = app.company("Flash Sale Co", "ops@flashsale.io").await;
    let promo = app.common_promo(&company, "ONLY-ONE", 1).await;
    let users = contenders(&app).await;

    let results = race(&app, &users, promo.id).await;

    let winners: Vec<&String> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners, vec![&"ONLY-ONE".to_string()]);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(
                err,
                PromoError::Unavailable {
                    reason: Unavailability::Exhausted,
                    ..
                }
            ),
            "{:?}",
            err
        );
        assert_eq!(err.category(), ErrorCategory::PermissionDenied);
    }

    let stored = app.db.find_by_id(&promo.id).await.unwrap().unwrap();
    assert_eq!(stored.capacity.used(), 1);
    assert!(!stored.active);
    assert_eq!(app.db.activation_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unique_codes_go_to_distinct_winners() {
    let app = TestApp::new();
    let company = app.company("Flash Sale Co", "ops@flashsale.io").await;
    let pool = ["T-1", "T-2", "T-3", "T-4", "T-5", "T-6", "T-7"];
    let promo = app.unique_promo(&company, &pool, Target::default()).await;
    let users = contenders(&app).await;

    let results = race(&app, &users, promo.id).await;

    let codes: Vec<String> = results.into_iter().filter_map(Result::ok).collect();
    assert_eq!(codes.len(), pool.len());
    let distinct: HashSet<&str> = codes.iter().map(String::as_str).collect();
    let expected: HashSet<&str> = pool.iter().copied().collect();
    assert_eq!(distinct, expected);

    let view = app
        .handlers
        .get_user_promo
        .handle(GetUserPromoQuery {
            user_id: users[0].id,
            promo_id: promo.id,
        })
        .await
        .unwrap();
    assert!(!view.active);
}
