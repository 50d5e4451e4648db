//! Shared in-memory wiring for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use promo_platform::adapters::{InMemoryAncillaryStore, InMemoryDatabase, MockFraudService};
use promo_platform::application::{
    CreatePromoCommand, RegisterCompanyCommand, RegisterUserCommand,
};
use promo_platform::bootstrap::{AppHandlers, EngineSettings, Infrastructure};
use promo_platform::domain::company::Company;
use promo_platform::domain::promo::{Promo, PromoMode, Target};
use promo_platform::domain::user::User;

pub struct TestApp {
    pub handlers: Arc<AppHandlers>,
    pub db: InMemoryDatabase,
    pub ancillary: Arc<InMemoryAncillaryStore>,
    pub fraud: MockFraudService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_fraud(MockFraudService::approving())
    }

    pub fn with_fraud(fraud: MockFraudService) -> Self {
        let db = InMemoryDatabase::new();
        let ancillary = Arc::new(InMemoryAncillaryStore::new());
        let infra = Infrastructure::in_memory(&db, ancillary.clone(), Arc::new(fraud.clone()));
        Self {
            handlers: Arc::new(AppHandlers::build(infra, EngineSettings::default())),
            db,
            ancillary,
            fraud,
        }
    }

    pub async fn company(&self, name: &str, email: &str) -> Company {
        self.handlers
            .register_company
            .handle(RegisterCompanyCommand {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: "argon2-hash".to_string(),
            })
            .await
            .unwrap()
            .company
    }

    pub async fn user(&self, email: &str, age: u8, country: &str) -> User {
        self.handlers
            .register_user
            .handle(RegisterUserCommand {
                name: "Sam".to_string(),
                surname: "Taylor".to_string(),
                email: email.to_string(),
                avatar_url: None,
                age,
                country: country.to_string(),
                password_hash: "argon2-hash".to_string(),
            })
            .await
            .unwrap()
            .user
    }

    pub async fn common_promo(&self, company: &Company, code: &str, max_count: u32) -> Promo {
        self.create(company, PromoMode::Common, max_count, Some(code.to_string()), None, Target::default())
            .await
    }

    pub async fn unique_promo(&self, company: &Company, codes: &[&str], target: Target) -> Promo {
        let codes = codes.iter().map(|c| c.to_string()).collect();
        self.create(company, PromoMode::Unique, 1, None, Some(codes), target)
            .await
    }

    async fn create(
        &self,
        company: &Company,
        mode: PromoMode,
        max_count: u32,
        promo_common: Option<String>,
        promo_unique: Option<Vec<String>>,
        target: Target,
    ) -> Promo {
        self.handlers
            .create_promo
            .handle(CreatePromoCommand {
                company_id: company.id,
                description: "Two coffees for the price of one".to_string(),
                image_url: None,
                target,
                mode,
                max_count,
                promo_common,
                promo_unique,
                active_from: None,
                active_until: None,
            })
            .await
            .unwrap()
            .promo
    }
}
