//! In-memory wiring shared by handler tests.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::memory::{InMemoryAncillaryStore, InMemoryDatabase};
use crate::application::services::{
    AvailabilityReconciler, CompanyCache, PromoSummaryCache, PromoSummarySource, UserCache,
};
use crate::domain::company::Company;
use crate::domain::foundation::{Email, Timestamp};
use crate::domain::promo::{ActiveWindow, Capacity, NewPromo, Promo, PromoSummary, Target};
use crate::domain::user::{NewUser, User};
use crate::ports::{
    ActivationReader, CommentRepository, CompanyRepository, LikeRepository, PromoRepository,
    RecordSource, UserRepository,
};

pub(crate) struct Fixture {
    pub db: InMemoryDatabase,
    pub ancillary: Arc<InMemoryAncillaryStore>,
    pub companies: Arc<CompanyCache>,
    pub users: Arc<UserCache>,
    pub summaries: Arc<PromoSummaryCache>,
    pub reconciler: Arc<AvailabilityReconciler>,
}

impl Fixture {
    pub fn new() -> Self {
        let db = InMemoryDatabase::new();
        let ancillary = Arc::new(InMemoryAncillaryStore::new());
        let ttl = Duration::from_secs(300);

        let promos: Arc<dyn PromoRepository> = Arc::new(db.clone());
        let company_repo: Arc<dyn CompanyRepository> = Arc::new(db.clone());
        let user_repo: Arc<dyn UserRepository> = Arc::new(db.clone());
        let summary_source: Arc<dyn RecordSource<PromoSummary>> =
            Arc::new(PromoSummarySource::new(promos.clone()));

        let summaries = Arc::new(PromoSummaryCache::new(
            summary_source,
            ancillary.clone(),
            ttl,
        ));
        Self {
            companies: Arc::new(CompanyCache::new(company_repo, ancillary.clone(), ttl)),
            users: Arc::new(UserCache::new(user_repo, ancillary.clone(), ttl)),
            reconciler: Arc::new(AvailabilityReconciler::new(promos, summaries.clone())),
            summaries,
            ancillary,
            db,
        }
    }

    pub fn promos(&self) -> Arc<dyn PromoRepository> {
        Arc::new(self.db.clone())
    }

    pub fn activations(&self) -> Arc<dyn ActivationReader> {
        Arc::new(self.db.clone())
    }

    pub fn likes(&self) -> Arc<dyn LikeRepository> {
        Arc::new(self.db.clone())
    }

    pub fn comments(&self) -> Arc<dyn CommentRepository> {
        Arc::new(self.db.clone())
    }

    pub async fn company(&self, name: &str) -> Company {
        let email = Email::parse(&format!("{}@corp.io", name.to_lowercase().replace(' ', ""))).unwrap();
        let company = Company::register(name, email, "hash").unwrap();
        self.companies.put(&company).await.unwrap();
        company
    }

    pub async fn user(&self, email: &str, age: u8, country: &str) -> User {
        let user = User::register(NewUser {
            name: "Alex".to_string(),
            surname: "Smith".to_string(),
            email: Email::parse(email).unwrap(),
            avatar_url: None,
            age,
            country: country.to_string(),
            password_hash: "hash".to_string(),
        })
        .unwrap();
        self.users.put(&user).await.unwrap();
        user
    }

    pub async fn promo(&self, company: &Company, capacity: Capacity, target: Target) -> Promo {
        self.promo_with_window(company, capacity, target, ActiveWindow::default())
            .await
    }

    pub async fn promo_with_window(
        &self,
        company: &Company,
        capacity: Capacity,
        target: Target,
        window: ActiveWindow,
    ) -> Promo {
        let promo = Promo::create(
            NewPromo {
                company_id: company.id,
                company_name: company.name.clone(),
                description: "Seasonal discount for everyone".to_string(),
                image_url: None,
                target,
                capacity,
                window,
            },
            Timestamp::now(),
        )
        .unwrap();
        PromoRepository::insert(&self.db, &promo).await.unwrap();
        promo
    }

    pub async fn stored(&self, promo: &Promo) -> Promo {
        PromoRepository::find_by_id(&self.db, &promo.id)
            .await
            .unwrap()
            .unwrap()
    }
}
