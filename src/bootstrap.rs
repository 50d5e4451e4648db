//! Composition root.
//!
//! Builds the collaborators once (Postgres, Redis, fraud client, or their
//! in-memory counterparts) and wires every handler from them.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::adapters::fraud::{HttpFraudConfig, HttpFraudService};
use crate::adapters::memory::{InMemoryAncillaryStore, InMemoryDatabase};
use crate::adapters::postgres::{
    PostgresActivationReader, PostgresCommentRepository, PostgresCompanyRepository,
    PostgresLikeRepository, PostgresPromoRepository, PostgresUserRepository,
};
use crate::adapters::redis::RedisAncillaryStore;
use crate::application::handlers::*;
use crate::application::services::{
    AvailabilityReconciler, CompanyCache, EmailIndex, FraudGate, PromoSummaryCache,
    PromoSummarySource, RedemptionAllocator, UserCache, VerdictCache,
};
use crate::config::AppConfig;
use crate::domain::foundation::DomainError;
use crate::domain::promo::PromoSummary;
use crate::ports::{
    ActivationReader, AncillaryStore, CommentRepository, CompanyRepository, FraudVerdictService,
    LikeRepository, PromoRepository, RecordSource, UserRepository,
};

/// Errors raised while connecting to infrastructure.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Adapter setup failed: {0}")]
    Adapter(#[from] DomainError),
}

/// Every port the handlers depend on.
#[derive(Clone)]
pub struct Infrastructure {
    pub promos: Arc<dyn PromoRepository>,
    pub activations: Arc<dyn ActivationReader>,
    pub companies: Arc<dyn CompanyRepository>,
    pub users: Arc<dyn UserRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub ancillary: Arc<dyn AncillaryStore>,
    pub fraud: Arc<dyn FraudVerdictService>,
}

impl Infrastructure {
    /// Connect to Postgres, Redis and the fraud service described by `config`.
    pub async fn connect(config: &AppConfig) -> Result<Self, BootstrapError> {
        let pool = config
            .database
            .pool_options()
            .connect(&config.database.url)
            .await?;

        if config.database.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");
        }

        let ancillary =
            RedisAncillaryStore::connect(&config.redis.url, config.redis.connect_timeout()).await?;
        let fraud = HttpFraudService::new(
            HttpFraudConfig::new(config.fraud.base_url.clone())
                .with_timeout(config.fraud.request_timeout()),
        )?;

        Ok(Self {
            promos: Arc::new(PostgresPromoRepository::new(pool.clone())),
            activations: Arc::new(PostgresActivationReader::new(pool.clone())),
            companies: Arc::new(PostgresCompanyRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            likes: Arc::new(PostgresLikeRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool)),
            ancillary: Arc::new(ancillary),
            fraud: Arc::new(fraud),
        })
    }

    /// Everything in process, sharing one database and one ancillary store.
    pub fn in_memory(
        db: &InMemoryDatabase,
        ancillary: Arc<InMemoryAncillaryStore>,
        fraud: Arc<dyn FraudVerdictService>,
    ) -> Self {
        Self {
            promos: Arc::new(db.clone()),
            activations: Arc::new(db.clone()),
            companies: Arc::new(db.clone()),
            users: Arc::new(db.clone()),
            likes: Arc::new(db.clone()),
            comments: Arc::new(db.clone()),
            ancillary,
            fraud,
        }
    }
}

/// Engine knobs taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub cache_ttl: Duration,
    pub fraud_max_attempts: u32,
    pub max_commit_attempts: u32,
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cache_ttl: config.redis.cache_ttl(),
            fraud_max_attempts: config.fraud.max_attempts,
            max_commit_attempts: config.redemption.max_commit_attempts,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            fraud_max_attempts: 2,
            max_commit_attempts: 16,
        }
    }
}

/// The full caller-facing operation set.
pub struct AppHandlers {
    pub register_company: RegisterCompanyHandler,
    pub get_company: GetCompanyHandler,
    pub find_company_by_email: FindCompanyByEmailHandler,

    pub register_user: RegisterUserHandler,
    pub get_user: GetUserHandler,
    pub find_user_by_email: FindUserByEmailHandler,
    pub update_user_profile: UpdateUserProfileHandler,

    pub create_promo: CreatePromoHandler,
    pub edit_promo: EditPromoHandler,
    pub get_company_promo: GetCompanyPromoHandler,
    pub list_company_promos: ListCompanyPromosHandler,
    pub get_promo_stats: GetPromoStatsHandler,

    pub get_feed: GetFeedHandler,
    pub get_user_promo: GetUserPromoHandler,
    pub get_activation_history: GetActivationHistoryHandler,

    pub like_promo: LikePromoHandler,
    pub unlike_promo: UnlikePromoHandler,
    pub create_comment: CreateCommentHandler,
    pub list_comments: ListCommentsHandler,
    pub get_comment: GetCommentHandler,
    pub edit_comment: EditCommentHandler,
    pub delete_comment: DeleteCommentHandler,

    pub redeem_promo: RedeemPromoHandler,
}

impl AppHandlers {
    pub fn build(infra: Infrastructure, settings: EngineSettings) -> Self {
        let Infrastructure {
            promos,
            activations,
            companies,
            users,
            likes,
            comments,
            ancillary,
            fraud,
        } = infra;
        let ttl = settings.cache_ttl;

        let company_cache = Arc::new(CompanyCache::new(companies, ancillary.clone(), ttl));
        let user_cache = Arc::new(UserCache::new(users, ancillary.clone(), ttl));
        let summary_source: Arc<dyn RecordSource<PromoSummary>> =
            Arc::new(PromoSummarySource::new(promos.clone()));
        let summaries = Arc::new(PromoSummaryCache::new(
            summary_source,
            ancillary.clone(),
            ttl,
        ));
        let company_emails = Arc::new(EmailIndex::companies(ancillary.clone(), ttl));
        let user_emails = Arc::new(EmailIndex::users(ancillary.clone(), ttl));

        let reconciler = Arc::new(AvailabilityReconciler::new(promos.clone(), summaries.clone()));
        let fraud_gate = Arc::new(FraudGate::new(
            fraud,
            VerdictCache::new(ancillary),
            settings.fraud_max_attempts,
        ));
        let allocator = Arc::new(RedemptionAllocator::new(
            promos.clone(),
            reconciler.clone(),
            settings.max_commit_attempts,
        ));

        Self {
            register_company: RegisterCompanyHandler::new(
                company_cache.clone(),
                company_emails.clone(),
            ),
            get_company: GetCompanyHandler::new(company_cache.clone()),
            find_company_by_email: FindCompanyByEmailHandler::new(
                company_cache.clone(),
                company_emails,
            ),

            register_user: RegisterUserHandler::new(user_cache.clone(), user_emails.clone()),
            get_user: GetUserHandler::new(user_cache.clone()),
            find_user_by_email: FindUserByEmailHandler::new(user_cache.clone(), user_emails),
            update_user_profile: UpdateUserProfileHandler::new(user_cache.clone()),

            create_promo: CreatePromoHandler::new(
                promos.clone(),
                company_cache,
                summaries.clone(),
            ),
            edit_promo: EditPromoHandler::new(
                promos.clone(),
                summaries.clone(),
                settings.max_commit_attempts,
            ),
            get_company_promo: GetCompanyPromoHandler::new(
                promos.clone(),
                summaries.clone(),
                reconciler.clone(),
            ),
            list_company_promos: ListCompanyPromosHandler::new(promos.clone(), reconciler.clone()),
            get_promo_stats: GetPromoStatsHandler::new(activations.clone(), summaries.clone()),

            get_feed: GetFeedHandler::new(
                promos.clone(),
                likes.clone(),
                activations.clone(),
                user_cache.clone(),
                reconciler.clone(),
            ),
            get_user_promo: GetUserPromoHandler::new(
                promos.clone(),
                likes.clone(),
                activations.clone(),
                user_cache.clone(),
                reconciler.clone(),
            ),
            get_activation_history: GetActivationHistoryHandler::new(
                promos,
                likes.clone(),
                activations,
                user_cache.clone(),
                reconciler,
            ),

            like_promo: LikePromoHandler::new(likes.clone(), user_cache.clone(), summaries.clone()),
            unlike_promo: UnlikePromoHandler::new(likes, user_cache.clone(), summaries.clone()),
            create_comment: CreateCommentHandler::new(
                comments.clone(),
                user_cache.clone(),
                summaries.clone(),
            ),
            list_comments: ListCommentsHandler::new(comments.clone(), summaries.clone()),
            get_comment: GetCommentHandler::new(comments.clone(), summaries.clone()),
            edit_comment: EditCommentHandler::new(comments.clone(), summaries.clone()),
            delete_comment: DeleteCommentHandler::new(comments, summaries.clone()),

            redeem_promo: RedeemPromoHandler::new(user_cache, fraud_gate, allocator, summaries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fraud::MockFraudService;
    use crate::domain::foundation::UserId;

    #[test]
    fn default_settings_match_configuration_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(settings.fraud_max_attempts, 2);
        assert_eq!(settings.max_commit_attempts, 16);
    }

    #[tokio::test]
    async fn in_memory_handlers_are_wired_to_one_store() {
        let db = InMemoryDatabase::new();
        let ancillary = Arc::new(InMemoryAncillaryStore::new());
        let infra = Infrastructure::in_memory(
            &db,
            ancillary.clone(),
            Arc::new(MockFraudService::approving()),
        );
        let handlers = AppHandlers::build(infra, EngineSettings::default());

        let missing = handlers
            .get_user
            .handle(GetUserQuery {
                user_id: UserId::new(),
            })
            .await;

        assert!(missing.is_err());
        assert!(ancillary.is_empty().await);
    }
}
