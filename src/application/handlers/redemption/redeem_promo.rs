//! RedeemPromoHandler - Command handler for activating a promo.
//!
//! Order of checks:
//! 1. User lookup through cache-aside (the fraud check needs the email)
//! 2. Fraud gate, outside any capacity mutation
//! 3. Promo exists, is active after correction, user is eligible
//! 4. Allocation committed atomically with the activation record
//! 5. Best-effort summary refresh

use std::sync::Arc;

use crate::application::handlers::lookup::require_user;
use crate::application::services::{FraudGate, PromoSummaryCache, RedemptionAllocator, UserCache};
use crate::domain::foundation::{PromoId, Timestamp, UserId};
use crate::domain::promo::{Activation, PromoError, PromoSummary};

#[derive(Debug, Clone)]
pub struct RedeemPromoCommand {
    pub user_id: UserId,
    pub promo_id: PromoId,
}

#[derive(Debug, Clone)]
pub struct RedeemPromoResult {
    /// The code handed to the user.
    pub promo: String,
    pub activation: Activation,
}

pub struct RedeemPromoHandler {
    users: Arc<UserCache>,
    fraud_gate: Arc<FraudGate>,
    allocator: Arc<RedemptionAllocator>,
    summaries: Arc<PromoSummaryCache>,
}

impl RedeemPromoHandler {
    pub fn new(
        users: Arc<UserCache>,
        fraud_gate: Arc<FraudGate>,
        allocator: Arc<RedemptionAllocator>,
        summaries: Arc<PromoSummaryCache>,
    ) -> Self {
        Self {
            users,
            fraud_gate,
            allocator,
            summaries,
        }
    }

    pub async fn handle(&self, cmd: RedeemPromoCommand) -> Result<RedeemPromoResult, PromoError> {
        let user = require_user(&self.users, &cmd.user_id).await?;

        self.fraud_gate
            .check(&user, &cmd.promo_id, &Timestamp::now())
            .await?;

        let redemption = self
            .allocator
            .allocate(&cmd.promo_id, &user, Timestamp::now())
            .await?;

        self.summaries
            .refresh(&PromoSummary::from(&redemption.promo))
            .await;

        Ok(RedeemPromoResult {
            promo: redemption.code,
            activation: redemption.activation,
        })
    }
}
