//! GetUserHandler - Query handler for a user by id.

use std::sync::Arc;

use crate::application::services::UserCache;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub struct GetUserQuery {
    pub user_id: UserId,
}

pub struct GetUserHandler {
    users: Arc<UserCache>,
}

impl GetUserHandler {
    pub fn new(users: Arc<UserCache>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, query: GetUserQuery) -> Result<User, DomainError> {
        self.users.get(&query.user_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::UserNotFound,
                format!("User not found: {}", query.user_id),
            )
        })
    }
}
