//! FindUserByEmailHandler - Query handler used by sign-in.

use std::sync::Arc;

use crate::application::services::{EmailIndex, UserCache};
use crate::domain::foundation::{DomainError, Email, UserId};
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub struct FindUserByEmailQuery {
    pub email: String,
}

pub struct FindUserByEmailHandler {
    users: Arc<UserCache>,
    emails: Arc<EmailIndex<UserId>>,
}

impl FindUserByEmailHandler {
    pub fn new(users: Arc<UserCache>, emails: Arc<EmailIndex<UserId>>) -> Self {
        Self { users, emails }
    }

    pub async fn handle(&self, query: FindUserByEmailQuery) -> Result<Option<User>, DomainError> {
        let email = Email::parse(&query.email)?;

        if let Some(id) = self.emails.lookup(&email).await {
            match self.users.get(&id).await? {
                Some(user) if user.email == email => return Ok(Some(user)),
                _ => tracing::debug!(email = %email, "Stale user email index entry"),
            }
        }

        let user = self.users.source().find_by_email(&email).await?;
        if let Some(user) = &user {
            self.emails.remember(&user.email, &user.id).await;
            self.users.refresh(user).await;
        }
        Ok(user)
    }
}
