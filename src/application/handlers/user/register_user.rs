//! RegisterUserHandler - Command handler for user sign-up.

use std::sync::Arc;

use crate::application::services::{EmailIndex, UserCache};
use crate::domain::foundation::{DomainError, Email, ErrorCode, UserId};
use crate::domain::user::{NewUser, User};

/// Command to register a user.
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub age: u8,
    pub country: String,
    /// Already hashed by the caller.
    pub password_hash: String,
}

/// Result of successful registration.
#[derive(Debug, Clone)]
pub struct RegisterUserResult {
    pub user: User,
}

pub struct RegisterUserHandler {
    users: Arc<UserCache>,
    emails: Arc<EmailIndex<UserId>>,
}

impl RegisterUserHandler {
    pub fn new(users: Arc<UserCache>, emails: Arc<EmailIndex<UserId>>) -> Self {
        Self { users, emails }
    }

    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<RegisterUserResult, DomainError> {
        let email = Email::parse(&cmd.email)?;

        if self.emails.lookup(&email).await.is_some()
            || self.users.source().find_by_email(&email).await?.is_some()
        {
            return Err(DomainError::new(
                ErrorCode::EmailAlreadyRegistered,
                format!("Email already registered: {}", email),
            ));
        }

        let user = User::register(NewUser {
            name: cmd.name,
            surname: cmd.surname,
            email,
            avatar_url: cmd.avatar_url,
            age: cmd.age,
            country: cmd.country,
            password_hash: cmd.password_hash,
        })?;
        self.users.put(&user).await?;
        self.emails.remember(&user.email, &user.id).await;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(RegisterUserResult { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::ErrorCategory;
    use std::time::Duration;

    fn handler(fx: &Fixture) -> RegisterUserHandler {
        RegisterUserHandler::new(
            fx.users.clone(),
            Arc::new(EmailIndex::users(fx.ancillary.clone(), Duration::from_secs(60))),
        )
    }

    fn command(email: &str, age: u8) -> RegisterUserCommand {
        RegisterUserCommand {
            name: "Maria".to_string(),
            surname: "Garcia".to_string(),
            email: email.to_string(),
            avatar_url: Some("https://cdn.example.com/m.png".to_string()),
            age,
            country: "ES".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn registers_user() {
        let fx = Fixture::new();
        let user = handler(&fx)
            .handle(command("maria@example.com", 28))
            .await
            .unwrap()
            .user;

        assert_eq!(fx.users.get(&user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let fx = Fixture::new();
        let handler = handler(&fx);
        handler.handle(command("maria@example.com", 28)).await.unwrap();

        let err = handler
            .handle(command("maria@example.com", 30))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[tokio::test]
    async fn age_over_limit_is_rejected() {
        let fx = Fixture::new();
        let err = handler(&fx)
            .handle(command("old@example.com", 101))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfRange);
    }
}
