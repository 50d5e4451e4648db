//! UpdateUserProfileHandler - Command handler for profile edits.

use std::sync::Arc;

use crate::application::services::UserCache;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::{ProfilePatch, User};

#[derive(Debug, Clone)]
pub struct UpdateUserProfileCommand {
    pub user_id: UserId,
    pub patch: ProfilePatch,
}

pub struct UpdateUserProfileHandler {
    users: Arc<UserCache>,
}

impl UpdateUserProfileHandler {
    pub fn new(users: Arc<UserCache>) -> Self {
        Self { users }
    }

    /// Durable write first, then a fresh ancillary copy.
    pub async fn handle(&self, cmd: UpdateUserProfileCommand) -> Result<User, DomainError> {
        let mut user = self.users.get(&cmd.user_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::UserNotFound,
                format!("User not found: {}", cmd.user_id),
            )
        })?;

        user.apply_profile(cmd.patch)?;
        self.users.put(&user).await?;

        tracing::info!(user_id = %user.id, "User profile updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::ports::RecordSource;

    #[tokio::test]
    async fn updates_durable_and_cached_copy() {
        let fx = Fixture::new();
        let user = fx.user("kim@example.com", 22, "KR").await;

        let updated = UpdateUserProfileHandler::new(fx.users.clone())
            .handle(UpdateUserProfileCommand {
                user_id: user.id,
                patch: ProfilePatch {
                    name: Some("Jin".to_string()),
                    avatar_url: Some("https://cdn.example.com/j.png".to_string()),
                    ..ProfilePatch::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "Jin");
        assert_eq!(updated.surname, user.surname);
        let durable = RecordSource::<User>::load(&fx.db, &user.id).await.unwrap();
        assert_eq!(durable.as_ref(), Some(&updated));
        assert_eq!(fx.users.get(&user.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn blank_name_leaves_profile_untouched() {
        let fx = Fixture::new();
        let user = fx.user("kim@example.com", 22, "KR").await;

        let err = UpdateUserProfileHandler::new(fx.users.clone())
            .handle(UpdateUserProfileCommand {
                user_id: user.id,
                patch: ProfilePatch {
                    name: Some("  ".to_string()),
                    surname: Some("Park".to_string()),
                    ..ProfilePatch::default()
                },
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::EmptyField);
        assert_eq!(fx.users.get(&user.id).await.unwrap(), Some(user));
    }
}
