//! User repository port.

use crate::domain::foundation::{DomainError, Email};
use crate::domain::user::User;
use async_trait::async_trait;

use super::RecordStore;

/// Durable user storage. ID lookups and writes come from [`RecordStore`].
///
/// `save` must reject a second user with an existing email with
/// `EmailAlreadyRegistered`.
#[async_trait]
pub trait UserRepository: RecordStore<User> {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DomainError>;
}
