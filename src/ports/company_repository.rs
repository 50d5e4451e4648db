//! Company repository port.

use crate::domain::company::Company;
use crate::domain::foundation::{DomainError, Email};
use async_trait::async_trait;

use super::RecordStore;

/// Durable company storage. ID lookups and writes come from [`RecordStore`].
///
/// `save` must reject a second company with an existing email with
/// `EmailAlreadyRegistered`.
#[async_trait]
pub trait CompanyRepository: RecordStore<Company> {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Company>, DomainError>;
}
