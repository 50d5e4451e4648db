//! FindCompanyByEmailHandler - Query handler used by sign-in.
//!
//! Resolves the id through the ancillary email index and reads the record
//! through cache-aside. A stale index entry falls back to the durable lookup.

use std::sync::Arc;

use crate::application::services::{CompanyCache, EmailIndex};
use crate::domain::company::Company;
use crate::domain::foundation::{CompanyId, DomainError, Email};

#[derive(Debug, Clone)]
pub struct FindCompanyByEmailQuery {
    pub email: String,
}

pub struct FindCompanyByEmailHandler {
    companies: Arc<CompanyCache>,
    emails: Arc<EmailIndex<CompanyId>>,
}

impl FindCompanyByEmailHandler {
    pub fn new(companies: Arc<CompanyCache>, emails: Arc<EmailIndex<CompanyId>>) -> Self {
        Self { companies, emails }
    }

    pub async fn handle(
        &self,
        query: FindCompanyByEmailQuery,
    ) -> Result<Option<Company>, DomainError> {
        let email = Email::parse(&query.email)?;

        if let Some(id) = self.emails.lookup(&email).await {
            if let Some(company) = self.companies.get(&id).await? {
                if company.email == email {
                    return Ok(Some(company));
                }
            }
            tracing::debug!(email = %email, "Stale company email index entry");
        }

        let company = self.companies.source().find_by_email(&email).await?;
        if let Some(company) = &company {
            self.emails.remember(&company.email, &company.id).await;
            self.companies.refresh(company).await;
        }
        Ok(company)
    }
}
