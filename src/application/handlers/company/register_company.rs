//! RegisterCompanyHandler - Command handler for company sign-up.

use std::sync::Arc;

use crate::application::services::{CompanyCache, EmailIndex};
use crate::domain::company::Company;
use crate::domain::foundation::{CompanyId, DomainError, Email, ErrorCode};

/// Command to register a company.
#[derive(Debug, Clone)]
pub struct RegisterCompanyCommand {
    pub name: String,
    pub email: String,
    /// Already hashed by the caller.
    pub password_hash: String,
}

/// Result of successful registration.
#[derive(Debug, Clone)]
pub struct RegisterCompanyResult {
    pub company: Company,
}

/// Handler for registering companies.
pub struct RegisterCompanyHandler {
    companies: Arc<CompanyCache>,
    emails: Arc<EmailIndex<CompanyId>>,
}

impl RegisterCompanyHandler {
    pub fn new(companies: Arc<CompanyCache>, emails: Arc<EmailIndex<CompanyId>>) -> Self {
        Self { companies, emails }
    }

    pub async fn handle(
        &self,
        cmd: RegisterCompanyCommand,
    ) -> Result<RegisterCompanyResult, DomainError> {
        let email = Email::parse(&cmd.email)?;

        // 1. Cheap duplicate check against the ancillary index, then the
        //    durable store. The unique constraint still has the last word.
        if self.emails.lookup(&email).await.is_some()
            || self.companies.source().find_by_email(&email).await?.is_some()
        {
            return Err(already_registered(&email));
        }

        // 2. Build and persist
        let company = Company::register(cmd.name, email, cmd.password_hash)?;
        self.companies.put(&company).await?;
        self.emails.remember(&company.email, &company.id).await;

        tracing::info!(company_id = %company.id, "Company registered");
        Ok(RegisterCompanyResult { company })
    }
}

fn already_registered(email: &Email) -> DomainError {
    DomainError::new(
        ErrorCode::EmailAlreadyRegistered,
        format!("Email already registered: {}", email),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::ErrorCategory;
    use std::time::Duration;

    fn handler(fx: &Fixture) -> RegisterCompanyHandler {
        RegisterCompanyHandler::new(
            fx.companies.clone(),
            Arc::new(EmailIndex::companies(fx.ancillary.clone(), Duration::from_secs(60))),
        )
    }

    fn command(email: &str) -> RegisterCompanyCommand {
        RegisterCompanyCommand {
            name: "Acme Corp".to_string(),
            email: email.to_string(),
            password_hash: "argon2-hash".to_string(),
        }
    }

    #[tokio::test]
    async fn registers_and_caches_company() {
        let fx = Fixture::new();
        let result = handler(&fx).handle(command("Sales@Acme.io")).await.unwrap();

        assert_eq!(result.company.email.as_str(), "sales@acme.io");
        assert!(
            fx.ancillary
                .contains_key(&format!("company:{}", result.company.id))
                .await
        );
        assert!(fx.ancillary.contains_key("company_email:sales@acme.io").await);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict_even_with_cold_cache() {
        let fx = Fixture::new();
        let handler = handler(&fx);
        handler.handle(command("sales@acme.io")).await.unwrap();
        fx.ancillary.clear().await;

        let err = handler.handle(command("SALES@acme.io")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let fx = Fixture::new();
        let err = handler(&fx).handle(command("not-an-email")).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailed);
    }
}
