//! Company and user records for the in-memory durable store.

use async_trait::async_trait;

use crate::domain::company::Company;
use crate::domain::foundation::{CompanyId, DomainError, Email, ErrorCode, UserId};
use crate::domain::user::User;
use crate::ports::{CompanyRepository, RecordSource, RecordStore, UserRepository};

use super::InMemoryDatabase;

fn email_taken(email: &Email) -> DomainError {
    DomainError::new(
        ErrorCode::EmailAlreadyRegistered,
        format!("Email already registered: {}", email),
    )
}

#[async_trait]
impl RecordSource<Company> for InMemoryDatabase {
    async fn load(&self, id: &CompanyId) -> Result<Option<Company>, DomainError> {
        Ok(self.state.read().await.companies.get(id).cloned())
    }
}

#[async_trait]
impl RecordStore<Company> for InMemoryDatabase {
    async fn save(&self, company: &Company) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state
            .companies
            .values()
            .any(|c| c.email == company.email && c.id != company.id)
        {
            return Err(email_taken(&company.email));
        }
        state.companies.insert(company.id, company.clone());
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for InMemoryDatabase {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Company>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .companies
            .values()
            .find(|c| &c.email == email)
            .cloned())
    }
}

#[async_trait]
impl RecordSource<User> for InMemoryDatabase {
    async fn load(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }
}

#[async_trait]
impl RecordStore<User> for InMemoryDatabase {
    async fn save(&self, user: &User) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(email_taken(&user.email));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_company_with_same_email_is_rejected() {
        let db = InMemoryDatabase::new();
        let email = Email::parse("hi@acme.io").unwrap();
        let first = Company::register("Acme Corp", email.clone(), "h").unwrap();
        let second = Company::register("Acme Again", email.clone(), "h").unwrap();

        RecordStore::<Company>::save(&db, &first).await.unwrap();
        let err = RecordStore::<Company>::save(&db, &second).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);

        // Re-saving the same company is an update, not a duplicate.
        RecordStore::<Company>::save(&db, &first).await.unwrap();
        let found = CompanyRepository::find_by_email(&db, &email).await.unwrap();
        assert_eq!(found, Some(first));
    }
}
