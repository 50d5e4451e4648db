//! PostgreSQL implementations of CompanyRepository and UserRepository.
//!
//! Both tables carry a unique constraint on `email`; a violation surfaces as
//! `EmailAlreadyRegistered`.

use crate::domain::company::Company;
use crate::domain::foundation::{CompanyId, DomainError, Email, ErrorCode, UserId};
use crate::domain::user::User;
use crate::ports::{CompanyRepository, RecordSource, RecordStore, UserRepository};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const COMPANIES_EMAIL_KEY: &str = "companies_email_key";
const USERS_EMAIL_KEY: &str = "users_email_key";

fn map_save_error(e: sqlx::Error, constraint: &str, email: &Email, what: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some(constraint) {
            return DomainError::new(
                ErrorCode::EmailAlreadyRegistered,
                format!("Email already registered: {}", email),
            );
        }
    }
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to save {}: {}", what, e),
    )
}

fn parse_email(raw: String) -> Result<Email, DomainError> {
    Email::parse(&raw).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid stored email '{}': {}", raw, e),
        )
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Companies
// ════════════════════════════════════════════════════════════════════════════

pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
}

impl TryFrom<CompanyRow> for Company {
    type Error = DomainError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Company {
            id: CompanyId::from_uuid(row.id),
            name: row.name,
            email: parse_email(row.email)?,
            password_hash: row.password_hash,
        })
    }
}

#[async_trait]
impl RecordSource<Company> for PostgresCompanyRepository {
    async fn load(&self, id: &CompanyId) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(
            r#"SELECT id, name, email, password_hash FROM companies WHERE id = $1"#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch company: {}", e),
            )
        })?;

        row.map(Company::try_from).transpose()
    }
}

#[async_trait]
impl RecordStore<Company> for PostgresCompanyRepository {
    async fn save(&self, company: &Company) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash
            "#,
        )
        .bind(company.id.as_uuid())
        .bind(&company.name)
        .bind(company.email.as_str())
        .bind(&company.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_save_error(e, COMPANIES_EMAIL_KEY, &company.email, "company"))?;

        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(
            r#"SELECT id, name, email, password_hash FROM companies WHERE email = $1"#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch company by email: {}", e),
            )
        })?;

        row.map(Company::try_from).transpose()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Users
// ════════════════════════════════════════════════════════════════════════════

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    surname: String,
    email: String,
    avatar_url: Option<String>,
    age: i16,
    country: String,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let age = u8::try_from(row.age).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid stored age for user {}: {}", row.id, row.age),
            )
        })?;

        Ok(User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            surname: row.surname,
            email: parse_email(row.email)?,
            avatar_url: row.avatar_url,
            age,
            country: row.country,
            password_hash: row.password_hash,
        })
    }
}

#[async_trait]
impl RecordSource<User> for PostgresUserRepository {
    async fn load(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, surname, email, avatar_url, age, country, password_hash
            FROM users WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch user: {}", e),
            )
        })?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl RecordStore<User> for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, surname, email, avatar_url, age, country, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                surname = EXCLUDED.surname,
                email = EXCLUDED.email,
                avatar_url = EXCLUDED.avatar_url,
                age = EXCLUDED.age,
                country = EXCLUDED.country,
                password_hash = EXCLUDED.password_hash
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.email.as_str())
        .bind(&user.avatar_url)
        .bind(i16::from(user.age))
        .bind(&user.country)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_save_error(e, USERS_EMAIL_KEY, &user.email, "user"))?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, surname, email, avatar_url, age, country, password_hash
            FROM users WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch user by email: {}", e),
            )
        })?;

        row.map(User::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_row_with_negative_age_is_rejected() {
        let row = UserRow {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            avatar_url: None,
            age: -1,
            country: "GB".to_string(),
            password_hash: "hash".to_string(),
        };
        assert!(User::try_from(row).is_err());
    }

    #[test]
    fn company_row_maps_email() {
        let row = CompanyRow {
            id: Uuid::new_v4(),
            name: "Acme Corp".to_string(),
            email: "deals@acme.io".to_string(),
            password_hash: "hash".to_string(),
        };
        let company = Company::try_from(row).unwrap();
        assert_eq!(company.email.as_str(), "deals@acme.io");
    }

    #[test]
    fn invalid_stored_email_is_a_database_error() {
        let err = parse_email("not-an-email".to_string()).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
