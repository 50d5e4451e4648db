//! Company domain module.
//!
//! Companies own promos. Credentials are stored as an opaque hash produced
//! outside this crate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CompanyId, Email, ValidationError};

const NAME_MIN: usize = 5;
const NAME_MAX: usize = 50;

/// A registered company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
}

impl Company {
    pub fn register(
        name: impl Into<String>,
        email: Email,
        password_hash: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let len = name.chars().count();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if !(NAME_MIN..=NAME_MAX).contains(&len) {
            return Err(ValidationError::out_of_range(
                "name",
                NAME_MIN as i64,
                NAME_MAX as i64,
                len as i64,
            ));
        }

        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(ValidationError::empty_field("password_hash"));
        }

        Ok(Self {
            id: CompanyId::new(),
            name,
            email,
            password_hash,
        })
    }
}
