//! User domain module.
//!
//! Platform users who browse and redeem promos.

use serde::{Deserialize, Serialize};

use crate::domain::comment::Author;
use crate::domain::foundation::{Email, UserId, ValidationError};
use crate::domain::promo::Audience;

const MAX_AGE: u8 = 100;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub email: Email,
    pub avatar_url: Option<String>,
    pub age: u8,
    /// Two-letter country code as entered at registration.
    pub country: String,
    pub password_hash: String,
}

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: Email,
    pub avatar_url: Option<String>,
    pub age: u8,
    pub country: String,
    pub password_hash: String,
}

/// Profile fields a user may change. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(())
}

impl User {
    pub fn register(new: NewUser) -> Result<Self, ValidationError> {
        require("name", &new.name)?;
        require("surname", &new.surname)?;
        require("password_hash", &new.password_hash)?;
        if new.age > MAX_AGE {
            return Err(ValidationError::out_of_range(
                "age",
                0,
                i64::from(MAX_AGE),
                i64::from(new.age),
            ));
        }
        if new.country.len() != 2 || !new.country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "country",
                "expected a two-letter country code",
            ));
        }

        Ok(Self {
            id: UserId::new(),
            name: new.name,
            surname: new.surname,
            email: new.email,
            avatar_url: new.avatar_url,
            age: new.age,
            country: new.country,
            password_hash: new.password_hash,
        })
    }

    /// The attributes the eligibility filter checks.
    pub fn audience(&self) -> Audience {
        Audience {
            age: self.age,
            country: self.country.clone(),
        }
    }

    /// Snapshot used as a comment's author.
    pub fn author(&self) -> Author {
        Author {
            name: self.name.clone(),
            surname: self.surname.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    pub fn apply_profile(&mut self, patch: ProfilePatch) -> Result<(), ValidationError> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }
        if let Some(surname) = &patch.surname {
            require("surname", surname)?;
        }
        if let Some(hash) = &patch.password_hash {
            require("password_hash", hash)?;
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(surname) = patch.surname {
            self.surname = surname;
        }
        if let Some(avatar_url) = patch.avatar_url {
            self.avatar_url = Some(avatar_url);
        }
        if let Some(hash) = patch.password_hash {
            self.password_hash = hash;
        }
        Ok(())
    }
}
