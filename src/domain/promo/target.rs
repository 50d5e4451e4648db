//! Targeting rules and the eligibility filter.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

const MAX_AGE: u8 = 100;
const MAX_CATEGORIES: usize = 20;

/// Who a promo is aimed at. An absent field places no constraint on that
/// dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_from: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_until: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

/// The attributes of a user the eligibility filter looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience {
    pub age: u8,
    pub country: String,
}

impl Target {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, age) in [("age_from", self.age_from), ("age_until", self.age_until)] {
            if let Some(age) = age {
                if age > MAX_AGE {
                    return Err(ValidationError::out_of_range(
                        field,
                        0,
                        i64::from(MAX_AGE),
                        i64::from(age),
                    ));
                }
            }
        }

        if let (Some(from), Some(until)) = (self.age_from, self.age_until) {
            if from > until {
                return Err(ValidationError::invalid_format(
                    "target.age_from",
                    "age_from must not exceed age_until",
                ));
            }
        }

        if let Some(country) = &self.country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ValidationError::invalid_format(
                    "target.country",
                    "expected a two-letter country code",
                ));
            }
        }

        if self.categories.len() > MAX_CATEGORIES {
            return Err(ValidationError::out_of_range(
                "target.categories",
                0,
                MAX_CATEGORIES as i64,
                self.categories.len() as i64,
            ));
        }
        if self.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(ValidationError::empty_field("target.categories"));
        }

        Ok(())
    }

    /// The eligibility filter: country (case-insensitive) and inclusive age
    /// range. Categories are not a redemption gate.
    pub fn admits(&self, audience: &Audience) -> bool {
        self.matches_country(&audience.country) && self.matches_age(audience.age)
    }

    /// An untargeted promo matches every country.
    pub fn matches_country(&self, country: &str) -> bool {
        match &self.country {
            Some(target) => target.eq_ignore_ascii_case(country),
            None => true,
        }
    }

    pub fn matches_age(&self, age: u8) -> bool {
        let above_floor = self.age_from.map_or(true, |from| age >= from);
        let below_ceiling = self.age_until.map_or(true, |until| age <= until);
        above_floor && below_ceiling
    }

    /// Feed-only category filter, compared case-insensitively.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.to_lowercase() == category.to_lowercase())
    }
}
