//! Capacity models for a promo.
//!
//! A promo either hands the same shared code to every redeemer while counting
//! consumption (`Common`) or hands out one slot of a finite pool of codes per
//! redemption (`Unique`). The two models are mutually exclusive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

use super::allocation::next_unique_code;

/// Upper bound on the shared-code redemption count.
pub const MAX_COMMON_COUNT: u32 = 100_000_000;
/// Length bounds, in characters, of the shared code.
pub const COMMON_CODE_LEN: (usize, usize) = (5, 30);
/// Length bounds, in characters, of each code in a unique pool.
pub const UNIQUE_CODE_LEN: (usize, usize) = (3, 30);
/// Largest unique pool.
pub const MAX_UNIQUE_CODES: usize = 5000;

fn check_max_count(max_count: u32, floor: u32) -> Result<(), ValidationError> {
    if max_count < floor || max_count > MAX_COMMON_COUNT {
        return Err(ValidationError::out_of_range(
            "max_count",
            i64::from(floor),
            i64::from(MAX_COMMON_COUNT),
            i64::from(max_count),
        ));
    }
    Ok(())
}

fn check_code_len(field: &str, code: &str, (min, max): (usize, usize)) -> Result<(), ValidationError> {
    let len = code.chars().count();
    if len < min || len > max {
        return Err(ValidationError::out_of_range(
            field,
            min as i64,
            max as i64,
            len as i64,
        ));
    }
    Ok(())
}

/// Discriminant for the capacity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromoMode {
    Common,
    Unique,
}

impl PromoMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromoMode::Common => "COMMON",
            PromoMode::Unique => "UNIQUE",
        }
    }
}

impl fmt::Display for PromoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PromoMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMMON" => Ok(PromoMode::Common),
            "UNIQUE" => Ok(PromoMode::Unique),
            other => Err(ValidationError::invalid_format(
                "mode",
                format!("expected COMMON or UNIQUE, got '{}'", other),
            )),
        }
    }
}

/// Remaining-capacity state of a promo.
///
/// # Invariants
///
/// - `Common`: `used_count <= max_count`
/// - `Unique`: `used_codes` is a sub-multiset of `codes`, in assignment order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capacity {
    Common {
        code: String,
        max_count: u32,
        used_count: u32,
    },
    Unique {
        codes: Vec<String>,
        used_codes: Vec<String>,
    },
}

impl Capacity {
    /// Builds a shared-code capacity with nothing consumed yet.
    pub fn common(code: impl Into<String>, max_count: u32) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ValidationError::empty_field("promo_common"));
        }
        check_code_len("promo_common", &code, COMMON_CODE_LEN)?;
        check_max_count(max_count, 0)?;
        Ok(Capacity::Common {
            code,
            max_count,
            used_count: 0,
        })
    }

    /// Builds a unique-pool capacity with nothing consumed yet.
    pub fn unique(codes: Vec<String>) -> Result<Self, ValidationError> {
        if codes.is_empty() {
            return Err(ValidationError::empty_field("promo_unique"));
        }
        if codes.iter().any(|c| c.trim().is_empty()) {
            return Err(ValidationError::invalid_format(
                "promo_unique",
                "codes cannot be blank",
            ));
        }
        if codes.len() > MAX_UNIQUE_CODES {
            return Err(ValidationError::out_of_range(
                "promo_unique",
                1,
                MAX_UNIQUE_CODES as i64,
                codes.len() as i64,
            ));
        }
        for code in &codes {
            check_code_len("promo_unique", code, UNIQUE_CODE_LEN)?;
        }
        Ok(Capacity::Unique {
            codes,
            used_codes: Vec::new(),
        })
    }

    /// Builds a capacity from the raw creation fields.
    ///
    /// Exactly one of `common_code` / `unique_codes` must be present and must
    /// agree with `mode`. Unique promos are limited to one redemption per user,
    /// so their `max_count` must be 1.
    pub fn from_request(
        mode: PromoMode,
        max_count: u32,
        common_code: Option<String>,
        unique_codes: Option<Vec<String>>,
    ) -> Result<Self, ValidationError> {
        match (mode, common_code, unique_codes) {
            (PromoMode::Common, Some(code), None) => Capacity::common(code, max_count),
            (PromoMode::Unique, None, Some(codes)) => {
                if max_count != 1 {
                    return Err(ValidationError::out_of_range(
                        "max_count",
                        1,
                        1,
                        i64::from(max_count),
                    ));
                }
                Capacity::unique(codes)
            }
            (PromoMode::Common, _, _) => Err(ValidationError::invalid_format(
                "promo_common",
                "COMMON promos need promo_common and no promo_unique",
            )),
            (PromoMode::Unique, _, _) => Err(ValidationError::invalid_format(
                "promo_unique",
                "UNIQUE promos need promo_unique and no promo_common",
            )),
        }
    }

    pub fn mode(&self) -> PromoMode {
        match self {
            Capacity::Common { .. } => PromoMode::Common,
            Capacity::Unique { .. } => PromoMode::Unique,
        }
    }

    /// The caller-facing `max_count`: total uses for `Common`, 1 for `Unique`.
    pub fn max_count(&self) -> u32 {
        match self {
            Capacity::Common { max_count, .. } => *max_count,
            Capacity::Unique { .. } => 1,
        }
    }

    /// Total number of redemptions this capacity can ever serve.
    pub fn limit(&self) -> usize {
        match self {
            Capacity::Common { max_count, .. } => *max_count as usize,
            Capacity::Unique { codes, .. } => codes.len(),
        }
    }

    /// Number of redemptions already served.
    pub fn used(&self) -> usize {
        match self {
            Capacity::Common { used_count, .. } => *used_count as usize,
            Capacity::Unique { used_codes, .. } => used_codes.len(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.limit().saturating_sub(self.used())
    }

    pub fn has_remaining(&self) -> bool {
        self.used() < self.limit()
    }

    /// Consumes one unit and returns the code to hand out, or `None` when
    /// nothing is left.
    pub fn consume(&mut self) -> Option<String> {
        match self {
            Capacity::Common {
                code,
                max_count,
                used_count,
            } => {
                if *used_count >= *max_count {
                    return None;
                }
                *used_count += 1;
                Some(code.clone())
            }
            Capacity::Unique { codes, used_codes } => {
                if used_codes.len() >= codes.len() {
                    return None;
                }
                let code = next_unique_code(codes, used_codes)?.to_string();
                used_codes.push(code.clone());
                Some(code)
            }
        }
    }

    /// Replaces the caller-facing `max_count`.
    ///
    /// `Common` cannot drop below what is already used; `Unique` only accepts 1.
    pub fn set_max_count(&mut self, new_max: u32) -> Result<(), ValidationError> {
        match self {
            Capacity::Common {
                max_count,
                used_count,
                ..
            } => {
                check_max_count(new_max, *used_count)?;
                *max_count = new_max;
                Ok(())
            }
            Capacity::Unique { .. } => {
                if new_max != 1 {
                    return Err(ValidationError::out_of_range(
                        "max_count",
                        1,
                        1,
                        i64::from(new_max),
                    ));
                }
                Ok(())
            }
        }
    }
}
