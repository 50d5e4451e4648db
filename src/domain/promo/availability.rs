//! Availability evaluation.
//!
//! The persisted `active` flag is a cached derivation of capacity and the
//! time window. Evaluation recomputes it and reports whether the stored flag
//! has drifted; writing the correction back is the caller's job.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

use super::Capacity;

/// Optional, inclusive activity window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_from: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_until: Option<Timestamp>,
}

impl ActiveWindow {
    /// Builds a window, rejecting `active_from > active_until`.
    pub fn new(
        active_from: Option<Timestamp>,
        active_until: Option<Timestamp>,
    ) -> Result<Self, ValidationError> {
        let window = Self {
            active_from,
            active_until,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(from), Some(until)) = (self.active_from, self.active_until) {
            if from.is_after(&until) {
                return Err(ValidationError::invalid_format(
                    "active_from",
                    "active_from must not be after active_until",
                ));
            }
        }
        Ok(())
    }

    pub fn has_started(&self, now: &Timestamp) -> bool {
        self.active_from.map_or(true, |from| !from.is_after(now))
    }

    pub fn has_ended(&self, now: &Timestamp) -> bool {
        self.active_until.map_or(false, |until| until.is_before(now))
    }
}

/// Why a promo cannot be redeemed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailability {
    Exhausted,
    NotStarted,
    Ended,
}

impl fmt::Display for Unavailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unavailability::Exhausted => "no capacity left",
            Unavailability::NotStarted => "activity window has not opened",
            Unavailability::Ended => "activity window has closed",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of evaluating a promo at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// The correct value of the `active` flag.
    pub active: bool,
    /// True when the stored flag differs from `active`.
    pub needs_correction: bool,
    /// First reason the promo is inactive, if it is.
    pub blocked_by: Option<Unavailability>,
}

/// Derives the correct active state from capacity and window.
pub fn evaluate(
    capacity: &Capacity,
    window: &ActiveWindow,
    stored_active: bool,
    now: &Timestamp,
) -> Availability {
    let blocked_by = if !capacity.has_remaining() {
        Some(Unavailability::Exhausted)
    } else if !window.has_started(now) {
        Some(Unavailability::NotStarted)
    } else if window.has_ended(now) {
        Some(Unavailability::Ended)
    } else {
        None
    };

    let active = blocked_by.is_none();
    Availability {
        active,
        needs_correction: active != stored_active,
        blocked_by,
    }
}
