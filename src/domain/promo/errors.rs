//! Promo-specific error types.
//!
//! Errors returned by promo, engagement and redemption operations.
//!
//! # Category Mapping
//!
//! | Error | Category |
//! |-------|----------|
//! | NotFound, UserNotFound, CommentNotFound | NotFound |
//! | Unavailable, Ineligible, NotOwner, NotCommentAuthor, FraudDenied | PermissionDenied |
//! | ConcurrentModification | Conflict |
//! | ValidationFailed | ValidationFailed |
//! | FraudServiceUnavailable | UpstreamUnavailable |
//! | Other | category of the wrapped code |

use crate::domain::foundation::{
    CommentId, DomainError, ErrorCategory, ErrorCode, PromoId, UserId, ValidationError,
};

use super::Unavailability;

/// Promo-specific errors.
#[derive(Debug, Clone)]
pub enum PromoError {
    /// Promo was never created.
    NotFound(PromoId),

    /// Promo exists but capacity or window blocks redemption.
    Unavailable {
        promo_id: PromoId,
        reason: Unavailability,
    },

    /// User does not satisfy the promo's targeting rule.
    Ineligible(PromoId),

    /// Caller company does not own the promo.
    NotOwner(PromoId),

    /// User record is missing.
    UserNotFound(UserId),

    /// Comment is missing or belongs to another promo.
    CommentNotFound(CommentId),

    /// Caller is not the comment's author.
    NotCommentAuthor(CommentId),

    /// Fraud verdict says no.
    FraudDenied(UserId),

    /// No attempt against the verdict service succeeded.
    FraudServiceUnavailable { attempts: u32 },

    /// Capacity kept changing underneath the redemption.
    ConcurrentModification { promo_id: PromoId, attempts: u32 },

    /// Input rejected.
    ValidationFailed { field: String, message: String },

    /// Anything else, passed through with its original code.
    Other(DomainError),
}

impl PromoError {
    pub fn not_found(id: PromoId) -> Self {
        PromoError::NotFound(id)
    }

    pub fn unavailable(promo_id: PromoId, reason: Unavailability) -> Self {
        PromoError::Unavailable { promo_id, reason }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PromoError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PromoError::NotFound(_) => ErrorCode::PromoNotFound,
            PromoError::Unavailable { .. } => ErrorCode::PromoUnavailable,
            PromoError::Ineligible(_)
            | PromoError::NotOwner(_)
            | PromoError::NotCommentAuthor(_) => ErrorCode::Forbidden,
            PromoError::UserNotFound(_) => ErrorCode::UserNotFound,
            PromoError::CommentNotFound(_) => ErrorCode::CommentNotFound,
            PromoError::FraudDenied(_) => ErrorCode::FraudCheckDenied,
            PromoError::FraudServiceUnavailable { .. } => ErrorCode::FraudServiceUnavailable,
            PromoError::ConcurrentModification { .. } => ErrorCode::ConcurrentModification,
            PromoError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PromoError::Other(err) => err.code,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            PromoError::NotFound(id) => format!("Promo not found: {}", id),
            PromoError::Unavailable { promo_id, reason } => {
                format!("Promo {} is not available: {}", promo_id, reason)
            }
            PromoError::Ineligible(id) => {
                format!("User does not match the targeting of promo {}", id)
            }
            PromoError::NotOwner(id) => format!("Promo {} belongs to another company", id),
            PromoError::UserNotFound(id) => format!("User not found: {}", id),
            PromoError::CommentNotFound(id) => format!("Comment not found: {}", id),
            PromoError::NotCommentAuthor(id) => {
                format!("Only the author may change comment {}", id)
            }
            PromoError::FraudDenied(id) => format!("Fraud check denied user {}", id),
            PromoError::FraudServiceUnavailable { attempts } => {
                format!("Fraud check failed after {} attempts", attempts)
            }
            PromoError::ConcurrentModification { promo_id, attempts } => format!(
                "Promo {} changed concurrently; gave up after {} attempts",
                promo_id, attempts
            ),
            PromoError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PromoError::Other(err) => err.message.clone(),
        }
    }

    /// Returns true if a caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::UpstreamUnavailable | ErrorCategory::StorageError
        ) || matches!(self, PromoError::ConcurrentModification { .. })
    }
}

impl std::fmt::Display for PromoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PromoError {}

impl From<DomainError> for PromoError {
    fn from(err: DomainError) -> Self {
        match err.category() {
            ErrorCategory::ValidationFailed => PromoError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => PromoError::Other(err),
        }
    }
}

impl From<ValidationError> for PromoError {
    fn from(err: ValidationError) -> Self {
        PromoError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<PromoError> for DomainError {
    fn from(err: PromoError) -> Self {
        match err {
            PromoError::Other(inner) => inner,
            PromoError::ValidationFailed { field, message } => {
                DomainError::validation(field, message)
            }
            other => DomainError::new(other.code(), other.message()),
        }
    }
}
