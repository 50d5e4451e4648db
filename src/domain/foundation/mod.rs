//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, pagination and error types
//! that form the vocabulary of the promo domain.

mod email;
mod errors;
mod ids;
mod page;
mod timestamp;

pub use email::Email;
pub use errors::{DomainError, ErrorCategory, ErrorCode, ValidationError};
pub use ids::{ActivationId, CommentId, CompanyId, PromoId, UserId};
pub use page::{Page, PageRequest, DEFAULT_PAGE_LIMIT};
pub use timestamp::Timestamp;
