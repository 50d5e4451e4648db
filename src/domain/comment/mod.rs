//! Comment domain module.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CommentId, PromoId, Timestamp, UserId, ValidationError};

const TEXT_MIN: usize = 10;
const TEXT_MAX: usize = 1000;

/// Author details captured when the comment is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub surname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A user's comment on a promo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub promo_id: PromoId,
    pub author_id: UserId,
    pub author: Author,
    pub text: String,
    pub created_at: Timestamp,
}

fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::empty_field("text"));
    }
    let len = text.chars().count();
    if !(TEXT_MIN..=TEXT_MAX).contains(&len) {
        return Err(ValidationError::out_of_range(
            "text",
            TEXT_MIN as i64,
            TEXT_MAX as i64,
            len as i64,
        ));
    }
    Ok(())
}

impl Comment {
    pub fn write(
        promo_id: PromoId,
        author_id: UserId,
        author: Author,
        text: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        validate_text(&text)?;
        Ok(Self {
            id: CommentId::new(),
            promo_id,
            author_id,
            author,
            text,
            created_at: now,
        })
    }

    pub fn is_written_by(&self, user_id: &UserId) -> bool {
        &self.author_id == user_id
    }

    pub fn edit(&mut self, text: impl Into<String>) -> Result<(), ValidationError> {
        let text = text.into();
        validate_text(&text)?;
        self.text = text;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn write_rejects_short_text() {
        let result = Comment::write(PromoId::new(), UserId::new(), author(), "meh", Timestamp::now());
        assert!(result.is_err());
    }

    #[test]
    fn edit_replaces_text() {
        let user = UserId::new();
        let mut comment = Comment::write(
            PromoId::new(),
            user,
            author(),
            "Great deal, worked first time",
            Timestamp::now(),
        )
        .unwrap();
        assert!(comment.is_written_by(&user));

        comment.edit("Still works a week later").unwrap();
        assert_eq!(comment.text, "Still works a week later");
    }
}
