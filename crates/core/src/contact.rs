//! Contact form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ContactMessageId, ContactStatus, Email, EmailError};

/// Longest accepted message body.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Please provide name, email, and message")]
    MissingField,
    #[error("Please provide a valid email address")]
    InvalidEmail(#[source] EmailError),
    #[error("message must be at most {MAX_MESSAGE_LENGTH} characters")]
    MessageTooLong,
}

/// `POST /contact`, as submitted by a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// A submission that passed validation, ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactRequest {
    /// Trim every field and parse the email.
    ///
    /// # Errors
    ///
    /// Returns a [`ContactError`] if a required field is blank, the email
    /// does not parse, or the message is too long.
    pub fn validated(self) -> Result<NewContactMessage, ContactError> {
        let name = self.name.trim();
        let message = self.message.trim();
        if name.is_empty() || message.is_empty() || self.email.trim().is_empty() {
            return Err(ContactError::MissingField);
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ContactError::MessageTooLong);
        }
        let email = Email::parse(&self.email).map_err(ContactError::InvalidEmail)?;
        let phone = self
            .phone
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty());

        Ok(NewContactMessage {
            name: name.to_owned(),
            email,
            phone,
            message: message.to_owned(),
        })
    }
}

/// A stored submission, as listed in the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "  Meera ".to_owned(),
            email: " Meera@Example.com".to_owned(),
            phone: Some(" ".to_owned()),
            message: "Do you ship to Pune?\n".to_owned(),
        }
    }

    #[test]
    fn test_valid_submission_is_normalized() {
        let message = request().validated().unwrap();
        assert_eq!(message.name, "Meera");
        assert_eq!(message.email.as_str(), "meera@example.com");
        assert_eq!(message.phone, None);
        assert_eq!(message.message, "Do you ship to Pune?");
    }

    #[test]
    fn test_required_fields() {
        for blank in [
            ContactRequest { name: " ".to_owned(), ..request() },
            ContactRequest { email: String::new(), ..request() },
            ContactRequest { message: "\n".to_owned(), ..request() },
        ] {
            assert_eq!(blank.validated(), Err(ContactError::MissingField));
        }
    }

    #[test]
    fn test_invalid_email() {
        let err = ContactRequest {
            email: "meera.example.com".to_owned(),
            ..request()
        }
        .validated()
        .unwrap_err();
        assert_eq!(err, ContactError::InvalidEmail(EmailError::AtSymbol));
        assert_eq!(err.to_string(), "Please provide a valid email address");
    }

    #[test]
    fn test_message_length_cap() {
        let err = ContactRequest {
            message: "a".repeat(MAX_MESSAGE_LENGTH + 1),
            ..request()
        }
        .validated()
        .unwrap_err();
        assert_eq!(err, ContactError::MessageTooLong);
    }
}
