//! Account identity as seen by clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Email, UserId, UserRole};

/// Longest accepted display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Public profile of a signed-in user. This is what clients persist under
/// the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

/// Who the client is acting as.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Guest,
    Authenticated(UserProfile),
}

impl Identity {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Guest => None,
            Self::Authenticated(profile) => Some(profile.id),
        }
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Guest => None,
            Self::Authenticated(profile) => Some(profile),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("name cannot be blank")]
    BlankName,
    #[error("name must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong,
}

/// `PUT /auth/profile`. Absent fields keep their current value; a blank
/// phone clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Trim the fields and check the name.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] for a blank or overlong name.
    pub fn validated(self) -> Result<Self, ProfileError> {
        let name = match self.name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ProfileError::BlankName);
                }
                if name.chars().count() > MAX_NAME_LENGTH {
                    return Err(ProfileError::NameTooLong);
                }
                Some(name.to_owned())
            }
            None => None,
        };
        Ok(Self {
            name,
            phone: self.phone.map(|p| p.trim().to_owned()),
        })
    }

    /// Apply the update to `profile`.
    pub fn apply(self, profile: &mut UserProfile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(phone) = self.phone {
            profile.phone = (!phone.is_empty()).then_some(phone);
        }
    }
}
