//! Authentication service.
//!
//! Password accounts with argon2 hashes, and opaque bearer tokens: 32
//! random bytes, base64url encoded for the client, stored as a SHA-256
//! digest with an expiry.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::{info, instrument};

use fashion_store_core::Email;
use fashion_store_core::{ProfileUpdate, UserProfile};
use fashion_store_core::wire::{AuthResponse, LoginRequest, RegisterRequest};

use crate::db::RepositoryError;
use crate::db::tokens::TokenRepository;
use crate::db::users::UserRepository;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Random bytes in an API token.
const TOKEN_BYTES: usize = 32;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
    token_ttl: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, token_ttl: Duration) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
            token_ttl,
        }
    }

    /// Register a new customer and sign them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;
        let password_hash = hash_password(&request.password)?;

        let phone = request.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let user = self
            .users
            .create_with_password(name, &email, phone, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "Account registered");
        self.issue(user).await
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = Email::parse(&request.email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&request.password, &password_hash)?;

        info!(user_id = %user.id, "Signed in");
        self.issue(user).await
    }

    /// The user a bearer token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for an unknown or expired token.
    pub async fn authenticate(&self, token: &str) -> Result<UserProfile, AuthError> {
        self.tokens
            .find_user(&token_digest(token))
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Change the caller's name or phone.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName` for a blank name and
    /// `AuthError::Repository` if the account is gone.
    #[instrument(skip(self, user, update), fields(user_id = %user.id))]
    pub async fn update_profile(&self, user: &UserProfile, update: ProfileUpdate) -> Result<UserProfile, AuthError> {
        let update = update.validated()?;
        let profile = self.users.update_profile(user.id, &update).await?;
        info!("Profile updated");
        Ok(profile)
    }

    /// Revoke a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` on database failure.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if self.tokens.delete(&token_digest(token)).await? {
            info!("Token revoked");
        }
        Ok(())
    }

    async fn issue(&self, user: UserProfile) -> Result<AuthResponse, AuthError> {
        let token = generate_token();
        let expires_at = Utc::now() + self.token_ttl;
        self.tokens.insert(&token_digest(&token), user.id, expires_at).await?;
        Ok(AuthResponse { token, user })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// A fresh random token in its client-facing form.
fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// The stored form of a token.
fn token_digest(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("exactly8").is_ok());
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_generated_tokens() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        // 32 bytes without padding
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_token_digest() {
        let digest = token_digest("abc");
        assert_eq!(digest.len(), 32);
        assert_eq!(digest, token_digest("abc"));
        assert_ne!(digest, token_digest("abd"));
    }
}
