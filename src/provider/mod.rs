//! Identity provider abstraction over the hosted auth platform
//!
//! The credential resolver and the HTTP handlers talk to [`IdentityProvider`];
//! the platform-backed implementation lives in [`gotrue`], and test suites
//! swap in the in-memory mock from the testing module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub mod gotrue;

pub use gotrue::GoTrueProvider;

/// Account record held by the auth platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    /// Fetch a string field from the account's metadata bag
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).and_then(Value::as_str)
    }
}

/// Token grant issued by the auth platform after authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Contact point a password credential is keyed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactChannel {
    Email(String),
    Phone(String),
}

impl ContactChannel {
    /// The raw contact value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Email(value) | Self::Phone(value) => value,
        }
    }

    /// Field name this channel uses on the platform wire
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Phone(_) => "phone",
        }
    }
}

/// Free-form account metadata recorded at registration
///
/// Travels in the `data` field of the sign-up payload and lands in the
/// account's `user_metadata` bag.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Outcome of account creation
///
/// The platform returns a full session when confirmations are disabled and
/// a bare account record otherwise.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// Auth platform errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The identifier/password pair was not accepted
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The access or refresh token is missing, expired, or revoked
    #[error("session is missing or expired")]
    SessionInvalid,

    /// The platform refused to create the account
    #[error("registration rejected: {0}")]
    Rejected(String),

    /// Transport-level failure talking to the platform
    #[error("auth platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("unreadable auth platform response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The platform connection is not configured
    #[error("auth platform is not configured: {0}")]
    Configuration(String),

    /// Anything else the platform reported
    #[error("auth platform error ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

/// Identity provider service trait
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate a password credential keyed on an email or phone channel
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credential pair is not accepted
    /// - The platform cannot be reached or answers with an unexpected shape
    async fn sign_in_with_password(
        &self,
        channel: &ContactChannel,
        password: &str,
    ) -> Result<AuthSession, ProviderError>;

    /// Create an account keyed on an email or phone channel
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The platform refuses the account (already registered, weak password)
    /// - The platform cannot be reached or answers with an unexpected shape
    async fn sign_up(
        &self,
        channel: &ContactChannel,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SignUpResult, ProviderError>;

    /// Redeem an authorization code from the hosted OAuth flow
    ///
    /// # Errors
    ///
    /// Returns an error if the code or verifier is invalid or expired
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, ProviderError>;

    /// Trade a refresh token for a fresh session
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is invalid or revoked
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, ProviderError>;

    /// Look up the account behind an access token
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or expired
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError>;

    /// Revoke the session behind an access token
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or the platform is unreachable
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;
}
