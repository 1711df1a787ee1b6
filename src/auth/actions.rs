//! Credential resolver for sign-in and registration
//!
//! A visitor types one identifier box; the auth platform only understands
//! email or phone credentials. [`AuthService`] bridges the two: it classifies
//! the identifier, resolves usernames through the profile table, and falls
//! back to the deterministic placeholder address that username-only accounts
//! are registered under.

use std::sync::Arc;

use log::{debug, error, warn};
use thiserror::Error;
use uuid::Uuid;

use super::identifier::{self, IdentifierKind};
use crate::models::{NewProfile, UserRole};
use crate::provider::{
    AuthSession, ContactChannel, IdentityProvider, ProviderError, SignUpMetadata, SignUpResult,
};
use crate::store::{OnConflict, ProfileStore, StoreError};

/// Domain under which username-only accounts are registered
///
/// `signup_with_username("bob", ..)` creates the platform account as
/// `bob@mypets.local`, and login resolves bare usernames back to the same
/// address when no profile row stores a real email.
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "mypets.local";

/// One generic message for every failed sign-in attempt, so responses never
/// reveal which identifiers have accounts
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid identifier or password";

/// Sign-in and registration failures
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Missing or malformed input, caught before any network call
    #[error("{0}")]
    Validation(String),

    /// The requested username already has a profile row
    #[error("This username is already taken")]
    UsernameTaken,

    /// No attempt authenticated; deliberately unspecific
    #[error("{INVALID_CREDENTIALS_MESSAGE}")]
    InvalidCredentials,

    /// The platform refused to create the account
    #[error("{0}")]
    Rejected(String),

    /// Account exists but the profile write failed; an operator can repair
    /// the profile, so the store error code travels with the message
    #[error("Account created but profile setup failed (code {code}): {message}")]
    ProfileSync { code: String, message: String },

    /// Unexpected auth platform failure outside the credential path
    #[error(transparent)]
    Provider(ProviderError),

    /// Unexpected data store failure outside the credential path
    #[error(transparent)]
    Store(StoreError),
}

/// Resolves visitor-typed identifiers against the auth platform and keeps
/// profile rows in step with the accounts it creates
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl AuthService {
    /// Create a resolver over the given provider and profile store
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { provider, profiles }
    }

    /// The profile store this resolver writes through
    #[must_use]
    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    /// The identity provider this resolver authenticates against
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Sign in with a single identifier box
    ///
    /// Attempt order is fixed: email-shaped identifiers go straight to the
    /// platform; phone-shaped ones get one phone attempt; everything left is
    /// resolved username-to-email through the profile table, falling back to
    /// `<identifier>@mypets.local`. Each attempt runs at most once and the
    /// first success wins.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Validation`] on empty fields,
    /// [`CredentialError::InvalidCredentials`] when no attempt authenticated,
    /// and [`CredentialError::Provider`] on platform failures that are not
    /// credential rejections.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthSession, CredentialError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(CredentialError::Validation(
                "Please enter both an identifier and a password".to_string(),
            ));
        }

        if identifier::is_email_shaped(identifier) {
            return self
                .password_attempt(ContactChannel::Email(identifier.to_string()), password)
                .await;
        }

        if identifier::is_phone_shaped(identifier) {
            match self
                .provider
                .sign_in_with_password(&ContactChannel::Phone(identifier.to_string()), password)
                .await
            {
                Ok(session) => return Ok(session),
                Err(ProviderError::InvalidCredentials) => {
                    debug!("Phone attempt rejected, resolving identifier as username");
                }
                Err(other) => return Err(CredentialError::Provider(other)),
            }
        }

        let target_email = self.resolve_username_email(identifier).await;
        self.password_attempt(ContactChannel::Email(target_email), password)
            .await
    }

    /// Register with a username plus a real contact point
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Validation`] on empty fields or a contact
    /// that is neither email- nor phone-shaped,
    /// [`CredentialError::UsernameTaken`] when the username already has a
    /// profile, [`CredentialError::Rejected`] when the platform refuses the
    /// account, and [`CredentialError::ProfileSync`] when the account was
    /// created but the profile write failed.
    pub async fn signup(
        &self,
        username: &str,
        contact: &str,
        password: &str,
    ) -> Result<SignUpResult, CredentialError> {
        let username = username.trim();
        let contact = contact.trim();
        if username.is_empty() || contact.is_empty() || password.is_empty() {
            return Err(CredentialError::Validation(
                "Please fill in username, contact, and password".to_string(),
            ));
        }

        self.ensure_username_free(username).await?;

        let channel = match identifier::classify(contact) {
            IdentifierKind::Email => ContactChannel::Email(contact.to_string()),
            IdentifierKind::Phone => ContactChannel::Phone(contact.to_string()),
            IdentifierKind::Username => {
                return Err(CredentialError::Validation(
                    "Contact must be a valid email address or mobile number".to_string(),
                ));
            }
        };

        // Phone accounts store an explicit null email in the profile row
        let profile_email = match &channel {
            ContactChannel::Email(email) => Some(email.clone()),
            ContactChannel::Phone(_) => None,
        };

        let outcome = self.create_account(&channel, password, username).await?;
        self.record_registration_profile(outcome.user.id, username, profile_email)
            .await?;
        Ok(outcome)
    }

    /// Register with a bare username and no real contact point
    ///
    /// The platform account is created under the synthesized address
    /// `<username>@mypets.local`, which login later reconstructs for
    /// profile-less usernames. The placeholder is also stored as the profile
    /// email so the username lookup resolves without reconstruction.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`AuthService::signup`], minus the contact
    /// shape check.
    pub async fn signup_with_username(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SignUpResult, CredentialError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(CredentialError::Validation(
                "Please fill in username and password".to_string(),
            ));
        }

        self.ensure_username_free(username).await?;

        let placeholder = format!("{username}@{PLACEHOLDER_EMAIL_DOMAIN}");
        let channel = ContactChannel::Email(placeholder.clone());

        let outcome = self.create_account(&channel, password, username).await?;
        self.record_registration_profile(outcome.user.id, username, Some(placeholder))
            .await?;
        Ok(outcome)
    }

    /// One password attempt; credential rejections collapse into the generic
    /// message, anything else propagates
    async fn password_attempt(
        &self,
        channel: ContactChannel,
        password: &str,
    ) -> Result<AuthSession, CredentialError> {
        match self.provider.sign_in_with_password(&channel, password).await {
            Ok(session) => Ok(session),
            Err(ProviderError::InvalidCredentials) => Err(CredentialError::InvalidCredentials),
            Err(other) => Err(CredentialError::Provider(other)),
        }
    }

    /// Resolve a bare username to the email the platform knows it by
    ///
    /// A profile row with a stored email wins; otherwise the deterministic
    /// placeholder. Lookup failures degrade to the placeholder so a store
    /// hiccup cannot lock out username-only accounts.
    async fn resolve_username_email(&self, username: &str) -> String {
        let stored = match self.profiles.find_by_username(username).await {
            Ok(profile) => profile.and_then(|profile| profile.email),
            Err(err) => {
                warn!("Username lookup failed, trying placeholder address: {err}");
                None
            }
        };

        stored.unwrap_or_else(|| format!("{username}@{PLACEHOLDER_EMAIL_DOMAIN}"))
    }

    /// Reject a registration before any platform call when the username
    /// already has a profile row
    async fn ensure_username_free(&self, username: &str) -> Result<(), CredentialError> {
        match self.profiles.find_by_username(username).await {
            Ok(Some(_)) => Err(CredentialError::UsernameTaken),
            Ok(None) => Ok(()),
            Err(err) => Err(CredentialError::Store(err)),
        }
    }

    async fn create_account(
        &self,
        channel: &ContactChannel,
        password: &str,
        username: &str,
    ) -> Result<SignUpResult, CredentialError> {
        let metadata = SignUpMetadata {
            display_name: Some(username.to_string()),
            username: Some(username.to_string()),
        };

        match self.provider.sign_up(channel, password, metadata).await {
            Ok(outcome) => Ok(outcome),
            Err(ProviderError::Rejected(message)) => Err(CredentialError::Rejected(message)),
            Err(other) => Err(CredentialError::Provider(other)),
        }
    }

    /// Record the profile row for a freshly created account
    ///
    /// Merge upsert keyed on account id: a trigger-created row is completed
    /// rather than conflicting. A failure here leaves the account without a
    /// profile, which is reported as a partial failure, never swallowed.
    async fn record_registration_profile(
        &self,
        account_id: Uuid,
        username: &str,
        email: Option<String>,
    ) -> Result<(), CredentialError> {
        let profile = NewProfile {
            id: account_id,
            username: Some(username.to_string()),
            email,
            display_name: Some(username.to_string()),
            avatar_url: None,
            role: UserRole::User,
        };

        self.profiles
            .upsert_profile(&profile, OnConflict::Merge)
            .await
            .map_err(|err| {
                error!("Profile write failed after account creation for {account_id}: {err}");
                let (code, message) = match &err {
                    StoreError::Api { code, message } => (code.clone(), message.clone()),
                    other => ("unknown".to_string(), other.to_string()),
                };
                CredentialError::ProfileSync { code, message }
            })
    }
}
