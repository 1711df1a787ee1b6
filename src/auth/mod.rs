//! Credential resolution for sign-in and registration
//!
//! Accounts live in the hosted auth platform, profiles in the `users` table.
//! This module classifies what kind of identifier a visitor typed, resolves
//! it to platform credentials, and keeps the profile row in step with the
//! account that authenticated.

pub mod actions;
pub mod identifier;
pub mod sync;

pub use actions::{AuthService, CredentialError, PLACEHOLDER_EMAIL_DOMAIN};
pub use identifier::{classify, is_email_shaped, is_phone_shaped, IdentifierKind};
pub use sync::ensure_profile;
