//! Profile synchronization for externally created accounts
//!
//! Accounts that arrive through the OAuth callback were created by the auth
//! platform, not by [`super::AuthService`], so no profile row exists yet.
//! [`ensure_profile`] closes that gap idempotently.

use log::debug;

use crate::models::{NewProfile, UserRole};
use crate::provider::AuthUser;
use crate::store::{OnConflict, ProfileStore, StoreError};

/// Guarantee a profile row exists for an authenticated account
///
/// Keyed on the account id with ignore-on-conflict semantics: the first call
/// seeds the row from provider metadata, repeats and races are no-ops, and an
/// existing row is never overwritten. Safe to call on every callback.
///
/// # Errors
///
/// Returns [`StoreError`] when the upsert itself fails; a conflict with an
/// existing row is not a failure.
pub async fn ensure_profile(
    profiles: &dyn ProfileStore,
    user: &AuthUser,
) -> Result<(), StoreError> {
    let profile = NewProfile {
        id: user.id,
        username: None,
        email: user.email.clone(),
        display_name: derive_display_name(user),
        avatar_url: derive_avatar_url(user),
        role: UserRole::User,
    };

    debug!("Ensuring profile row exists for account {}", user.id);
    profiles.upsert_profile(&profile, OnConflict::Ignore).await
}

/// Best display name the provider metadata offers, falling back to the
/// local part of the email address
fn derive_display_name(user: &AuthUser) -> Option<String> {
    user.metadata_str("full_name")
        .or_else(|| user.metadata_str("name"))
        .map(ToString::to_string)
        .or_else(|| {
            user.email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .map(ToString::to_string)
        })
}

fn derive_avatar_url(user: &AuthUser) -> Option<String> {
    user.metadata_str("avatar_url")
        .or_else(|| user.metadata_str("picture"))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn user_with(email: Option<&str>, metadata: serde_json::Value) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: email.map(ToString::to_string),
            phone: None,
            user_metadata: metadata,
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let user = user_with(
            Some("amy@example.com"),
            json!({ "full_name": "Amy Adams", "name": "amyadams" }),
        );
        assert_eq!(derive_display_name(&user).as_deref(), Some("Amy Adams"));
    }

    #[test]
    fn test_display_name_falls_back_to_name_then_email() {
        let named = user_with(Some("amy@example.com"), json!({ "name": "amyadams" }));
        assert_eq!(derive_display_name(&named).as_deref(), Some("amyadams"));

        let bare = user_with(Some("amy@example.com"), json!({}));
        assert_eq!(derive_display_name(&bare).as_deref(), Some("amy"));

        let empty = user_with(None, json!({}));
        assert_eq!(derive_display_name(&empty), None);
    }

    #[test]
    fn test_avatar_prefers_avatar_url_over_picture() {
        let both = user_with(
            None,
            json!({ "avatar_url": "https://cdn.example.com/a.png", "picture": "https://cdn.example.com/b.png" }),
        );
        assert_eq!(
            derive_avatar_url(&both).as_deref(),
            Some("https://cdn.example.com/a.png")
        );

        let picture_only = user_with(None, json!({ "picture": "https://cdn.example.com/b.png" }));
        assert_eq!(
            derive_avatar_url(&picture_only).as_deref(),
            Some("https://cdn.example.com/b.png")
        );
    }
}
