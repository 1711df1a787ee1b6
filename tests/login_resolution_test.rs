// Integration tests for single-box identifier resolution at sign-in
use std::sync::Arc;
use uuid::Uuid;

use pawnest::auth::{AuthService, CredentialError, PLACEHOLDER_EMAIL_DOMAIN};
use pawnest::models::UserProfile;
use pawnest::testing::constants::{TEST_EMAIL, TEST_PASSWORD, TEST_PHONE, TEST_USERNAME};
use pawnest::testing::{MemoryStore, MockIdentityProvider, TestFixtures};

fn service() -> (Arc<MockIdentityProvider>, Arc<MemoryStore>, AuthService) {
    let provider = Arc::new(MockIdentityProvider::new());
    let store = Arc::new(MemoryStore::new());
    let auth = AuthService::new(provider.clone(), store.clone());
    (provider, store, auth)
}

fn profile_row(id: Uuid, username: &str, email: Option<&str>) -> UserProfile {
    let mut profile = TestFixtures::profile(id);
    profile.username = Some(username.to_string());
    profile.email = email.map(str::to_string);
    profile
}

#[tokio::test]
async fn test_email_identifier_is_used_directly() {
    let (provider, store, auth) = service();

    // A profile whose username looks exactly like the typed email, but maps
    // to a different address. If the resolver consulted the profile table
    // for email-shaped input, it would pick up the wrong credentials.
    let account_id = provider.seed_account(Some("trap@example.com"), None, TEST_PASSWORD);
    store.seed_profile(profile_row(
        account_id,
        "trap@example.com",
        Some("other@example.com"),
    ));

    let session = auth
        .login("trap@example.com", TEST_PASSWORD)
        .await
        .expect("email sign-in should succeed");
    assert_eq!(session.user.email.as_deref(), Some("trap@example.com"));
}

#[tokio::test]
async fn test_phone_identifier_signs_in_without_any_profile() {
    let (provider, _store, auth) = service();

    // Phone accounts work even when no profile row exists at all
    provider.seed_account(None, Some(TEST_PHONE), TEST_PASSWORD);

    let session = auth
        .login(TEST_PHONE, TEST_PASSWORD)
        .await
        .expect("phone sign-in should succeed");
    assert_eq!(session.user.phone.as_deref(), Some(TEST_PHONE));
    assert!(session.user.email.is_none());
}

#[tokio::test]
async fn test_phone_shaped_username_falls_through_to_profile_lookup() {
    let (provider, store, auth) = service();

    // The identifier matches the mobile number shape, but nobody registered
    // that phone. The one failed phone attempt must not end resolution; a
    // profile row with the digit string as its username still wins.
    let account_id = provider.seed_account(Some("digits@example.com"), None, TEST_PASSWORD);
    store.seed_profile(profile_row(
        account_id,
        "13912345679",
        Some("digits@example.com"),
    ));

    let session = auth
        .login("13912345679", TEST_PASSWORD)
        .await
        .expect("digit-string username should resolve through the profile table");
    assert_eq!(session.user.email.as_deref(), Some("digits@example.com"));
}

#[tokio::test]
async fn test_username_resolves_to_profile_email() {
    let (provider, store, auth) = service();

    let account_id = provider.seed_account(Some(TEST_EMAIL), None, TEST_PASSWORD);
    store.seed_profile(profile_row(account_id, TEST_USERNAME, Some(TEST_EMAIL)));

    let session = auth
        .login(TEST_USERNAME, TEST_PASSWORD)
        .await
        .expect("username sign-in should resolve to the stored email");

    // The real address authenticated, not a synthesized placeholder
    assert_eq!(session.user.email.as_deref(), Some(TEST_EMAIL));
}

#[tokio::test]
async fn test_unknown_username_tries_placeholder_address() {
    let (provider, _store, auth) = service();

    // Username-only accounts carry the synthesized address on the platform
    // side; with no profile row the resolver must reconstruct it
    let placeholder = format!("ghost@{PLACEHOLDER_EMAIL_DOMAIN}");
    provider.seed_account(Some(&placeholder), None, TEST_PASSWORD);

    let session = auth
        .login("ghost", TEST_PASSWORD)
        .await
        .expect("placeholder fallback should authenticate");
    assert_eq!(session.user.email.as_deref(), Some(placeholder.as_str()));
}

#[tokio::test]
async fn test_profile_without_email_uses_placeholder() {
    let (provider, store, auth) = service();

    // The profile row exists but was registered through a mobile number, so
    // its email column is null; resolution still falls back to the
    // placeholder instead of erroring
    let placeholder = format!("bare@{PLACEHOLDER_EMAIL_DOMAIN}");
    let account_id = provider.seed_account(Some(&placeholder), None, TEST_PASSWORD);
    store.seed_profile(profile_row(account_id, "bare", None));

    let session = auth
        .login("bare", TEST_PASSWORD)
        .await
        .expect("null-email profile should fall back to the placeholder");
    assert_eq!(session.user.id, account_id);
}

#[tokio::test]
async fn test_store_outage_degrades_to_placeholder() {
    let (provider, store, auth) = service();

    let placeholder = format!("carol@{PLACEHOLDER_EMAIL_DOMAIN}");
    provider.seed_account(Some(&placeholder), None, TEST_PASSWORD);

    // The profile lookup fails outright; sign-in must degrade to the
    // placeholder attempt rather than surface a server error
    store.fail_next_username_lookup();

    let session = auth
        .login("carol", TEST_PASSWORD)
        .await
        .expect("store outage should not block placeholder sign-in");
    assert_eq!(session.user.email.as_deref(), Some(placeholder.as_str()));
}

#[tokio::test]
async fn test_failed_sign_ins_share_one_message() {
    let (provider, _store, auth) = service();
    provider.seed_account(Some(TEST_EMAIL), None, TEST_PASSWORD);

    // Wrong password for a real account
    let wrong_password = auth
        .login(TEST_EMAIL, "not-the-password")
        .await
        .expect_err("wrong password must fail");

    // Identifier nobody registered
    let unknown_user = auth
        .login("stranger", TEST_PASSWORD)
        .await
        .expect_err("unknown identifier must fail");

    // Both failures collapse to the same generic message so responses do
    // not reveal which identifiers exist
    assert!(matches!(wrong_password, CredentialError::InvalidCredentials));
    assert!(matches!(unknown_user, CredentialError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}
