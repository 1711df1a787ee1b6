//! Session cookie management
//!
//! The provider's access and refresh tokens travel in `HttpOnly` cookies so
//! browser scripts never see them. One factory owns the attribute policy;
//! handlers only ask for built cookies.

use actix_web::{cookie::Cookie, HttpRequest};
use anyhow::{anyhow, Result};

use crate::provider::AuthSession;
use crate::settings::PawnestSettings;

/// Common cookie names used across the application
pub const ACCESS_COOKIE: &str = "pawnest_access";
pub const REFRESH_COOKIE: &str = "pawnest_refresh";
pub const VERIFIER_COOKIE: &str = "pawnest_verifier";

/// Refresh tokens outlive the access token; 30 days matches the platform's
/// refresh window
const REFRESH_MAX_AGE_DAYS: i64 = 30;

/// A PKCE verifier only needs to survive one round trip to the provider
const VERIFIER_MAX_AGE_MINUTES: i64 = 10;

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: actix_web::cookie::SameSite,
    pub path: String,
    pub max_age: actix_web::cookie::time::Duration,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            same_site: actix_web::cookie::SameSite::Lax,
            path: "/".to_string(),
            max_age: actix_web::cookie::time::Duration::hours(1),
        }
    }
}

/// Cookie factory for creating session cookies with proper configuration
///
/// Centralizes attribute policy so every cookie the application sets agrees
/// on `HttpOnly`, `SameSite` and the configured `Secure` flag.
#[derive(Clone)]
pub struct CookieFactory {
    cookie_secure: bool,
}

impl CookieFactory {
    /// Create a new cookie factory with the specified configuration
    #[must_use]
    pub fn new(cookie_secure: bool) -> Self {
        Self { cookie_secure }
    }

    /// Build a factory from application settings
    #[must_use]
    pub fn from_settings(settings: &PawnestSettings) -> Self {
        Self::new(settings.cookies.secure)
    }

    fn build(&self, name: &str, value: String, options: CookieOptions) -> Cookie<'static> {
        Cookie::build(name.to_owned(), value)
            .http_only(options.http_only)
            .secure(self.cookie_secure && options.secure)
            .same_site(options.same_site)
            .path(options.path)
            .max_age(options.max_age)
            .finish()
    }

    /// Both session cookies for a fresh provider session
    ///
    /// The access cookie expires with the token (`expires_in`); the refresh
    /// cookie lives for [`REFRESH_MAX_AGE_DAYS`] days.
    #[must_use]
    pub fn session_cookies(&self, session: &AuthSession) -> Vec<Cookie<'static>> {
        let access = self.build(
            ACCESS_COOKIE,
            session.access_token.clone(),
            CookieOptions {
                max_age: actix_web::cookie::time::Duration::seconds(session.expires_in),
                ..CookieOptions::default()
            },
        );
        let refresh = self.build(
            REFRESH_COOKIE,
            session.refresh_token.clone(),
            CookieOptions {
                max_age: actix_web::cookie::time::Duration::days(REFRESH_MAX_AGE_DAYS),
                ..CookieOptions::default()
            },
        );
        vec![access, refresh]
    }

    /// Short-lived cookie carrying the PKCE code verifier across the
    /// provider round trip
    #[must_use]
    pub fn verifier_cookie(&self, verifier: String) -> Cookie<'static> {
        self.build(
            VERIFIER_COOKIE,
            verifier,
            CookieOptions {
                max_age: actix_web::cookie::time::Duration::minutes(VERIFIER_MAX_AGE_MINUTES),
                ..CookieOptions::default()
            },
        )
    }

    /// Create an expired cookie to clear a specific cookie
    #[must_use]
    pub fn expired(&self, name: &str) -> Cookie<'static> {
        self.build(
            name,
            String::new(),
            CookieOptions {
                max_age: actix_web::cookie::time::Duration::seconds(-1),
                ..CookieOptions::default()
            },
        )
    }

    /// Expired replacements for both session cookies, used on sign-out
    #[must_use]
    pub fn clear_session_cookies(&self) -> Vec<Cookie<'static>> {
        vec![self.expired(ACCESS_COOKIE), self.expired(REFRESH_COOKIE)]
    }
}

/// Helper function to extract a cookie value from an `HttpRequest`
///
/// # Errors
///
/// Returns an error naming the cookie when the request does not carry it.
pub fn extract_cookie_value(req: &HttpRequest, cookie_name: &str) -> Result<String> {
    req.cookie(cookie_name)
        .ok_or_else(|| anyhow!("Cookie not found: {}", cookie_name))
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestFixtures;
    use actix_web::cookie::SameSite;

    #[test]
    fn test_session_cookies_follow_token_lifetimes() {
        let factory = CookieFactory::new(true);
        let session = TestFixtures::session();

        let cookies = factory.session_cookies(&session);
        assert_eq!(cookies.len(), 2);

        let access = &cookies[0];
        assert_eq!(access.name(), ACCESS_COOKIE);
        assert_eq!(access.value(), session.access_token);
        assert_eq!(
            access.max_age(),
            Some(actix_web::cookie::time::Duration::seconds(
                session.expires_in
            ))
        );
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.secure(), Some(true));

        let refresh = &cookies[1];
        assert_eq!(refresh.name(), REFRESH_COOKIE);
        assert_eq!(
            refresh.max_age(),
            Some(actix_web::cookie::time::Duration::days(30))
        );
    }

    #[test]
    fn test_secure_flag_follows_settings() {
        let factory = CookieFactory::new(false);
        let session = TestFixtures::session();

        let cookies = factory.session_cookies(&session);
        assert_eq!(cookies[0].secure(), Some(false));
    }

    #[test]
    fn test_clearing_cookies_expire_immediately() {
        let factory = CookieFactory::new(true);

        for cookie in factory.clear_session_cookies() {
            assert!(cookie.value().is_empty());
            assert_eq!(
                cookie.max_age(),
                Some(actix_web::cookie::time::Duration::seconds(-1))
            );
        }
    }

    #[test]
    fn test_extract_cookie_value() {
        let req = actix_web::test::TestRequest::default()
            .cookie(actix_web::cookie::Cookie::new(ACCESS_COOKIE, "token-123"))
            .to_http_request();

        let value = extract_cookie_value(&req, ACCESS_COOKIE).unwrap();
        assert_eq!(value, "token-123");

        let missing = extract_cookie_value(&req, REFRESH_COOKIE);
        assert!(missing.is_err());
    }
}
