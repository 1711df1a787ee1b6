// Authentication handlers: credential sign-in, registration, sign-out, refresh
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{error, info, warn};
use serde::Deserialize;

use crate::auth::{AuthService, CredentialError};
use crate::provider::{IdentityProvider, ProviderError};
use crate::settings::PawnestSettings;
use crate::utils::cookies::{extract_cookie_value, CookieFactory, REFRESH_COOKIE};
use crate::utils::redirect::{sanitize_return_path, DEFAULT_RETURN_PATH};
use crate::utils::responses::ResponseBuilder;

use super::helpers::bearer_token;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
    pub redirect_to: Option<String>,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub contact: String,
    pub password: String,
    pub redirect_to: Option<String>,
}

#[derive(Deserialize)]
pub struct UsernameSignupRequest {
    pub username: String,
    pub password: String,
    pub redirect_to: Option<String>,
}

#[derive(Deserialize)]
pub struct OAuthStartQuery {
    pub next: Option<String>,
}

/// Credential sign-in handler
///
/// Accepts one identifier box (email, mobile number, or username) and lets
/// the resolver work out which credential the platform knows it by.
///
/// # Errors
/// Never fails at the actix level; resolution failures become JSON error
/// responses
pub async fn login(
    auth: web::Data<AuthService>,
    factory: web::Data<CookieFactory>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth.login(&body.identifier, &body.password).await {
        Ok(session) => {
            info!("Sign-in succeeded for account {}", session.user.id);
            let redirect_url = sanitize_return_path(body.redirect_to.as_deref());
            Ok(ResponseBuilder::auth_success(
                &redirect_url,
                factory.session_cookies(&session),
            ))
        }
        Err(err) => Ok(credential_error_response(&err)),
    }
}

/// Registration handler for username plus email or mobile number
///
/// # Errors
/// Never fails at the actix level; registration failures become JSON error
/// responses
pub async fn signup(
    auth: web::Data<AuthService>,
    factory: web::Data<CookieFactory>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    match auth
        .signup(&body.username, &body.contact, &body.password)
        .await
    {
        Ok(outcome) => {
            info!("Registration succeeded for account {}", outcome.user.id);
            let redirect_url = sanitize_return_path(body.redirect_to.as_deref());
            let cookies = outcome
                .session
                .as_ref()
                .map(|session| factory.session_cookies(session))
                .unwrap_or_default();
            Ok(ResponseBuilder::auth_success(&redirect_url, cookies))
        }
        Err(err) => Ok(credential_error_response(&err)),
    }
}

/// Registration handler for username-only accounts
///
/// # Errors
/// Never fails at the actix level; registration failures become JSON error
/// responses
pub async fn signup_username(
    auth: web::Data<AuthService>,
    factory: web::Data<CookieFactory>,
    body: web::Json<UsernameSignupRequest>,
) -> Result<HttpResponse> {
    match auth
        .signup_with_username(&body.username, &body.password)
        .await
    {
        Ok(outcome) => {
            info!(
                "Username-only registration succeeded for account {}",
                outcome.user.id
            );
            let redirect_url = sanitize_return_path(body.redirect_to.as_deref());
            let cookies = outcome
                .session
                .as_ref()
                .map(|session| factory.session_cookies(session))
                .unwrap_or_default();
            Ok(ResponseBuilder::auth_success(&redirect_url, cookies))
        }
        Err(err) => Ok(credential_error_response(&err)),
    }
}

/// Sign out handler
///
/// Revokes the provider session when a token is present, then clears both
/// session cookies either way.
///
/// # Errors
/// Never fails at the actix level
pub async fn sign_out(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    factory: web::Data<CookieFactory>,
) -> Result<HttpResponse> {
    if let Some(token) = bearer_token(&req) {
        if let Err(err) = auth.provider().sign_out(&token).await {
            warn!("Provider sign-out failed, clearing cookies anyway: {err}");
        }
    }
    info!("User signed out and session cookies cleared");

    Ok(ResponseBuilder::redirect_with_cookies(
        "/auth/sign_in",
        factory.clear_session_cookies(),
    ))
}

/// Session refresh handler
///
/// Trades the refresh cookie for a fresh provider session and re-sets both
/// session cookies.
///
/// # Errors
/// Never fails at the actix level
pub async fn refresh(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    factory: web::Data<CookieFactory>,
) -> Result<HttpResponse> {
    let Ok(token) = extract_cookie_value(&req, REFRESH_COOKIE) else {
        return Ok(ResponseBuilder::unauthorized());
    };

    match auth.provider().refresh_session(&token).await {
        Ok(session) => Ok(ResponseBuilder::auth_success(
            DEFAULT_RETURN_PATH,
            factory.session_cookies(&session),
        )),
        Err(ProviderError::SessionInvalid) => {
            // The refresh token is dead; leaving the cookies in place would
            // just replay the failure on every request
            let mut builder = HttpResponse::Unauthorized();
            for cookie in factory.clear_session_cookies() {
                builder.cookie(cookie);
            }
            Ok(builder.json(serde_json::json!({
                "error": "Session expired, please sign in again"
            })))
        }
        Err(err) => {
            error!("Session refresh failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// Federated sign-in initiation handler
///
/// Stores a fresh PKCE verifier in a short-lived cookie and forwards the
/// browser to the platform's hosted authorization endpoint.
///
/// # Errors
/// Never fails at the actix level
pub async fn oauth_start(
    path: web::Path<String>,
    query: web::Query<OAuthStartQuery>,
    settings: web::Data<PawnestSettings>,
    factory: web::Data<CookieFactory>,
) -> Result<HttpResponse> {
    let provider = path.into_inner();
    if provider.is_empty()
        || !provider
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Ok(ResponseBuilder::validation("Unknown sign-in provider"));
    }

    let verifier = generate_code_verifier();
    let challenge = code_challenge(&verifier);
    let next = sanitize_return_path(query.next.as_deref());
    let callback_url = format!(
        "{}/auth/callback?next={}",
        settings.application.redirect_base_url,
        urlencoding::encode(&next)
    );

    let authorize_base = format!(
        "{}/auth/v1/authorize",
        settings.platform.base_url.trim_end_matches('/')
    );
    let Ok(mut authorize_url) = url::Url::parse(&authorize_base) else {
        error!("Platform base URL does not parse: {authorize_base}");
        return Ok(ResponseBuilder::server_error());
    };
    authorize_url
        .query_pairs_mut()
        .append_pair("provider", &provider)
        .append_pair("redirect_to", &callback_url)
        .append_pair("code_challenge", &challenge)
        .append_pair("code_challenge_method", "s256");

    info!("Redirecting to hosted {provider} sign-in");
    Ok(ResponseBuilder::redirect_with_cookies(
        authorize_url.as_str(),
        vec![factory.verifier_cookie(verifier)],
    ))
}

/// Map resolver failures onto the HTTP taxonomy: 400 validation, 409
/// uniqueness, 401 authentication, 500 partial or unexpected failure
fn credential_error_response(err: &CredentialError) -> HttpResponse {
    match err {
        CredentialError::Validation(message) | CredentialError::Rejected(message) => {
            ResponseBuilder::validation(message)
        }
        CredentialError::UsernameTaken => ResponseBuilder::conflict(&err.to_string()),
        CredentialError::InvalidCredentials => ResponseBuilder::unauthorized_with(&err.to_string()),
        CredentialError::ProfileSync { .. } => ResponseBuilder::server_error_with(&err.to_string()),
        CredentialError::Provider(inner) => {
            error!("Identity platform failure during credential action: {inner}");
            ResponseBuilder::server_error()
        }
        CredentialError::Store(inner) => {
            error!("Data store failure during credential action: {inner}");
            ResponseBuilder::server_error()
        }
    }
}

/// Random 256-bit PKCE verifier, base64url without padding
fn generate_code_verifier() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 code challenge for a verifier
fn code_challenge(verifier: &str) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use sha2::{Digest, Sha256};

    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_credential_errors_map_to_http_taxonomy() {
        let cases = vec![
            (
                CredentialError::Validation("Missing password".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (CredentialError::UsernameTaken, StatusCode::CONFLICT),
            (
                CredentialError::InvalidCredentials,
                StatusCode::UNAUTHORIZED,
            ),
            (
                CredentialError::Rejected("Password should be at least 6 characters".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CredentialError::ProfileSync {
                    code: "23505".to_string(),
                    message: "duplicate key".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = credential_error_response(&err);
            assert_eq!(response.status(), expected, "wrong status for {err}");
        }
    }

    #[test]
    fn test_code_verifier_shape() {
        let verifier = generate_code_verifier();

        // 32 random bytes encode to 43 unpadded base64url characters
        assert_eq!(verifier.len(), 43);
        assert!(verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        // Verifiers must not repeat
        assert_ne!(verifier, generate_code_verifier());
    }

    #[test]
    fn test_code_challenge_is_deterministic_and_url_safe() {
        let verifier = "fixed-test-verifier";
        let challenge = code_challenge(verifier);

        assert_eq!(challenge, code_challenge(verifier));
        assert_ne!(challenge, verifier);
        // SHA-256 digests encode to 43 unpadded base64url characters
        assert_eq!(challenge.len(), 43);
        assert!(challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
