// Helper functions used across authenticated handlers
use actix_web::{HttpRequest, HttpResponse};
use log::error;

use crate::provider::{AuthUser, IdentityProvider, ProviderError};
use crate::utils::cookies::{extract_cookie_value, ACCESS_COOKIE};
use crate::utils::responses::ResponseBuilder;

/// Pull the access token from the session cookie, falling back to an
/// `Authorization: Bearer` header for non-browser clients
#[must_use]
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    if let Ok(token) = extract_cookie_value(req, ACCESS_COOKIE) {
        return Some(token);
    }

    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(ToString::to_string)
}

/// Resolve the request's access token to the provider's user
///
/// # Errors
///
/// Returns a ready-to-send 401 when the request carries no token or the
/// provider does not accept it, and a 500 when token resolution fails for
/// any other reason.
pub async fn require_user(
    req: &HttpRequest,
    provider: &dyn IdentityProvider,
) -> Result<AuthUser, HttpResponse> {
    let Some(token) = bearer_token(req) else {
        return Err(ResponseBuilder::unauthorized());
    };

    match provider.get_user(&token).await {
        Ok(user) => Ok(user),
        Err(ProviderError::SessionInvalid) => Err(ResponseBuilder::unauthorized()),
        Err(err) => {
            error!("Access token resolution failed: {err}");
            Err(ResponseBuilder::server_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_prefers_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(ACCESS_COOKIE, "cookie-token"))
            .insert_header(("Authorization", "Bearer header-token"))
            .to_http_request();

        assert_eq!(bearer_token(&req).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_bearer_token_falls_back_to_header() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer header-token"))
            .to_http_request();

        assert_eq!(bearer_token(&req).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_bearer_token_ignores_other_auth_schemes() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwdw=="))
            .to_http_request();

        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn test_bearer_token_absent() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
