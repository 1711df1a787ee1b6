//! HTTP response handling
//!
//! One place for every response shape the handlers emit: form-submission
//! results as `{"success": true, "redirect_url"}`, failures as `{"error"}`,
//! plus redirects and plain JSON. Common error bodies are pre-serialized
//! once at startup and reused.

use actix_web::{cookie::Cookie, http::header, HttpResponse};
use serde_json::json;

// ===============================
// CACHED RESPONSES FOR PERFORMANCE
// ===============================

/// Global instance of pre-serialized common responses
static CACHED_RESPONSES: std::sync::LazyLock<CachedResponses> =
    std::sync::LazyLock::new(CachedResponses::new);

/// Pre-serialized bodies for the error responses that carry no
/// request-specific detail
struct CachedResponses {
    unauthorized: String,
    not_found: String,
    server_error: String,
    missing_parameters: String,
}

impl CachedResponses {
    fn new() -> Self {
        Self {
            unauthorized: Self::create_json("Authentication is required to access this resource"),
            not_found: Self::create_json("The requested resource was not found"),
            server_error: Self::create_json("An internal server error occurred"),
            missing_parameters: Self::create_json(
                "Required parameters are missing from the request",
            ),
        }
    }

    fn create_json(message: &str) -> String {
        serde_json::to_string(&json!({ "error": message })).expect("Failed to serialize JSON")
    }

    fn unauthorized(&self) -> HttpResponse {
        HttpResponse::Unauthorized()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(self.unauthorized.clone())
    }

    fn not_found(&self) -> HttpResponse {
        HttpResponse::NotFound()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(self.not_found.clone())
    }

    fn server_error(&self) -> HttpResponse {
        HttpResponse::InternalServerError()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(self.server_error.clone())
    }

    fn missing_parameters(&self) -> HttpResponse {
        HttpResponse::BadRequest()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(self.missing_parameters.clone())
    }
}

/// Unified response builder for all handler responses
pub struct ResponseBuilder;

impl ResponseBuilder {
    // ===============================
    // SUCCESS RESPONSE METHODS
    // ===============================

    /// Form-submission success body with session cookies attached
    #[must_use]
    pub fn auth_success(redirect_url: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder.json(json!({ "success": true, "redirect_url": redirect_url }))
    }

    /// Create an OK response (200) with JSON content
    #[must_use]
    pub fn ok_json<T: serde::Serialize>(data: &T) -> HttpResponse {
        HttpResponse::Ok().json(data)
    }

    /// Create a Created response (201) with JSON content
    #[must_use]
    pub fn created_json<T: serde::Serialize>(data: &T) -> HttpResponse {
        HttpResponse::Created().json(data)
    }

    /// Create a redirect response (302 Found)
    #[must_use]
    pub fn redirect(location: &str) -> HttpResponse {
        Self::redirect_with_cookies(location, Vec::new())
    }

    /// Create a redirect response with cookies (owned, avoids lifetime issues)
    #[must_use]
    pub fn redirect_with_cookies(location: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Found();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder
            .append_header(("Location", location.to_string()))
            .finish()
    }

    // ===============================
    // ERROR RESPONSE METHODS
    // ===============================

    /// Validation failure (400) with a field-naming message
    #[must_use]
    pub fn validation(message: &str) -> HttpResponse {
        HttpResponse::BadRequest().json(json!({ "error": message }))
    }

    /// Common validation error: missing field
    #[must_use]
    pub fn missing_field(field_name: &str) -> HttpResponse {
        Self::validation(&format!("Missing required field: {field_name}"))
    }

    /// Uniqueness conflict (409)
    #[must_use]
    pub fn conflict(message: &str) -> HttpResponse {
        HttpResponse::Conflict().json(json!({ "error": message }))
    }

    /// Authentication failure (401) with a caller-supplied message
    #[must_use]
    pub fn unauthorized_with(message: &str) -> HttpResponse {
        HttpResponse::Unauthorized().json(json!({ "error": message }))
    }

    /// Use cached unauthorized response for the no-credentials case
    #[must_use]
    pub fn unauthorized() -> HttpResponse {
        CACHED_RESPONSES.unauthorized()
    }

    /// Use cached not found response
    #[must_use]
    pub fn not_found() -> HttpResponse {
        CACHED_RESPONSES.not_found()
    }

    /// Use cached missing parameters response
    #[must_use]
    pub fn missing_parameters() -> HttpResponse {
        CACHED_RESPONSES.missing_parameters()
    }

    /// Use cached server error response
    #[must_use]
    pub fn server_error() -> HttpResponse {
        CACHED_RESPONSES.server_error()
    }

    /// Server-side failure (500) whose message must reach the client,
    /// such as a partial registration carrying the store error code
    #[must_use]
    pub fn server_error_with(message: &str) -> HttpResponse {
        HttpResponse::InternalServerError().json(json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_response_statuses() {
        let response = ResponseBuilder::validation("Missing password");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ResponseBuilder::conflict("This username is already taken");
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ResponseBuilder::unauthorized();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ResponseBuilder::server_error();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ResponseBuilder::not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cached_responses_have_json_content_type() {
        let response = ResponseBuilder::unauthorized();
        let content_type = response
            .headers()
            .get(actix_web::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert_eq!(content_type, "application/json");
    }

    #[test]
    fn test_auth_success_attaches_cookies() {
        use actix_web::cookie::Cookie;

        let cookies = vec![
            Cookie::new("pawnest_access", "token-a"),
            Cookie::new("pawnest_refresh", "token-b"),
        ];
        let response = ResponseBuilder::auth_success("/dashboard", cookies);

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie_count = response
            .headers()
            .get_all(actix_web::http::header::SET_COOKIE)
            .count();
        assert_eq!(set_cookie_count, 2);
    }

    #[test]
    fn test_redirect_sets_location() {
        let response = ResponseBuilder::redirect("/auth/sign_in");
        assert_eq!(response.status(), StatusCode::FOUND);

        let location = response
            .headers()
            .get(actix_web::http::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert_eq!(location, "/auth/sign_in");
    }
}
