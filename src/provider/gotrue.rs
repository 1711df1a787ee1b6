//! HTTP implementation of [`IdentityProvider`] against a `GoTrue`-compatible
//! auth platform

use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    AuthSession, AuthUser, ContactChannel, IdentityProvider, ProviderError, SignUpMetadata,
    SignUpResult,
};
use crate::settings::PawnestSettings;
use async_trait::async_trait;

/// Auth platform client speaking the `GoTrue` wire protocol
///
/// All account flows go through `{base_url}/auth/v1`. End-user operations
/// authenticate with the anon key; token-bound operations additionally carry
/// the caller's bearer token.
pub struct GoTrueProvider {
    http_client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueProvider {
    /// Create a provider for the given platform endpoint
    #[must_use]
    pub fn new(base_url: &str, anon_key: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    /// Build a provider from loaded settings
    ///
    /// # Errors
    ///
    /// Returns an error if no anon key is configured
    pub fn from_settings(settings: &PawnestSettings) -> Result<Self, ProviderError> {
        let anon_key = settings.platform.get_anon_key().ok_or_else(|| {
            ProviderError::Configuration("platform anon key is not set".to_string())
        })?;
        Ok(Self::new(&settings.platform.base_url, anon_key))
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{path}", self.base_url)
    }

    /// Pull status and best-effort message out of a failed response
    async fn error_parts(response: reqwest::Response) -> (u16, String) {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = match parse_error_message(&text) {
            Some(message) => message,
            None if text.is_empty() => "no response body".to_string(),
            None => text,
        };
        (status, message)
    }
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn sign_in_with_password(
        &self,
        channel: &ContactChannel,
        password: &str,
    ) -> Result<AuthSession, ProviderError> {
        debug!("Password sign-in via {} channel", channel.field());

        let body = json!({ (channel.field()): channel.value(), "password": password });
        let response = self
            .http_client
            .post(self.auth_url("/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<AuthSession>().await?);
        }

        let (status, message) = Self::error_parts(response).await;
        Err(match status {
            400 | 401 => ProviderError::InvalidCredentials,
            _ => ProviderError::Unexpected { status, message },
        })
    }

    async fn sign_up(
        &self,
        channel: &ContactChannel,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SignUpResult, ProviderError> {
        debug!("Account creation via {} channel", channel.field());

        let body = json!({
            (channel.field()): channel.value(),
            "password": password,
            "data": metadata,
        });
        let response = self
            .http_client
            .post(self.auth_url("/signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            let value = response.json::<Value>().await?;
            return parse_signup_response(value);
        }

        let (status, message) = Self::error_parts(response).await;
        Err(match status {
            400 | 409 | 422 => ProviderError::Rejected(message),
            _ => ProviderError::Unexpected { status, message },
        })
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, ProviderError> {
        debug!("Exchanging authorization code for session");

        let body = json!({ "auth_code": code, "code_verifier": code_verifier });
        let response = self
            .http_client
            .post(self.auth_url("/token?grant_type=pkce"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<AuthSession>().await?);
        }

        let (status, message) = Self::error_parts(response).await;
        Err(match status {
            400 | 401 => ProviderError::SessionInvalid,
            _ => ProviderError::Unexpected { status, message },
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, ProviderError> {
        debug!("Refreshing session tokens");

        let body = json!({ "refresh_token": refresh_token });
        let response = self
            .http_client
            .post(self.auth_url("/token?grant_type=refresh_token"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<AuthSession>().await?);
        }

        let (status, message) = Self::error_parts(response).await;
        Err(match status {
            400 | 401 => ProviderError::SessionInvalid,
            _ => ProviderError::Unexpected { status, message },
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError> {
        let response = self
            .http_client
            .get(self.auth_url("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<AuthUser>().await?);
        }

        let (status, message) = Self::error_parts(response).await;
        Err(match status {
            401 | 403 => ProviderError::SessionInvalid,
            _ => ProviderError::Unexpected { status, message },
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = self
            .http_client
            .post(self.auth_url("/logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let (status, message) = Self::error_parts(response).await;
        Err(match status {
            401 | 403 => ProviderError::SessionInvalid,
            _ => ProviderError::Unexpected { status, message },
        })
    }
}

/// Decode a sign-up response body
///
/// With confirmations disabled the platform answers with a full token grant;
/// with confirmations on it answers with the bare account record.
fn parse_signup_response(value: Value) -> Result<SignUpResult, ProviderError> {
    if value.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(value)?;
        return Ok(SignUpResult {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    let user: AuthUser = serde_json::from_value(value)?;
    Ok(SignUpResult {
        user,
        session: None,
    })
}

/// Error payload in either of the platform's two error dialects
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

/// Best-effort human message from an error body
///
/// Token endpoints answer `{error, error_description}`, everything else
/// answers `{code, msg}`; both dialects appear in the wild.
fn parse_error_message(body: &str) -> Option<String> {
    let payload: ErrorBody = serde_json::from_str(body).ok()?;
    payload
        .error_description
        .or(payload.msg)
        .or(payload.message)
        .or(payload.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_signup_response_with_session() {
        let value = json!({
            "access_token": "at-123",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt-456",
            "user": {
                "id": "a79b530f-850b-45fc-b2c1-caf0e9e761b1",
                "email": "amy@example.com",
                "phone": null,
                "user_metadata": { "username": "amy", "display_name": "amy" }
            }
        });

        let result = parse_signup_response(value).unwrap();
        assert!(result.session.is_some());
        assert_eq!(result.user.email.as_deref(), Some("amy@example.com"));
        assert_eq!(result.user.metadata_str("username"), Some("amy"));
    }

    #[test]
    fn test_signup_response_pending_confirmation() {
        // Bare account record, no tokens until the contact point is confirmed
        let value = json!({
            "id": "a79b530f-850b-45fc-b2c1-caf0e9e761b1",
            "email": null,
            "phone": "13812345678",
            "user_metadata": { "username": "amy" }
        });

        let result = parse_signup_response(value).unwrap();
        assert!(result.session.is_none());
        assert_eq!(result.user.phone.as_deref(), Some("13812345678"));
        assert_ne!(result.user.id, Uuid::nil());
    }

    #[test]
    fn test_error_message_oauth_dialect() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            parse_error_message(body).as_deref(),
            Some("Invalid login credentials")
        );
    }

    #[test]
    fn test_error_message_api_dialect() {
        let body = r#"{"code":422,"msg":"User already registered"}"#;
        assert_eq!(
            parse_error_message(body).as_deref(),
            Some("User already registered")
        );
    }

    #[test]
    fn test_error_message_unparseable() {
        assert_eq!(parse_error_message("upstream exploded"), None);
        assert_eq!(parse_error_message(""), None);
    }
}
