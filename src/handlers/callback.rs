// Federated sign-in callback handler
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{error, info, warn};
use serde::Deserialize;

use crate::auth::{ensure_profile, AuthService};
use crate::provider::IdentityProvider;
use crate::settings::PawnestSettings;
use crate::utils::cookies::{extract_cookie_value, CookieFactory, VERIFIER_COOKIE};
use crate::utils::redirect::sanitize_return_path;
use crate::utils::responses::ResponseBuilder;

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// Complete a federated sign-in: trade the authorization code plus the PKCE
/// verifier cookie for a session, make sure the account has a marketplace
/// profile, and send the browser on to its destination.
///
/// # Errors
/// Never fails at the actix level; broken callbacks redirect to the error
/// page instead
pub async fn oauth_callback(
    query: web::Query<CallbackQuery>,
    req: HttpRequest,
    auth: web::Data<AuthService>,
    factory: web::Data<CookieFactory>,
    settings: web::Data<PawnestSettings>,
) -> Result<HttpResponse> {
    let error_url = format!("{}/auth/error", settings.application.redirect_base_url);

    let Some(code) = query.code.as_deref() else {
        warn!("Callback arrived without an authorization code");
        return Ok(ResponseBuilder::redirect(&error_url));
    };

    let Ok(verifier) = extract_cookie_value(&req, VERIFIER_COOKIE) else {
        warn!("Callback arrived without the PKCE verifier cookie");
        return Ok(ResponseBuilder::redirect(&error_url));
    };

    match auth
        .provider()
        .exchange_code_for_session(code, &verifier)
        .await
    {
        Ok(session) => {
            // A missing profile row should not strand a signed-in visitor;
            // the next profile read will retry the upsert
            if let Err(err) = ensure_profile(auth.profiles().as_ref(), &session.user).await {
                error!(
                    "Profile sync failed for federated account {}: {err}",
                    session.user.id
                );
            }

            info!("Federated sign-in completed for account {}", session.user.id);
            let mut cookies = factory.session_cookies(&session);
            cookies.push(factory.expired(VERIFIER_COOKIE));

            let destination = sanitize_return_path(query.next.as_deref());
            Ok(ResponseBuilder::redirect_with_cookies(&destination, cookies))
        }
        Err(err) => {
            warn!("Authorization code exchange failed: {err}");
            Ok(ResponseBuilder::redirect(&error_url))
        }
    }
}
