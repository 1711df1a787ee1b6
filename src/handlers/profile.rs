// Profile handlers for the signed-in user
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{error, info};

use crate::models::ProfileUpdate;
use crate::provider::IdentityProvider;
use crate::store::{DataStore, ProfileStore, StoreError};
use crate::utils::responses::ResponseBuilder;

use super::helpers::require_user;

/// Fetch the signed-in user's marketplace profile
///
/// # Errors
/// Never fails at the actix level
pub async fn my_profile(
    req: HttpRequest,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    match store.find_by_id(user.id).await {
        Ok(Some(profile)) => Ok(ResponseBuilder::ok_json(&profile)),
        Ok(None) => Ok(ResponseBuilder::not_found()),
        Err(err) => {
            error!("Profile lookup failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// Update the signed-in user's profile
///
/// Only the self-service fields travel through [`ProfileUpdate`]; identity
/// fields stay with the credential resolver.
///
/// # Errors
/// Never fails at the actix level
pub async fn update_my_profile(
    req: HttpRequest,
    body: web::Json<ProfileUpdate>,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    match store.update_profile(user.id, &body).await {
        Ok(profile) => {
            info!("User {} updated their profile", user.id);
            Ok(ResponseBuilder::ok_json(&profile))
        }
        Err(StoreError::MissingRow) => Ok(ResponseBuilder::not_found()),
        Err(err) => {
            error!("Profile update failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}
