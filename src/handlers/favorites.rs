// Favorites handlers: save pets to revisit later
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::error;
use uuid::Uuid;

use crate::provider::IdentityProvider;
use crate::store::{DataStore, FavoriteStore, PetStore};
use crate::utils::responses::ResponseBuilder;

use super::helpers::require_user;

/// Save a pet to the signed-in user's favorites
///
/// Saving the same pet twice is a no-op, so the route is safe to retry.
///
/// # Errors
/// Never fails at the actix level
pub async fn add_favorite(
    req: HttpRequest,
    path: web::Path<Uuid>,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let pet_id = path.into_inner();
    match store.get_pet(pet_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(ResponseBuilder::not_found()),
        Err(err) => {
            error!("Pet lookup for favorite failed: {err}");
            return Ok(ResponseBuilder::server_error());
        }
    }

    match store.add_favorite(user.id, pet_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(err) => {
            error!("Favorite save failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// Remove a pet from the signed-in user's favorites
///
/// # Errors
/// Never fails at the actix level
pub async fn remove_favorite(
    req: HttpRequest,
    path: web::Path<Uuid>,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    match store.remove_favorite(user.id, path.into_inner()).await {
        Ok(true) => Ok(HttpResponse::NoContent().finish()),
        Ok(false) => Ok(ResponseBuilder::not_found()),
        Err(err) => {
            error!("Favorite removal failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// List the pets the signed-in user has favorited, newest first
///
/// Listings removed since they were saved silently drop out.
///
/// # Errors
/// Never fails at the actix level
pub async fn my_favorites(
    req: HttpRequest,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let favorites = match store.list_favorites(user.id).await {
        Ok(favorites) => favorites,
        Err(err) => {
            error!("Favorites listing query failed: {err}");
            return Ok(ResponseBuilder::server_error());
        }
    };

    let mut pets = Vec::with_capacity(favorites.len());
    for favorite in favorites {
        match store.get_pet(favorite.pet_id).await {
            Ok(Some(pet)) => pets.push(pet),
            Ok(None) => {}
            Err(err) => {
                error!("Pet lookup for saved favorite failed: {err}");
                return Ok(ResponseBuilder::server_error());
            }
        }
    }

    Ok(ResponseBuilder::ok_json(&pets))
}
