// Pet listing handlers: public browsing plus publisher management
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{error, info};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{NewPet, PetGender, PetSize, PetSpecies, PetStatus};
use crate::provider::IdentityProvider;
use crate::store::{DataStore, PetFilter, PetStore};
use crate::utils::responses::ResponseBuilder;

use super::helpers::require_user;

#[derive(Deserialize)]
pub struct PetListQuery {
    pub species: Option<PetSpecies>,
    pub gender: Option<PetGender>,
    pub size: Option<PetSize>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
}

#[derive(Deserialize)]
pub struct PublishPetRequest {
    #[serde(default)]
    pub name: String,
    pub species: Option<PetSpecies>,
    pub breed: Option<String>,
    #[serde(default)]
    pub age_years: i32,
    #[serde(default)]
    pub age_months: i32,
    #[serde(default)]
    pub gender: PetGender,
    pub size: Option<PetSize>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub health_status: Option<String>,
    pub vaccination_status: Option<String>,
    pub adoption_requirements: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Browse adoptable pets
///
/// Only pets still waiting for a home appear in the public index; adopted
/// and pending listings drop out without the caller asking.
///
/// # Errors
/// Never fails at the actix level
pub async fn list_pets(
    query: web::Query<PetListQuery>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let filter = PetFilter {
        species: query.species,
        gender: query.gender,
        status: Some(PetStatus::Available),
        size: query.size,
        location: query.location.clone(),
        search: query.search.clone(),
        min_age_years: query.min_age,
        max_age_years: query.max_age,
    };

    match store.list_pets(&filter).await {
        Ok(pets) => Ok(ResponseBuilder::ok_json(&pets)),
        Err(err) => {
            error!("Pet listing query failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// Fetch one pet listing by id
///
/// # Errors
/// Never fails at the actix level
pub async fn get_pet(
    path: web::Path<Uuid>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    match store.get_pet(path.into_inner()).await {
        Ok(Some(pet)) => Ok(ResponseBuilder::ok_json(&pet)),
        Ok(None) => Ok(ResponseBuilder::not_found()),
        Err(err) => {
            error!("Pet lookup failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// Publish a new pet listing for the signed-in user
///
/// # Errors
/// Never fails at the actix level
pub async fn publish_pet(
    req: HttpRequest,
    body: web::Json<PublishPetRequest>,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let payload = body.into_inner();
    if payload.name.trim().is_empty() {
        return Ok(ResponseBuilder::missing_field("name"));
    }
    if payload.location.trim().is_empty() {
        return Ok(ResponseBuilder::missing_field("location"));
    }
    if payload.description.trim().is_empty() {
        return Ok(ResponseBuilder::missing_field("description"));
    }
    let Some(species) = payload.species else {
        return Ok(ResponseBuilder::missing_field("species"));
    };
    let Some(size) = payload.size else {
        return Ok(ResponseBuilder::missing_field("size"));
    };
    if payload.photos.iter().all(|url| url.trim().is_empty()) {
        return Ok(ResponseBuilder::validation("At least one photo is required"));
    }

    let pet = NewPet {
        publisher_id: user.id,
        name: payload.name.trim().to_string(),
        species,
        breed: payload.breed,
        age_years: payload.age_years,
        age_months: payload.age_months,
        gender: payload.gender,
        size,
        location: payload.location.trim().to_string(),
        description: payload.description.trim().to_string(),
        health_status: payload.health_status,
        vaccination_status: payload.vaccination_status,
        adoption_requirements: payload.adoption_requirements,
        photos: payload.photos,
    };

    match store.insert_pet(&pet).await {
        Ok(created) => {
            info!("User {} published pet listing {}", user.id, created.id);
            Ok(ResponseBuilder::created_json(&created))
        }
        Err(err) => {
            error!("Pet publication failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// List the signed-in user's own pet listings, whatever their status
///
/// # Errors
/// Never fails at the actix level
pub async fn my_pets(
    req: HttpRequest,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    match store.list_by_publisher(user.id).await {
        Ok(pets) => Ok(ResponseBuilder::ok_json(&pets)),
        Err(err) => {
            error!("Publisher listing query failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// Remove a pet listing; only its publisher may do so
///
/// # Errors
/// Never fails at the actix level
pub async fn delete_pet(
    req: HttpRequest,
    path: web::Path<Uuid>,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    match store.delete_pet(path.into_inner(), user.id).await {
        Ok(true) => Ok(HttpResponse::NoContent().finish()),
        // Either no such pet or someone else's; the distinction is not ours
        // to reveal
        Ok(false) => Ok(ResponseBuilder::not_found()),
        Err(err) => {
            error!("Pet deletion failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}
