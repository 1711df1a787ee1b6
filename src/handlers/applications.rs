// Adoption application handlers
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{error, info};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::NewApplication;
use crate::provider::IdentityProvider;
use crate::store::{ApplicationStore, DataStore, PetStore};
use crate::utils::responses::ResponseBuilder;

use super::helpers::require_user;

const ALREADY_APPLIED_MESSAGE: &str = "You have already applied to adopt this pet";

#[derive(Deserialize)]
pub struct ApplicationRequest {
    #[serde(default)]
    pub living_situation: String,
    #[serde(default)]
    pub has_other_pets: bool,
    pub other_pets_details: Option<String>,
    #[serde(default)]
    pub experience_with_pets: String,
    #[serde(default)]
    pub why_adopt: String,
}

/// Apply to adopt a pet
///
/// One application per visitor per pet; publishers cannot apply to their
/// own listings.
///
/// # Errors
/// Never fails at the actix level
pub async fn apply_for_pet(
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<ApplicationRequest>,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let payload = body.into_inner();
    if payload.living_situation.trim().is_empty() {
        return Ok(ResponseBuilder::missing_field("living_situation"));
    }
    if payload.experience_with_pets.trim().is_empty() {
        return Ok(ResponseBuilder::missing_field("experience_with_pets"));
    }
    if payload.why_adopt.trim().is_empty() {
        return Ok(ResponseBuilder::missing_field("why_adopt"));
    }

    let pet_id = path.into_inner();
    let pet = match store.get_pet(pet_id).await {
        Ok(Some(pet)) => pet,
        Ok(None) => return Ok(ResponseBuilder::not_found()),
        Err(err) => {
            error!("Pet lookup for application failed: {err}");
            return Ok(ResponseBuilder::server_error());
        }
    };

    if pet.publisher_id == user.id {
        return Ok(ResponseBuilder::validation(
            "You cannot apply to adopt your own pet",
        ));
    }

    match store.find_application(pet_id, user.id).await {
        Ok(Some(_)) => return Ok(ResponseBuilder::conflict(ALREADY_APPLIED_MESSAGE)),
        Ok(None) => {}
        Err(err) => {
            error!("Duplicate application check failed: {err}");
            return Ok(ResponseBuilder::server_error());
        }
    }

    let application = NewApplication {
        pet_id,
        applicant_id: user.id,
        living_situation: payload.living_situation.trim().to_string(),
        has_other_pets: payload.has_other_pets,
        other_pets_details: payload.other_pets_details,
        experience_with_pets: payload.experience_with_pets.trim().to_string(),
        why_adopt: payload.why_adopt.trim().to_string(),
    };

    match store.insert_application(&application).await {
        Ok(created) => {
            info!(
                "User {} applied to adopt pet {} (application {})",
                user.id, pet_id, created.id
            );
            Ok(ResponseBuilder::created_json(&created))
        }
        // A concurrent submission can slip past the pre-check; the unique
        // index reports it the same way
        Err(err) if err.is_unique_violation() => {
            Ok(ResponseBuilder::conflict(ALREADY_APPLIED_MESSAGE))
        }
        Err(err) => {
            error!("Application submission failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}

/// List the signed-in user's adoption applications, newest first
///
/// # Errors
/// Never fails at the actix level
pub async fn my_applications(
    req: HttpRequest,
    provider: web::Data<dyn IdentityProvider>,
    store: web::Data<dyn DataStore>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, provider.get_ref()).await {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    match store.list_by_applicant(user.id).await {
        Ok(applications) => Ok(ResponseBuilder::ok_json(&applications)),
        Err(err) => {
            error!("Application listing query failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}
