//! HTTP implementation of the store traits against a `PostgREST`-compatible
//! data API
//!
//! All table access goes through `{base_url}/rest/v1/{table}` using the
//! service key, so row ownership is enforced in the handlers rather than by
//! per-request row level security.

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{
    ApplicationStore, FavoriteStore, OnConflict, PetFilter, PetStore, ProfileStore, StoreError,
    StoryStore,
};
use crate::models::{
    AdoptionApplication, Favorite, NewApplication, NewPet, NewProfile, Pet, ProfileUpdate,
    SuccessStory, UserProfile,
};
use crate::settings::PawnestSettings;

/// Data store client speaking the `PostgREST` wire protocol
pub struct PostgrestStore {
    http_client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl PostgrestStore {
    /// Create a store for the given platform endpoint
    #[must_use]
    pub fn new(base_url: &str, service_key: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }

    /// Build a store from loaded settings
    ///
    /// # Errors
    ///
    /// Returns an error if no service key is configured
    pub fn from_settings(settings: &PawnestSettings) -> Result<Self, StoreError> {
        let service_key = settings.platform.get_service_key().ok_or_else(|| {
            StoreError::Configuration("platform service key is not set".to_string())
        })?;
        Ok(Self::new(&settings.platform.base_url, service_key))
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.rest_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Turn a failed response into a [`StoreError`]
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        Err(parse_store_error(status, &text))
    }
}

#[async_trait]
impl ProfileStore for PostgrestStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let username_filter = format!("eq.{username}");
        let response = self
            .request(Method::GET, "users")
            .query(&[
                ("select", "*"),
                ("username", username_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let rows: Vec<UserProfile> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let id_filter = format!("eq.{id}");
        let response = self
            .request(Method::GET, "users")
            .query(&[("select", "*"), ("id", id_filter.as_str()), ("limit", "1")])
            .send()
            .await?;

        let rows: Vec<UserProfile> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(
        &self,
        profile: &NewProfile,
        on_conflict: OnConflict,
    ) -> Result<(), StoreError> {
        debug!("Upserting profile for account {}", profile.id);

        let response = self
            .request(Method::POST, "users")
            .query(&[("on_conflict", "id")])
            .header("Prefer", on_conflict.prefer())
            .json(profile)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, StoreError> {
        let id_filter = format!("eq.{id}");
        let response = self
            .request(Method::PATCH, "users")
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await?;

        let rows: Vec<UserProfile> = Self::check(response).await?.json().await?;
        rows.into_iter().next().ok_or(StoreError::MissingRow)
    }
}

#[async_trait]
impl PetStore for PostgrestStore {
    async fn list_pets(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError> {
        let response = self
            .request(Method::GET, "pets")
            .query(&pet_filter_params(filter))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, StoreError> {
        let id_filter = format!("eq.{id}");
        let response = self
            .request(Method::GET, "pets")
            .query(&[("select", "*"), ("id", id_filter.as_str()), ("limit", "1")])
            .send()
            .await?;

        let rows: Vec<Pet> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn list_by_publisher(&self, publisher_id: Uuid) -> Result<Vec<Pet>, StoreError> {
        let publisher_filter = format!("eq.{publisher_id}");
        let response = self
            .request(Method::GET, "pets")
            .query(&[
                ("select", "*"),
                ("publisher_id", publisher_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError> {
        debug!("Publishing pet listing for {}", pet.publisher_id);

        let response = self
            .request(Method::POST, "pets")
            .header("Prefer", "return=representation")
            .json(pet)
            .send()
            .await?;

        let rows: Vec<Pet> = Self::check(response).await?.json().await?;
        rows.into_iter().next().ok_or(StoreError::MissingRow)
    }

    async fn delete_pet(&self, id: Uuid, publisher_id: Uuid) -> Result<bool, StoreError> {
        let id_filter = format!("eq.{id}");
        let publisher_filter = format!("eq.{publisher_id}");
        let response = self
            .request(Method::DELETE, "pets")
            .query(&[
                ("id", id_filter.as_str()),
                ("publisher_id", publisher_filter.as_str()),
            ])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let rows: Vec<Pet> = Self::check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl ApplicationStore for PostgrestStore {
    async fn insert_application(
        &self,
        application: &NewApplication,
    ) -> Result<AdoptionApplication, StoreError> {
        debug!(
            "Submitting adoption application for pet {}",
            application.pet_id
        );

        let response = self
            .request(Method::POST, "adoption_applications")
            .header("Prefer", "return=representation")
            .json(application)
            .send()
            .await?;

        let rows: Vec<AdoptionApplication> = Self::check(response).await?.json().await?;
        rows.into_iter().next().ok_or(StoreError::MissingRow)
    }

    async fn list_by_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<AdoptionApplication>, StoreError> {
        let applicant_filter = format!("eq.{applicant_id}");
        let response = self
            .request(Method::GET, "adoption_applications")
            .query(&[
                ("select", "*"),
                ("applicant_id", applicant_filter.as_str()),
                ("order", "submitted_at.desc"),
            ])
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn find_application(
        &self,
        pet_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<AdoptionApplication>, StoreError> {
        let pet_filter = format!("eq.{pet_id}");
        let applicant_filter = format!("eq.{applicant_id}");
        let response = self
            .request(Method::GET, "adoption_applications")
            .query(&[
                ("select", "*"),
                ("pet_id", pet_filter.as_str()),
                ("applicant_id", applicant_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let rows: Vec<AdoptionApplication> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl FavoriteStore for PostgrestStore {
    async fn add_favorite(&self, user_id: Uuid, pet_id: Uuid) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, "favorites")
            .query(&[("on_conflict", "user_id,pet_id")])
            .header("Prefer", OnConflict::Ignore.prefer())
            .json(&json!({ "user_id": user_id, "pet_id": pet_id }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, pet_id: Uuid) -> Result<bool, StoreError> {
        let user_filter = format!("eq.{user_id}");
        let pet_filter = format!("eq.{pet_id}");
        let response = self
            .request(Method::DELETE, "favorites")
            .query(&[
                ("user_id", user_filter.as_str()),
                ("pet_id", pet_filter.as_str()),
            ])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let rows: Vec<Favorite> = Self::check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<Favorite>, StoreError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .request(Method::GET, "favorites")
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl StoryStore for PostgrestStore {
    async fn list_published_stories(&self) -> Result<Vec<SuccessStory>, StoreError> {
        let response = self
            .request(Method::GET, "success_stories")
            .query(&[
                ("select", "*"),
                ("is_published", "eq.true"),
                ("order", "created_at.desc"),
                ("limit", "20"),
            ])
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

/// Query parameters for the pet listing index
fn pet_filter_params(filter: &PetFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", "*".to_string()),
        ("order", "created_at.desc".to_string()),
    ];
    if let Some(species) = filter.species {
        params.push(("species", format!("eq.{}", species.as_str())));
    }
    if let Some(gender) = filter.gender {
        params.push(("gender", format!("eq.{}", gender.as_str())));
    }
    if let Some(status) = filter.status {
        params.push(("status", format!("eq.{}", status.as_str())));
    }
    if let Some(size) = filter.size {
        params.push(("size", format!("eq.{}", size.as_str())));
    }
    if let Some(location) = &filter.location {
        params.push(("location", format!("ilike.*{location}*")));
    }
    if let Some(search) = &filter.search {
        params.push((
            "or",
            format!("(name.ilike.*{search}*,breed.ilike.*{search}*,description.ilike.*{search}*)"),
        ));
    }
    if let Some(min_age) = filter.min_age_years {
        params.push(("age_years", format!("gte.{min_age}")));
    }
    if let Some(max_age) = filter.max_age_years {
        params.push(("age_years", format!("lte.{max_age}")));
    }
    params
}

/// Error payload shape served by the data API
#[derive(Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Decode a failed data API response
fn parse_store_error(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(payload) => {
            let code = payload.code.unwrap_or_else(|| status.to_string());
            let mut message = payload
                .message
                .unwrap_or_else(|| "no error message".to_string());
            if let Some(details) = payload.details {
                message = format!("{message} ({details})");
            }
            StoreError::Api { code, message }
        }
        Err(_) => StoreError::Api {
            code: status.to_string(),
            message: if body.is_empty() {
                "no response body".to_string()
            } else {
                body.to_string()
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PetSpecies, PetStatus};

    #[test]
    fn test_pet_filter_params_defaults() {
        let params = pet_filter_params(&PetFilter::default());
        assert_eq!(
            params,
            vec![
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_pet_filter_params_full() {
        let filter = PetFilter {
            species: Some(PetSpecies::Cat),
            gender: None,
            status: Some(PetStatus::Available),
            size: None,
            location: Some("Beijing".to_string()),
            search: Some("tabby".to_string()),
            min_age_years: Some(1),
            max_age_years: Some(5),
        };

        let params = pet_filter_params(&filter);
        assert!(params.contains(&("species", "eq.cat".to_string())));
        assert!(params.contains(&("status", "eq.available".to_string())));
        assert!(params.contains(&("location", "ilike.*Beijing*".to_string())));
        assert!(params.contains(&(
            "or",
            "(name.ilike.*tabby*,breed.ilike.*tabby*,description.ilike.*tabby*)".to_string()
        )));
        assert!(params.contains(&("age_years", "gte.1".to_string())));
        assert!(params.contains(&("age_years", "lte.5".to_string())));
        assert!(!params.iter().any(|(key, _)| *key == "size"));
        assert!(!params.iter().any(|(key, _)| *key == "gender"));
    }

    #[test]
    fn test_store_error_decoding() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"users_username_key\"","details":"Key (username)=(amy) already exists.","hint":null}"#;
        let error = parse_store_error(409, body);
        assert!(error.is_unique_violation());
        match error {
            StoreError::Api { code, message } => {
                assert_eq!(code, "23505");
                assert!(message.contains("already exists"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_store_error_unparseable_body() {
        let error = parse_store_error(502, "bad gateway");
        match error {
            StoreError::Api { code, message } => {
                assert_eq!(code, "502");
                assert_eq!(message, "bad gateway");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
