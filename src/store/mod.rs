//! Data store abstraction over the platform's REST data API
//!
//! Profiles, pet listings, applications, favorites, and stories live in
//! platform tables. Handlers and the credential resolver depend on these
//! traits; the HTTP implementation lives in [`postgrest`], and test suites
//! swap in the in-memory store from the testing module.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AdoptionApplication, Favorite, NewApplication, NewPet, NewProfile, Pet, PetGender, PetSize,
    PetSpecies, PetStatus, ProfileUpdate, SuccessStory, UserProfile,
};

pub mod postgrest;

pub use postgrest::PostgrestStore;

/// Postgres error code for unique constraint violations
pub const UNIQUE_VIOLATION: &str = "23505";

/// Data store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data API rejected the request (constraint violation, bad filter)
    #[error("data api error {code}: {message}")]
    Api { code: String, message: String },

    /// Transport-level failure talking to the data API
    #[error("data api request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("unreadable data api response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A write expected the affected row back and got none
    #[error("data api returned no rows where one was expected")]
    MissingRow,

    /// The data API connection is not configured
    #[error("data store is not configured: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Whether this error is a unique constraint violation
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Api { code, .. } if code == UNIQUE_VIOLATION)
    }

    /// The data API error code, when one was reported
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Duplicate-key handling for profile upserts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Overwrite the conflicting row with the new payload
    Merge,
    /// Keep the existing row untouched
    Ignore,
}

impl OnConflict {
    /// `Prefer` header value understood by the data API
    #[must_use]
    pub const fn prefer(self) -> &'static str {
        match self {
            Self::Merge => "resolution=merge-duplicates",
            Self::Ignore => "resolution=ignore-duplicates",
        }
    }
}

/// Browse filters for the pet listing index
#[derive(Debug, Clone, Default)]
pub struct PetFilter {
    pub species: Option<PetSpecies>,
    pub gender: Option<PetGender>,
    pub status: Option<PetStatus>,
    pub size: Option<PetSize>,
    pub location: Option<String>,
    /// Free-text search across name, breed, and description
    pub search: Option<String>,
    pub min_age_years: Option<i32>,
    pub max_age_years: Option<i32>,
}

/// Profile rows in the `users` table
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a profile by its unique username
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Look up a profile by account id
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError>;

    /// Create or complete a profile row keyed on account id
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected; unique violations on
    /// secondary keys surface as [`StoreError::Api`] with code `23505`
    async fn upsert_profile(
        &self,
        profile: &NewProfile,
        on_conflict: OnConflict,
    ) -> Result<(), StoreError>;

    /// Apply a partial update to a profile and return the updated row
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected or the row does not exist
    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, StoreError>;
}

/// Pet listings in the `pets` table
#[async_trait]
pub trait PetStore: Send + Sync {
    /// Browse listings, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn list_pets(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError>;

    /// Fetch a single listing
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, StoreError>;

    /// All listings published by one account, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn list_by_publisher(&self, publisher_id: Uuid) -> Result<Vec<Pet>, StoreError>;

    /// Publish a new listing and return the stored row
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected
    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError>;

    /// Remove a listing, but only when owned by `publisher_id`
    ///
    /// Returns whether a row was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn delete_pet(&self, id: Uuid, publisher_id: Uuid) -> Result<bool, StoreError>;
}

/// Adoption applications in the `adoption_applications` table
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Submit an application and return the stored row
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected; a repeat application for
    /// the same pet surfaces as a unique violation
    async fn insert_application(
        &self,
        application: &NewApplication,
    ) -> Result<AdoptionApplication, StoreError>;

    /// An applicant's own applications, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn list_by_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<AdoptionApplication>, StoreError>;

    /// The existing application for a pet/applicant pair, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn find_application(
        &self,
        pet_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<AdoptionApplication>, StoreError>;
}

/// Favorites in the `favorites` table
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Mark a pet as a favorite; repeat marks are absorbed
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected
    async fn add_favorite(&self, user_id: Uuid, pet_id: Uuid) -> Result<(), StoreError>;

    /// Unmark a favorite; returns whether a row was removed
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn remove_favorite(&self, user_id: Uuid, pet_id: Uuid) -> Result<bool, StoreError>;

    /// A user's favorites, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<Favorite>, StoreError>;
}

/// Success stories in the `success_stories` table
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Published stories, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the data API cannot be reached or rejects the query
    async fn list_published_stories(&self) -> Result<Vec<SuccessStory>, StoreError>;
}

/// Everything the application needs from the data store
///
/// Blanket-implemented so any full store implementation can travel as a
/// single trait object.
pub trait DataStore:
    ProfileStore + PetStore + ApplicationStore + FavoriteStore + StoryStore
{
}

impl<T> DataStore for T where
    T: ProfileStore + PetStore + ApplicationStore + FavoriteStore + StoryStore
{
}
