//! Mock objects and fake implementations for testing
//!
//! In-memory stand-ins for the two external systems: a programmable identity
//! provider and a data store backed by hash maps. Both enforce the same
//! uniqueness rules as the real services so resolution and registration
//! logic can be exercised without a running platform.

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{
    AdoptionApplication, ApplicationStatus, Favorite, NewApplication, NewPet, NewProfile, Pet,
    PetStatus, ProfileUpdate, SuccessStory, UserProfile,
};
use crate::provider::{
    AuthSession, AuthUser, ContactChannel, IdentityProvider, ProviderError, SignUpMetadata,
    SignUpResult,
};
use crate::store::{
    ApplicationStore, FavoriteStore, OnConflict, PetFilter, PetStore, ProfileStore, StoreError,
    StoryStore, UNIQUE_VIOLATION,
};

// ===============================
// MOCK IDENTITY PROVIDER
// ===============================

#[derive(Clone)]
struct MockAccount {
    id: Uuid,
    email: Option<String>,
    phone: Option<String>,
    password: String,
    metadata: Value,
}

struct PendingCode {
    verifier: String,
    user_id: Uuid,
}

#[derive(Default)]
struct ProviderState {
    accounts: Vec<MockAccount>,
    access_tokens: HashMap<String, Uuid>,
    refresh_tokens: HashMap<String, Uuid>,
    auth_codes: HashMap<String, PendingCode>,
}

/// In-memory identity provider with the platform's account semantics:
/// one account per email, one per phone, auto-confirmed signups
#[derive(Default)]
pub struct MockIdentityProvider {
    state: Mutex<ProviderState>,
    token_counter: AtomicU64,
}

impl MockIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account directly, bypassing the signup flow
    pub fn seed_account(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        password: &str,
    ) -> Uuid {
        self.seed_account_with_metadata(email, phone, password, Value::Null)
    }

    /// Seed an account with provider metadata, as a federated login would
    /// have left it
    pub fn seed_account_with_metadata(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        password: &str,
        metadata: Value,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut state = self.state.lock().unwrap();
        state.accounts.push(MockAccount {
            id,
            email: email.map(ToString::to_string),
            phone: phone.map(ToString::to_string),
            password: password.to_string(),
            metadata,
        });
        id
    }

    /// Stage an authorization code the way the hosted OAuth flow would,
    /// bound to the PKCE verifier that must accompany the exchange
    pub fn issue_auth_code(&self, user_id: Uuid, code: &str, verifier: &str) {
        let mut state = self.state.lock().unwrap();
        state.auth_codes.insert(
            code.to_string(),
            PendingCode {
                verifier: verifier.to_string(),
                user_id,
            },
        );
    }

    fn next_token_pair(&self) -> (String, String) {
        let n = self.token_counter.fetch_add(1, Ordering::Relaxed);
        (format!("access-{n}"), format!("refresh-{n}"))
    }

    fn mint_session(&self, state: &mut ProviderState, user: AuthUser) -> AuthSession {
        let (access_token, refresh_token) = self.next_token_pair();
        state.access_tokens.insert(access_token.clone(), user.id);
        state.refresh_tokens.insert(refresh_token.clone(), user.id);
        AuthSession {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: 3600,
            refresh_token,
            user,
        }
    }

    fn matches_channel(account: &MockAccount, channel: &ContactChannel) -> bool {
        match channel {
            ContactChannel::Email(email) => account.email.as_deref() == Some(email.as_str()),
            ContactChannel::Phone(phone) => account.phone.as_deref() == Some(phone.as_str()),
        }
    }

    fn to_auth_user(account: &MockAccount) -> AuthUser {
        AuthUser {
            id: account.id,
            email: account.email.clone(),
            phone: account.phone.clone(),
            user_metadata: account.metadata.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in_with_password(
        &self,
        channel: &ContactChannel,
        password: &str,
    ) -> Result<AuthSession, ProviderError> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .accounts
            .iter()
            .find(|account| Self::matches_channel(account, channel) && account.password == password)
            .map(Self::to_auth_user)
            .ok_or(ProviderError::InvalidCredentials)?;
        Ok(self.mint_session(&mut state, user))
    }

    async fn sign_up(
        &self,
        channel: &ContactChannel,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SignUpResult, ProviderError> {
        let mut state = self.state.lock().unwrap();
        if state
            .accounts
            .iter()
            .any(|account| Self::matches_channel(account, channel))
        {
            return Err(ProviderError::Rejected("User already registered".to_string()));
        }

        let account = MockAccount {
            id: Uuid::new_v4(),
            email: match channel {
                ContactChannel::Email(email) => Some(email.clone()),
                ContactChannel::Phone(_) => None,
            },
            phone: match channel {
                ContactChannel::Phone(phone) => Some(phone.clone()),
                ContactChannel::Email(_) => None,
            },
            password: password.to_string(),
            metadata: serde_json::to_value(&metadata).unwrap_or(Value::Null),
        };
        let user = Self::to_auth_user(&account);
        state.accounts.push(account);

        // Auto-confirm is on, matching a locally hosted platform
        let session = self.mint_session(&mut state, user.clone());
        Ok(SignUpResult {
            user,
            session: Some(session),
        })
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, ProviderError> {
        let mut state = self.state.lock().unwrap();
        let pending = state
            .auth_codes
            .remove(code)
            .ok_or(ProviderError::SessionInvalid)?;
        if pending.verifier != code_verifier {
            return Err(ProviderError::SessionInvalid);
        }
        let user = state
            .accounts
            .iter()
            .find(|account| account.id == pending.user_id)
            .map(Self::to_auth_user)
            .ok_or(ProviderError::SessionInvalid)?;
        Ok(self.mint_session(&mut state, user))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, ProviderError> {
        let mut state = self.state.lock().unwrap();
        // Tokens rotate on refresh
        let user_id = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or(ProviderError::SessionInvalid)?;
        let user = state
            .accounts
            .iter()
            .find(|account| account.id == user_id)
            .map(Self::to_auth_user)
            .ok_or(ProviderError::SessionInvalid)?;
        Ok(self.mint_session(&mut state, user))
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError> {
        let state = self.state.lock().unwrap();
        let user_id = *state
            .access_tokens
            .get(access_token)
            .ok_or(ProviderError::SessionInvalid)?;
        state
            .accounts
            .iter()
            .find(|account| account.id == user_id)
            .map(Self::to_auth_user)
            .ok_or(ProviderError::SessionInvalid)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.access_tokens.remove(access_token);
        Ok(())
    }
}

// ===============================
// IN-MEMORY DATA STORE
// ===============================

#[derive(Default)]
struct StoreState {
    profiles: HashMap<Uuid, UserProfile>,
    pets: Vec<Pet>,
    applications: Vec<AdoptionApplication>,
    favorites: Vec<Favorite>,
    stories: Vec<SuccessStory>,
    fail_next_upsert: Option<(String, String)>,
    fail_next_username_lookup: bool,
}

/// In-memory data store enforcing the same constraints as the real one:
/// unique usernames, unique (pet, applicant) applications, idempotent
/// favorites
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next profile upsert fail with the given store error,
    /// simulating a constraint or permission failure after account creation
    pub fn fail_next_upsert(&self, code: &str, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.fail_next_upsert = Some((code.to_string(), message.to_string()));
    }

    /// Make the next username lookup fail, simulating a data API outage
    /// during identifier resolution
    pub fn fail_next_username_lookup(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_next_username_lookup = true;
    }

    /// Seed a profile row directly, bypassing the upsert path
    pub fn seed_profile(&self, profile: UserProfile) {
        let mut state = self.state.lock().unwrap();
        state.profiles.insert(profile.id, profile);
    }

    /// Seed a pet row directly with full control over status and timestamps
    pub fn seed_pet(&self, pet: Pet) {
        let mut state = self.state.lock().unwrap();
        state.pets.push(pet);
    }

    /// Seed a success story directly; stories have no write operation
    pub fn seed_story(&self, story: SuccessStory) {
        let mut state = self.state.lock().unwrap();
        state.stories.push(story);
    }

    /// Number of profile rows carrying this username
    #[must_use]
    pub fn profiles_with_username(&self, username: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .profiles
            .values()
            .filter(|profile| profile.username.as_deref() == Some(username))
            .count()
    }

    fn username_conflicts(state: &StoreState, profile: &NewProfile) -> bool {
        profile.username.as_deref().is_some_and(|name| {
            state
                .profiles
                .values()
                .any(|row| row.id != profile.id && row.username.as_deref() == Some(name))
        })
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_username_lookup {
            state.fail_next_username_lookup = false;
            return Err(StoreError::Api {
                code: "57014".to_string(),
                message: "canceling statement due to statement timeout".to_string(),
            });
        }
        Ok(state
            .profiles
            .values()
            .find(|profile| profile.username.as_deref() == Some(username))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.profiles.get(&id).cloned())
    }

    async fn upsert_profile(
        &self,
        profile: &NewProfile,
        on_conflict: OnConflict,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();

        if let Some((code, message)) = state.fail_next_upsert.take() {
            return Err(StoreError::Api { code, message });
        }

        if Self::username_conflicts(&state, profile) {
            return Err(StoreError::Api {
                code: UNIQUE_VIOLATION.to_string(),
                message: "duplicate key value violates unique constraint \"users_username_key\""
                    .to_string(),
            });
        }

        match state.profiles.entry(profile.id) {
            std::collections::hash_map::Entry::Occupied(mut entry) => match on_conflict {
                OnConflict::Ignore => {}
                OnConflict::Merge => {
                    // Merge overwrites exactly the columns the wire payload
                    // carries: email always (explicit null included), the
                    // skip-if-absent fields only when present
                    let row = entry.get_mut();
                    if let Some(username) = &profile.username {
                        row.username = Some(username.clone());
                    }
                    row.email = profile.email.clone();
                    if let Some(display_name) = &profile.display_name {
                        row.display_name = Some(display_name.clone());
                    }
                    if let Some(avatar_url) = &profile.avatar_url {
                        row.avatar_url = Some(avatar_url.clone());
                    }
                    row.role = profile.role;
                    row.updated_at = Utc::now();
                }
            },
            std::collections::hash_map::Entry::Vacant(entry) => {
                let now = Utc::now();
                entry.insert(UserProfile {
                    id: profile.id,
                    username: profile.username.clone(),
                    email: profile.email.clone(),
                    display_name: profile.display_name.clone(),
                    avatar_url: profile.avatar_url.clone(),
                    bio: None,
                    location: None,
                    phone: None,
                    role: profile.role,
                    created_at: now,
                    updated_at: now,
                });
            }
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, StoreError> {
        let mut state = self.state.lock().unwrap();
        let row = state.profiles.get_mut(&id).ok_or(StoreError::MissingRow)?;

        if let Some(display_name) = &update.display_name {
            row.display_name = Some(display_name.clone());
        }
        if let Some(bio) = &update.bio {
            row.bio = Some(bio.clone());
        }
        if let Some(location) = &update.location {
            row.location = Some(location.clone());
        }
        if let Some(phone) = &update.phone {
            row.phone = Some(phone.clone());
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl PetStore for MemoryStore {
    async fn list_pets(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut pets: Vec<Pet> = state
            .pets
            .iter()
            .filter(|pet| matches_filter(pet, filter))
            .cloned()
            .collect();
        pets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pets)
    }

    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.pets.iter().find(|pet| pet.id == id).cloned())
    }

    async fn list_by_publisher(&self, publisher_id: Uuid) -> Result<Vec<Pet>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut pets: Vec<Pet> = state
            .pets
            .iter()
            .filter(|pet| pet.publisher_id == publisher_id)
            .cloned()
            .collect();
        pets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pets)
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let row = Pet {
            id: Uuid::new_v4(),
            publisher_id: pet.publisher_id,
            name: pet.name.clone(),
            species: pet.species,
            breed: pet.breed.clone(),
            age_years: pet.age_years,
            age_months: pet.age_months,
            gender: pet.gender,
            size: pet.size,
            location: pet.location.clone(),
            description: pet.description.clone(),
            health_status: pet.health_status.clone(),
            vaccination_status: pet.vaccination_status.clone(),
            adoption_requirements: pet.adoption_requirements.clone(),
            status: PetStatus::Available,
            photos: pet.photos.clone(),
            created_at: now,
            updated_at: now,
        };
        state.pets.push(row.clone());
        Ok(row)
    }

    async fn delete_pet(&self, id: Uuid, publisher_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.pets.len();
        state
            .pets
            .retain(|pet| !(pet.id == id && pet.publisher_id == publisher_id));
        Ok(state.pets.len() < before)
    }
}

fn matches_filter(pet: &Pet, filter: &PetFilter) -> bool {
    if filter.status.is_some_and(|status| pet.status != status) {
        return false;
    }
    if filter.species.is_some_and(|species| pet.species != species) {
        return false;
    }
    if filter.gender.is_some_and(|gender| pet.gender != gender) {
        return false;
    }
    if filter.size.is_some_and(|size| pet.size != size) {
        return false;
    }
    if let Some(location) = &filter.location {
        if !pet
            .location
            .to_lowercase()
            .contains(&location.to_lowercase())
        {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let breed = pet.breed.as_deref().unwrap_or_default().to_lowercase();
        if !pet.name.to_lowercase().contains(&needle)
            && !breed.contains(&needle)
            && !pet.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if filter.min_age_years.is_some_and(|min| pet.age_years < min) {
        return false;
    }
    if filter.max_age_years.is_some_and(|max| pet.age_years > max) {
        return false;
    }
    true
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert_application(
        &self,
        application: &NewApplication,
    ) -> Result<AdoptionApplication, StoreError> {
        let mut state = self.state.lock().unwrap();
        let duplicate = state.applications.iter().any(|row| {
            row.pet_id == application.pet_id && row.applicant_id == application.applicant_id
        });
        if duplicate {
            return Err(StoreError::Api {
                code: UNIQUE_VIOLATION.to_string(),
                message:
                    "duplicate key value violates unique constraint \"adoption_applications_pet_id_applicant_id_key\""
                        .to_string(),
            });
        }

        let row = AdoptionApplication {
            id: Uuid::new_v4(),
            pet_id: application.pet_id,
            applicant_id: application.applicant_id,
            status: ApplicationStatus::Pending,
            living_situation: application.living_situation.clone(),
            has_other_pets: application.has_other_pets,
            other_pets_details: application.other_pets_details.clone(),
            experience_with_pets: application.experience_with_pets.clone(),
            why_adopt: application.why_adopt.clone(),
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewer_notes: None,
        };
        state.applications.push(row.clone());
        Ok(row)
    }

    async fn list_by_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<AdoptionApplication>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut applications: Vec<AdoptionApplication> = state
            .applications
            .iter()
            .filter(|row| row.applicant_id == applicant_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(applications)
    }

    async fn find_application(
        &self,
        pet_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<AdoptionApplication>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .applications
            .iter()
            .find(|row| row.pet_id == pet_id && row.applicant_id == applicant_id)
            .cloned())
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn add_favorite(&self, user_id: Uuid, pet_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let exists = state
            .favorites
            .iter()
            .any(|row| row.user_id == user_id && row.pet_id == pet_id);
        if !exists {
            state.favorites.push(Favorite {
                id: Uuid::new_v4(),
                user_id,
                pet_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, pet_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.favorites.len();
        state
            .favorites
            .retain(|row| !(row.user_id == user_id && row.pet_id == pet_id));
        Ok(state.favorites.len() < before)
    }

    async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<Favorite>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut favorites: Vec<Favorite> = state
            .favorites
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(favorites)
    }
}

#[async_trait]
impl StoryStore for MemoryStore {
    async fn list_published_stories(&self) -> Result<Vec<SuccessStory>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut stories: Vec<SuccessStory> = state
            .stories
            .iter()
            .filter(|story| story.is_published)
            .cloned()
            .collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        stories.truncate(20);
        Ok(stories)
    }
}
