//! Test fixtures providing pre-built test objects
//!
//! Commonly used test data as static fixtures, so individual tests do not
//! rebuild the same sessions, pets, and settings by hand.

use actix_web::cookie::Cookie;
use actix_web::{test, HttpRequest};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::models::{
    NewApplication, NewPet, Pet, PetGender, PetSize, PetSpecies, PetStatus, SuccessStory,
    UserProfile, UserRole,
};
use crate::provider::{AuthSession, AuthUser};
use crate::settings::PawnestSettings;

use super::constants::TEST_EMAIL;

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Create a standard provider session for testing
    #[must_use]
    pub fn session() -> AuthSession {
        Self::session_for_user(Self::auth_user())
    }

    /// Create a session wrapping a specific provider user
    #[must_use]
    pub fn session_for_user(user: AuthUser) -> AuthSession {
        AuthSession {
            access_token: "test_access_token".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            refresh_token: "test_refresh_token".to_string(),
            user,
        }
    }

    /// Create a provider user with populated metadata
    #[must_use]
    pub fn auth_user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: Some(TEST_EMAIL.to_string()),
            phone: None,
            user_metadata: json!({
                "full_name": "Amy Adams",
                "avatar_url": "https://cdn.example.com/amy.png"
            }),
        }
    }

    /// Create a profile row as the store would return it
    #[must_use]
    pub fn profile(id: Uuid) -> UserProfile {
        UserProfile {
            id,
            username: Some("amy".to_string()),
            email: Some(TEST_EMAIL.to_string()),
            display_name: Some("Amy Adams".to_string()),
            avatar_url: None,
            bio: None,
            location: Some("Portland, OR".to_string()),
            phone: None,
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Create a complete listing submission for a publisher
    #[must_use]
    pub fn new_pet(publisher_id: Uuid) -> NewPet {
        NewPet {
            publisher_id,
            name: "Biscuit".to_string(),
            species: PetSpecies::Dog,
            breed: Some("Corgi".to_string()),
            age_years: 2,
            age_months: 3,
            gender: PetGender::Male,
            size: PetSize::Small,
            location: "Portland, OR".to_string(),
            description: "Friendly corgi who loves people".to_string(),
            health_status: Some("Healthy".to_string()),
            vaccination_status: Some("Up to date".to_string()),
            adoption_requirements: None,
            photos: vec!["https://cdn.example.com/biscuit.jpg".to_string()],
        }
    }

    /// Create a pet row as the store would return it
    #[must_use]
    pub fn pet(publisher_id: Uuid) -> Pet {
        let submission = Self::new_pet(publisher_id);
        Pet {
            id: Uuid::new_v4(),
            publisher_id: submission.publisher_id,
            name: submission.name,
            species: submission.species,
            breed: submission.breed,
            age_years: submission.age_years,
            age_months: submission.age_months,
            gender: submission.gender,
            size: submission.size,
            location: submission.location,
            description: submission.description,
            health_status: submission.health_status,
            vaccination_status: submission.vaccination_status,
            adoption_requirements: submission.adoption_requirements,
            status: PetStatus::Available,
            photos: submission.photos,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Create a complete adoption application submission
    #[must_use]
    pub fn new_application(pet_id: Uuid, applicant_id: Uuid) -> NewApplication {
        NewApplication {
            pet_id,
            applicant_id,
            living_situation: "House with fenced yard".to_string(),
            has_other_pets: false,
            other_pets_details: None,
            experience_with_pets: "Grew up with dogs".to_string(),
            why_adopt: "Looking for a companion".to_string(),
        }
    }

    /// Create a published success story
    #[must_use]
    pub fn story(pet_id: Uuid, adopter_id: Uuid) -> SuccessStory {
        SuccessStory {
            id: Uuid::new_v4(),
            pet_id,
            adopter_id,
            title: "Biscuit found his home".to_string(),
            story: "Six months in and he owns the couch.".to_string(),
            photos: Vec::new(),
            is_published: true,
            created_at: Utc::now(),
        }
    }

    /// Create standard test settings
    #[must_use]
    pub fn settings() -> PawnestSettings {
        let mut settings = PawnestSettings::default();
        settings.application.redirect_base_url = "http://localhost:8080".to_string();
        settings.platform.anon_key = Some("test-anon-key".to_string());
        settings.platform.service_key = Some("test-service-key".to_string());
        settings.cookies.secure = false;
        settings
    }

    /// Create an HTTP request with a cookie
    #[must_use]
    pub fn request_with_cookie(cookie: Cookie) -> HttpRequest {
        test::TestRequest::default()
            .cookie(cookie)
            .to_http_request()
    }
}
