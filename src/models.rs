use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Role assigned to a marketplace account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Publisher,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetSpecies {
    Dog,
    Cat,
    Rabbit,
    Bird,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetGender {
    Male,
    Female,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetSize {
    Small,
    Medium,
    Large,
}

/// Listing lifecycle for a pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    #[default]
    Available,
    Pending,
    Adopted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Withdrawn,
}

impl PetSpecies {
    /// Wire representation used in REST filter expressions
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Rabbit => "rabbit",
            Self::Bird => "bird",
            Self::Other => "other",
        }
    }
}

impl PetGender {
    /// Wire representation used in REST filter expressions
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

impl PetSize {
    /// Wire representation used in REST filter expressions
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl PetStatus {
    /// Wire representation used in REST filter expressions
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Adopted => "adopted",
        }
    }
}

/// Profile row in the `users` table
///
/// Profiles shadow accounts held by the auth platform: `id` equals the
/// platform account id, while `username` and `email` back the
/// username-to-email sign-in lookup. Phone-based accounts carry no email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write payload for creating or completing a profile row
///
/// `email` serializes even when `None` so that phone-based registrations
/// store an explicit null, keeping the username lookup honest about which
/// accounts have a real address.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

/// Partial update for the caller's own profile
///
/// Deliberately narrower than the row: only the fields a visitor may edit
/// about themselves. Identity fields (username, email, role) never travel
/// through this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Pet listing row in the `pets` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    pub publisher_id: Uuid,
    pub name: String,
    pub species: PetSpecies,
    pub breed: Option<String>,
    pub age_years: i32,
    pub age_months: i32,
    pub gender: PetGender,
    pub size: PetSize,
    pub location: String,
    pub description: String,
    pub health_status: Option<String>,
    pub vaccination_status: Option<String>,
    pub adoption_requirements: Option<String>,
    pub status: PetStatus,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write payload for publishing a pet listing
///
/// `status` is omitted so the data store applies its `available` default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPet {
    pub publisher_id: Uuid,
    pub name: String,
    pub species: PetSpecies,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    pub age_years: i32,
    pub age_months: i32,
    pub gender: PetGender,
    pub size: PetSize,
    pub location: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccination_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adoption_requirements: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Adoption application row in the `adoption_applications` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionApplication {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub living_situation: String,
    pub has_other_pets: bool,
    pub other_pets_details: Option<String>,
    pub experience_with_pets: String,
    pub why_adopt: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_notes: Option<String>,
}

/// Write payload for submitting an adoption application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
    pub pet_id: Uuid,
    pub applicant_id: Uuid,
    pub living_situation: String,
    pub has_other_pets: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_pets_details: Option<String>,
    pub experience_with_pets: String,
    pub why_adopt: String,
}

/// Favorite row in the `favorites` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pet_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Published adoption story in the `success_stories` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessStory {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub adopter_id: Uuid,
    pub title: String,
    pub story: String,
    pub photos: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
