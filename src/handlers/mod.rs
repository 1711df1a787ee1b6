// HTTP request handlers for the adoption marketplace API
pub mod applications;
pub mod auth;
pub mod callback;
pub mod favorites;
pub mod health;
pub mod helpers;
pub mod pets;
pub mod profile;
pub mod stories;

// Re-export the main handler functions
pub use applications::{apply_for_pet, my_applications};
pub use auth::{login, oauth_start, refresh, sign_out, signup, signup_username};
pub use callback::oauth_callback;
pub use favorites::{add_favorite, my_favorites, remove_favorite};
pub use health::health;
pub use pets::{delete_pet, get_pet, list_pets, my_pets, publish_pet};
pub use profile::{my_profile, update_my_profile};
pub use stories::list_stories;
