#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the pawnest application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod auth;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod settings;
pub mod store;
pub mod utils;

// Test utilities (mock provider, in-memory store, fixtures) are compiled for
// unit tests and for integration suites that enable the `testing` feature.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use auth::{AuthService, IdentifierKind};
pub use models::{AdoptionApplication, Pet, SuccessStory, UserProfile};
pub use provider::{GoTrueProvider, IdentityProvider};
pub use settings::PawnestSettings;
pub use store::PostgrestStore;
