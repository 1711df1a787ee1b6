//! Unified testing utilities for Pawnest
//!
//! This module consolidates all test helpers, fixtures, and doubles into a
//! single location so unit tests and integration tests share the same data.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built test data (sessions, users, pets, settings)
//! - [`mock`] - In-memory stand-ins for the identity provider and data store
//!
//! Compiled only for unit tests and behind the `testing` feature, which the
//! integration tests enable.

pub mod fixtures;
pub mod mock;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use mock::{MemoryStore, MockIdentityProvider};

/// Common test constants
pub mod constants {
    /// Default test email address
    pub const TEST_EMAIL: &str = "amy@example.com";

    /// Default test mobile number (valid `1[3-9]` shape)
    pub const TEST_PHONE: &str = "13812345678";

    /// Default test username
    pub const TEST_USERNAME: &str = "amy";

    /// Default test password
    pub const TEST_PASSWORD: &str = "secret1";
}
