use once_cell::sync::Lazy;
use regex::Regex;

// Shape check only: one non-whitespace local part, an @, and a dotted domain.
// Deliverability is the auth platform's problem, not ours.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

// Mainland mobile numbers: exactly 11 digits, leading 1, second digit 3-9
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").unwrap());

/// What a visitor-supplied sign-in identifier looks like
///
/// The email and phone shapes are disjoint (an email needs an `@`, a phone
/// is all digits), so anything matching neither is treated as a username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Email,
    Phone,
    Username,
}

/// Check whether an identifier is shaped like an email address
#[must_use]
pub fn is_email_shaped(identifier: &str) -> bool {
    EMAIL_PATTERN.is_match(identifier)
}

/// Check whether an identifier is shaped like a mobile number
#[must_use]
pub fn is_phone_shaped(identifier: &str) -> bool {
    PHONE_PATTERN.is_match(identifier)
}

/// Classify a raw identifier by shape
#[must_use]
pub fn classify(identifier: &str) -> IdentifierKind {
    if is_email_shaped(identifier) {
        IdentifierKind::Email
    } else if is_phone_shaped(identifier) {
        IdentifierKind::Phone
    } else {
        IdentifierKind::Username
    }
}
