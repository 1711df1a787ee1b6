//! Post-authentication return path validation
//!
//! `redirect_to` / `next` values come straight from the browser, so they are
//! open-redirect input. Policy: only relative paths inside this site are
//! honored; anything else falls back to [`DEFAULT_RETURN_PATH`].

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

/// Where authenticated visitors land when no usable return path was given
pub const DEFAULT_RETURN_PATH: &str = "/dashboard";

/// Longest return path accepted before falling back
const MAX_RETURN_PATH_LENGTH: usize = 2048;

// Core path traversal pattern, the most common and critical attack
static PATH_TRAVERSAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.\.").unwrap());

// Control characters, encoded line breaks, backslashes, and invisible
// Unicode separators that have no business in a site-local path
static SUSPICIOUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\x00-\x1F\x7F-\x9F]|%(?:00|0[aAdD]|09|5c)|\\|[\u{200E}\u{200F}\u{2060}-\u{2064}\u{2000}-\u{200A}]").unwrap()
});

/// Resolve a browser-supplied return path to something safe to redirect to
///
/// Accepts only relative paths that survive the layered checks; everything
/// else (absolute URLs, traversal, encoded attacks, missing input) resolves
/// to [`DEFAULT_RETURN_PATH`].
#[must_use]
pub fn sanitize_return_path(candidate: Option<&str>) -> String {
    match candidate {
        Some(path) if is_safe_return_path(path) => path.to_string(),
        Some(path) if !path.is_empty() => {
            warn!("Rejected unsafe return path, using default: {path}");
            DEFAULT_RETURN_PATH.to_string()
        }
        _ => DEFAULT_RETURN_PATH.to_string(),
    }
}

/// Check if a path is relative (starts with /, not //, and has no scheme)
fn is_relative_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains(':')
}

fn is_safe_return_path(path: &str) -> bool {
    if !is_relative_path(path) || path.len() > MAX_RETURN_PATH_LENGTH {
        return false;
    }

    // Check decoded variants too so single- and double-encoded attacks
    // cannot slip through the raw-string checks
    for variant in decoded_variants(path) {
        if PATH_TRAVERSAL_PATTERN.is_match(&variant) || SUSPICIOUS_PATTERN.is_match(&variant) {
            return false;
        }
        let lowered = variant.to_lowercase();
        if contains_dangerous_protocol(&lowered) {
            return false;
        }
        // Double // after decoding means an encoded protocol-relative URL
        if variant.starts_with("//") {
            return false;
        }
    }

    true
}

/// The path itself plus its single- and double-decoded forms
fn decoded_variants(path: &str) -> Vec<String> {
    let mut variants = Vec::with_capacity(3);
    variants.push(path.to_string());

    if let Ok(decoded) = urlencoding::decode(path) {
        let decoded = decoded.into_owned();
        if decoded != path {
            variants.push(decoded.clone());

            if let Ok(double_decoded) = urlencoding::decode(&decoded) {
                let double_decoded = double_decoded.into_owned();
                if double_decoded != decoded {
                    variants.push(double_decoded);
                }
            }
        }
    }

    variants
}

fn contains_dangerous_protocol(text: &str) -> bool {
    const DANGEROUS_PROTOCOLS: &[&str] = &["javascript:", "vbscript:", "data:", "file:", "ftp:"];

    DANGEROUS_PROTOCOLS
        .iter()
        .any(|protocol| text.contains(protocol))
}

#[cfg(test)]
mod tests {
    use super::{sanitize_return_path, DEFAULT_RETURN_PATH};

    #[test]
    fn test_legitimate_return_paths_pass_through() {
        let legitimate = vec![
            "/dashboard",
            "/pets/123",
            "/my/applications",
            "/search?species=dog",
            "/profile?tab=settings",
            "/",
        ];

        for path in legitimate {
            assert_eq!(
                sanitize_return_path(Some(path)),
                path,
                "legitimate path should be kept: {path}"
            );
        }
    }

    #[test]
    fn test_missing_or_empty_input_uses_default() {
        assert_eq!(sanitize_return_path(None), DEFAULT_RETURN_PATH);
        assert_eq!(sanitize_return_path(Some("")), DEFAULT_RETURN_PATH);
    }

    #[test]
    fn test_absolute_urls_fall_back() {
        let absolute = vec![
            "https://evil.com/dashboard",
            "http://evil.com",
            "//evil.com",
            "///evil.com",
            "http:/evil.com",
        ];

        for path in absolute {
            assert_eq!(
                sanitize_return_path(Some(path)),
                DEFAULT_RETURN_PATH,
                "absolute URL should fall back: {path}"
            );
        }
    }

    #[test]
    fn test_traversal_and_encoded_attacks_fall_back() {
        let attacks = vec![
            "/api/../../../etc/passwd",
            "/..%2F..%2Fetc%2Fpasswd",
            "/%252e%252e%252fetc%252fpasswd",
            "/path%00/file",
            "/path%0aheader-injection",
            "/path\\windows",
            "/%2F%2Fevil.com",
        ];

        for path in attacks {
            assert_eq!(
                sanitize_return_path(Some(path)),
                DEFAULT_RETURN_PATH,
                "attack path should fall back: {path}"
            );
        }
    }

    #[test]
    fn test_dangerous_protocols_fall_back() {
        let attacks = vec![
            "javascript:alert(1)",
            "JavaScript:alert(1)",
            "data:text/html,<script>alert(1)</script>",
            "vbscript:msgbox(1)",
        ];

        for path in attacks {
            assert_eq!(
                sanitize_return_path(Some(path)),
                DEFAULT_RETURN_PATH,
                "dangerous protocol should fall back: {path}"
            );
        }
    }

    #[test]
    fn test_overlong_path_falls_back() {
        let long_path = format!("/pets/{}", "a".repeat(2048));
        assert_eq!(sanitize_return_path(Some(&long_path)), DEFAULT_RETURN_PATH);
    }

    #[test]
    fn test_unicode_separator_attacks_fall_back() {
        let attacks = vec![
            "/pets/\u{200E}evil.com\u{200F}/data",
            "/path\u{2060}with\u{2062}invisible",
            "/pets\u{2000}spaced",
        ];

        for path in attacks {
            assert_eq!(
                sanitize_return_path(Some(path)),
                DEFAULT_RETURN_PATH,
                "unicode attack should fall back: {path}"
            );
        }
    }
}
