//! Request targets.

use url::Url;

use crate::error::{DomainError, DomainResult};

/// Builds the full target of a request by appending `path` to `base` as-is.
///
/// No slash handling is done: `"http://h/api" + "users"` is `http://h/apiusers`.
///
/// # Errors
///
/// Returns [`DomainError::InvalidUrl`] when the concatenation is not a URL.
pub fn resolve_target(base: &str, path: &str) -> DomainResult<Url> {
    let full = format!("{base}{path}");
    Url::parse(&full).map_err(|e| DomainError::InvalidUrl(format!("{e}: {full}")))
}

/// Parses a base address on its own, e.g. to look up cookies stored for it.
///
/// # Errors
///
/// Returns [`DomainError::InvalidUrl`] when `base` is not a URL.
pub fn parse_base(base: &str) -> DomainResult<Url> {
    Url::parse(base).map_err(|e| DomainError::InvalidUrl(format!("{e}: {base}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_and_path_are_concatenated() {
        let url = resolve_target("http://127.0.0.1:8080", "/users?page=2").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/users?page=2");
    }

    #[test]
    fn test_base_with_prefix() {
        let url = resolve_target("http://localhost/api/v1", "/items/3").unwrap();
        assert_eq!(url.path(), "/api/v1/items/3");
    }

    #[test]
    fn test_malformed_target() {
        let err = resolve_target("not a url", "/users").unwrap_err();
        assert!(matches!(err, DomainError::InvalidUrl(ref msg) if msg.contains("not a url/users")));
    }

    #[test]
    fn test_parse_base() {
        assert!(parse_base("http://example.com").is_ok());
        assert!(parse_base("::").is_err());
    }
}
