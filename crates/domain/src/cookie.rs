//! Cookie types.
//!
//! The recorder's cookie store hands cookies back as a `Cookie` request header
//! value (`a=1; b=2`). This module turns that header into typed cookies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A single HTTP cookie as seen by the destination it was stored for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Host the cookie was returned for.
    #[serde(default)]
    pub domain: String,
}

impl Cookie {
    /// Create a new cookie.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
        }
    }

    /// Set the domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Format for Cookie header.
    #[must_use]
    pub fn to_cookie_header(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl FromStr for Cookie {
    type Err = DomainError;

    /// Parses a single `name=value` pair. The domain is left empty.
    fn from_str(pair: &str) -> Result<Self, Self::Err> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| DomainError::InvalidCookie(pair.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidCookie(pair.to_string()));
        }
        Ok(Self::new(name, value.trim(), ""))
    }
}

impl std::fmt::Display for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_cookie_header())
    }
}

/// Parse a `Cookie` header value into cookies belonging to `domain`.
///
/// Malformed pairs are skipped.
#[must_use]
pub fn parse_cookie_header(header: &str, domain: &str) -> Vec<Cookie> {
    header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.parse::<Cookie>().ok())
        .map(|cookie| cookie.with_domain(domain))
        .collect()
}
