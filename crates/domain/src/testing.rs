//! Test outcome types.
//!
//! Failures recorded against a test case, and the status expectations the
//! response assertions check against.

use serde::{Deserialize, Serialize};

/// How a failure affects the running test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The test cannot continue.
    Fatal,
    /// Recorded; the test keeps running.
    Error,
}

impl Severity {
    /// Short label used when listing failures.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Error => "error",
        }
    }
}

/// A single recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Fatal or non-fatal.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

impl Failure {
    /// Create a fatal failure.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            message: message.into(),
        }
    }

    /// Create a non-fatal failure.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Whether this failure stopped the test.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Fatal)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity.label(), self.message)
    }
}

/// Expected status code value or range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Range of status codes (e.g., 200-299).
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub const fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => status >= *min && status <= *max,
        }
    }

    /// Get description of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => code.to_string(),
            Self::Range { min, max } => format!("in {min}-{max}"),
        }
    }

    /// Create a "success" expectation (200-299).
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }

    /// Create an exact status expectation.
    #[must_use]
    pub const fn exact(code: u16) -> Self {
        Self::Exact(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_expectation() {
        let expectation = StatusExpectation::exact(200);
        assert!(expectation.matches(200));
        assert!(!expectation.matches(201));
        assert_eq!(expectation.description(), "200");
    }

    #[test]
    fn test_success_range() {
        let expectation = StatusExpectation::success();
        assert!(expectation.matches(200));
        assert!(expectation.matches(299));
        assert!(!expectation.matches(300));
        assert!(!expectation.matches(199));
        assert_eq!(expectation.description(), "in 200-299");
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(Failure::fatal("boom").to_string(), "[fatal] boom");
        assert_eq!(Failure::error("oops").to_string(), "[error] oops");
        assert!(Failure::fatal("x").is_fatal());
        assert!(!Failure::error("x").is_fatal());
    }
}
