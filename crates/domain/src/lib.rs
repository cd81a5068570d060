//! Wirecheck Domain - Core types
//!
//! This crate defines the data model shared by the recorder and its responses.
//! All types here are pure Rust with no I/O dependencies.

pub mod cookie;
pub mod error;
pub mod request;
pub mod response;
pub mod settings;
pub mod testing;

pub use cookie::{Cookie, parse_cookie_header};
pub use error::{DomainError, DomainResult};
pub use request::{parse_base, resolve_target};
pub use response::{JSON_MEDIA_TYPE, ResponseBody, StatusCode};
pub use settings::RecorderSettings;
pub use testing::{Failure, Severity, StatusExpectation};
