//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the recorder and the test framework.
//! Each port is a trait that can be implemented outside this crate.

mod reporter;

pub use reporter::Reporter;
