//! Wirecheck Application - Ports and errors
//!
//! Defines the reporting port the recorder talks to, the default collecting
//! reporter, and the error type every fatal path returns.

pub mod error;
pub mod ports;
pub mod report;

pub use error::{RecorderError, RecorderResult};
pub use ports::Reporter;
pub use report::TestReport;
