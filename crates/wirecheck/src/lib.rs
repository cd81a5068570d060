//! Wirecheck - integration tests for HTTP/REST APIs
//!
//! A [`Recorder`] sends requests to a base URL or to an in-process
//! [`axum::Router`], keeps cookies between requests, and returns [`Response`]s
//! with `expect_*` helpers. Setup and transport failures are fatal: they are
//! reported and returned as [`RecorderError`] so the test stops at `?`.
//! Failed expectations are recorded and the test keeps going.
//!
//! ```no_run
//! use wirecheck::axum::{Router, routing::get};
//! use wirecheck::{Recorder, TestReport};
//!
//! # async fn run() -> Result<(), wirecheck::RecorderError> {
//! let report = TestReport::shared();
//! let router = Router::new().route("/health", get(|| async { "ok" }));
//! let mut recorder = Recorder::with_handler(router, report.clone()).await?;
//!
//! let response = recorder.get("/health").await?;
//! response.expect_ok();
//! response.expect_body_contains("ok");
//!
//! recorder.close().await;
//! report.finish();
//! # Ok(())
//! # }
//! ```

pub use wirecheck_application::{RecorderError, RecorderResult, Reporter, TestReport};
pub use wirecheck_domain::{
    Cookie, Failure, RecorderSettings, ResponseBody, Severity, StatusCode, StatusExpectation,
};
pub use wirecheck_infrastructure::{Destination, FileAttachment, Recorder, Response, TestServer};

pub use axum;
pub use reqwest;
pub use reqwest::Method;
