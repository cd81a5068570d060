//! Wirecheck Infrastructure - Adapters and the recorder
//!
//! This crate provides the reqwest-backed client, request body building, the
//! ephemeral test server and the `Recorder`/`Response` pair built on them.

pub mod adapters;
pub mod http;
pub mod recorder;
pub mod server;

pub use adapters::{RawResponse, ReqwestHttpClient};
pub use http::{
    BodyBuildError, BuiltBody, FileAttachment, build_form_body, build_json_body,
    build_multipart_body,
};
pub use recorder::{Destination, Recorder, Response};
pub use server::TestServer;
