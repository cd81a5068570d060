//! HTTP infrastructure utilities.
//!
//! This module provides body building for the content types a recorder can
//! send: url-encoded forms, multipart forms with file parts, and JSON.

mod body_builder;

pub use body_builder::{
    BodyBuildError, BuiltBody, FileAttachment, build_form_body, build_json_body,
    build_multipart_body,
};
