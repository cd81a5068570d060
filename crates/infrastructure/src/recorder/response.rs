//! Recorded response with assertion helpers.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::warn;
use wirecheck_domain::{ResponseBody, StatusCode, StatusExpectation};

use super::Recorder;
use crate::adapters::RawResponse;

/// ANSI "dim" style used for response bodies in failure output.
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// The result of one dispatched request.
///
/// The body is read and normalized once, when the response is recorded.
/// Failed expectations are reported as non-fatal errors; the response body is
/// dumped along with the first one only.
#[derive(Debug)]
pub struct Response<'r> {
    recorder: &'r Recorder,
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    printed: AtomicBool,
}

impl<'r> Response<'r> {
    pub(crate) fn new(recorder: &'r Recorder, raw: RawResponse) -> Self {
        let content_type = raw
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let body = ResponseBody::normalize(content_type, raw.body);

        Self {
            recorder,
            method: raw.method,
            url: raw.url,
            status: StatusCode::new(raw.status),
            headers: raw.headers,
            body,
            printed: AtomicBool::new(false),
        }
    }

    /// Records an error unless the status code is 200.
    pub fn expect_ok(&self) {
        self.expect_code(StatusCode::OK.as_u16());
    }

    /// Records an error unless the status code is `code`.
    pub fn expect_code(&self, code: u16) {
        self.expect_status(&StatusExpectation::exact(code));
    }

    /// Records an error unless the status code is 2xx.
    pub fn expect_success(&self) {
        self.expect_status(&StatusExpectation::success());
    }

    fn expect_status(&self, expected: &StatusExpectation) {
        let actual = self.status.as_u16();
        if !expected.matches(actual) {
            self.fail(format!(
                "Expected response code {} but got: {actual}",
                expected.description()
            ));
        }
    }

    /// Records an error unless the normalized body contains `needle`.
    pub fn expect_body_contains(&self, needle: &str) {
        if !self.body.contains(needle) {
            self.fail(format!(
                "Expected response to contain `{needle}` but it did not."
            ));
        }
    }

    /// Records an error unless header `name` is present and equal to `expected`.
    pub fn expect_header(&self, name: &str, expected: &str) {
        match self.header(name) {
            Some(actual) if actual == expected => {}
            Some(actual) => self.fail(format!(
                "Expected header `{name}` to be `{expected}` but got: `{actual}`"
            )),
            None => self.fail(format!(
                "Expected header `{name}` to be `{expected}` but it was missing."
            )),
        }
    }

    /// Reports the request line and the whole body as an error.
    pub fn print_failure(&self) {
        let path = self.url.path();
        let message = if self.body.is_empty() {
            format!("{} request to {path} failed. Response was empty.", self.method)
        } else {
            let text = self.body.text();
            let body = if self.recorder.settings().colorize {
                format!("{DIM}{text}{RESET}")
            } else {
                text.into_owned()
            };
            format!(
                "{} request to {path} failed. Response was: \n{body}",
                self.method
            )
        };
        self.recorder.reporter().error(&message);
    }

    /// Like [`Response::print_failure`], but only the first call prints.
    pub fn print_failure_once(&self) {
        if !self.printed.swap(true, Ordering::SeqCst) {
            self.print_failure();
        }
    }

    /// Whether [`Response::print_failure_once`] has already printed.
    #[must_use]
    pub fn failure_printed(&self) -> bool {
        self.printed.load(Ordering::SeqCst)
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value, if present and valid text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Method of the originating request.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// URL of the originating request.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// The normalized body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// The normalized body as text.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        self.body.text()
    }

    /// Deserializes the normalized body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(self.body.as_bytes())
    }

    fn fail(&self, message: String) {
        warn!(method = %self.method, url = %self.url, %message, "expectation failed");
        self.print_failure_once();
        self.recorder.reporter().error(&message);
    }
}
