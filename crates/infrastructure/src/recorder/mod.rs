//! Request recorder.
//!
//! A [`Recorder`] builds requests against one destination, sends them through a
//! cookie-keeping client and hands back [`Response`]s to assert on. Every
//! setup or transport failure is reported as fatal and returned as an error,
//! so a test body can stop with `?`.

mod response;

use std::sync::Arc;

use axum::Router;
use reqwest::{Method, Request};
use serde::Serialize;
use tracing::error;
use wirecheck_application::{RecorderError, RecorderResult, Reporter};
use wirecheck_domain::{Cookie, RecorderSettings, parse_base, resolve_target};

use crate::adapters::ReqwestHttpClient;
use crate::http::{
    BuiltBody, FileAttachment, build_form_body, build_json_body, build_multipart_body,
};
use crate::server::TestServer;

pub use response::Response;

/// Where a recorder sends its requests.
#[derive(Debug)]
pub enum Destination {
    /// A running server reachable at this base URL.
    Url(String),
    /// An in-process router, served on an ephemeral local port.
    Handler(Router),
}

impl From<&str> for Destination {
    fn from(base_url: &str) -> Self {
        Self::Url(base_url.to_string())
    }
}

impl From<String> for Destination {
    fn from(base_url: String) -> Self {
        Self::Url(base_url)
    }
}

impl From<Router> for Destination {
    fn from(router: Router) -> Self {
        Self::Handler(router)
    }
}

/// Sends HTTP requests to one destination and records the responses.
pub struct Recorder {
    client: ReqwestHttpClient,
    base_url: String,
    server: Option<TestServer>,
    reporter: Arc<dyn Reporter>,
    settings: RecorderSettings,
}

impl Recorder {
    /// Creates a recorder for `destination`, reporting through `reporter`.
    ///
    /// Settings start from [`RecorderSettings::from_env`].
    ///
    /// # Errors
    ///
    /// Fails if the client cannot be created or, for a handler, the test
    /// server cannot be started.
    pub async fn new(
        destination: impl Into<Destination>,
        reporter: Arc<dyn Reporter>,
    ) -> RecorderResult<Self> {
        match destination.into() {
            Destination::Url(base_url) => Self::with_url(base_url, reporter),
            Destination::Handler(router) => Self::with_handler(router, reporter).await,
        }
    }

    /// Creates a recorder that prepends `base_url` to every path.
    ///
    /// # Errors
    ///
    /// Fails if the client cannot be created.
    pub fn with_url(
        base_url: impl Into<String>,
        reporter: Arc<dyn Reporter>,
    ) -> RecorderResult<Self> {
        Self::build(base_url.into(), None, reporter, RecorderSettings::from_env())
    }

    /// Creates a recorder that serves `router` on an ephemeral local port and
    /// sends requests there. Call [`Recorder::close`] when done.
    ///
    /// # Errors
    ///
    /// Fails if the test server cannot be started or the client cannot be
    /// created.
    pub async fn with_handler(router: Router, reporter: Arc<dyn Reporter>) -> RecorderResult<Self> {
        let server = match TestServer::start(router).await {
            Ok(server) => server,
            Err(e) => return Err(report_fatal(reporter.as_ref(), e)),
        };
        Self::build(
            server.url(),
            Some(server),
            reporter,
            RecorderSettings::from_env(),
        )
    }

    fn build(
        base_url: String,
        server: Option<TestServer>,
        reporter: Arc<dyn Reporter>,
        settings: RecorderSettings,
    ) -> RecorderResult<Self> {
        let client = ReqwestHttpClient::new(&settings)
            .map_err(|e| report_fatal(reporter.as_ref(), e))?;
        Ok(Self {
            client,
            base_url,
            server,
            reporter,
            settings,
        })
    }

    /// Replaces the settings. The client is rebuilt, so the cookie store
    /// starts empty again.
    ///
    /// # Errors
    ///
    /// Fails if the new client cannot be created.
    pub fn with_settings(mut self, settings: RecorderSettings) -> RecorderResult<Self> {
        self.client = ReqwestHttpClient::new(&settings).map_err(|e| self.fatal(e))?;
        self.settings = settings;
        Ok(self)
    }

    /// Turns colorized failure output on or off for this recorder only.
    pub const fn set_colorize(&mut self, colorize: bool) {
        self.settings.colorize = colorize;
    }

    /// The base address prepended to request paths.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    /// The reporter failures go to.
    #[must_use]
    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// Builds a request without a body. The full URL is the base address
    /// followed by `path`. Headers may be changed before sending it.
    ///
    /// # Errors
    ///
    /// Fails if the resulting URL is malformed.
    pub fn new_request(&self, method: Method, path: &str) -> RecorderResult<Request> {
        self.build_request(method, path, BuiltBody::None)
    }

    /// Builds a request whose body is `fields`, url-encoded.
    ///
    /// # Errors
    ///
    /// Fails if the URL is malformed or the fields cannot be encoded.
    pub fn new_form_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        fields: &T,
    ) -> RecorderResult<Request> {
        let body = build_form_body(fields).map_err(|e| self.fatal(e))?;
        self.build_request(method, path, body)
    }

    /// Builds a `multipart/form-data` request from text fields and file
    /// attachments.
    ///
    /// # Errors
    ///
    /// Fails if the URL is malformed or an attachment cannot be read.
    pub fn new_multipart_request<I, K, V, J, N>(
        &self,
        method: Method,
        path: &str,
        fields: I,
        files: J,
    ) -> RecorderResult<Request>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        J: IntoIterator<Item = (N, FileAttachment)>,
        N: Into<String>,
    {
        let body = build_multipart_body(fields, files).map_err(|e| self.fatal(e))?;
        self.build_request(method, path, body)
    }

    /// Builds a request whose body is `data` encoded as JSON.
    ///
    /// # Errors
    ///
    /// Fails if the URL is malformed or `data` cannot be serialized.
    pub fn new_json_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        data: &T,
    ) -> RecorderResult<Request> {
        let body = build_json_body(data).map_err(|e| self.fatal(e))?;
        self.build_request(method, path, body)
    }

    fn build_request(&self, method: Method, path: &str, body: BuiltBody) -> RecorderResult<Request> {
        let url = resolve_target(&self.base_url, path).map_err(|e| self.fatal(e))?;
        body.apply(self.client.request(method, url))
            .build()
            .map_err(|e| self.fatal(RecorderError::Http(e.to_string())))
    }

    /// Sends `request` as-is and records the response. The base address is
    /// not applied again.
    ///
    /// # Errors
    ///
    /// Fails on any transport error.
    pub async fn send(&self, request: Request) -> RecorderResult<Response<'_>> {
        let raw = self.client.execute(request).await.map_err(|e| self.fatal(e))?;
        Ok(Response::new(self, raw))
    }

    /// Sends a GET request to `path`.
    ///
    /// # Errors
    ///
    /// See [`Recorder::new_request`] and [`Recorder::send`].
    pub async fn get(&self, path: &str) -> RecorderResult<Response<'_>> {
        let request = self.new_request(Method::GET, path)?;
        self.send(request).await
    }

    /// Sends a POST request to `path` with `fields` as a url-encoded form.
    ///
    /// # Errors
    ///
    /// See [`Recorder::new_form_request`] and [`Recorder::send`].
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        fields: &T,
    ) -> RecorderResult<Response<'_>> {
        let request = self.new_form_request(Method::POST, path, fields)?;
        self.send(request).await
    }

    /// Sends a PUT request to `path` with `fields` as a url-encoded form.
    ///
    /// # Errors
    ///
    /// See [`Recorder::new_form_request`] and [`Recorder::send`].
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        fields: &T,
    ) -> RecorderResult<Response<'_>> {
        let request = self.new_form_request(Method::PUT, path, fields)?;
        self.send(request).await
    }

    /// Sends a DELETE request to `path`.
    ///
    /// # Errors
    ///
    /// See [`Recorder::new_request`] and [`Recorder::send`].
    pub async fn delete(&self, path: &str) -> RecorderResult<Response<'_>> {
        let request = self.new_request(Method::DELETE, path)?;
        self.send(request).await
    }

    /// Cookies currently stored for the base address.
    ///
    /// # Errors
    ///
    /// Fails if the base address is not a valid URL.
    pub fn cookies(&self) -> RecorderResult<Vec<Cookie>> {
        let url = parse_base(&self.base_url).map_err(|e| self.fatal(e))?;
        Ok(self.client.cookies(&url))
    }

    /// Stops the in-process test server, if there is one.
    pub async fn close(&mut self) {
        if let Some(mut server) = self.server.take() {
            server.shutdown().await;
        }
    }

    fn fatal(&self, error: impl Into<RecorderError>) -> RecorderError {
        report_fatal(self.reporter.as_ref(), error.into())
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("base_url", &self.base_url)
            .field("server", &self.server)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn report_fatal(reporter: &dyn Reporter, error: RecorderError) -> RecorderError {
    error!(error = %error, "fatal test failure");
    reporter.fatal(&error.to_string());
    error
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::header::CONTENT_TYPE;
    use wirecheck_application::TestReport;

    fn url_recorder(base: &str) -> (Recorder, Arc<TestReport>) {
        let report = TestReport::shared();
        let recorder = Recorder::with_url(base, report.clone()).unwrap();
        (recorder, report)
    }

    #[test]
    fn test_new_request_concatenates_base_and_path() {
        let (recorder, report) = url_recorder("http://localhost:9000/api");
        let request = recorder.new_request(Method::GET, "/users/1?full=true").unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:9000/api/users/1?full=true"
        );
        assert!(request.body().is_none());
        report.finish();
    }

    #[test]
    fn test_malformed_url_is_fatal() {
        let (recorder, report) = url_recorder("not a url");
        let err = recorder.new_request(Method::GET, "/users").unwrap_err();

        assert!(matches!(err, RecorderError::Domain(_)));
        let fatals = report.fatals();
        assert_eq!(fatals.len(), 1);
        assert!(fatals[0].contains("invalid URL"));
        report.take();
    }

    #[test]
    fn test_form_request_sets_content_type() {
        let (recorder, report) = url_recorder("http://localhost");
        let request = recorder
            .new_form_request(Method::PUT, "/users/1", &[("name", "Ada Lovelace")])
            .unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(
            request.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, b"name=Ada+Lovelace");
        report.finish();
    }

    #[test]
    fn test_json_request_sets_content_type() {
        let (recorder, report) = url_recorder("http://localhost");
        let request = recorder
            .new_json_request(Method::POST, "/users", &serde_json::json!({"email": "a@b.c"}))
            .unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, br#"{"email":"a@b.c"}"#);
        report.finish();
    }

    #[test]
    fn test_json_encoding_failure_is_fatal() {
        let (recorder, report) = url_recorder("http://localhost");
        let mut bad = std::collections::HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON");

        let err = recorder
            .new_json_request(Method::POST, "/users", &bad)
            .unwrap_err();
        assert!(matches!(err, RecorderError::Encoding(_)));
        assert_eq!(report.fatals().len(), 1);
        report.take();
    }

    #[test]
    fn test_multipart_request_sets_boundary() {
        let (recorder, report) = url_recorder("http://localhost");
        let request = recorder
            .new_multipart_request(
                Method::POST,
                "/upload",
                [("title", "report")],
                [("file", FileAttachment::from_bytes("a.txt", "abc"))],
            )
            .unwrap();

        let content_type = request.headers()[CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        report.finish();
    }

    #[test]
    fn test_unreadable_attachment_is_fatal() {
        struct FailingReader;

        impl std::io::Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("device unplugged"))
            }
        }

        let (recorder, report) = url_recorder("http://localhost");
        let err = recorder
            .new_multipart_request(
                Method::POST,
                "/upload",
                [("title", "report")],
                [("file", FileAttachment::new("scan.pdf", FailingReader))],
            )
            .unwrap_err();

        assert!(matches!(err, RecorderError::Multipart(_)));
        let fatals = report.fatals();
        assert_eq!(fatals.len(), 1);
        assert!(fatals[0].contains("scan.pdf: device unplugged"));
        assert!(report.errors().is_empty());
        report.take();
    }

    #[test]
    fn test_headers_can_be_changed_before_sending() {
        let (recorder, report) = url_recorder("http://localhost");
        let mut request = recorder.new_request(Method::GET, "/me").unwrap();
        request
            .headers_mut()
            .insert("x-api-key", "secret".parse().unwrap());
        assert_eq!(request.headers()["x-api-key"], "secret");
        report.finish();
    }

    #[test]
    fn test_set_colorize_is_per_recorder() {
        let report = TestReport::shared();
        let mut first = Recorder::with_url("http://localhost", report.clone()).unwrap();
        let second = Recorder::with_url("http://localhost", report.clone())
            .unwrap()
            .with_settings(RecorderSettings::default().with_colorize(true))
            .unwrap();

        first.set_colorize(false);
        assert!(!first.settings().colorize);
        assert!(second.settings().colorize);
        report.finish();
    }

    #[test]
    fn test_cookies_on_bad_base_is_fatal() {
        let (recorder, report) = url_recorder("::nope");
        assert!(recorder.cookies().is_err());
        assert_eq!(report.fatals().len(), 1);
        report.take();
    }

    #[test]
    fn test_destination_conversions() {
        assert!(matches!(Destination::from("http://x"), Destination::Url(_)));
        assert!(matches!(
            Destination::from("http://x".to_string()),
            Destination::Url(_)
        ));
        assert!(matches!(
            Destination::from(Router::new()),
            Destination::Handler(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_destination_is_fatal() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (recorder, report) = url_recorder(&format!("http://{addr}"));
        let result = recorder.get("/").await;

        assert!(result.is_err());
        assert_eq!(report.fatals().len(), 1);
        report.take();
    }

    #[tokio::test]
    async fn test_close_without_server_is_noop() {
        let (mut recorder, report) = url_recorder("http://localhost");
        recorder.close().await;
        recorder.close().await;
        report.finish();
    }
}
