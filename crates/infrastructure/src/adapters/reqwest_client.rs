//! HTTP Client implementation using reqwest.
//!
//! Wraps a `reqwest::Client` that owns a cookie jar for its whole lifetime,
//! dispatches prepared requests and reads their bodies in full.

use std::error::Error as _;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Request, RequestBuilder, Url};
use tracing::debug;
use wirecheck_application::RecorderError;
use wirecheck_domain::{Cookie, RecorderSettings, parse_cookie_header};

/// Maximum number of redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// A response read off the wire, body included.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Method of the request that produced this response.
    pub method: Method,
    /// URL the request was sent to.
    pub url: Url,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Full response payload.
    pub body: Vec<u8>,
}

/// HTTP client with a persistent cookie store.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    jar: Arc<Jar>,
}

impl ReqwestHttpClient {
    /// Creates a client with an empty cookie jar.
    ///
    /// Configuration:
    /// - Follow redirects: up to 10
    /// - User-Agent: taken from `settings`
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::ClientInit`] if the client cannot be created.
    pub fn new(settings: &RecorderSettings) -> Result<Self, RecorderError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| RecorderError::ClientInit(e.to_string()))?;

        Ok(Self { client, jar })
    }

    /// Starts a request against a fully resolved URL.
    #[must_use]
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Sends `request` and reads the whole response body.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request cannot be sent or the body
    /// cannot be read.
    pub async fn execute(&self, request: Request) -> Result<RawResponse, RecorderError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "dispatching request");

        let response = self.client.execute(request).await.map_err(Self::map_error)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| RecorderError::Body(error_chain(&e)))?
            .to_vec();

        debug!(%method, %url, status, bytes = body.len(), "response received");

        Ok(RawResponse {
            method,
            url,
            status,
            headers,
            body,
        })
    }

    /// Cookies the jar would send to `url`.
    #[must_use]
    pub fn cookies(&self, url: &Url) -> Vec<Cookie> {
        let host = url.host_str().unwrap_or_default();
        self.jar
            .cookies(url)
            .and_then(|header| header.to_str().ok().map(|h| parse_cookie_header(h, host)))
            .unwrap_or_default()
    }

    /// Maps reqwest errors to `RecorderError`.
    fn map_error(error: reqwest::Error) -> RecorderError {
        if error.is_timeout() {
            return RecorderError::Timeout;
        }

        let message = error_chain(&error);

        if error.is_connect() {
            if message.to_lowercase().contains("refused") {
                return RecorderError::ConnectionRefused {
                    host: error
                        .url()
                        .and_then(|u| u.host_str().map(ToString::to_string))
                        .unwrap_or_else(|| "unknown".to_string()),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return RecorderError::ConnectionFailed(message);
        }

        if error.is_body() || error.is_decode() {
            return RecorderError::Body(message);
        }

        RecorderError::Http(message)
    }
}

/// Joins an error with all of its sources; reqwest keeps the useful part
/// (e.g. "Connection refused") in the source chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
