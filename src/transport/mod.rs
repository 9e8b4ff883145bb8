/*!
 * Transport seam between the client components and the server.
 *
 * Every collaborator call (probe, translation, prediction, alerts) goes through
 * the `Transport` trait so that components can be driven by the real HTTP
 * client or by the scripted mock in tests:
 * - `http`: reqwest-backed transport resolving paths against a base URL
 * - `mock`: scripted transport recording every request it receives
 */

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::TransportError;

pub mod http;
pub mod mock;

pub use self::http::HttpTransport;
pub use self::mock::{MockReply, MockTransport};

/// HTTP method used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One part of a multipart form submission
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    /// Plain text field
    Text { name: String, value: String },
    /// Uploaded file
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// A request relative to the transport's base URL
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Path including any query string, e.g. `/api/disease-alerts/info?disease=x`
    pub path: String,
    /// Request body
    pub body: RequestBody,
    /// Ask intermediaries not to serve a cached response
    pub no_cache: bool,
    /// Per-request deadline enforced by the transport
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: RequestBody::Empty,
            no_cache: false,
            timeout: None,
        }
    }

    /// Create a POST request with a JSON body
    pub fn post_json(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: RequestBody::Json(body),
            no_cache: false,
            timeout: None,
        }
    }

    /// Create a POST request with a multipart body
    pub fn post_multipart(path: impl Into<String>, parts: Vec<FormPart>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: RequestBody::Multipart(parts),
            no_cache: false,
            timeout: None,
        }
    }

    /// Disable caching for this request
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    /// Set a deadline for this request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Path without the query string
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    /// JSON body, if the request carries one
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// A fully read response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-success status into an error
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::Status {
                status_code: self.status,
                message: excerpt(&self.body, 120),
            })
        }
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.body).map_err(|e| TransportError::Parse(e.to_string()))
    }
}

/// Common trait for everything that can carry a request to the server
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Send a request and read the full response
    ///
    /// # Arguments
    /// * `request` - The request to send
    ///
    /// # Returns
    /// * `Result<HttpResponse, TransportError>` - The response, whatever its status, or a
    ///   transport level failure
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// GET a path and decode a successful JSON response
pub async fn get_json<T, R>(transport: &T, path: &str) -> Result<R, TransportError>
where
    T: Transport + ?Sized,
    R: DeserializeOwned,
{
    transport
        .send(HttpRequest::get(path))
        .await?
        .error_for_status()?
        .json()
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}
