/*!
 * HTTP transport backed by reqwest.
 *
 * Request paths are joined onto the configured base URL. Timeouts and
 * connection failures are mapped onto `TransportError` variants.
 */

use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, header};
use std::time::Duration;
use url::Url;

use super::{FormPart, HttpRequest, HttpResponse, Method, RequestBody, Transport};
use crate::errors::{ConfigError, TransportError};

/// reqwest-backed transport resolving request paths against a base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Base URL of the web application
    base_url: Url,
    /// HTTP client for making requests
    client: Client,
}

impl HttpTransport {
    /// Create a transport for the given server
    ///
    /// # Arguments
    /// * `base_url` - Server root, e.g. `http://localhost:5000`
    /// * `timeout_secs` - Default deadline for requests without their own
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: e.to_string(),
            })?;

        Ok(Self { base_url, client })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", path, e)))
    }
}

fn build_multipart(parts: Vec<FormPart>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let file = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                form.part(name, file)
            }
        };
    }
    Ok(form)
}

fn map_send_error(error: reqwest::Error, timeout: Option<Duration>) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout.map(|t| t.as_millis() as u64).unwrap_or_default())
    } else {
        TransportError::Connection(error.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(&request.path)?;
        debug!("{:?} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        if request.no_cache {
            builder = builder
                .header(header::CACHE_CONTROL, "no-store")
                .header(header::PRAGMA, "no-cache");
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(build_multipart(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, request.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
