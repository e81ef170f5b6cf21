//! HTTP backend implementation using `reqwest`.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use stockline_protocol::{Codec, Credentials, Identity, JsonCodec, LoginResponse};
use stockline_session::{Backend, BackendError};

use crate::{TransportError, endpoints, join_url};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shape of the API's error bodies. Either field may carry the message.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// A [`Backend`] that talks to the auth API over HTTP(S).
///
/// Cloning is cheap: `reqwest::Client` is reference-counted internally
/// and shares its connection pool between clones.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    codec: JsonCodec,
}

impl HttpBackend {
    /// Creates a backend for the API at `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a backend with an explicit per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(TransportError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        tracing::debug!(base_url, ?timeout, "HTTP backend configured");
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            codec: JsonCodec,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Sends `request` and maps non-success statuses to [`BackendError`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }

        // The body is only a hint; an unreadable one still yields a status.
        let body = response.bytes().await.unwrap_or_default();
        let parsed: ErrorBody = self.codec.decode(&body).unwrap_or_default();
        let message = parsed.message.or(parsed.error).unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %message, "request rejected");
        Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, BackendError> {
        let body = response.bytes().await.map_err(network_error)?;
        self.codec
            .decode(&body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

impl Backend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        let request = self.client.post(self.url(endpoints::LOGIN)).json(credentials);
        let response = self.send(request).await?;
        self.read_json(response).await
    }

    async fn logout(&self, token: &str) -> Result<(), BackendError> {
        let request = self
            .client
            .post(self.url(endpoints::LOGOUT))
            .bearer_auth(token);
        self.send(request).await?;
        Ok(())
    }

    async fn profile(&self, token: &str) -> Result<Identity, BackendError> {
        let request = self
            .client
            .get(self.url(endpoints::PROFILE))
            .bearer_auth(token);
        let response = self.send(request).await?;
        self.read_json(response).await
    }
}

fn network_error(err: reqwest::Error) -> BackendError {
    if err.is_decode() {
        BackendError::InvalidResponse(err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_relative_base_url() {
        let result = HttpBackend::new("api.example.com");
        assert!(matches!(result, Err(TransportError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = HttpBackend::new("https://api.example.com/v1/").unwrap();
        assert_eq!(backend.base_url(), "https://api.example.com/v1");
        assert_eq!(backend.url(endpoints::PROFILE), "https://api.example.com/v1/user/profile");
    }
}
