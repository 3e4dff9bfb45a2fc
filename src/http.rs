//! HTTP transport for the API.
//!
//! Serializes request bodies, attaches the authentication headers, applies
//! the configured timeout, and turns every non-2xx response into an
//! [`ApiError`] before the caller can see it.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::ClientError;
use crate::model::ApiError;
use crate::options::ClientConfig;

/// Header carrying the organization id.
pub const ORGANIZATION_HEADER: &str = "OpenAI-Organization";

/// Build a configured HTTP client from the client configuration.
///
/// A caller-supplied client is reused as is.
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    match &config.http_client {
        Some(client) => Ok(client.clone()),
        None => Client::builder().timeout(config.timeout).build(),
    }
}

/// Headers sent with every request.
pub fn default_headers(config: &ClientConfig) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
        .map_err(|_| ClientError::Config("API key is not a valid header value".to_string()))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    let user_agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|_| ClientError::Config("user agent is not a valid header value".to_string()))?;
    headers.insert(USER_AGENT, user_agent);

    if let Some(id) = config.organization() {
        let id = HeaderValue::from_str(id)
            .map_err(|_| ClientError::Config("organization is not a valid header value".to_string()))?;
        headers.insert(ORGANIZATION_HEADER, id);
    }

    Ok(headers)
}

/// Serialize a request body; no body is an empty byte sequence.
pub fn json_body<T: Serialize + ?Sized>(body: Option<&T>) -> Result<Vec<u8>, ClientError> {
    match body {
        Some(body) => serde_json::to_vec(body).map_err(ClientError::Encode),
        None => Ok(Vec::new()),
    }
}

/// Sends requests for one client configuration.
///
/// Holds only immutable state, so one instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    base_url: String,
    headers: HeaderMap,
    timeout: std::time::Duration,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        if config.api_key.is_empty() {
            return Err(ClientError::Config("API key is required".to_string()));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("invalid base url {:?}: {}", base_url, e)))?;

        Ok(Self {
            http: build_http_client(config)?,
            base_url,
            headers: default_headers(config)?,
            timeout: config.timeout,
        })
    }

    /// Full URL for an endpoint path such as `/engines`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and return the response with its body unread.
    ///
    /// Any status outside `200..300` is consumed here and returned as
    /// [`ClientError::Api`].
    pub async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<Response, ClientError> {
        let url = self.url(path);
        let body = json_body(body)?;

        debug!(%method, %url, bytes = body.len(), "sending request");

        let response = self
            .http
            .request(method, &url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .body(body)
            .send()
            .await?;

        debug!(status = %response.status(), %url, "received response");
        check_for_success(response).await
    }

    /// Send one request and decode the whole body as `R`.
    pub async fn request<T, R>(&self, method: Method, path: &str, body: Option<&T>) -> Result<R, ClientError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(method, path, body).await?;
        decode_response(response).await
    }
}

/// Pass 2xx responses through; turn anything else into an [`ApiError`].
pub async fn check_for_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await?;
    Err(ApiError::from_body(status.as_u16(), &body).into())
}

/// Read the entire body and decode it as JSON.
///
/// The response is consumed, so the body is released whatever the outcome.
pub async fn decode_response<R: DeserializeOwned>(response: Response) -> Result<R, ClientError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::decode("invalid json response", e))
}
