//! API gateway for communicating with the TradeMentor backend.
//!
//! Every outbound call goes through [`ApiClient::request`]: it layers the
//! default headers, injects the bearer token from the shared
//! [`CredentialStore`], sends exactly one request, and folds every failure
//! into an [`ApiError`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, PRAGMA,
};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::auth::CredentialStore;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds. Applies to every call; there is no
/// per-call override.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One outbound call: method, path, header overrides and optional JSON body.
///
/// Built fresh for each call and consumed by [`ApiClient::request`].
/// Header names are case-insensitive and a later `header` call for the same
/// name replaces the earlier one.
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Override a header. Wins over the gateway defaults and the bearer token.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Send without credentials even if a token is held.
    pub fn without_auth(self) -> Self {
        self.header(AUTHORIZATION, HeaderValue::from_static(""))
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body).map_err(|e| ApiError::InvalidRequest {
            message: format!("Failed to serialize request body: {}", e),
        })?;
        self.body = Some(bytes);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// API client for the TradeMentor backend.
/// Clone is cheap - reqwest::Client and the credential store are both shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.credentials.is_present())
            .finish()
    }
}

impl ApiClient {
    /// Create a client bound to `base_url` for its whole lifetime.
    pub fn new(base_url: impl Into<String>, credentials: Arc<CredentialStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        let base_url: String = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "API client created");

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Send one request and return the parsed JSON body.
    ///
    /// - 204 yields `{}` without reading the body; so does an empty 2xx body.
    /// - Any other 2xx body is passed through unchanged.
    /// - Non-2xx fails with the body's `message` field, or "Server error".
    /// - Transport failures carry the underlying cause and no status.
    ///
    /// Failures are logged here and always returned; nothing is retried.
    pub async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let ApiRequest {
            method,
            path,
            headers: overrides,
            body,
        } = request;

        let url = format!("{}{}", self.base_url, path);
        let headers = self.build_headers(&overrides);

        debug!(
            method = %method,
            path = %path,
            authenticated = headers.contains_key(AUTHORIZATION),
            "Sending request"
        );

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let result = match builder.send().await {
            Ok(response) => Self::read_response(response).await,
            Err(e) => Err(ApiError::transport(&e)),
        };

        if let Err(ref e) = result {
            warn!(
                method = %method,
                path = %path,
                status = ?e.status(),
                kind = ?e.kind(),
                error = %e,
                "API request failed"
            );
        }
        result
    }

    /// Defaults first, then the bearer token, then caller overrides.
    /// An empty `Authorization` override drops the header entirely.
    fn build_headers(&self, overrides: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let token = self.credentials.get();
        if !token.is_empty() {
            match HeaderValue::from_str(&format!("Bearer {}", token.as_str())) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending without it"),
            }
        }

        for (name, value) in overrides {
            headers.insert(name.clone(), value.clone());
        }

        if headers
            .get(AUTHORIZATION)
            .is_some_and(|value| value.is_empty())
        {
            headers.remove(AUTHORIZATION);
        }

        headers
    }

    async fn read_response(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Map::new()));
        }

        if !status.is_success() {
            // An unreadable error body is treated like a missing one
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %ApiError::truncate_body(&body), "Error response");
            return Err(ApiError::from_status(status, &body));
        }

        let body = response.text().await.map_err(|e| ApiError::transport(&e))?;
        if body.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_str(&body).map_err(|e| {
            debug!(status = %status, error = %e, "Response body is not JSON");
            ApiError::malformed(status)
        })
    }
}
