//! HTTP protocol client for one Momentum tenant
//!
//! A [`MomentumClient`] wraps an HTTP session bound to a single site's base
//! URL and API key. It carries the fixed tenant headers on every request and,
//! once a token has been attached with [`MomentumClient::set_token`], a
//! bearer `Authorization` header. The client itself never errors on non-2xx
//! responses; interpreting the status code is the caller's responsibility.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{QueuePilotError, Result};

/// Constant client-identifier header value sent on every Momentum request.
pub const MOMENTUM_CLIENT: &str = "momentum.se-fastighetminasidor";

const X_API_KEY: &str = "x-api-key";
const X_MOMENTUM_CLIENT: &str = "x-momentum-client";
const X_MOMENTUM_DEVICE_KEY: &str = "x-momentum-device-key";

// ---------------------------------------------------------------------------
// MomentumClient
// ---------------------------------------------------------------------------

/// Per-site HTTP session for the Momentum REST API.
///
/// One instance is constructed per site run; no state is shared across runs
/// or across tenants. Construction performs no network I/O.
///
/// # Examples
///
/// ```
/// use queuepilot::momentum::client::MomentumClient;
///
/// let http = reqwest::Client::new();
/// let client = MomentumClient::new(http, "https://kbab.example.se/api/", "key123")
///     .expect("valid header values");
/// assert_eq!(client.base_url(), "https://kbab.example.se/api");
/// ```
#[derive(Debug, Clone)]
pub struct MomentumClient {
    http: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl MomentumClient {
    /// Creates a client for the given tenant.
    ///
    /// The base URL is normalized by stripping trailing slashes. Initial
    /// headers are `x-api-key`, `x-momentum-client`, and JSON
    /// `Accept`/`Content-Type`; no `Authorization` header is present until
    /// [`Self::set_token`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`QueuePilotError::Protocol`] when `api_key` is not a valid
    /// HTTP header value. [`crate::store::FileStore`] rejects such keys at
    /// load time, so this path is only reachable through other stores.
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_API_KEY,
            HeaderValue::from_str(api_key)
                .map_err(|e| QueuePilotError::Protocol(format!("invalid x-api-key value: {e}")))?,
        );
        headers.insert(X_MOMENTUM_CLIENT, HeaderValue::from_static(MOMENTUM_CLIENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// Adds the optional `x-momentum-device-key` tenant header.
    ///
    /// Some tenants require a static device key next to the API key; sites
    /// without one simply skip this call.
    pub fn with_device_key(mut self, device_key: &str) -> Result<Self> {
        self.headers.insert(
            X_MOMENTUM_DEVICE_KEY,
            HeaderValue::from_str(device_key).map_err(|e| {
                QueuePilotError::Protocol(format!("invalid x-momentum-device-key value: {e}"))
            })?,
        );
        Ok(self)
    }

    /// Attaches a bearer token; every subsequent request on this instance is
    /// authenticated.
    ///
    /// A token must only be attached after a successful login. The token is
    /// held in memory for the lifetime of this instance and never persisted.
    ///
    /// # Errors
    ///
    /// Returns [`QueuePilotError::Protocol`] when the issued token cannot be
    /// carried in an HTTP header.
    pub fn set_token(&mut self, token: &str) -> Result<()> {
        self.headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                QueuePilotError::Protocol(format!("invalid bearer token value: {e}"))
            })?,
        );
        Ok(())
    }

    /// The normalized base URL this client is bound to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer token has been attached.
    pub fn has_token(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// Issues a GET request to `base_url + path` with the current headers.
    ///
    /// Returns the raw response; non-2xx statuses are not treated as errors
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`QueuePilotError::Transport`] on network or timeout failure.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| QueuePilotError::Transport(format!("GET {url}: {e}")))?;
        Ok(response)
    }

    /// Issues a POST request with a JSON body to `base_url + path` with the
    /// current headers.
    ///
    /// Returns the raw response; non-2xx statuses are not treated as errors
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`QueuePilotError::Transport`] on network or timeout failure.
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| QueuePilotError::Transport(format!("POST {url}: {e}")))?;
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
