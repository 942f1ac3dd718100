//! Momentum authentication and session lifecycle
//!
//! Implements the three-phase session lifecycle against a Momentum-compatible
//! identity endpoint: PKCE password login, token-authenticated queue-status
//! retrieval, and structured logout.
//!
//! # Wire contract
//!
//! The contract is preserved exactly as observed against live tenants:
//!
//! - `POST {base_url}/auth` carries only the PKCE `codeChallenge` (the
//!   verifier is never transmitted and there is no separate code-exchange
//!   step) together with `nonce`, `state`, and `requestRefreshToken: true`.
//! - A successful response contains `completed.accessToken`. Any other JSON
//!   shape, including an MFA `challenge` continuation, is treated as a failed
//!   login; multi-step continuation is not implemented.
//! - `POST {base_url}/auth/logout` sends
//!   `{returnAddress, global: false, keepSingleSignOn: false}`; HTTP 200 is
//!   the only success status.
//!
//! `requestRefreshToken` is sent for wire compatibility only; no refresh
//! token is ever read from the response.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{QueuePilotError, Result};
use crate::momentum::client::MomentumClient;
use crate::momentum::pkce;

/// Bound on the login request; a hung identity endpoint fails the attempt
/// rather than blocking the run.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the applicant queue-status endpoint, relative to the tenant base
/// URL.
pub const STATUS_PATH: &str = "/market/applicant/status";

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// JSON body of the password login POST to `{base_url}/auth`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    method: &'a str,
    identifier: &'a str,
    key: &'a str,
    return_address: String,
    code_challenge: &'a str,
    code_challenge_method: &'a str,
    nonce: String,
    state: String,
    request_refresh_token: bool,
}

/// One element of the `queues` array in the status response. Every field is
/// optional on the wire; fallbacks are applied when mapping to [`QueueEntry`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQueue {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    value_unit_display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    queues: Vec<RawQueue>,
}

// ---------------------------------------------------------------------------
// QueueEntry
// ---------------------------------------------------------------------------

/// One queue standing reported by the status endpoint.
///
/// Consumed only for reporting; never mutated or stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Queue display name; `"Unknown queue"` when absent on the wire.
    pub display_name: String,
    /// Queue points rendered as text (the wire value may be numeric or a
    /// string); `"unknown"` when absent.
    pub value: String,
    /// Unit label such as `"dagar"`; empty when absent.
    pub unit: String,
}

impl From<RawQueue> for QueueEntry {
    fn from(raw: RawQueue) -> Self {
        QueueEntry {
            display_name: raw
                .display_name
                .unwrap_or_else(|| "Unknown queue".to_string()),
            value: match raw.value {
                None | Some(Value::Null) => "unknown".to_string(),
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
            },
            unit: raw.value_unit_display_name.unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}: {}", self.display_name, self.value)
        } else {
            write!(f, "{}: {} {}", self.display_name, self.value, self.unit)
        }
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Performs the Momentum password login with a fresh PKCE challenge.
///
/// Issues exactly one POST to `{base_url}/auth`. The PKCE challenge and the
/// random `nonce`/`state` tokens are generated per call and never reused.
///
/// # Returns
///
/// - `Ok(Some(token))` when the response contains `completed.accessToken`.
/// - `Ok(None)` for any other well-formed JSON response (bad credentials,
///   MFA continuation); the identifier and raw body are logged at warn
///   level so the failure is visible without aborting a bulk run.
///
/// # Errors
///
/// - [`QueuePilotError::AuthenticationFailed`] when `username` or `password`
///   is empty (no network call is made).
/// - [`QueuePilotError::Transport`] on network or timeout failure.
/// - [`QueuePilotError::Protocol`] when the response body is not JSON, so
///   callers can distinguish "bad credentials" from a transport or protocol
///   problem.
pub async fn login(
    http: &reqwest::Client,
    username: &str,
    password: &str,
    site: &str,
    base_url: &str,
) -> Result<Option<String>> {
    if username.is_empty() || password.is_empty() {
        return Err(QueuePilotError::AuthenticationFailed {
            site: site.to_string(),
            detail: "empty username or password".to_string(),
        }
        .into());
    }

    let challenge = pkce::generate()?;
    let payload = LoginRequest {
        method: "password",
        identifier: username,
        key: password,
        return_address: format!("https://minasidor.{site}.se/signin"),
        code_challenge: &challenge.challenge,
        code_challenge_method: &challenge.method,
        nonce: pkce::urlsafe_token(),
        state: pkce::urlsafe_token(),
        request_refresh_token: true,
    };

    let base = base_url.trim_end_matches('/');
    let url = format!("{base}/auth");
    let response = http
        .post(&url)
        .timeout(LOGIN_TIMEOUT)
        .json(&payload)
        .send()
        .await
        .map_err(|e| QueuePilotError::Transport(format!("POST {url}: {e}")))?;

    let body = response
        .text()
        .await
        .map_err(|e| QueuePilotError::Transport(format!("reading login response: {e}")))?;

    let data: Value = serde_json::from_str(&body).map_err(|e| {
        QueuePilotError::Protocol(format!("login response for {site} is not JSON ({e}): {body}"))
    })?;

    match data
        .get("completed")
        .and_then(|c| c.get("accessToken"))
        .and_then(Value::as_str)
    {
        Some(token) => {
            tracing::info!(site, "login successful");
            Ok(Some(token.to_string()))
        }
        None => {
            tracing::warn!(site, response = %data, "login failed");
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Queue status
// ---------------------------------------------------------------------------

/// Retrieves the applicant's current queue standings.
///
/// GETs [`STATUS_PATH`] through the authenticated client. Missing optional
/// fields on individual queue entries fall back to defaults instead of
/// failing; an absent or empty `queues` array yields an empty list.
///
/// # Errors
///
/// - [`QueuePilotError::StatusFetch`] on a non-200 status (code and body
///   recorded).
/// - [`QueuePilotError::Protocol`] when a 200 body cannot be parsed.
/// - [`QueuePilotError::Transport`] on network failure.
pub async fn fetch_queue_status(client: &MomentumClient) -> Result<Vec<QueueEntry>> {
    let response = client.get(STATUS_PATH).await?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(QueuePilotError::StatusFetch {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let body = response
        .text()
        .await
        .map_err(|e| QueuePilotError::Transport(format!("reading status response: {e}")))?;
    let parsed: StatusResponse = serde_json::from_str(&body)
        .map_err(|e| QueuePilotError::Protocol(format!("status response is not JSON ({e})")))?;

    Ok(parsed.queues.into_iter().map(QueueEntry::from).collect())
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// Closes the session on the identity endpoint.
///
/// Posts the structured logout payload to `/auth/logout`. HTTP 200 is the
/// only success status; anything else is reported as
/// [`QueuePilotError::LogoutFailed`] for visibility. Callers must treat this
/// error as non-fatal: it never invalidates an already-obtained status
/// result.
pub async fn logout(client: &MomentumClient, site: &str) -> Result<()> {
    let payload = json!({
        "returnAddress": format!("https://minasidor.{site}.se/"),
        "global": false,
        "keepSingleSignOn": false,
    });

    let response = client.post("/auth/logout", &payload).await?;
    let status = response.status();
    if status == reqwest::StatusCode::OK {
        tracing::info!(site, "logout successful");
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(site, status = status.as_u16(), "logout failed");
        Err(QueuePilotError::LogoutFailed {
            status: status.as_u16(),
            body,
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
