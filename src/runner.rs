//! Site runner
//!
//! Orchestrates one full login → fetch → logout cycle per site and fans out
//! over all configured sites. Execution is strictly sequential: each site's
//! cycle completes before the next begins, and every run constructs its own
//! [`MomentumClient`] so no token or header state crosses tenants.
//!
//! The runner reports through [`SiteReport`] records rather than printing;
//! rendering belongs to whatever sink the caller wires in.

use std::time::Duration;

use crate::error::{QueuePilotError, Result};
use crate::momentum::auth::{self, QueueEntry};
use crate::momentum::client::MomentumClient;
use crate::store::SiteStore;

/// Uniform bound applied to every outbound call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Outcome / SiteReport
// ---------------------------------------------------------------------------

/// Result of one phase (login, fetch, logout) of a site run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The phase completed.
    Success,
    /// The phase failed; `kind` is the stable error-kind label from
    /// [`QueuePilotError::kind`] and `detail` the human-readable cause.
    Failed {
        /// Stable error-kind label (e.g. `authentication`, `protocol`).
        kind: &'static str,
        /// Human-readable cause, one line.
        detail: String,
    },
}

impl Outcome {
    fn failed(err: &anyhow::Error) -> Self {
        let kind = err
            .downcast_ref::<QueuePilotError>()
            .map(QueuePilotError::kind)
            .unwrap_or("error");
        Outcome::Failed {
            kind,
            detail: format!("{err:#}"),
        }
    }

    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Structured record of one site's run, emitted to the reporting sink.
#[derive(Debug, Clone)]
pub struct SiteReport {
    /// The site identifier this run was for.
    pub identifier: String,
    /// Login outcome. When failed, no fetch or logout was attempted.
    pub login: Outcome,
    /// Queue entries retrieved on a successful fetch.
    pub queues: Vec<QueueEntry>,
    /// Fetch outcome; `None` when login failed.
    pub fetch: Option<Outcome>,
    /// Logout outcome; `None` when login failed.
    pub logout: Option<Outcome>,
}

impl SiteReport {
    fn login_failed(identifier: &str, login: Outcome) -> Self {
        Self {
            identifier: identifier.to_string(),
            login,
            queues: Vec::new(),
            fetch: None,
            logout: None,
        }
    }

    /// Whether every attempted phase of the run succeeded.
    pub fn succeeded(&self) -> bool {
        self.login.is_success()
            && self.fetch.as_ref().is_some_and(Outcome::is_success)
            && self.logout.as_ref().is_some_and(Outcome::is_success)
    }
}

// ---------------------------------------------------------------------------
// SiteRunner
// ---------------------------------------------------------------------------

/// Drives login → fetch → logout cycles over a [`SiteStore`].
pub struct SiteRunner<S> {
    store: S,
    http: reqwest::Client,
}

impl<S: SiteStore> SiteRunner<S> {
    /// Creates a runner over the given store.
    ///
    /// A single HTTP connection pool with a uniform 10 s timeout is shared
    /// across sites; per-site headers and tokens live on the
    /// [`MomentumClient`] built inside each run.
    pub fn new(store: S) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(QueuePilotError::Http)?;
        Ok(Self { store, http })
    }

    /// Runs one full cycle for a single site.
    ///
    /// Resolution, client-construction, or login failures are terminal for
    /// the site: no fetch or logout is attempted, since no session exists.
    /// Once the wire login has succeeded, logout is always attempted, even
    /// when the status fetch failed or the issued token could not be
    /// attached. All failures land in the returned [`SiteReport`]; this
    /// method itself never errors.
    pub async fn run_one(&self, identifier: &str, customer_id: u32) -> SiteReport {
        tracing::debug!(site = identifier, customer_id, "starting site run");

        let config = match self.store.site(identifier) {
            Ok(config) => config,
            Err(e) => return SiteReport::login_failed(identifier, Outcome::failed(&e)),
        };
        let credential = match self.store.credential(identifier, customer_id) {
            Ok(credential) => credential,
            Err(e) => return SiteReport::login_failed(identifier, Outcome::failed(&e)),
        };

        // Build the session client before logging in, so a bad tenant key
        // fails the run without opening a session that never gets closed.
        let mut client = match self.build_client(&config) {
            Ok(client) => client,
            Err(e) => return SiteReport::login_failed(identifier, Outcome::failed(&e)),
        };

        let token = match auth::login(
            &self.http,
            &credential.username,
            &credential.password,
            identifier,
            &config.base_url,
        )
        .await
        {
            Ok(Some(token)) => token,
            Ok(None) => {
                let err = anyhow::Error::new(QueuePilotError::AuthenticationFailed {
                    site: identifier.to_string(),
                    detail: "no access token issued".to_string(),
                });
                return SiteReport::login_failed(identifier, Outcome::failed(&err));
            }
            Err(e) => return SiteReport::login_failed(identifier, Outcome::failed(&e)),
        };

        // The login itself succeeded; from here on the session must be
        // closed, so every failure is recorded in its own phase and the run
        // still proceeds to logout.
        let mut queues = Vec::new();
        let fetch = match client.set_token(&token) {
            Ok(()) => match auth::fetch_queue_status(&client).await {
                Ok(entries) => {
                    queues = entries;
                    Outcome::Success
                }
                Err(e) => {
                    tracing::warn!(site = identifier, error = %e, "queue status fetch failed");
                    Outcome::failed(&e)
                }
            },
            Err(e) => {
                tracing::warn!(site = identifier, error = %e, "issued token is unusable");
                Outcome::failed(&e)
            }
        };

        // Always attempt to close the session, even after a failed fetch.
        let logout = match auth::logout(&client, identifier).await {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::failed(&e),
        };

        SiteReport {
            identifier: identifier.to_string(),
            login: Outcome::Success,
            queues,
            fetch: Some(fetch),
            logout: Some(logout),
        }
    }

    /// Runs every configured site sequentially, isolating failures per site.
    ///
    /// # Errors
    ///
    /// Errors only when the identifier set itself cannot be obtained
    /// ([`QueuePilotError::NoSites`]); individual site failures are carried
    /// in their reports.
    pub async fn run_all(&self, customer_id: u32) -> Result<Vec<SiteReport>> {
        let identifiers = self.store.site_identifiers()?;

        let mut reports = Vec::with_capacity(identifiers.len());
        for identifier in &identifiers {
            reports.push(self.run_one(identifier, customer_id).await);
        }
        Ok(reports)
    }

    fn build_client(&self, config: &crate::store::SiteConfig) -> Result<MomentumClient> {
        let mut client = MomentumClient::new(self.http.clone(), &config.base_url, &config.api_key)?;
        if let Some(device_key) = &config.device_key {
            client = client.with_device_key(device_key)?;
        }
        Ok(client)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
