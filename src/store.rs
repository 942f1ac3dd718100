//! Site and credential store
//!
//! Sites and credentials live outside the core: the runner only sees the
//! [`SiteStore`] trait. The shipped implementation is [`FileStore`], a YAML
//! file mapping site identifiers to their tenant configuration plus a list
//! of per-customer credentials. Registering a new tenant is a data edit to
//! that file, not a code change.
//!
//! ```yaml
//! sites:
//!   kbab:
//!     base_url: https://kbab-fastighet.momentum.se/Prod/Kar/PmApi/v2
//!     api_key: pJnK...
//!     device_key: abc123   # optional
//! credentials:
//!   - site: kbab
//!     customer_id: 1
//!     username: someone@example.se
//!     password: hunter2
//!     active: true
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QueuePilotError, Result};

/// Customer id used when the caller does not name one.
pub const DEFAULT_CUSTOMER_ID: u32 = 1;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Tenant configuration for one Momentum site. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// URL-safe slug identifying the tenant (e.g. `kbab`). Filled from the
    /// map key on load, so it is not repeated inside each entry.
    #[serde(default, skip_serializing)]
    pub identifier: String,

    /// API root for this tenant.
    pub base_url: String,

    /// Static tenant credential sent as `x-api-key`.
    pub api_key: String,

    /// Optional static device key some tenants require.
    #[serde(default)]
    pub device_key: Option<String>,
}

/// Stored login credential for one customer on one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Site identifier this credential belongs to.
    pub site: String,

    /// Which of possibly several credential sets to use for the site.
    #[serde(default = "default_customer_id")]
    pub customer_id: u32,

    /// Login username.
    pub username: String,

    /// Login password.
    pub password: String,

    /// Only active credentials are eligible for a run.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_customer_id() -> u32 {
    DEFAULT_CUSTOMER_ID
}

fn default_active() -> bool {
    true
}

// ---------------------------------------------------------------------------
// SiteStore trait
// ---------------------------------------------------------------------------

/// Lookup seam over the external site/credential store.
///
/// Contract: lookups fail with a typed not-found error rather than returning
/// empty values silently, so the runner can abort a site's run before any
/// network call.
pub trait SiteStore {
    /// Resolves a site identifier to its tenant configuration.
    ///
    /// # Errors
    ///
    /// [`QueuePilotError::ConfigNotFound`] when no site matches.
    fn site(&self, identifier: &str) -> Result<SiteConfig>;

    /// Resolves the active credential for a site and customer.
    ///
    /// # Errors
    ///
    /// [`QueuePilotError::CredentialNotFound`] when no row matches or the
    /// matched row is inactive.
    fn credential(&self, identifier: &str, customer_id: u32) -> Result<Credential>;

    /// All configured site identifiers, in stable order.
    ///
    /// # Errors
    ///
    /// [`QueuePilotError::NoSites`] when the store holds no sites.
    fn site_identifiers(&self) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct StoreFile {
    #[serde(default)]
    sites: BTreeMap<String, SiteConfig>,
    #[serde(default)]
    credentials: Vec<Credential>,
}

/// YAML-file-backed [`SiteStore`].
#[derive(Debug, Default)]
pub struct FileStore {
    sites: BTreeMap<String, SiteConfig>,
    credentials: Vec<Credential>,
}

impl FileStore {
    /// Loads and validates the store from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, is not valid YAML, or
    /// fails validation (empty api key, unparseable base URL, credential
    /// referencing an unknown site).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            QueuePilotError::Io(std::io::Error::new(
                e.kind(),
                format!("reading site store {}: {e}", path.display()),
            ))
        })?;
        Self::from_yaml(&raw)
    }

    /// Parses and validates the store from a YAML string.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let file: StoreFile = serde_yaml::from_str(raw).map_err(QueuePilotError::Yaml)?;

        let mut sites = file.sites;
        for (identifier, config) in sites.iter_mut() {
            config.identifier = identifier.clone();
        }

        let store = Self {
            sites,
            credentials: file.credentials,
        };
        store.validate()?;
        Ok(store)
    }

    /// Builds a store from already-resolved records, mainly for tests.
    pub fn from_records(sites: Vec<SiteConfig>, credentials: Vec<Credential>) -> Self {
        Self {
            sites: sites
                .into_iter()
                .map(|s| (s.identifier.clone(), s))
                .collect(),
            credentials,
        }
    }

    fn validate(&self) -> Result<()> {
        for (identifier, config) in &self.sites {
            url::Url::parse(&config.base_url).map_err(|e| {
                QueuePilotError::Protocol(format!(
                    "site {identifier} has an invalid base_url ({e}): {}",
                    config.base_url
                ))
            })?;
            if config.api_key.is_empty() {
                return Err(
                    QueuePilotError::Protocol(format!("site {identifier} has an empty api_key"))
                        .into(),
                );
            }
            // Keys travel as HTTP headers; reject values the client could
            // never send instead of failing mid-run.
            if reqwest::header::HeaderValue::from_str(&config.api_key).is_err() {
                return Err(QueuePilotError::Protocol(format!(
                    "site {identifier} has an api_key that is not a valid header value"
                ))
                .into());
            }
            if let Some(device_key) = &config.device_key {
                if reqwest::header::HeaderValue::from_str(device_key).is_err() {
                    return Err(QueuePilotError::Protocol(format!(
                        "site {identifier} has a device_key that is not a valid header value"
                    ))
                    .into());
                }
            }
        }
        for credential in &self.credentials {
            if !self.sites.contains_key(&credential.site) {
                return Err(QueuePilotError::ConfigNotFound(credential.site.clone()).into());
            }
        }
        Ok(())
    }
}

impl SiteStore for FileStore {
    fn site(&self, identifier: &str) -> Result<SiteConfig> {
        self.sites
            .get(identifier)
            .cloned()
            .ok_or_else(|| QueuePilotError::ConfigNotFound(identifier.to_string()).into())
    }

    fn credential(&self, identifier: &str, customer_id: u32) -> Result<Credential> {
        self.credentials
            .iter()
            .find(|c| c.site == identifier && c.customer_id == customer_id && c.active)
            .cloned()
            .ok_or_else(|| {
                QueuePilotError::CredentialNotFound {
                    site: identifier.to_string(),
                    customer_id,
                }
                .into()
            })
    }

    fn site_identifiers(&self) -> Result<Vec<String>> {
        if self.sites.is_empty() {
            return Err(QueuePilotError::NoSites.into());
        }
        // BTreeMap keys are already sorted.
        Ok(self.sites.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
