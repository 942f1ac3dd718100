//! Error types for QueuePilot
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling. Each variant maps to one
//! phase of a site run so the runner and the reporting layer can branch on
//! the kind of failure instead of matching on message text.

use thiserror::Error;

/// Main error type for QueuePilot operations
///
/// This enum encompasses all possible errors that can occur during
/// site/credential resolution, the Momentum login flow, queue-status
/// retrieval, and logout.
#[derive(Error, Debug)]
pub enum QueuePilotError {
    /// Unknown site identifier (no matching site configuration)
    #[error("unknown site: {0}")]
    ConfigNotFound(String),

    /// No active credential for the given site and customer
    #[error("no active credential for customer {customer_id} on site {site}")]
    CredentialNotFound {
        /// The site identifier that was looked up
        site: String,
        /// The customer id that was looked up
        customer_id: u32,
    },

    /// The site store holds no site entries at all (bulk-run mode)
    #[error("no sites configured")]
    NoSites,

    /// Network or timeout failure contacting an endpoint
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body not parseable as the expected JSON shape
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Well-formed login response lacking a `completed.accessToken`
    #[error("authentication failed for site {site}: {detail}")]
    AuthenticationFailed {
        /// The site identifier the login was attempted against
        site: String,
        /// Human-readable detail (never includes the password)
        detail: String,
    },

    /// Non-200 from the queue-status endpoint
    #[error("status fetch failed ({status}): {body}")]
    StatusFetch {
        /// HTTP status code returned by the endpoint
        status: u16,
        /// Raw response body, recorded for visibility
        body: String,
    },

    /// Non-200 from the logout endpoint (recorded, never escalated)
    #[error("logout failed ({status}): {body}")]
    LogoutFailed {
        /// HTTP status code returned by the endpoint
        status: u16,
        /// Raw response body, recorded for visibility
        body: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl QueuePilotError {
    /// Stable short label for the error kind, used in per-site reports.
    ///
    /// The reporting sink branches on these labels ("bad credentials" vs
    /// "infrastructure problem"), so they are part of the output contract.
    pub fn kind(&self) -> &'static str {
        match self {
            QueuePilotError::ConfigNotFound(_) => "config",
            QueuePilotError::CredentialNotFound { .. } => "credentials",
            QueuePilotError::NoSites => "sites",
            QueuePilotError::Transport(_) => "transport",
            QueuePilotError::Protocol(_) => "protocol",
            QueuePilotError::AuthenticationFailed { .. } => "authentication",
            QueuePilotError::StatusFetch { .. } => "status",
            QueuePilotError::LogoutFailed { .. } => "logout",
            QueuePilotError::Io(_) => "io",
            QueuePilotError::Serialization(_) => "serialization",
            QueuePilotError::Yaml(_) => "yaml",
            QueuePilotError::Http(_) => "http",
        }
    }
}

/// Result type alias for QueuePilot operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_display() {
        let error = QueuePilotError::ConfigNotFound("kbab".to_string());
        assert_eq!(error.to_string(), "unknown site: kbab");
        assert_eq!(error.kind(), "config");
    }

    #[test]
    fn test_credential_not_found_display() {
        let error = QueuePilotError::CredentialNotFound {
            site: "kbab".to_string(),
            customer_id: 1,
        };
        assert_eq!(
            error.to_string(),
            "no active credential for customer 1 on site kbab"
        );
        assert_eq!(error.kind(), "credentials");
    }

    #[test]
    fn test_no_sites_display() {
        let error = QueuePilotError::NoSites;
        assert_eq!(error.to_string(), "no sites configured");
        assert_eq!(error.kind(), "sites");
    }

    #[test]
    fn test_transport_error_display() {
        let error = QueuePilotError::Transport("connection refused".to_string());
        assert_eq!(error.to_string(), "transport error: connection refused");
        assert_eq!(error.kind(), "transport");
    }

    #[test]
    fn test_protocol_error_display() {
        let error = QueuePilotError::Protocol("body is not JSON".to_string());
        assert_eq!(error.to_string(), "protocol error: body is not JSON");
        assert_eq!(error.kind(), "protocol");
    }

    #[test]
    fn test_authentication_failed_display() {
        let error = QueuePilotError::AuthenticationFailed {
            site: "kbab".to_string(),
            detail: "no access token issued".to_string(),
        };
        assert!(error.to_string().contains("kbab"));
        assert!(error.to_string().contains("no access token issued"));
        assert_eq!(error.kind(), "authentication");
    }

    #[test]
    fn test_status_fetch_display() {
        let error = QueuePilotError::StatusFetch {
            status: 500,
            body: "internal error".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "status fetch failed (500): internal error"
        );
        assert_eq!(error.kind(), "status");
    }

    #[test]
    fn test_logout_failed_display() {
        let error = QueuePilotError::LogoutFailed {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(error.to_string(), "logout failed (403): forbidden");
        assert_eq!(error.kind(), "logout");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: QueuePilotError = io_error.into();
        assert!(matches!(error, QueuePilotError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: QueuePilotError = json_error.into();
        assert!(matches!(error, QueuePilotError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: QueuePilotError = yaml_error.into();
        assert!(matches!(error, QueuePilotError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueuePilotError>();
    }
}
