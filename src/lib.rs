//! QueuePilot - housing queue point checker library
//!
//! This library automates retrieval of queue points from Momentum-based
//! Swedish housing queue portals: for each configured site it logs in with
//! stored credentials, fetches the applicant's current queue standing, and
//! logs out.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `momentum`: the protocol client (per-site HTTP session, PKCE challenge
//!   generation, login/status/logout flow)
//! - `store`: site and credential resolution behind the `SiteStore` trait
//! - `runner`: the per-site login → fetch → logout orchestration
//! - `error`: error types and result aliases
//! - `cli` / `commands`: command-line interface and handlers

pub mod cli;
pub mod commands;
pub mod error;
pub mod momentum;
pub mod runner;
pub mod store;

// Re-export commonly used types
pub use error::{QueuePilotError, Result};
pub use momentum::{MomentumClient, QueueEntry};
pub use runner::{Outcome, SiteReport, SiteRunner};
pub use store::{Credential, FileStore, SiteConfig, SiteStore};
