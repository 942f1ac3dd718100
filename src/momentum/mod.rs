//! Momentum protocol client
//!
//! Everything needed to talk to one Momentum tenant: the per-site HTTP
//! session ([`client`]), PKCE challenge generation ([`pkce`]), and the
//! login/status/logout lifecycle ([`auth`]).

pub mod auth;
pub mod client;
pub mod pkce;

pub use auth::{fetch_queue_status, login, logout, QueueEntry};
pub use client::MomentumClient;
pub use pkce::PkceChallenge;
