//! Command-line interface definition for QueuePilot
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for running site checks and listing configured sites.

use clap::{Parser, Subcommand};

use crate::store::DEFAULT_CUSTOMER_ID;

/// QueuePilot - housing queue point checker
///
/// Logs in to Momentum-based housing queue portals with stored credentials,
/// retrieves the applicant's current queue points, and logs out.
#[derive(Parser, Debug, Clone)]
#[command(name = "queuepilot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the site/credential store file
    #[arg(short, long, default_value = "config/sites.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for QueuePilot
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the login and queue point check for a site
    Run {
        /// Which site to run (a site identifier such as 'kbab', or 'all')
        #[arg(short, long)]
        site: String,

        /// Which stored credential set to use
        #[arg(long, default_value_t = DEFAULT_CUSTOMER_ID)]
        customer: u32,
    },

    /// List configured site identifiers
    Sites,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
