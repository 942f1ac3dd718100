//! The `run` command: one site or all configured sites

use colored::Colorize as _;

use crate::error::Result;
use crate::runner::{Outcome, SiteReport, SiteRunner};
use crate::store::FileStore;

/// Executes the login → fetch → logout cycle for `site` (or `"all"`) and
/// renders each site's report to the console.
///
/// # Errors
///
/// In `all` mode, errors only when the set of configured identifiers cannot
/// be obtained; individual site failures are rendered and isolated. When a
/// single site is named, its failure is propagated so the process exits
/// non-zero (an unknown identifier is a user-visible error).
pub async fn run_sites(store: FileStore, site: &str, customer: u32) -> Result<()> {
    let runner = SiteRunner::new(store)?;

    if site == "all" {
        let reports = runner.run_all(customer).await?;
        for report in &reports {
            render_report(report);
        }
        let failed = reports.iter().filter(|r| !r.succeeded()).count();
        tracing::info!(
            total = reports.len(),
            failed,
            "finished run over all configured sites"
        );
        Ok(())
    } else {
        let report = runner.run_one(site, customer).await;
        render_report(&report);
        if let Outcome::Failed { kind, detail } = &report.login {
            anyhow::bail!("{site}: login failed ({kind}): {detail}");
        }
        Ok(())
    }
}

/// Prints one site's report as line-oriented status text.
fn render_report(report: &SiteReport) {
    let site = &report.identifier;

    match &report.login {
        Outcome::Success => println!("{site}: login {}", "ok".green()),
        Outcome::Failed { kind, detail } => {
            println!("{site}: login {} ({kind}): {detail}", "failed".red());
            return;
        }
    }

    match &report.fetch {
        Some(Outcome::Success) => {
            if report.queues.is_empty() {
                println!("{site}: no queues registered");
            } else {
                for entry in &report.queues {
                    println!(" - {entry}");
                }
            }
        }
        Some(Outcome::Failed { kind, detail }) => {
            println!("{site}: fetch {} ({kind}): {detail}", "failed".red());
        }
        None => {}
    }

    match &report.logout {
        Some(Outcome::Success) => println!("{site}: logout {}", "ok".green()),
        Some(Outcome::Failed { kind, detail }) => {
            println!("{site}: logout {} ({kind}): {detail}", "failed".yellow());
        }
        None => {}
    }
}
