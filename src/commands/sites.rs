//! The `sites` command: list configured site identifiers

use crate::error::Result;
use crate::store::{FileStore, SiteStore as _};

/// Prints every configured site identifier, one per line.
pub fn list_sites(store: &FileStore) -> Result<()> {
    for identifier in store.site_identifiers()? {
        println!("{identifier}");
    }
    Ok(())
}
