use anyhow::Result;
use tracing::{error, info, trace};

use crate::config::connect_and_migrate;

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");

    if let Some(parent) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(parent)?;
    }

    match connect_and_migrate(database_url).await {
        Ok(_) => {
            info!("Database initialization completed successfully!");
            Ok(())
        }
        Err(e) => {
            error!("Failed to initialize database '{}': {}", database_url, e);
            Err(e)
        }
    }
}

/// Parent directory of a file based SQLite URL, if it has one.
fn sqlite_parent_dir(database_url: &str) -> Option<&std::path::Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    std::path::Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}
