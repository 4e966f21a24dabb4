use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use tracing::{debug, error, info, trace};

/// Path of the database file behind a `sqlite://` URL, if it names one.
fn sqlite_file(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Creates the parent directory of a SQLite database file and makes sure
/// SQLite may create the file itself.
fn prepare_sqlite_url(database_url: &str) -> Result<String> {
    let Some(file) = sqlite_file(database_url) else {
        return Ok(database_url.to_string());
    };

    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        debug!("Ensured database directory {}", parent.display());
    }

    if database_url.contains("mode=") {
        Ok(database_url.to_string())
    } else if database_url.contains('?') {
        Ok(format!("{}&mode=rwc", database_url))
    } else {
        Ok(format!("{}?mode=rwc", database_url))
    }
}

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");
    debug!("Database URL: {}", database_url);

    let database_url = prepare_sqlite_url(database_url)?;

    let db: DatabaseConnection = match Database::connect(&database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    info!("Running database migrations");
    match Migrator::up(&db, None).await {
        Ok(_) => {
            info!("Database migrations completed successfully");
        }
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            return Err(e.into());
        }
    }

    info!("Database initialization completed successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_sqlite_url() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:").unwrap(), "sqlite::memory:");
        assert_eq!(
            prepare_sqlite_url("postgresql://u:p@localhost/wla").unwrap(),
            "postgresql://u:p@localhost/wla"
        );

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("wla.sqlite");
        let url = format!("sqlite://{}", file.display());

        assert_eq!(prepare_sqlite_url(&url).unwrap(), format!("{}?mode=rwc", url));
        assert!(file.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_init_database_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("wla.sqlite");

        init_database(&format!("sqlite://{}", file.display())).await.unwrap();
        assert!(file.exists());
    }
}
