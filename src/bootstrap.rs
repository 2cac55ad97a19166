//! Service wiring.
//!
//! Picks the storage backend from the configuration and builds the link
//! service on top of it.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

use crate::application::services::DynLinkService;
use crate::config::Config;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::{MemoryLinkRepository, PgLinkRepository};

/// Opens the configured repository.
///
/// With `DATABASE_URL` set this connects to PostgreSQL and applies pending
/// migrations. Otherwise links live in memory, replayed from and appended
/// to the log file when one is configured.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Migrations fail
/// - The link log cannot be read or opened
pub async fn open_repository(config: &Config) -> Result<Arc<dyn LinkRepository>> {
    if let Some(database_url) = &config.database_url {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to migrate")?;

        return Ok(Arc::new(PgLinkRepository::new(Arc::new(pool))));
    }

    match &config.file_storage_path {
        Some(path) => {
            let repository = MemoryLinkRepository::open(path)
                .with_context(|| format!("Failed to open link log {path}"))?;
            Ok(Arc::new(repository))
        }
        None => {
            tracing::info!("Links are kept in memory only");
            Ok(Arc::new(MemoryLinkRepository::new()))
        }
    }
}

/// Builds the link service and starts its deletion pipeline.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or the service
/// settings are rejected.
pub async fn build_link_service(config: &Config) -> Result<DynLinkService> {
    let repository = open_repository(config).await?;

    let service = DynLinkService::new(repository, config.link_service_settings())
        .context("Invalid link service settings")?;

    Ok(service)
}
