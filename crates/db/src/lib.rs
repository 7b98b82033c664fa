//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories for the chart of accounts, fiscal years, journals and treasury
//! - The raw-SQL schema migration

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    CheckRepository, CodeRepository, DetailLevelRepository, DetailRepository, DocumentRepository,
    FiscalYearRepository, JournalRepository, MappingResolver, RepoError, RepoResult,
    TreasuryResourceRepository,
};

use daftar_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
