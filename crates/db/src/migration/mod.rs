//! Database migrations.
//!
//! The schema is a single raw-SQL migration; later changes are added as new
//! `mYYYYMMDD_NNNNNN_*` modules and appended to [`Migrator::migrations`].

pub use sea_orm_migration::prelude::*;

mod m20260108_000001_initial;

/// Migrator for the bookkeeping schema.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260108_000001_initial::Migration)]
    }
}
