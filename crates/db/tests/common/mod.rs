//! Shared setup for database integration tests.
//!
//! Tests run against `DATABASE_URL` and are skipped when it is unset.
//! Rows are created with random far-future dates and unique code strings so
//! repeated runs against the same database do not collide.

#![allow(dead_code)]

use chrono::NaiveDate;
use daftar_core::taxonomy::CodePayload;
use daftar_db::{
    CodeRepository, DetailRepository, FiscalYearRepository, RepoError,
    entities::{codes, details, fiscal_years},
    migration::Migrator,
    repositories::{CreateFiscalYearInput, DetailInput},
};
use daftar_core::{fiscal::FiscalError, taxonomy::TaxonomyError};
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use sea_orm_migration::MigratorTrait;
use std::sync::OnceLock;
use tokio::sync::Mutex;
use uuid::Uuid;

static MIGRATED: OnceLock<Mutex<bool>> = OnceLock::new();

/// Connects and migrates once per test binary. `None` when `DATABASE_URL`
/// is unset.
pub async fn connect() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    let db = Database::connect(&url).await.expect("Failed to connect to database");

    let mut migrated = MIGRATED.get_or_init(|| Mutex::new(false)).lock().await;
    if !*migrated {
        Migrator::up(&db, None).await.expect("Failed to run migrations");
        *migrated = true;
    }
    Some(db)
}

/// Eight random hex characters.
pub fn suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// A random year in 3000..8000, leaving the following year free for
/// `open_next`.
fn random_base_year() -> i32 {
    let n = i32::try_from(Uuid::new_v4().as_u128() % 2500).unwrap();
    3000 + n * 2
}

/// Creates a closed calendar year that does not overlap existing years.
pub async fn fresh_year(db: &DatabaseConnection) -> fiscal_years::Model {
    let repo = FiscalYearRepository::new(db.clone());
    for _ in 0..20 {
        let year = random_base_year();
        let result = repo
            .create(CreateFiscalYearInput {
                name: None,
                start_date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
                open: false,
            })
            .await;
        match result {
            Ok(created) => return created,
            Err(RepoError::Fiscal(FiscalError::OverlappingYear(_))) => {}
            Err(other) => panic!("Failed to create fiscal year: {other}"),
        }
    }
    panic!("No free fiscal year found");
}

async fn find_code(db: &DatabaseConnection, code: &str) -> Option<codes::Model> {
    codes::Entity::find()
        .filter(codes::Column::Code.eq(code))
        .one(db)
        .await
        .unwrap()
}

/// The shared test group `99`, created on first use.
pub async fn test_group(db: &DatabaseConnection) -> codes::Model {
    if let Some(group) = find_code(db, "99").await {
        return group;
    }
    let created = CodeRepository::new(db.clone())
        .create(CodePayload {
            code: "99".into(),
            title: "Integration tests".into(),
            kind: "group".into(),
            ..CodePayload::default()
        })
        .await;
    match created {
        Ok(group) => group,
        Err(RepoError::Taxonomy(TaxonomyError::DuplicateCode(_))) => {
            find_code(db, "99").await.unwrap()
        }
        Err(other) => panic!("Failed to create test group: {other}"),
    }
}

/// A fresh specific code under a fresh general code.
pub async fn specific_code(db: &DatabaseConnection, title: &str) -> codes::Model {
    let repo = CodeRepository::new(db.clone());
    let group = test_group(db).await;
    let tag = suffix();
    let general = repo
        .create(CodePayload {
            code: format!("99G{tag}"),
            title: format!("{title} (general)"),
            kind: "general".into(),
            parent_id: Some(group.id),
            ..CodePayload::default()
        })
        .await
        .unwrap();
    repo.create(CodePayload {
        code: format!("99S{tag}"),
        title: title.into(),
        kind: "specific".into(),
        parent_id: Some(general.id),
        can_have_details: Some(true),
        ..CodePayload::default()
    })
    .await
    .unwrap()
}

/// A fresh user-managed detail with an allocated code.
pub async fn detail(db: &DatabaseConnection, title: &str) -> details::Model {
    DetailRepository::new(db.clone())
        .create(DetailInput {
            code: None,
            title: title.into(),
            is_active: None,
        })
        .await
        .unwrap()
}

/// `YYYY-MM-DD` inside `year`.
pub fn date_in(year: &fiscal_years::Model, month: u32, day: u32) -> NaiveDate {
    use chrono::Datelike;
    NaiveDate::from_ymd_opt(year.start_date.year(), month, day).unwrap()
}
