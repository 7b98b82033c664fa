//! Database seeder for Daftar development and testing.
//!
//! Seeds a minimal chart of accounts, the treasury account mappings in the
//! settings table, an open fiscal year for the current calendar year and a
//! main cashbox. Every step is idempotent.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use daftar_core::fiscal::FiscalError;
use daftar_core::taxonomy::CodePayload;
use daftar_core::treasury::MappingKey;
use daftar_db::{
    CodeRepository, FiscalYearRepository, RepoError, TreasuryResourceRepository,
    entities::{codes, settings},
    repositories::{CashboxInput, CreateFiscalYearInput},
};
use daftar_shared::config::DatabaseConfig;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};
use uuid::Uuid;

/// One row of the seeded chart: code, title, kind, parent code, nature, details.
type ChartRow = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    &'static str,
    bool,
);

const CHART: &[ChartRow] = &[
    ("11", "Current assets", "group", None, "debit", false),
    ("1101", "Cash and banks", "general", Some("11"), "debit", false),
    ("110101", "Cash on hand", "specific", Some("1101"), "debit", true),
    ("110102", "Bank accounts", "specific", Some("1101"), "debit", true),
    ("110103", "Card settlements", "specific", Some("1101"), "debit", true),
    ("1102", "Notes receivable", "general", Some("11"), "debit", false),
    ("110201", "Checks receivable", "specific", Some("1102"), "debit", true),
    ("1103", "Accounts receivable", "general", Some("11"), "debit", false),
    ("110301", "Customers", "specific", Some("1103"), "debit", true),
    ("21", "Current liabilities", "group", None, "credit", false),
    ("2101", "Notes payable", "general", Some("21"), "credit", false),
    ("210101", "Checks payable", "specific", Some("2101"), "credit", true),
    ("2102", "Accounts payable", "general", Some("21"), "credit", false),
    ("210201", "Suppliers", "specific", Some("2102"), "credit", true),
    ("31", "Equity", "group", None, "credit", false),
    ("3101", "Capital", "general", Some("31"), "credit", false),
    ("310101", "Owner capital", "specific", Some("3101"), "credit", true),
];

const MAPPINGS: &[(MappingKey, &str)] = &[
    (MappingKey::ReceiptCash, "110101"),
    (MappingKey::ReceiptTransfer, "110102"),
    (MappingKey::ReceiptCard, "110103"),
    (MappingKey::ReceiptCheck, "110201"),
    (MappingKey::ReceiptCounterparty, "110301"),
    (MappingKey::PaymentCash, "110101"),
    (MappingKey::PaymentTransfer, "110102"),
    (MappingKey::PaymentCard, "110103"),
    (MappingKey::PaymentCheck, "210101"),
    (MappingKey::PaymentCounterparty, "210201"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info,daftar=info".into()),
        )
        .init();

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = daftar_db::connect(&DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 1,
    })
    .await
    .context("failed to connect to database")?;

    seed_chart(&db).await?;
    seed_mappings(&db).await?;
    seed_fiscal_year(&db).await?;
    seed_cashbox(&db).await?;

    info!("Seeding complete");
    Ok(())
}

async fn find_code(db: &DatabaseConnection, code: &str) -> anyhow::Result<Option<codes::Model>> {
    Ok(codes::Entity::find()
        .filter(codes::Column::Code.eq(code))
        .one(db)
        .await?)
}

/// Creates missing chart rows; parents precede children in [`CHART`].
async fn seed_chart(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = CodeRepository::new(db.clone());
    let mut created = 0_usize;

    for &(code, title, kind, parent, nature, can_have_details) in CHART {
        if find_code(db, code).await?.is_some() {
            continue;
        }

        let parent_id = match parent {
            Some(parent_code) => Some(
                find_code(db, parent_code)
                    .await?
                    .with_context(|| format!("parent {parent_code} of {code} is missing"))?
                    .id,
            ),
            None => None,
        };

        repo.create(CodePayload {
            code: code.to_string(),
            title: title.to_string(),
            kind: kind.to_string(),
            parent_id,
            nature: Some(nature.to_string()),
            is_active: Some(true),
            can_have_details: Some(can_have_details),
        })
        .await
        .with_context(|| format!("failed to create code {code}"))?;
        created += 1;
    }

    info!(created, total = CHART.len(), "Chart of accounts seeded");
    Ok(())
}

/// Points every mapping key without a settings row at its seeded code.
async fn seed_mappings(db: &DatabaseConnection) -> anyhow::Result<()> {
    for &(key, code) in MAPPINGS {
        let existing = settings::Entity::find()
            .filter(settings::Column::Code.eq(key.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            continue;
        }

        let target = find_code(db, code)
            .await?
            .with_context(|| format!("mapped code {code} is missing"))?;
        let now = Utc::now().into();
        settings::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(key.as_str().to_string()),
            special_id: Set(Some(target.id)),
            value: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        info!(key = %key, code, "Mapping seeded");
    }
    Ok(())
}

async fn seed_fiscal_year(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = FiscalYearRepository::new(db.clone());
    match repo.current().await {
        Ok(year) => {
            info!(fiscal_year_id = %year.id, "Open fiscal year exists");
            return Ok(());
        }
        Err(RepoError::Fiscal(FiscalError::NoOpenYear)) => {}
        Err(e) => return Err(e.into()),
    }

    let year = Utc::now().year();
    let start_date = NaiveDate::from_ymd_opt(year, 1, 1).context("invalid start date")?;
    let end_date = NaiveDate::from_ymd_opt(year, 12, 31).context("invalid end date")?;

    match repo
        .create(CreateFiscalYearInput {
            name: None,
            start_date,
            end_date,
            open: true,
        })
        .await
    {
        Ok(created) => info!(fiscal_year_id = %created.id, year, "Fiscal year seeded"),
        Err(RepoError::Fiscal(FiscalError::OverlappingYear(_))) => {
            warn!(year, "A closed fiscal year already covers this year; open it manually");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn seed_cashbox(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = TreasuryResourceRepository::new(db.clone());
    if !repo.list_cashboxes().await?.is_empty() {
        return Ok(());
    }
    let cashbox = repo
        .create_cashbox(CashboxInput {
            title: "Main cashbox".to_string(),
        })
        .await?;
    info!(cashbox_id = %cashbox.id, "Cashbox seeded");
    Ok(())
}
