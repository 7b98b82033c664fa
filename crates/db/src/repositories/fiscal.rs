//! Fiscal year repository.
//!
//! At most one year is open. Opening a year closes every other year in the
//! same transaction; the partial unique index `uq_fiscal_years_single_open`
//! turns a concurrent open into an error instead of a second open year.

use chrono::{NaiveDate, Utc};
use daftar_core::fiscal::{FiscalError, FiscalService, FiscalYear};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};
use serde::Deserialize;
use uuid::Uuid;

use super::error::{RepoResult, on_unique};
use crate::entities::{fiscal_years, invoices, journals, payments, receipts};

impl From<&fiscal_years::Model> for FiscalYear {
    fn from(model: &fiscal_years::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            start_date: model.start_date,
            end_date: model.end_date,
            is_closed: model.is_closed,
        }
    }
}

/// Input for creating a fiscal year.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFiscalYearInput {
    /// Display name; defaults to the start year.
    pub name: Option<String>,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Open the new year exclusively.
    #[serde(default)]
    pub open: bool,
}

/// Input for updating a fiscal year.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFiscalYearInput {
    /// New name.
    pub name: Option<String>,
    /// New first day; only allowed while unreferenced.
    pub start_date: Option<NaiveDate>,
    /// New last day; only allowed while unreferenced.
    pub end_date: Option<NaiveDate>,
}

/// Returns the given year, or the open one when `id` is `None`.
pub(crate) async fn resolve_year<C: ConnectionTrait>(
    conn: &C,
    id: Option<Uuid>,
) -> RepoResult<fiscal_years::Model> {
    match id {
        Some(id) => Ok(fiscal_years::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(FiscalError::YearNotFound(id))?),
        None => Ok(fiscal_years::Entity::find()
            .filter(fiscal_years::Column::IsClosed.eq(false))
            .one(conn)
            .await?
            .ok_or(FiscalError::NoOpenYear)?),
    }
}

/// True when journals, invoices, receipts or payments reference the year.
async fn is_referenced<C: ConnectionTrait>(conn: &C, id: Uuid) -> RepoResult<bool> {
    let journals = journals::Entity::find()
        .filter(journals::Column::FiscalYearId.eq(id))
        .count(conn)
        .await?;
    if journals > 0 {
        return Ok(true);
    }
    let invoices = invoices::Entity::find()
        .filter(invoices::Column::FiscalYearId.eq(id))
        .count(conn)
        .await?;
    let receipts = receipts::Entity::find()
        .filter(receipts::Column::FiscalYearId.eq(id))
        .count(conn)
        .await?;
    let payments = payments::Entity::find()
        .filter(payments::Column::FiscalYearId.eq(id))
        .count(conn)
        .await?;
    Ok(invoices + receipts + payments > 0)
}

async fn find_overlap<C: ConnectionTrait>(
    conn: &C,
    start: NaiveDate,
    end: NaiveDate,
    exclude: Option<Uuid>,
) -> RepoResult<Option<fiscal_years::Model>> {
    let mut query = fiscal_years::Entity::find()
        .filter(fiscal_years::Column::StartDate.lte(end))
        .filter(fiscal_years::Column::EndDate.gte(start));
    if let Some(id) = exclude {
        query = query.filter(fiscal_years::Column::Id.ne(id));
    }
    Ok(query.one(conn).await?)
}

/// Closes every year except `id`, then opens `id`.
async fn open_exclusive(txn: &DatabaseTransaction, id: Uuid) -> RepoResult<()> {
    let now = Utc::now();
    fiscal_years::Entity::update_many()
        .col_expr(fiscal_years::Column::IsClosed, Expr::value(true))
        .col_expr(fiscal_years::Column::UpdatedAt, Expr::value(now))
        .filter(fiscal_years::Column::IsClosed.eq(false))
        .filter(fiscal_years::Column::Id.ne(id))
        .exec(txn)
        .await?;
    fiscal_years::Entity::update_many()
        .col_expr(fiscal_years::Column::IsClosed, Expr::value(false))
        .col_expr(fiscal_years::Column::UpdatedAt, Expr::value(now))
        .filter(fiscal_years::Column::Id.eq(id))
        .exec(txn)
        .await
        .map_err(|e| on_unique(e, "uq_fiscal_years_single_open", || FiscalError::OpenConflict(id)))?;
    Ok(())
}

/// Fiscal year repository.
#[derive(Debug, Clone)]
pub struct FiscalYearRepository {
    db: DatabaseConnection,
}

impl FiscalYearRepository {
    /// Creates a new fiscal year repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists years ordered by start date.
    pub async fn list(&self) -> RepoResult<Vec<fiscal_years::Model>> {
        Ok(fiscal_years::Entity::find()
            .order_by_asc(fiscal_years::Column::StartDate)
            .all(&self.db)
            .await?)
    }

    /// Finds a year by id.
    pub async fn get(&self, id: Uuid) -> RepoResult<fiscal_years::Model> {
        resolve_year(&self.db, Some(id)).await
    }

    /// Returns the open year.
    pub async fn current(&self) -> RepoResult<fiscal_years::Model> {
        resolve_year(&self.db, None).await
    }

    /// Creates a year, optionally opening it exclusively.
    pub async fn create(&self, input: CreateFiscalYearInput) -> RepoResult<fiscal_years::Model> {
        FiscalService::validate_range(input.start_date, input.end_date)?;

        let txn = self.db.begin().await?;
        if let Some(other) = find_overlap(&txn, input.start_date, input.end_date, None).await? {
            return Err(FiscalError::OverlappingYear(other.name).into());
        }

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FiscalService::default_name(input.start_date));
        let now = Utc::now().into();
        let created = fiscal_years::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            is_closed: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| on_unique(e, "uq_fiscal_years_start", || FiscalError::OverlappingYear(name)))?;

        if input.open {
            open_exclusive(&txn, created.id).await?;
        }
        let created = resolve_year(&txn, Some(created.id)).await?;
        txn.commit().await?;

        tracing::info!(
            fiscal_year_id = %created.id,
            start_date = %created.start_date,
            end_date = %created.end_date,
            open = input.open,
            "Fiscal year created"
        );
        Ok(created)
    }

    /// Renames a year and, while nothing references it, moves its range.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateFiscalYearInput,
    ) -> RepoResult<fiscal_years::Model> {
        let txn = self.db.begin().await?;
        let existing = resolve_year(&txn, Some(id)).await?;

        let start = input.start_date.unwrap_or(existing.start_date);
        let end = input.end_date.unwrap_or(existing.end_date);
        let range_changed = start != existing.start_date || end != existing.end_date;
        if range_changed {
            if is_referenced(&txn, id).await? {
                return Err(FiscalError::YearInUse(id).into());
            }
            FiscalService::validate_range(start, end)?;
            if let Some(other) = find_overlap(&txn, start, end, Some(id)).await? {
                return Err(FiscalError::OverlappingYear(other.name).into());
            }
        }

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| existing.name.clone());

        let mut active: fiscal_years::ActiveModel = existing.into();
        active.name = Set(name.clone());
        active.start_date = Set(start);
        active.end_date = Set(end);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| on_unique(e, "uq_fiscal_years_start", || FiscalError::OverlappingYear(name)))?;
        txn.commit().await?;

        tracing::info!(fiscal_year_id = %id, range_changed, "Fiscal year updated");
        Ok(updated)
    }

    /// Opens a year, closing all others. No-op when it is already open.
    pub async fn open(&self, id: Uuid) -> RepoResult<fiscal_years::Model> {
        let txn = self.db.begin().await?;
        let year = resolve_year(&txn, Some(id)).await?;
        if !year.is_closed {
            txn.commit().await?;
            return Ok(year);
        }

        open_exclusive(&txn, id).await?;
        let opened = resolve_year(&txn, Some(id)).await?;
        txn.commit().await?;

        tracing::info!(fiscal_year_id = %id, "Fiscal year opened");
        Ok(opened)
    }

    /// Closes a year. Closing a closed year is a no-op.
    pub async fn close(&self, id: Uuid) -> RepoResult<fiscal_years::Model> {
        let year = self.get(id).await?;
        if year.is_closed {
            return Ok(year);
        }

        let mut active: fiscal_years::ActiveModel = year.into();
        active.is_closed = Set(true);
        active.updated_at = Set(Utc::now().into());
        let closed = active.update(&self.db).await?;

        tracing::info!(fiscal_year_id = %id, "Fiscal year closed");
        Ok(closed)
    }

    /// Creates the year following a closed year and opens it exclusively.
    pub async fn open_next(&self, id: Uuid) -> RepoResult<fiscal_years::Model> {
        let txn = self.db.begin().await?;
        let source = resolve_year(&txn, Some(id)).await?;

        let existing_starts: Vec<NaiveDate> = fiscal_years::Entity::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|y| y.start_date)
            .collect();
        let span = FiscalService::plan_open_next(&FiscalYear::from(&source), &existing_starts)?;
        if let Some(other) = find_overlap(&txn, span.start, span.end, None).await? {
            return Err(FiscalError::OverlappingYear(other.name).into());
        }

        let now = Utc::now().into();
        let created = fiscal_years::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(FiscalService::default_name(span.start)),
            start_date: Set(span.start),
            end_date: Set(span.end),
            is_closed: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| on_unique(e, "uq_fiscal_years_start", || FiscalError::NextYearExists(span.start)))?;

        open_exclusive(&txn, created.id).await?;
        let opened = resolve_year(&txn, Some(created.id)).await?;
        txn.commit().await?;

        tracing::info!(
            source_id = %id,
            fiscal_year_id = %opened.id,
            start_date = %opened.start_date,
            "Next fiscal year opened"
        );
        Ok(opened)
    }

    /// Deletes an unreferenced year. When the open year is deleted, its
    /// nearest neighbor by start date is opened in the same transaction.
    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let txn = self.db.begin().await?;
        let year = resolve_year(&txn, Some(id)).await?;
        if is_referenced(&txn, id).await? {
            return Err(FiscalError::YearInUse(id).into());
        }

        fiscal_years::Entity::delete_by_id(id).exec(&txn).await?;

        let mut reopened = None;
        if !year.is_closed {
            let others: Vec<FiscalYear> = fiscal_years::Entity::find()
                .all(&txn)
                .await?
                .iter()
                .map(FiscalYear::from)
                .collect();
            if let Some(neighbor) = FiscalService::nearest_neighbor(&FiscalYear::from(&year), &others) {
                open_exclusive(&txn, neighbor).await?;
                reopened = Some(neighbor);
            }
        }
        txn.commit().await?;

        tracing::info!(fiscal_year_id = %id, reopened = ?reopened, "Fiscal year deleted");
        Ok(())
    }
}
