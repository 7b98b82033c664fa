//! Checkbook and check repository.

use chrono::{NaiveDate, Utc};
use daftar_core::treasury::{
    CheckService, CheckStatus as CoreCheckStatus, CheckType as CoreCheckType, CheckbookSpan,
    CheckbookStatus as CoreCheckbookStatus, TreasuryError,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use super::error::{RepoResult, on_unique};
use crate::entities::{
    bank_accounts, checkbooks, checks, instrument_links, payment_items, receipt_items,
    sea_orm_active_enums::{CheckStatus, CheckType, CheckbookStatus},
};

/// Input for creating a checkbook.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckbookInput {
    /// Owning bank account.
    pub bank_account_id: Uuid,
    /// Series printed on the checks.
    pub series: String,
    /// First serial.
    pub start_number: i64,
    /// Number of pages.
    pub page_count: i32,
}

/// Input for registering an incoming check or issuing an outgoing one.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckInput {
    /// Direction.
    #[serde(rename = "type")]
    pub check_type: CoreCheckType,
    /// Checkbook an outgoing check is issued from.
    pub checkbook_id: Option<Uuid>,
    /// Check number; a checkbook serial for outgoing checks.
    pub number: String,
    /// Drawer.
    pub issuer: Option<String>,
    /// Payee.
    pub beneficiary: Option<String>,
    /// Amount (> 0).
    pub amount: Decimal,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
}

/// Filter options for listing checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckFilter {
    /// Restrict to one direction.
    #[serde(rename = "type")]
    pub check_type: Option<CoreCheckType>,
    /// Restrict to one status.
    pub status: Option<CoreCheckStatus>,
    /// Restrict to one checkbook.
    pub checkbook_id: Option<Uuid>,
}

fn check_not_found(id: Uuid) -> TreasuryError {
    TreasuryError::NotFound { entity: "check", id }
}

fn checkbook_not_found(id: Uuid) -> TreasuryError {
    TreasuryError::NotFound {
        entity: "checkbook",
        id,
    }
}

/// Checkbook and check repository.
#[derive(Debug, Clone)]
pub struct CheckRepository {
    db: DatabaseConnection,
}

impl CheckRepository {
    /// Creates a new check repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========== Checkbooks ==========

    /// Creates an active checkbook.
    pub async fn create_checkbook(&self, input: CheckbookInput) -> RepoResult<checkbooks::Model> {
        let span = CheckbookSpan::new(input.start_number, input.page_count)?;
        let series = input.series.trim().to_string();

        let account = bank_accounts::Entity::find_by_id(input.bank_account_id)
            .count(&self.db)
            .await?;
        if account == 0 {
            return Err(TreasuryError::NotFound {
                entity: "bank_account",
                id: input.bank_account_id,
            }
            .into());
        }

        let now = Utc::now().into();
        let created = checkbooks::ActiveModel {
            id: Set(Uuid::new_v4()),
            bank_account_id: Set(input.bank_account_id),
            series: Set(series),
            start_number: Set(span.start_number),
            page_count: Set(span.page_count),
            status: Set(CheckbookStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            checkbook_id = %created.id,
            first = span.start_number,
            last = span.last_number(),
            "Checkbook created"
        );
        Ok(created)
    }

    /// Lists checkbooks.
    pub async fn list_checkbooks(&self) -> RepoResult<Vec<checkbooks::Model>> {
        Ok(checkbooks::Entity::find()
            .order_by_asc(checkbooks::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Finds a checkbook by id.
    pub async fn get_checkbook(&self, id: Uuid) -> RepoResult<checkbooks::Model> {
        checkbooks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| checkbook_not_found(id).into())
    }

    // ========== Checks ==========

    /// Registers an incoming check or issues an outgoing one.
    ///
    /// Issuing the last serial of a checkbook exhausts it in the same
    /// transaction.
    pub async fn create_check(&self, input: CheckInput) -> RepoResult<checks::Model> {
        if input.amount <= Decimal::ZERO {
            return Err(TreasuryError::InvalidAmount.into());
        }

        let txn = self.db.begin().await?;
        let mut exhausts = None;
        let number = match input.check_type {
            CoreCheckType::Outgoing => {
                let checkbook_id = input.checkbook_id.ok_or(TreasuryError::CheckbookRequired)?;
                let book = checkbooks::Entity::find_by_id(checkbook_id)
                    .lock_exclusive()
                    .one(&txn)
                    .await?
                    .ok_or_else(|| checkbook_not_found(checkbook_id))?;

                let serial = CheckService::parse_serial(&input.number)?;
                let span = CheckbookSpan::new(book.start_number, book.page_count)?;
                if CheckService::validate_issue(&span, book.status.into(), serial)? {
                    exhausts = Some(book);
                }
                serial.to_string()
            }
            CoreCheckType::Incoming => {
                let number = input.number.trim();
                if number.is_empty() {
                    return Err(TreasuryError::InvalidCheckNumber(input.number).into());
                }
                number.to_string()
            }
        };

        if let Some(checkbook_id) = input.checkbook_id {
            let taken = checks::Entity::find()
                .filter(checks::Column::CheckbookId.eq(checkbook_id))
                .filter(checks::Column::Number.eq(number.as_str()))
                .count(&txn)
                .await?;
            if taken > 0 {
                return Err(TreasuryError::DuplicateCheckNumber(number).into());
            }
        }

        let status = CheckService::initial_status(input.check_type);
        let now = Utc::now().into();
        let created = checks::ActiveModel {
            id: Set(Uuid::new_v4()),
            check_type: Set(input.check_type.into()),
            checkbook_id: Set(input.checkbook_id),
            number: Set(number.clone()),
            issuer: Set(input.issuer),
            beneficiary: Set(input.beneficiary),
            amount: Set(input.amount),
            status: Set(status.into()),
            issue_date: Set(input.issue_date),
            due_date: Set(input.due_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            on_unique(e, "uq_checks_checkbook_number", || {
                TreasuryError::DuplicateCheckNumber(number)
            })
        })?;

        if let Some(book) = exhausts {
            let book_id = book.id;
            let mut active: checkbooks::ActiveModel = book.into();
            active.status = Set(CoreCheckbookStatus::Exhausted.into());
            active.updated_at = Set(now);
            active.update(&txn).await?;
            tracing::info!(checkbook_id = %book_id, "Checkbook exhausted");
        }
        txn.commit().await?;

        tracing::info!(
            check_id = %created.id,
            check_type = ?input.check_type,
            number = %created.number,
            "Check created"
        );
        Ok(created)
    }

    /// Lists checks, newest due date first.
    pub async fn list_checks(&self, filter: CheckFilter) -> RepoResult<Vec<checks::Model>> {
        let mut query = checks::Entity::find();
        if let Some(check_type) = filter.check_type {
            query = query.filter(checks::Column::CheckType.eq(CheckType::from(check_type)));
        }
        if let Some(status) = filter.status {
            query = query.filter(checks::Column::Status.eq(CheckStatus::from(status)));
        }
        if let Some(checkbook_id) = filter.checkbook_id {
            query = query.filter(checks::Column::CheckbookId.eq(checkbook_id));
        }
        Ok(query
            .order_by_desc(checks::Column::DueDate)
            .order_by_asc(checks::Column::Number)
            .all(&self.db)
            .await?)
    }

    /// Finds a check by id.
    pub async fn get_check(&self, id: Uuid) -> RepoResult<checks::Model> {
        checks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| check_not_found(id).into())
    }

    /// Deletes a check still in its initial state and unused by documents.
    pub async fn delete_check(&self, id: Uuid) -> RepoResult<()> {
        let txn = self.db.begin().await?;
        let check = checks::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| check_not_found(id))?;
        CheckService::ensure_deletable(id, check.check_type.into(), check.status.into())?;

        let link = instrument_links::Entity::find()
            .filter(instrument_links::Column::CheckId.eq(id))
            .one(&txn)
            .await?;
        if let Some(link) = link {
            let used = receipt_items::Entity::find()
                .filter(receipt_items::Column::RelatedInstrumentId.eq(link.id))
                .count(&txn)
                .await?
                + payment_items::Entity::find()
                    .filter(payment_items::Column::RelatedInstrumentId.eq(link.id))
                    .count(&txn)
                    .await?;
            if used > 0 {
                return Err(TreasuryError::CheckNotDeletable(id).into());
            }
        }

        checks::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(check_id = %id, "Check deleted");
        Ok(())
    }
}
