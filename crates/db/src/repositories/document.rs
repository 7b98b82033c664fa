//! Receipt and payment repository, including posting to the ledger.
//!
//! Receipts and payments share one shape: a header naming the counterparty
//! detail and a list of instrument items summing to the header total. The
//! repository is built for one [`DocumentDirection`] and dispatches to the
//! matching tables.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use daftar_core::ledger::{JournalStatus, SequenceScope};
use daftar_core::taxonomy::TaxonomyError;
use daftar_core::treasury::{
    CheckService, DocumentDirection, InstrumentRef, InstrumentType, PostingDocument, PostingItem,
    PostingService, TreasuryError, validate_document,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
    sea_query::{Alias, Expr, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::error::{RepoResult, on_unique};
use super::fiscal::resolve_year;
use super::instrument_link;
use super::journal::{NewJournal, insert_journal};
use super::mapping::MappingResolver;
use super::sequence;
use crate::entities::{
    bank_accounts, card_readers, cashboxes, checks, codes, details, payment_items, payments,
    receipt_items, receipts,
    sea_orm_active_enums::{CheckStatus, DocumentStatus},
};

/// `CAST(.. AS document_status)` for bulk updates.
pub(crate) fn status_expr(status: DocumentStatus) -> SimpleExpr {
    Expr::val(status.to_value()).as_enum(Alias::new("document_status"))
}

/// One item of a receipt or payment as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentItemInput {
    /// `cash`, `card`, `transfer` or `check`.
    pub instrument_type: String,
    /// Amount (> 0).
    pub amount: Decimal,
    /// Free reference (transfer tracking number, card slip, ...).
    pub reference: Option<String>,
    /// Card reader, bank account or check id; absent for cash.
    pub source_id: Option<Uuid>,
}

/// Input for creating or updating a receipt or payment.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentInput {
    /// Fiscal year; defaults to the open year.
    pub fiscal_year_id: Option<Uuid>,
    /// Document number; allocated when omitted.
    pub number: Option<String>,
    /// Document date.
    pub date: NaiveDate,
    /// Counterparty detail.
    pub detail_id: Uuid,
    /// Overrides the mapped counterparty code.
    pub special_code_id: Option<Uuid>,
    /// Description.
    pub description: Option<String>,
    /// Required when any item is cash or check.
    pub cashbox_id: Option<Uuid>,
    /// Header total; must equal the item sum.
    pub total_amount: Decimal,
    /// Items, in display order.
    pub items: Vec<DocumentItemInput>,
}

/// Filter options for listing documents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilter {
    /// Restrict to one fiscal year.
    pub fiscal_year_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<DocumentStatus>,
}

/// Receipt or payment header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHeader {
    /// Document id.
    pub id: Uuid,
    /// Number, unique per fiscal year.
    pub number: String,
    /// `temporary` until posted, then `sent`.
    pub status: DocumentStatus,
    /// Document date.
    pub date: NaiveDate,
    /// Fiscal year.
    pub fiscal_year_id: Option<Uuid>,
    /// Counterparty detail.
    pub detail_id: Uuid,
    /// Counterparty code override.
    pub special_code_id: Option<Uuid>,
    /// Description.
    pub description: Option<String>,
    /// Header total.
    pub total_amount: Decimal,
    /// Cashbox holding cash and checks.
    pub cashbox_id: Option<Uuid>,
    /// Journal created by posting.
    pub journal_id: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

/// Receipt or payment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentItem {
    /// Item id.
    pub id: Uuid,
    /// 1-based position.
    pub position: i32,
    /// Instrument.
    pub instrument_type: InstrumentType,
    /// Amount.
    pub amount: Decimal,
    /// Free reference.
    pub reference: Option<String>,
    /// Instrument link; absent for cash.
    pub related_instrument_id: Option<Uuid>,
}

/// A header with its items.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Header.
    #[serde(flatten)]
    pub header: DocumentHeader,
    /// Items by position.
    pub items: Vec<DocumentItem>,
}

impl From<receipts::Model> for DocumentHeader {
    fn from(m: receipts::Model) -> Self {
        Self {
            id: m.id,
            number: m.number,
            status: m.status,
            date: m.date,
            fiscal_year_id: m.fiscal_year_id,
            detail_id: m.detail_id,
            special_code_id: m.special_code_id,
            description: m.description,
            total_amount: m.total_amount,
            cashbox_id: m.cashbox_id,
            journal_id: m.journal_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<payments::Model> for DocumentHeader {
    fn from(m: payments::Model) -> Self {
        Self {
            id: m.id,
            number: m.number,
            status: m.status,
            date: m.date,
            fiscal_year_id: m.fiscal_year_id,
            detail_id: m.detail_id,
            special_code_id: m.special_code_id,
            description: m.description,
            total_amount: m.total_amount,
            cashbox_id: m.cashbox_id,
            journal_id: m.journal_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<receipt_items::Model> for DocumentItem {
    fn from(m: receipt_items::Model) -> Self {
        Self {
            id: m.id,
            position: m.position,
            instrument_type: m.instrument_type.into(),
            amount: m.amount,
            reference: m.reference,
            related_instrument_id: m.related_instrument_id,
        }
    }
}

impl From<payment_items::Model> for DocumentItem {
    fn from(m: payment_items::Model) -> Self {
        Self {
            id: m.id,
            position: m.position,
            instrument_type: m.instrument_type.into(),
            amount: m.amount,
            reference: m.reference,
            related_instrument_id: m.related_instrument_id,
        }
    }
}

/// An item after parsing and link resolution, ready to store.
#[derive(Debug, Clone)]
struct PreparedItem {
    instrument: InstrumentRef,
    amount: Decimal,
    reference: Option<String>,
    link_id: Option<Uuid>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Receipt or payment repository.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
    direction: DocumentDirection,
}

impl DocumentRepository {
    /// Repository over `receipts` and `receipt_items`.
    #[must_use]
    pub const fn receipts(db: DatabaseConnection) -> Self {
        Self {
            db,
            direction: DocumentDirection::Receipt,
        }
    }

    /// Repository over `payments` and `payment_items`.
    #[must_use]
    pub const fn payments(db: DatabaseConnection) -> Self {
        Self {
            db,
            direction: DocumentDirection::Payment,
        }
    }

    /// Direction this repository serves.
    #[must_use]
    pub const fn direction(&self) -> DocumentDirection {
        self.direction
    }

    fn entity(&self) -> &'static str {
        match self.direction {
            DocumentDirection::Receipt => "receipt",
            DocumentDirection::Payment => "payment",
        }
    }

    fn table(&self) -> &'static str {
        match self.direction {
            DocumentDirection::Receipt => "receipts",
            DocumentDirection::Payment => "payments",
        }
    }

    fn not_found(&self, id: Uuid) -> TreasuryError {
        TreasuryError::NotFound {
            entity: self.entity(),
            id,
        }
    }

    // ========== Queries ==========

    /// Lists headers, newest first.
    pub async fn list(&self, filter: DocumentFilter) -> RepoResult<Vec<DocumentHeader>> {
        Ok(match self.direction {
            DocumentDirection::Receipt => {
                let mut query = receipts::Entity::find();
                if let Some(fy) = filter.fiscal_year_id {
                    query = query.filter(receipts::Column::FiscalYearId.eq(fy));
                }
                if let Some(status) = filter.status {
                    query = query.filter(receipts::Column::Status.eq(status));
                }
                query
                    .order_by_desc(receipts::Column::Date)
                    .order_by_desc(receipts::Column::CreatedAt)
                    .all(&self.db)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect()
            }
            DocumentDirection::Payment => {
                let mut query = payments::Entity::find();
                if let Some(fy) = filter.fiscal_year_id {
                    query = query.filter(payments::Column::FiscalYearId.eq(fy));
                }
                if let Some(status) = filter.status {
                    query = query.filter(payments::Column::Status.eq(status));
                }
                query
                    .order_by_desc(payments::Column::Date)
                    .order_by_desc(payments::Column::CreatedAt)
                    .all(&self.db)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect()
            }
        })
    }

    /// Finds a document with its items.
    pub async fn get(&self, id: Uuid) -> RepoResult<Document> {
        let header = self
            .find_header(&self.db, id, false)
            .await?
            .ok_or_else(|| self.not_found(id))?;
        let items = self.load_items(&self.db, id).await?;
        Ok(Document { header, items })
    }

    // ========== Mutations ==========

    /// Creates a temporary document.
    pub async fn create(&self, input: DocumentInput) -> RepoResult<Document> {
        let txn = self.db.begin().await?;
        let year = resolve_year(&txn, input.fiscal_year_id).await?;
        let items = self.prepare(&txn, &input).await?;

        let number = match non_empty(input.number.clone()) {
            Some(number) => number,
            None => {
                let scope = SequenceScope::new(self.table(), "number", Some(year.id));
                sequence::next_value(&txn, &scope).await?
            }
        };
        self.ensure_number_free(&txn, year.id, &number, None).await?;

        let id = Uuid::new_v4();
        let now = Utc::now().into();
        let insert = match self.direction {
            DocumentDirection::Receipt => receipts::ActiveModel {
                id: Set(id),
                number: Set(number.clone()),
                status: Set(DocumentStatus::Temporary),
                date: Set(input.date),
                fiscal_year_id: Set(Some(year.id)),
                detail_id: Set(input.detail_id),
                special_code_id: Set(input.special_code_id),
                description: Set(non_empty(input.description)),
                total_amount: Set(input.total_amount),
                cashbox_id: Set(input.cashbox_id),
                journal_id: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map(|_| ()),
            DocumentDirection::Payment => payments::ActiveModel {
                id: Set(id),
                number: Set(number.clone()),
                status: Set(DocumentStatus::Temporary),
                date: Set(input.date),
                fiscal_year_id: Set(Some(year.id)),
                detail_id: Set(input.detail_id),
                special_code_id: Set(input.special_code_id),
                description: Set(non_empty(input.description)),
                total_amount: Set(input.total_amount),
                cashbox_id: Set(input.cashbox_id),
                journal_id: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map(|_| ()),
        };
        let constraint = format!("uq_{}_number", self.table());
        insert.map_err(|e| on_unique(e, &constraint, || TreasuryError::DuplicateNumber(number.clone())))?;

        self.insert_items(&txn, id, &items).await?;
        let document = self.reload(&txn, id).await?;
        txn.commit().await?;

        tracing::info!(
            document = self.entity(),
            document_id = %id,
            number = %number,
            total = %input.total_amount,
            "Treasury document created"
        );
        Ok(document)
    }

    /// Replaces a temporary document's header and items.
    pub async fn update(&self, id: Uuid, input: DocumentInput) -> RepoResult<Document> {
        let txn = self.db.begin().await?;
        let existing = self
            .find_header(&txn, id, true)
            .await?
            .ok_or_else(|| self.not_found(id))?;
        if existing.status == DocumentStatus::Sent {
            return Err(TreasuryError::AlreadyPosted.into());
        }

        let year_id = match input.fiscal_year_id {
            Some(fy) => resolve_year(&txn, Some(fy)).await?.id,
            None => match existing.fiscal_year_id {
                Some(fy) => fy,
                None => resolve_year(&txn, None).await?.id,
            },
        };
        let items = self.prepare(&txn, &input).await?;
        let number = non_empty(input.number.clone()).unwrap_or_else(|| existing.number.clone());
        self.ensure_number_free(&txn, year_id, &number, Some(id)).await?;

        let now: DateTime<FixedOffset> = Utc::now().into();
        let description = non_empty(input.description);
        let updated = match self.direction {
            DocumentDirection::Receipt => receipts::ActiveModel {
                id: sea_orm::Unchanged(id),
                number: Set(number.clone()),
                date: Set(input.date),
                fiscal_year_id: Set(Some(year_id)),
                detail_id: Set(input.detail_id),
                special_code_id: Set(input.special_code_id),
                description: Set(description),
                total_amount: Set(input.total_amount),
                cashbox_id: Set(input.cashbox_id),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map(|_| ()),
            DocumentDirection::Payment => payments::ActiveModel {
                id: sea_orm::Unchanged(id),
                number: Set(number.clone()),
                date: Set(input.date),
                fiscal_year_id: Set(Some(year_id)),
                detail_id: Set(input.detail_id),
                special_code_id: Set(input.special_code_id),
                description: Set(description),
                total_amount: Set(input.total_amount),
                cashbox_id: Set(input.cashbox_id),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map(|_| ()),
        };
        let constraint = format!("uq_{}_number", self.table());
        updated.map_err(|e| on_unique(e, &constraint, || TreasuryError::DuplicateNumber(number.clone())))?;

        self.delete_items(&txn, id).await?;
        self.insert_items(&txn, id, &items).await?;
        let document = self.reload(&txn, id).await?;
        txn.commit().await?;

        tracing::info!(document = self.entity(), document_id = %id, "Treasury document updated");
        Ok(document)
    }

    /// Deletes a temporary document.
    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let txn = self.db.begin().await?;
        let existing = self
            .find_header(&txn, id, true)
            .await?
            .ok_or_else(|| self.not_found(id))?;
        if existing.status == DocumentStatus::Sent {
            return Err(TreasuryError::AlreadyPosted.into());
        }

        self.delete_items(&txn, id).await?;
        match self.direction {
            DocumentDirection::Receipt => receipts::Entity::delete_by_id(id).exec(&txn).await?,
            DocumentDirection::Payment => payments::Entity::delete_by_id(id).exec(&txn).await?,
        };
        txn.commit().await?;

        tracing::info!(document = self.entity(), document_id = %id, "Treasury document deleted");
        Ok(())
    }

    /// Posts a temporary document into a new temporary journal.
    ///
    /// Everything happens in one transaction: the journal and its lines,
    /// the document turning `sent` with its `journal_id`, and incoming
    /// checks of a receipt moving into the cashbox. A missing mapping
    /// aborts the whole posting.
    pub async fn post(&self, id: Uuid, mappings: &MappingResolver) -> RepoResult<Document> {
        let txn = self.db.begin().await?;
        let header = self
            .find_header(&txn, id, true)
            .await?
            .ok_or_else(|| self.not_found(id))?;
        if header.status == DocumentStatus::Sent {
            return Err(TreasuryError::AlreadyPosted.into());
        }
        let items = self.load_items(&txn, id).await?;
        validate_document(
            header.total_amount,
            items.iter().map(|i| (i.instrument_type, i.amount)),
            header.cashbox_id.is_some(),
        )?;

        let cashbox_handler = match header.cashbox_id {
            Some(cashbox_id) => Some(
                cashboxes::Entity::find_by_id(cashbox_id)
                    .one(&txn)
                    .await?
                    .ok_or(TreasuryError::NotFound {
                        entity: "cashbox",
                        id: cashbox_id,
                    })?
                    .handler_detail_id,
            ),
            None => None,
        };

        let mut posting_items = Vec::with_capacity(items.len());
        let mut checks_to_move = Vec::new();
        for item in &items {
            let mut posting = PostingItem {
                instrument_type: item.instrument_type,
                amount: item.amount,
                handler_detail_id: None,
                due_date: None,
                reference: item.reference.clone(),
            };
            match item.instrument_type {
                InstrumentType::Cash => posting.handler_detail_id = cashbox_handler,
                kind => {
                    let link_id = item
                        .related_instrument_id
                        .ok_or(TreasuryError::InstrumentSourceRequired(kind.as_str()))?;
                    let link = instrument_link::find_by_id(&txn, link_id).await?;
                    match instrument_link::to_ref(&link) {
                        InstrumentRef::Card(reader_id) => {
                            posting.handler_detail_id = Some(card_reader_handler(&txn, reader_id).await?);
                        }
                        InstrumentRef::Transfer(account_id) => {
                            posting.handler_detail_id = Some(bank_account_handler(&txn, account_id).await?);
                        }
                        InstrumentRef::Check(check_id) => {
                            let check = checks::Entity::find_by_id(check_id)
                                .lock_exclusive()
                                .one(&txn)
                                .await?
                                .ok_or(TreasuryError::NotFound {
                                    entity: "check",
                                    id: check_id,
                                })?;
                            CheckService::ensure_direction(check.id, self.direction, check.check_type.into())?;
                            posting.due_date = Some(check.due_date);
                            if self.direction == DocumentDirection::Receipt
                                && let Some(next) = CheckService::status_after_receipt(
                                    check.check_type.into(),
                                    check.status.into(),
                                    check.checkbook_id.is_some(),
                                )
                            {
                                checks_to_move.push((check.id, next));
                            }
                        }
                        InstrumentRef::Cash => {
                            return Err(TreasuryError::InstrumentSourceRequired(kind.as_str()).into());
                        }
                    }
                }
            }
            posting_items.push(posting);
        }

        let fiscal_year_id = resolve_year(&txn, header.fiscal_year_id).await?.id;
        let doc = PostingDocument {
            direction: self.direction,
            number: header.number.clone(),
            counterparty_detail_id: header.detail_id,
            counterparty_code_override: header.special_code_id,
            total: header.total_amount,
            items: posting_items,
            description: header.description.clone(),
        };
        let resolved: HashMap<_, _> = mappings
            .resolve_all(&txn, &PostingService::required_keys(&doc))
            .await?;
        let lines = PostingService::build_lines(&doc, |key| {
            resolved
                .get(&key)
                .copied()
                .ok_or(TreasuryError::MissingMapping(key))
        })?;

        let journal = insert_journal(
            &txn,
            NewJournal {
                fiscal_year_id,
                ref_no: None,
                code: None,
                date: header.date,
                description: Some(doc.journal_description()),
                journal_type: Some(self.entity().to_string()),
                provider: Some("treasury".to_string()),
                status: JournalStatus::Temporary,
                reverses_journal_id: None,
            },
            &lines,
        )
        .await?;

        let now = Utc::now();
        match self.direction {
            DocumentDirection::Receipt => {
                receipts::Entity::update_many()
                    .col_expr(receipts::Column::Status, status_expr(DocumentStatus::Sent))
                    .col_expr(receipts::Column::JournalId, Expr::value(journal.id))
                    .col_expr(receipts::Column::UpdatedAt, Expr::value(now))
                    .filter(receipts::Column::Id.eq(id))
                    .exec(&txn)
                    .await?;
            }
            DocumentDirection::Payment => {
                payments::Entity::update_many()
                    .col_expr(payments::Column::Status, status_expr(DocumentStatus::Sent))
                    .col_expr(payments::Column::JournalId, Expr::value(journal.id))
                    .col_expr(payments::Column::UpdatedAt, Expr::value(now))
                    .filter(payments::Column::Id.eq(id))
                    .exec(&txn)
                    .await?;
            }
        }

        for (check_id, status) in &checks_to_move {
            checks::ActiveModel {
                id: sea_orm::Unchanged(*check_id),
                status: Set(CheckStatus::from(*status)),
                updated_at: Set(now.into()),
                ..Default::default()
            }
            .update(&txn)
            .await?;
        }

        let document = self.reload(&txn, id).await?;
        txn.commit().await?;

        tracing::info!(
            document = self.entity(),
            document_id = %id,
            journal_id = %journal.id,
            lines = lines.len(),
            checks_moved = checks_to_move.len(),
            "Treasury document posted"
        );
        Ok(document)
    }

    // ========== Helpers ==========

    /// Parses and validates items, checks references and resolves links.
    async fn prepare(&self, txn: &DatabaseTransaction, input: &DocumentInput) -> RepoResult<Vec<PreparedItem>> {
        let mut parsed = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let kind = InstrumentType::parse(&item.instrument_type)?;
            let instrument = InstrumentRef::parse(kind, item.source_id)?;
            parsed.push((instrument, item));
        }
        validate_document(
            input.total_amount,
            parsed.iter().map(|(instrument, item)| (instrument.instrument_type(), item.amount)),
            input.cashbox_id.is_some(),
        )?;

        if details::Entity::find_by_id(input.detail_id).count(txn).await? == 0 {
            return Err(TaxonomyError::NotFound {
                entity: "detail",
                id: input.detail_id,
            }
            .into());
        }
        if let Some(code_id) = input.special_code_id
            && codes::Entity::find_by_id(code_id).count(txn).await? == 0
        {
            return Err(TaxonomyError::NotFound {
                entity: "code",
                id: code_id,
            }
            .into());
        }
        if let Some(cashbox_id) = input.cashbox_id
            && cashboxes::Entity::find_by_id(cashbox_id).count(txn).await? == 0
        {
            return Err(TreasuryError::NotFound {
                entity: "cashbox",
                id: cashbox_id,
            }
            .into());
        }

        let mut prepared = Vec::with_capacity(parsed.len());
        for (instrument, item) in parsed {
            if let InstrumentRef::Check(check_id) = instrument {
                let check = checks::Entity::find_by_id(check_id)
                    .one(txn)
                    .await?
                    .ok_or(TreasuryError::NotFound {
                        entity: "check",
                        id: check_id,
                    })?;
                CheckService::ensure_direction(check_id, self.direction, check.check_type.into())?;
            }
            let link_id = instrument_link::get_or_create(txn, instrument).await?;
            prepared.push(PreparedItem {
                instrument,
                amount: item.amount,
                reference: non_empty(item.reference.clone()),
                link_id,
            });
        }
        Ok(prepared)
    }

    async fn ensure_number_free(
        &self,
        txn: &DatabaseTransaction,
        fiscal_year_id: Uuid,
        number: &str,
        exclude: Option<Uuid>,
    ) -> RepoResult<()> {
        let taken = match self.direction {
            DocumentDirection::Receipt => {
                let mut query = receipts::Entity::find()
                    .filter(receipts::Column::FiscalYearId.eq(fiscal_year_id))
                    .filter(receipts::Column::Number.eq(number));
                if let Some(id) = exclude {
                    query = query.filter(receipts::Column::Id.ne(id));
                }
                query.count(txn).await?
            }
            DocumentDirection::Payment => {
                let mut query = payments::Entity::find()
                    .filter(payments::Column::FiscalYearId.eq(fiscal_year_id))
                    .filter(payments::Column::Number.eq(number));
                if let Some(id) = exclude {
                    query = query.filter(payments::Column::Id.ne(id));
                }
                query.count(txn).await?
            }
        };
        if taken > 0 {
            return Err(TreasuryError::DuplicateNumber(number.to_string()).into());
        }
        Ok(())
    }

    async fn find_header<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        for_update: bool,
    ) -> RepoResult<Option<DocumentHeader>> {
        Ok(match self.direction {
            DocumentDirection::Receipt => {
                let mut query = receipts::Entity::find_by_id(id);
                if for_update {
                    query = query.lock_exclusive();
                }
                query.one(conn).await?.map(Into::into)
            }
            DocumentDirection::Payment => {
                let mut query = payments::Entity::find_by_id(id);
                if for_update {
                    query = query.lock_exclusive();
                }
                query.one(conn).await?.map(Into::into)
            }
        })
    }

    async fn load_items<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> RepoResult<Vec<DocumentItem>> {
        Ok(match self.direction {
            DocumentDirection::Receipt => receipt_items::Entity::find()
                .filter(receipt_items::Column::ReceiptId.eq(id))
                .order_by_asc(receipt_items::Column::Position)
                .all(conn)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
            DocumentDirection::Payment => payment_items::Entity::find()
                .filter(payment_items::Column::PaymentId.eq(id))
                .order_by_asc(payment_items::Column::Position)
                .all(conn)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        })
    }

    async fn reload(&self, txn: &DatabaseTransaction, id: Uuid) -> RepoResult<Document> {
        let header = self
            .find_header(txn, id, false)
            .await?
            .ok_or_else(|| self.not_found(id))?;
        let items = self.load_items(txn, id).await?;
        Ok(Document { header, items })
    }

    async fn insert_items(&self, txn: &DatabaseTransaction, id: Uuid, items: &[PreparedItem]) -> RepoResult<()> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        for (item, position) in items.iter().zip(1_i32..) {
            let instrument_type = item.instrument.instrument_type().into();
            match self.direction {
                DocumentDirection::Receipt => {
                    receipt_items::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        receipt_id: Set(id),
                        position: Set(position),
                        instrument_type: Set(instrument_type),
                        amount: Set(item.amount),
                        reference: Set(item.reference.clone()),
                        related_instrument_id: Set(item.link_id),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await?;
                }
                DocumentDirection::Payment => {
                    payment_items::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        payment_id: Set(id),
                        position: Set(position),
                        instrument_type: Set(instrument_type),
                        amount: Set(item.amount),
                        reference: Set(item.reference.clone()),
                        related_instrument_id: Set(item.link_id),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await?;
                }
            }
        }
        Ok(())
    }

    async fn delete_items(&self, txn: &DatabaseTransaction, id: Uuid) -> RepoResult<()> {
        match self.direction {
            DocumentDirection::Receipt => {
                receipt_items::Entity::delete_many()
                    .filter(receipt_items::Column::ReceiptId.eq(id))
                    .exec(txn)
                    .await?;
            }
            DocumentDirection::Payment => {
                payment_items::Entity::delete_many()
                    .filter(payment_items::Column::PaymentId.eq(id))
                    .exec(txn)
                    .await?;
            }
        }
        Ok(())
    }
}

async fn card_reader_handler(txn: &DatabaseTransaction, id: Uuid) -> RepoResult<Uuid> {
    card_readers::Entity::find_by_id(id)
        .one(txn)
        .await?
        .map(|r| r.handler_detail_id)
        .ok_or_else(|| {
            TreasuryError::NotFound {
                entity: "card_reader",
                id,
            }
            .into()
        })
}

async fn bank_account_handler(txn: &DatabaseTransaction, id: Uuid) -> RepoResult<Uuid> {
    bank_accounts::Entity::find_by_id(id)
        .one(txn)
        .await?
        .map(|a| a.handler_detail_id)
        .ok_or_else(|| {
            TreasuryError::NotFound {
                entity: "bank_account",
                id,
            }
            .into()
        })
}
