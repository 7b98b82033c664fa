//! Journal repository.
//!
//! Saves decide between draft and temporary and never block on balance.
//! Posting is the single balance gate. Permanent journals are only ever
//! countered by a reversal journal.

use chrono::{NaiveDate, Utc};
use daftar_core::ledger::{
    AutoJournalInput, CompiledFilter, JournalFilter, JournalLine, JournalService, JournalStatus,
    JournalTotals, LedgerError, ReversalService, ReversalSource, SEQUENCE_PATTERN, SequenceScope,
};
use daftar_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
    TransactionTrait, Value, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::code::CodeRepository;
use super::document::status_expr;
use super::error::{RepoError, RepoResult, on_unique};
use super::fiscal::resolve_year;
use super::sequence;
use crate::entities::{
    journal_items, journals, payments, receipts,
    sea_orm_active_enums::{DocumentStatus, JournalStatus as DbJournalStatus},
};

/// Input for creating or updating a journal.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalInput {
    /// Fiscal year; defaults to the open year.
    pub fiscal_year_id: Option<Uuid>,
    /// Reference number; allocated when omitted.
    pub ref_no: Option<String>,
    /// Journal code; allocated when omitted.
    pub code: Option<String>,
    /// Document date.
    pub date: NaiveDate,
    /// Description.
    pub description: Option<String>,
    /// Free-form journal type.
    #[serde(rename = "type")]
    pub journal_type: Option<String>,
    /// Originating system.
    pub provider: Option<String>,
    /// Keep the journal in draft even when balanced.
    #[serde(default)]
    pub force_draft: bool,
    /// Lines, in display order.
    pub items: Vec<JournalLine>,
}

/// Input for the two-line auto journal.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoJournalRequest {
    /// Fiscal year; defaults to the open year.
    pub fiscal_year_id: Option<Uuid>,
    /// Document date.
    pub date: NaiveDate,
    /// Code debited.
    pub debit_code_id: Uuid,
    /// Detail debited.
    pub debit_detail_id: Option<Uuid>,
    /// Code credited.
    pub credit_code_id: Uuid,
    /// Detail credited.
    pub credit_detail_id: Option<Uuid>,
    /// Amount moved.
    pub amount: Decimal,
    /// Description for the header and both lines.
    pub description: Option<String>,
}

/// A journal with its items and server-side totals.
#[derive(Debug, Clone, Serialize)]
pub struct JournalWithItems {
    /// Header.
    #[serde(flatten)]
    pub journal: journals::Model,
    /// Items by position.
    pub items: Vec<journal_items::Model>,
    /// Sums over `items`.
    pub totals: JournalTotals,
}

/// Header of a journal about to be inserted.
#[derive(Debug, Clone)]
pub(crate) struct NewJournal {
    pub fiscal_year_id: Uuid,
    pub ref_no: Option<String>,
    pub code: Option<String>,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub journal_type: Option<String>,
    pub provider: Option<String>,
    pub status: JournalStatus,
    pub reverses_journal_id: Option<Uuid>,
}

fn not_found(id: Uuid) -> LedgerError {
    LedgerError::JournalNotFound(id)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn to_line(item: &journal_items::Model) -> JournalLine {
    JournalLine {
        code_id: item.code_id,
        detail_id: item.detail_id,
        party_id: item.party_id,
        debit: item.debit,
        credit: item.credit,
        description: item.description.clone(),
    }
}

/// Maps a unique violation on either per-year journal constraint.
fn on_duplicate(err: sea_orm::DbErr, value: &str) -> RepoError {
    let dup = || LedgerError::DuplicateRefNo(value.to_string());
    match on_unique(err, "uq_journals_ref_no", dup) {
        RepoError::Database(err) => on_unique(err, "uq_journals_code", dup),
        other => other,
    }
}

/// Inserts a journal header and its lines inside the caller's transaction.
///
/// Missing `ref_no` and `code` are allocated from their per-year sequences
/// under the sequence lock.
pub(crate) async fn insert_journal(
    txn: &DatabaseTransaction,
    header: NewJournal,
    lines: &[JournalLine],
) -> RepoResult<journals::Model> {
    let fiscal_year_id = header.fiscal_year_id;
    let ref_no = match non_empty(header.ref_no) {
        Some(ref_no) => ref_no,
        None => {
            let scope = SequenceScope::new("journals", "ref_no", Some(fiscal_year_id));
            sequence::next_value(txn, &scope).await?
        }
    };
    let code = match non_empty(header.code) {
        Some(code) => code,
        None => {
            let scope = SequenceScope::new("journals", "code", Some(fiscal_year_id));
            sequence::next_value(txn, &scope).await?
        }
    };

    let now = Utc::now().into();
    let journal = journals::ActiveModel {
        id: Set(Uuid::new_v4()),
        fiscal_year_id: Set(fiscal_year_id),
        ref_no: Set(Some(ref_no.clone())),
        code: Set(Some(code)),
        date: Set(header.date),
        description: Set(header.description),
        journal_type: Set(header.journal_type),
        provider: Set(header.provider),
        status: Set(header.status.into()),
        reverses_journal_id: Set(header.reverses_journal_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(|e| on_duplicate(e, &ref_no))?;

    insert_items(txn, journal.id, lines).await?;
    Ok(journal)
}

async fn insert_items(txn: &DatabaseTransaction, journal_id: Uuid, lines: &[JournalLine]) -> RepoResult<()> {
    if lines.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    let items = lines.iter().zip(1_i32..).map(|(line, position)| journal_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        journal_id: Set(journal_id),
        position: Set(position),
        code_id: Set(line.code_id),
        detail_id: Set(line.detail_id),
        party_id: Set(line.party_id),
        debit: Set(line.debit),
        credit: Set(line.credit),
        description: Set(line.description.clone()),
        created_at: Set(now.into()),
    });
    journal_items::Entity::insert_many(items).exec(txn).await?;
    Ok(())
}

async fn load_items<C: ConnectionTrait>(conn: &C, journal_id: Uuid) -> RepoResult<Vec<journal_items::Model>> {
    Ok(journal_items::Entity::find()
        .filter(journal_items::Column::JournalId.eq(journal_id))
        .order_by_asc(journal_items::Column::Position)
        .all(conn)
        .await?)
}

/// Loads a journal row with `FOR UPDATE` so concurrent transitions serialize.
async fn lock_journal(txn: &DatabaseTransaction, id: Uuid) -> RepoResult<journals::Model> {
    journals::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| not_found(id).into())
}

async fn validate_codes<C: ConnectionTrait>(conn: &C, lines: &[JournalLine]) -> RepoResult<()> {
    let ids: Vec<Uuid> = lines.iter().map(|l| l.code_id).collect();
    let existing = CodeRepository::existing_ids(conn, &ids).await?;
    JournalService::validate_lines(lines, |id| existing.contains(&id))?;
    Ok(())
}

/// Parameterized WHERE fragments compiled from a [`CompiledFilter`].
///
/// Placeholders are numbered from `$1` in push order. Column names are
/// qualified with the `j` alias.
#[derive(Debug, Default)]
struct SqlPredicates {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl SqlPredicates {
    fn from_filter(filter: &CompiledFilter) -> Self {
        let mut predicates = Self::default();
        if let Some(fiscal_year_id) = filter.fiscal_year_id {
            predicates.push(|n| format!("j.fiscal_year_id = ${n}"), fiscal_year_id.into());
        }
        if let Some(status) = filter.status {
            predicates.push(
                |n| format!("j.status = CAST(${n} AS journal_status)"),
                status.as_str().into(),
            );
        }
        if let Some(from) = filter.date_from {
            predicates.push(|n| format!("j.date >= ${n}"), from.into());
        }
        if let Some(to) = filter.date_to {
            predicates.push(|n| format!("j.date <= ${n}"), to.into());
        }
        if let Some(from) = filter.code_from {
            predicates.push(|n| format!("{} >= ${n}", numeric("j.code")), from.into());
        }
        if let Some(to) = filter.code_to {
            predicates.push(|n| format!("{} <= ${n}", numeric("j.code")), to.into());
        }
        if let Some(pattern) = &filter.search_pattern {
            predicates.push(
                |n| {
                    format!(
                        "(j.description ILIKE ${n} ESCAPE '\\' \
                         OR j.ref_no ILIKE ${n} ESCAPE '\\' \
                         OR j.code ILIKE ${n} ESCAPE '\\')"
                    )
                },
                pattern.clone().into(),
            );
        }
        predicates
    }

    fn push(&mut self, clause: impl FnOnce(usize) -> String, value: Value) {
        self.values.push(value);
        self.clauses.push(clause(self.values.len()));
    }

    /// `AND`-joined clauses, or `TRUE` when empty.
    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            "TRUE".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }
}

/// Casts a digit-only text column to BIGINT; other values become NULL.
///
/// CASE fixes the evaluation order so the cast never sees a non-numeric value.
fn numeric(column: &str) -> String {
    format!(
        "(CASE WHEN {column} ~ '{SEQUENCE_PATTERN}' AND length({column}) <= 18 \
         THEN CAST({column} AS BIGINT) END)"
    )
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a journal; the status is draft or temporary by balance.
    pub async fn create(&self, input: JournalInput) -> RepoResult<JournalWithItems> {
        let txn = self.db.begin().await?;
        let year = resolve_year(&txn, input.fiscal_year_id).await?;
        validate_codes(&txn, &input.items).await?;
        let status = JournalService::status_on_save(&input.items, input.force_draft)?;

        let journal = insert_journal(
            &txn,
            NewJournal {
                fiscal_year_id: year.id,
                ref_no: input.ref_no,
                code: input.code,
                date: input.date,
                description: non_empty(input.description),
                journal_type: non_empty(input.journal_type),
                provider: non_empty(input.provider),
                status,
                reverses_journal_id: None,
            },
            &input.items,
        )
        .await?;
        let result = Self::with_items(&txn, journal).await?;
        txn.commit().await?;

        tracing::info!(
            journal_id = %result.journal.id,
            ref_no = ?result.journal.ref_no,
            status = %status,
            "Journal created"
        );
        Ok(result)
    }

    /// Creates a balanced two-line journal.
    pub async fn create_auto(&self, input: AutoJournalRequest) -> RepoResult<JournalWithItems> {
        let description = non_empty(input.description);
        let lines = JournalService::auto_lines(&AutoJournalInput {
            debit_code_id: input.debit_code_id,
            debit_detail_id: input.debit_detail_id,
            credit_code_id: input.credit_code_id,
            credit_detail_id: input.credit_detail_id,
            amount: input.amount,
            description: description.clone(),
        })?;

        self.create(JournalInput {
            fiscal_year_id: input.fiscal_year_id,
            ref_no: None,
            code: None,
            date: input.date,
            description,
            journal_type: Some("auto".to_string()),
            provider: None,
            force_draft: false,
            items: lines,
        })
        .await
    }

    /// Replaces a non-permanent journal's header and items.
    pub async fn update(&self, id: Uuid, input: JournalInput) -> RepoResult<JournalWithItems> {
        let txn = self.db.begin().await?;
        let existing = lock_journal(&txn, id).await?;
        JournalService::validate_can_modify(existing.status.into())?;

        let year = match input.fiscal_year_id {
            Some(fy) => resolve_year(&txn, Some(fy)).await?.id,
            None => existing.fiscal_year_id,
        };
        validate_codes(&txn, &input.items).await?;
        let status = JournalService::status_on_save(&input.items, input.force_draft)?;

        let ref_no = non_empty(input.ref_no).or_else(|| existing.ref_no.clone());
        let code = non_empty(input.code).or_else(|| existing.code.clone());
        let dup_key = ref_no.clone().unwrap_or_default();

        let mut active: journals::ActiveModel = existing.into();
        active.fiscal_year_id = Set(year);
        active.ref_no = Set(ref_no);
        active.code = Set(code);
        active.date = Set(input.date);
        active.description = Set(non_empty(input.description));
        active.journal_type = Set(non_empty(input.journal_type));
        active.provider = Set(non_empty(input.provider));
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());
        let journal = active
            .update(&txn)
            .await
            .map_err(|e| on_duplicate(e, &dup_key))?;

        journal_items::Entity::delete_many()
            .filter(journal_items::Column::JournalId.eq(id))
            .exec(&txn)
            .await?;
        insert_items(&txn, id, &input.items).await?;

        let result = Self::with_items(&txn, journal).await?;
        txn.commit().await?;

        tracing::info!(journal_id = %id, status = %status, "Journal updated");
        Ok(result)
    }

    /// Finds a journal with items and totals.
    pub async fn get(&self, id: Uuid) -> RepoResult<JournalWithItems> {
        let journal = journals::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(id))?;
        Self::with_items(&self.db, journal).await
    }

    /// Lists journal headers matching the filter, newest first.
    pub async fn list(
        &self,
        filter: &JournalFilter,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<journals::Model>> {
        let compiled = filter.compile()?;
        let predicates = SqlPredicates::from_filter(&compiled);
        let where_sql = predicates.sql();

        let count = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("SELECT COUNT(*) AS total FROM journals j WHERE {where_sql}"),
            predicates.values.clone(),
        ))
        .one(&self.db)
        .await?
        .map_or(0, |row| row.total);

        let rows = journals::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!(
                    "SELECT j.* FROM journals j WHERE {where_sql} \
                     ORDER BY j.date DESC, j.serial_no DESC LIMIT {} OFFSET {}",
                    page.limit(),
                    page.offset()
                ),
                predicates.values,
            ))
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page, u64::try_from(count).unwrap_or(0)))
    }

    /// Posts a journal: re-sums its stored items and requires balance.
    pub async fn post(&self, id: Uuid) -> RepoResult<JournalWithItems> {
        let txn = self.db.begin().await?;
        let journal = lock_journal(&txn, id).await?;
        let items = load_items(&txn, id).await?;
        let lines: Vec<JournalLine> = items.iter().map(to_line).collect();
        let totals = JournalService::validate_post(journal.status.into(), &lines)?;

        let mut active: journals::ActiveModel = journal.into();
        active.status = Set(DbJournalStatus::Permanent);
        active.updated_at = Set(Utc::now().into());
        let journal = active.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(journal_id = %id, total = %totals.total_debit, "Journal posted");
        Ok(JournalWithItems {
            journal,
            items,
            totals,
        })
    }

    /// Creates the permanent reversing journal of a permanent journal.
    pub async fn reverse(&self, id: Uuid) -> RepoResult<JournalWithItems> {
        let txn = self.db.begin().await?;
        let original = lock_journal(&txn, id).await?;
        JournalService::validate_can_reverse(original.status.into())?;

        let lines: Vec<JournalLine> = load_items(&txn, id).await?.iter().map(to_line).collect();
        let reversed = ReversalService::reverse(&ReversalSource {
            journal_id: original.id,
            ref_no: original.ref_no.as_deref(),
            code: original.code.as_deref(),
            description: original.description.as_deref(),
            lines: &lines,
        });

        let already = journals::Entity::find()
            .filter(journals::Column::FiscalYearId.eq(original.fiscal_year_id))
            .filter(journals::Column::RefNo.eq(reversed.ref_no.as_str()))
            .one(&txn)
            .await?;
        if already.is_some() {
            return Err(LedgerError::DuplicateRefNo(reversed.ref_no).into());
        }

        let journal = insert_journal(
            &txn,
            NewJournal {
                fiscal_year_id: original.fiscal_year_id,
                ref_no: Some(reversed.ref_no),
                code: None,
                date: original.date,
                description: Some(reversed.description),
                journal_type: original.journal_type.clone(),
                provider: original.provider.clone(),
                status: reversed.status,
                reverses_journal_id: Some(original.id),
            },
            &reversed.lines,
        )
        .await?;
        let result = Self::with_items(&txn, journal).await?;
        txn.commit().await?;

        tracing::info!(
            journal_id = %id,
            reversal_id = %result.journal.id,
            "Journal reversed"
        );
        Ok(result)
    }

    /// Deletes a non-permanent journal. Receipts and payments posted into it
    /// go back to temporary.
    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let txn = self.db.begin().await?;
        let journal = lock_journal(&txn, id).await?;
        JournalService::validate_can_modify(journal.status.into())?;

        let now = Utc::now();
        let receipts_detached = receipts::Entity::update_many()
            .col_expr(receipts::Column::Status, status_expr(DocumentStatus::Temporary))
            .col_expr(receipts::Column::JournalId, Expr::value(Option::<Uuid>::None))
            .col_expr(receipts::Column::UpdatedAt, Expr::value(now))
            .filter(receipts::Column::JournalId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        let payments_detached = payments::Entity::update_many()
            .col_expr(payments::Column::Status, status_expr(DocumentStatus::Temporary))
            .col_expr(payments::Column::JournalId, Expr::value(Option::<Uuid>::None))
            .col_expr(payments::Column::UpdatedAt, Expr::value(now))
            .filter(payments::Column::JournalId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;

        journal_items::Entity::delete_many()
            .filter(journal_items::Column::JournalId.eq(id))
            .exec(&txn)
            .await?;
        journals::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            journal_id = %id,
            receipts_detached,
            payments_detached,
            "Journal deleted"
        );
        Ok(())
    }

    /// Posts every temporary journal matching the filter whose items
    /// balance, in one statement. Returns the number of journals posted.
    pub async fn bulk_post(&self, filter: &JournalFilter) -> RepoResult<u64> {
        let compiled = filter.compile()?;
        let predicates = SqlPredicates::from_filter(&compiled);
        let sql = format!(
            "UPDATE journals j SET status = 'permanent', updated_at = now() \
             WHERE j.status = 'temporary' AND {} \
             AND EXISTS (SELECT 1 FROM journal_items i WHERE i.journal_id = j.id) \
             AND (SELECT ABS(SUM(i.debit) - SUM(i.credit)) FROM journal_items i \
                  WHERE i.journal_id = j.id) <= 0.0001",
            predicates.sql()
        );

        let result = self
            .db
            .execute(Statement::from_sql_and_values(DbBackend::Postgres, sql, predicates.values))
            .await?;

        tracing::info!(posted = result.rows_affected(), "Bulk post completed");
        Ok(result.rows_affected())
    }

    /// Renumbers journal codes per fiscal year by dense rank of
    /// `(date, numeric ref_no, numeric code, id)`. Returns rows changed.
    pub async fn reorder_codes(&self, fiscal_year_id: Option<Uuid>) -> RepoResult<u64> {
        let txn = self.db.begin().await?;
        let year = resolve_year(&txn, fiscal_year_id).await?;
        sequence::lock_scope(&txn, &SequenceScope::new("journals", "code", Some(year.id))).await?;

        let sql = format!(
            "UPDATE journals j SET code = r.rn::text, updated_at = now() \
             FROM (SELECT id, DENSE_RANK() OVER ( \
                       ORDER BY date ASC, {} ASC NULLS LAST, {} ASC NULLS LAST, id ASC) AS rn \
                   FROM journals WHERE fiscal_year_id = $1) r \
             WHERE j.id = r.id AND j.code IS DISTINCT FROM r.rn::text",
            numeric("ref_no"),
            numeric("code")
        );
        let result = txn
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [year.id.into()],
            ))
            .await?;
        txn.commit().await?;

        tracing::info!(
            fiscal_year_id = %year.id,
            changed = result.rows_affected(),
            "Journal codes reordered"
        );
        Ok(result.rows_affected())
    }

    async fn with_items<C: ConnectionTrait>(
        conn: &C,
        journal: journals::Model,
    ) -> RepoResult<JournalWithItems> {
        let items = load_items(conn, journal.id).await?;
        let lines: Vec<JournalLine> = items.iter().map(to_line).collect();
        Ok(JournalWithItems {
            journal,
            items,
            totals: JournalTotals::from_lines(&lines)?,
        })
    }
}
