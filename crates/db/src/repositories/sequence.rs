//! Sequence allocation inside a mutation's transaction.
//!
//! Callers take a transaction-scoped advisory lock keyed by the sequence
//! scope, then read the current maximum. The lock is released when the
//! transaction commits or rolls back, so two writers of the same scope can
//! never read the same maximum.
//!
//! # Usage
//!
//! ```ignore
//! let txn = db.begin().await?;
//! let scope = SequenceScope::new("journals", "ref_no", Some(fiscal_year_id));
//! let ref_no = sequence::next_value(&txn, &scope).await?;
//! // insert using ref_no ...
//! txn.commit().await?;
//! ```

use daftar_core::ledger::{SEQUENCE_PATTERN, SequenceScope, next_sequence_value};
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, DbBackend, DbErr, FromQueryResult, Statement, Value,
};

#[derive(Debug, FromQueryResult)]
struct MaxRow {
    max_value: Option<i64>,
}

/// Takes `pg_advisory_xact_lock` for the scope.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn lock_scope(txn: &DatabaseTransaction, scope: &SequenceScope) -> Result<(), DbErr> {
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [scope.lock_key().into()],
    ))
    .await?;
    Ok(())
}

/// Locks the scope and returns the largest digit-only value in it.
///
/// Values longer than 18 digits are skipped so the cast cannot overflow.
///
/// # Errors
///
/// Returns an error if the lock or the query fails.
pub async fn current_max(
    txn: &DatabaseTransaction,
    scope: &SequenceScope,
) -> Result<Option<i64>, DbErr> {
    lock_scope(txn, scope).await?;

    let column = scope.column;
    let table = scope.table;
    let mut sql = format!(
        "SELECT MAX(CAST({column} AS BIGINT)) AS max_value FROM {table} \
         WHERE {column} ~ '{SEQUENCE_PATTERN}' AND length({column}) <= 18"
    );
    let mut values: Vec<Value> = Vec::new();
    if let Some(fiscal_year_id) = scope.fiscal_year_id {
        sql.push_str(" AND fiscal_year_id = $1");
        values.push(fiscal_year_id.into());
    }

    let row = MaxRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        values,
    ))
    .one(txn)
    .await?;

    Ok(row.and_then(|r| r.max_value))
}

/// Locks the scope and returns the next value as a string.
///
/// # Errors
///
/// Returns an error if the lock or the query fails.
pub async fn next_value(txn: &DatabaseTransaction, scope: &SequenceScope) -> Result<String, DbErr> {
    let max = current_max(txn, scope).await?;
    Ok(next_sequence_value(max).to_string())
}
