//! Instrument link resolver.
//!
//! Receipt and payment items reference their card reader, bank account or
//! check through one shared `instrument_links` row per source.

use daftar_core::treasury::{InstrumentRef, TreasuryError};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    Statement,
};
use uuid::Uuid;

use super::error::{RepoError, RepoResult};
use crate::entities::{bank_accounts, card_readers, checks, instrument_links};

fn source_filter(instrument: InstrumentRef) -> Option<(instrument_links::Column, Uuid)> {
    match instrument {
        InstrumentRef::Cash => None,
        InstrumentRef::Card(id) => Some((instrument_links::Column::CardReaderId, id)),
        InstrumentRef::Transfer(id) => Some((instrument_links::Column::BankAccountId, id)),
        InstrumentRef::Check(id) => Some((instrument_links::Column::CheckId, id)),
    }
}

async fn find_link<C: ConnectionTrait>(
    conn: &C,
    instrument: InstrumentRef,
) -> RepoResult<Option<instrument_links::Model>> {
    let Some((column, source_id)) = source_filter(instrument) else {
        return Ok(None);
    };
    Ok(instrument_links::Entity::find()
        .filter(column.eq(source_id))
        .one(conn)
        .await?)
}

async fn ensure_source_exists<C: ConnectionTrait>(conn: &C, instrument: InstrumentRef) -> RepoResult<()> {
    let (entity, found) = match instrument {
        InstrumentRef::Cash => return Ok(()),
        InstrumentRef::Card(id) => ("card_reader", card_readers::Entity::find_by_id(id).count(conn).await?),
        InstrumentRef::Transfer(id) => ("bank_account", bank_accounts::Entity::find_by_id(id).count(conn).await?),
        InstrumentRef::Check(id) => ("check", checks::Entity::find_by_id(id).count(conn).await?),
    };
    if found == 0 {
        let id = instrument.source_id().unwrap_or_default();
        return Err(TreasuryError::NotFound { entity, id }.into());
    }
    Ok(())
}

/// Returns the link id for an instrument, creating the link on first use.
///
/// Cash has no source and yields `None`. A concurrent insert of the same
/// link is absorbed by `ON CONFLICT` on the partial unique index.
pub async fn get_or_create<C: ConnectionTrait>(
    conn: &C,
    instrument: InstrumentRef,
) -> RepoResult<Option<Uuid>> {
    if matches!(instrument, InstrumentRef::Cash) {
        return Ok(None);
    }
    if let Some(link) = find_link(conn, instrument).await? {
        return Ok(Some(link.id));
    }
    ensure_source_exists(conn, instrument).await?;

    let (card_reader_id, bank_account_id, check_id) = match instrument {
        InstrumentRef::Card(id) => (Some(id), None, None),
        InstrumentRef::Transfer(id) => (None, Some(id), None),
        InstrumentRef::Check(id) => (None, None, Some(id)),
        InstrumentRef::Cash => (None, None, None),
    };
    let conflict_column = match instrument {
        InstrumentRef::Card(_) => "card_reader_id",
        InstrumentRef::Transfer(_) => "bank_account_id",
        _ => "check_id",
    };
    let kind = instrument.instrument_type();

    // Losing a concurrent insert must not abort the caller's transaction.
    let inserted = conn
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "INSERT INTO instrument_links \
                 (id, instrument_type, card_reader_id, bank_account_id, check_id, created_at) \
                 VALUES ($1, CAST($2 AS instrument_type), $3, $4, $5, now()) \
                 ON CONFLICT ({conflict_column}) WHERE {conflict_column} IS NOT NULL DO NOTHING"
            ),
            [
                Uuid::new_v4().into(),
                kind.as_str().into(),
                card_reader_id.into(),
                bank_account_id.into(),
                check_id.into(),
            ],
        ))
        .await?
        .rows_affected();

    let link = find_link(conn, instrument)
        .await?
        .ok_or_else(|| RepoError::Database(DbErr::RecordNotFound("instrument link".into())))?;
    if inserted > 0 {
        tracing::debug!(link_id = %link.id, instrument = %kind, "Instrument link created");
    }
    Ok(Some(link.id))
}

/// Loads a link by id.
pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> RepoResult<instrument_links::Model> {
    instrument_links::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            TreasuryError::NotFound {
                entity: "instrument_link",
                id,
            }
            .into()
        })
}

/// The instrument a stored link points at.
#[must_use]
pub fn to_ref(link: &instrument_links::Model) -> InstrumentRef {
    match (link.card_reader_id, link.bank_account_id, link.check_id) {
        (Some(id), _, _) => InstrumentRef::Card(id),
        (_, Some(id), _) => InstrumentRef::Transfer(id),
        (_, _, Some(id)) => InstrumentRef::Check(id),
        _ => InstrumentRef::Cash,
    }
}
