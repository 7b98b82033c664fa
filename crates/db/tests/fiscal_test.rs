//! Fiscal year lifecycle against a live database.
//!
//! Opening a year closes every other year, so all exclusivity checks live
//! in one test to avoid interleaving with other tests in this binary.

mod common;

use chrono::{Datelike, NaiveDate};
use daftar_core::{fiscal::FiscalError, ledger::JournalLine};
use daftar_db::{
    FiscalYearRepository, JournalRepository, RepoError,
    entities::fiscal_years,
    repositories::{CreateFiscalYearInput, JournalInput, UpdateFiscalYearInput},
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

async fn open_count(db: &DatabaseConnection) -> u64 {
    fiscal_years::Entity::find()
        .filter(fiscal_years::Column::IsClosed.eq(false))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_open_next_and_delete_keep_one_open_year() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = FiscalYearRepository::new(db.clone());

    let base = common::fresh_year(&db).await;
    assert!(base.is_closed);

    // Opening the base year closes every other year.
    let opened = repo.open(base.id).await.unwrap();
    assert!(!opened.is_closed);
    assert_eq!(open_count(&db).await, 1);
    assert_eq!(repo.current().await.unwrap().id, base.id);

    // Opening another year closes the base year.
    let other = common::fresh_year(&db).await;
    repo.open(other.id).await.unwrap();
    assert!(repo.get(base.id).await.unwrap().is_closed);
    assert!(!repo.get(other.id).await.unwrap().is_closed);
    assert_eq!(repo.current().await.unwrap().id, other.id);
    assert_eq!(open_count(&db).await, 1);

    // Racing opens leave one open year; a loser gets a conflict, never a
    // database error.
    let rival = common::fresh_year(&db).await;
    let (a, b) = tokio::join!(repo.open(base.id), repo.open(rival.id));
    for result in [a, b] {
        match result {
            Ok(_) | Err(RepoError::Fiscal(FiscalError::OpenConflict(_))) => {}
            Err(other) => panic!("unexpected error from concurrent open: {other}"),
        }
    }
    assert_eq!(open_count(&db).await, 1);

    repo.open(base.id).await.unwrap();
    assert_eq!(repo.current().await.unwrap().id, base.id);
    repo.delete(other.id).await.unwrap();
    repo.delete(rival.id).await.unwrap();

    // The open year cannot roll over.
    let err = repo.open_next(base.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Fiscal(FiscalError::YearNotClosed(_))));

    repo.close(base.id).await.unwrap();
    let next = repo.open_next(base.id).await.unwrap();
    assert_eq!(next.start_date, base.end_date.succ_opt().unwrap());
    assert_eq!(next.end_date.year(), base.start_date.year() + 1);
    assert!(!next.is_closed);
    assert!(repo.get(base.id).await.unwrap().is_closed);

    // Rolling the same year over twice is rejected.
    let err = repo.open_next(base.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Fiscal(FiscalError::NextYearExists(_))));

    // Deleting the open year reopens its nearest earlier neighbor.
    repo.delete(next.id).await.unwrap();
    assert!(!repo.get(base.id).await.unwrap().is_closed);
    assert_eq!(repo.current().await.unwrap().id, base.id);

    repo.close(base.id).await.unwrap();
    let err = repo.current().await.unwrap_err();
    assert!(matches!(err, RepoError::Fiscal(FiscalError::NoOpenYear)));
}

#[tokio::test]
async fn test_overlapping_year_rejected() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = FiscalYearRepository::new(db.clone());
    let year = common::fresh_year(&db).await;

    let err = repo
        .create(CreateFiscalYearInput {
            name: Some("Overlap".into()),
            start_date: common::date_in(&year, 6, 1),
            end_date: common::date_in(&year, 12, 31).succ_opt().unwrap(),
            open: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Fiscal(FiscalError::OverlappingYear(_))));

    let err = repo
        .create(CreateFiscalYearInput {
            name: None,
            start_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            open: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Fiscal(FiscalError::InvalidDateRange)));
}

#[tokio::test]
async fn test_referenced_year_cannot_move_or_be_deleted() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = FiscalYearRepository::new(db.clone());
    let year = common::fresh_year(&db).await;

    let renamed = repo
        .update(
            year.id,
            UpdateFiscalYearInput {
                name: Some("Renamed".into()),
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed");

    let code = common::specific_code(&db, "Cash").await;
    JournalRepository::new(db.clone())
        .create(JournalInput {
            fiscal_year_id: Some(year.id),
            ref_no: None,
            code: None,
            date: common::date_in(&year, 3, 1),
            description: Some("Pins the year".into()),
            journal_type: None,
            provider: None,
            force_draft: false,
            items: vec![
                JournalLine::debit(code.id, None, dec!(10)),
                JournalLine::credit(code.id, None, dec!(10)),
            ],
        })
        .await
        .unwrap();

    let err = repo
        .update(
            year.id,
            UpdateFiscalYearInput {
                name: None,
                start_date: Some(common::date_in(&year, 2, 1)),
                end_date: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Fiscal(FiscalError::YearInUse(_))));

    let err = repo.delete(year.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Fiscal(FiscalError::YearInUse(_))));
}
