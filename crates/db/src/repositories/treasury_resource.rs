//! Cashboxes, bank accounts and card readers.
//!
//! Each resource owns a system-managed handler detail, created with it in
//! the same transaction. Posting uses that detail on the resource's lines.

use chrono::Utc;
use daftar_core::taxonomy::TaxonomyError;
use daftar_core::treasury::TreasuryError;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use super::detail::create_system_handler;
use super::error::RepoResult;
use crate::entities::{bank_accounts, card_readers, cashboxes};

/// Input for creating a cashbox.
#[derive(Debug, Clone, Deserialize)]
pub struct CashboxInput {
    /// Title, also used for the handler detail.
    pub title: String,
}

/// Input for creating a bank account.
#[derive(Debug, Clone, Deserialize)]
pub struct BankAccountInput {
    /// Title, also used for the handler detail.
    pub title: String,
    /// Account number at the bank.
    pub account_number: String,
}

/// Input for creating a card reader.
#[derive(Debug, Clone, Deserialize)]
pub struct CardReaderInput {
    /// Title, also used for the handler detail.
    pub title: String,
    /// Settlement bank account.
    pub bank_account_id: Option<Uuid>,
    /// Terminal number.
    pub terminal_no: Option<String>,
}

fn required(value: &str, field: &'static str) -> Result<String, TaxonomyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaxonomyError::RequiredField(field));
    }
    Ok(trimmed.to_string())
}

/// Treasury resource repository.
#[derive(Debug, Clone)]
pub struct TreasuryResourceRepository {
    db: DatabaseConnection,
}

impl TreasuryResourceRepository {
    /// Creates a new treasury resource repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========== Cashboxes ==========

    /// Creates a cashbox and its handler detail.
    pub async fn create_cashbox(&self, input: CashboxInput) -> RepoResult<cashboxes::Model> {
        let title = required(&input.title, "title")?;
        let txn = self.db.begin().await?;
        let handler = create_system_handler(&txn, &title).await?;

        let now = Utc::now().into();
        let created = cashboxes::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            handler_detail_id: Set(handler.id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(cashbox_id = %created.id, handler_code = %handler.code, "Cashbox created");
        Ok(created)
    }

    /// Lists cashboxes.
    pub async fn list_cashboxes(&self) -> RepoResult<Vec<cashboxes::Model>> {
        Ok(cashboxes::Entity::find()
            .order_by_asc(cashboxes::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Finds a cashbox by id.
    pub async fn get_cashbox(&self, id: Uuid) -> RepoResult<cashboxes::Model> {
        cashboxes::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| TreasuryError::NotFound { entity: "cashbox", id }.into())
    }

    // ========== Bank Accounts ==========

    /// Creates a bank account and its handler detail.
    pub async fn create_bank_account(&self, input: BankAccountInput) -> RepoResult<bank_accounts::Model> {
        let title = required(&input.title, "title")?;
        let account_number = required(&input.account_number, "account_number")?;
        let txn = self.db.begin().await?;
        let handler = create_system_handler(&txn, &title).await?;

        let now = Utc::now().into();
        let created = bank_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            account_number: Set(account_number),
            handler_detail_id: Set(handler.id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(bank_account_id = %created.id, handler_code = %handler.code, "Bank account created");
        Ok(created)
    }

    /// Lists bank accounts.
    pub async fn list_bank_accounts(&self) -> RepoResult<Vec<bank_accounts::Model>> {
        Ok(bank_accounts::Entity::find()
            .order_by_asc(bank_accounts::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Finds a bank account by id.
    pub async fn get_bank_account(&self, id: Uuid) -> RepoResult<bank_accounts::Model> {
        bank_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                TreasuryError::NotFound {
                    entity: "bank_account",
                    id,
                }
                .into()
            })
    }

    // ========== Card Readers ==========

    /// Creates a card reader and its handler detail.
    pub async fn create_card_reader(&self, input: CardReaderInput) -> RepoResult<card_readers::Model> {
        let title = required(&input.title, "title")?;
        let txn = self.db.begin().await?;
        if let Some(bank_account_id) = input.bank_account_id {
            let found = bank_accounts::Entity::find_by_id(bank_account_id)
                .count(&txn)
                .await?;
            if found == 0 {
                return Err(TreasuryError::NotFound {
                    entity: "bank_account",
                    id: bank_account_id,
                }
                .into());
            }
        }
        let handler = create_system_handler(&txn, &title).await?;

        let now = Utc::now().into();
        let created = card_readers::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            bank_account_id: Set(input.bank_account_id),
            terminal_no: Set(input.terminal_no.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())),
            handler_detail_id: Set(handler.id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(card_reader_id = %created.id, handler_code = %handler.code, "Card reader created");
        Ok(created)
    }

    /// Lists card readers.
    pub async fn list_card_readers(&self) -> RepoResult<Vec<card_readers::Model>> {
        Ok(card_readers::Entity::find()
            .order_by_asc(card_readers::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Finds a card reader by id.
    pub async fn get_card_reader(&self, id: Uuid) -> RepoResult<card_readers::Model> {
        card_readers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                TreasuryError::NotFound {
                    entity: "card_reader",
                    id,
                }
                .into()
            })
    }
}
