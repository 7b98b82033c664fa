//! Detail repository: four-digit detail accounts and their level links.

use chrono::Utc;
use daftar_core::{
    ledger::SequenceScope,
    taxonomy::{
        DetailKind as CoreDetailKind, LevelService, TaxonomyError, ensure_user_managed,
        next_detail_code, validate_detail_code,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use serde::Deserialize;
use uuid::Uuid;

use super::error::{RepoResult, on_unique};
use super::sequence;
use crate::entities::{
    detail_levels, details, details_detail_levels, journal_items, payments, receipts,
    sea_orm_active_enums::DetailKind,
};

/// Input for creating or updating a detail.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailInput {
    /// Four-digit code; allocated when omitted on create.
    pub code: Option<String>,
    /// Title.
    pub title: String,
    /// Active flag, defaults to true.
    pub is_active: Option<bool>,
}

/// Input for linking a detail to a detail level.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkInput {
    /// Leaf detail level.
    pub detail_level_id: Uuid,
    /// Marks this link as the detail's primary classification.
    #[serde(default)]
    pub is_primary: bool,
    /// Display order.
    #[serde(default)]
    pub position: i32,
}

/// Filter options for listing details.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailFilter {
    /// Restrict to one kind.
    pub kind: Option<CoreDetailKind>,
    /// Matches code or title.
    pub search: Option<String>,
}

fn not_found(id: Uuid) -> TaxonomyError {
    TaxonomyError::NotFound { entity: "detail", id }
}

fn code_scope() -> SequenceScope {
    SequenceScope::new("details", "code", None)
}

/// Allocates the next free detail code under the sequence lock.
async fn allocate_code(txn: &DatabaseTransaction) -> RepoResult<String> {
    let max = sequence::current_max(txn, &code_scope()).await?;
    let max = max.map(|m| u32::try_from(m).unwrap_or(u32::MAX));
    Ok(next_detail_code(max)?)
}

/// Creates the system-managed handler detail of a cashbox, bank account or
/// card reader inside the caller's transaction.
pub(crate) async fn create_system_handler(
    txn: &DatabaseTransaction,
    title: &str,
) -> RepoResult<details::Model> {
    let code = allocate_code(txn).await?;
    let now = Utc::now().into();
    let model = details::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.clone()),
        title: Set(title.to_string()),
        is_active: Set(true),
        kind: Set(DetailKind::SystemManaged),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = model
        .insert(txn)
        .await
        .map_err(|e| on_unique(e, "uq_details_code", || TaxonomyError::DuplicateCode(code)))?;

    tracing::debug!(detail_id = %created.id, code = %created.code, "Handler detail created");
    Ok(created)
}

/// Detail repository.
#[derive(Debug, Clone)]
pub struct DetailRepository {
    db: DatabaseConnection,
}

impl DetailRepository {
    /// Creates a new detail repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists details ordered by code.
    pub async fn list(&self, filter: DetailFilter) -> RepoResult<Vec<details::Model>> {
        let mut query = details::Entity::find();
        if let Some(kind) = filter.kind {
            query = query.filter(details::Column::Kind.eq(DetailKind::from(kind)));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(details::Column::Code.contains(search))
                    .add(details::Column::Title.contains(search)),
            );
        }
        Ok(query.order_by_asc(details::Column::Code).all(&self.db).await?)
    }

    /// Finds a detail by id.
    pub async fn get(&self, id: Uuid) -> RepoResult<details::Model> {
        details::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Suggests the next free code (`0001` when none exist).
    pub async fn next_code(&self) -> RepoResult<String> {
        let txn = self.db.begin().await?;
        let code = allocate_code(&txn).await?;
        txn.commit().await?;
        Ok(code)
    }

    /// Creates a user-managed detail.
    pub async fn create(&self, input: DetailInput) -> RepoResult<details::Model> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(TaxonomyError::RequiredField("title").into());
        }

        let txn = self.db.begin().await?;
        let code = match input.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                validate_detail_code(code)?;
                code.to_string()
            }
            _ => allocate_code(&txn).await?,
        };

        let taken = details::Entity::find()
            .filter(details::Column::Code.eq(code.as_str()))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(TaxonomyError::DuplicateCode(code).into());
        }

        let now = Utc::now().into();
        let model = details::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.clone()),
            title: Set(title),
            is_active: Set(input.is_active.unwrap_or(true)),
            kind: Set(DetailKind::UserManaged),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model
            .insert(&txn)
            .await
            .map_err(|e| on_unique(e, "uq_details_code", || TaxonomyError::DuplicateCode(code)))?;
        txn.commit().await?;

        tracing::info!(detail_id = %created.id, code = %created.code, "Detail created");
        Ok(created)
    }

    /// Updates a user-managed detail.
    pub async fn update(&self, id: Uuid, input: DetailInput) -> RepoResult<details::Model> {
        let existing = self.get(id).await?;
        ensure_user_managed(id, existing.kind.into())?;

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(TaxonomyError::RequiredField("title").into());
        }
        let code = match input.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                validate_detail_code(code)?;
                code.to_string()
            }
            _ => existing.code.clone(),
        };

        if code != existing.code {
            let taken = details::Entity::find()
                .filter(details::Column::Code.eq(code.as_str()))
                .filter(details::Column::Id.ne(id))
                .count(&self.db)
                .await?;
            if taken > 0 {
                return Err(TaxonomyError::DuplicateCode(code).into());
            }
        }

        let is_active = input.is_active.unwrap_or(existing.is_active);
        let mut active: details::ActiveModel = existing.into();
        active.code = Set(code.clone());
        active.title = Set(title);
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| on_unique(e, "uq_details_code", || TaxonomyError::DuplicateCode(code)))?;

        tracing::info!(detail_id = %id, "Detail updated");
        Ok(updated)
    }

    /// Deletes a user-managed detail that nothing references.
    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let txn = self.db.begin().await?;
        let existing = details::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_user_managed(id, existing.kind.into())?;

        let item_refs = journal_items::Entity::find()
            .filter(journal_items::Column::DetailId.eq(id))
            .count(&txn)
            .await?;
        let receipt_refs = receipts::Entity::find()
            .filter(receipts::Column::DetailId.eq(id))
            .count(&txn)
            .await?;
        let payment_refs = payments::Entity::find()
            .filter(payments::Column::DetailId.eq(id))
            .count(&txn)
            .await?;
        if item_refs + receipt_refs + payment_refs > 0 {
            return Err(TaxonomyError::DetailInUse(id).into());
        }

        details::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(detail_id = %id, "Detail deleted");
        Ok(())
    }

    /// Lists the level links of a detail, ordered by position.
    pub async fn levels(&self, detail_id: Uuid) -> RepoResult<Vec<details_detail_levels::Model>> {
        self.get(detail_id).await?;
        Ok(details_detail_levels::Entity::find()
            .filter(details_detail_levels::Column::DetailId.eq(detail_id))
            .order_by_asc(details_detail_levels::Column::Position)
            .all(&self.db)
            .await?)
    }

    /// Links a detail to a leaf level. Re-linking updates the existing link.
    ///
    /// Marking a link primary clears the previous primary in the same
    /// transaction.
    pub async fn link_level(
        &self,
        detail_id: Uuid,
        input: LinkInput,
    ) -> RepoResult<details_detail_levels::Model> {
        let txn = self.db.begin().await?;

        details::Entity::find_by_id(detail_id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(detail_id))?;
        detail_levels::Entity::find_by_id(input.detail_level_id)
            .one(&txn)
            .await?
            .ok_or(TaxonomyError::NotFound {
                entity: "detail_level",
                id: input.detail_level_id,
            })?;

        let children = detail_levels::Entity::find()
            .filter(detail_levels::Column::ParentId.eq(input.detail_level_id))
            .count(&txn)
            .await?;
        LevelService::ensure_linkable(input.detail_level_id, children)?;

        if input.is_primary {
            details_detail_levels::Entity::update_many()
                .col_expr(details_detail_levels::Column::IsPrimary, Expr::value(false))
                .filter(details_detail_levels::Column::DetailId.eq(detail_id))
                .exec(&txn)
                .await?;
        }

        let existing = details_detail_levels::Entity::find_by_id((detail_id, input.detail_level_id))
            .one(&txn)
            .await?;
        let link = match existing {
            Some(link) => {
                let mut active: details_detail_levels::ActiveModel = link.into();
                active.is_primary = Set(input.is_primary);
                active.position = Set(input.position);
                active.update(&txn).await?
            }
            None => {
                details_detail_levels::ActiveModel {
                    detail_id: Set(detail_id),
                    detail_level_id: Set(input.detail_level_id),
                    is_primary: Set(input.is_primary),
                    position: Set(input.position),
                    created_at: Set(Utc::now().into()),
                }
                .insert(&txn)
                .await?
            }
        };
        txn.commit().await?;

        tracing::info!(
            detail_id = %detail_id,
            detail_level_id = %input.detail_level_id,
            is_primary = input.is_primary,
            "Detail linked to level"
        );
        Ok(link)
    }

    /// Removes a detail-level link.
    pub async fn unlink_level(&self, detail_id: Uuid, detail_level_id: Uuid) -> RepoResult<()> {
        let result = details_detail_levels::Entity::delete_by_id((detail_id, detail_level_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TaxonomyError::NotFound {
                entity: "detail_level_link",
                id: detail_level_id,
            }
            .into());
        }
        tracing::info!(detail_id = %detail_id, detail_level_id = %detail_level_id, "Detail unlinked");
        Ok(())
    }
}
