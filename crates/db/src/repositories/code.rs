//! Code repository for the three-level chart of accounts.

use chrono::Utc;
use daftar_core::taxonomy::{
    CodeKind as CoreCodeKind, CodePayload, CodeService, ParentInfo, TaxonomyError, TreeItem,
    TreeNode, ValidatedCode, build_tree,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashSet;
use uuid::Uuid;

use super::error::{RepoError, RepoResult, on_unique};
use crate::entities::{codes, journal_items, payments, receipts, sea_orm_active_enums::CodeKind};

impl TreeItem for codes::Model {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }
}

/// Filter options for listing codes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeFilter {
    /// Restrict to one kind.
    pub kind: Option<CoreCodeKind>,
    /// Restrict to active or inactive codes.
    pub is_active: Option<bool>,
}

fn not_found(id: Uuid) -> TaxonomyError {
    TaxonomyError::NotFound { entity: "code", id }
}

/// Code repository.
#[derive(Debug, Clone)]
pub struct CodeRepository {
    db: DatabaseConnection,
}

impl CodeRepository {
    /// Creates a new code repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists codes ordered by code.
    pub async fn list(&self, filter: CodeFilter) -> RepoResult<Vec<codes::Model>> {
        let mut query = codes::Entity::find();
        if let Some(kind) = filter.kind {
            query = query.filter(codes::Column::Kind.eq(CodeKind::from(kind)));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(codes::Column::IsActive.eq(is_active));
        }
        Ok(query.order_by_asc(codes::Column::Code).all(&self.db).await?)
    }

    /// Returns the group → general → specific tree.
    pub async fn tree(&self) -> RepoResult<Vec<TreeNode<codes::Model>>> {
        let rows = self.list(CodeFilter::default()).await?;
        Ok(build_tree(rows))
    }

    /// Finds a code by id.
    pub async fn get(&self, id: Uuid) -> RepoResult<codes::Model> {
        codes::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Creates a code.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The payload is malformed (`invalidKind`, `requiredField`, `invalidGroupCode`)
    /// - The parent is missing or of the wrong kind (`invalidParent`)
    /// - The code string is taken (`duplicateCode`)
    pub async fn create(&self, payload: CodePayload) -> RepoResult<codes::Model> {
        let code = CodeService::validate_payload(&payload)?;
        let parent = self.parent_info(&self.db, code.parent_id).await?;
        CodeService::validate_parent(&code, parent)?;

        if self.code_taken(&code.code, None).await? {
            return Err(TaxonomyError::DuplicateCode(code.code).into());
        }

        let now = Utc::now().into();
        let model = codes::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.code.clone()),
            title: Set(code.title),
            kind: Set(code.kind.into()),
            parent_id: Set(code.parent_id),
            is_active: Set(code.is_active),
            nature: Set(code.nature.map(Into::into)),
            can_have_details: Set(code.can_have_details),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model
            .insert(&self.db)
            .await
            .map_err(|e| on_unique(e, "uq_codes_code", || TaxonomyError::DuplicateCode(code.code)))?;

        tracing::info!(code_id = %created.id, code = %created.code, kind = ?created.kind, "Code created");
        Ok(created)
    }

    /// Updates a code. Parent rules are checked against the next state.
    pub async fn update(&self, id: Uuid, payload: CodePayload) -> RepoResult<codes::Model> {
        let txn = self.db.begin().await?;

        let existing = codes::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;
        let code: ValidatedCode = CodeService::validate_payload(&payload)?;

        if code.parent_id == Some(id) {
            return Err(TaxonomyError::InvalidParent("a code cannot be its own parent".into()).into());
        }
        let parent = self.parent_info(&txn, code.parent_id).await?;
        CodeService::validate_parent(&code, parent)?;

        let has_children = codes::Entity::find()
            .filter(codes::Column::ParentId.eq(id))
            .count(&txn)
            .await?
            > 0;
        CodeService::validate_kind_change(id, existing.kind.into(), code.kind, has_children)?;

        if code.code != existing.code && self.code_taken(&code.code, Some(id)).await? {
            return Err(TaxonomyError::DuplicateCode(code.code).into());
        }

        let mut active: codes::ActiveModel = existing.into();
        active.code = Set(code.code.clone());
        active.title = Set(code.title);
        active.kind = Set(code.kind.into());
        active.parent_id = Set(code.parent_id);
        active.is_active = Set(code.is_active);
        active.nature = Set(code.nature.map(Into::into));
        active.can_have_details = Set(code.can_have_details);
        active.updated_at = Set(Utc::now().into());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| on_unique(e, "uq_codes_code", || TaxonomyError::DuplicateCode(code.code)))?;
        txn.commit().await?;

        tracing::info!(code_id = %id, "Code updated");
        Ok(updated)
    }

    /// Deletes a code that has no children and no references.
    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let txn = self.db.begin().await?;

        codes::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let children = codes::Entity::find()
            .filter(codes::Column::ParentId.eq(id))
            .count(&txn)
            .await?;
        if children > 0 {
            return Err(TaxonomyError::HasChildren(id).into());
        }

        let item_refs = journal_items::Entity::find()
            .filter(journal_items::Column::CodeId.eq(id))
            .count(&txn)
            .await?;
        let receipt_refs = receipts::Entity::find()
            .filter(receipts::Column::SpecialCodeId.eq(id))
            .count(&txn)
            .await?;
        let payment_refs = payments::Entity::find()
            .filter(payments::Column::SpecialCodeId.eq(id))
            .count(&txn)
            .await?;
        if item_refs + receipt_refs + payment_refs > 0 {
            return Err(TaxonomyError::CodeInUse(id).into());
        }

        codes::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(code_id = %id, "Code deleted");
        Ok(())
    }

    /// Returns the subset of `ids` that exist.
    pub async fn existing_ids<C: ConnectionTrait>(conn: &C, ids: &[Uuid]) -> RepoResult<HashSet<Uuid>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let rows = codes::Entity::find()
            .filter(codes::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|c| c.id).collect())
    }

    async fn code_taken(&self, code: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        let mut query = codes::Entity::find().filter(codes::Column::Code.eq(code));
        if let Some(id) = exclude {
            query = query.filter(codes::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    async fn parent_info<C: ConnectionTrait>(
        &self,
        conn: &C,
        parent_id: Option<Uuid>,
    ) -> Result<Option<ParentInfo>, RepoError> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let parent = codes::Entity::find_by_id(parent_id).one(conn).await?;
        Ok(parent.map(|p| ParentInfo {
            id: p.id,
            kind: p.kind.into(),
        }))
    }
}
