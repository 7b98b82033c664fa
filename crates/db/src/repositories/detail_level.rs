//! Detail level repository: the classification tree details are linked under.

use chrono::Utc;
use daftar_core::taxonomy::{LevelService, TaxonomyError, TreeItem, TreeNode, build_tree};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::error::RepoResult;
use crate::entities::{detail_levels, details_detail_levels};

impl TreeItem for detail_levels::Model {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }
}

/// Input for creating or updating a detail level.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailLevelInput {
    /// Level code.
    pub code: String,
    /// Title.
    pub title: String,
    /// Parent level.
    pub parent_id: Option<Uuid>,
}

fn not_found(id: Uuid) -> TaxonomyError {
    TaxonomyError::NotFound {
        entity: "detail_level",
        id,
    }
}

/// Detail level repository.
#[derive(Debug, Clone)]
pub struct DetailLevelRepository {
    db: DatabaseConnection,
}

impl DetailLevelRepository {
    /// Creates a new detail level repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists levels ordered by code.
    pub async fn list(&self) -> RepoResult<Vec<detail_levels::Model>> {
        Ok(detail_levels::Entity::find()
            .order_by_asc(detail_levels::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Returns the level tree.
    pub async fn tree(&self) -> RepoResult<Vec<TreeNode<detail_levels::Model>>> {
        Ok(build_tree(self.list().await?))
    }

    /// Finds a level by id.
    pub async fn get(&self, id: Uuid) -> RepoResult<detail_levels::Model> {
        detail_levels::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Creates a level.
    pub async fn create(&self, input: DetailLevelInput) -> RepoResult<detail_levels::Model> {
        let (code, title) = normalize(&input)?;
        let txn = self.db.begin().await?;
        self.check_parent(&txn, None, input.parent_id).await?;

        let now = Utc::now().into();
        let created = detail_levels::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            title: Set(title),
            parent_id: Set(input.parent_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(detail_level_id = %created.id, "Detail level created");
        Ok(created)
    }

    /// Updates a level, re-validating its parent.
    pub async fn update(
        &self,
        id: Uuid,
        input: DetailLevelInput,
    ) -> RepoResult<detail_levels::Model> {
        let (code, title) = normalize(&input)?;
        let txn = self.db.begin().await?;
        let existing = detail_levels::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;
        if input.parent_id == Some(id) {
            return Err(TaxonomyError::InvalidParent("a level cannot be its own parent".into()).into());
        }
        self.check_parent(&txn, Some(id), input.parent_id).await?;

        let mut active: detail_levels::ActiveModel = existing.into();
        active.code = Set(code);
        active.title = Set(title);
        active.parent_id = Set(input.parent_id);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(detail_level_id = %id, "Detail level updated");
        Ok(updated)
    }

    /// Deletes a level without children or links.
    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let txn = self.db.begin().await?;
        detail_levels::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;

        let children = detail_levels::Entity::find()
            .filter(detail_levels::Column::ParentId.eq(id))
            .count(&txn)
            .await?;
        let links = details_detail_levels::Entity::find()
            .filter(details_detail_levels::Column::DetailLevelId.eq(id))
            .count(&txn)
            .await?;
        LevelService::ensure_deletable(id, children, links)?;

        detail_levels::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(detail_level_id = %id, "Detail level deleted");
        Ok(())
    }

    async fn check_parent<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        id: Option<Uuid>,
        parent_id: Option<Uuid>,
    ) -> RepoResult<()> {
        let Some(parent) = parent_id else {
            return Ok(());
        };
        detail_levels::Entity::find_by_id(parent)
            .one(conn)
            .await?
            .ok_or_else(|| TaxonomyError::InvalidParent(format!("detail level {parent} not found")))?;

        let parent_is_linked = details_detail_levels::Entity::find()
            .filter(details_detail_levels::Column::DetailLevelId.eq(parent))
            .count(conn)
            .await?
            > 0;

        let parent_of: HashMap<Uuid, Option<Uuid>> = detail_levels::Entity::find()
            .all(conn)
            .await?
            .into_iter()
            .map(|level| (level.id, level.parent_id))
            .collect();

        LevelService::validate_parent(id, Some(parent), parent_is_linked, |node| {
            parent_of.get(&node).copied().flatten()
        })?;
        Ok(())
    }
}

fn normalize(input: &DetailLevelInput) -> Result<(String, String), TaxonomyError> {
    let code = input.code.trim();
    if code.is_empty() {
        return Err(TaxonomyError::RequiredField("code"));
    }
    let title = input.title.trim();
    if title.is_empty() {
        return Err(TaxonomyError::RequiredField("title"));
    }
    Ok((code.to_string(), title.to_string()))
}
