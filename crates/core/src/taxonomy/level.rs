//! Detail-level tree rules.

use uuid::Uuid;

use super::error::TaxonomyError;
use super::tree::would_create_cycle;

/// Stateless rules for detail levels and their links to details.
pub struct LevelService;

impl LevelService {
    /// Only leaf levels (no children) may be linked to a detail.
    pub fn ensure_linkable(level_id: Uuid, child_count: u64) -> Result<(), TaxonomyError> {
        if child_count > 0 {
            return Err(TaxonomyError::LinkMustBeLeaf(level_id));
        }
        Ok(())
    }

    /// Validates a new parent for a level.
    ///
    /// A level that is already linked to details must stay a leaf, so a
    /// linked level cannot become anybody's parent.
    pub fn validate_parent<F>(
        id: Option<Uuid>,
        new_parent: Option<Uuid>,
        parent_is_linked: bool,
        parent_of: F,
    ) -> Result<(), TaxonomyError>
    where
        F: Fn(Uuid) -> Option<Uuid>,
    {
        let Some(parent) = new_parent else {
            return Ok(());
        };
        if parent_is_linked {
            return Err(TaxonomyError::InvalidParent(format!(
                "detail level {parent} is linked to details and must stay a leaf"
            )));
        }
        if let Some(id) = id
            && would_create_cycle(id, Some(parent), parent_of)
        {
            return Err(TaxonomyError::InvalidParent(format!(
                "moving {id} under {parent} creates a cycle"
            )));
        }
        Ok(())
    }

    /// Deletion is refused while children or links exist.
    pub fn ensure_deletable(
        level_id: Uuid,
        child_count: u64,
        link_count: u64,
    ) -> Result<(), TaxonomyError> {
        if child_count > 0 {
            return Err(TaxonomyError::HasChildren(level_id));
        }
        if link_count > 0 {
            return Err(TaxonomyError::LevelInUse(level_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_is_linkable() {
        let id = Uuid::new_v4();
        assert!(LevelService::ensure_linkable(id, 0).is_ok());
        assert_eq!(
            LevelService::ensure_linkable(id, 1),
            Err(TaxonomyError::LinkMustBeLeaf(id))
        );
    }

    #[test]
    fn test_linked_level_cannot_become_parent() {
        let parent = Uuid::new_v4();
        let result = LevelService::validate_parent(None, Some(parent), true, |_| None);
        assert!(matches!(result, Err(TaxonomyError::InvalidParent(_))));
    }

    #[test]
    fn test_self_parent_rejected() {
        let id = Uuid::new_v4();
        let result = LevelService::validate_parent(Some(id), Some(id), false, |_| None);
        assert!(matches!(result, Err(TaxonomyError::InvalidParent(_))));
    }

    #[test]
    fn test_root_always_valid() {
        assert!(LevelService::validate_parent(Some(Uuid::new_v4()), None, true, |_| None).is_ok());
    }

    #[test]
    fn test_delete_guards() {
        let id = Uuid::new_v4();
        assert!(LevelService::ensure_deletable(id, 0, 0).is_ok());
        assert_eq!(
            LevelService::ensure_deletable(id, 2, 0),
            Err(TaxonomyError::HasChildren(id))
        );
        assert_eq!(
            LevelService::ensure_deletable(id, 0, 1),
            Err(TaxonomyError::LevelInUse(id))
        );
    }
}
