//! Property-based tests for tree assembly and leaf-only linking.

use proptest::prelude::*;
use uuid::Uuid;

use super::error::TaxonomyError;
use super::level::LevelService;
use super::tree::{TreeItem, TreeNode, build_tree};

#[derive(Debug, Clone)]
struct Level {
    id: Uuid,
    parent: Option<Uuid>,
}

impl TreeItem for Level {
    fn id(&self) -> Uuid {
        self.id
    }
    fn parent_id(&self) -> Option<Uuid> {
        self.parent
    }
}

/// Strategy producing a forest: each node's parent is one of the earlier nodes or none.
fn forest() -> impl Strategy<Value = Vec<Level>> {
    prop::collection::vec(prop::option::weighted(0.7, any::<prop::sample::Index>()), 1..40)
        .prop_map(|parents| {
            let mut levels: Vec<Level> = Vec::with_capacity(parents.len());
            for parent in parents {
                let parent = match parent {
                    Some(index) if !levels.is_empty() => Some(levels[index.index(levels.len())].id),
                    _ => None,
                };
                levels.push(Level {
                    id: Uuid::new_v4(),
                    parent,
                });
            }
            levels
        })
}

fn count(nodes: &[TreeNode<Level>]) -> usize {
    nodes.iter().map(|n| 1 + count(&n.children)).sum()
}

fn child_count(levels: &[Level], id: Uuid) -> u64 {
    levels.iter().filter(|l| l.parent == Some(id)).count() as u64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every row of an acyclic forest appears exactly once in the tree.
    #[test]
    fn prop_tree_keeps_every_node(levels in forest()) {
        let total = levels.len();
        let tree = build_tree(levels);
        prop_assert_eq!(count(&tree), total);
    }

    /// Linking succeeds exactly for nodes without children.
    #[test]
    fn prop_only_leaves_are_linkable(levels in forest(), pick in any::<prop::sample::Index>()) {
        let target = &levels[pick.index(levels.len())];
        let children = child_count(&levels, target.id);
        let result = LevelService::ensure_linkable(target.id, children);

        if children == 0 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(TaxonomyError::LinkMustBeLeaf(target.id)));
        }
    }

    /// Re-parenting a node under any of its descendants is refused.
    #[test]
    fn prop_descendant_parent_is_cycle(levels in forest(), pick in any::<prop::sample::Index>()) {
        let target = levels[pick.index(levels.len())].id;
        let parent_of = |id: Uuid| levels.iter().find(|l| l.id == id).and_then(|l| l.parent);

        for level in &levels {
            let mut cursor = Some(level.id);
            let mut is_descendant = false;
            while let Some(current) = cursor {
                if current == target {
                    is_descendant = true;
                    break;
                }
                cursor = parent_of(current);
            }

            let result = LevelService::validate_parent(Some(target), Some(level.id), false, parent_of);
            prop_assert_eq!(result.is_err(), is_descendant);
        }
    }
}
