//! Builds nested trees from flat `parent_id` rows in a single grouping pass.

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// A node with its children, serialized with the item's fields inline.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<T> {
    /// The row itself.
    #[serde(flatten)]
    pub item: T,
    /// Child nodes, in input order.
    pub children: Vec<TreeNode<T>>,
}

/// Rows that know their own id and parent id.
pub trait TreeItem {
    /// Row id.
    fn id(&self) -> Uuid;
    /// Parent row id.
    fn parent_id(&self) -> Option<Uuid>;
}

/// Groups rows by parent once, then assembles nodes from the roots down.
///
/// Rows whose parent is absent from `items` are treated as roots. Rows caught
/// in a parent cycle have no root and are left out. Sibling order follows
/// input order, so callers sort (e.g. by code) before building.
pub fn build_tree<T: TreeItem>(items: Vec<T>) -> Vec<TreeNode<T>> {
    let ids: std::collections::HashSet<Uuid> = items.iter().map(TreeItem::id).collect();
    let mut by_parent: HashMap<Option<Uuid>, Vec<T>> = HashMap::new();

    for item in items {
        let key = item.parent_id().filter(|p| ids.contains(p));
        by_parent.entry(key).or_default().push(item);
    }

    let roots = by_parent.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|item| attach(item, &mut by_parent))
        .collect()
}

fn attach<T: TreeItem>(item: T, by_parent: &mut HashMap<Option<Uuid>, Vec<T>>) -> TreeNode<T> {
    let children = by_parent
        .remove(&Some(item.id()))
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach(child, by_parent))
        .collect();
    TreeNode { item, children }
}

/// Returns true when re-parenting `id` under `new_parent` would form a cycle.
///
/// `parent_of` returns the current parent of a node, or `None` for roots and
/// unknown ids.
pub fn would_create_cycle<F>(id: Uuid, new_parent: Option<Uuid>, parent_of: F) -> bool
where
    F: Fn(Uuid) -> Option<Uuid>,
{
    let mut cursor = new_parent;
    let mut steps = 0usize;
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        steps += 1;
        if steps > 10_000 {
            // Existing data already cycles; refuse rather than loop forever.
            return true;
        }
        cursor = parent_of(current);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: Uuid,
        parent: Option<Uuid>,
        name: &'static str,
    }

    impl TreeItem for Row {
        fn id(&self) -> Uuid {
            self.id
        }
        fn parent_id(&self) -> Option<Uuid> {
            self.parent
        }
    }

    fn row(name: &'static str, parent: Option<Uuid>) -> Row {
        Row {
            id: Uuid::new_v4(),
            parent,
            name,
        }
    }

    #[test]
    fn test_three_levels() {
        let group = row("11", None);
        let general = row("1101", Some(group.id));
        let specific_a = row("110101", Some(general.id));
        let specific_b = row("110102", Some(general.id));
        let other_group = row("21", None);

        let tree = build_tree(vec![
            group.clone(),
            general.clone(),
            specific_a,
            specific_b,
            other_group,
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].item.name, "11");
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children.len(), 2);
        assert_eq!(tree[0].children[0].children[0].item.name, "110101");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_orphans_become_roots() {
        let orphan = row("9901", Some(Uuid::new_v4()));
        let tree = build_tree(vec![orphan]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_child_before_parent_in_input() {
        let parent = row("11", None);
        let child = row("1101", Some(parent.id));
        let tree = build_tree(vec![child, parent]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
    }

    #[test]
    fn test_cycle_detection() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        // c -> b -> a (root)
        let parent_of = |id: Uuid| {
            if id == c {
                Some(b)
            } else if id == b {
                Some(a)
            } else {
                None
            }
        };

        assert!(would_create_cycle(a, Some(c), parent_of));
        assert!(would_create_cycle(a, Some(a), parent_of));
        assert!(!would_create_cycle(c, Some(a), parent_of));
        assert!(!would_create_cycle(b, None, parent_of));
    }
}
