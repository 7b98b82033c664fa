//! Chart of accounts.
//!
//! - Three-level codes (group → general → specific)
//! - Four-digit detail accounts, flat and globally unique
//! - The detail-level tree details are classified under (leaf-only links)

pub mod code;
pub mod detail;
pub mod error;
pub mod level;
pub mod tree;

#[cfg(test)]
mod tree_props;

pub use code::{CodeKind, CodePayload, CodeService, Nature, ParentInfo, ValidatedCode};
pub use detail::{DetailKind, ensure_user_managed, next_detail_code, validate_detail_code};
pub use error::TaxonomyError;
pub use level::LevelService;
pub use tree::{TreeItem, TreeNode, build_tree, would_create_cycle};
