//! Resolution of treasury mapping keys to account code ids.
//!
//! Each key resolves, first match wins:
//! 1. environment variable named after the key holding a `codes.id` that exists
//! 2. `settings` row whose `code` is the key, using its `special_id`
//! 3. configured fallback code string, looked up by `codes.code`
//!
//! Anything else is a configuration error (`missingMapping`).

use daftar_core::treasury::{MappingKey, TreasuryError};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::collections::HashMap;
use uuid::Uuid;

use super::error::RepoResult;
use crate::entities::{codes, settings};

/// Mapping key resolver shared by receipt and payment posting.
#[derive(Debug, Clone, Default)]
pub struct MappingResolver {
    overrides: HashMap<MappingKey, String>,
    fallbacks: HashMap<MappingKey, String>,
}

impl MappingResolver {
    /// Creates a resolver from explicit overrides and fallback code strings.
    #[must_use]
    pub fn new(overrides: HashMap<MappingKey, String>, fallbacks: HashMap<MappingKey, String>) -> Self {
        Self {
            overrides,
            fallbacks,
        }
    }

    /// Reads overrides from the process environment. Fallback keys that are
    /// not mapping keys are ignored with a warning.
    #[must_use]
    pub fn from_env(fallback_codes: &HashMap<String, String>) -> Self {
        let overrides = MappingKey::ALL
            .into_iter()
            .filter_map(|key| std::env::var(key.as_str()).ok().map(|v| (key, v)))
            .collect();

        let fallbacks = fallback_codes
            .iter()
            .filter_map(|(name, code)| match MappingKey::parse(name) {
                Some(key) => Some((key, code.clone())),
                None => {
                    tracing::warn!(key = %name, "Ignoring unknown treasury fallback key");
                    None
                }
            })
            .collect();

        Self::new(overrides, fallbacks)
    }

    /// Resolves one key to a code id.
    pub async fn resolve<C: ConnectionTrait>(&self, conn: &C, key: MappingKey) -> RepoResult<Uuid> {
        if let Some(raw) = self.overrides.get(&key) {
            match Uuid::parse_str(raw.trim()) {
                Ok(id) if code_exists(conn, id).await? => return Ok(id),
                Ok(id) => tracing::warn!(key = %key, code_id = %id, "Mapped code id does not exist"),
                Err(_) => tracing::warn!(key = %key, "Mapping override is not a UUID"),
            }
        }

        let setting = settings::Entity::find()
            .filter(settings::Column::Code.eq(key.as_str()))
            .one(conn)
            .await?;
        if let Some(id) = setting.and_then(|s| s.special_id) {
            return Ok(id);
        }

        if let Some(code) = self.fallbacks.get(&key) {
            let found = codes::Entity::find()
                .filter(codes::Column::Code.eq(code.as_str()))
                .one(conn)
                .await?;
            if let Some(found) = found {
                return Ok(found.id);
            }
            tracing::warn!(key = %key, code = %code, "Fallback code not found");
        }

        tracing::error!(key = %key, "No code mapping configured");
        Err(TreasuryError::MissingMapping(key).into())
    }

    /// Resolves every key, failing on the first missing one.
    pub async fn resolve_all<C: ConnectionTrait>(
        &self,
        conn: &C,
        keys: &[MappingKey],
    ) -> RepoResult<HashMap<MappingKey, Uuid>> {
        let mut resolved = HashMap::with_capacity(keys.len());
        for &key in keys {
            resolved.insert(key, self.resolve(conn, key).await?);
        }
        Ok(resolved)
    }
}

async fn code_exists<C: ConnectionTrait>(conn: &C, id: Uuid) -> RepoResult<bool> {
    Ok(codes::Entity::find_by_id(id).count(conn).await? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_keys_are_normalized() {
        let mut raw = HashMap::new();
        raw.insert("receipt_cash_code_id".to_string(), "1101".to_string());
        raw.insert("NOT_A_KEY".to_string(), "9999".to_string());

        let resolver = MappingResolver::from_env(&raw);

        assert_eq!(
            resolver.fallbacks.get(&MappingKey::ReceiptCash).map(String::as_str),
            Some("1101")
        );
        assert_eq!(resolver.fallbacks.len(), 1);
    }
}
