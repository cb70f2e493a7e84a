//! Blockchain alias resolution over the cached nickname reference table.
//!
//! The reference table maps every known nickname ("eth", "arb", marketing
//! names, per-vendor spellings) to a canonical chain row. Lookups are
//! case-insensitive against the `chain_reference` column; the per-vendor
//! alias columns all share the `chain_text_` prefix and come back with that
//! prefix stripped.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::cache::{BlobStore, Freshness, QueryExecutor, ResultCache};
use crate::errors::CacheError;

/// Cache key under which the nickname table is stored.
pub const CHAIN_NICKNAMES_CACHE_KEY: &str = "chain_nicknames";

/// Columns carrying per-vendor alias spellings.
pub const ALIAS_COLUMN_PREFIX: &str = "chain_text_";

const CHAIN_NICKNAMES_SQL: &str = "
    select
        cn.chain_id
        ,cn.chain_reference
        ,ch.*
    from reference.chain_nicknames cn
    left join core.chains ch on ch.chain_id = cn.chain_id
    ";

const CHAIN_ID_COLUMN: &str = "chain_id";
const CHAIN_NAME_COLUMN: &str = "chain";
const REFERENCE_COLUMN: &str = "chain_reference";

/// A resolved chain: its canonical identity plus every non-empty per-vendor
/// alias, keyed by vendor (alias column name with the prefix stripped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAliases {
    /// Canonical numeric chain id.
    pub chain_id: i64,
    /// Canonical chain name.
    pub chain_name: String,
    /// Vendor name to that vendor's spelling of the chain.
    pub aliases: BTreeMap<String, String>,
}

/// Translates free-form chain nicknames into canonical identities using the
/// warehouse reference table, served through a [`ResultCache`].
#[derive(Debug, Clone)]
pub struct ChainRegistry<E, S> {
    cache: ResultCache<E, S>,
    freshness: Freshness,
}

impl<E, S> ChainRegistry<E, S>
where
    E: QueryExecutor,
    S: BlobStore,
{
    /// Create a registry serving the nickname table with the default
    /// freshness window.
    pub fn new(cache: ResultCache<E, S>) -> Self {
        Self::with_freshness(cache, Freshness::default())
    }

    /// Create a registry with a custom freshness window.
    pub fn with_freshness(cache: ResultCache<E, S>, freshness: Freshness) -> Self {
        Self { cache, freshness }
    }

    /// Resolve a nickname to its canonical chain, or `None` if no row
    /// matches.
    ///
    /// Matching is case-insensitive against the reference column. A nickname
    /// table missing its identity columns is logged and treated as no match;
    /// cache and warehouse failures propagate.
    pub async fn translate(&self, input_chain: &str) -> Result<Option<ChainAliases>, CacheError> {
        let table = self
            .cache
            .get_or_refresh(CHAIN_NICKNAMES_SQL, CHAIN_NICKNAMES_CACHE_KEY, self.freshness)
            .await?;

        let (Some(reference_idx), Some(id_idx), Some(name_idx)) = (
            table.column_index(REFERENCE_COLUMN),
            table.column_index(CHAIN_ID_COLUMN),
            table.column_index(CHAIN_NAME_COLUMN),
        ) else {
            warn!(
                columns = ?table.columns(),
                "nickname table is missing identity columns, treating every lookup as unmatched"
            );
            return Ok(None);
        };

        let wanted = input_chain.to_lowercase();
        for row in table.rows() {
            if row[reference_idx].to_lowercase() != wanted {
                continue;
            }

            let Ok(chain_id) = row[id_idx].parse::<i64>() else {
                warn!(
                    nickname = input_chain,
                    chain_id = %row[id_idx],
                    "matched row carries a non-numeric chain id, skipping"
                );
                continue;
            };

            let mut aliases = BTreeMap::new();
            for (column, cell) in table.columns().iter().zip(row) {
                if let Some(vendor) = column.strip_prefix(ALIAS_COLUMN_PREFIX) {
                    if !cell.is_empty() {
                        aliases.insert(vendor.to_string(), cell.clone());
                    }
                }
            }

            return Ok(Some(ChainAliases {
                chain_id,
                chain_name: row[name_idx].clone(),
                aliases,
            }));
        }

        debug!(nickname = input_chain, "no chain row matched");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    use crate::errors::{StorageError, WarehouseError};
    use crate::table::Table;

    struct FixedExecutor(Table);

    #[async_trait]
    impl QueryExecutor for FixedExecutor {
        async fn execute(&self, _sql: &str) -> Result<Table, WarehouseError> {
            Ok(self.0.clone())
        }
    }

    /// Always-empty store, so every lookup is a cold start hitting the
    /// executor.
    struct EmptyStore(Mutex<Vec<u8>>);

    #[async_trait]
    impl BlobStore for EmptyStore {
        async fn updated_at(&self, _path: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
            Ok(None)
        }
        async fn download(&self, _path: &str) -> Result<Vec<u8>, StorageError> {
            Ok(self.0.lock().unwrap().clone())
        }
        async fn upload(
            &self,
            _path: &str,
            bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<(), StorageError> {
            *self.0.lock().unwrap() = bytes;
            Ok(())
        }
    }

    fn nickname_table() -> Table {
        Table::with_rows(
            vec![
                "chain_id".into(),
                "chain_reference".into(),
                "chain".into(),
                "chain_text_dune".into(),
                "chain_text_coingecko".into(),
            ],
            vec![
                vec![
                    "1".into(),
                    "eth".into(),
                    "Ethereum".into(),
                    "ethereum".into(),
                    "ethereum".into(),
                ],
                vec![
                    "42161".into(),
                    "arb".into(),
                    "Arbitrum".into(),
                    "arbitrum".into(),
                    "".into(),
                ],
            ],
        )
        .unwrap()
    }

    fn registry(table: Table) -> ChainRegistry<FixedExecutor, EmptyStore> {
        ChainRegistry::new(ResultCache::new(
            FixedExecutor(table),
            EmptyStore(Mutex::new(Vec::new())),
        ))
    }

    #[tokio::test]
    async fn test_translate_is_case_insensitive() {
        let registry = registry(nickname_table());
        let resolved = registry.translate("ETH").await.unwrap().unwrap();
        assert_eq!(resolved.chain_id, 1);
        assert_eq!(resolved.chain_name, "Ethereum");
    }

    #[tokio::test]
    async fn test_empty_alias_columns_are_dropped() {
        let registry = registry(nickname_table());
        let resolved = registry.translate("arb").await.unwrap().unwrap();
        assert_eq!(resolved.aliases.len(), 1);
        assert_eq!(resolved.aliases["dune"], "arbitrum");
        assert!(!resolved.aliases.contains_key("coingecko"));
    }

    #[tokio::test]
    async fn test_alias_keys_strip_column_prefix() {
        let registry = registry(nickname_table());
        let resolved = registry.translate("eth").await.unwrap().unwrap();
        assert_eq!(
            resolved.aliases.keys().collect::<Vec<_>>(),
            ["coingecko", "dune"]
        );
    }

    #[tokio::test]
    async fn test_unknown_nickname_is_none() {
        let registry = registry(nickname_table());
        assert!(registry.translate("solana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_identity_columns_is_none() {
        let table = Table::with_rows(
            vec!["something_else".into()],
            vec![vec!["eth".into()]],
        )
        .unwrap();
        let registry = registry(table);
        assert!(registry.translate("eth").await.unwrap().is_none());
    }
}
