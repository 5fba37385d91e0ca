//! Durable insight cache.
//!
//! Mirrors the app's `aiInsights` storage entry: one record carrying its
//! generation timestamp, so a fresh entry suppresses the remote AI call
//! across restarts. Freshness is judged by the reader, not enforced here.

use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

use crate::core::insights::InsightSet;

const INSIGHTS_KEY: &str = "aiInsights";

pub struct InsightStore {
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl InsightStore {
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
        let keyspace = fjall::Config::new(dir)
            .open()
            .with_context(|| format!("Failed to open cache keyspace: {}", dir.display()))?;
        let partition = keyspace
            .open_partition("insights", PartitionCreateOptions::default())
            .context("Failed to open insights partition")?;
        Ok(InsightStore {
            _keyspace: keyspace,
            partition,
        })
    }

    pub fn load(&self) -> Option<InsightSet> {
        match self.partition.get(INSIGHTS_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(set) => Some(set),
                Err(e) => {
                    debug!("Discarding undecodable insight cache entry: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!("Insight cache read failed: {e}");
                None
            }
        }
    }

    pub fn save(&self, set: &InsightSet) -> Result<()> {
        let bytes = serde_json::to_vec(set).context("Failed to encode insights")?;
        self.partition
            .insert(INSIGHTS_KEY, bytes)
            .context("Failed to write insight cache")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::insights::BudgetInsight;
    use tempfile::tempdir;

    fn sample_set() -> InsightSet {
        InsightSet {
            insights: vec![BudgetInsight {
                title: "T".to_string(),
                body: "B".to_string(),
                category: Some("Food".to_string()),
            }],
            last_updated: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let store = InsightStore::open(dir.path()).unwrap();

        assert!(store.load().is_none());
        store.save(&sample_set()).unwrap();
        assert_eq!(store.load(), Some(sample_set()));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = InsightStore::open(dir.path()).unwrap();
            store.save(&sample_set()).unwrap();
        }
        let store = InsightStore::open(dir.path()).unwrap();
        assert_eq!(store.load(), Some(sample_set()));
    }
}
