//! TTL-bound caching for rate providers.
//!
//! The cache key is the ordered pair `from-to`; the reverse pair is cached
//! independently. Concurrent lookups for the same key share one in-flight
//! future, so at most one request per key reaches the network per TTL
//! window. Failed lookups are evicted immediately and are never served from
//! cache.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::rates::{RateProvider, RateTable};

pub const RATE_TTL: Duration = Duration::from_secs(300);

type SharedLookup = Shared<BoxFuture<'static, Result<f64, String>>>;

struct CacheEntry {
    inserted_at: Instant,
    generation: u64,
    lookup: SharedLookup,
}

pub struct CachingRateProvider<T: RateProvider + 'static> {
    inner: Arc<T>,
    ttl: Duration,
    next_generation: AtomicU64,
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl<T: RateProvider + 'static> CachingRateProvider<T> {
    pub fn new(inner: T) -> Self {
        Self::with_ttl(inner, RATE_TTL)
    }

    pub fn with_ttl(inner: T, ttl: Duration) -> Self {
        CachingRateProvider {
            inner: Arc::new(inner),
            ttl,
            next_generation: AtomicU64::new(0),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl<T: RateProvider + 'static> RateProvider for CachingRateProvider<T> {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        if from == to {
            return Ok(1.0);
        }

        let key = format!("{from}-{to}");
        let (lookup, generation) = {
            let mut entries = self.entries.lock().await;
            match entries.get(&key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    debug!("Cache hit for currency rate: {}", key);
                    (entry.lookup.clone(), entry.generation)
                }
                _ => {
                    debug!("Cache miss for currency rate: {}", key);
                    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                    let inner = Arc::clone(&self.inner);
                    let (from, to) = (from.to_string(), to.to_string());
                    let lookup = async move {
                        inner
                            .get_rate(&from, &to)
                            .await
                            .map_err(|e| e.to_string())
                    }
                    .boxed()
                    .shared();
                    entries.insert(
                        key.clone(),
                        CacheEntry {
                            inserted_at: Instant::now(),
                            generation,
                            lookup: lookup.clone(),
                        },
                    );
                    (lookup, generation)
                }
            }
        };

        match lookup.await {
            Ok(rate) => Ok(rate),
            Err(e) => {
                // Evict so the next caller retries, unless a newer lookup
                // already replaced this entry.
                let mut entries = self.entries.lock().await;
                if entries
                    .get(&key)
                    .is_some_and(|entry| entry.generation == generation)
                {
                    entries.remove(&key);
                }
                Err(anyhow!(e))
            }
        }
    }

    async fn latest_rates(&self, base: &str) -> Result<RateTable> {
        self.inner.latest_rates(base).await
    }
}
