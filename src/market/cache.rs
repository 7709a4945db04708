use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::provider::{MarketDataProvider, ProviderError};
use super::types::{CompanyMetadata, Period, PriceSeries};

/// Configuration for response caching
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
    pub ttl: Duration,
}

/// Get the platform-appropriate cache directory for oppscore
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("oppscore/http-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/oppscore/http-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the cache directory
pub fn clear_cache() -> Result<()> {
    let cache_path = get_cache_path();
    match std::fs::remove_dir_all(&cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// What we persist per key
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    fetched_at: i64, // Unix timestamp
    value: T,
}

fn history_key(symbol: &str, period: Period) -> String {
    format!("history:{}:{}", symbol.to_uppercase(), period.code())
}

fn metadata_key(symbol: &str) -> String {
    format!("metadata:{}", symbol.to_uppercase())
}

/// Disk-persistent cache in front of another provider.
///
/// Only successful, non-empty answers are stored. Any failure to read or
/// write the cache is logged and the request goes to the inner provider.
pub struct CachedProvider<P> {
    inner: P,
    cache_path: PathBuf,
    ttl: Duration,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self::with_path(inner, get_cache_path(), ttl)
    }

    pub fn with_path(inner: P, cache_path: PathBuf, ttl: Duration) -> Self {
        Self {
            inner,
            cache_path,
            ttl,
        }
    }

    fn is_fresh(&self, fetched_at: i64) -> bool {
        let age = Utc::now().timestamp() - fetched_at;
        age >= 0 && (age as u64) < self.ttl.as_secs()
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match cacache::read_sync(&self.cache_path, key) {
            Ok(bytes) => bytes,
            Err(cacache::Error::EntryNotFound(..)) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read cache entry");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring corrupt cache entry");
                return None;
            }
        };

        if self.is_fresh(entry.fetched_at) {
            tracing::debug!(key, "cache hit");
            Some(entry.value)
        } else {
            tracing::debug!(key, "cache entry expired");
            None
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        let entry = CacheEntry {
            fetched_at: Utc::now().timestamp(),
            value,
        };
        let result = serde_json::to_vec(&entry)
            .map_err(anyhow::Error::from)
            .and_then(|json| {
                cacache::write_sync(&self.cache_path, key, json)
                    .map(|_| ())
                    .map_err(anyhow::Error::from)
            });
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "failed to write cache entry");
        }
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries, ProviderError> {
        let key = history_key(symbol, period);
        if let Some(series) = self.read::<PriceSeries>(&key) {
            return Ok(series);
        }

        let series = self.inner.history(symbol, period).await?;
        if !series.is_empty() {
            self.write(&key, &series);
        }
        Ok(series)
    }

    async fn metadata(&self, symbol: &str) -> Result<CompanyMetadata, ProviderError> {
        let key = metadata_key(symbol);
        if let Some(metadata) = self.read::<CompanyMetadata>(&key) {
            return Ok(metadata);
        }

        let metadata = self.inner.metadata(symbol).await?;
        self.write(&key, &metadata);
        Ok(metadata)
    }
}
