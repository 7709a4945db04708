pub mod cache;
pub mod provider;
pub mod types;
pub mod yahoo;

use anyhow::Result;
use std::sync::Arc;

pub use cache::{clear_cache, CacheConfig, CachedProvider};
pub use provider::{MarketDataProvider, ProviderError, StaticProvider};
pub use types::{Bar, CompanyMetadata, Period, PriceSeries, SeriesError};
pub use yahoo::YahooProvider;

/// Create the Yahoo Finance provider, behind the disk cache unless disabled
pub fn create_provider(cache_config: &CacheConfig) -> Result<Arc<dyn MarketDataProvider>> {
    let yahoo = YahooProvider::new()?;
    if cache_config.enabled {
        Ok(Arc::new(CachedProvider::new(yahoo, cache_config.ttl)))
    } else {
        Ok(Arc::new(yahoo))
    }
}
