use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::types::{CompanyMetadata, Period, PriceSeries};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The provider cannot resolve the ticker at all
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Network failure, rate limit, upstream outage
    #[error("market data request failed: {0}")]
    Fetch(String),

    /// The provider answered with something we could not interpret
    #[error("malformed market data: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Only transport-level failures are worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Fetch(_))
    }
}

/// Source of price history and company fundamentals.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars over `period`, oldest first. An empty series means the
    /// symbol resolved but has no data for the window.
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries, ProviderError>;

    async fn metadata(&self, symbol: &str) -> Result<CompanyMetadata, ProviderError>;
}

#[async_trait]
impl<P: MarketDataProvider + ?Sized> MarketDataProvider for std::sync::Arc<P> {
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries, ProviderError> {
        (**self).history(symbol, period).await
    }

    async fn metadata(&self, symbol: &str) -> Result<CompanyMetadata, ProviderError> {
        (**self).metadata(symbol).await
    }
}

/// Run `action` with exponential backoff (up to three retries), retrying transient errors only
pub async fn with_retry<T, F, Fut>(action: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(Duration::from_secs(5))
        .take(3);

    RetryIf::start(retry_strategy, action, |e: &ProviderError| {
        if e.is_transient() {
            tracing::debug!(error = %e, "retrying market data request");
        }
        e.is_transient()
    })
    .await
}

/// In-memory provider serving fixed data, keyed by upper-case symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    entries: HashMap<String, (PriceSeries, CompanyMetadata)>,
    failure: Option<ProviderError>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(
        mut self,
        symbol: &str,
        series: PriceSeries,
        metadata: CompanyMetadata,
    ) -> Self {
        self.entries.insert(symbol.to_uppercase(), (series, metadata));
        self
    }

    /// Make every request fail with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self {
            entries: HashMap::new(),
            failure: Some(error),
        }
    }

    fn lookup(&self, symbol: &str) -> Result<&(PriceSeries, CompanyMetadata), ProviderError> {
        if let Some(ref error) = self.failure {
            return Err(error.clone());
        }
        self.entries
            .get(&symbol.to_uppercase())
            .ok_or_else(|| ProviderError::UnknownSymbol(symbol.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn history(&self, symbol: &str, _period: Period) -> Result<PriceSeries, ProviderError> {
        self.lookup(symbol).map(|(series, _)| series.clone())
    }

    async fn metadata(&self, symbol: &str) -> Result<CompanyMetadata, ProviderError> {
        self.lookup(symbol).map(|(_, meta)| meta.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_static_provider_unknown_symbol() {
        let provider = StaticProvider::new();
        let err = provider.metadata("NOPE").await.unwrap_err();
        assert_eq!(err, ProviderError::UnknownSymbol("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_static_provider_is_case_insensitive() {
        let provider = StaticProvider::new().with_symbol(
            "shop.to",
            PriceSeries::default(),
            CompanyMetadata::default().with_sector("Technology"),
        );
        let meta = provider.metadata("SHOP.TO").await.unwrap();
        assert_eq!(meta.sector.as_deref(), Some("Technology"));
    }

    #[tokio::test]
    async fn test_retry_stops_on_unknown_symbol() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::UnknownSymbol("X".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_retries_transient_errors() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result = with_retry(|| async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(ProviderError::Fetch("connection reset".to_string()))
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_three_retries() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<(), _> = with_retry(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Fetch("timeout".to_string()))
        })
        .await;
        assert!(result.is_err());
        // first attempt plus one per backoff step
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
