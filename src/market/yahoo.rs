use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;
use yahoo_finance_api::YahooConnector;

use super::provider::{with_retry, MarketDataProvider, ProviderError};
use super::types::{Bar, CompanyMetadata, Period, PriceSeries};

/// Market data from Yahoo Finance.
///
/// The quote summary connector keeps the crumb/cookie pair it needs behind a
/// lock. Chart requests go through their own connector and never wait on it.
pub struct YahooProvider {
    charts: YahooConnector,
    summaries: Mutex<YahooConnector>,
}

impl YahooProvider {
    pub fn new() -> Result<Self> {
        let charts = YahooConnector::new().context("Failed to create Yahoo Finance client")?;
        let summaries = YahooConnector::new().context("Failed to create Yahoo Finance client")?;
        Ok(Self {
            charts,
            summaries: Mutex::new(summaries),
        })
    }
}

/// Map a provider error message onto our taxonomy
pub fn classify_error(symbol: &str, message: &str) -> ProviderError {
    let lower = message.to_lowercase();
    if lower.contains("no data found")
        || lower.contains("not found")
        || lower.contains("404")
        || lower.contains("delisted")
        || lower.contains("invalid symbol")
    {
        ProviderError::UnknownSymbol(symbol.to_string())
    } else if lower.contains("deserializ")
        || lower.contains("invalid json")
        || lower.contains("missing field")
    {
        ProviderError::Malformed(message.to_string())
    } else if lower.contains("429") || lower.contains("too many requests") {
        ProviderError::Fetch(
            "Yahoo Finance rate limit exceeded. Wait a few minutes and try again.".to_string(),
        )
    } else {
        ProviderError::Fetch(message.to_string())
    }
}

/// True when the chart endpoint resolved the symbol but returned no rows
fn is_empty_result(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("no quotes") || lower.contains("empty data") || lower.contains("no result")
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries, ProviderError> {
        let quotes = with_retry(|| async move {
            let response = self
                .charts
                .get_quote_range(symbol, "1d", period.range())
                .await
                .map_err(|e| classify_error(symbol, &e.to_string()))?;

            match response.quotes() {
                Ok(quotes) => Ok(quotes),
                Err(e) if is_empty_result(&e.to_string()) => Ok(Vec::new()),
                Err(e) => Err(classify_error(symbol, &e.to_string())),
            }
        })
        .await?;

        let total = quotes.len();
        let bars: Vec<Bar> = quotes
            .iter()
            .filter_map(|q| {
                let timestamp = Utc.timestamp_opt(q.timestamp as i64, 0).single()?;
                let bar = Bar::new(timestamp, q.close, q.volume as f64);
                if bar.is_valid() {
                    Some(bar)
                } else {
                    tracing::debug!(symbol, close = q.close, "dropping bar with invalid close");
                    None
                }
            })
            .collect();

        if bars.len() < total {
            tracing::warn!(
                symbol,
                dropped = total - bars.len(),
                "some bars were unusable and were skipped"
            );
        }
        tracing::debug!(symbol, period = %period, bars = bars.len(), "fetched price history");

        PriceSeries::new(bars).map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    async fn metadata(&self, symbol: &str) -> Result<CompanyMetadata, ProviderError> {
        let summary = with_retry(|| async move {
            let mut connector = self.summaries.lock().await;
            connector
                .get_ticker_info(symbol)
                .await
                .map_err(|e| classify_error(symbol, &e.to_string()))
        })
        .await?;

        let data = summary
            .quote_summary
            .and_then(|qs| qs.result)
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::UnknownSymbol(symbol.to_string()))?;

        let profile = data.asset_profile.as_ref();
        let financial = data.financial_data.as_ref();
        let quote_type = data.quote_type.as_ref();

        let metadata = CompanyMetadata {
            name: quote_type.and_then(|qt| qt.long_name.clone().or(qt.short_name.clone())),
            currency: financial.and_then(|fd| fd.financial_currency.clone()),
            sector: profile.and_then(|p| p.sector.clone()),
            profit_margins: financial.and_then(|fd| fd.profit_margins),
            debt_to_equity: financial.and_then(|fd| fd.debt_to_equity),
            current_ratio: financial.and_then(|fd| fd.current_ratio),
        };

        tracing::debug!(
            symbol,
            sector = ?metadata.sector,
            profit_margins = ?metadata.profit_margins,
            debt_to_equity = ?metadata.debt_to_equity,
            current_ratio = ?metadata.current_ratio,
            "fetched company metadata"
        );

        Ok(metadata)
    }
}
