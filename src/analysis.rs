use serde::Serialize;
use std::time::Duration;

use crate::market::{CompanyMetadata, MarketDataProvider, Period, PriceSeries, ProviderError};
use crate::scoring::{score_series, Rating, ScoreError, ScoreResult, SectorGrowthTable};

const HINT_SYMBOL_FORMAT: &str = "Vérifiez le format du symbole (ex: TSLA, SHOP.TO)";
const HINT_OTHER_PERIOD: &str = "Essayez une période différente";

/// Everything that can stop one analysis. None of these are fatal to the
/// program; callers display the message and the hints.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Symbole non reconnu : {0}")]
    UnknownSymbol(String),

    #[error("Aucune donnée disponible pour {symbol} ({})", .period.label())]
    NoDataAvailable { symbol: String, period: Period },

    #[error("Aucune donnée disponible")]
    InsufficientData,

    #[error("Erreur technique : délai dépassé ({})", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("Erreur technique : {0}")]
    Provider(String),
}

impl AnalysisError {
    /// Remediation advice shown under the message
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            AnalysisError::NoDataAvailable { .. } | AnalysisError::InsufficientData => {
                &[HINT_OTHER_PERIOD]
            }
            AnalysisError::UnknownSymbol(_)
            | AnalysisError::Timeout(_)
            | AnalysisError::Provider(_) => &[HINT_SYMBOL_FORMAT, HINT_OTHER_PERIOD],
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalysisError::UnknownSymbol(_)
            | AnalysisError::NoDataAvailable { .. }
            | AnalysisError::InsufficientData => 1,
            AnalysisError::Timeout(_) | AnalysisError::Provider(_) => 2,
        }
    }
}

impl From<ProviderError> for AnalysisError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::UnknownSymbol(symbol) => AnalysisError::UnknownSymbol(symbol),
            other => AnalysisError::Provider(other.to_string()),
        }
    }
}

impl From<ScoreError> for AnalysisError {
    fn from(e: ScoreError) -> Self {
        match e {
            ScoreError::InsufficientData => AnalysisError::InsufficientData,
        }
    }
}

/// A completed analysis, ready to render
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub symbol: String,
    pub period: Period,
    #[serde(skip)]
    pub series: PriceSeries,
    pub metadata: CompanyMetadata,
    pub result: ScoreResult,
}

impl Analysis {
    pub fn rating(&self) -> Rating {
        Rating::of(&self.result)
    }
}

/// Trim and upper-case user input. Returns None for a blank symbol.
pub fn normalize_symbol(input: &str) -> Option<String> {
    let symbol = input.trim();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol.to_uppercase())
    }
}

/// Fetch metadata and history concurrently, then score.
///
/// An unknown symbol reported by either request wins over other failures so
/// the user sees the most actionable message.
///
/// This function is called from main.rs for the one-shot commands and from
/// the TUI event loop in a background task.
pub async fn analyze<P: MarketDataProvider + ?Sized>(
    provider: &P,
    symbol: &str,
    period: Period,
    table: &SectorGrowthTable,
    timeout: Duration,
) -> Result<Analysis, AnalysisError> {
    tracing::debug!(symbol, period = %period, "starting analysis");

    let fetch = async { tokio::join!(provider.metadata(symbol), provider.history(symbol, period)) };
    let (metadata, history) = tokio::time::timeout(timeout, fetch)
        .await
        .map_err(|_| AnalysisError::Timeout(timeout))?;

    let (metadata, series) = match (metadata, history) {
        (Ok(metadata), Ok(series)) => (metadata, series),
        (Err(ProviderError::UnknownSymbol(s)), _) | (_, Err(ProviderError::UnknownSymbol(s))) => {
            return Err(AnalysisError::UnknownSymbol(s));
        }
        (Err(e), _) | (_, Err(e)) => return Err(e.into()),
    };

    if series.is_empty() {
        return Err(AnalysisError::NoDataAvailable {
            symbol: symbol.to_string(),
            period,
        });
    }

    let result = score_series(&series, &metadata, table)?;

    Ok(Analysis {
        symbol: symbol.to_string(),
        period,
        series,
        metadata,
        result,
    })
}
