use serde::{Deserialize, Serialize};

use super::config::SectorGrowthTable;
use super::factors::{self, FinancialBreakdown};
use crate::market::types::{Bar, CompanyMetadata, PriceSeries};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("insufficient data: the price series has no bars")]
    InsufficientData,
}

/// A sub-score together with the metric it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub score: f64,
    pub raw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total: u8,
    pub momentum: SubScore,         // raw: net change over the window, %
    pub volume: SubScore,           // raw: latest volume / mean volume
    pub support: SubScore,          // raw: distance above period low, %
    pub sector_growth: SubScore,    // raw: growth multiplier
    pub financial_health: SubScore, // raw: unclamped sum of terms
    pub sector: Option<String>,
    pub financial: FinancialBreakdown,
}

impl ScoreResult {
    /// Sum of the five sub-scores before flooring
    pub fn unrounded_total(&self) -> f64 {
        self.momentum.score
            + self.volume.score
            + self.support.score
            + self.sector_growth.score
            + self.financial_health.score
    }
}

/// Compute the opportunity score for one security.
///
/// `latest` is normally the last bar of `series`; it is taken separately so
/// callers can score an intraday bar against a daily window.
pub fn compute_score(
    series: &PriceSeries,
    latest: &Bar,
    meta: &CompanyMetadata,
    table: &SectorGrowthTable,
) -> Result<ScoreResult, ScoreError> {
    if series.is_empty() {
        return Err(ScoreError::InsufficientData);
    }

    let (momentum_raw, momentum) = factors::momentum(series);
    let (ratio, volume) = factors::volume(series, latest);
    let (dist, support) = factors::support(series, latest);

    let sector = meta.sector.as_deref();
    let growth_factor = table.get(sector);
    let sector_score = factors::sector_growth(growth_factor);

    let (financial, financial_raw, financial_score) = factors::financial_health(meta);

    let mut result = ScoreResult {
        total: 0,
        momentum: SubScore {
            score: momentum,
            raw: momentum_raw,
        },
        volume: SubScore {
            score: volume,
            raw: ratio,
        },
        support: SubScore {
            score: support,
            raw: dist,
        },
        sector_growth: SubScore {
            score: sector_score,
            raw: growth_factor,
        },
        financial_health: SubScore {
            score: financial_score,
            raw: financial_raw,
        },
        sector: meta.sector.clone(),
        financial,
    };

    // financial_health has no floor, so the sum itself can leave [0, 100]
    result.total = result.unrounded_total().floor().clamp(0.0, 100.0) as u8;

    tracing::debug!(
        total = result.total,
        momentum,
        volume,
        support,
        sector = sector_score,
        financial = financial_score,
        "computed opportunity score"
    );

    Ok(result)
}

/// Score a series against its own last bar
pub fn score_series(
    series: &PriceSeries,
    meta: &CompanyMetadata,
    table: &SectorGrowthTable,
) -> Result<ScoreResult, ScoreError> {
    let latest = *series.last().ok_or(ScoreError::InsufficientData)?;
    compute_score(series, &latest, meta, table)
}
