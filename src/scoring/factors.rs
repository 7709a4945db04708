use serde::{Deserialize, Serialize};

use crate::market::types::{Bar, CompanyMetadata, PriceSeries};

// Point budget per sub-score
pub const MOMENTUM_MAX: f64 = 25.0;
pub const VOLUME_MAX: f64 = 20.0;
pub const SUPPORT_MAX: f64 = 15.0;
pub const SECTOR_MAX: f64 = 20.0;
pub const FINANCIAL_MAX: f64 = 20.0;

/// Momentum score when price is flat over the window
const MOMENTUM_BASE: f64 = 15.0;
const VOLUME_SCALE: f64 = 12.0;
const SUPPORT_FLOOR: f64 = 3.0;
const SECTOR_BASE: f64 = 15.0;

pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

/// Net change over the window in percent, and its score
pub fn momentum(series: &PriceSeries) -> (f64, f64) {
    let raw = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (last.close - first.close) / first.close * 100.0,
        _ => 0.0,
    };
    (raw, clamp(MOMENTUM_BASE + raw, 0.0, MOMENTUM_MAX))
}

/// Latest volume relative to the window mean, and its score
pub fn volume(series: &PriceSeries, latest: &Bar) -> (f64, f64) {
    let ratio = match series.mean_volume() {
        Some(mean) if mean > 0.0 => latest.volume / mean,
        _ => 1.0,
    };
    (ratio, clamp(VOLUME_SCALE * ratio.ln_1p(), 0.0, VOLUME_MAX))
}

/// Distance above the period low in percent, and its score
pub fn support(series: &PriceSeries, latest: &Bar) -> (f64, f64) {
    let dist = match series.min_close() {
        Some(low) => ((latest.close - low) / low * 100.0).max(0.0),
        None => 0.0,
    };
    (dist, clamp(SUPPORT_MAX - dist / 4.0, SUPPORT_FLOOR, SUPPORT_MAX))
}

/// Score for a sector growth multiplier
pub fn sector_growth(factor: f64) -> f64 {
    clamp(factor * SECTOR_BASE, 0.0, SECTOR_MAX)
}

/// Contribution of each fundamental that was present
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialBreakdown {
    pub profitability: Option<f64>,
    pub leverage: Option<f64>,
    pub liquidity: Option<f64>,
}

impl FinancialBreakdown {
    pub fn from_metadata(meta: &CompanyMetadata) -> Self {
        Self {
            profitability: meta.profit_margins.map(|m| m * 5.0),
            leverage: meta
                .debt_to_equity
                .map(|d| (10.0 - d.min(5.0)).max(0.0)),
            liquidity: meta.current_ratio.map(|r| (r * 2.0).min(5.0)),
        }
    }

    /// Sum of the present terms
    pub fn total(&self) -> f64 {
        [self.profitability, self.leverage, self.liquidity]
            .iter()
            .flatten()
            .sum()
    }
}

/// Unclamped sum of fundamentals, and its score.
///
/// Only the upper bound is enforced: a negative profit margin can push the
/// score below zero.
pub fn financial_health(meta: &CompanyMetadata) -> (FinancialBreakdown, f64, f64) {
    let breakdown = FinancialBreakdown::from_metadata(meta);
    let raw = breakdown.total();
    (breakdown, raw, raw.min(FINANCIAL_MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(points: &[(f64, f64)]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let bars = points
            .iter()
            .enumerate()
            .map(|(i, (close, volume))| Bar::new(start + Duration::days(i as i64), *close, *volume))
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(4.5, 0.0, 10.0), 4.5);
    }

    #[test]
    fn test_momentum_flat_is_fifteen() {
        let s = series(&[(50.0, 1.0), (50.0, 1.0)]);
        assert_eq!(momentum(&s), (0.0, 15.0));
    }

    #[test]
    fn test_momentum_saturates_at_ten_percent_gain() {
        let s = series(&[(100.0, 1.0), (110.0, 1.0)]);
        let (raw, score) = momentum(&s);
        assert!((raw - 10.0).abs() < 1e-9);
        assert_eq!(score, 25.0);
    }

    #[test]
    fn test_momentum_zero_after_fifteen_percent_drop() {
        let s = series(&[(100.0, 1.0), (80.0, 1.0)]);
        assert_eq!(momentum(&s).1, 0.0);
    }

    #[test]
    fn test_volume_zero_mean_forces_ratio_one() {
        let s = series(&[(10.0, 0.0), (10.0, 0.0)]);
        let latest = *s.last().unwrap();
        let (ratio, score) = volume(&s, &latest);
        assert_eq!(ratio, 1.0);
        assert!((score - 12.0 * 2f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_volume_saturates() {
        // The latest bar is part of the mean, so n bars cap the ratio below n
        let mut bars = vec![(10.0, 1.0); 8];
        bars.push((10.0, 1000.0));
        let s = series(&bars);
        let latest = *s.last().unwrap();
        let (ratio, score) = volume(&s, &latest);
        assert!(ratio > (VOLUME_MAX / VOLUME_SCALE).exp() - 1.0);
        assert_eq!(score, VOLUME_MAX);
    }

    #[test]
    fn test_support_at_low_is_max() {
        let s = series(&[(120.0, 1.0), (100.0, 1.0)]);
        let latest = *s.last().unwrap();
        assert_eq!(support(&s, &latest), (0.0, 15.0));
    }

    #[test]
    fn test_support_floor_is_three() {
        let s = series(&[(100.0, 1.0), (200.0, 1.0)]);
        let latest = *s.last().unwrap();
        let (dist, score) = support(&s, &latest);
        assert_eq!(dist, 100.0);
        assert_eq!(score, 3.0);
    }

    #[test]
    fn test_support_latest_below_low_floors_distance() {
        // A latest bar passed from outside the series may sit under the low
        let s = series(&[(100.0, 1.0), (110.0, 1.0)]);
        let latest = Bar::new(Utc::now(), 90.0, 1.0);
        assert_eq!(support(&s, &latest), (0.0, 15.0));
    }

    #[test]
    fn test_sector_growth_caps_at_twenty() {
        assert_eq!(sector_growth(1.4), 20.0);
        assert_eq!(sector_growth(1.0), 15.0);
        assert!((sector_growth(0.7) - 10.5).abs() < 1e-9);
        assert_eq!(sector_growth(-1.0), 0.0);
    }

    #[test]
    fn test_financial_all_absent_is_zero() {
        let (breakdown, raw, score) = financial_health(&CompanyMetadata::default());
        assert_eq!(breakdown, FinancialBreakdown::default());
        assert_eq!(raw, 0.0);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_financial_current_ratio_only() {
        let meta = CompanyMetadata {
            current_ratio: Some(3.0),
            ..Default::default()
        };
        assert_eq!(financial_health(&meta).2, 5.0);
    }

    #[test]
    fn test_financial_leverage_input_capped_at_five() {
        let meta = CompanyMetadata {
            debt_to_equity: Some(150.0),
            ..Default::default()
        };
        let (breakdown, _, score) = financial_health(&meta);
        assert_eq!(breakdown.leverage, Some(5.0));
        assert_eq!(score, 5.0);
    }

    #[test]
    fn test_financial_upper_clamp() {
        let meta = CompanyMetadata {
            profit_margins: Some(3.0),
            debt_to_equity: Some(0.0),
            current_ratio: Some(4.0),
            ..Default::default()
        };
        let (_, raw, score) = financial_health(&meta);
        assert_eq!(raw, 30.0);
        assert_eq!(score, 20.0);
    }

    #[test]
    fn test_financial_negative_margin_is_not_floored() {
        let meta = CompanyMetadata {
            profit_margins: Some(-2.0),
            ..Default::default()
        };
        assert_eq!(financial_health(&meta).2, -10.0);
    }
}
