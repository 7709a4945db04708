use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Growth multipliers applied when no configuration overrides them.
pub const DEFAULT_SECTOR_GROWTH: [(&str, f64); 8] = [
    ("Technology", 1.4),
    ("Healthcare", 1.3),
    ("Communication Services", 1.2),
    ("Consumer Cyclical", 1.1),
    ("Financial Services", 1.0),
    ("Industrials", 0.9),
    ("Energy", 0.8),
    ("Utilities", 0.7),
];

pub const DEFAULT_GROWTH_FACTOR: f64 = 1.0;

/// Scoring configuration.
///
/// Only the sector growth table is tunable; the sub-score formulas and their
/// point budgets are fixed.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   default_factor: 1.0
///   sectors:
///     Technology: 1.5
///     Real Estate: 0.9
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Multiplier for sectors missing from the table (default: 1.0)
    #[serde(default)]
    pub default_factor: Option<f64>,

    /// Sector name -> growth multiplier, merged over the built-in table
    #[serde(default)]
    pub sectors: Option<BTreeMap<String, f64>>,
}

impl ScoringConfig {
    /// Build the read-only table handed to the engine
    pub fn sector_table(&self) -> SectorGrowthTable {
        let mut table = SectorGrowthTable::default();
        if let Some(factor) = self.default_factor {
            table.default_factor = factor;
        }
        if let Some(ref sectors) = self.sectors {
            for (name, factor) in sectors {
                table.factors.insert(name.trim().to_string(), *factor);
            }
        }
        table
    }
}

/// Sector name -> growth multiplier lookup.
///
/// Constructed once and never mutated afterwards; pass it by reference into
/// every scoring call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorGrowthTable {
    factors: BTreeMap<String, f64>,
    default_factor: f64,
}

impl Default for SectorGrowthTable {
    fn default() -> Self {
        Self {
            factors: DEFAULT_SECTOR_GROWTH
                .iter()
                .map(|(name, factor)| (name.to_string(), *factor))
                .collect(),
            default_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl SectorGrowthTable {
    pub fn new(factors: BTreeMap<String, f64>, default_factor: f64) -> Self {
        Self {
            factors,
            default_factor,
        }
    }

    /// Multiplier for `sector`; absent or unknown sectors get the default
    pub fn get(&self, sector: Option<&str>) -> f64 {
        sector
            .and_then(|s| self.factors.get(s))
            .copied()
            .unwrap_or(self.default_factor)
    }

    pub fn default_factor(&self) -> f64 {
        self.default_factor
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.factors.iter().map(|(name, factor)| (name.as_str(), *factor))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
