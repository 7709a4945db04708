use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis window offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "1m", alias = "30d")]
    OneMonth,
    #[serde(rename = "3m", alias = "90d")]
    ThreeMonths,
    #[serde(rename = "6m", alias = "180d")]
    SixMonths,
    #[serde(rename = "1y", alias = "365d")]
    OneYear,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
    ];

    /// Range string understood by the market data provider
    pub fn range(&self) -> &'static str {
        match self {
            Period::OneMonth => "30d",
            Period::ThreeMonths => "90d",
            Period::SixMonths => "180d",
            Period::OneYear => "1y",
        }
    }

    /// Short code used on the command line and in config files
    pub fn code(&self) -> &'static str {
        match self {
            Period::OneMonth => "1m",
            Period::ThreeMonths => "3m",
            Period::SixMonths => "6m",
            Period::OneYear => "1y",
        }
    }

    /// Human label shown next to charts ("Performance sur 3 mois")
    pub fn label(&self) -> &'static str {
        match self {
            Period::OneMonth => "1 mois",
            Period::ThreeMonths => "3 mois",
            Period::SixMonths => "6 mois",
            Period::OneYear => "1 an",
        }
    }

    pub fn next(&self) -> Period {
        match self {
            Period::OneMonth => Period::ThreeMonths,
            Period::ThreeMonths => Period::SixMonths,
            Period::SixMonths => Period::OneYear,
            Period::OneYear => Period::OneMonth,
        }
    }

    pub fn previous(&self) -> Period {
        match self {
            Period::OneMonth => Period::OneYear,
            Period::ThreeMonths => Period::OneMonth,
            Period::SixMonths => Period::ThreeMonths,
            Period::OneYear => Period::SixMonths,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" | "30d" => Ok(Period::OneMonth),
            "3m" | "90d" => Ok(Period::ThreeMonths),
            "6m" | "180d" => Ok(Period::SixMonths),
            "1y" | "365d" => Ok(Period::OneYear),
            other => Err(format!(
                "invalid period '{}' (expected one of: 1m, 3m, 6m, 1y)",
                other
            )),
        }
    }
}

/// One sampled observation: closing price and traded volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            close,
            volume,
        }
    }

    /// Closes must be finite and strictly positive, volumes finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.close.is_finite() && self.close > 0.0 && self.volume.is_finite() && self.volume >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("bar {index} has an invalid close ({close}) or volume ({volume})")]
    InvalidBar { index: usize, close: f64, volume: f64 },

    #[error("bar {index} is older than the bar before it")]
    OutOfOrder { index: usize },
}

/// Chronologically ordered price history for one analysis window.
///
/// An empty series is representable (the provider's "no data" answer);
/// the score engine is the one that refuses it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_valid() {
                return Err(SeriesError::InvalidBar {
                    index,
                    close: bar.close,
                    volume: bar.volume,
                });
            }
            if index > 0 && bar.timestamp < bars[index - 1].timestamp {
                return Err(SeriesError::OutOfOrder { index });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }

    pub fn volumes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.volume)
    }

    /// Lowest close in the window (the period's support level)
    pub fn min_close(&self) -> Option<f64> {
        self.closes().reduce(f64::min)
    }

    pub fn max_close(&self) -> Option<f64> {
        self.closes().reduce(f64::max)
    }

    pub fn mean_volume(&self) -> Option<f64> {
        if self.bars.is_empty() {
            None
        } else {
            Some(self.volumes().sum::<f64>() / self.bars.len() as f64)
        }
    }
}

impl TryFrom<Vec<Bar>> for PriceSeries {
    type Error = SeriesError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        PriceSeries::new(bars)
    }
}

impl From<PriceSeries> for Vec<Bar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

/// Sparse fundamentals for one company. Every attribute may be absent,
/// which is a different state from zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompanyMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub profit_margins: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
}

impl CompanyMetadata {
    pub fn with_sector(mut self, sector: &str) -> Self {
        self.sector = Some(sector.to_string());
        self
    }
}
