use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::analysis::normalize_symbol;
use crate::market::Period;
use crate::scoring::{
    validate_scoring, ScoringConfig, SectorGrowthTable, DEFAULT_GROWTH_FACTOR,
    DEFAULT_SECTOR_GROWTH,
};

pub const DEFAULT_SYMBOL: &str = "TSLA";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "20s";
pub const DEFAULT_CACHE_TTL: &str = "15m";

/// On-disk configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_symbol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_period: Option<Period>,

    /// Humantime duration, e.g. "20s"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,

    /// Humantime duration, e.g. "15m"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringConfig>,
}

/// Configuration after validation, with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub default_symbol: String,
    pub default_period: Period,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub sectors: SectorGrowthTable,
}

fn parse_duration(
    field: &str,
    value: Option<&str>,
    default: &str,
    errors: &mut Vec<String>,
) -> Duration {
    let raw = value.unwrap_or(default);
    match humantime::parse_duration(raw) {
        Ok(d) if field == "request_timeout" && d.is_zero() => {
            errors.push(format!("{}: must be greater than zero", field));
            Duration::ZERO
        }
        Ok(d) => d,
        Err(e) => {
            errors.push(format!("{}: invalid duration '{}': {}", field, raw, e));
            Duration::ZERO
        }
    }
}

impl Config {
    /// Config with every field spelled out, as written by `init`
    pub fn template() -> Self {
        Self {
            default_symbol: Some(DEFAULT_SYMBOL.to_string()),
            default_period: Some(Period::default()),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT.to_string()),
            cache_ttl: Some(DEFAULT_CACHE_TTL.to_string()),
            scoring: Some(ScoringConfig {
                default_factor: Some(DEFAULT_GROWTH_FACTOR),
                sectors: Some(
                    DEFAULT_SECTOR_GROWTH
                        .iter()
                        .map(|(name, factor)| (name.to_string(), *factor))
                        .collect(),
                ),
            }),
        }
    }

    /// Validate and apply defaults.
    /// Returns all validation errors at once (not just the first).
    pub fn resolve(&self) -> Result<Settings, Vec<String>> {
        let mut errors = Vec::new();

        let default_symbol = match self.default_symbol.as_deref() {
            None => DEFAULT_SYMBOL.to_string(),
            Some(raw) => normalize_symbol(raw).unwrap_or_else(|| {
                errors.push("default_symbol: must not be blank".to_string());
                String::new()
            }),
        };

        let request_timeout = parse_duration(
            "request_timeout",
            self.request_timeout.as_deref(),
            DEFAULT_REQUEST_TIMEOUT,
            &mut errors,
        );
        let cache_ttl = parse_duration(
            "cache_ttl",
            self.cache_ttl.as_deref(),
            DEFAULT_CACHE_TTL,
            &mut errors,
        );

        let scoring = self.scoring.clone().unwrap_or_default();
        if let Err(scoring_errors) = validate_scoring(&scoring) {
            errors.extend(scoring_errors);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Settings {
            default_symbol,
            default_period: self.default_period.unwrap_or_default(),
            request_timeout,
            cache_ttl,
            sectors: scoring.sector_table(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings.default_symbol, "TSLA");
        assert_eq!(settings.default_period, Period::OneMonth);
        assert_eq!(settings.request_timeout, Duration::from_secs(20));
        assert_eq!(settings.cache_ttl, Duration::from_secs(15 * 60));
        assert_eq!(settings.sectors, SectorGrowthTable::default());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
default_symbol: shop.to
default_period: 6m
request_timeout: 45s
cache_ttl: 1h
scoring:
  default_factor: 0.9
  sectors:
    Technology: 1.5
    Real Estate: 0.9
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings.default_symbol, "SHOP.TO");
        assert_eq!(settings.default_period, Period::SixMonths);
        assert_eq!(settings.request_timeout, Duration::from_secs(45));
        assert_eq!(settings.cache_ttl, Duration::from_secs(3600));
        assert_eq!(settings.sectors.get(Some("Technology")), 1.5);
        assert_eq!(settings.sectors.get(Some("Real Estate")), 0.9);
        assert_eq!(settings.sectors.get(Some("Energy")), 0.8);
        assert_eq!(settings.sectors.get(Some("Basic Materials")), 0.9);
    }

    #[test]
    fn test_period_aliases() {
        let config: Config = serde_saphyr::from_str("default_period: 90d").unwrap();
        assert_eq!(config.default_period, Some(Period::ThreeMonths));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_scoring_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("scoring:\n  base_score: 10\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_collects_all_errors() {
        let yaml = r#"
default_symbol: "  "
request_timeout: soon
cache_ttl: 0s
scoring:
  default_factor: -1.0
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        let errors = config.resolve().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.starts_with("default_symbol")));
        assert!(errors.iter().any(|e| e.starts_with("request_timeout")));
        assert!(errors.iter().any(|e| e.starts_with("scoring.default_factor")));
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let config = Config {
            request_timeout: Some("0s".to_string()),
            ..Default::default()
        };
        let errors = config.resolve().unwrap_err();
        assert!(errors[0].contains("greater than zero"));
    }

    #[test]
    fn test_template_resolves_to_defaults() {
        let settings = Config::template().resolve().unwrap();
        let defaults = Config::default().resolve().unwrap();
        assert_eq!(settings, defaults);
    }

    #[test]
    fn test_template_yaml_parses_back() {
        let yaml = serde_saphyr::to_string(&Config::template()).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(parsed, Config::template());
    }
}
