use super::config::ScoringConfig;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(factor) = config.default_factor {
        if !factor.is_finite() || factor < 0.0 {
            errors.push(format!(
                "scoring.default_factor: must be a non-negative number, got {}",
                factor
            ));
        }
    }

    if let Some(ref sectors) = config.sectors {
        for (name, factor) in sectors {
            if name.trim().is_empty() {
                errors.push("scoring.sectors: sector name must not be blank".to_string());
            }
            if !factor.is_finite() || *factor < 0.0 {
                errors.push(format!(
                    "scoring.sectors.{}: must be a non-negative number, got {}",
                    name, factor
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn with_sectors(pairs: &[(&str, f64)]) -> ScoringConfig {
        ScoringConfig {
            default_factor: None,
            sectors: Some(
                pairs
                    .iter()
                    .map(|(name, factor)| (name.to_string(), *factor))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = with_sectors(&[("Technology", 1.5), ("Energy", 0.0)]);
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_empty_config() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_negative_default_factor() {
        let config = ScoringConfig {
            default_factor: Some(-1.0),
            sectors: None,
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.default_factor"));
    }

    #[test]
    fn test_non_finite_sector_factor() {
        let config = with_sectors(&[("Energy", f64::NAN)]);
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.sectors.Energy"));
    }

    #[test]
    fn test_blank_sector_name() {
        let config = with_sectors(&[("  ", 1.0)]);
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("blank"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = with_sectors(&[("Energy", -0.5), ("Utilities", f64::INFINITY)]);
        config.default_factor = Some(-2.0);
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
