//! Qualitative readings of a [`ScoreResult`] shown next to the numbers.

use serde::Serialize;
use std::fmt;

use super::engine::ScoreResult;

/// Opportunity quality band for the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ScoreBand {
    Faible,
    Moyenne,
    Bonne,
    Excellente,
}

impl ScoreBand {
    pub fn from_total(total: u8) -> Self {
        if total >= 85 {
            ScoreBand::Excellente
        } else if total >= 70 {
            ScoreBand::Bonne
        } else if total >= 50 {
            ScoreBand::Moyenne
        } else {
            ScoreBand::Faible
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Faible => "Faible",
            ScoreBand::Moyenne => "Moyenne",
            ScoreBand::Bonne => "Bonne",
            ScoreBand::Excellente => "Excellente",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ScoreBand::Faible => "❌",
            ScoreBand::Moyenne => "⚠️",
            ScoreBand::Bonne => "👍",
            ScoreBand::Excellente => "📈",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Three-level reading used for the recommendation notes and the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Positive,
    Neutral,
    Warning,
}

/// Reading of the financial health sub-score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthNote {
    Strong,
    Adequate,
    Fragile,
}

impl HealthNote {
    pub fn from_score(score: f64) -> Self {
        if score >= 18.0 {
            HealthNote::Strong
        } else if score >= 12.0 {
            HealthNote::Adequate
        } else {
            HealthNote::Fragile
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            HealthNote::Strong => "💪 Très bonne santé financière",
            HealthNote::Adequate => "🆗 Santé financière correcte",
            HealthNote::Fragile => "🏥 Fragilité financière",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            HealthNote::Strong => Tone::Positive,
            HealthNote::Adequate => Tone::Neutral,
            HealthNote::Fragile => Tone::Warning,
        }
    }
}

/// Reading of the sector growth sub-score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthNote {
    Fast,
    Moderate,
    Slow,
}

impl GrowthNote {
    pub fn from_score(score: f64) -> Self {
        if score >= 18.0 {
            GrowthNote::Fast
        } else if score >= 12.0 {
            GrowthNote::Moderate
        } else {
            GrowthNote::Slow
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            GrowthNote::Fast => "🚀 Secteur à forte croissance",
            GrowthNote::Moderate => "📈 Secteur en croissance modérée",
            GrowthNote::Slow => "🐌 Secteur à croissance lente",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            GrowthNote::Fast => Tone::Positive,
            GrowthNote::Moderate => Tone::Neutral,
            GrowthNote::Slow => Tone::Warning,
        }
    }
}

/// Overall call to action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    StrongOpportunity,
    Consider,
    HighRisk,
}

impl Verdict {
    pub fn from_total(total: u8) -> Self {
        if total >= 80 {
            Verdict::StrongOpportunity
        } else if total >= 60 {
            Verdict::Consider
        } else {
            Verdict::HighRisk
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::StrongOpportunity => "✅ TRÈS BONNE OPPORTUNITÉ",
            Verdict::Consider => "👍 CONSIDÉRER CE TITRE",
            Verdict::HighRisk => "⚠️ RISQUE ÉLEVÉ",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Verdict::StrongOpportunity => Tone::Positive,
            Verdict::Consider => Tone::Neutral,
            Verdict::HighRisk => Tone::Warning,
        }
    }
}

/// Every qualitative reading of one result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub band: ScoreBand,
    pub health: HealthNote,
    pub growth: GrowthNote,
    pub verdict: Verdict,
}

impl Rating {
    pub fn of(result: &ScoreResult) -> Self {
        Self {
            band: ScoreBand::from_total(result.total),
            health: HealthNote::from_score(result.financial_health.score),
            growth: GrowthNote::from_score(result.sector_growth.score),
            verdict: Verdict::from_total(result.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ScoreBand::from_total(0), ScoreBand::Faible);
        assert_eq!(ScoreBand::from_total(49), ScoreBand::Faible);
        assert_eq!(ScoreBand::from_total(50), ScoreBand::Moyenne);
        assert_eq!(ScoreBand::from_total(69), ScoreBand::Moyenne);
        assert_eq!(ScoreBand::from_total(70), ScoreBand::Bonne);
        assert_eq!(ScoreBand::from_total(84), ScoreBand::Bonne);
        assert_eq!(ScoreBand::from_total(85), ScoreBand::Excellente);
        assert_eq!(ScoreBand::from_total(100), ScoreBand::Excellente);
    }

    #[test]
    fn test_band_ordering() {
        assert!(ScoreBand::Faible < ScoreBand::Moyenne);
        assert!(ScoreBand::Bonne < ScoreBand::Excellente);
    }

    #[test]
    fn test_health_note_thresholds() {
        assert_eq!(HealthNote::from_score(20.0), HealthNote::Strong);
        assert_eq!(HealthNote::from_score(18.0), HealthNote::Strong);
        assert_eq!(HealthNote::from_score(17.9), HealthNote::Adequate);
        assert_eq!(HealthNote::from_score(12.0), HealthNote::Adequate);
        assert_eq!(HealthNote::from_score(11.99), HealthNote::Fragile);
        assert_eq!(HealthNote::from_score(-4.0), HealthNote::Fragile);
    }

    #[test]
    fn test_growth_note_thresholds() {
        assert_eq!(GrowthNote::from_score(20.0), GrowthNote::Fast);
        assert_eq!(GrowthNote::from_score(16.5), GrowthNote::Moderate);
        assert_eq!(GrowthNote::from_score(15.0), GrowthNote::Moderate);
        assert_eq!(GrowthNote::from_score(10.5), GrowthNote::Slow);
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_total(80), Verdict::StrongOpportunity);
        assert_eq!(Verdict::from_total(79), Verdict::Consider);
        assert_eq!(Verdict::from_total(60), Verdict::Consider);
        assert_eq!(Verdict::from_total(59), Verdict::HighRisk);
    }

    #[test]
    fn test_verdict_messages() {
        assert!(Verdict::Consider.message().contains("CONSIDÉRER CE TITRE"));
        assert!(Verdict::HighRisk.message().contains("RISQUE ÉLEVÉ"));
        assert_eq!(Verdict::StrongOpportunity.tone(), Tone::Positive);
    }
}
