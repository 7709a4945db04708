pub mod config;
pub mod engine;
pub mod factors;
pub mod rating;
pub mod validation;

pub use config::*;
pub use engine::{compute_score, score_series, ScoreError, ScoreResult, SubScore};
pub use factors::FinancialBreakdown;
pub use rating::{GrowthNote, HealthNote, Rating, ScoreBand, Tone, Verdict};
pub use validation::validate_scoring;
