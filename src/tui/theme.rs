//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::scoring::{ScoreBand, Tone};

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Band colors for the total score
    pub band_excellent: Color,
    pub band_good: Color,
    pub band_average: Color,
    pub band_weak: Color,

    // Recommendation tones
    pub tone_positive: Color,
    pub tone_neutral: Color,
    pub tone_warning: Color,

    // Sub-score colors (traffic light pattern)
    pub score_high: Color,
    pub score_mid: Color,
    pub score_low: Color,

    pub gauge_empty: Color,
    pub chart_line: Color,
    pub axis_color: Color,

    // Styles
    pub header_style: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub input_border: Color,
    pub error_color: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::dark()
    }
}

impl ThemeColors {
    /// Dark theme palette
    pub fn dark() -> Self {
        Self {
            band_excellent: Color::Green,
            band_good: Color::LightGreen,
            band_average: Color::Yellow,
            band_weak: Color::Red,
            tone_positive: Color::Green,
            tone_neutral: Color::Cyan,
            tone_warning: Color::Yellow,
            score_high: Color::Green,
            score_mid: Color::Yellow,
            score_low: Color::Red,
            gauge_empty: Color::DarkGray,
            chart_line: Color::Cyan,
            axis_color: Color::Gray,
            header_style: Style::new().bold(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            input_border: Color::Cyan,
            error_color: Color::Red,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
        }
    }

    pub fn band_color(&self, band: ScoreBand) -> Color {
        match band {
            ScoreBand::Excellente => self.band_excellent,
            ScoreBand::Bonne => self.band_good,
            ScoreBand::Moyenne => self.band_average,
            ScoreBand::Faible => self.band_weak,
        }
    }

    pub fn tone_color(&self, tone: Tone) -> Color {
        match tone {
            Tone::Positive => self.tone_positive,
            Tone::Neutral => self.tone_neutral,
            Tone::Warning => self.tone_warning,
        }
    }

    /// Returns the appropriate color for a sub-score based on its percentage of max score
    pub fn score_color(&self, score: f64, max_score: f64) -> Color {
        let percentage = if max_score > 0.0 {
            (score / max_score) * 100.0
        } else {
            0.0
        };

        if percentage >= 70.0 {
            self.score_high
        } else if percentage >= 40.0 {
            self.score_mid
        } else {
            self.score_low
        }
    }
}
