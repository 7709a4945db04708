use crate::analysis::{normalize_symbol, Analysis, AnalysisError};
use crate::config::Settings;
use crate::market::Period;
use crate::tui::theme::ThemeColors;
use std::time::Instant;

/// Longest ticker we accept in the input line
const MAX_SYMBOL_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
}

pub struct App {
    pub symbol_input: String,
    pub period: Period,
    pub input_mode: InputMode,
    /// Last finished analysis, or the error it produced
    pub outcome: Option<Result<Analysis, AnalysisError>>,
    /// Symbol whose analysis is running or displayed
    pub active_symbol: Option<String>,
    pub flash_message: Option<(String, Instant)>,
    pub needs_analysis: bool,
    pub should_quit: bool,
    pub is_loading: bool,
    pub spinner_frame: usize,
    pub settings: Settings,
    pub theme: ThemeColors,
}

impl App {
    pub fn new(settings: Settings, symbol: Option<String>, period: Period) -> Self {
        let symbol_input = symbol.unwrap_or_else(|| settings.default_symbol.clone());
        Self {
            symbol_input,
            period,
            input_mode: InputMode::Normal,
            outcome: None,
            active_symbol: None,
            flash_message: None,
            needs_analysis: false,
            should_quit: false,
            is_loading: false,
            spinner_frame: 0,
            settings,
            theme: ThemeColors::dark(),
        }
    }

    /// Append a typed character if it can be part of a ticker
    pub fn push_char(&mut self, c: char) {
        let allowed = c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=');
        if allowed && self.symbol_input.chars().count() < MAX_SYMBOL_LEN {
            self.symbol_input.push(c.to_ascii_uppercase());
        }
    }

    pub fn pop_char(&mut self) {
        self.symbol_input.pop();
    }

    pub fn clear_input(&mut self) {
        self.symbol_input.clear();
    }

    pub fn next_period(&mut self) {
        self.period = self.period.next();
        self.rerun_for_period();
    }

    pub fn previous_period(&mut self) {
        self.period = self.period.previous();
        self.rerun_for_period();
    }

    /// Changing the window re-scores the symbol already on screen.
    /// While a fetch is running the request waits in the queue.
    fn rerun_for_period(&mut self) {
        if self.active_symbol.is_some() {
            self.needs_analysis = true;
        }
    }

    /// Validate the input line and queue an analysis for it
    pub fn submit(&mut self) {
        match normalize_symbol(&self.symbol_input) {
            Some(symbol) => {
                self.symbol_input = symbol.clone();
                self.active_symbol = Some(symbol);
                self.needs_analysis = true;
            }
            None => self.show_flash("Error: saisissez un symbole (ex: TSLA)".to_string()),
        }
    }

    /// Take the queued request, if any. Returns the symbol and window to analyze.
    pub fn take_request(&mut self) -> Option<(String, Period)> {
        if !self.needs_analysis || self.is_loading {
            return None;
        }
        self.needs_analysis = false;
        let symbol = self.active_symbol.clone()?;
        self.is_loading = true;
        Some((symbol, self.period))
    }

    /// Store the result of a background analysis
    pub fn finish_analysis(&mut self, outcome: Result<Analysis, AnalysisError>) {
        self.is_loading = false;
        match outcome {
            Ok(ref analysis) => {
                let band = analysis.rating().band;
                self.show_flash(format!(
                    "Analysé: {} {}/100 ({})",
                    analysis.symbol, analysis.result.total, band
                ));
            }
            Err(ref e) => self.show_flash(format!("Failed: {}", e)),
        }
        self.outcome = Some(outcome);
    }

    /// The background task died before producing a result
    pub fn abort_analysis(&mut self, reason: String) {
        self.is_loading = false;
        self.show_flash(format!("Failed: {}", reason));
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.outcome.as_ref().and_then(|o| o.as_ref().ok())
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Show help overlay
    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    /// Dismiss help overlay
    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn app() -> App {
        App::new(Config::default().resolve().unwrap(), None, Period::OneMonth)
    }

    #[test]
    fn test_starts_with_default_symbol() {
        let app = app();
        assert_eq!(app.symbol_input, "TSLA");
        assert!(app.outcome.is_none());
        assert!(!app.needs_analysis);
    }

    #[test]
    fn test_input_filters_and_uppercases() {
        let mut app = app();
        app.clear_input();
        for c in "shop.to !".chars() {
            app.push_char(c);
        }
        assert_eq!(app.symbol_input, "SHOP.TO");
        app.pop_char();
        assert_eq!(app.symbol_input, "SHOP.T");
    }

    #[test]
    fn test_input_length_is_capped() {
        let mut app = app();
        app.clear_input();
        for _ in 0..40 {
            app.push_char('A');
        }
        assert_eq!(app.symbol_input.len(), MAX_SYMBOL_LEN);
    }

    #[test]
    fn test_submit_blank_shows_flash() {
        let mut app = app();
        app.clear_input();
        app.submit();
        assert!(!app.needs_analysis);
        assert!(app.take_request().is_none());
        assert!(app.flash_message.is_some());
    }

    #[test]
    fn test_submit_queues_one_request() {
        let mut app = app();
        app.submit();
        assert_eq!(app.take_request(), Some(("TSLA".to_string(), Period::OneMonth)));
        assert!(app.is_loading);
        // nothing more until the running one finishes
        app.submit();
        assert!(app.take_request().is_none());
    }

    #[test]
    fn test_period_change_reruns_displayed_symbol() {
        let mut app = app();
        app.next_period();
        assert_eq!(app.period, Period::ThreeMonths);
        assert!(!app.needs_analysis);

        app.submit();
        app.take_request();
        app.finish_analysis(Err(AnalysisError::UnknownSymbol("TSLA".to_string())));
        app.previous_period();
        assert_eq!(app.period, Period::OneMonth);
        assert_eq!(app.take_request(), Some(("TSLA".to_string(), Period::OneMonth)));
    }

    #[test]
    fn test_period_change_while_loading_is_queued() {
        let mut app = app();
        app.submit();
        assert_eq!(app.take_request(), Some(("TSLA".to_string(), Period::OneMonth)));

        app.next_period();
        assert!(app.take_request().is_none());

        app.finish_analysis(Err(AnalysisError::InsufficientData));
        assert_eq!(app.take_request(), Some(("TSLA".to_string(), Period::ThreeMonths)));
    }

    #[test]
    fn test_finish_with_error_keeps_running() {
        let mut app = app();
        app.submit();
        app.take_request();
        app.finish_analysis(Err(AnalysisError::InsufficientData));
        assert!(!app.is_loading);
        assert!(!app.should_quit);
        assert!(app.analysis().is_none());
        assert!(matches!(app.outcome, Some(Err(AnalysisError::InsufficientData))));
    }
}
