pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::ThemeColors;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use tokio::task::JoinHandle;

use crate::analysis::{analyze, Analysis, AnalysisError};
use crate::market::{MarketDataProvider, Period};
use crate::scoring::SectorGrowthTable;

type PendingAnalysis = JoinHandle<Result<Analysis, AnalysisError>>;

fn spawn_analysis(
    provider: Arc<dyn MarketDataProvider>,
    table: SectorGrowthTable,
    symbol: String,
    period: Period,
    timeout: Duration,
) -> PendingAnalysis {
    tokio::spawn(async move { analyze(provider.as_ref(), &symbol, period, &table, timeout).await })
}

pub async fn run_tui(mut app: App, provider: Arc<dyn MarketDataProvider>) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(100); // 100ms tick drives spinner and flash expiry
    let mut pending_analysis: Option<PendingAnalysis> = None;

    let result = loop {
        // Draw UI
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &app)) {
            break Err(e.into());
        }

        // Handle events
        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Check if background analysis has completed
        if let Some(handle) = pending_analysis.take_if(|h| h.is_finished()) {
            match handle.await {
                Ok(outcome) => app.finish_analysis(outcome),
                Err(e) => app.abort_analysis(format!("analysis task panicked: {}", e)),
            }
        }

        // Spawn the queued analysis once nothing is running
        if pending_analysis.is_none() {
            if let Some((symbol, period)) = app.take_request() {
                tracing::debug!(symbol, period = %period, "spawning analysis");
                pending_analysis = Some(spawn_analysis(
                    provider.clone(),
                    app.settings.sectors.clone(),
                    symbol,
                    period,
                    app.settings.request_timeout,
                ));
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    if let Some(handle) = pending_analysis {
        handle.abort();
    }

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprint!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }
                KeyCode::Esc => app.should_quit = true,
                // 'q' is a valid ticker letter, so it only quits from an empty input line
                KeyCode::Char('q') if app.symbol_input.is_empty() => app.should_quit = true,

                // Help
                KeyCode::Char('?') => app.show_help(),

                // Run analysis
                KeyCode::Enter => app.submit(),

                // Period selection
                KeyCode::Tab | KeyCode::Right => app.next_period(),
                KeyCode::BackTab | KeyCode::Left => app.previous_period(),

                // Symbol editing
                KeyCode::Backspace => app.pop_char(),
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.clear_input()
                }
                KeyCode::Char(c) => app.push_char(c),

                _ => {}
            }
        }
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn empty_app() -> App {
        App::new(Config::default().resolve().unwrap(), Some(String::new()), Period::OneMonth)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_typing_then_enter_queues_analysis() {
        let mut app = empty_app();
        for c in "nvda".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.take_request(), Some(("NVDA".to_string(), Period::OneMonth)));
    }

    #[test]
    fn test_q_is_typed_when_input_not_empty() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = App::new(Config::default().resolve().unwrap(), None, Period::OneMonth);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.symbol_input, "TSLAQ");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);

        let mut app = empty_app();
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_period_keys() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.period, Period::ThreeMonths);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.period, Period::SixMonths);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.period, Period::OneMonth);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.input_mode, app::InputMode::Help);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(app.symbol_input.is_empty());
    }
}
