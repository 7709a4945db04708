use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::{
    Axis, Block, Cell, Chart, Clear, Dataset, Gauge, GraphType, Paragraph, Row, Table, Tabs, Wrap,
};

use crate::analysis::{Analysis, AnalysisError};
use crate::market::Period;
use crate::output::{format_points, UNKNOWN_SECTOR};
use crate::scoring::factors::{FINANCIAL_MAX, MOMENTUM_MAX, SECTOR_MAX, SUPPORT_MAX, VOLUME_MAX};
use crate::scoring::SubScore;
use crate::tui::app::{App, InputMode};
use crate::tui::theme::ThemeColors;

const TITLE: &str = "Score d'opportunité";

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 12 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Input(3) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(3), // Symbol input
        Constraint::Length(1), // Period tabs
        Constraint::Fill(1),   // Result + chart
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_input(frame, chunks[1], app);
    render_tabs(frame, chunks[2], app);
    render_body(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);

    if app.input_mode == InputMode::Help {
        render_help_popup(frame, &app.theme);
    }

    // Render loading overlay if loading (appears on top of everything)
    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(TITLE, Style::default().fg(theme.title_color).bold())];

    // Company name of the displayed analysis on the right
    if let Some(analysis) = app.analysis() {
        let right = match analysis.metadata.name {
            Some(ref name) => format!("{} — {}", analysis.symbol, name),
            None => analysis.symbol.clone(),
        };
        let left_len = TITLE.chars().count();
        let right_len = right.chars().count();
        let padding_len = (area.width as usize).saturating_sub(left_len + right_len);
        spans.push(Span::raw(" ".repeat(padding_len)));
        spans.push(Span::styled(right, Style::default().fg(theme.muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::bordered()
        .title(" Symbole ")
        .border_style(Style::default().fg(app.theme.input_border));
    let input = Paragraph::new(format!("{}|", app.symbol_input)).block(block);
    frame.render_widget(input, area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<&str> = Period::ALL.iter().map(|p| p.label()).collect();
    let selected = Period::ALL
        .iter()
        .position(|p| *p == app.period)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_body(frame: &mut Frame, area: Rect, app: &App) {
    match app.outcome {
        None => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from("Saisissez un symbole puis Entrée pour l'analyser"),
                Line::from(Span::styled(
                    "Tab / ←→ : changer de période    ? : aide",
                    Style::default().fg(app.theme.muted),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(hint, area);
        }
        Some(Err(ref e)) => render_error(frame, area, e, &app.theme),
        Some(Ok(ref analysis)) => {
            let columns =
                Layout::horizontal([Constraint::Length(50), Constraint::Fill(1)]).split(area);
            render_result(frame, columns[0], analysis, &app.theme);
            render_chart(frame, columns[1], analysis, &app.theme);
        }
    }
}

fn render_error(frame: &mut Frame, area: Rect, error: &AnalysisError, theme: &ThemeColors) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(theme.error_color).bold(),
        )),
    ];
    let hints = error.hints();
    if !hints.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Conseils :", Style::default().fg(theme.muted))));
        lines.extend(hints.iter().map(|h| Line::from(format!("- {}", h))));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::bordered().title(" Erreur "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn sub_score_row<'a>(
    label: &'a str,
    raw: String,
    sub: &SubScore,
    max: f64,
    theme: &ThemeColors,
) -> Row<'a> {
    Row::new(vec![
        Cell::from(label),
        Cell::from(Line::from(raw).alignment(Alignment::Right)),
        Cell::from(
            Line::from(format_points(sub, max))
                .alignment(Alignment::Right)
                .style(Style::default().fg(theme.score_color(sub.score, max))),
        ),
    ])
}

fn render_result(frame: &mut Frame, area: Rect, analysis: &Analysis, theme: &ThemeColors) {
    let result = &analysis.result;
    let meta = &analysis.metadata;
    let rating = analysis.rating();
    let band_color = theme.band_color(rating.band);

    let block = Block::bordered().title(format!(
        " {} ({}) ",
        analysis.symbol,
        analysis.period.label()
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let financial_rows = [meta.profit_margins, meta.debt_to_equity, meta.current_ratio]
        .iter()
        .filter(|v| v.is_some())
        .count() as u16;

    let chunks = Layout::vertical([
        Constraint::Length(1),                  // Gauge
        Constraint::Length(1),                  // spacer
        Constraint::Length(6 + financial_rows), // Sub-score table (header + 5 rows + terms)
        Constraint::Length(1),                  // spacer
        Constraint::Fill(1),                    // Notes and verdict
    ])
    .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(band_color).bg(theme.gauge_empty))
        .ratio(f64::from(result.total) / 100.0)
        .label(Span::styled(
            format!("{}/100 — {} {}", result.total, rating.band.icon(), rating.band.label()),
            Style::default().bold(),
        ));
    frame.render_widget(gauge, chunks[0]);

    let mut rows = vec![
        sub_score_row(
            "Momentum",
            format!("{:.2}%", result.momentum.raw),
            &result.momentum,
            MOMENTUM_MAX,
            theme,
        ),
        sub_score_row(
            "Volume",
            format!("{:.2}x", result.volume.raw),
            &result.volume,
            VOLUME_MAX,
            theme,
        ),
        sub_score_row(
            "Support",
            format!("{:.2}%", result.support.raw),
            &result.support,
            SUPPORT_MAX,
            theme,
        ),
        sub_score_row(
            "Croissance secteur",
            result.sector.clone().unwrap_or_else(|| UNKNOWN_SECTOR.to_string()),
            &result.sector_growth,
            SECTOR_MAX,
            theme,
        ),
        sub_score_row(
            "Solidité financière",
            String::new(),
            &result.financial_health,
            FINANCIAL_MAX,
            theme,
        ),
    ];
    let muted = Style::default().fg(theme.muted);
    let term_row = |label: &'static str, value: String| {
        Row::new(vec![
            Cell::from(label),
            Cell::from(Line::from(value).alignment(Alignment::Right)),
        ])
        .style(muted)
    };
    if let Some(margin) = meta.profit_margins {
        rows.push(term_row("  Marge bénéfice", format!("{:.1}%", margin * 100.0)));
    }
    if let Some(de) = meta.debt_to_equity {
        rows.push(term_row("  Dette/Capitaux", format!("{:.2}", de)));
    }
    if let Some(cr) = meta.current_ratio {
        rows.push(term_row("  Ratio courant", format!("{:.2}", cr)));
    }

    let widths = [
        Constraint::Length(21), // Label
        Constraint::Fill(1),    // Raw metric
        Constraint::Length(8),  // Points: "25.0/25"
    ];
    let table = Table::new(rows, widths).header(
        Row::new(vec!["Indicateur", "Mesure", "Points"]).style(theme.header_style),
    );
    frame.render_widget(table, chunks[2]);

    let notes = vec![
        Line::from(Span::styled(
            rating.health.message(),
            Style::default().fg(theme.tone_color(rating.health.tone())),
        )),
        Line::from(Span::styled(
            rating.growth.message(),
            Style::default().fg(theme.tone_color(rating.growth.tone())),
        )),
        Line::from(""),
        Line::from(Span::styled(
            rating.verdict.message(),
            Style::default().fg(theme.tone_color(rating.verdict.tone())).bold(),
        )),
    ];
    frame.render_widget(Paragraph::new(notes), chunks[4]);
}

fn render_chart(frame: &mut Frame, area: Rect, analysis: &Analysis, theme: &ThemeColors) {
    let series = &analysis.series;
    let points: Vec<(f64, f64)> = series
        .closes()
        .enumerate()
        .map(|(i, close)| (i as f64, close))
        .collect();

    let (low, high) = match (series.min_close(), series.max_close()) {
        (Some(low), Some(high)) => (low, high),
        _ => return,
    };
    // Keep flat series visible
    let pad = ((high - low) * 0.05).max(high.abs() * 0.01).max(0.01);
    let y_bounds = [low - pad, high + pad];
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;

    let date_label = |bar: Option<&crate::market::Bar>| {
        bar.map(|b| b.timestamp.format("%d/%m/%y").to_string())
            .unwrap_or_default()
    };
    let currency = analysis.metadata.currency.as_deref().unwrap_or("");

    let datasets = vec![Dataset::default()
        .name(format!("Clôture {}", currency).trim_end().to_string())
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.chart_line))
        .data(&points)];

    let axis_style = Style::default().fg(theme.axis_color);
    let chart = Chart::new(datasets)
        .block(Block::bordered().title(format!(" Performance sur {} ", analysis.period.label())))
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, x_max])
                .labels(vec![date_label(series.first()), date_label(series.last())]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds(y_bounds)
                .labels(vec![format!("{:.2}", low), format!("{:.2}", high)]),
        );

    frame.render_widget(chart, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, _)) = app.flash_message {
        // Show flash message with color based on message type
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Error") {
            theme.flash_error
        } else if msg.starts_with("Analysé") {
            theme.flash_success
        } else {
            Color::White // Default for unknown message types
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints = [
            ("Enter", ":analyser "),
            ("Tab/←→", ":période "),
            ("?", ":aide "),
            ("Esc", ":quitter"),
        ];

        let mut spans = vec![
            Span::styled(app.period.label(), Style::default().fg(theme.muted)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    // Calculate centered position
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(52, 12, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Raccourcis ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border))
        .style(Style::default().bg(theme.popup_bg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let entry = |key: &'static str, text: &'static str| {
        Line::from(vec![Span::styled(format!("{:<16}", key), key_style), Span::raw(text)])
    };

    let help_lines = vec![
        entry("A-Z 0-9 . -", "Saisir le symbole"),
        entry("Backspace", "Effacer un caractère"),
        entry("Ctrl-u", "Effacer le symbole"),
        entry("Enter", "Lancer l'analyse"),
        entry("Tab / →", "Période suivante"),
        entry("Shift-Tab / ←", "Période précédente"),
        entry("?", "Afficher/masquer l'aide"),
        entry("Esc / Ctrl-c", "Quitter (q si le symbole est vide)"),
        Line::from(""),
        Line::from(Span::styled(
            "Appuyez sur une touche pour fermer",
            Style::default().fg(theme.muted),
        )),
    ];

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(34, 3, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let text = match app.active_symbol {
        Some(ref symbol) => format!("{} Analyse de {}...", spinner, symbol),
        None => format!("{} Analyse...", spinner),
    };

    let loading_text = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.title_color));

    frame.render_widget(loading_text, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::Config;
    use crate::market::{Bar, CompanyMetadata, PriceSeries, StaticProvider};
    use crate::scoring::SectorGrowthTable;
    use chrono::{Duration, TimeZone, Utc};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> App {
        App::new(Config::default().resolve().unwrap(), None, Period::OneMonth)
    }

    async fn nvda_analysis() -> Analysis {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let bars = [(100.0, 1000.0), (90.0, 1000.0), (80.0, 1000.0), (130.0, 5000.0)]
            .iter()
            .enumerate()
            .map(|(i, (c, v))| Bar::new(start + Duration::days(i as i64), *c, *v))
            .collect();
        let provider = StaticProvider::new().with_symbol(
            "NVDA",
            PriceSeries::new(bars).unwrap(),
            CompanyMetadata {
                sector: Some("Technology".to_string()),
                profit_margins: Some(0.2),
                debt_to_equity: Some(1.0),
                current_ratio: Some(2.0),
                ..Default::default()
            },
        );
        analyze(
            &provider,
            "NVDA",
            Period::OneMonth,
            &SectorGrowthTable::default(),
            std::time::Duration::from_secs(5),
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_initial_screen() {
        let screen = render(&app());
        assert!(screen.contains("Symbole"));
        assert!(screen.contains("TSLA|"));
        assert!(screen.contains("1 mois"));
        assert!(screen.contains("Saisissez un symbole"));
    }

    #[tokio::test]
    async fn test_result_screen() {
        let mut app = app();
        app.finish_analysis(Ok(nvda_analysis().await));
        let screen = render(&app);
        assert!(screen.contains("77/100"));
        assert!(screen.contains("Momentum"));
        assert!(screen.contains("25.0/25"));
        assert!(screen.contains("Technology"));
        assert!(screen.contains("Performance sur 1 mois"));
    }

    #[test]
    fn test_error_screen_shows_hints() {
        let mut app = app();
        app.finish_analysis(Err(AnalysisError::UnknownSymbol("ZZZZ".to_string())));
        let screen = render(&app);
        assert!(screen.contains("Symbole non reconnu : ZZZZ"));
        assert!(screen.contains("Conseils"));
    }

    #[test]
    fn test_tiny_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(20, 5)).unwrap();
        terminal.draw(|frame| draw(frame, &app())).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("small"));
    }
}
