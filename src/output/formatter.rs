use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::analysis::{Analysis, AnalysisError};
use crate::scoring::{
    factors::{FINANCIAL_MAX, MOMENTUM_MAX, SECTOR_MAX, SUPPORT_MAX, VOLUME_MAX},
    ScoreBand, SectorGrowthTable, SubScore, Tone,
};

/// Width used for the sparkline when stdout is not a terminal
const FALLBACK_CHART_WIDTH: usize = 60;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Label shown when the provider reports no sector
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

fn paint_tone(text: &str, tone: Tone, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match tone {
        Tone::Positive => text.green().to_string(),
        Tone::Neutral => text.cyan().to_string(),
        Tone::Warning => text.yellow().to_string(),
    }
}

fn paint_band(text: &str, band: ScoreBand, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match band {
        ScoreBand::Excellente | ScoreBand::Bonne => text.green().bold().to_string(),
        ScoreBand::Moyenne => text.yellow().bold().to_string(),
        ScoreBand::Faible => text.red().bold().to_string(),
    }
}

/// "14.0/20"
pub fn format_points(sub: &SubScore, max: f64) -> String {
    format!("{:.1}/{:.0}", sub.score, max)
}

/// "Score: 77/100 — 👍 Bonne opportunité"
pub fn format_headline(total: u8, band: ScoreBand) -> String {
    format!("Score: {}/100 — {} {} opportunité", total, band.icon(), band.label())
}

/// One row of the detail block: label, raw metric, points
fn detail_row(label: &str, raw: &str, points: &str) -> String {
    format!("  {:<22}{:>12}  {:>8}", label, raw, points)
}

/// Full human-readable report for one analysis
pub fn format_report(analysis: &Analysis, use_colors: bool) -> String {
    let result = &analysis.result;
    let meta = &analysis.metadata;
    let rating = analysis.rating();

    let mut lines = Vec::new();

    let title = match meta.name {
        Some(ref name) => format!("{} — {} ({})", analysis.symbol, name, analysis.period.label()),
        None => format!("{} ({})", analysis.symbol, analysis.period.label()),
    };
    lines.push(if use_colors {
        title.bold().to_string()
    } else {
        title
    });
    lines.push(paint_band(
        &format_headline(result.total, rating.band),
        rating.band,
        use_colors,
    ));
    lines.push(String::new());

    lines.push(if use_colors {
        "Détails".dimmed().to_string()
    } else {
        "Détails".to_string()
    });
    lines.push(detail_row(
        "Momentum",
        &format!("{:.2}%", result.momentum.raw),
        &format_points(&result.momentum, MOMENTUM_MAX),
    ));
    lines.push(detail_row(
        "Volume",
        &format!("{:.2}x", result.volume.raw),
        &format_points(&result.volume, VOLUME_MAX),
    ));
    lines.push(detail_row(
        "Support",
        &format!("{:.2}%", result.support.raw),
        &format_points(&result.support, SUPPORT_MAX),
    ));
    lines.push(detail_row(
        "Croissance secteur",
        result.sector.as_deref().unwrap_or(UNKNOWN_SECTOR),
        &format_points(&result.sector_growth, SECTOR_MAX),
    ));
    lines.push(detail_row(
        "Solidité financière",
        "",
        &format_points(&result.financial_health, FINANCIAL_MAX),
    ));
    if let Some(margin) = meta.profit_margins {
        lines.push(detail_row("  Marge bénéfice", &format!("{:.1}%", margin * 100.0), ""));
    }
    if let Some(de) = meta.debt_to_equity {
        lines.push(detail_row("  Dette/Capitaux", &format!("{:.2}", de), ""));
    }
    if let Some(cr) = meta.current_ratio {
        lines.push(detail_row("  Ratio courant", &format!("{:.2}", cr), ""));
    }
    lines.push(String::new());

    lines.push(paint_tone(rating.health.message(), rating.health.tone(), use_colors));
    lines.push(paint_tone(rating.growth.message(), rating.growth.tone(), use_colors));
    let verdict = paint_tone(rating.verdict.message(), rating.verdict.tone(), use_colors);
    lines.push(if use_colors {
        verdict.bold().to_string()
    } else {
        verdict
    });

    lines.join("\n")
}

/// Resample `values` to at most `width` points and map each to a block glyph
pub fn format_sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let points: Vec<f64> = if values.len() <= width {
        values.to_vec()
    } else {
        (0..width)
            .map(|i| {
                let start = i * values.len() / width;
                let end = ((i + 1) * values.len() / width).max(start + 1);
                let bucket = &values[start..end];
                bucket.iter().sum::<f64>() / bucket.len() as f64
            })
            .collect()
    };

    let min = points.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = points.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let top = (SPARK_LEVELS.len() - 1) as f64;

    points
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                SPARK_LEVELS[((v - min) / span * top).round() as usize]
            }
        })
        .collect()
}

/// Caption plus a sparkline of closes sized to the terminal
pub fn format_chart(analysis: &Analysis, use_colors: bool) -> String {
    let closes: Vec<f64> = analysis.series.closes().collect();
    let width = get_terminal_width()
        .map(|w| w.saturating_sub(4).max(10))
        .unwrap_or(FALLBACK_CHART_WIDTH);

    let spark = format_sparkline(&closes, width);
    let range = match (analysis.series.min_close(), analysis.series.max_close()) {
        (Some(low), Some(high)) => format!("min {:.2}  max {:.2}", low, high),
        _ => String::new(),
    };
    let caption = format!("Performance sur {}", analysis.period.label());

    if use_colors {
        format!("{}\n  {}\n  {}", caption.dimmed(), spark.cyan(), range.dimmed())
    } else {
        format!("{}\n  {}\n  {}", caption, spark, range)
    }
}

/// Tab-separated line for scripting
/// Columns: symbol, total, momentum, volume, support, sector, financial, band (no headers, no colors)
pub fn format_tsv(analysis: &Analysis) -> String {
    let r = &analysis.result;
    format!(
        "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}",
        analysis.symbol,
        r.total,
        r.momentum.score,
        r.volume.score,
        r.support.score,
        r.sector_growth.score,
        r.financial_health.score,
        analysis.rating().band.label()
    )
}

pub fn format_json(analysis: &Analysis) -> Result<String> {
    serde_json::to_string_pretty(analysis).context("Failed to serialize analysis")
}

/// Effective sector table, one sector per line, with the score it yields
pub fn format_sector_table(table: &SectorGrowthTable, use_colors: bool) -> String {
    let row = |name: &str, factor: f64| {
        let score = crate::scoring::factors::sector_growth(factor);
        let line = format!("{:<26}x{:<6.2}{:>6.1}/{:.0}", name, factor, score, SECTOR_MAX);
        if use_colors && score >= 18.0 {
            line.green().to_string()
        } else {
            line
        }
    };

    let mut lines: Vec<String> = table.entries().map(|(name, factor)| row(name, factor)).collect();
    lines.push(row("(autres secteurs)", table.default_factor()));
    lines.join("\n")
}

/// Error message followed by remediation hints
pub fn format_error(error: &AnalysisError, use_colors: bool) -> String {
    let message = if use_colors {
        error.to_string().red().to_string()
    } else {
        error.to_string()
    };

    let hints = error.hints();
    if hints.is_empty() {
        return message;
    }

    let mut lines = vec![message, "Conseils :".to_string()];
    lines.extend(hints.iter().map(|h| format!("- {}", h)));
    lines.join("\n")
}
