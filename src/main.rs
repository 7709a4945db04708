use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use oppscore::analysis::{analyze, normalize_symbol};
use oppscore::config::Settings;
use oppscore::market::{CacheConfig, Period};
use oppscore::output;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 1; // unknown symbol, no data, TUI failure
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// One tab-separated line for scripting
    Tsv,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one symbol and print the report (default if no subcommand)
    Analyze {
        /// Ticker symbol, e.g. TSLA or SHOP.TO (defaults to config default_symbol)
        #[arg(value_parser = parse_symbol)]
        symbol: Option<String>,

        /// Analysis window: 1m, 3m, 6m or 1y
        #[arg(short, long)]
        period: Option<Period>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Append a sparkline of closing prices (text format only)
        #[arg(long)]
        chart: bool,
    },
    /// Interactive terminal UI
    Tui {
        /// Symbol to analyze on startup
        #[arg(value_parser = parse_symbol)]
        symbol: Option<String>,

        /// Initial analysis window
        #[arg(short, long)]
        period: Option<Period>,
    },
    /// Print the effective sector growth table
    Sectors,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "oppscore")]
#[command(about = "Stock opportunity score from recent prices and fundamentals", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/oppscore/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bypass the market data cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Delete the market data cache before running
    #[arg(long, global = true)]
    clear_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_symbol(s: &str) -> Result<String, String> {
    normalize_symbol(s).ok_or_else(|| "symbol must not be empty".to_string())
}

/// Install the tracing subscriber. RUST_LOG wins unless --verbose is given.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("oppscore=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oppscore=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(oppscore::stderr_buffer::writer)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn cache_config(cli_no_cache: bool, settings: &Settings) -> CacheConfig {
    let config = CacheConfig {
        enabled: !cli_no_cache,
        ttl: settings.cache_ttl,
    };
    if config.enabled {
        tracing::debug!(ttl = %humantime::format_duration(config.ttl), "cache enabled");
    } else {
        tracing::debug!("cache disabled (--no-cache)");
    }
    config
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Analyze {
        symbol: None,
        period: None,
        format: OutputFormat::Text,
        chart: false,
    });
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    // init does not need a valid config
    if let Commands::Init { force } = command {
        match oppscore::config::init::write_default_config(config_path, force) {
            Ok(path) => {
                println!("Config written to {}", path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    // Load and validate config at startup
    let settings = match oppscore::config::load_settings(config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.clear_cache {
        match oppscore::market::clear_cache() {
            Ok(()) => tracing::debug!("cache cleared"),
            Err(e) => eprintln!("Failed to clear cache: {:#}", e),
        }
    }

    match command {
        Commands::Sectors => {
            let use_colors = output::should_use_colors();
            println!("{}", output::format_sector_table(&settings.sectors, use_colors));
        }
        Commands::Analyze {
            symbol,
            period,
            format,
            chart,
        } => {
            let symbol = symbol.unwrap_or_else(|| settings.default_symbol.clone());
            let period = period.unwrap_or(settings.default_period);

            let cache = cache_config(cli.no_cache, &settings);
            let provider = match oppscore::market::create_provider(&cache) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Failed to create market data client: {:#}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            };

            let analysis = match analyze(
                provider.as_ref(),
                &symbol,
                period,
                &settings.sectors,
                settings.request_timeout,
            )
            .await
            {
                Ok(a) => a,
                Err(e) => {
                    let use_colors = std::io::stderr().is_terminal();
                    eprintln!("{}", output::format_error(&e, use_colors));
                    std::process::exit(e.exit_code());
                }
            };

            match format {
                OutputFormat::Text => {
                    let use_colors = output::should_use_colors();
                    println!("{}", output::format_report(&analysis, use_colors));
                    if chart {
                        println!();
                        println!("{}", output::format_chart(&analysis, use_colors));
                    }
                }
                OutputFormat::Tsv => println!("{}", output::format_tsv(&analysis)),
                OutputFormat::Json => match output::format_json(&analysis) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("{:#}", e);
                        std::process::exit(EXIT_DATA);
                    }
                },
            }

            tracing::debug!(elapsed = ?start_time.elapsed(), "analysis complete");
        }
        Commands::Tui { symbol, period } => {
            let cache = cache_config(cli.no_cache, &settings);
            let provider = match oppscore::market::create_provider(&cache) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Failed to create market data client: {:#}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            };

            let period = period.unwrap_or(settings.default_period);
            let autostart = symbol.is_some();
            let mut app = oppscore::tui::App::new(settings, symbol, period);
            if autostart {
                app.submit();
            }

            if let Err(e) = oppscore::tui::run_tui(app, provider).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_DATA);
            }
        }
        Commands::Init { .. } => unreachable!("handled before config loading"),
    }

    std::process::exit(EXIT_SUCCESS);
}
