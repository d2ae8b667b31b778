//! ARENA command line.
//!
//! Loads configuration, initialises structured logging, reads a JSON
//! snapshot, runs one engine over it and prints the result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use arena::config::{self, ArenaConfig};
use arena::market::{calculate_prediction_stats, MarketEngine};
use arena::rank;
use arena::risk::RiskEngine;
use arena::types::{ApyPrediction, Position, UserPrediction};

#[derive(Parser, Debug)]
#[command(name = "arena", version, about = "Prediction market, risk and rank engines")]
struct Cli {
    /// Path to the TOML config file (defaults apply when missing)
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a JSON array of positions
    Risk { positions: PathBuf },
    /// Summarise a JSON array of user predictions
    Stats { history: PathBuf },
    /// Settle a JSON market at the realised APY
    Settle {
        market: PathBuf,
        #[arg(long)]
        apy: f64,
    },
    /// Show the rank for a set of counters
    Rank {
        #[arg(long, default_value_t = 0)]
        points: u64,
        #[arg(long, default_value_t = 0)]
        xp: u64,
        #[arg(long, default_value_t = 0)]
        streak: u32,
    },
    /// Check for a tier promotion between two point totals
    Promote {
        #[arg(long)]
        from: u64,
        #[arg(long)]
        to: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = ArenaConfig::load_or_default(&cli.config)?;

    init_logging(&cfg);
    debug!(config = %cli.config, "Configuration loaded");

    match cli.command {
        Command::Risk { positions } => {
            let positions: Vec<Position> = read_json(&positions)?;
            let analysis = RiskEngine::new(cfg.risk).analyze_risk(&positions)?;
            info!(%analysis, "Risk analysis complete");
            print_json(&analysis)
        }
        Command::Stats { history } => {
            let history: Vec<UserPrediction> = read_json(&history)?;
            let stats = calculate_prediction_stats(&history);
            info!(%stats, "Prediction stats complete");
            print_json(&stats)
        }
        Command::Settle { market, apy } => {
            let market: ApyPrediction = read_json(&market)?;
            let settled = MarketEngine::new(cfg.market)?.settle_market(&market, apy)?;
            print_json(&settled)
        }
        Command::Rank { points, xp, streak } => {
            let user_rank = rank::get_user_rank(points, xp, streak);
            info!(
                tier = %rank::format_tier_display(user_rank.tier, true),
                level_progress = format!("{:.0}%", rank::calculate_level_progress(xp)),
                next_tier = ?rank::get_next_tier(user_rank.tier),
                "Rank computed"
            );
            print_json(&user_rank)
        }
        Command::Promote { from, to } => print_json(&rank::can_promote(from, to)),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise result")?;
    println!("{json}");
    Ok(())
}

/// Initialise tracing. `RUST_LOG` overrides the configured filter and
/// `ARENA_LOG_JSON` forces JSON output.
fn init_logging(cfg: &ArenaConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.filter));

    let json_logging = cfg.logging.json || std::env::var("ARENA_LOG_JSON").is_ok();

    // Logs go to stderr so stdout stays valid JSON.
    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
