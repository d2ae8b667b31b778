//! Configuration loading from TOML.
//!
//! Every section falls back to the reference engine constants, so a
//! missing or empty `arena.toml` reproduces the dashboard's behaviour.
//! The rank ladder and reward tables are fixed and not configurable.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::types::ArenaError;

/// Default config file path.
pub const DEFAULT_CONFIG_FILE: &str = "arena.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub market: MarketConfig,
    pub risk: RiskConfig,
    pub logging: LoggingConfig,
}

/// Parimutuel market parameters.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    /// House fee taken from the pool before odds (0.05 = 5%).
    pub fee_rate: f64,
    pub min_odds: f64,
    pub max_odds: f64,
    /// APY change (percent of current APY) beyond which a market settles up/down.
    pub settle_threshold_pct: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            fee_rate: 0.05,
            min_odds: 1.1,
            max_odds: 10.0,
            settle_threshold_pct: 2.0,
        }
    }
}

impl MarketConfig {
    /// Reject fees and odds bounds the odds formula cannot use.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(ArenaError::Config(format!(
                "market.fee_rate must be in [0, 1), got {}",
                self.fee_rate
            )));
        }
        let (min, max) = (self.min_odds, self.max_odds);
        if min.is_nan() || max.is_nan() || min < 1.0 || min > max {
            return Err(ArenaError::Config(format!(
                "market odds bounds invalid: min {} max {}",
                self.min_odds, self.max_odds
            )));
        }
        if self.settle_threshold_pct.is_nan() || self.settle_threshold_pct < 0.0 {
            return Err(ArenaError::Config(format!(
                "market.settle_threshold_pct must be non-negative, got {}",
                self.settle_threshold_pct
            )));
        }
        Ok(())
    }
}

/// Hedge recommendation triggers and pricing.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    /// Largest-position share above which diversification is suggested.
    pub concentration_threshold: f64,
    /// Volatility (percent) above which a put option is suggested.
    pub put_volatility_threshold: f64,
    /// Volatility (percent) above which a put option is critical.
    pub critical_volatility_threshold: f64,
    /// Strike as a fraction of the current unit price.
    pub strike_discount: f64,
    /// Put premium as a fraction of position value.
    pub put_premium_rate: f64,
    pub put_expiry_days: i64,
    /// Position share of total exposure above which yield insurance is suggested.
    pub yield_exposure_threshold: f64,
    /// Guaranteed APY in percent.
    pub guaranteed_apy: f64,
    /// Insurance premium as a fraction of covered value (0.005 = 0.5%).
    /// Recommendations report it in percent, i.e. multiplied by 100.
    pub insurance_premium_rate: f64,
    /// Insured protection as a fraction of covered value.
    pub insurance_protection_ratio: f64,
    pub insurance_duration_days: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            concentration_threshold: 0.7,
            put_volatility_threshold: 30.0,
            critical_volatility_threshold: 50.0,
            strike_discount: 0.9,
            put_premium_rate: 0.02,
            put_expiry_days: 30,
            yield_exposure_threshold: 0.4,
            guaranteed_apy: 10.0,
            insurance_premium_rate: 0.005,
            insurance_protection_ratio: 0.1,
            insurance_duration_days: 365,
        }
    }
}

/// Log output settings for the binary.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "arena=info".to_string(),
            json: false,
        }
    }
}

impl ArenaConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use the defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: ArenaConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the engines cannot work with.
    pub fn validate(&self) -> Result<(), ArenaError> {
        self.market.validate()?;

        let r = &self.risk;
        let fractions = [
            ("risk.concentration_threshold", r.concentration_threshold),
            ("risk.strike_discount", r.strike_discount),
            ("risk.put_premium_rate", r.put_premium_rate),
            ("risk.yield_exposure_threshold", r.yield_exposure_threshold),
            ("risk.insurance_premium_rate", r.insurance_premium_rate),
            ("risk.insurance_protection_ratio", r.insurance_protection_ratio),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ArenaError::Config(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if r.put_volatility_threshold < 0.0
            || r.critical_volatility_threshold < r.put_volatility_threshold
        {
            return Err(ArenaError::Config(format!(
                "risk volatility thresholds invalid: put {} critical {}",
                r.put_volatility_threshold, r.critical_volatility_threshold
            )));
        }
        if r.put_expiry_days < 0 {
            return Err(ArenaError::Config("risk.put_expiry_days must be non-negative".into()));
        }
        Ok(())
    }
}
