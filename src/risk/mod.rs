//! Portfolio risk analysis.
//!
//! Scores a position snapshot for exposure, concentration and
//! value-weighted volatility, then asks the hedge generator for
//! recommendations.

pub mod hedge;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::RiskConfig;
use crate::types::{ensure_non_negative, ArenaError, Position, RiskAnalysis};

pub use hedge::calculate_put_payout;

pub struct RiskEngine {
    config: RiskConfig,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Access the risk configuration.
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Analyse a portfolio snapshot as of now.
    pub fn analyze_risk(&self, positions: &[Position]) -> Result<RiskAnalysis, ArenaError> {
        self.analyze_risk_at(positions, Utc::now())
    }

    /// Analyse a portfolio snapshot; `now` dates any put option expiries.
    pub fn analyze_risk_at(
        &self,
        positions: &[Position],
        now: DateTime<Utc>,
    ) -> Result<RiskAnalysis, ArenaError> {
        for p in positions {
            validate_position(p).inspect_err(|e| {
                warn!(asset = %p.asset, error = %e, "Position rejected");
            })?;
        }

        let total_exposure: f64 = positions.iter().map(|p| p.value_usd).sum();
        if total_exposure == 0.0 {
            debug!(positions = positions.len(), "No exposure, nothing to analyse");
            return Ok(RiskAnalysis::empty());
        }

        let largest = positions
            .iter()
            .map(|p| p.value_usd)
            .fold(0.0_f64, f64::max);
        let concentration_risk = largest / total_exposure;

        let volatility_score = positions
            .iter()
            .map(|p| p.volatility * (p.value_usd / total_exposure))
            .sum::<f64>()
            / 100.0;

        let recommendations = hedge::generate_recommendations(
            &self.config,
            positions,
            total_exposure,
            concentration_risk,
            now,
        );

        debug!(
            total_exposure,
            concentration = format!("{:.1}%", concentration_risk * 100.0),
            volatility = format!("{:.1}%", volatility_score * 100.0),
            recommendations = recommendations.len(),
            "Risk analysed"
        );

        Ok(RiskAnalysis {
            total_exposure,
            concentration_risk,
            volatility_score,
            recommendations,
        })
    }
}

fn validate_position(p: &Position) -> Result<(), ArenaError> {
    ensure_non_negative("amount", p.amount)?;
    ensure_non_negative("value_usd", p.value_usd)?;
    ensure_non_negative("volatility", p.volatility)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
