//! Parimutuel APY prediction market.
//!
//! Odds come purely from the ratio of the whole pool to the pool behind
//! each outcome, less a house fee. The engine is stateless: every call
//! takes a market snapshot and returns a new one.

pub mod stats;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::MarketConfig;
use crate::types::{
    ensure_non_negative, ApyPrediction, ArenaError, MarketStatus, Outcome, PredictionStatus,
    UserPrediction,
};

pub use stats::calculate_prediction_stats;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct MarketEngine {
    config: MarketConfig,
}

impl Default for MarketEngine {
    fn default() -> Self {
        Self {
            config: MarketConfig::default(),
        }
    }
}

impl MarketEngine {
    /// Build an engine, rejecting configs whose odds band would not clamp.
    pub fn new(config: MarketConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Access the market configuration.
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Decimal odds for an outcome.
    ///
    /// An outcome nobody has staked on reports neutral odds of 1.0.
    /// Otherwise `total / outcome × (1 − fee)`, clamped into the odds band.
    pub fn calculate_odds(&self, total_staked: f64, outcome_staked: f64) -> f64 {
        if outcome_staked == 0.0 {
            return 1.0;
        }
        let raw = (total_staked / outcome_staked) * (1.0 - self.config.fee_rate);
        raw.clamp(self.config.min_odds, self.config.max_odds)
    }

    /// Share of the pool behind an outcome, in percent.
    pub fn calculate_market_prediction(&self, total_staked: f64, outcome_staked: f64) -> f64 {
        if total_staked == 0.0 {
            return 0.0;
        }
        (outcome_staked / total_staked) * 100.0
    }

    /// Add a stake to one outcome and reprice the whole book.
    ///
    /// All three outcomes are repriced from the same post-stake total.
    pub fn update_prediction_market(
        &self,
        prediction: &ApyPrediction,
        outcome: Outcome,
        amount: f64,
    ) -> Result<ApyPrediction, ArenaError> {
        if !prediction.is_open() {
            warn!(market_id = %prediction.id, "Stake rejected: market settled");
            return Err(ArenaError::MarketClosed(prediction.id.clone()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            warn!(market_id = %prediction.id, amount, "Stake rejected: invalid amount");
            return Err(ArenaError::InvalidAmount { field: "amount", value: amount });
        }

        let mut updated = prediction.clone();
        updated.outcomes.get_mut(outcome).total_staked += amount;

        let total = updated.outcomes.total_staked();
        for o in Outcome::ALL {
            let pool = updated.outcomes.get_mut(o);
            pool.odds = self.calculate_odds(total, pool.total_staked);
            pool.market_prediction = self.calculate_market_prediction(total, pool.total_staked);
        }

        debug!(
            market_id = %updated.id,
            outcome = %outcome,
            amount,
            total,
            up = format!("{:.2}x", updated.outcomes.up.odds),
            stable = format!("{:.2}x", updated.outcomes.stable.odds),
            down = format!("{:.2}x", updated.outcomes.down.odds),
            "Market repriced"
        );

        Ok(updated)
    }

    /// Decide the winning outcome from the realised APY.
    ///
    /// Relative change strictly beyond ±threshold settles up/down,
    /// anything within the band (inclusive) is stable.
    pub fn settle_prediction(
        &self,
        prediction: &ApyPrediction,
        actual_apy: f64,
    ) -> Result<Outcome, ArenaError> {
        if !prediction.current_apy.is_finite() || prediction.current_apy == 0.0 {
            return Err(ArenaError::InvalidApy(prediction.current_apy));
        }
        if !actual_apy.is_finite() {
            return Err(ArenaError::InvalidApy(actual_apy));
        }

        let percent_change =
            (actual_apy - prediction.current_apy) / prediction.current_apy * 100.0;
        let threshold = self.config.settle_threshold_pct;

        let outcome = if percent_change > threshold {
            Outcome::Up
        } else if percent_change < -threshold {
            Outcome::Down
        } else {
            Outcome::Stable
        };

        debug!(
            market_id = %prediction.id,
            current_apy = prediction.current_apy,
            actual_apy,
            change = format!("{percent_change:+.2}%"),
            outcome = %outcome,
            "Settlement outcome computed"
        );

        Ok(outcome)
    }

    /// Settle a market: record the actual outcome and close it.
    pub fn settle_market(
        &self,
        prediction: &ApyPrediction,
        actual_apy: f64,
    ) -> Result<ApyPrediction, ArenaError> {
        if !prediction.is_open() {
            return Err(ArenaError::MarketClosed(prediction.id.clone()));
        }
        let outcome = self.settle_prediction(prediction, actual_apy)?;

        let mut settled = prediction.clone();
        settled.status = MarketStatus::Settled;
        settled.actual_outcome = Some(outcome);

        info!(
            market_id = %settled.id,
            asset = %settled.asset,
            outcome = %outcome,
            odds = format!("{:.2}x", settled.outcomes.get(outcome).odds),
            pool = settled.outcomes.total_staked(),
            "Market settled"
        );

        Ok(settled)
    }

    /// Payout owed on a bet: `amount × odds` when its outcome won, else 0.
    pub fn calculate_prediction_payout(
        &self,
        user_prediction: &UserPrediction,
        prediction: &ApyPrediction,
    ) -> f64 {
        match prediction.actual_outcome {
            Some(actual) if actual == user_prediction.outcome => {
                user_prediction.amount * prediction.outcomes.get(actual).odds
            }
            _ => 0.0,
        }
    }

    /// Stake on a market and build the resulting pending bet.
    ///
    /// The potential payout uses the odds after this stake is in the pool.
    pub fn place_prediction(
        &self,
        prediction: &ApyPrediction,
        user_address: &str,
        outcome: Outcome,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<(ApyPrediction, UserPrediction), ArenaError> {
        let updated = self.update_prediction_market(prediction, outcome, amount)?;
        let odds = updated.outcomes.get(outcome).odds;

        let bet = UserPrediction {
            id: format!("{}-{}-{}", prediction.id, user_address, now.timestamp_millis()),
            prediction_id: prediction.id.clone(),
            user_address: user_address.to_string(),
            outcome,
            amount,
            timestamp: now,
            potential_payout: amount * odds,
            status: PredictionStatus::Pending,
            actual_payout: None,
        };

        Ok((updated, bet))
    }

    /// Move a pending bet to won/lost against its settled market.
    ///
    /// Bets that are already resolved come back unchanged.
    pub fn resolve_user_prediction(
        &self,
        user_prediction: &UserPrediction,
        prediction: &ApyPrediction,
    ) -> Result<UserPrediction, ArenaError> {
        if user_prediction.prediction_id != prediction.id {
            return Err(ArenaError::PredictionMismatch {
                expected: prediction.id.clone(),
                actual: user_prediction.prediction_id.clone(),
            });
        }
        ensure_non_negative("amount", user_prediction.amount)?;
        if user_prediction.is_completed() {
            return Ok(user_prediction.clone());
        }
        let Some(actual) = prediction.actual_outcome else {
            return Err(ArenaError::MarketNotSettled(prediction.id.clone()));
        };

        let payout = self.calculate_prediction_payout(user_prediction, prediction);
        let mut resolved = user_prediction.clone();
        resolved.status = if actual == user_prediction.outcome {
            PredictionStatus::Won
        } else {
            PredictionStatus::Lost
        };
        resolved.actual_payout = Some(payout);

        debug!(
            bet_id = %resolved.id,
            status = ?resolved.status,
            payout,
            "Prediction resolved"
        );

        Ok(resolved)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
