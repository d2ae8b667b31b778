//! Shared types for the ARENA engines.
//!
//! These types form the data model exchanged with the dashboard.
//! Field names serialize in camelCase so snapshots produced by the
//! front end deserialize directly. None of the engines own any of
//! these values: callers build a snapshot, pass it in, and receive a
//! fresh value back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Prediction market
// ---------------------------------------------------------------------------

/// APY direction a user can stake on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Up,
    Stable,
    Down,
}

impl Outcome {
    /// All outcomes in book order.
    pub const ALL: [Outcome; 3] = [Outcome::Up, Outcome::Stable, Outcome::Down];
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Up => write!(f, "up"),
            Outcome::Stable => write!(f, "stable"),
            Outcome::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Outcome::Up),
            "stable" => Ok(Outcome::Stable),
            "down" => Ok(Outcome::Down),
            _ => Err(ArenaError::UnknownOutcome(s.to_string())),
        }
    }
}

/// Pool state for one outcome of a market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomePool {
    /// Decimal payout odds, within [min_odds, max_odds] once staked.
    pub odds: f64,
    /// Share of the total pool behind this outcome (0–100).
    pub market_prediction: f64,
    pub total_staked: f64,
}

impl OutcomePool {
    /// An empty pool with neutral odds.
    pub fn empty() -> Self {
        Self {
            odds: 1.0,
            market_prediction: 0.0,
            total_staked: 0.0,
        }
    }
}

/// The fixed three-way book of a market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBook {
    pub up: OutcomePool,
    pub stable: OutcomePool,
    pub down: OutcomePool,
}

impl Default for OutcomeBook {
    fn default() -> Self {
        Self {
            up: OutcomePool::empty(),
            stable: OutcomePool::empty(),
            down: OutcomePool::empty(),
        }
    }
}

impl OutcomeBook {
    pub fn get(&self, outcome: Outcome) -> &OutcomePool {
        match outcome {
            Outcome::Up => &self.up,
            Outcome::Stable => &self.stable,
            Outcome::Down => &self.down,
        }
    }

    pub fn get_mut(&mut self, outcome: Outcome) -> &mut OutcomePool {
        match outcome {
            Outcome::Up => &mut self.up,
            Outcome::Stable => &mut self.stable,
            Outcome::Down => &mut self.down,
        }
    }

    /// Sum of stakes across all three outcomes.
    pub fn total_staked(&self) -> f64 {
        self.up.total_staked + self.stable.total_staked + self.down.total_staked
    }
}

/// Market lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Open,
    Settled,
}

/// An APY prediction market for one asset over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApyPrediction {
    pub id: String,
    pub asset: String,
    /// APY at market open, in percent.
    pub current_apy: f64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub status: MarketStatus,
    pub outcomes: OutcomeBook,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_outcome: Option<Outcome>,
}

impl fmt::Display for ApyPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} APY {:.2}% | up {:.2}x stable {:.2}x down {:.2}x | pool {:.2}",
            self.id,
            self.asset,
            self.current_apy,
            self.outcomes.up.odds,
            self.outcomes.stable.odds,
            self.outcomes.down.odds,
            self.outcomes.total_staked(),
        )
    }
}

impl ApyPrediction {
    /// A fresh open market with an empty book.
    pub fn open(
        id: impl Into<String>,
        asset: impl Into<String>,
        current_apy: f64,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            asset: asset.into(),
            current_apy,
            period_start,
            period_end,
            status: MarketStatus::Open,
            outcomes: OutcomeBook::default(),
            actual_outcome: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }
}

/// Resolution status of a user's bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Pending,
    Won,
    Lost,
}

/// A single stake placed by a user on a market outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPrediction {
    pub id: String,
    pub prediction_id: String,
    pub user_address: String,
    pub outcome: Outcome,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub potential_payout: f64,
    pub status: PredictionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_payout: Option<f64>,
}

impl UserPrediction {
    pub fn is_completed(&self) -> bool {
        self.status != PredictionStatus::Pending
    }

    /// Realised profit: payout minus stake. Pending bets count the stake as lost.
    pub fn profit(&self) -> f64 {
        self.actual_payout.unwrap_or(0.0) - self.amount
    }
}

/// Aggregate record of a user's completed predictions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionStats {
    pub total_predictions: usize,
    pub won: usize,
    pub lost: usize,
    /// Fraction of completed predictions won (0.0–1.0).
    pub win_rate: f64,
    pub total_profit: f64,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl fmt::Display for PredictionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "predictions={} (W{}/L{}) | win_rate={:.1}% | profit={:.2} | streak={} best={}",
            self.total_predictions,
            self.won,
            self.lost,
            self.win_rate * 100.0,
            self.total_profit,
            self.current_streak,
            self.best_streak,
        )
    }
}

// ---------------------------------------------------------------------------
// Portfolio risk
// ---------------------------------------------------------------------------

/// Informational risk label attached to a position by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A held asset in a portfolio snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub asset: String,
    pub amount: f64,
    pub value_usd: f64,
    pub risk_level: RiskLevel,
    /// Annualised volatility in percent.
    pub volatility: f64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.4} (${:.2}, vol {:.1}%)",
            self.asset, self.amount, self.value_usd, self.volatility,
        )
    }
}

impl Position {
    /// Unit price implied by the snapshot, or 0 for an empty position.
    pub fn unit_price(&self) -> f64 {
        if self.amount > 0.0 {
            self.value_usd / self.amount
        } else {
            0.0
        }
    }
}

/// Urgency of a hedge recommendation. Ordering is most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort rank: critical(0) < high(1) < medium(2) < low(3).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutOptionDetails {
    pub asset: String,
    pub strike_price: f64,
    pub premium: f64,
    pub expiry_date: DateTime<Utc>,
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldInsuranceDetails {
    /// Guaranteed APY in percent.
    pub guaranteed_apy: f64,
    /// Annual premium in percent of the covered amount.
    pub premium_rate: f64,
    pub coverage_amount: f64,
    /// Policy length in days.
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationTarget {
    pub asset: String,
    pub current_ratio: f64,
    pub target_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversificationDetails {
    pub suggested_allocations: Vec<AllocationTarget>,
}

/// Type-specific payload of a recommendation, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "kebab-case")]
pub enum HedgeKind {
    PutOption(PutOptionDetails),
    YieldInsurance(YieldInsuranceDetails),
    Diversification(DiversificationDetails),
}

impl HedgeKind {
    /// The wire tag of this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            HedgeKind::PutOption(_) => "put-option",
            HedgeKind::YieldInsurance(_) => "yield-insurance",
            HedgeKind::Diversification(_) => "diversification",
        }
    }
}

/// A suggested hedge for a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeRecommendation {
    pub id: String,
    pub severity: Severity,
    pub description: String,
    pub estimated_cost: f64,
    pub protection_amount: f64,
    #[serde(flatten)]
    pub kind: HedgeKind,
}

impl fmt::Display for HedgeRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} cost=${:.2} protects=${:.2}: {}",
            self.severity,
            self.kind.tag(),
            self.estimated_cost,
            self.protection_amount,
            self.description,
        )
    }
}

/// Result of analysing a portfolio snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub total_exposure: f64,
    /// Share of the largest position (0.0–1.0).
    pub concentration_risk: f64,
    /// Value-weighted volatility as a fraction.
    pub volatility_score: f64,
    pub recommendations: Vec<HedgeRecommendation>,
}

impl RiskAnalysis {
    pub fn empty() -> Self {
        Self {
            total_exposure: 0.0,
            concentration_risk: 0.0,
            volatility_score: 0.0,
            recommendations: Vec::new(),
        }
    }
}

impl fmt::Display for RiskAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exposure=${:.2} | concentration={:.1}% | volatility={:.1}% | {} recommendation(s)",
            self.total_exposure,
            self.concentration_risk * 100.0,
            self.volatility_score * 100.0,
            self.recommendations.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// Rank ladder, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
}

impl RankTier {
    /// The ladder in ascending order.
    pub const ALL: [RankTier; 7] = [
        RankTier::Bronze,
        RankTier::Silver,
        RankTier::Gold,
        RankTier::Platinum,
        RankTier::Diamond,
        RankTier::Master,
        RankTier::Grandmaster,
    ];
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankTier::Bronze => write!(f, "bronze"),
            RankTier::Silver => write!(f, "silver"),
            RankTier::Gold => write!(f, "gold"),
            RankTier::Platinum => write!(f, "platinum"),
            RankTier::Diamond => write!(f, "diamond"),
            RankTier::Master => write!(f, "master"),
            RankTier::Grandmaster => write!(f, "grandmaster"),
        }
    }
}

/// Derived view of a user's standing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRank {
    pub tier: RankTier,
    pub points: u64,
    pub level: u32,
    /// Progress through the current tier (0–100).
    pub progress: f64,
    pub streak_days: u32,
    pub bonus_multiplier: f64,
}

impl fmt::Display for UserRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Lv.{}) | {} pts ({:.0}%) | streak {}d | x{:.2}",
            self.tier, self.level, self.points, self.progress, self.streak_days, self.bonus_multiplier,
        )
    }
}

/// Reward granted on reaching a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionReward {
    pub xp: u64,
    pub bnc: u64,
    pub badge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

/// Outcome of comparing a user's tier before and after a points change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionCheck {
    pub can_promote: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_tier: Option<RankTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<PromotionReward>,
}

impl PromotionCheck {
    pub fn none() -> Self {
        Self {
            can_promote: false,
            new_tier: None,
            reward: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Input validation errors raised by the engines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArenaError {
    #[error("Invalid {field}: {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("Invalid APY: {0}")]
    InvalidApy(f64),

    #[error("Unknown outcome: {0}")]
    UnknownOutcome(String),

    #[error("Market is closed: {0}")]
    MarketClosed(String),

    #[error("Market not settled: {0}")]
    MarketNotSettled(String),

    #[error("Prediction belongs to market {actual}, expected {expected}")]
    PredictionMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reject non-finite or negative values.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, ArenaError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ArenaError::InvalidAmount { field, value })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
