//! Rank engine: tiers, levels, streaks and reward multipliers.
//!
//! Points place a user on a fixed seven-tier ladder, XP drives a
//! square-root level curve, and daily streaks plus tier add a bonus
//! multiplier on top of the base rate.

pub mod achievements;
pub mod promotion;

use crate::types::{RankTier, UserRank};

pub use achievements::{
    claim_promotion, promotion_achievement_id, AchievementLedger, InMemoryLedger,
};
pub use promotion::{can_promote, format_tier_display, get_tier_promotion_reward};

// ---------------------------------------------------------------------------
// Tier table
// ---------------------------------------------------------------------------

/// Fixed descriptor for a rank tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierInfo {
    pub tier: RankTier,
    pub name: &'static str,
    pub min_points: u64,
    /// Inclusive upper bound; `None` for the open-ended top tier.
    pub max_points: Option<u64>,
    pub color: &'static str,
    pub icon: &'static str,
    pub benefits: &'static [&'static str],
    pub bonus: f64,
}

static TIERS: [TierInfo; 7] = [
    TierInfo {
        tier: RankTier::Bronze,
        name: "Bronze",
        min_points: 0,
        max_points: Some(499),
        color: "#CD7F32",
        icon: "🥉",
        benefits: &["Basic predictions"],
        bonus: 0.0,
    },
    TierInfo {
        tier: RankTier::Silver,
        name: "Silver",
        min_points: 500,
        max_points: Some(999),
        color: "#C0C0C0",
        icon: "🥈",
        benefits: &["5% reward bonus", "Weekly challenges"],
        bonus: 0.05,
    },
    TierInfo {
        tier: RankTier::Gold,
        name: "Gold",
        min_points: 1000,
        max_points: Some(1999),
        color: "#FFD700",
        icon: "🥇",
        benefits: &["10% reward bonus", "Exclusive markets"],
        bonus: 0.10,
    },
    TierInfo {
        tier: RankTier::Platinum,
        name: "Platinum",
        min_points: 2000,
        max_points: Some(3499),
        color: "#E5E4E2",
        icon: "💠",
        benefits: &["15% reward bonus", "Early market access", "Hedge fee discount"],
        bonus: 0.15,
    },
    TierInfo {
        tier: RankTier::Diamond,
        name: "Diamond",
        min_points: 3500,
        max_points: Some(5999),
        color: "#B9F2FF",
        icon: "💎",
        benefits: &["20% reward bonus", "Priority settlement", "Custom badge"],
        bonus: 0.20,
    },
    TierInfo {
        tier: RankTier::Master,
        name: "Master",
        min_points: 6000,
        max_points: Some(9999),
        color: "#9B59B6",
        icon: "👑",
        benefits: &["25% reward bonus", "Governance votes", "Private arena"],
        bonus: 0.25,
    },
    TierInfo {
        tier: RankTier::Grandmaster,
        name: "Grandmaster",
        min_points: 10000,
        max_points: None,
        color: "#FF4500",
        icon: "🏆",
        benefits: &["30% reward bonus", "Hall of fame", "All perks unlocked"],
        bonus: 0.30,
    },
];

/// Descriptor for a tier.
pub fn tier_info(tier: RankTier) -> &'static TierInfo {
    &TIERS[tier as usize]
}

/// Highest tier whose floor the points reach.
pub fn get_tier_by_points(points: u64) -> RankTier {
    TIERS
        .iter()
        .rev()
        .find(|t| points >= t.min_points)
        .map(|t| t.tier)
        .unwrap_or(RankTier::Bronze)
}

/// The next tier up, or `None` at the top of the ladder.
pub fn get_next_tier(tier: RankTier) -> Option<RankTier> {
    RankTier::ALL.get(tier as usize + 1).copied()
}

/// Progress through the current tier in percent; always 100 at the top.
pub fn calculate_tier_progress(points: u64) -> f64 {
    let info = tier_info(get_tier_by_points(points));
    let Some(max) = info.max_points else {
        return 100.0;
    };
    let span = (max - info.min_points + 1) as f64;
    let progress = (points - info.min_points) as f64 / span * 100.0;
    progress.min(100.0)
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// Level for an XP total: `floor(sqrt(xp / 100))`.
///
/// The float estimate is corrected in integers, since `u64 as f64`
/// rounds large totals.
pub fn calculate_level(xp: u64) -> u32 {
    let hundreds = xp / 100;
    let mut level = (hundreds as f64).sqrt() as u64;
    while level * level > hundreds {
        level -= 1;
    }
    while (level + 1) * (level + 1) <= hundreds {
        level += 1;
    }
    level as u32
}

/// XP at which the level after `level` starts. Saturates at `u64::MAX`.
pub fn get_xp_for_next_level(level: u32) -> u64 {
    let next = u64::from(level) + 1;
    next.saturating_mul(next).saturating_mul(100)
}

/// Progress towards the next level in percent.
pub fn calculate_level_progress(xp: u64) -> f64 {
    let level = calculate_level(xp);
    let floor_xp = u64::from(level).pow(2) * 100;
    let next_xp = get_xp_for_next_level(level);
    let progress = xp.saturating_sub(floor_xp) as f64 / (next_xp - floor_xp) as f64 * 100.0;
    progress.min(100.0)
}

// ---------------------------------------------------------------------------
// Bonuses
// ---------------------------------------------------------------------------

/// Bonus for consecutive active days.
pub fn calculate_streak_bonus(days: u32) -> f64 {
    match days {
        0..=2 => 0.0,
        3..=6 => 0.05,
        7..=13 => 0.10,
        14..=29 => 0.15,
        _ => 0.25,
    }
}

/// Fixed reward bonus of a tier.
pub fn get_tier_bonus(tier: RankTier) -> f64 {
    tier_info(tier).bonus
}

/// `1 + tier bonus + streak bonus`.
pub fn calculate_total_multiplier(tier: RankTier, streak_days: u32) -> f64 {
    1.0 + get_tier_bonus(tier) + calculate_streak_bonus(streak_days)
}

/// Full rank view for a user's counters.
pub fn get_user_rank(points: u64, xp: u64, streak_days: u32) -> UserRank {
    let tier = get_tier_by_points(points);
    UserRank {
        tier,
        points,
        level: calculate_level(xp),
        progress: calculate_tier_progress(points),
        streak_days,
        bonus_multiplier: calculate_total_multiplier(tier, streak_days),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
