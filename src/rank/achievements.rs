//! Achievement ledger.
//!
//! Tracks which one-off achievements a user has already been granted so a
//! tier reward is paid once even if points dip and climb back. The ledger
//! is owned and injected by the caller; the engines hold no state.

use std::collections::HashSet;
use tracing::debug;

use super::get_tier_by_points;
use super::promotion::can_promote;
use crate::types::{PromotionCheck, RankTier};

#[cfg_attr(test, mockall::automock)]
pub trait AchievementLedger {
    fn has_unlocked(&self, achievement_id: &str) -> bool;
    fn mark_unlocked(&mut self, achievement_id: &str);
}

/// Ledger backed by a set, for tests and single-session callers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    unlocked: HashSet<String>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }
}

impl AchievementLedger for InMemoryLedger {
    fn has_unlocked(&self, achievement_id: &str) -> bool {
        self.unlocked.contains(achievement_id)
    }

    fn mark_unlocked(&mut self, achievement_id: &str) {
        self.unlocked.insert(achievement_id.to_string());
    }
}

/// Achievement id for reaching a tier.
pub fn promotion_achievement_id(tier: RankTier) -> String {
    format!("tier-{tier}")
}

/// Check for a tier change and grant its reward at most once.
///
/// A repeat promotion into an already unlocked tier still reports the new
/// tier, without a reward. A drop in tier is reported but never rewarded
/// and leaves the ledger untouched.
pub fn claim_promotion(
    ledger: &mut dyn AchievementLedger,
    old_points: u64,
    new_points: u64,
) -> PromotionCheck {
    let mut check = can_promote(old_points, new_points);
    let Some(tier) = check.new_tier else {
        return check;
    };
    if tier < get_tier_by_points(old_points) {
        debug!(tier = %tier, "Tier dropped, no reward");
        check.reward = None;
        return check;
    }

    let id = promotion_achievement_id(tier);
    if ledger.has_unlocked(&id) {
        debug!(achievement = %id, "Promotion reward already claimed");
        check.reward = None;
    } else {
        ledger.mark_unlocked(&id);
        debug!(achievement = %id, "Promotion reward unlocked");
    }
    check
}
