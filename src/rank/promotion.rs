//! Tier promotion rewards and display.

use tracing::info;

use super::{get_tier_by_points, tier_info};
use crate::types::{PromotionCheck, PromotionReward, RankTier};

/// One-off reward for reaching a tier. Bronze is the starting tier and has none.
pub fn get_tier_promotion_reward(tier: RankTier) -> Option<PromotionReward> {
    let (xp, bnc, badge, multiplier) = match tier {
        RankTier::Bronze => return None,
        RankTier::Silver => (100, 10, "Rising Star", None),
        RankTier::Gold => (250, 25, "Golden Oracle", None),
        RankTier::Platinum => (500, 50, "Platinum Prophet", Some(1.05)),
        RankTier::Diamond => (1000, 100, "Diamond Hands", Some(1.1)),
        RankTier::Master => (2500, 250, "Market Master", Some(1.15)),
        RankTier::Grandmaster => (5000, 500, "Grand Seer", Some(1.2)),
    };
    Some(PromotionReward {
        xp,
        bnc,
        badge: badge.to_string(),
        multiplier,
    })
}

/// Compare tiers before and after a points change.
///
/// Any tier change is reported, including a drop. Crossing several
/// boundaries at once reports only the landing tier and its reward.
pub fn can_promote(old_points: u64, new_points: u64) -> PromotionCheck {
    let old_tier = get_tier_by_points(old_points);
    let new_tier = get_tier_by_points(new_points);
    if new_tier == old_tier {
        return PromotionCheck::none();
    }

    info!(
        from = %old_tier,
        to = %new_tier,
        old_points,
        new_points,
        "Tier changed"
    );

    PromotionCheck {
        can_promote: true,
        new_tier: Some(new_tier),
        reward: get_tier_promotion_reward(new_tier),
    }
}

/// Tier name, optionally prefixed with its icon.
pub fn format_tier_display(tier: RankTier, include_icon: bool) -> String {
    let info = tier_info(tier);
    if include_icon {
        format!("{} {}", info.icon, info.name)
    } else {
        info.name.to_string()
    }
}
