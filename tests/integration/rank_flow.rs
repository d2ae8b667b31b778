//! Rank progression with an injected achievement ledger.

use arena::rank::{self, claim_promotion, AchievementLedger, InMemoryLedger};
use arena::types::RankTier;

#[test]
fn test_progression_across_season() {
    let mut ledger = InMemoryLedger::new();
    let checkpoints = [0u64, 300, 600, 900, 2500, 2400, 3600, 12_000];

    let mut promoted_to = Vec::new();
    let mut bnc_earned = 0;
    for pair in checkpoints.windows(2) {
        let check = claim_promotion(&mut ledger, pair[0], pair[1]);
        if let Some(tier) = check.new_tier {
            promoted_to.push(tier);
        }
        if let Some(reward) = check.reward {
            bnc_earned += reward.bnc;
        }
    }

    // 900 → 2500 lands on platinum and skips gold's reward
    assert_eq!(
        promoted_to,
        vec![RankTier::Silver, RankTier::Platinum, RankTier::Diamond, RankTier::Grandmaster]
    );
    assert_eq!(bnc_earned, 10 + 50 + 100 + 500);
    assert_eq!(ledger.len(), 4);
    assert!(ledger.has_unlocked(&rank::promotion_achievement_id(RankTier::Diamond)));
    assert!(!ledger.has_unlocked(&rank::promotion_achievement_id(RankTier::Gold)));
}

#[test]
fn test_user_rank_view() {
    let view = rank::get_user_rank(2000, 2500, 14);
    assert_eq!(view.tier, RankTier::Platinum);
    assert_eq!(view.level, 5);
    assert_eq!(view.progress, 0.0);
    assert!((view.bonus_multiplier - 1.30).abs() < 1e-9);
    assert_eq!(rank::format_tier_display(view.tier, true), "💠 Platinum");

    let json = serde_json::to_value(view).unwrap();
    assert_eq!(json["tier"], "platinum");
    assert_eq!(json["streakDays"], 14);
}

#[test]
fn test_rank_engine_shared_across_threads() {
    let handles: Vec<_> = (0..4u64)
        .map(|i| std::thread::spawn(move || rank::get_user_rank(i * 3000, i * 1000, 7)))
        .collect();
    let tiers: Vec<RankTier> = handles.into_iter().map(|h| h.join().unwrap().tier).collect();
    assert_eq!(
        tiers,
        vec![RankTier::Bronze, RankTier::Platinum, RankTier::Master, RankTier::Master]
    );
}
