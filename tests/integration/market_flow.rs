//! Market lifecycle: stake → settle → resolve → stats.

use chrono::{Duration, Utc};

use arena::market::{calculate_prediction_stats, MarketEngine};
use arena::types::{ApyPrediction, MarketStatus, Outcome, PredictionStatus, UserPrediction};

fn open_market() -> ApyPrediction {
    let start = Utc::now();
    ApyPrediction::open("vglmr-apy-w7", "vGLMR", 12.0, start, start + Duration::days(7))
}

#[test]
fn test_full_market_lifecycle() {
    let engine = MarketEngine::default();
    let now = Utc::now();

    let stakes = [
        ("0xa11ce", Outcome::Up, 400.0),
        ("0xb0b", Outcome::Stable, 250.0),
        ("0xc4r0l", Outcome::Down, 100.0),
        ("0xa11ce", Outcome::Down, 50.0),
    ];

    let mut market = open_market();
    let mut bets: Vec<UserPrediction> = Vec::new();
    for (user, outcome, amount) in stakes {
        let (next, bet) = engine
            .place_prediction(&market, user, outcome, amount, now)
            .unwrap();
        market = next;
        bets.push(bet);
    }

    // Pool conservation
    let staked: f64 = stakes.iter().map(|s| s.2).sum();
    assert!((market.outcomes.total_staked() - staked).abs() < 1e-9);
    assert_eq!(market.outcomes.down.total_staked, 150.0);

    // Consistent pricing across the book
    let shares: f64 = Outcome::ALL
        .iter()
        .map(|o| market.outcomes.get(*o).market_prediction)
        .sum();
    assert!((shares - 100.0).abs() < 1e-9);

    // APY falls 5% → down wins
    let settled = engine.settle_market(&market, 11.4).unwrap();
    assert_eq!(settled.status, MarketStatus::Settled);
    assert_eq!(settled.actual_outcome, Some(Outcome::Down));

    let resolved: Vec<UserPrediction> = bets
        .iter()
        .map(|b| engine.resolve_user_prediction(b, &settled).unwrap())
        .collect();
    let winners: Vec<&UserPrediction> = resolved
        .iter()
        .filter(|b| b.status == PredictionStatus::Won)
        .collect();
    assert_eq!(winners.len(), 2);
    for w in &winners {
        assert_eq!(w.actual_payout, Some(w.amount * settled.outcomes.down.odds));
    }

    let alice: Vec<UserPrediction> = resolved
        .iter()
        .filter(|b| b.user_address == "0xa11ce")
        .cloned()
        .collect();
    let stats = calculate_prediction_stats(&alice);
    assert_eq!(stats.total_predictions, 2);
    assert!((stats.win_rate - 0.5).abs() < 1e-12);
    let expected_profit = 50.0 * settled.outcomes.down.odds - 50.0 - 400.0;
    assert!((stats.total_profit - expected_profit).abs() < 1e-9);
    assert_eq!(stats.current_streak, 1);
}

#[test]
fn test_stake_after_settlement_rejected() {
    let engine = MarketEngine::default();
    let settled = engine.settle_market(&open_market(), 12.0).unwrap();
    assert_eq!(settled.actual_outcome, Some(Outcome::Stable));
    assert!(engine
        .place_prediction(&settled, "0xa11ce", Outcome::Up, 10.0, Utc::now())
        .is_err());
}

#[test]
fn test_market_snapshot_json_roundtrip() {
    let engine = MarketEngine::default();
    let market = engine
        .update_prediction_market(&open_market(), Outcome::Up, 100.0)
        .unwrap();
    let json = serde_json::to_string(&market).unwrap();
    assert!(json.contains("\"marketPrediction\""));
    let back: ApyPrediction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, market);
}
