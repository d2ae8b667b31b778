//! Portfolio analysis on realistic snapshots.

use chrono::{Duration, TimeZone, Utc};

use arena::config::ArenaConfig;
use arena::risk::{calculate_put_payout, RiskEngine};
use arena::types::{HedgeKind, Position, RiskLevel};

fn position(asset: &str, amount: f64, value_usd: f64, volatility: f64) -> Position {
    Position {
        asset: asset.to_string(),
        amount,
        value_usd,
        risk_level: RiskLevel::Medium,
        volatility,
    }
}

#[test]
fn test_reference_portfolio_from_json() {
    let json = r#"[
        {"asset": "vDOT", "amount": 600, "valueUsd": 6000, "riskLevel": "medium", "volatility": 45},
        {"asset": "vGLMR", "amount": 8000, "valueUsd": 2000, "riskLevel": "high", "volatility": 30},
        {"asset": "vASTR", "amount": 20000, "valueUsd": 1000, "riskLevel": "low", "volatility": 20}
    ]"#;
    let positions: Vec<Position> = serde_json::from_str(json).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    let analysis = RiskEngine::default().analyze_risk_at(&positions, now).unwrap();
    assert_eq!(analysis.total_exposure, 9000.0);
    assert!((analysis.concentration_risk - 0.667).abs() < 0.001);
    assert!(analysis.volatility_score > 0.3 && analysis.volatility_score < 0.5);

    let severities: Vec<u8> = analysis.recommendations.iter().map(|r| r.severity.rank()).collect();
    assert!(severities.windows(2).all(|w| w[0] <= w[1]));

    let put = analysis
        .recommendations
        .iter()
        .find_map(|r| match &r.kind {
            HedgeKind::PutOption(d) => Some(d.clone()),
            _ => None,
        })
        .expect("vDOT put option");
    assert_eq!(put.asset, "vDOT");
    assert!((put.strike_price - 9.0).abs() < 1e-9);
    assert_eq!(put.expiry_date, now + Duration::days(30));

    // Exercise the suggested hedge after a 50% drawdown.
    let payout = calculate_put_payout(&put, 4.5);
    assert!((payout - (0.5 * 6000.0 - 120.0)).abs() < 1e-6);
}

#[test]
fn test_concentrated_split_triggers_diversification() {
    let positions = vec![
        position("vDOT", 900.0, 9000.0, 25.0),
        position("vBNC", 1000.0, 1000.0, 25.0),
    ];
    let analysis = RiskEngine::default().analyze_risk(&positions).unwrap();
    assert!((analysis.concentration_risk - 0.9).abs() < 1e-12);
    assert!(matches!(
        analysis.recommendations[0].kind,
        HedgeKind::Diversification(_)
    ));
}

#[test]
fn test_configured_thresholds_apply() {
    let cfg = ArenaConfig::from_toml("[risk]\nput_volatility_threshold = 15.0\n").unwrap();
    let engine = RiskEngine::new(cfg.risk);
    let positions = vec![
        position("vASTR", 100.0, 1000.0, 20.0),
        position("vBNC", 100.0, 1000.0, 10.0),
        position("vKSM", 100.0, 1000.0, 10.0),
    ];
    let analysis = engine.analyze_risk(&positions).unwrap();
    assert_eq!(analysis.recommendations.len(), 1);
    assert_eq!(analysis.recommendations[0].id, "put-option-vASTR");
}

#[test]
fn test_analysis_serializes_tagged_recommendations() {
    let positions = vec![position("vDOT", 900.0, 9000.0, 60.0), position("vBNC", 100.0, 1000.0, 5.0)];
    let analysis = RiskEngine::default().analyze_risk(&positions).unwrap();
    let json = serde_json::to_value(&analysis).unwrap();
    let types: Vec<&str> = json["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["put-option", "diversification", "yield-insurance"]);
    assert_eq!(json["recommendations"][0]["severity"], "critical");
}
