//! Hedge recommendation rules.
//!
//! Three fixed rules, evaluated in order:
//! - diversification when one position dominates the portfolio
//! - a put option for every high-volatility position
//! - yield insurance for every position above the exposure threshold
//!
//! The result is stably sorted most urgent first.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::RiskConfig;
use crate::types::{
    AllocationTarget, DiversificationDetails, HedgeKind, HedgeRecommendation, Position,
    PutOptionDetails, Severity, YieldInsuranceDetails,
};

/// Target share for the dominant asset after rebalancing.
const DOMINANT_TARGET_RATIO: f64 = 0.5;

/// Fixed assets the dominant position is rebalanced into.
const DIVERSIFICATION_TEMPLATE: [(&str, f64); 2] = [("vGLMR", 0.3), ("stablecoin", 0.2)];

/// Build the recommendation list for an already-scored portfolio.
///
/// `total_exposure` must be positive.
pub fn generate_recommendations(
    config: &RiskConfig,
    positions: &[Position],
    total_exposure: f64,
    concentration_risk: f64,
    now: DateTime<Utc>,
) -> Vec<HedgeRecommendation> {
    let mut recommendations = Vec::new();

    if concentration_risk > config.concentration_threshold {
        if let Some(rec) = diversification(positions, total_exposure, concentration_risk) {
            recommendations.push(rec);
        }
    }

    for p in positions {
        if p.volatility > config.put_volatility_threshold {
            if p.amount > 0.0 {
                recommendations.push(put_option(config, p, now));
            } else {
                debug!(asset = %p.asset, "Skipping put option: zero amount has no unit price");
            }
        }
    }

    for p in positions {
        if p.value_usd > config.yield_exposure_threshold * total_exposure {
            recommendations.push(yield_insurance(config, p));
        }
    }

    // Vec::sort_by_key is stable, so equal severities keep generation order.
    recommendations.sort_by_key(|r| r.severity.rank());
    recommendations
}

fn diversification(
    positions: &[Position],
    total_exposure: f64,
    concentration_risk: f64,
) -> Option<HedgeRecommendation> {
    let dominant = positions
        .iter()
        .max_by(|a, b| a.value_usd.total_cmp(&b.value_usd))?;

    let held_ratio = |asset: &str| -> f64 {
        positions
            .iter()
            .filter(|p| p.asset == asset)
            .map(|p| p.value_usd)
            .sum::<f64>()
            / total_exposure
    };

    let mut suggested_allocations = vec![AllocationTarget {
        asset: dominant.asset.clone(),
        current_ratio: concentration_risk,
        target_ratio: DOMINANT_TARGET_RATIO,
    }];
    for (asset, target_ratio) in DIVERSIFICATION_TEMPLATE {
        suggested_allocations.push(AllocationTarget {
            asset: asset.to_string(),
            current_ratio: held_ratio(asset),
            target_ratio,
        });
    }

    let rebalance_value = total_exposure * (concentration_risk - DOMINANT_TARGET_RATIO).max(0.0);

    debug!(
        asset = %dominant.asset,
        concentration = format!("{:.1}%", concentration_risk * 100.0),
        rebalance = rebalance_value,
        "Diversification suggested"
    );

    Some(HedgeRecommendation {
        id: format!("diversification-{}", dominant.asset),
        severity: Severity::High,
        description: format!(
            "{:.0}% of the portfolio sits in {}. Rebalance towards a 50/30/20 split to cut concentration risk.",
            concentration_risk * 100.0,
            dominant.asset,
        ),
        estimated_cost: 0.0,
        protection_amount: rebalance_value,
        kind: HedgeKind::Diversification(DiversificationDetails {
            suggested_allocations,
        }),
    })
}

fn put_option(config: &RiskConfig, p: &Position, now: DateTime<Utc>) -> HedgeRecommendation {
    let strike_price = p.unit_price() * config.strike_discount;
    let premium = p.value_usd * config.put_premium_rate;
    let severity = if p.volatility > config.critical_volatility_threshold {
        Severity::Critical
    } else {
        Severity::Medium
    };

    debug!(
        asset = %p.asset,
        volatility = p.volatility,
        strike_price,
        premium,
        severity = %severity,
        "Put option suggested"
    );

    HedgeRecommendation {
        id: format!("put-option-{}", p.asset),
        severity,
        description: format!(
            "{} volatility is {:.0}%. A put option at ${:.4} limits downside on ${:.2}.",
            p.asset, p.volatility, strike_price, p.value_usd,
        ),
        estimated_cost: premium,
        protection_amount: p.value_usd,
        kind: HedgeKind::PutOption(PutOptionDetails {
            asset: p.asset.clone(),
            strike_price,
            premium,
            expiry_date: now + Duration::days(config.put_expiry_days),
            coverage: p.value_usd,
        }),
    }
}

fn yield_insurance(config: &RiskConfig, p: &Position) -> HedgeRecommendation {
    let estimated_cost = p.value_usd * config.insurance_premium_rate;
    let protection_amount = p.value_usd * config.insurance_protection_ratio;

    debug!(
        asset = %p.asset,
        value_usd = p.value_usd,
        estimated_cost,
        "Yield insurance suggested"
    );

    HedgeRecommendation {
        id: format!("yield-insurance-{}", p.asset),
        severity: Severity::Medium,
        description: format!(
            "{} holds a large share of the portfolio. Lock in a {:.0}% APY floor.",
            p.asset, config.guaranteed_apy,
        ),
        estimated_cost,
        protection_amount,
        kind: HedgeKind::YieldInsurance(YieldInsuranceDetails {
            guaranteed_apy: config.guaranteed_apy,
            premium_rate: config.insurance_premium_rate * 100.0,
            coverage_amount: p.value_usd,
            duration: config.insurance_duration_days,
        }),
    }
}

/// Net result of exercising a put at `current_price`.
///
/// Zero while the price is at or above the strike. Below it, the covered
/// loss fraction times coverage, less the premium paid, which can be negative.
pub fn calculate_put_payout(put: &PutOptionDetails, current_price: f64) -> f64 {
    if current_price >= put.strike_price {
        return 0.0;
    }
    let drop = (put.strike_price - current_price) / put.strike_price;
    drop * put.coverage - put.premium
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskLevel;

    fn pos(asset: &str, amount: f64, value_usd: f64, volatility: f64) -> Position {
        Position {
            asset: asset.to_string(),
            amount,
            value_usd,
            risk_level: RiskLevel::High,
            volatility,
        }
    }

    fn put(strike_price: f64, premium: f64, coverage: f64) -> PutOptionDetails {
        PutOptionDetails {
            asset: "vDOT".into(),
            strike_price,
            premium,
            expiry_date: Utc::now(),
            coverage,
        }
    }

    fn generate(positions: &[Position]) -> Vec<HedgeRecommendation> {
        let total: f64 = positions.iter().map(|p| p.value_usd).sum();
        let largest = positions.iter().map(|p| p.value_usd).fold(0.0, f64::max);
        generate_recommendations(&RiskConfig::default(), positions, total, largest / total, Utc::now())
    }

    // -- put payout --

    #[test]
    fn test_put_payout_above_strike() {
        assert_eq!(calculate_put_payout(&put(10.0, 100.0, 6000.0), 11.0), 0.0);
        assert_eq!(calculate_put_payout(&put(10.0, 100.0, 6000.0), 10.0), 0.0);
    }

    #[test]
    fn test_put_payout_below_strike() {
        let p = put(10.0, 100.0, 6000.0);
        assert!((calculate_put_payout(&p, 9.0) - 500.0).abs() < 1e-9);
        assert!((calculate_put_payout(&p, 5.0) - 2900.0).abs() < 1e-9);
    }

    #[test]
    fn test_put_payout_net_loss_near_strike() {
        let payout = calculate_put_payout(&put(10.0, 100.0, 6000.0), 9.9);
        assert!((payout + 40.0).abs() < 1e-6);
    }

    // -- put option rule --

    #[test]
    fn test_put_option_pricing() {
        let now = Utc::now();
        let p = pos("vKSM", 100.0, 3000.0, 40.0);
        let rec = put_option(&RiskConfig::default(), &p, now);

        assert_eq!(rec.severity, Severity::Medium);
        assert!((rec.estimated_cost - 60.0).abs() < 1e-9);
        match rec.kind {
            HedgeKind::PutOption(d) => {
                assert!((d.strike_price - 27.0).abs() < 1e-9);
                assert!((d.premium - 60.0).abs() < 1e-9);
                assert_eq!(d.coverage, 3000.0);
                assert_eq!(d.expiry_date, now + Duration::days(30));
            }
            other => panic!("expected put option, got {}", other.tag()),
        }
    }

    #[test]
    fn test_put_option_critical_above_50() {
        let recs = generate(&[pos("vKSM", 100.0, 1000.0, 51.0), pos("vDOT", 100.0, 1000.0, 50.0)]);
        let puts: Vec<_> = recs
            .iter()
            .filter(|r| matches!(r.kind, HedgeKind::PutOption(_)))
            .collect();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].id, "put-option-vKSM");
        assert_eq!(puts[0].severity, Severity::Critical);
        assert_eq!(puts[1].severity, Severity::Medium);
    }

    #[test]
    fn test_no_put_at_threshold() {
        let recs = generate(&[
            pos("vGLMR", 100.0, 1000.0, 30.0),
            pos("vASTR", 100.0, 1000.0, 10.0),
            pos("vBNC", 100.0, 1000.0, 10.0),
        ]);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_zero_amount_skips_put() {
        let recs = generate(&[
            pos("vKSM", 0.0, 1000.0, 80.0),
            pos("vASTR", 100.0, 1000.0, 10.0),
            pos("vBNC", 100.0, 1000.0, 10.0),
        ]);
        assert!(recs.iter().all(|r| !matches!(r.kind, HedgeKind::PutOption(_))));
    }

    // -- yield insurance rule --

    #[test]
    fn test_yield_insurance_terms() {
        let rec = yield_insurance(&RiskConfig::default(), &pos("vDOT", 600.0, 6000.0, 10.0));
        assert_eq!(rec.severity, Severity::Medium);
        assert!((rec.estimated_cost - 30.0).abs() < 1e-9);
        assert!((rec.protection_amount - 600.0).abs() < 1e-9);
        match rec.kind {
            HedgeKind::YieldInsurance(d) => {
                assert_eq!(d.guaranteed_apy, 10.0);
                assert!((d.premium_rate - 0.5).abs() < 1e-12);
                assert_eq!(d.coverage_amount, 6000.0);
                assert_eq!(d.duration, 365);
            }
            other => panic!("expected yield insurance, got {}", other.tag()),
        }
    }

    #[test]
    fn test_yield_insurance_threshold_is_exclusive() {
        // 400 of 1000 is exactly 40%
        let recs = generate(&[pos("vDOT", 40.0, 400.0, 10.0), pos("vASTR", 60.0, 600.0, 10.0)]);
        let insured: Vec<_> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(insured, vec!["yield-insurance-vASTR"]);
    }

    // -- diversification rule --

    #[test]
    fn test_diversification_fixed_template() {
        let recs = generate(&[pos("vDOT", 900.0, 9000.0, 10.0), pos("vGLMR", 100.0, 1000.0, 10.0)]);
        let rec = recs
            .iter()
            .find(|r| matches!(r.kind, HedgeKind::Diversification(_)))
            .expect("diversification");
        assert_eq!(rec.severity, Severity::High);
        assert!((rec.protection_amount - 4000.0).abs() < 1e-9);

        let HedgeKind::Diversification(d) = &rec.kind else {
            unreachable!()
        };
        let targets: Vec<(&str, f64)> = d
            .suggested_allocations
            .iter()
            .map(|a| (a.asset.as_str(), a.target_ratio))
            .collect();
        assert_eq!(targets, vec![("vDOT", 0.5), ("vGLMR", 0.3), ("stablecoin", 0.2)]);
        assert!((d.suggested_allocations[0].current_ratio - 0.9).abs() < 1e-12);
        assert!((d.suggested_allocations[1].current_ratio - 0.1).abs() < 1e-12);
        assert_eq!(d.suggested_allocations[2].current_ratio, 0.0);
    }

    #[test]
    fn test_generation_order_within_severity() {
        // Both medium: the put is generated before the insurance.
        let recs = generate(&[
            pos("vDOT", 600.0, 6000.0, 45.0),
            pos("vGLMR", 200.0, 2000.0, 30.0),
            pos("vASTR", 100.0, 1000.0, 20.0),
        ]);
        let ids: Vec<_> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["put-option-vDOT", "yield-insurance-vDOT"]);
    }

    #[test]
    fn test_high_sorts_before_medium() {
        let recs = generate(&[pos("vDOT", 900.0, 9000.0, 40.0), pos("vASTR", 100.0, 1000.0, 10.0)]);
        let severities: Vec<Severity> = recs.iter().map(|r| r.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::High, Severity::Medium, Severity::Medium]
        );
        assert!(matches!(recs[0].kind, HedgeKind::Diversification(_)));
    }
}
