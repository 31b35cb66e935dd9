//! Property-based tests for the deterministic generator
//!
//! These tests use proptest to verify:
//! - Determinism: same request → same result (timestamps aside)
//! - Range: scores within 0-100, dispute probability within 0.01-0.99
//! - Agent authority: level and spending limit follow the trust score
//! - Tier monotonicity: a higher score never lands in a riskier tier
//! - VAMP consistency: status, distance and remediation agree

use proptest::prelude::*;
use risk_client::{
    mock, AgentVerificationRequest, AuthorizationLevel, CrossRailRequest,
    DisputePredictionRequest, MerchantLookupRequest, PaymentRail, RiskThresholds, RiskTier,
    TransactionRequest, VampRequest, VampStatus, VelocityRequest,
};
use rust_decimal::Decimal;

/// Strategy for generating amounts (non-negative, two decimal places)
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0u64..10_000_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

/// Strategy for generating payment rails
fn rail_strategy() -> impl Strategy<Value = PaymentRail> {
    prop_oneof![
        Just(PaymentRail::Card),
        Just(PaymentRail::Ach),
        Just(PaymentRail::Wire),
        Just(PaymentRail::Rtp),
        Just(PaymentRail::Crypto),
        Just(PaymentRail::Stablecoin),
    ]
}

/// Strategy for generating merchant categories
fn category_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("gambling".to_string()),
        Just("travel".to_string()),
        Just("digital_goods".to_string()),
        Just("grocery".to_string()),
        "[a-z_]{1,12}",
    ])
}

/// Strategy for generating identifiers, including non-ASCII ones
fn id_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_\\-é漢]{0,24}"
}

/// Strategy for generating valid threshold triples
fn thresholds_strategy() -> impl Strategy<Value = RiskThresholds> {
    (1u32..97, 1u32..97, 1u32..97).prop_filter_map("strictly increasing", |(a, b, c)| {
        let mut cuts = [a, b, c];
        cuts.sort_unstable();
        if cuts[0] < cuts[1] && cuts[1] < cuts[2] {
            RiskThresholds::new(f64::from(cuts[0]), f64::from(cuts[1]), f64::from(cuts[2])).ok()
        } else {
            None
        }
    })
}

/// Strategy for generating agent actions, dangerous ones included
fn action_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("refund_all".to_string()),
        Just("Transfer_Funds".to_string()),
        Just("purchase".to_string()),
        "[a-z_]{1,12}",
    ])
}

fn transaction_strategy() -> impl Strategy<Value = TransactionRequest> {
    (
        amount_strategy(),
        category_strategy(),
        rail_strategy(),
        prop::option::of(id_strategy()),
        prop::option::of(id_strategy()),
    )
        .prop_map(
            |(amount, merchant_category, payment_rail, merchant_id, agent_id)| TransactionRequest {
                amount,
                currency: "USD".to_string(),
                merchant_category,
                payment_rail,
                merchant_id,
                agent_id,
            },
        )
}

/// Riskiest first
fn severity(tier: RiskTier) -> u8 {
    match tier {
        RiskTier::Critical => 3,
        RiskTier::High => 2,
        RiskTier::Medium => 1,
        RiskTier::Low => 0,
    }
}

proptest! {
    /// Transaction scoring is a pure function of the request
    #[test]
    fn prop_transaction_scoring_is_deterministic(request in transaction_strategy()) {
        let thresholds = RiskThresholds::default();
        let first = mock::score_transaction(&request, &thresholds);
        let second = mock::score_transaction(&request, &thresholds);

        prop_assert_eq!(first.risk_score, second.risk_score);
        prop_assert_eq!(first.risk_tier, second.risk_tier);
        prop_assert_eq!(first.recommended_action, second.recommended_action);
        prop_assert_eq!(first.risk_factors, second.risk_factors);
        prop_assert!(first.risk_score.score() <= 100);
    }

    /// Tier follows the thresholds and never inverts with the score
    #[test]
    fn prop_tier_monotonic_in_score(
        thresholds in thresholds_strategy(),
        low in 0u8..=100,
        high in 0u8..=100,
    ) {
        prop_assume!(low <= high);
        let low_tier = thresholds.classify(f64::from(low));
        let high_tier = thresholds.classify(f64::from(high));
        prop_assert!(severity(high_tier) <= severity(low_tier));
    }

    /// Trust falls in 50-94 and authority is consistent with it
    #[test]
    fn prop_agent_verification_is_consistent(
        agent_id in id_strategy(),
        requested_action in action_strategy(),
        transaction_amount in prop::option::of(amount_strategy()),
    ) {
        let request = AgentVerificationRequest {
            agent_id,
            principal_id: None,
            requested_action,
            transaction_amount,
        };
        let thresholds = RiskThresholds::default();
        let result = mock::verify_agent(&request, &thresholds);
        let again = mock::verify_agent(&request, &thresholds);

        let trust = result.trust_score.score();
        prop_assert!((50..=94).contains(&trust));
        prop_assert_eq!(result.trust_score, again.trust_score);
        prop_assert_eq!(&result.anomalies, &again.anomalies);
        prop_assert_eq!(result.verified, trust > 50);

        let (expected_level, expected_limit) = match trust {
            t if t > 85 => (AuthorizationLevel::Full, Decimal::from(10_000)),
            t if t > 70 => (AuthorizationLevel::Standard, Decimal::from(1_000)),
            t if t > 50 => (AuthorizationLevel::Basic, Decimal::from(100)),
            _ => (AuthorizationLevel::None, Decimal::from(100)),
        };
        prop_assert_eq!(result.authorization_level, expected_level);
        prop_assert_eq!(result.spending_limit, expected_limit);
        prop_assert_eq!(
            result.requires_human_approval,
            !result.anomalies.is_empty() || expected_level == AuthorizationLevel::None
        );
    }

    /// Merchant scores fall in 40-94 and are tied to the identifier
    #[test]
    fn prop_merchant_profile_in_range(id in id_strategy()) {
        let request = MerchantLookupRequest {
            merchant_id: Some(id),
            merchant_name: None,
        };
        let thresholds = RiskThresholds::default();
        let profile = mock::lookup_merchant(&request, &thresholds);
        let again = mock::lookup_merchant(&request, &thresholds);

        prop_assert!((40..=94).contains(&profile.risk_score.score()));
        prop_assert_eq!(profile.risk_score, again.risk_score);
        prop_assert!(profile.chargeback_rate >= 0.10);
        prop_assert!(profile.chargeback_rate <= 2.10);
    }

    /// Dispute probability is a valid probability with a consistent tier
    #[test]
    fn prop_dispute_probability_in_range(
        amount in amount_strategy(),
        merchant_category in category_strategy(),
        payment_rail in rail_strategy(),
        is_recurring in any::<bool>(),
    ) {
        let request = DisputePredictionRequest {
            amount,
            merchant_category,
            payment_rail,
            is_recurring,
            merchant_id: None,
        };
        let prediction = mock::predict_dispute(&request);

        prop_assert!(prediction.dispute_probability >= 0.01);
        prop_assert!(prediction.dispute_probability <= 0.99);
        prop_assert_eq!(prediction.risk_tier, mock::dispute_tier(prediction.dispute_probability));
        prop_assert_eq!(
            prediction.predicted_dispute_type.is_none(),
            prediction.preventive_actions.is_empty()
        );
    }

    /// Velocity anomaly agrees with the reported ratio
    #[test]
    fn prop_velocity_flags_follow_ratio(
        entity_id in id_strategy(),
        transaction_count in prop::option::of(0u32..500),
    ) {
        let request = VelocityRequest {
            entity_id,
            time_window: "24h".to_string(),
            transaction_count,
        };
        let result = mock::check_velocity(&request, &RiskThresholds::default());

        prop_assert!(result.baseline_count >= 15 && result.baseline_count < 45);
        if let Some(count) = transaction_count {
            prop_assert_eq!(result.current_count, count);
        }
        let ratio = f64::from(result.current_count) / f64::from(result.baseline_count);
        prop_assert_eq!(result.anomaly_detected, ratio > 2.5);
        prop_assert!(result.velocity_score.score() <= 100);
    }

    /// One score per distinct rail, each within 50-94
    #[test]
    fn prop_cross_rail_scores_each_distinct_rail(
        entity_id in id_strategy(),
        payment_rails in prop::collection::vec(rail_strategy(), 0..8),
    ) {
        let request = CrossRailRequest { entity_id, payment_rails };
        let result = mock::check_cross_rail(&request, &RiskThresholds::default());

        prop_assert_eq!(result.rail_scores.len(), request.distinct_rails().len());
        for rail_score in &result.rail_scores {
            prop_assert!((50..=94).contains(&rail_score.score.score()));
        }
        let ceiling = 94 - 10 * result.patterns_detected.len() as i64;
        prop_assert!(i64::from(result.aggregate_score.score()) <= ceiling.max(0));
    }

    /// Status, distance and remediation agree for any merchant
    #[test]
    fn prop_vamp_analysis_is_consistent(merchant_id in id_strategy()) {
        let analysis = mock::analyze_vamp(&VampRequest { merchant_id });

        prop_assert!((0.0..=100.0).contains(&analysis.compliance_score));
        prop_assert!(analysis.distance_to_threshold >= 0.0);
        match analysis.vamp_status {
            VampStatus::Standard => {
                prop_assert!(analysis.fraud_rate < mock::VAMP_MONITORED_FRAUD_RATE);
                prop_assert!(analysis.remediation_actions.is_empty());
            }
            VampStatus::Monitored => {
                prop_assert!(!analysis.remediation_actions.is_empty());
            }
            VampStatus::Excessive => {
                prop_assert_eq!(analysis.distance_to_threshold, 0.0);
                prop_assert!(analysis.remediation_actions.iter().any(|a| a.urgent));
            }
        }
    }
}
