//! Deterministic fallback generator
//!
//! Every result is derived from the request alone: a character-code checksum
//! of the identifier seeds a baseline, fixed rule checks adjust it, and the
//! outcome is clamped into range. Only the timestamp depends on the clock.
//! Used as the primary source in demo mode and whenever the remote call fails.

use crate::{
    AgentVerification, AgentVerificationRequest, AuthorizationLevel, CrossRailRequest,
    CrossRailResult, DisputePrediction, DisputePredictionRequest, DisputeType,
    MerchantLookupRequest, MerchantProfile, PaymentRail, RailScore, RecommendedAction,
    RemediationAction, ResultSource, RiskScore, RiskThresholds, RiskTier, TransactionRequest,
    TransactionRiskResult, VampAnalysis, VampRequest, VampStatus, VelocityRequest,
    VelocityResult, VerificationStatus,
};
use chrono::Utc;
use rust_decimal::Decimal;

/// Version tag stamped on generated results
pub const MOCK_MODEL_VERSION: &str = "heuristic-v1";

/// Identifier used when the request carries none
pub const UNKNOWN_ID: &str = "unknown";

/// Merchant categories penalised by transaction scoring
pub const HIGH_RISK_CATEGORIES: [&str; 5] = [
    "gambling",
    "adult",
    "crypto_exchange",
    "pharmaceuticals",
    "weapons",
];

/// Merchant categories with elevated dispute rates
pub const DISPUTE_PRONE_CATEGORIES: [&str; 4] =
    ["travel", "digital_goods", "subscription", "gambling"];

/// Agent actions that always raise an anomaly
pub const DANGEROUS_ACTIONS: [&str; 4] =
    ["refund_all", "delete_account", "transfer_funds", "modify_pricing"];

/// Fraud rate (percent) where monitoring starts
pub const VAMP_MONITORED_FRAUD_RATE: f64 = 0.65;

/// Fraud rate (percent) where the merchant is excessive
pub const VAMP_EXCESSIVE_FRAUD_RATE: f64 = 0.90;

const TRANSACTION_BASE_SCORE: i64 = 85;
const VELOCITY_ANOMALY_RATIO: f64 = 2.5;
const RAIL_HOPPING_SPREAD: u8 = 30;
const PATTERN_PENALTY: f64 = 10.0;

/// Sum of the Unicode scalar values of `id`
pub fn checksum(id: &str) -> u64 {
    id.chars().map(u64::from).sum()
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn identifier(value: &str) -> &str {
    non_blank(Some(value)).unwrap_or(UNKNOWN_ID)
}

fn category_in(category: Option<&str>, set: &[&str]) -> bool {
    category
        .map(|c| c.trim().to_ascii_lowercase())
        .map(|c| set.contains(&c.as_str()))
        .unwrap_or(false)
}

// Transaction scoring

/// Score a transaction with the fixed rule table
pub fn score_transaction(
    request: &TransactionRequest,
    thresholds: &RiskThresholds,
) -> TransactionRiskResult {
    let mut score = TRANSACTION_BASE_SCORE;
    let mut risk_factors = Vec::new();

    if request.amount > Decimal::from(10_000) {
        score -= 20;
        risk_factors.push("high_value".to_string());
    } else if request.amount > Decimal::from(5_000) {
        score -= 10;
        risk_factors.push("elevated_value".to_string());
    }

    if request.payment_rail.is_digital_asset() {
        score -= 5;
        risk_factors.push("crypto_rail".to_string());
    }

    if non_blank(request.agent_id.as_deref()).is_some() {
        score -= 3;
        risk_factors.push("agent_initiated".to_string());
    }

    if non_blank(request.merchant_id.as_deref()).is_none() {
        score -= 15;
        risk_factors.push("unknown_merchant".to_string());
    }

    if category_in(request.merchant_category.as_deref(), &HIGH_RISK_CATEGORIES) {
        score -= 15;
        risk_factors.push("high_risk_category".to_string());
    }

    let risk_score = RiskScore::clamped(score);
    let risk_tier = thresholds.classify(risk_score.as_f64());

    TransactionRiskResult {
        risk_score,
        risk_tier,
        recommended_action: RecommendedAction::from(risk_tier),
        risk_factors,
        model_version: MOCK_MODEL_VERSION.to_string(),
        source: ResultSource::Mock,
        assessed_at: Utc::now(),
    }
}

// Merchant lookup

pub(crate) fn verification_for_score(score: RiskScore) -> VerificationStatus {
    match score.score() {
        s if s > 70 => VerificationStatus::Verified,
        s if s > 50 => VerificationStatus::Pending,
        _ => VerificationStatus::Unverified,
    }
}

pub(crate) fn vamp_for_score(score: RiskScore) -> VampStatus {
    match score.score() {
        s if s > 70 => VampStatus::Standard,
        s if s > 50 => VampStatus::Monitored,
        _ => VampStatus::Excessive,
    }
}

/// Chargeback rate in percent: 0.10 + (100 - score) * 0.02
pub(crate) fn chargeback_rate_for_score(score: RiskScore) -> f64 {
    let hundredths = 10 + (100 - u32::from(score.score())) * 2;
    f64::from(hundredths) / 100.0
}

pub(crate) fn merchant_factors(
    verification: VerificationStatus,
    vamp_status: VampStatus,
) -> Vec<String> {
    let mut factors = Vec::new();
    match verification {
        VerificationStatus::Unverified => factors.push("unverified_merchant".to_string()),
        VerificationStatus::Pending => factors.push("pending_verification".to_string()),
        VerificationStatus::Verified => {}
    }
    if vamp_status != VampStatus::Standard {
        factors.push("elevated_chargebacks".to_string());
    }
    factors
}

/// Build a merchant profile from the lookup identifier
pub fn lookup_merchant(
    request: &MerchantLookupRequest,
    thresholds: &RiskThresholds,
) -> MerchantProfile {
    let id = request.identifier().unwrap_or(UNKNOWN_ID);
    let risk_score = RiskScore::new(40 + (checksum(id) % 55) as u8);
    let verification_status = verification_for_score(risk_score);
    let vamp_status = vamp_for_score(risk_score);

    MerchantProfile {
        merchant_id: id.to_string(),
        merchant_name: request.merchant_name.clone(),
        risk_score,
        risk_tier: thresholds.classify(risk_score.as_f64()),
        verification_status,
        chargeback_rate: chargeback_rate_for_score(risk_score),
        vamp_status,
        risk_factors: merchant_factors(verification_status, vamp_status),
        model_version: MOCK_MODEL_VERSION.to_string(),
        source: ResultSource::Mock,
        last_updated: Utc::now(),
    }
}

// Agent verification

/// Authorization level as a step function of trust
pub(crate) fn authorization_for_trust(trust: RiskScore) -> AuthorizationLevel {
    match trust.score() {
        t if t > 85 => AuthorizationLevel::Full,
        t if t > 70 => AuthorizationLevel::Standard,
        t if t > 50 => AuthorizationLevel::Basic,
        _ => AuthorizationLevel::None,
    }
}

/// Spending limit attached to an authorization level
pub(crate) fn spending_limit_for(level: AuthorizationLevel) -> Decimal {
    match level {
        AuthorizationLevel::Full => Decimal::from(10_000),
        AuthorizationLevel::Standard => Decimal::from(1_000),
        AuthorizationLevel::Basic | AuthorizationLevel::None => Decimal::from(100),
    }
}

/// Anomalies raised by the request itself
pub(crate) fn agent_anomalies(request: &AgentVerificationRequest) -> Vec<String> {
    let mut anomalies = Vec::new();

    if request
        .transaction_amount
        .map(|amount| amount > Decimal::from(5_000))
        .unwrap_or(false)
    {
        anomalies.push("high_value_request".to_string());
    }

    if let Some(action) = non_blank(request.requested_action.as_deref()) {
        let action = action.trim().to_ascii_lowercase();
        if DANGEROUS_ACTIONS.contains(&action.as_str()) {
            anomalies.push(format!("sensitive_action:{}", action));
        }
    }

    anomalies
}

/// Verify an agent from its identifier and requested action
pub fn verify_agent(
    request: &AgentVerificationRequest,
    thresholds: &RiskThresholds,
) -> AgentVerification {
    let trust_score = RiskScore::new(50 + (checksum(identifier(&request.agent_id)) % 45) as u8);
    let authorization_level = authorization_for_trust(trust_score);
    let anomalies = agent_anomalies(request);
    let requires_human_approval =
        !anomalies.is_empty() || authorization_level == AuthorizationLevel::None;

    AgentVerification {
        agent_id: identifier(&request.agent_id).to_string(),
        verified: trust_score.score() > 50,
        trust_score,
        risk_tier: thresholds.classify(trust_score.as_f64()),
        authorization_level,
        spending_limit: spending_limit_for(authorization_level),
        anomalies,
        requires_human_approval,
        model_version: MOCK_MODEL_VERSION.to_string(),
        source: ResultSource::Mock,
        verified_at: Utc::now(),
    }
}

// Dispute prediction

/// Tier cut points for dispute probability
pub fn dispute_tier(probability: f64) -> RiskTier {
    if probability > 0.15 {
        RiskTier::Critical
    } else if probability > 0.10 {
        RiskTier::High
    } else if probability > 0.05 {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Representative probability for a tier reported without a number
pub(crate) fn probability_for_tier(tier: RiskTier) -> f64 {
    match tier {
        RiskTier::Critical => 0.20,
        RiskTier::High => 0.12,
        RiskTier::Medium => 0.08,
        RiskTier::Low => 0.02,
    }
}

pub(crate) fn predicted_dispute_type(
    request: &DisputePredictionRequest,
    probability: f64,
) -> Option<DisputeType> {
    if probability <= 0.05 {
        return None;
    }
    if request.is_recurring {
        Some(DisputeType::SubscriptionCanceled)
    } else if category_in(request.merchant_category.as_deref(), &["digital_goods"]) {
        Some(DisputeType::ProductNotAsDescribed)
    } else {
        Some(DisputeType::Fraud)
    }
}

pub(crate) fn preventive_actions(dispute_type: Option<DisputeType>, amount: Decimal) -> Vec<String> {
    let mut actions: Vec<&str> = match dispute_type {
        None => Vec::new(),
        Some(DisputeType::SubscriptionCanceled) => vec![
            "Send a renewal reminder before each billing cycle",
            "Offer self-service cancellation",
        ],
        Some(DisputeType::ProductNotAsDescribed) => vec![
            "Publish detailed product descriptions",
            "Record delivery confirmation for digital goods",
        ],
        Some(DisputeType::ProductNotReceived) => vec!["Provide shipment tracking to the customer"],
        Some(DisputeType::Fraud) => vec![
            "Enable 3-D Secure authentication",
            "Require AVS and CVV match",
        ],
        Some(DisputeType::General) => vec!["Keep transaction records and receipts"],
    };

    if dispute_type.is_some() && amount > Decimal::from(500) {
        actions.push("Retain proof of authorization for high-value orders");
    }

    actions.into_iter().map(str::to_string).collect()
}

/// Predict the probability and type of a dispute
pub fn predict_dispute(request: &DisputePredictionRequest) -> DisputePrediction {
    // Hundredths keep the rule table free of float drift.
    let mut hundredths: i64 = 2;

    if request.amount > Decimal::from(500) {
        hundredths += 3;
    }
    if category_in(request.merchant_category.as_deref(), &DISPUTE_PRONE_CATEGORIES) {
        hundredths += 5;
    }
    if request.payment_rail == PaymentRail::Card && request.is_recurring {
        hundredths += 4;
    }
    if request.payment_rail.is_digital_asset() {
        hundredths -= 1;
    }

    let dispute_probability = hundredths.clamp(1, 99) as f64 / 100.0;
    let predicted_dispute_type = predicted_dispute_type(request, dispute_probability);

    DisputePrediction {
        dispute_probability,
        risk_tier: dispute_tier(dispute_probability),
        predicted_dispute_type,
        preventive_actions: preventive_actions(predicted_dispute_type, request.amount),
        model_version: MOCK_MODEL_VERSION.to_string(),
        source: ResultSource::Mock,
        predicted_at: Utc::now(),
    }
}

// Velocity

/// Compare the observed count against a checksum-derived baseline
pub fn check_velocity(request: &VelocityRequest, thresholds: &RiskThresholds) -> VelocityResult {
    let entity_id = identifier(&request.entity_id);
    let sum = checksum(entity_id);
    let baseline_count = 15 + (sum % 30) as u32;
    let current_count = request
        .transaction_count
        .unwrap_or(5 + (sum % 60) as u32);

    let ratio = f64::from(current_count) / f64::from(baseline_count);
    let anomaly_detected = ratio > VELOCITY_ANOMALY_RATIO;
    let velocity_score = RiskScore::from_f64(100.0 - (ratio - 1.0) * 30.0);

    let mut risk_factors = Vec::new();
    if anomaly_detected {
        risk_factors.push("velocity_spike".to_string());
    }
    if ratio > 1.5 {
        risk_factors.push("elevated_velocity".to_string());
    }

    VelocityResult {
        entity_id: entity_id.to_string(),
        time_window: request.time_window.clone(),
        current_count,
        baseline_count,
        velocity_ratio: round2(ratio),
        anomaly_detected,
        velocity_score,
        risk_tier: thresholds.classify(velocity_score.as_f64()),
        risk_factors,
        model_version: MOCK_MODEL_VERSION.to_string(),
        source: ResultSource::Mock,
        checked_at: Utc::now(),
    }
}

// Cross-rail

/// Score for one rail: 50 + checksum(id + rail) mod 45
pub(crate) fn rail_score(entity_id: &str, rail: PaymentRail) -> RiskScore {
    let sum = checksum(entity_id) + checksum(rail.as_str());
    RiskScore::new(50 + (sum % 45) as u8)
}

pub(crate) fn detect_patterns(rail_scores: &[RailScore]) -> Vec<String> {
    let mut patterns = Vec::new();

    let max = rail_scores.iter().map(|r| r.score.score()).max();
    let min = rail_scores.iter().map(|r| r.score.score()).min();
    if let (Some(max), Some(min)) = (max, min) {
        if max - min > RAIL_HOPPING_SPREAD {
            patterns.push("rail_hopping".to_string());
        }
    }

    let has = |rail: PaymentRail| rail_scores.iter().any(|r| r.rail == rail);
    if has(PaymentRail::Card) && has(PaymentRail::Crypto) {
        patterns.push("card_crypto_mixing".to_string());
    }

    if rail_scores.len() >= 3 {
        patterns.push("multi_rail_usage".to_string());
    }

    patterns
}

/// Average rail score less a fixed penalty per pattern, floored at zero
pub(crate) fn aggregate_rail_score(rail_scores: &[RailScore], pattern_count: usize) -> RiskScore {
    let average = if rail_scores.is_empty() {
        50.0
    } else {
        rail_scores.iter().map(|r| r.score.as_f64()).sum::<f64>() / rail_scores.len() as f64
    };
    RiskScore::from_f64(average - PATTERN_PENALTY * pattern_count as f64)
}

/// Score each rail and flag cross-rail patterns
pub fn check_cross_rail(request: &CrossRailRequest, thresholds: &RiskThresholds) -> CrossRailResult {
    let entity_id = identifier(&request.entity_id);
    let rail_scores: Vec<RailScore> = request
        .distinct_rails()
        .into_iter()
        .map(|rail| RailScore {
            rail,
            score: rail_score(entity_id, rail),
        })
        .collect();

    let patterns_detected = detect_patterns(&rail_scores);
    let aggregate_score = aggregate_rail_score(&rail_scores, patterns_detected.len());
    let risk_tier = thresholds.classify(aggregate_score.as_f64());

    CrossRailResult {
        entity_id: entity_id.to_string(),
        rail_scores,
        patterns_detected,
        aggregate_score,
        risk_tier,
        recommended_action: RecommendedAction::from(risk_tier),
        model_version: MOCK_MODEL_VERSION.to_string(),
        source: ResultSource::Mock,
        analyzed_at: Utc::now(),
    }
}

// VAMP compliance

pub(crate) fn vamp_status_for_fraud_rate(fraud_rate: f64) -> VampStatus {
    if fraud_rate < VAMP_MONITORED_FRAUD_RATE {
        VampStatus::Standard
    } else if fraud_rate < VAMP_EXCESSIVE_FRAUD_RATE {
        VampStatus::Monitored
    } else {
        VampStatus::Excessive
    }
}

/// Gap to the next program limit; zero once excessive
pub(crate) fn distance_to_threshold(fraud_rate: f64) -> f64 {
    let gap = match vamp_status_for_fraud_rate(fraud_rate) {
        VampStatus::Standard => VAMP_MONITORED_FRAUD_RATE - fraud_rate,
        VampStatus::Monitored => VAMP_EXCESSIVE_FRAUD_RATE - fraud_rate,
        VampStatus::Excessive => 0.0,
    };
    round2(gap.max(0.0))
}

/// compliance = 100 - fraud * 20 - dispute * 15, clamped to 0-100
pub(crate) fn compliance_score(fraud_rate: f64, dispute_rate: f64) -> f64 {
    round2((100.0 - fraud_rate * 20.0 - dispute_rate * 15.0).clamp(0.0, 100.0))
}

pub(crate) fn remediation_for(status: VampStatus) -> Vec<RemediationAction> {
    let step = |action: &str, urgent: bool| RemediationAction {
        action: action.to_string(),
        urgent,
    };
    match status {
        VampStatus::Standard => Vec::new(),
        VampStatus::Monitored => vec![
            step("Review fraud screening rules", false),
            step("Enable 3-D Secure for high-risk transactions", false),
        ],
        VampStatus::Excessive => vec![
            step("Submit a remediation plan to the acquirer", true),
            step("Enable 3-D Secure on all card-not-present transactions", false),
            step("Tighten fraud screening rules and velocity limits", false),
            step("Refund disputed orders before they become chargebacks", false),
        ],
    }
}

/// Fraud and dispute rates (percent) derived from the merchant checksum
pub(crate) fn vamp_rates(merchant_id: &str) -> (f64, f64) {
    let sum = checksum(identifier(merchant_id));
    let fraud_hundredths = 10 + (sum % 20) * 5;
    let dispute_hundredths = 20 + (sum % 25) * 4;
    (
        fraud_hundredths as f64 / 100.0,
        dispute_hundredths as f64 / 100.0,
    )
}

/// Analyse a merchant's standing against the monitoring program limits
pub fn analyze_vamp(request: &VampRequest) -> VampAnalysis {
    let (fraud_rate, dispute_rate) = vamp_rates(&request.merchant_id);
    let vamp_status = vamp_status_for_fraud_rate(fraud_rate);

    VampAnalysis {
        merchant_id: identifier(&request.merchant_id).to_string(),
        fraud_rate,
        dispute_rate,
        compliance_score: compliance_score(fraud_rate, dispute_rate),
        vamp_status,
        distance_to_threshold: distance_to_threshold(fraud_rate),
        remediation_actions: remediation_for(vamp_status),
        model_version: MOCK_MODEL_VERSION.to_string(),
        source: ResultSource::Mock,
        analyzed_at: Utc::now(),
    }
}
