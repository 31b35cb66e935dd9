//! Remote response normalization
//!
//! The risk-intelligence service answers with loosely typed payloads whose
//! field names differ between endpoints (native scoring fields on the
//! assessment paths, generic simulation/decision fields elsewhere). Each
//! operation has its own mapping function; every remote field is optional
//! and falls back to a local default.

use crate::mock;
use crate::{
    AgentVerification, AgentVerificationRequest, AuthorizationLevel, CrossRailRequest,
    CrossRailResult, DisputePrediction, DisputePredictionRequest, DisputeType,
    MerchantLookupRequest, MerchantProfile, PaymentRail, RailScore, RecommendedAction,
    RemediationAction, ResultSource, RiskScore, RiskThresholds, RiskTier, TransactionRiskResult,
    VampAnalysis, VampRequest, VampStatus, VerificationStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

/// Explanatory lists are cut to this many entries
pub const MAX_LIST_ITEMS: usize = 5;

/// Version tag used when the remote payload has none
pub const DEFAULT_REMOTE_MODEL_VERSION: &str = "remote-unversioned";

const SCORE_KEYS: &[&str] = &["risk_score", "score", "trust_score"];
const SEVERITY_KEYS: &[&str] = &["risk_level", "severity", "verdict", "decision"];
const ITEM_TEXT_KEYS: &[&str] = &["code", "name", "factor", "action", "description"];

/// Read-only view over an untyped remote payload
///
/// Fields are looked up by alias at the top level, then inside a `data` or
/// `result` envelope. Nulls count as absent.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    value: &'a Value,
}

impl<'a> Payload<'a> {
    /// Wrap a payload
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// First non-null field matching any alias
    pub fn value(&self, keys: &[&str]) -> Option<&'a Value> {
        let scopes = [
            Some(self.value),
            self.value.get("data"),
            self.value.get("result"),
        ];
        scopes
            .into_iter()
            .flatten()
            .filter(|scope| scope.is_object())
            .find_map(|scope| {
                keys.iter()
                    .find_map(|key| scope.get(*key).filter(|v| !v.is_null()))
            })
    }

    /// Numeric field; numeric strings are accepted
    pub fn f64(&self, keys: &[&str]) -> Option<f64> {
        self.value(keys).and_then(number).filter(|n| n.is_finite())
    }

    /// String field
    pub fn str(&self, keys: &[&str]) -> Option<&'a str> {
        self.value(keys)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Boolean field
    pub fn bool(&self, keys: &[&str]) -> Option<bool> {
        self.value(keys).and_then(Value::as_bool)
    }

    /// List of labels, capped at [`MAX_LIST_ITEMS`]
    ///
    /// Items may be plain strings or objects carrying a text field.
    pub fn strings(&self, keys: &[&str]) -> Vec<String> {
        let Some(Value::Array(items)) = self.value(keys) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(item_text)
            .take(MAX_LIST_ITEMS)
            .collect()
    }

    /// Model tag, or the local default
    pub fn model_version(&self) -> String {
        self.str(&["model_version", "version", "model"])
            .unwrap_or(DEFAULT_REMOTE_MODEL_VERSION)
            .to_string()
    }

    /// RFC 3339 timestamp, or now
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.str(&["timestamp", "assessed_at", "created_at", "updated_at"])
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_else(Utc::now)
    }

    /// Score and tier, from a number when present, else from a severity label
    fn scored(&self, keys: &[&str], thresholds: &RiskThresholds) -> Option<(RiskScore, RiskTier)> {
        if let Some(raw) = self.f64(keys) {
            let score = RiskScore::from_f64(raw);
            return Some((score, thresholds.classify(score.as_f64())));
        }
        self.str(SEVERITY_KEYS).map(|label| {
            let tier = tier_from_label(label);
            (RiskScore::from_f64(thresholds.score_for_tier(tier)), tier)
        })
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn item_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => ITEM_TEXT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

fn label_key(label: &str) -> String {
    label
        .trim()
        .to_ascii_lowercase()
        .replace(|c: char| c == ' ' || c == '-', "_")
}

// Vocabulary tables

/// Map a remote severity/verdict/decision label onto a tier
///
/// Unrecognised labels map to `medium`, the neutral middle of the scale.
pub fn tier_from_label(label: &str) -> RiskTier {
    match label_key(label).as_str() {
        "critical" | "severe" | "block" | "blocked" | "deny" | "denied" | "decline"
        | "declined" | "reject" | "rejected" => RiskTier::Critical,
        "high" | "elevated" | "review_required" | "escalate" => RiskTier::High,
        "medium" | "moderate" | "review" | "warn" | "warning" => RiskTier::Medium,
        "low" | "minimal" | "none" | "allow" | "allowed" | "approve" | "approved" | "pass"
        | "passed" => RiskTier::Low,
        _ => RiskTier::Medium,
    }
}

/// Map a remote verification label; unrecognised labels map to `pending`
pub fn verification_from_label(label: &str) -> VerificationStatus {
    match label_key(label).as_str() {
        "verified" | "approved" | "active" | "passed" => VerificationStatus::Verified,
        "pending" | "in_review" | "processing" => VerificationStatus::Pending,
        "unverified" | "failed" | "rejected" | "suspended" => VerificationStatus::Unverified,
        _ => VerificationStatus::Pending,
    }
}

/// Map a remote program-status label; unrecognised labels map to `monitored`
pub fn vamp_from_label(label: &str) -> VampStatus {
    match label_key(label).as_str() {
        "standard" | "compliant" | "ok" | "good_standing" => VampStatus::Standard,
        "monitored" | "early_warning" | "warning" => VampStatus::Monitored,
        "excessive" | "breach" | "non_compliant" => VampStatus::Excessive,
        _ => VampStatus::Monitored,
    }
}

/// Map a remote authorization label
///
/// `elevated` folds into `standard`. Unrecognised labels yield `None` so the
/// caller can fall back to the trust-score step function.
pub fn authorization_from_label(label: &str) -> Option<AuthorizationLevel> {
    match label_key(label).as_str() {
        "full" | "unrestricted" => Some(AuthorizationLevel::Full),
        "standard" | "elevated" => Some(AuthorizationLevel::Standard),
        "basic" | "limited" | "restricted" => Some(AuthorizationLevel::Basic),
        "none" | "blocked" | "denied" => Some(AuthorizationLevel::None),
        _ => None,
    }
}

/// Map a remote dispute reason; unrecognised reasons map to `general`
pub fn dispute_type_from_label(label: &str) -> DisputeType {
    match label_key(label).as_str() {
        "fraud" | "fraudulent" => DisputeType::Fraud,
        "subscription_canceled" | "subscription_cancelled" | "recurring" => {
            DisputeType::SubscriptionCanceled
        }
        "product_not_as_described" | "not_as_described" => DisputeType::ProductNotAsDescribed,
        "product_not_received" | "not_received" => DisputeType::ProductNotReceived,
        _ => DisputeType::General,
    }
}

// Per-operation mappings

/// Normalize an assessment response
pub fn transaction(payload: &Value, thresholds: &RiskThresholds) -> TransactionRiskResult {
    let p = Payload::new(payload);
    let (risk_score, risk_tier) = p.scored(SCORE_KEYS, thresholds).unwrap_or_else(|| {
        (
            RiskScore::from_f64(thresholds.score_for_tier(RiskTier::Medium)),
            RiskTier::Medium,
        )
    });

    TransactionRiskResult {
        risk_score,
        risk_tier,
        recommended_action: RecommendedAction::from(risk_tier),
        risk_factors: p.strings(&["risk_factors", "factors", "reasons", "signals"]),
        model_version: p.model_version(),
        source: ResultSource::Remote,
        assessed_at: p.timestamp(),
    }
}

/// Normalize a merchant lookup response
pub fn merchant(
    payload: &Value,
    request: &MerchantLookupRequest,
    thresholds: &RiskThresholds,
) -> MerchantProfile {
    let p = Payload::new(payload);
    let (risk_score, risk_tier) = p.scored(SCORE_KEYS, thresholds).unwrap_or_else(|| {
        let score = RiskScore::from_f64(thresholds.score_for_tier(RiskTier::Medium));
        (score, RiskTier::Medium)
    });

    let verification_status = p
        .str(&["verification_status", "kyb_status"])
        .map(verification_from_label)
        .unwrap_or_else(|| mock::verification_for_score(risk_score));
    let vamp_status = p
        .str(&["vamp_status", "monitoring_status", "program_status"])
        .map(vamp_from_label)
        .unwrap_or_else(|| mock::vamp_for_score(risk_score));
    let chargeback_rate = p
        .f64(&["chargeback_rate", "chargeback_ratio"])
        .map(|rate| mock::round2(rate.clamp(0.0, 100.0)))
        .unwrap_or_else(|| mock::chargeback_rate_for_score(risk_score));

    let mut risk_factors = p.strings(&["risk_factors", "flags", "reasons"]);
    if risk_factors.is_empty() {
        risk_factors = mock::merchant_factors(verification_status, vamp_status);
    }

    MerchantProfile {
        merchant_id: p
            .str(&["merchant_id"])
            .or(request.identifier())
            .unwrap_or(mock::UNKNOWN_ID)
            .to_string(),
        merchant_name: p
            .str(&["merchant_name", "name", "legal_name"])
            .map(str::to_string)
            .or_else(|| request.merchant_name.clone()),
        risk_score,
        risk_tier,
        verification_status,
        chargeback_rate,
        vamp_status,
        risk_factors,
        model_version: p.model_version(),
        source: ResultSource::Remote,
        last_updated: p.timestamp(),
    }
}

/// Normalize an agent screening response
///
/// Request-derived anomalies are merged into the remote list so a permissive
/// remote verdict cannot hide a dangerous action.
pub fn agent(
    payload: &Value,
    request: &AgentVerificationRequest,
    thresholds: &RiskThresholds,
) -> AgentVerification {
    let p = Payload::new(payload);
    let (trust_score, risk_tier) = p
        .scored(&["trust_score", "score", "risk_score"], thresholds)
        .unwrap_or_else(|| {
            let score = RiskScore::from_f64(thresholds.score_for_tier(RiskTier::Medium));
            (score, RiskTier::Medium)
        });

    let authorization_level = p
        .str(&["authorization_level", "authorization", "auth_level"])
        .and_then(authorization_from_label)
        .unwrap_or_else(|| mock::authorization_for_trust(trust_score));

    let spending_limit = p
        .f64(&["spending_limit", "limit"])
        .and_then(|limit| Decimal::try_from(limit.max(0.0)).ok())
        .map(|limit| limit.round_dp(2))
        .unwrap_or_else(|| mock::spending_limit_for(authorization_level));

    let mut anomalies = p.strings(&["anomalies", "flags", "alerts"]);
    for anomaly in mock::agent_anomalies(request) {
        if !anomalies.contains(&anomaly) {
            anomalies.push(anomaly);
        }
    }
    anomalies.truncate(MAX_LIST_ITEMS);

    let requires_human_approval = p
        .bool(&["requires_human_approval", "human_in_the_loop"])
        .unwrap_or(false)
        || !anomalies.is_empty()
        || authorization_level == AuthorizationLevel::None;

    AgentVerification {
        agent_id: p
            .str(&["agent_id"])
            .unwrap_or(request.agent_id.as_str())
            .to_string(),
        verified: p
            .bool(&["verified", "is_verified"])
            .unwrap_or(trust_score.score() > 50),
        trust_score,
        risk_tier,
        authorization_level,
        spending_limit,
        anomalies,
        requires_human_approval,
        model_version: p.model_version(),
        source: ResultSource::Remote,
        verified_at: p.timestamp(),
    }
}

/// Normalize a dispute simulation response
pub fn dispute(payload: &Value, request: &DisputePredictionRequest) -> DisputePrediction {
    let p = Payload::new(payload);
    let probability = p.f64(&[
        "dispute_probability",
        "probability",
        "outcome_probability",
        "likelihood",
    ]);

    let (dispute_probability, risk_tier) = match probability {
        Some(raw) => {
            let clamped = (raw.clamp(0.01, 0.99) * 10_000.0).round() / 10_000.0;
            (clamped, mock::dispute_tier(clamped))
        }
        None => {
            let tier = p
                .str(&["severity", "risk_level", "outcome"])
                .map(tier_from_label)
                .unwrap_or(RiskTier::Medium);
            (mock::probability_for_tier(tier), tier)
        }
    };

    let predicted_dispute_type = if dispute_probability > 0.05 {
        p.str(&["predicted_dispute_type", "dispute_type", "predicted_outcome", "reason"])
            .map(dispute_type_from_label)
            .or_else(|| mock::predicted_dispute_type(request, dispute_probability))
    } else {
        None
    };

    let mut preventive_actions =
        p.strings(&["preventive_actions", "recommendations", "recommended_actions"]);
    if preventive_actions.is_empty() {
        preventive_actions = mock::preventive_actions(predicted_dispute_type, request.amount);
        preventive_actions.truncate(MAX_LIST_ITEMS);
    }

    DisputePrediction {
        dispute_probability,
        risk_tier,
        predicted_dispute_type,
        preventive_actions,
        model_version: p.model_version(),
        source: ResultSource::Remote,
        predicted_at: p.timestamp(),
    }
}

fn remote_rail_score(p: &Payload<'_>, rail: PaymentRail) -> Option<RiskScore> {
    let matches_rail = |item: &&Value| {
        item.get("rail")
            .and_then(Value::as_str)
            .map(|name| name.eq_ignore_ascii_case(rail.as_str()))
            .unwrap_or(false)
    };
    let raw = match p.value(&["rail_scores", "per_rail_scores", "rails"])? {
        Value::Object(map) => map.get(rail.as_str()).and_then(number),
        Value::Array(items) => items
            .iter()
            .find(matches_rail)
            .and_then(|item| item.get("score"))
            .and_then(number),
        _ => None,
    }?;
    Some(RiskScore::from_f64(raw))
}

/// Normalize a unified decision response for cross-rail analysis
///
/// Rails the remote omits are scored locally so the result always covers
/// exactly the requested rails.
pub fn cross_rail(
    payload: &Value,
    request: &CrossRailRequest,
    thresholds: &RiskThresholds,
) -> CrossRailResult {
    let p = Payload::new(payload);
    let entity_id = if request.entity_id.trim().is_empty() {
        mock::UNKNOWN_ID
    } else {
        request.entity_id.as_str()
    };

    let rail_scores: Vec<RailScore> = request
        .distinct_rails()
        .into_iter()
        .map(|rail| RailScore {
            rail,
            score: remote_rail_score(&p, rail)
                .unwrap_or_else(|| mock::rail_score(entity_id, rail)),
        })
        .collect();

    let mut patterns_detected = p.strings(&["patterns_detected", "patterns", "signals"]);
    if patterns_detected.is_empty() {
        patterns_detected = mock::detect_patterns(&rail_scores);
    }

    let (aggregate_score, risk_tier) = p
        .scored(&["aggregate_score", "risk_score", "score"], thresholds)
        .unwrap_or_else(|| {
            let score = mock::aggregate_rail_score(&rail_scores, patterns_detected.len());
            (score, thresholds.classify(score.as_f64()))
        });

    CrossRailResult {
        entity_id: entity_id.to_string(),
        rail_scores,
        patterns_detected,
        aggregate_score,
        risk_tier,
        recommended_action: RecommendedAction::from(risk_tier),
        model_version: p.model_version(),
        source: ResultSource::Remote,
        analyzed_at: p.timestamp(),
    }
}

fn remediation_item(item: &Value) -> Option<RemediationAction> {
    match item {
        Value::String(action) if !action.trim().is_empty() => Some(RemediationAction {
            action: action.trim().to_string(),
            urgent: false,
        }),
        Value::Object(map) => {
            let action = ["action", "description", "title"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))?;
            let urgent = map.get("urgent").and_then(Value::as_bool).unwrap_or_else(|| {
                map.get("priority")
                    .and_then(Value::as_str)
                    .map(|priority| matches!(label_key(priority).as_str(), "urgent" | "critical"))
                    .unwrap_or(false)
            });
            Some(RemediationAction {
                action: action.to_string(),
                urgent,
            })
        }
        _ => None,
    }
}

/// Normalize a compliance simulation response
pub fn vamp(payload: &Value, request: &VampRequest) -> VampAnalysis {
    let p = Payload::new(payload);
    let (local_fraud, local_dispute) = mock::vamp_rates(&request.merchant_id);

    let fraud_rate = p
        .f64(&["fraud_rate", "fraud_ratio"])
        .map(|rate| mock::round2(rate.max(0.0)))
        .unwrap_or(local_fraud);
    let dispute_rate = p
        .f64(&["dispute_rate", "dispute_ratio", "chargeback_rate"])
        .map(|rate| mock::round2(rate.max(0.0)))
        .unwrap_or(local_dispute);

    // Without a program label, status follows the fraud rate
    let vamp_status = p
        .str(&["vamp_status", "program_status"])
        .map(vamp_from_label)
        .unwrap_or_else(|| mock::vamp_status_for_fraud_rate(fraud_rate));

    let compliance_score = p
        .f64(&["compliance_score", "score"])
        .map(|score| mock::round2(score.clamp(0.0, 100.0)))
        .unwrap_or_else(|| mock::compliance_score(fraud_rate, dispute_rate));

    let distance_to_threshold = p
        .f64(&["distance_to_threshold"])
        .map(|gap| mock::round2(gap.max(0.0)))
        .unwrap_or_else(|| mock::distance_to_threshold(fraud_rate));

    let mut remediation_actions: Vec<RemediationAction> = match p
        .value(&["remediation_actions", "remediation", "recommendations"])
    {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(remediation_item)
            .take(MAX_LIST_ITEMS)
            .collect(),
        _ => Vec::new(),
    };
    if remediation_actions.is_empty() {
        remediation_actions = mock::remediation_for(vamp_status);
    }

    VampAnalysis {
        merchant_id: p
            .str(&["merchant_id"])
            .unwrap_or(request.merchant_id.as_str())
            .to_string(),
        fraud_rate,
        dispute_rate,
        compliance_score,
        vamp_status,
        distance_to_threshold,
        remediation_actions,
        model_version: p.model_version(),
        source: ResultSource::Remote,
        analyzed_at: p.timestamp(),
    }
}
