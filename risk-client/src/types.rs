//! Core types for the risk client
//!
//! Requests arrive already validated from the tool layer. Results are fresh
//! value records, fully populated on every path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk score (0-100). Higher is safer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Create new risk score (0-100)
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Clamp a signed heuristic total into range
    pub fn clamped(score: i64) -> Self {
        Self(score.clamp(0, 100) as u8)
    }

    /// Round and clamp a loosely typed remote value
    pub fn from_f64(score: f64) -> Self {
        if score.is_nan() {
            return Self(0);
        }
        Self(score.round().clamp(0.0, 100.0) as u8)
    }

    /// Get raw score
    pub fn score(&self) -> u8 {
        self.0
    }

    /// Score as float for threshold comparison
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }
}

/// Risk tier, ordered from most to least risky
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Score at or below the auto-decline threshold
    Critical,
    /// Score at or below the high-risk threshold
    High,
    /// Score at or below the medium-risk threshold
    Medium,
    /// Above all thresholds
    Low,
}

impl RiskTier {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Critical => "critical",
            RiskTier::High => "high",
            RiskTier::Medium => "medium",
            RiskTier::Low => "low",
        }
    }
}

/// Recommended action for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedAction {
    /// Let it through
    Approve,
    /// Hold for manual review
    Review,
    /// Reject
    Decline,
}

impl From<RiskTier> for RecommendedAction {
    fn from(tier: RiskTier) -> Self {
        match tier {
            RiskTier::Critical => RecommendedAction::Decline,
            RiskTier::High => RecommendedAction::Review,
            RiskTier::Medium | RiskTier::Low => RecommendedAction::Approve,
        }
    }
}

/// Payment rail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRail {
    /// Card networks
    #[default]
    Card,
    /// ACH batch transfers
    Ach,
    /// Wire transfers
    Wire,
    /// Real-time payments
    Rtp,
    /// Native crypto assets
    Crypto,
    /// Fiat-backed stablecoins
    Stablecoin,
}

impl PaymentRail {
    /// Lowercase label, also used as checksum salt
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentRail::Card => "card",
            PaymentRail::Ach => "ach",
            PaymentRail::Wire => "wire",
            PaymentRail::Rtp => "rtp",
            PaymentRail::Crypto => "crypto",
            PaymentRail::Stablecoin => "stablecoin",
        }
    }

    /// Crypto or stablecoin
    pub fn is_digital_asset(&self) -> bool {
        matches!(self, PaymentRail::Crypto | PaymentRail::Stablecoin)
    }
}

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Remote risk-intelligence service
    Remote,
    /// Deterministic local generator
    Mock,
}

/// Merchant verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// KYB complete
    Verified,
    /// KYB in progress
    Pending,
    /// Not verified
    Unverified,
}

/// Standing under the acquirer monitoring program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VampStatus {
    /// Below the early-warning limit
    Standard,
    /// Between the early-warning and excessive limits
    Monitored,
    /// At or above the excessive limit
    Excessive,
}

/// Agent authorization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationLevel {
    /// Unrestricted within the spending limit
    Full,
    /// Everyday operations
    Standard,
    /// Low-value operations only
    Basic,
    /// No autonomous authority
    None,
}

/// Predicted dispute reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    /// Cardholder claims fraud
    Fraud,
    /// Recurring charge after cancellation
    SubscriptionCanceled,
    /// Goods differ from description
    ProductNotAsDescribed,
    /// Goods never arrived
    ProductNotReceived,
    /// Anything the remote vocabulary does not map
    General,
}

// Requests

/// Transaction scoring request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Amount in major currency units
    pub amount: Decimal,
    /// ISO 4217 currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Merchant category label
    #[serde(default)]
    pub merchant_category: Option<String>,
    /// Payment rail
    #[serde(default)]
    pub payment_rail: PaymentRail,
    /// Merchant identifier
    #[serde(default)]
    pub merchant_id: Option<String>,
    /// Initiating agent identifier
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Merchant lookup request; at least one field must be set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantLookupRequest {
    /// Merchant identifier
    #[serde(default)]
    pub merchant_id: Option<String>,
    /// Merchant legal or trading name
    #[serde(default)]
    pub merchant_name: Option<String>,
}

impl MerchantLookupRequest {
    /// Identifier used for lookup and checksum
    pub fn identifier(&self) -> Option<&str> {
        let present = |id: &&str| !id.trim().is_empty();
        self.merchant_id
            .as_deref()
            .filter(present)
            .or_else(|| self.merchant_name.as_deref().filter(present))
    }
}

/// Agent verification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentVerificationRequest {
    /// Agent identifier
    pub agent_id: String,
    /// Principal the agent acts for
    #[serde(default)]
    pub principal_id: Option<String>,
    /// Action the agent wants to take
    #[serde(default)]
    pub requested_action: Option<String>,
    /// Amount attached to the action
    #[serde(default)]
    pub transaction_amount: Option<Decimal>,
}

/// Dispute prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputePredictionRequest {
    /// Amount in major currency units
    pub amount: Decimal,
    /// Merchant category label
    #[serde(default)]
    pub merchant_category: Option<String>,
    /// Payment rail
    #[serde(default)]
    pub payment_rail: PaymentRail,
    /// Recurring billing
    #[serde(default)]
    pub is_recurring: bool,
    /// Merchant identifier
    #[serde(default)]
    pub merchant_id: Option<String>,
}

/// Velocity check request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityRequest {
    /// Entity being monitored
    pub entity_id: String,
    /// Observation window label
    #[serde(default = "default_window")]
    pub time_window: String,
    /// Observed transaction count in the window
    #[serde(default)]
    pub transaction_count: Option<u32>,
}

/// Cross-rail analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRailRequest {
    /// Entity being analysed
    pub entity_id: String,
    /// Rails the entity has used
    pub payment_rails: Vec<PaymentRail>,
}

impl CrossRailRequest {
    /// Requested rails in order, duplicates removed
    pub fn distinct_rails(&self) -> Vec<PaymentRail> {
        let mut rails = Vec::with_capacity(self.payment_rails.len());
        for rail in &self.payment_rails {
            if !rails.contains(rail) {
                rails.push(*rail);
            }
        }
        rails
    }
}

/// Compliance (VAMP) analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VampRequest {
    /// Merchant identifier
    pub merchant_id: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_window() -> String {
    "24h".to_string()
}

// Results

/// Transaction risk result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRiskResult {
    /// Risk score (0-100, higher is safer)
    pub risk_score: RiskScore,
    /// Risk tier
    pub risk_tier: RiskTier,
    /// Recommended action
    pub recommended_action: RecommendedAction,
    /// Risk factors detected
    pub risk_factors: Vec<String>,
    /// Model or heuristic version
    pub model_version: String,
    /// Result origin
    pub source: ResultSource,
    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}

/// Merchant risk profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantProfile {
    /// Merchant identifier (or name when looked up by name)
    pub merchant_id: String,
    /// Merchant name if known
    pub merchant_name: Option<String>,
    /// Risk score (0-100, higher is safer)
    pub risk_score: RiskScore,
    /// Risk tier
    pub risk_tier: RiskTier,
    /// Verification status
    pub verification_status: VerificationStatus,
    /// Chargeback rate in percent
    pub chargeback_rate: f64,
    /// Monitoring program standing
    pub vamp_status: VampStatus,
    /// Risk factors detected
    pub risk_factors: Vec<String>,
    /// Model or heuristic version
    pub model_version: String,
    /// Result origin
    pub source: ResultSource,
    /// Profile timestamp
    pub last_updated: DateTime<Utc>,
}

/// Agent verification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentVerification {
    /// Agent identifier
    pub agent_id: String,
    /// Agent is recognised as trustworthy
    pub verified: bool,
    /// Trust score (0-100)
    pub trust_score: RiskScore,
    /// Risk tier
    pub risk_tier: RiskTier,
    /// Authorization level
    pub authorization_level: AuthorizationLevel,
    /// Spending limit in major currency units
    #[serde(with = "rust_decimal::serde::float")]
    pub spending_limit: Decimal,
    /// Anomalies detected in the request
    pub anomalies: Vec<String>,
    /// A human must confirm the action
    pub requires_human_approval: bool,
    /// Model or heuristic version
    pub model_version: String,
    /// Result origin
    pub source: ResultSource,
    /// Verification timestamp
    pub verified_at: DateTime<Utc>,
}

/// Dispute prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputePrediction {
    /// Dispute probability (0.01-0.99)
    pub dispute_probability: f64,
    /// Risk tier
    pub risk_tier: RiskTier,
    /// Most likely dispute reason, when probability is material
    pub predicted_dispute_type: Option<DisputeType>,
    /// Preventive actions
    pub preventive_actions: Vec<String>,
    /// Model or heuristic version
    pub model_version: String,
    /// Result origin
    pub source: ResultSource,
    /// Prediction timestamp
    pub predicted_at: DateTime<Utc>,
}

/// Velocity check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityResult {
    /// Entity identifier
    pub entity_id: String,
    /// Observation window label
    pub time_window: String,
    /// Transactions observed in the window
    pub current_count: u32,
    /// Expected transactions for the window
    pub baseline_count: u32,
    /// current / baseline, two decimals
    pub velocity_ratio: f64,
    /// Ratio above the anomaly limit
    pub anomaly_detected: bool,
    /// Velocity score (0-100, higher is safer)
    pub velocity_score: RiskScore,
    /// Risk tier
    pub risk_tier: RiskTier,
    /// Risk factors detected
    pub risk_factors: Vec<String>,
    /// Model or heuristic version
    pub model_version: String,
    /// Result origin
    pub source: ResultSource,
    /// Check timestamp
    pub checked_at: DateTime<Utc>,
}

/// Score for one rail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailScore {
    /// Rail
    pub rail: PaymentRail,
    /// Score (0-100, higher is safer)
    pub score: RiskScore,
}

/// Cross-rail analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRailResult {
    /// Entity identifier
    pub entity_id: String,
    /// One score per requested rail
    pub rail_scores: Vec<RailScore>,
    /// Suspicious patterns detected
    pub patterns_detected: Vec<String>,
    /// Aggregate score (0-100, higher is safer)
    pub aggregate_score: RiskScore,
    /// Risk tier
    pub risk_tier: RiskTier,
    /// Recommended action
    pub recommended_action: RecommendedAction,
    /// Model or heuristic version
    pub model_version: String,
    /// Result origin
    pub source: ResultSource,
    /// Analysis timestamp
    pub analyzed_at: DateTime<Utc>,
}

/// Remediation step for a monitored merchant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationAction {
    /// What to do
    pub action: String,
    /// Must be done before the next reporting cycle
    pub urgent: bool,
}

/// Compliance (VAMP) analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VampAnalysis {
    /// Merchant identifier
    pub merchant_id: String,
    /// Fraud rate in percent
    pub fraud_rate: f64,
    /// Dispute rate in percent
    pub dispute_rate: f64,
    /// Compliance score (0-100, higher is safer)
    pub compliance_score: f64,
    /// Monitoring program standing
    pub vamp_status: VampStatus,
    /// Gap in percentage points to the next program limit, zero once excessive
    pub distance_to_threshold: f64,
    /// Remediation steps
    pub remediation_actions: Vec<RemediationAction>,
    /// Model or heuristic version
    pub model_version: String,
    /// Result origin
    pub source: ResultSource,
    /// Analysis timestamp
    pub analyzed_at: DateTime<Utc>,
}
