//! Tool catalogue

use serde::Serialize;
use serde_json::{json, Value};

const RAILS: [&str; 6] = ["card", "ach", "wire", "rtp", "crypto", "stablecoin"];

/// Exposed tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    /// Transaction risk scoring
    ScoreTransaction,
    /// Merchant profile lookup
    LookupMerchant,
    /// Agent verification
    VerifyAgent,
    /// Dispute prediction
    PredictDispute,
    /// Velocity check
    CheckVelocity,
    /// Cross-rail analysis
    CheckCrossRail,
    /// VAMP compliance analysis
    AnalyzeVamp,
}

impl ToolName {
    /// Every tool, in catalogue order
    pub const ALL: [ToolName; 7] = [
        ToolName::ScoreTransaction,
        ToolName::LookupMerchant,
        ToolName::VerifyAgent,
        ToolName::PredictDispute,
        ToolName::CheckVelocity,
        ToolName::CheckCrossRail,
        ToolName::AnalyzeVamp,
    ];

    /// Resolve a wire name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ScoreTransaction => "score_transaction",
            ToolName::LookupMerchant => "lookup_merchant",
            ToolName::VerifyAgent => "verify_agent",
            ToolName::PredictDispute => "predict_dispute",
            ToolName::CheckVelocity => "check_velocity",
            ToolName::CheckCrossRail => "check_cross_rail",
            ToolName::AnalyzeVamp => "analyze_vamp",
        }
    }

    /// One-line description shown to callers
    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ScoreTransaction => {
                "Score a transaction and recommend approve, review or decline"
            }
            ToolName::LookupMerchant => {
                "Look up a merchant's risk profile, verification and chargeback standing"
            }
            ToolName::VerifyAgent => {
                "Verify an autonomous agent and return its trust score and spending authority"
            }
            ToolName::PredictDispute => {
                "Predict the probability and likely type of a dispute for a transaction"
            }
            ToolName::CheckVelocity => {
                "Compare an entity's transaction count against its baseline"
            }
            ToolName::CheckCrossRail => {
                "Score an entity's activity per payment rail and flag cross-rail patterns"
            }
            ToolName::AnalyzeVamp => {
                "Analyse a merchant's fraud and dispute rates against VAMP program limits"
            }
        }
    }

    /// JSON schema for the tool's arguments
    pub fn input_schema(&self) -> Value {
        match self {
            ToolName::ScoreTransaction => json!({
                "type": "object",
                "properties": {
                    "amount": { "type": "number", "minimum": 0 },
                    "currency": { "type": "string", "default": "USD" },
                    "merchant_category": { "type": "string" },
                    "payment_rail": { "type": "string", "enum": RAILS, "default": "card" },
                    "merchant_id": { "type": "string" },
                    "agent_id": { "type": "string" }
                },
                "required": ["amount"]
            }),
            ToolName::LookupMerchant => json!({
                "type": "object",
                "properties": {
                    "merchant_id": { "type": "string" },
                    "merchant_name": { "type": "string" }
                },
                "anyOf": [
                    { "required": ["merchant_id"] },
                    { "required": ["merchant_name"] }
                ]
            }),
            ToolName::VerifyAgent => json!({
                "type": "object",
                "properties": {
                    "agent_id": { "type": "string" },
                    "principal_id": { "type": "string" },
                    "requested_action": { "type": "string" },
                    "transaction_amount": { "type": "number", "minimum": 0 }
                },
                "required": ["agent_id"]
            }),
            ToolName::PredictDispute => json!({
                "type": "object",
                "properties": {
                    "amount": { "type": "number", "minimum": 0 },
                    "merchant_category": { "type": "string" },
                    "payment_rail": { "type": "string", "enum": RAILS, "default": "card" },
                    "is_recurring": { "type": "boolean", "default": false },
                    "merchant_id": { "type": "string" }
                },
                "required": ["amount"]
            }),
            ToolName::CheckVelocity => json!({
                "type": "object",
                "properties": {
                    "entity_id": { "type": "string" },
                    "time_window": { "type": "string", "default": "24h" },
                    "transaction_count": { "type": "integer", "minimum": 0 }
                },
                "required": ["entity_id"]
            }),
            ToolName::CheckCrossRail => json!({
                "type": "object",
                "properties": {
                    "entity_id": { "type": "string" },
                    "payment_rails": {
                        "type": "array",
                        "items": { "type": "string", "enum": RAILS },
                        "minItems": 1
                    }
                },
                "required": ["entity_id", "payment_rails"]
            }),
            ToolName::AnalyzeVamp => json!({
                "type": "object",
                "properties": {
                    "merchant_id": { "type": "string" }
                },
                "required": ["merchant_id"]
            }),
        }
    }
}

/// Catalogue entry
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Wire name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// JSON schema of the arguments
    pub input_schema: Value,
}

/// Full tool catalogue
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::ALL
        .iter()
        .map(|tool| ToolDefinition {
            name: tool.as_str(),
            description: tool.description(),
            input_schema: tool.input_schema(),
        })
        .collect()
}
