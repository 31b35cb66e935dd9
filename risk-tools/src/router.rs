//! Tool dispatch
//!
//! Decodes tool arguments into typed requests, checks preconditions, runs
//! the client operation and wraps the result as text content.

use crate::tools::ToolName;
use crate::{Result, ToolError};
use risk_client::{
    AgentVerificationRequest, CrossRailRequest, DisputePredictionRequest, MerchantLookupRequest,
    RiskClient, TransactionRequest, VampRequest, VelocityRequest,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Text content block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    /// Always `text`
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Payload
    pub text: String,
}

/// Result of one tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    /// Content blocks
    pub content: Vec<TextContent>,
    /// True when the call was rejected
    pub is_error: bool,
}

impl ToolResponse {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent { kind: "text", text }],
            is_error,
        }
    }

    /// Successful response
    pub fn success(text: String) -> Self {
        Self::text(text, false)
    }

    /// Rejected call with a plain message
    pub fn error(message: String) -> Self {
        Self::text(message, true)
    }

    /// First text block
    pub fn first_text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// Routes tool calls to the risk client
#[derive(Clone)]
pub struct ToolRouter {
    client: Arc<RiskClient>,
}

impl ToolRouter {
    /// Create a router over a shared client
    pub fn new(client: Arc<RiskClient>) -> Self {
        Self { client }
    }

    /// Handle one call; never fails, errors become `is_error` responses
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> ToolResponse {
        match self.dispatch(name, arguments).await {
            Ok(text) => ToolResponse::success(text),
            Err(e) => {
                warn!("Tool call {} rejected: {}", name, e);
                ToolResponse::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<String> {
        let tool = ToolName::parse(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!("Dispatching tool {}", tool.as_str());

        match tool {
            ToolName::ScoreTransaction => {
                let request: TransactionRequest = decode(arguments)?;
                non_negative("amount", request.amount)?;
                render(&self.client.score_transaction(&request).await)
            }
            ToolName::LookupMerchant => {
                let request: MerchantLookupRequest = decode(arguments)?;
                if request.identifier().is_none() {
                    return Err(ToolError::InvalidInput(
                        "merchant_id or merchant_name is required".to_string(),
                    ));
                }
                render(&self.client.lookup_merchant(&request).await)
            }
            ToolName::VerifyAgent => {
                let request: AgentVerificationRequest = decode(arguments)?;
                non_blank("agent_id", &request.agent_id)?;
                if let Some(amount) = request.transaction_amount {
                    non_negative("transaction_amount", amount)?;
                }
                render(&self.client.verify_agent(&request).await)
            }
            ToolName::PredictDispute => {
                let request: DisputePredictionRequest = decode(arguments)?;
                non_negative("amount", request.amount)?;
                render(&self.client.predict_dispute(&request).await)
            }
            ToolName::CheckVelocity => {
                let request: VelocityRequest = decode(arguments)?;
                non_blank("entity_id", &request.entity_id)?;
                render(&self.client.check_velocity(&request).await)
            }
            ToolName::CheckCrossRail => {
                let request: CrossRailRequest = decode(arguments)?;
                non_blank("entity_id", &request.entity_id)?;
                if request.payment_rails.is_empty() {
                    return Err(ToolError::InvalidInput(
                        "payment_rails must list at least one rail".to_string(),
                    ));
                }
                render(&self.client.check_cross_rail(&request).await)
            }
            ToolName::AnalyzeVamp => {
                let request: VampRequest = decode(arguments)?;
                non_blank("merchant_id", &request.merchant_id)?;
                render(&self.client.analyze_vamp(&request).await)
            }
        }
    }
}

/// Missing arguments decode as an empty object
fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    Ok(serde_json::from_value(arguments)?)
}

fn render<T: Serialize>(result: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

fn non_negative(field: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(ToolError::InvalidInput(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}

fn non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidInput(format!("{} must not be blank", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_client::ClientConfig;
    use serde_json::json;

    fn router() -> ToolRouter {
        let client = RiskClient::new(ClientConfig::demo()).unwrap();
        ToolRouter::new(Arc::new(client))
    }

    fn parsed(response: &ToolResponse) -> Value {
        serde_json::from_str(response.first_text()).unwrap()
    }

    #[tokio::test]
    async fn test_demo_transaction_scenario() {
        let response = router()
            .handle_tool_call(
                "score_transaction",
                json!({ "amount": 15000, "merchant_category": "gambling" }),
            )
            .await;

        assert!(!response.is_error);
        let result = parsed(&response);
        assert_eq!(result["risk_score"], 35);
        assert_eq!(result["risk_tier"], "high");
        assert_eq!(result["recommended_action"], "review");
        assert_eq!(result["source"], "mock");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error() {
        let response = router().handle_tool_call("delete_everything", json!({})).await;
        assert!(response.is_error);
        assert!(response.first_text().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_merchant_lookup_requires_identifier() {
        let router = router();
        let response = router.handle_tool_call("lookup_merchant", json!({})).await;
        assert!(response.is_error);

        let response = router
            .handle_tool_call("lookup_merchant", json!({ "merchant_id": "  " }))
            .await;
        assert!(response.is_error);

        let response = router
            .handle_tool_call("lookup_merchant", json!({ "merchant_name": "Acme" }))
            .await;
        assert!(!response.is_error);
        assert_eq!(parsed(&response)["merchant_name"], "Acme");
    }

    #[tokio::test]
    async fn test_cross_rail_requires_a_rail() {
        let router = router();
        let response = router
            .handle_tool_call(
                "check_cross_rail",
                json!({ "entity_id": "X", "payment_rails": [] }),
            )
            .await;
        assert!(response.is_error);

        let response = router
            .handle_tool_call(
                "check_cross_rail",
                json!({ "entity_id": "X", "payment_rails": ["card", "crypto"] }),
            )
            .await;
        assert!(!response.is_error);
        let result = parsed(&response);
        assert_eq!(result["rail_scores"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let response = router()
            .handle_tool_call("predict_dispute", json!({ "amount": -5 }))
            .await;
        assert!(response.is_error);
        assert!(response.first_text().contains("amount"));
    }

    #[tokio::test]
    async fn test_malformed_arguments_rejected() {
        let router = router();
        let response = router
            .handle_tool_call(
                "check_cross_rail",
                json!({ "entity_id": "X", "payment_rails": ["teleport"] }),
            )
            .await;
        assert!(response.is_error);

        let response = router.handle_tool_call("analyze_vamp", Value::Null).await;
        assert!(response.is_error);
        assert!(response.first_text().contains("Invalid arguments"));
    }

    #[tokio::test]
    async fn test_velocity_defaults_window() {
        let response = router()
            .handle_tool_call("check_velocity", json!({ "entity_id": "E1" }))
            .await;
        assert!(!response.is_error);
        let result = parsed(&response);
        assert_eq!(result["time_window"], "24h");
        assert_eq!(result["baseline_count"], 43);
    }
}
