//! Risk-assessment client
//!
//! One entry point per operation. Each tries the remote service once (never
//! in demo mode), normalizes a successful payload, and otherwise answers from
//! the deterministic generator. Remote failures never reach the caller.

use crate::metrics;
use crate::mock::{self, UNKNOWN_ID};
use crate::normalize;
use crate::remote::{
    HttpRiskService, RemoteService, AGENT_SCREEN_PATH, ASSESS_PATH, DECISION_PATH,
    MERCHANTS_PATH, SIMULATE_PATH,
};
use crate::{
    AgentVerification, AgentVerificationRequest, ClientConfig, CrossRailRequest, CrossRailResult,
    DisputePrediction, DisputePredictionRequest, MerchantLookupRequest, MerchantProfile,
    RemoteError, Result, RiskThresholds, TransactionRequest, TransactionRiskResult, VampAnalysis,
    VampRequest, VelocityRequest, VelocityResult,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Operating mode, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Remote first, generator on failure
    Live,
    /// Generator only, no network
    Demo,
}

enum RemoteCall<'a> {
    Post { path: &'static str, body: Value },
    Get { path: &'static str, query: Vec<(&'static str, &'a str)> },
}

/// Risk-assessment client
pub struct RiskClient {
    config: ClientConfig,
    mode: Mode,
    remote: Arc<dyn RemoteService>,
}

impl RiskClient {
    /// Create a client talking HTTP to the configured service
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.thresholds.validate()?;
        let remote = Arc::new(HttpRiskService::new(&config)?);
        Ok(Self::assemble(config, remote))
    }

    /// Create a client over any remote implementation
    pub fn with_remote(config: ClientConfig, remote: Arc<dyn RemoteService>) -> Result<Self> {
        config.thresholds.validate()?;
        Ok(Self::assemble(config, remote))
    }

    fn assemble(config: ClientConfig, remote: Arc<dyn RemoteService>) -> Self {
        let mode = if config.is_demo() { Mode::Demo } else { Mode::Live };
        match mode {
            Mode::Demo => info!("Risk client running in demo mode; remote calls disabled"),
            Mode::Live => info!("Risk client using remote service at {}", config.base_url),
        }
        Self {
            config,
            mode,
            remote,
        }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Tier thresholds
    pub fn thresholds(&self) -> &RiskThresholds {
        &self.config.thresholds
    }

    /// One remote attempt; `None` means "use the generator"
    async fn fetch(&self, operation: &'static str, call: RemoteCall<'_>) -> Option<Value> {
        if self.mode == Mode::Demo {
            metrics::record_mock(operation, "demo");
            return None;
        }

        let started = Instant::now();
        let outcome = match call {
            RemoteCall::Post { path, body } => self.remote.post(path, &body).await,
            RemoteCall::Get { path, query } => self.remote.get(path, &query).await,
        }
        .and_then(|payload| {
            if payload.is_object() {
                Ok(payload)
            } else {
                Err(RemoteError::Decode("expected a JSON object".to_string()))
            }
        });
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok(payload) => {
                metrics::record_remote(operation, "success", elapsed);
                Some(payload)
            }
            Err(e) => {
                if e.is_auth() {
                    info!("{}: {}; using local fallback", operation, e);
                } else {
                    warn!("{}: remote call failed: {}; using local fallback", operation, e);
                }
                metrics::record_remote(operation, e.kind(), elapsed);
                metrics::record_mock(operation, "fallback");
                None
            }
        }
    }

    /// Score a transaction
    pub async fn score_transaction(&self, request: &TransactionRequest) -> TransactionRiskResult {
        let body = json!({
            "amount": amount(request.amount),
            "currency": request.currency,
            "payment_method": request.payment_rail.as_str(),
            "merchant": {
                "id": request.merchant_id.as_deref().unwrap_or(UNKNOWN_ID),
                "category": request.merchant_category.as_deref().unwrap_or("general"),
            },
            "agent_id": request.agent_id,
            "channel": if request.agent_id.is_some() { "agent" } else { "direct" },
        });

        let result = match self
            .fetch("score_transaction", RemoteCall::Post { path: ASSESS_PATH, body })
            .await
        {
            Some(payload) => normalize::transaction(&payload, self.thresholds()),
            None => mock::score_transaction(request, self.thresholds()),
        };

        debug!(
            "Transaction scored {} ({}) from {:?}",
            result.risk_score.score(),
            result.risk_tier.as_str(),
            result.source
        );
        result
    }

    /// Look up a merchant profile by id or name
    pub async fn lookup_merchant(&self, request: &MerchantLookupRequest) -> MerchantProfile {
        let query = match (request.merchant_id.as_deref(), request.identifier()) {
            (Some(id), Some(identifier)) if id == identifier => vec![("id", id)],
            (_, Some(name)) => vec![("name", name)],
            (_, None) => vec![("id", UNKNOWN_ID)],
        };

        match self
            .fetch("lookup_merchant", RemoteCall::Get { path: MERCHANTS_PATH, query })
            .await
        {
            Some(payload) => normalize::merchant(&payload, request, self.thresholds()),
            None => mock::lookup_merchant(request, self.thresholds()),
        }
    }

    /// Verify an autonomous agent before it acts
    pub async fn verify_agent(&self, request: &AgentVerificationRequest) -> AgentVerification {
        let body = json!({
            "agent_id": request.agent_id,
            "principal_id": request.principal_id.as_deref().unwrap_or(UNKNOWN_ID),
            "action": request.requested_action.as_deref().unwrap_or("general"),
            "amount": request.transaction_amount.map(amount).unwrap_or(0.0),
        });

        let result = match self
            .fetch("verify_agent", RemoteCall::Post { path: AGENT_SCREEN_PATH, body })
            .await
        {
            Some(payload) => normalize::agent(&payload, request, self.thresholds()),
            None => mock::verify_agent(request, self.thresholds()),
        };

        if !result.anomalies.is_empty() {
            info!(
                "Agent {} flagged: {}",
                result.agent_id,
                result.anomalies.join(", ")
            );
        }
        result
    }

    /// Predict the likelihood of a dispute
    pub async fn predict_dispute(&self, request: &DisputePredictionRequest) -> DisputePrediction {
        let body = json!({
            "scenario": "dispute",
            "transaction": {
                "amount": amount(request.amount),
                "category": request.merchant_category.as_deref().unwrap_or("general"),
                "payment_method": request.payment_rail.as_str(),
                "recurring": request.is_recurring,
                "merchant_id": request.merchant_id.as_deref().unwrap_or(UNKNOWN_ID),
            },
        });

        match self
            .fetch("predict_dispute", RemoteCall::Post { path: SIMULATE_PATH, body })
            .await
        {
            Some(payload) => normalize::dispute(&payload, request),
            None => mock::predict_dispute(request),
        }
    }

    /// Check transaction velocity
    ///
    /// The service exposes no velocity endpoint, so this always uses the
    /// generator.
    pub async fn check_velocity(&self, request: &VelocityRequest) -> VelocityResult {
        metrics::record_mock("check_velocity", "local_only");
        let result = mock::check_velocity(request, self.thresholds());
        if result.anomaly_detected {
            info!(
                "Velocity anomaly for {}: ratio {} over {}",
                result.entity_id, result.velocity_ratio, result.time_window
            );
        }
        result
    }

    /// Analyse activity across payment rails
    pub async fn check_cross_rail(&self, request: &CrossRailRequest) -> CrossRailResult {
        let rails: Vec<&str> = request
            .distinct_rails()
            .iter()
            .map(|rail| rail.as_str())
            .collect();
        let body = json!({
            "context": "cross_rail",
            "entity_id": request.entity_id,
            "payment_rails": rails,
        });

        match self
            .fetch("check_cross_rail", RemoteCall::Post { path: DECISION_PATH, body })
            .await
        {
            Some(payload) => normalize::cross_rail(&payload, request, self.thresholds()),
            None => mock::check_cross_rail(request, self.thresholds()),
        }
    }

    /// Analyse a merchant's standing against the monitoring program limits
    pub async fn analyze_vamp(&self, request: &VampRequest) -> VampAnalysis {
        let body = json!({
            "scenario": "vamp_compliance",
            "merchant_id": request.merchant_id,
        });

        let result = match self
            .fetch("analyze_vamp", RemoteCall::Post { path: SIMULATE_PATH, body })
            .await
        {
            Some(payload) => normalize::vamp(&payload, request),
            None => mock::analyze_vamp(request),
        };

        debug!(
            "VAMP status for {}: {:?} (fraud rate {}%)",
            result.merchant_id, result.vamp_status, result.fraud_rate
        );
        result
    }
}

fn amount(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PaymentRail, ResultSource};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every call and answers with a canned outcome
    struct ScriptedRemote {
        calls: AtomicUsize,
        paths: Mutex<Vec<String>>,
        outcome: std::result::Result<Value, RemoteError>,
    }

    impl ScriptedRemote {
        fn new(outcome: std::result::Result<Value, RemoteError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                paths: Mutex::new(Vec::new()),
                outcome,
            })
        }

        fn record(&self, path: &str) -> std::result::Result<Value, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.paths.lock().unwrap().push(path.to_string());
            self.outcome.clone()
        }
    }

    #[async_trait]
    impl RemoteService for ScriptedRemote {
        async fn post(&self, path: &str, _body: &Value) -> std::result::Result<Value, RemoteError> {
            self.record(path)
        }

        async fn get(
            &self,
            path: &str,
            _query: &[(&str, &str)],
        ) -> std::result::Result<Value, RemoteError> {
            self.record(path)
        }
    }

    fn live() -> ClientConfig {
        ClientConfig::new("http://risk.test", "sk_test_key")
    }

    fn transaction() -> TransactionRequest {
        TransactionRequest {
            amount: dec!(15000),
            currency: "USD".to_string(),
            merchant_category: Some("gambling".to_string()),
            payment_rail: PaymentRail::Card,
            merchant_id: None,
            agent_id: None,
        }
    }

    #[tokio::test]
    async fn test_demo_mode_makes_no_remote_calls() {
        let remote = ScriptedRemote::new(Ok(json!({ "risk_score": 99 })));
        let client = RiskClient::with_remote(ClientConfig::demo(), remote.clone()).unwrap();
        assert_eq!(client.mode(), Mode::Demo);

        let result = client.score_transaction(&transaction()).await;
        client
            .lookup_merchant(&MerchantLookupRequest {
                merchant_id: Some("M1".to_string()),
                merchant_name: None,
            })
            .await;
        client
            .analyze_vamp(&VampRequest {
                merchant_id: "M1".to_string(),
            })
            .await;

        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.source, ResultSource::Mock);
        assert!(result.risk_score.score() <= 50);
    }

    #[tokio::test]
    async fn test_missing_key_is_demo() {
        let remote = ScriptedRemote::new(Ok(json!({})));
        let config = ClientConfig {
            api_key: None,
            ..live()
        };
        let client = RiskClient::with_remote(config, remote).unwrap();
        assert_eq!(client.mode(), Mode::Demo);
    }

    #[tokio::test]
    async fn test_live_success_is_normalized() {
        let remote = ScriptedRemote::new(Ok(json!({
            "risk_score": 91,
            "risk_factors": ["velocity"],
            "model_version": "gbm-7"
        })));
        let client = RiskClient::with_remote(live(), remote.clone()).unwrap();

        let result = client.score_transaction(&transaction()).await;
        assert_eq!(result.source, ResultSource::Remote);
        assert_eq!(result.risk_score.score(), 91);
        assert_eq!(result.model_version, "gbm-7");
        assert_eq!(remote.paths.lock().unwrap().as_slice(), [ASSESS_PATH]);
    }

    #[tokio::test]
    async fn test_each_failure_falls_back_to_generator() {
        let failures = vec![
            RemoteError::Unauthorized { status: 403 },
            RemoteError::Status {
                status: 500,
                body: "boom".to_string(),
            },
            RemoteError::Timeout,
            RemoteError::Transport("connection refused".to_string()),
            RemoteError::Decode("eof".to_string()),
        ];

        for failure in failures {
            let remote = ScriptedRemote::new(Err(failure));
            let client = RiskClient::with_remote(live(), remote.clone()).unwrap();
            let result = client.score_transaction(&transaction()).await;
            let expected = mock::score_transaction(&transaction(), client.thresholds());

            assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
            assert_eq!(result.source, ResultSource::Mock);
            assert_eq!(result.risk_score, expected.risk_score);
            assert_eq!(result.risk_factors, expected.risk_factors);
        }
    }

    #[tokio::test]
    async fn test_non_object_payload_falls_back() {
        let remote = ScriptedRemote::new(Ok(json!(["not", "an", "object"])));
        let client = RiskClient::with_remote(live(), remote).unwrap();
        let result = client
            .analyze_vamp(&VampRequest {
                merchant_id: "M1".to_string(),
            })
            .await;
        assert_eq!(result.source, ResultSource::Mock);
    }

    #[tokio::test]
    async fn test_velocity_never_calls_remote() {
        let remote = ScriptedRemote::new(Ok(json!({})));
        let client = RiskClient::with_remote(live(), remote.clone()).unwrap();
        let result = client
            .check_velocity(&VelocityRequest {
                entity_id: "E1".to_string(),
                time_window: "24h".to_string(),
                transaction_count: None,
            })
            .await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.source, ResultSource::Mock);
    }

    #[tokio::test]
    async fn test_operations_hit_their_paths() {
        let remote = ScriptedRemote::new(Ok(json!({})));
        let client = RiskClient::with_remote(live(), remote.clone()).unwrap();

        client
            .lookup_merchant(&MerchantLookupRequest {
                merchant_id: None,
                merchant_name: Some("Acme".to_string()),
            })
            .await;
        client
            .verify_agent(&AgentVerificationRequest {
                agent_id: "agent-1".to_string(),
                principal_id: None,
                requested_action: None,
                transaction_amount: None,
            })
            .await;
        client
            .predict_dispute(&DisputePredictionRequest {
                amount: dec!(10),
                merchant_category: None,
                payment_rail: PaymentRail::Ach,
                is_recurring: false,
                merchant_id: None,
            })
            .await;
        client
            .check_cross_rail(&CrossRailRequest {
                entity_id: "X".to_string(),
                payment_rails: vec![PaymentRail::Card],
            })
            .await;

        assert_eq!(
            remote.paths.lock().unwrap().as_slice(),
            [MERCHANTS_PATH, AGENT_SCREEN_PATH, SIMULATE_PATH, DECISION_PATH]
        );
    }

    #[test]
    fn test_invalid_thresholds_rejected_at_construction() {
        let config = live().with_thresholds(RiskThresholds {
            auto_decline: 80.0,
            high_risk: 50.0,
            medium_risk: 20.0,
        });
        let remote = ScriptedRemote::new(Ok(json!({})));
        assert!(RiskClient::with_remote(config, remote).is_err());
    }
}
