//! Client configuration and risk thresholds

use crate::{Error, Result, RiskTier};
use ::config::Environment;
use serde::{Deserialize, Serialize};
use std::env;

/// Sentinel API key that forces demo mode
pub const DEMO_API_KEY: &str = "demo";

/// Default risk-intelligence endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.riskintel.io";

/// Default remote request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Score thresholds separating the four risk tiers
///
/// Scores are "higher is safer", so the thresholds must be strictly
/// increasing: `auto_decline < high_risk < medium_risk`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// At or below: critical
    pub auto_decline: f64,
    /// At or below: high
    pub high_risk: f64,
    /// At or below: medium
    pub medium_risk: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            auto_decline: 30.0,
            high_risk: 50.0,
            medium_risk: 70.0,
        }
    }
}

impl RiskThresholds {
    /// Create thresholds, rejecting a non-increasing ordering
    pub fn new(auto_decline: f64, high_risk: f64, medium_risk: f64) -> Result<Self> {
        let thresholds = Self {
            auto_decline,
            high_risk,
            medium_risk,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check the thresholds are finite and strictly increasing
    pub fn validate(&self) -> Result<()> {
        let values = [self.auto_decline, self.high_risk, self.medium_risk];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "Risk thresholds must be finite numbers: {:?}",
                values
            )));
        }
        if !(self.auto_decline < self.high_risk && self.high_risk < self.medium_risk) {
            return Err(Error::InvalidConfig(format!(
                "Risk thresholds must satisfy auto_decline < high_risk < medium_risk, got {} / {} / {}",
                self.auto_decline, self.high_risk, self.medium_risk
            )));
        }
        Ok(())
    }

    /// Classify a score into a tier
    ///
    /// Checks run critical first, so unvalidated thresholds still give a
    /// total (if odd) mapping rather than a panic.
    pub fn classify(&self, score: f64) -> RiskTier {
        if score <= self.auto_decline {
            RiskTier::Critical
        } else if score <= self.high_risk {
            RiskTier::High
        } else if score <= self.medium_risk {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Upper bound of the band for a tier
    pub fn score_for_tier(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Critical => self.auto_decline,
            RiskTier::High => self.high_risk,
            RiskTier::Medium => self.medium_risk,
            RiskTier::Low => 100.0,
        }
    }
}

/// Risk client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Risk-intelligence service base URL
    pub base_url: String,
    /// API key; absent or `demo` means demo mode
    #[serde(default)]
    pub api_key: Option<String>,
    /// Tier thresholds
    #[serde(default)]
    pub thresholds: RiskThresholds,
    /// Remote request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            thresholds: RiskThresholds::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ClientConfig {
    /// Live configuration for the given endpoint and key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Demo configuration: no remote calls are ever made
    pub fn demo() -> Self {
        Self {
            api_key: Some(DEMO_API_KEY.to_string()),
            ..Self::default()
        }
    }

    /// Replace the thresholds
    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replace the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Key is absent, blank or the demo sentinel
    pub fn is_demo(&self) -> bool {
        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(key) => key.eq_ignore_ascii_case(DEMO_API_KEY),
        }
    }

    /// Load from `RISK_INTEL__*` environment variables with defaults
    pub fn from_env() -> Result<Self> {
        let defaults = RiskThresholds::default();
        let mut builder = ::config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECONDS as i64)?
            .set_default("thresholds.auto_decline", defaults.auto_decline)?
            .set_default("thresholds.high_risk", defaults.high_risk)?
            .set_default("thresholds.medium_risk", defaults.medium_risk)?;

        builder = builder.add_source(Environment::with_prefix("RISK_INTEL").separator("__"));

        // Flat names used by deployment manifests
        if let Ok(api_key) = env::var("RISK_INTEL_API_KEY") {
            builder = builder.set_override("api_key", api_key)?;
        }

        if let Ok(base_url) = env::var("RISK_INTEL_BASE_URL") {
            builder = builder.set_override("base_url", base_url)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_valid() {
        assert!(RiskThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        assert!(RiskThresholds::new(70.0, 50.0, 30.0).is_err());
        assert!(RiskThresholds::new(30.0, 30.0, 70.0).is_err());
        assert!(RiskThresholds::new(f64::NAN, 50.0, 70.0).is_err());
    }

    #[test]
    fn test_classify_boundaries() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(0.0), RiskTier::Critical);
        assert_eq!(t.classify(30.0), RiskTier::Critical);
        assert_eq!(t.classify(30.5), RiskTier::High);
        assert_eq!(t.classify(50.0), RiskTier::High);
        assert_eq!(t.classify(70.0), RiskTier::Medium);
        assert_eq!(t.classify(70.1), RiskTier::Low);
        assert_eq!(t.classify(100.0), RiskTier::Low);
    }

    #[test]
    fn test_inverted_thresholds_classify_without_panicking() {
        // Every score at or below 70 is critical; the other bands collapse.
        let t = RiskThresholds {
            auto_decline: 70.0,
            high_risk: 50.0,
            medium_risk: 30.0,
        };
        assert_eq!(t.classify(40.0), RiskTier::Critical);
        assert_eq!(t.classify(71.0), RiskTier::Low);
    }

    #[test]
    fn test_score_for_tier_round_trips() {
        let t = RiskThresholds::default();
        for tier in [RiskTier::Critical, RiskTier::High, RiskTier::Medium, RiskTier::Low] {
            assert_eq!(t.classify(t.score_for_tier(tier)), tier);
        }
    }

    #[test]
    fn test_demo_detection() {
        assert!(ClientConfig::default().is_demo());
        assert!(ClientConfig::demo().is_demo());
        assert!(ClientConfig::new("http://localhost", " DEMO ").is_demo());
        assert!(ClientConfig::new("http://localhost", "").is_demo());
        assert!(!ClientConfig::new("http://localhost", "sk_live_123").is_demo());
    }
}
