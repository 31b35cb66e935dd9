//! Risk-intelligence client
//!
//! Transaction, merchant, agent, dispute, velocity, cross-rail and VAMP
//! assessments. Every operation tries the remote service once and falls back
//! to a deterministic local generator, so callers always get a well-formed
//! result.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod mock;
pub mod normalize;
pub mod remote;
pub mod types;

pub use client::{Mode, RiskClient};
pub use config::{ClientConfig, RiskThresholds};
pub use error::{Error, RemoteError, Result};
pub use remote::{HttpRiskService, RemoteService};
pub use types::*;
