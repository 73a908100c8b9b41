//! Traffic Pattern Core - Library Root
//!
//! Windowed traffic analysis: temporal, spatial and protocol patterns,
//! anomaly detection, threat clustering, behavioral baselines and risk.

pub mod constants;
pub mod logic;

pub use logic::config::{AnalyzerConfig, VerdictPolicy};
pub use logic::engine::{AnalysisContext, AnalysisInput, AnalysisReport, TrafficAnalyzer};
pub use logic::error::{AnalysisError, AnalysisWarning, Outcome, Result};
pub use logic::threat::ThreatEvent;
pub use logic::traffic::{RawTrafficRecord, TrafficRecord};
