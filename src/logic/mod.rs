//! Logic Module - Analysis Engines
//!
//! Traffic windowing plus the analysis methods run over it: temporal,
//! spatial, protocol, anomaly, threat clustering, behavioral baseline and
//! risk. `engine` wires them into one report.
//!
//! ## Layout
//! - `traffic/` - records, windows, per-window patterns
//! - `temporal/`, `spatial/`, `protocol/` - descriptive analyses
//! - `anomaly/`, `baseline/`, `threat/` - detection
//! - `risk/` - correlation and overall assessment
//! - `engine/` - `TrafficAnalyzer` and `AnalysisContext`

// Shared
pub mod error;
pub mod config;
pub mod stats;

// Analysis methods
pub mod traffic;
pub mod temporal;
pub mod spatial;
pub mod protocol;
pub mod anomaly;
pub mod threat;
pub mod baseline;
pub mod risk;

// Orchestration
pub mod engine;

#[cfg(test)]
pub(crate) mod fixtures;
