//! Anomaly Module - multi-method anomaly detection over windows
//!
//! Volume, pattern and protocol checks run over the aggregated windows;
//! behavioral findings are appended by the zero-day detector.

pub mod types;
pub mod detector;

pub use types::{AnomalyFinding, AnomalyKind, AnomalyReport, SkippedCheck};
pub use detector::{
    detect_anomalies, detect_pattern_anomalies, detect_protocol_anomalies, detect_volume_anomalies,
};
