//! Threat Module - attack pattern clustering
//!
//! Groups threat events into recurring attack patterns with DBSCAN over
//! standardized behavioral features.
//!
//! ## Structure
//! - `types`: `ThreatEvent`, `ClusterLabel`, `AttackPattern`, severity
//! - `layout`: versioned feature layout with CRC32 hash
//! - `features`: `ThreatFeatureExtractor` trait, default extractor, matrix helpers
//! - `dbscan`: density clustering
//! - `clusterer`: per-cluster signature, attributes, temporal profile, severity
//!
//! ## Usage
//! ```ignore
//! let clusterer = ThreatPatternClusterer::new(0.5, 5);
//! let outcome = clusterer.identify_attack_patterns(&events)?;
//! for (id, pattern) in &outcome.patterns {
//!     println!("{} {} {}", id, pattern.severity.level, pattern.signature);
//! }
//! ```

pub mod types;
pub mod layout;
pub mod features;
pub mod dbscan;
pub mod clusterer;

pub use types::{
    AttackPattern, ClusterLabel, ClusteringOutcome, CommonAttribute, EventTransition, FeatureRange,
    PatternSeverity, SeverityLevel, TemporalProfile, ThreatEvent,
};
pub use layout::{LayoutInfo, THREAT_FEATURE_COUNT, THREAT_FEATURE_LAYOUT, THREAT_FEATURE_VERSION};
pub use features::{feature_matrix, standardize, DefaultThreatFeatures, ThreatFeatureExtractor, ThreatFeatureVector};
pub use dbscan::dbscan;
pub use clusterer::ThreatPatternClusterer;
